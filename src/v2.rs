//! Generalized entropy binding tokens.
//!
//! Instead of a fixed set of context fields, issuer and verifier agree out of band on an ordered
//! list of strings, the entropy, that describes the request. A common choice is a constant tag
//! followed by the request method, path, and body digest (see [`request_entropy`]).
//!
//! The token has the form `id:timestamp:entropy[0]:...:entropy[n-1]:signature`. Its field count
//! depends on the entropy length, so the verifier must supply the same number of entries the
//! issuer used. Entropy entries must not contain `:`.

use crate::{
    config::TokenParameters,
    crypto::{constant_time_eq, digest, SigningKey},
    error::{trace_outcome, validate_condition, InvalidTokenKind, ValidationError},
    framing,
    keys::KeyLookup,
    time::{format_timestamp, validate_timestamp},
};
use chrono::{DateTime, Utc};
use std::iter;

const SCHEME: &str = "v2";

/// Create a token bound to the given entropy.
pub fn tokenize<S: AsRef<str>>(id: &str, issued_at: DateTime<Utc>, entropy: &[S], key: &[u8]) -> String {
    let timestamp = format_timestamp(issued_at);
    let entropy: Vec<&str> = entropy.iter().map(AsRef::as_ref).collect();
    let signature = sign(id, &timestamp, &entropy, key);
    let fields = [id, timestamp.as_str()].into_iter().chain(entropy).chain(iter::once(signature.as_str()));
    framing::join(fields)
}

/// Validate a token against the expected entropy.
///
/// The entropy in the token must match `entropy` entry by entry and in the same order.
pub fn validate<L, S>(
    token: &str,
    lookup: &L,
    entropy: &[S],
    parameters: &TokenParameters,
) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
    S: AsRef<str>,
{
    let result = validate_token(token, lookup, entropy, parameters);
    trace_outcome(SCHEME, framing::leading_field(token), &result);
    result
}

fn validate_token<L, S>(
    token: &str,
    lookup: &L,
    entropy: &[S],
    parameters: &TokenParameters,
) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
    S: AsRef<str>,
{
    let fields = framing::split_n(token, entropy.len() + 3)?;
    let (id, timestamp) = (fields[0], fields[1]);
    let token_entropy = &fields[2..fields.len() - 1];
    let signature = fields[fields.len() - 1];

    validate_timestamp(timestamp, parameters)?;
    let matches = token_entropy.iter().copied().eq(entropy.iter().map(AsRef::as_ref));
    validate_condition(matches, InvalidTokenKind::EntropyMismatch)?;

    let key = lookup.lookup_key(id)?;
    let expected = sign(id, timestamp, token_entropy, key.as_bytes());
    let matches = constant_time_eq(signature.as_bytes(), expected.as_bytes());
    validate_condition(matches, InvalidTokenKind::SignatureMismatch)
}

/// Build the conventional entropy for an HTTP-like request: a shared tag followed by the action,
/// the resource, and the digest of the body.
pub fn request_entropy(tag: &str, action: &str, resource: &str, body: &[u8]) -> Vec<String> {
    vec![tag.to_string(), action.to_string(), resource.to_string(), digest(body)]
}

fn sign(id: &str, timestamp: &str, entropy: &[&str], key: &[u8]) -> String {
    let fields = || [id, timestamp].into_iter().chain(entropy.iter().copied());
    let signing_key = SigningKey::derive(key, fields());
    signing_key.sign_base64(framing::join(fields()))
}
