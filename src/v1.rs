//! Contextual binding tokens.
//!
//! A token is bound to an action (e.g. an HTTP method), a resource (e.g. a request path), and the
//! digest of a request body. The signing key is derived from the identity, the timestamp, the
//! action, and the resource, so a key leaked for one request can't be used to sign any other.
//!
//! The token has the form `id:timestamp:action:resource:digest:signature`.

use crate::{
    config::TokenParameters,
    crypto::{constant_time_eq, digest, SigningKey},
    error::{trace_outcome, validate_condition, InvalidTokenKind, ValidationError},
    framing,
    keys::KeyLookup,
    time::{format_timestamp, validate_timestamp},
};
use chrono::{DateTime, Utc};

const SCHEME: &str = "v1";

/// Create a token for a request.
pub fn tokenize(
    id: &str,
    issued_at: DateTime<Utc>,
    action: &str,
    resource: &str,
    body: &[u8],
    key: &[u8],
) -> String {
    let timestamp = format_timestamp(issued_at);
    let digest = digest(body);
    let signature = sign(id, &timestamp, action, resource, &digest, key);
    framing::join([id, timestamp.as_str(), action, resource, digest.as_str(), signature.as_str()])
}

/// Validate a token against the request it was presented with.
///
/// The cheap checks (timestamp, action, resource, and body digest) are performed before the key for
/// the token's identity is looked up. Key lookup errors are returned as is.
pub fn validate<L>(
    token: &str,
    lookup: &L,
    action: &str,
    resource: &str,
    body: &[u8],
    parameters: &TokenParameters,
) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let result = validate_token(token, lookup, action, resource, body, parameters);
    trace_outcome(SCHEME, framing::leading_field(token), &result);
    result
}

fn validate_token<L>(
    token: &str,
    lookup: &L,
    action: &str,
    resource: &str,
    body: &[u8],
    parameters: &TokenParameters,
) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let [id, timestamp, token_action, token_resource, token_digest, signature] = framing::split_exact(token)?;

    validate_timestamp(timestamp, parameters)?;
    validate_condition(token_action == action, InvalidTokenKind::ActionMismatch)?;
    validate_condition(token_resource == resource, InvalidTokenKind::ResourceMismatch)?;
    validate_condition(token_digest == digest(body), InvalidTokenKind::DigestMismatch)?;

    let key = lookup.lookup_key(id)?;
    let expected = sign(id, timestamp, token_action, token_resource, token_digest, key.as_bytes());
    let matches = constant_time_eq(signature.as_bytes(), expected.as_bytes());
    validate_condition(matches, InvalidTokenKind::SignatureMismatch)
}

fn sign(id: &str, timestamp: &str, action: &str, resource: &str, digest: &str, key: &[u8]) -> String {
    let signing_key = SigningKey::derive(key, [id, timestamp, action, resource]);
    let string_to_sign = framing::join([id, timestamp, action, resource, digest]);
    signing_key.sign_base64(string_to_sign)
}
