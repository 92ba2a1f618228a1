//! Structured claim tokens.
//!
//! Rather than positional context fields, these tokens carry a versioned, typed claim set (see
//! [`AuthClaims`]) serialized as MessagePack and signed as a single unit with a flat HMAC over the
//! raw secret key. The token has the form `id:base64(claims):base64(signature)`.
//!
//! The signature is always checked against the raw claim bytes before they are deserialized.

mod builder;
mod claims;

use crate::{
    config::TokenParameters,
    crypto::{constant_time_eq, from_base64, hmac256},
    error::{trace_outcome, validate_condition, InvalidTokenKind, TokenizeError, ValidationError},
    framing,
    keys::KeyLookup,
};

pub use builder::ClaimTokenBuilder;
pub use claims::{AuthClaims, TokenType, UnknownTokenType, CLAIMS_VERSION};

const SCHEME: &str = "v4";

/// Create an access token for an identity and role.
///
/// The token expires one validity window after `parameters.current_time`.
pub fn tokenize(id: &str, role: &str, key: &[u8], parameters: &TokenParameters) -> Result<String, TokenizeError> {
    ClaimTokenBuilder::access(id, role).build(key, parameters)
}

/// Validate a token and return its claims.
pub fn validate<L>(token: &str, lookup: &L, parameters: &TokenParameters) -> Result<AuthClaims, ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let result = validate_token(token, lookup, parameters);
    trace_outcome(SCHEME, framing::leading_field(token), &result);
    result
}

fn validate_token<L>(token: &str, lookup: &L, parameters: &TokenParameters) -> Result<AuthClaims, ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let [id, payload, signature] = framing::split_exact(token)?;
    let key = lookup.lookup_key(id)?;

    let payload = from_base64(payload).map_err(|_| InvalidTokenKind::Malformed)?;
    let signature = from_base64(signature).map_err(|_| InvalidTokenKind::Malformed)?;
    let expected = hmac256(key.as_bytes(), &payload);
    validate_condition(constant_time_eq(&signature, &expected), InvalidTokenKind::SignatureMismatch)?;

    // Only authenticated bytes make it this far.
    let claims: AuthClaims = rmp_serde::from_slice(&payload).map_err(|_| InvalidTokenKind::Malformed)?;
    validate_condition(claims.version == CLAIMS_VERSION, InvalidTokenKind::UnsupportedVersion)?;
    validate_condition(claims.id == id, InvalidTokenKind::IdentityMismatch)?;
    validate_condition(claims.expires_at >= parameters.current_time, InvalidTokenKind::ClaimsExpired)?;
    Ok(claims)
}
