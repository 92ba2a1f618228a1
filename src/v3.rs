//! Nonce based freshness tokens.
//!
//! These tokens carry no request context other than the body digest. Each one embeds a fresh random
//! nonce that is folded into the signing key, which makes tokens for identical requests
//! unlinkable. The nonce isn't checked for reuse: within the validity window a token can be
//! replayed.
//!
//! The token has the form `id:timestamp:nonce:digest:signature`.

use crate::{
    config::{AuthPolicy, TokenParameters},
    crypto::{constant_time_eq, digest, SigningKey},
    error::{trace_outcome, validate_condition, InvalidTokenKind, TokenizeError, ValidationError},
    framing,
    keys::KeyLookup,
    nonce::nonce_string,
    time::{format_timestamp, validate_timestamp},
};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, CryptoRng, RngCore};

const SCHEME: &str = "v3";

/// Create a token for a request body.
pub fn tokenize(
    id: &str,
    issued_at: DateTime<Utc>,
    body: &[u8],
    key: &[u8],
    policy: &AuthPolicy,
) -> Result<String, TokenizeError> {
    tokenize_with_rng(&mut OsRng, id, issued_at, body, key, policy)
}

/// Create a token for a request body, drawing the nonce from the given random source.
pub fn tokenize_with_rng<R>(
    rng: &mut R,
    id: &str,
    issued_at: DateTime<Utc>,
    body: &[u8],
    key: &[u8],
    policy: &AuthPolicy,
) -> Result<String, TokenizeError>
where
    R: RngCore + CryptoRng,
{
    policy.validate()?;
    let nonce = nonce_string(rng, policy.nonce_size)?;
    let timestamp = format_timestamp(issued_at);
    let digest = digest(body);
    let signature = sign(id, &timestamp, &nonce, &digest, key);
    Ok(framing::join([id, timestamp.as_str(), nonce.as_str(), digest.as_str(), signature.as_str()]))
}

/// Validate a token against the request body it was presented with.
///
/// The nonce is taken from the token as is.
pub fn validate<L>(token: &str, lookup: &L, body: &[u8], parameters: &TokenParameters) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let result = validate_token(token, lookup, body, parameters);
    trace_outcome(SCHEME, framing::leading_field(token), &result);
    result
}

fn validate_token<L>(
    token: &str,
    lookup: &L,
    body: &[u8],
    parameters: &TokenParameters,
) -> Result<(), ValidationError>
where
    L: KeyLookup + ?Sized,
{
    let [id, timestamp, nonce, token_digest, signature] = framing::split_exact(token)?;

    validate_timestamp(timestamp, parameters)?;
    validate_condition(token_digest == digest(body), InvalidTokenKind::DigestMismatch)?;

    let key = lookup.lookup_key(id)?;
    let expected = sign(id, timestamp, nonce, token_digest, key.as_bytes());
    let matches = constant_time_eq(signature.as_bytes(), expected.as_bytes());
    validate_condition(matches, InvalidTokenKind::SignatureMismatch)
}

// The digest is signed but doesn't take part in the key derivation.
fn sign(id: &str, timestamp: &str, nonce: &str, digest: &str, key: &[u8]) -> String {
    let signing_key = SigningKey::derive(key, [id, timestamp, nonce]);
    let string_to_sign = framing::join([id, timestamp, nonce, digest]);
    signing_key.sign_base64(string_to_sign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::{from_base64, hmac256, to_base64},
        fixtures::{after, key_store, replace_field, tamper, FailingRng, OTHER_ID, OTHER_KEY, T0, USER_ID, USER_KEY},
    };
    use rstest::rstest;

    const BODY: &[u8] = b"{'burger':'fries'}";

    fn user_token() -> String {
        tokenize(USER_ID, *T0, BODY, USER_KEY, &AuthPolicy::default()).expect("tokenize failed")
    }

    #[test]
    fn token_layout() {
        let token = user_token();
        let [id, timestamp, nonce, digest_field, _] = framing::split_exact(&token).expect("wrong field count");
        assert_eq!(id, USER_ID);
        assert_eq!(timestamp, "20250225T144915Z");
        assert_eq!(from_base64(nonce).expect("invalid nonce").len(), 32);
        assert_eq!(digest_field, digest(BODY));
    }

    #[test]
    fn signature_uses_derived_key() {
        let token = user_token();
        let [_, timestamp, nonce, digest_field, signature] = framing::split_exact(&token).unwrap();
        let signing_key = hmac256(hmac256(hmac256(USER_KEY, USER_ID), timestamp), nonce);
        let string_to_sign = format!("{USER_ID}:{timestamp}:{nonce}:{digest_field}");
        assert_eq!(signature, to_base64(hmac256(signing_key, string_to_sign)));
    }

    #[test]
    fn round_trip() {
        validate(&user_token(), &key_store(), BODY, &after(0)).expect("validation failed");
    }

    #[test]
    fn policy_nonce_size() {
        let policy = AuthPolicy { nonce_size: 16, ..Default::default() };
        let token = tokenize(USER_ID, *T0, BODY, USER_KEY, &policy).expect("tokenize failed");
        let [_, _, nonce, _, _] = framing::split_exact(&token).unwrap();
        assert_eq!(from_base64(nonce).unwrap().len(), 16);
        validate(&token, &key_store(), BODY, &after(0)).expect("validation failed");
    }

    #[rstest]
    #[case::empty_nonce(AuthPolicy { nonce_size: 0, ..Default::default() })]
    #[case::huge_nonce(AuthPolicy { nonce_size: usize::MAX, ..Default::default() })]
    #[case::negative_window(AuthPolicy { validity_window: chrono::TimeDelta::hours(-1), ..Default::default() })]
    fn invalid_policy(#[case] policy: AuthPolicy) {
        let err = tokenize(USER_ID, *T0, BODY, USER_KEY, &policy).expect_err("tokenize succeeded");
        assert!(matches!(err, TokenizeError::Policy(_)));
    }

    #[test]
    fn nonces_make_tokens_unique() {
        let first = user_token();
        let second = user_token();
        let [.., first_nonce, _, first_signature] = framing::split_exact::<5>(&first).unwrap();
        let [.., second_nonce, _, second_signature] = framing::split_exact::<5>(&second).unwrap();
        assert_ne!(first_nonce, second_nonce);
        assert_ne!(first_signature, second_signature);
    }

    #[test]
    fn rng_failure() {
        let err = tokenize_with_rng(&mut FailingRng, USER_ID, *T0, BODY, USER_KEY, &AuthPolicy::default())
            .expect_err("tokenize succeeded");
        assert!(matches!(err, TokenizeError::Nonce(_)));
    }

    #[test]
    fn wrong_body() {
        let err = validate(&user_token(), &key_store(), b"{}", &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::DigestMismatch));
    }

    #[rstest]
    #[case::issuance(0, true)]
    #[case::before_window_end(3599, true)]
    #[case::after_window_end(3601, false)]
    fn window(#[case] elapsed: i64, #[case] valid: bool) {
        let result = validate(&user_token(), &key_store(), BODY, &after(elapsed));
        assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn tampered_signature() {
        let token = user_token();
        let signature = token.rsplit(':').next().unwrap();
        for index in 0..signature.len() - 1 {
            let token = replace_field(&token, 4, &tamper(signature, index));
            let err = validate(&token, &key_store(), BODY, &after(0)).expect_err("validated");
            assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::SignatureMismatch));
        }
    }

    #[test]
    fn tampered_nonce() {
        let token = user_token();
        let [_, _, nonce, _, _] = framing::split_exact(&token).unwrap();
        let token = replace_field(&token, 2, &tamper(nonce, 0));
        let err = validate(&token, &key_store(), BODY, &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::SignatureMismatch));
    }

    #[test]
    fn tampered_timestamp() {
        let token = replace_field(&user_token(), 1, &format_timestamp(*T0 + chrono::TimeDelta::seconds(1)));
        let err = validate(&token, &key_store(), BODY, &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::SignatureMismatch));
    }

    #[test]
    fn tampered_digest_with_matching_body() {
        // The attacker swaps in the digest of their own body and sends that body along.
        let forged_body = b"{'burger':'salad'}";
        let token = replace_field(&user_token(), 3, &digest(forged_body));
        let err = validate(&token, &key_store(), forged_body, &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::SignatureMismatch));
    }

    #[test]
    fn key_scoping() {
        let token = tokenize(OTHER_ID, *T0, BODY, USER_KEY, &AuthPolicy::default()).unwrap();
        let err = validate(&token, &key_store(), BODY, &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::SignatureMismatch));

        let token = tokenize(OTHER_ID, *T0, BODY, OTHER_KEY, &AuthPolicy::default()).unwrap();
        validate(&token, &key_store(), BODY, &after(0)).expect("validation failed");
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_few("user-1:20250225T144915Z:nonce:digest")]
    #[case::too_many("user-1:20250225T144915Z:nonce:digest:sig:extra")]
    fn malformed(#[case] token: &str) {
        let err = validate(token, &key_store(), BODY, &after(0)).expect_err("validated");
        assert_eq!(err.invalid_kind(), Some(InvalidTokenKind::Malformed));
    }
}
