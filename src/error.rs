use crate::{config::PolicyError, keys::KeyLookupError, nonce::NonceError};
use std::fmt;

/// An error during the validation of a token.
///
/// Every reason a token can be rejected collapses into [`ValidationError::Invalid`], whose display
/// text never reveals which check failed. Key lookup failures are kept apart so callers can tell an
/// unknown identity from a bad token.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid token")]
    Invalid(InvalidTokenKind),

    #[error("{0}")]
    KeyLookup(KeyLookupError),
}

impl ValidationError {
    /// The reason the token was rejected, if it was rejected for being invalid.
    ///
    /// This is meant for local diagnostics and should not be echoed back to the token holder.
    pub fn invalid_kind(&self) -> Option<InvalidTokenKind> {
        match self {
            Self::Invalid(kind) => Some(*kind),
            Self::KeyLookup(_) => None,
        }
    }
}

impl From<InvalidTokenKind> for ValidationError {
    fn from(kind: InvalidTokenKind) -> Self {
        Self::Invalid(kind)
    }
}

impl From<KeyLookupError> for ValidationError {
    fn from(error: KeyLookupError) -> Self {
        Self::KeyLookup(error)
    }
}

/// A reason a token was considered invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidTokenKind {
    ActionMismatch,
    ClaimsExpired,
    DigestMismatch,
    EntropyMismatch,
    IdentityMismatch,
    Malformed,
    ResourceMismatch,
    SignatureMismatch,
    TimestampExpired,
    TimestampInFuture,
    UnsupportedVersion,
}

impl fmt::Display for InvalidTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use InvalidTokenKind::*;
        let text = match self {
            ActionMismatch => "action does not match",
            ClaimsExpired => "claims are expired",
            DigestMismatch => "body digest does not match",
            EntropyMismatch => "entropy does not match",
            IdentityMismatch => "embedded identity does not match outer identity",
            Malformed => "token is malformed",
            ResourceMismatch => "resource does not match",
            SignatureMismatch => "signature does not match",
            TimestampExpired => "timestamp is outside the validity window",
            TimestampInFuture => "timestamp is too far in the future",
            UnsupportedVersion => "unsupported claims version",
        };
        write!(f, "{text}")
    }
}

/// An error when issuing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("can't encode claims: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

pub(crate) fn validate_condition(condition: bool, kind: InvalidTokenKind) -> Result<(), ValidationError> {
    if condition { Ok(()) } else { Err(ValidationError::Invalid(kind)) }
}

/// Log the outcome of a validation without exposing anything secret.
pub(crate) fn trace_outcome<T>(scheme: &'static str, id: Option<&str>, result: &Result<T, ValidationError>) {
    match result {
        Ok(_) => tracing::trace!(scheme, id, "token accepted"),
        Err(ValidationError::Invalid(kind)) => tracing::debug!(scheme, id, reason = %kind, "token rejected"),
        Err(ValidationError::KeyLookup(e)) => tracing::debug!(scheme, id, error = %e, "key lookup failed"),
    }
}
