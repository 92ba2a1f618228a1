use crate::nonce::NONCE_SIZE;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

/// The default validity window for issued tokens, in seconds.
pub const VALIDITY_WINDOW_SECONDS: i64 = 60 * 60;

/// The smallest accepted size, in bytes, of string nonces.
pub const MIN_NONCE_SIZE: usize = 16;

/// The largest accepted size, in bytes, of string nonces.
pub const MAX_NONCE_SIZE: usize = 1024;

/// The policy that tokens are issued and validated under.
///
/// Several policies can coexist in a single process; nothing here is global. A policy can be loaded
/// from JSON, with durations expressed in seconds:
///
/// ```json
/// { "validity_window": 900, "nonce_size": 32, "max_future_skew": 30 }
/// ```
///
/// Deserialized policies are always checked with [`AuthPolicy::validate`].
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDocument")]
pub struct AuthPolicy {
    /// How long a token is valid for after it's issued.
    #[serde_as(as = "DurationSeconds<i64>")]
    pub validity_window: TimeDelta,

    /// The size, in bytes, of string nonces.
    pub nonce_size: usize,

    /// How far ahead of the current time an issuance timestamp may be.
    ///
    /// When unset, timestamps in the future are accepted, leaving clock skew between issuer and
    /// verifier unbounded.
    #[serde_as(as = "Option<DurationSeconds<i64>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_future_skew: Option<TimeDelta>,
}

impl AuthPolicy {
    /// Load a policy from its JSON representation.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Check that this policy can be used to issue and validate tokens.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.validity_window <= TimeDelta::zero() {
            return Err(PolicyError::ValidityWindow);
        }
        if !(MIN_NONCE_SIZE..=MAX_NONCE_SIZE).contains(&self.nonce_size) {
            return Err(PolicyError::NonceSize(self.nonce_size));
        }
        if self.max_future_skew.is_some_and(|skew| skew < TimeDelta::zero()) {
            return Err(PolicyError::FutureSkew);
        }
        Ok(())
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            validity_window: TimeDelta::seconds(VALIDITY_WINDOW_SECONDS),
            nonce_size: NONCE_SIZE,
            max_future_skew: None,
        }
    }
}

impl TryFrom<PolicyDocument> for AuthPolicy {
    type Error = PolicyError;

    fn try_from(document: PolicyDocument) -> Result<Self, Self::Error> {
        let PolicyDocument { validity_window, nonce_size, max_future_skew } = document;
        let policy = Self { validity_window, nonce_size, max_future_skew };
        policy.validate()?;
        Ok(policy)
    }
}

// The unchecked wire form of a policy.
#[serde_as]
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicyDocument {
    #[serde_as(as = "DurationSeconds<i64>")]
    validity_window: TimeDelta,
    nonce_size: usize,
    #[serde_as(as = "Option<DurationSeconds<i64>>")]
    max_future_skew: Option<TimeDelta>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        let AuthPolicy { validity_window, nonce_size, max_future_skew } = AuthPolicy::default();
        Self { validity_window, nonce_size, max_future_skew }
    }
}

/// A policy that can't be used.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("validity window must be positive")]
    ValidityWindow,

    #[error("nonce size must be between {MIN_NONCE_SIZE} and {MAX_NONCE_SIZE} bytes, got {0}")]
    NonceSize(usize),

    #[error("future skew must not be negative")]
    FutureSkew,
}

/// Parameters to be used when issuing and validating tokens.
#[derive(Clone, Debug)]
pub struct TokenParameters {
    /// The timestamp to use for temporal checks and expiry computation.
    pub current_time: DateTime<Utc>,

    /// The policy to apply.
    pub policy: AuthPolicy,
}

impl TokenParameters {
    /// Construct parameters for the given instant under the default policy.
    pub fn at(current_time: DateTime<Utc>) -> Self {
        Self { current_time, policy: Default::default() }
    }

    /// Use the given policy.
    pub fn with_policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for TokenParameters {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}
