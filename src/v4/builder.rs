use super::claims::{AuthClaims, TokenType, CLAIMS_VERSION};
use crate::{
    config::TokenParameters,
    crypto::{hmac256, to_base64},
    error::TokenizeError,
    framing,
    nonce::nonce_u64,
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{rngs::OsRng, CryptoRng, RngCore};

/// A structured token builder.
#[derive(Clone, Debug)]
pub struct ClaimTokenBuilder {
    id: String,
    role: String,
    token_type: TokenType,
    expiry: Option<Expiry>,
    nonce: Option<u64>,
}

#[derive(Clone, Copy, Debug)]
enum Expiry {
    At(DateTime<Utc>),
    In(TimeDelta),
}

impl ClaimTokenBuilder {
    /// Construct a new builder.
    pub fn new(id: impl Into<String>, role: impl Into<String>, token_type: TokenType) -> Self {
        Self { id: id.into(), role: role.into(), token_type, expiry: None, nonce: None }
    }

    /// Make this an access token.
    pub fn access(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self::new(id, role, TokenType::Access)
    }

    /// Make this a refresh token.
    pub fn refresh(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self::new(id, role, TokenType::Refresh)
    }

    /// Set the expiration time for this token.
    pub fn expires_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.expiry = Some(Expiry::At(timestamp));
        self
    }

    /// Set the expiration time as an offset from `current_time` in the parameters passed at build
    /// time.
    pub fn expires_in(mut self, offset: TimeDelta) -> Self {
        self.expiry = Some(Expiry::In(offset));
        self
    }

    /// Set the nonce for this token.
    ///
    /// When unset, a random one is generated at build time.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Build a token, using the given parameters for the expiration time unless one was set.
    pub fn build(self, key: &[u8], parameters: &TokenParameters) -> Result<String, TokenizeError> {
        self.build_with_rng(&mut OsRng, key, parameters)
    }

    /// Build a token, drawing the nonce from the given random source if one is needed.
    pub fn build_with_rng<R>(
        self,
        rng: &mut R,
        key: &[u8],
        parameters: &TokenParameters,
    ) -> Result<String, TokenizeError>
    where
        R: RngCore + CryptoRng,
    {
        parameters.policy.validate()?;
        let Self { id, role, token_type, expiry, nonce } = self;
        let nonce = match nonce {
            Some(nonce) => nonce,
            None => nonce_u64(rng)?,
        };
        let from_now = |delta: TimeDelta| {
            parameters.current_time.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
        };
        let expires_at = match expiry {
            Some(Expiry::At(timestamp)) => timestamp,
            Some(Expiry::In(delta)) => from_now(delta),
            None => from_now(parameters.policy.validity_window),
        };
        let claims = AuthClaims { version: CLAIMS_VERSION, token_type, nonce, expires_at, id, role };

        let payload = rmp_serde::to_vec_named(&claims)?;
        let payload_b64 = to_base64(&payload);
        let signature_b64 = to_base64(hmac256(key, &payload));
        Ok(framing::join([claims.id.as_str(), payload_b64.as_str(), signature_b64.as_str()]))
    }
}
