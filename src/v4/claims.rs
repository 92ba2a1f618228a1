use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only claims version currently supported.
pub const CLAIMS_VERSION: u8 = 1;

/// The claims signed into a structured token.
///
/// These are serialized as a MessagePack map keyed by single letters to keep tokens short.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthClaims {
    /// The claims version.
    #[serde(rename = "a")]
    pub version: u8,

    /// The type of token.
    #[serde(rename = "b")]
    pub token_type: TokenType,

    /// A random value that makes every token unique.
    #[serde(rename = "c")]
    pub nonce: u64,

    /// The timestamp at which this token becomes invalid.
    #[serde(rename = "d", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// The identity this token was issued to.
    #[serde(rename = "e")]
    pub id: String,

    /// The role granted to the identity.
    #[serde(rename = "f")]
    pub role: String,
}

impl AuthClaims {
    /// Whether these claims belong to an access token.
    pub fn is_access(&self) -> bool {
        self.token_type == TokenType::Access
    }

    /// Whether these claims belong to a refresh token.
    pub fn is_refresh(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}

/// The type of a structured token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TokenType {
    /// A token used to access resources.
    Access,

    /// A token used to obtain new access tokens.
    Refresh,
}

impl From<TokenType> for u8 {
    fn from(token_type: TokenType) -> Self {
        match token_type {
            TokenType::Access => 0,
            TokenType::Refresh => 1,
        }
    }
}

impl TryFrom<u8> for TokenType {
    type Error = UnknownTokenType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Access),
            1 => Ok(Self::Refresh),
            other => Err(UnknownTokenType(other)),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// An unknown token type tag.
#[derive(Debug, thiserror::Error)]
#[error("unknown token type: {0}")]
pub struct UnknownTokenType(pub u8);
