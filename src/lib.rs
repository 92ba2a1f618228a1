//! Stateless request authentication with shared secret keys.
//!
//! Each identity owns a secret key which never travels on the wire. A token proves that its holder
//! knows the key and, depending on the scheme, binds that proof to a time window and to the request
//! it was issued for. The server keeps no per token state: it only needs to map identities to keys
//! through a [`KeyLookup`].
//!
//! Four schemes are available:
//!
//! * [`v1`]: bound to a fixed action, resource, and request body.
//! * [`v2`]: bound to an arbitrary, ordered list of strings agreed upon by both sides.
//! * [`v3`]: bound to the request body, with a random nonce so that no two tokens look alike.
//! * [`v4`]: a self-describing claim set with a role, a token type, and an expiry.
//!
//! Tokens from different schemes aren't interchangeable; the verifier picks the scheme.

pub mod config;
pub mod crypto;
pub mod error;
pub mod framing;
pub mod keys;
pub mod nonce;
pub mod time;
pub mod v1;
pub mod v2;
pub mod v3;
pub mod v4;

#[cfg(test)]
mod fixtures;

pub use config::{AuthPolicy, PolicyError, TokenParameters};
pub use error::{InvalidTokenKind, TokenizeError, ValidationError};
pub use keys::{InMemoryKeyStore, KeyLookup, KeyLookupError, SecretKey, UnknownIdentity};
