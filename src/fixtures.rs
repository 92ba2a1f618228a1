use crate::{
    config::TokenParameters,
    keys::{InMemoryKeyStore, SecretKey},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{CryptoRng, RngCore};
use std::sync::LazyLock;

/// A fixed issuance instant, on a whole second.
pub(crate) static T0: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| DateTime::from_timestamp(1740494955, 0).expect("valid timestamp"));

pub(crate) const USER_ID: &str = "user-1";
pub(crate) const USER_KEY: &[u8] = b"secret";
pub(crate) const OTHER_ID: &str = "user-2";
pub(crate) const OTHER_KEY: &[u8] = b"another secret";

/// A key store that knows about `USER_ID` and `OTHER_ID`.
pub(crate) fn key_store() -> InMemoryKeyStore {
    InMemoryKeyStore::new().with_key(USER_ID, USER_KEY).with_key(OTHER_ID, OTHER_KEY)
}

/// A lookup that hands out the same key regardless of the identity.
pub(crate) fn fixed_key(key: &'static [u8]) -> impl Fn(&str) -> Result<SecretKey, &'static str> {
    move |_: &str| Ok(SecretKey::from(key))
}

/// Parameters for `elapsed` seconds after `T0`.
pub(crate) fn after(elapsed: i64) -> TokenParameters {
    TokenParameters::at(*T0 + TimeDelta::seconds(elapsed))
}

/// Flip one character of a token field so the result is still valid base64.
pub(crate) fn tamper(field: &str, index: usize) -> String {
    let mut chars: Vec<char> = field.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

/// Replace the field at `index` in a colon delimited token.
pub(crate) fn replace_field(token: &str, index: usize, value: &str) -> String {
    let mut fields: Vec<&str> = token.split(':').collect();
    fields[index] = value;
    fields.join(":")
}

/// A random source that always fails.
pub(crate) struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("entropy source unavailable")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("entropy source unavailable")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("entropy source unavailable")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}
