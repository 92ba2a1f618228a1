//! Secure nonce generation.
//!
//! Every function takes the random source explicitly. The `os_*` shorthands use [`OsRng`], a
//! zero-sized handle over the operating system's generator that can be used from any number of
//! threads at once without synchronization.

use crate::crypto::to_base64;
use rand::{rngs::OsRng, CryptoRng, RngCore};

/// The default nonce size, in bytes, for byte and string nonces.
pub const NONCE_SIZE: usize = 32;

/// The random source failed to produce a nonce.
#[derive(Debug, thiserror::Error)]
#[error("can't generate nonce: {0}")]
pub struct NonceError(#[from] rand::Error);

/// Generate a nonce of the given size.
pub fn nonce_bytes<R>(rng: &mut R, size: usize) -> Result<Vec<u8>, NonceError>
where
    R: RngCore + CryptoRng,
{
    let mut nonce = vec![0; size];
    rng.try_fill_bytes(&mut nonce)?;
    Ok(nonce)
}

/// Generate a nonce of the given size and encode it in base64.
pub fn nonce_string<R>(rng: &mut R, size: usize) -> Result<String, NonceError>
where
    R: RngCore + CryptoRng,
{
    nonce_bytes(rng, size).map(to_base64)
}

/// Generate a 64 bit nonce.
pub fn nonce_u64<R>(rng: &mut R) -> Result<u64, NonceError>
where
    R: RngCore + CryptoRng,
{
    let mut bytes = [0; 8];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Generate a nonce of the given size using the operating system's generator.
pub fn os_nonce_string(size: usize) -> Result<String, NonceError> {
    nonce_string(&mut OsRng, size)
}

/// Generate a 64 bit nonce using the operating system's generator.
pub fn os_nonce_u64() -> Result<u64, NonceError> {
    nonce_u64(&mut OsRng)
}
