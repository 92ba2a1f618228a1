//! Hashing, keyed hashing, and encoding primitives shared by every scheme.

use base64::{prelude::BASE64_STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Compute the SHA-256 hash of some bytes.
pub fn hash256<T: AsRef<[u8]>>(data: T) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute the SHA-256 hash of some bytes and encode it in base64.
///
/// This is used to bind a request body to a token without sending the body inside it.
pub fn digest<T: AsRef<[u8]>>(data: T) -> String {
    to_base64(hash256(data))
}

/// Compute the HMAC-SHA256 of some bytes.
pub fn hmac256<K, T>(key: K, data: T) -> [u8; 32]
where
    K: AsRef<[u8]>,
    T: AsRef<[u8]>,
{
    // HMAC accepts keys of any length so this can't fail.
    let mut mac = HmacSha256::new_from_slice(key.as_ref()).expect("HMAC key of any size");
    mac.update(data.as_ref());
    mac.finalize().into_bytes().into()
}

/// A context scoped signing key.
///
/// This is derived from a root secret by folding a sequence of fields into it, one keyed hash at a
/// time:
///
/// ```text
/// k0 = root
/// k1 = hmac(k0, fields[0])
/// ...
/// kn = hmac(kn-1, fields[n-1])
/// ```
///
/// Holding the key for one context reveals neither the root nor the key for any other context.
/// The order of the fields matters.
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    /// Derive a signing key from the given root key and fields.
    pub fn derive<I>(root: &[u8], fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let key = fields.into_iter().fold(Zeroizing::new(root.to_vec()), |key, field| {
            Zeroizing::new(hmac256(key.as_slice(), field).to_vec())
        });
        Self(key)
    }

    /// Sign the given data.
    pub fn sign<T: AsRef<[u8]>>(&self, data: T) -> [u8; 32] {
        hmac256(self.0.as_slice(), data)
    }

    /// Sign the given data and encode the signature in base64.
    pub fn sign_base64<T: AsRef<[u8]>>(&self, data: T) -> String {
        to_base64(self.sign(data))
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Compare two byte strings in constant time.
///
/// Inputs of different lengths compare unequal; the length itself is not treated as secret.
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.ct_eq(right).into()
}

/// Encode bytes using standard, padded base64.
pub fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_STANDARD.encode(input)
}

/// Decode standard, padded base64.
pub fn from_base64<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_STANDARD.decode(input)
}
