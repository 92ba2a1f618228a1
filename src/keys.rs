use std::{collections::HashMap, error::Error, fmt};
use zeroize::Zeroizing;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A secret key owned by whoever maps identities to keys.
///
/// The bytes are wiped from memory when the key is dropped.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Construct a secret key from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for SecretKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for SecretKey {
    fn from(bytes: &[u8; N]) -> Self {
        Self::new(bytes.to_vec())
    }
}

/// A capability that resolves an identity into its secret key.
///
/// This is typically backed by a database and may block. Any error it returns is handed back to
/// the caller of `validate` untouched.
pub trait KeyLookup {
    /// Look up the secret key for the given identity.
    fn lookup_key(&self, id: &str) -> Result<SecretKey, KeyLookupError>;
}

impl<F, K, E> KeyLookup for F
where
    F: Fn(&str) -> Result<K, E>,
    K: Into<SecretKey>,
    E: Into<BoxError>,
{
    fn lookup_key(&self, id: &str) -> Result<SecretKey, KeyLookupError> {
        self(id).map(Into::into).map_err(KeyLookupError::new)
    }
}

/// An error produced by a [`KeyLookup`].
///
/// This wraps the lookup's own error as is; use [`KeyLookupError::downcast_ref`] or
/// [`KeyLookupError::into_inner`] to get it back.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct KeyLookupError(BoxError);

impl KeyLookupError {
    /// Wrap a lookup error.
    pub fn new<E: Into<BoxError>>(error: E) -> Self {
        Self(error.into())
    }

    /// Attempt to view the wrapped error as a concrete type.
    pub fn downcast_ref<T: Error + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Get the wrapped error.
    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

/// A key lookup backed by an in-memory map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryKeyStore {
    keys: HashMap<String, SecretKey>,
}

impl InMemoryKeyStore {
    /// Construct an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key for an identity, replacing any existing one.
    pub fn insert<K: Into<SecretKey>>(&mut self, id: impl Into<String>, key: K) {
        self.keys.insert(id.into(), key.into());
    }

    /// Add a key for an identity.
    pub fn with_key<K: Into<SecretKey>>(mut self, id: impl Into<String>, key: K) -> Self {
        self.insert(id, key);
        self
    }
}

impl KeyLookup for InMemoryKeyStore {
    fn lookup_key(&self, id: &str) -> Result<SecretKey, KeyLookupError> {
        self.keys.get(id).cloned().ok_or_else(|| KeyLookupError::new(UnknownIdentity(id.to_string())))
    }
}

/// The identity has no key registered.
#[derive(Debug, thiserror::Error)]
#[error("identity not found: {0}")]
pub struct UnknownIdentity(pub String);
