//! Symmetric encryption keys for XChaCha20-Poly1305.

use std::fmt;

use chacha20poly1305::aead::{KeyInit, OsRng};
use chacha20poly1305::XChaCha20Poly1305;
use hkdf::Hkdf;
use sha2::Sha256;

use super::error::{CryptoError, CryptoResult};

/// Length in bytes of an XChaCha20-Poly1305 key.
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric encryption key.
///
/// The inner bytes are never exposed through `Debug` to avoid accidentally
/// leaking key material into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Generates a new random key using the operating system's CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let key = XChaCha20Poly1305::generate_key(&mut OsRng);
        Self(key.into())
    }

    /// Builds a key from a raw byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] if `bytes` is not exactly
    /// [`KEY_SIZE`] bytes long.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self(array))
    }

    /// Derives a key from a secret and salt using HKDF-SHA256.
    ///
    /// Useful for turning a passphrase or shared secret into a key suitable
    /// for [`super::encrypt`] without storing the raw secret anywhere.
    #[must_use]
    pub fn derive(secret: &[u8], salt: &[u8], info: &[u8]) -> Self {
        let hk = Hkdf::<Sha256>::new(Some(salt), secret);
        let mut okm = [0u8; KEY_SIZE];
        hk.expand(info, &mut okm)
            .expect("HKDF output length is within the allowed range");
        Self(okm)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptionKey").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_keys() {
        let a = EncryptionKey::generate();
        let b = EncryptionKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let short = vec![0u8; 16];
        assert!(matches!(
            EncryptionKey::from_bytes(&short),
            Err(CryptoError::InvalidKeyLength)
        ));
    }

    #[test]
    fn from_bytes_roundtrips() {
        let key = EncryptionKey::generate();
        let rebuilt = EncryptionKey::from_bytes(key.as_bytes()).unwrap();
        assert_eq!(key, rebuilt);
    }

    #[test]
    fn derive_is_deterministic() {
        let a = EncryptionKey::derive(b"secret", b"salt", b"nvisy-core");
        let b = EncryptionKey::derive(b"secret", b"salt", b"nvisy-core");
        assert_eq!(a, b);
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = EncryptionKey::generate();
        assert_eq!(format!("{key:?}"), "EncryptionKey(\"<redacted>\")");
    }
}
