//! Credential entities
//!
//! The API key is stored as `base64(iv || "::" || ciphertext)` where the
//! ciphertext is AES-256-GCM under a key derived from the installation's
//! master secret.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of the derived AES-256 key in bytes
const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce (IV) in bytes
pub const IV_SIZE: usize = 12;

/// Separator between IV and ciphertext inside the encoded value
pub const IV_MARKER: &[u8] = b"::";

/// Symmetric key derived from the master secret
///
/// Derived per operation and dropped (zeroized) right after.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// SHA-256 of the master secret
    pub fn derive(master_secret: &str) -> Self {
        let digest = Sha256::digest(master_secret.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Plaintext API key, zeroized on drop and redacted in debug output
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// An absent key
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Short preview safe to show to an administrator (e.g. "***1234")
    pub fn redacted(&self) -> String {
        let chars: Vec<char> = self.inner.chars().collect();
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("***{}", tail)
        } else {
            "***".to_string()
        }
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("inner", &"[REDACTED]")
            .finish()
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

/// Encoded, encrypted form of the API key as persisted
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedSecret(String);

impl EncryptedSecret {
    /// Wrap a value read back from storage
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encrypt `plain` with a fresh IV
    ///
    /// An empty input encodes to an empty value. If the cipher fails the
    /// plaintext is only base64-encoded; that value still decodes through
    /// [`EncryptedSecret::open`] but offers no confidentiality.
    pub fn seal(plain: &str, key: &DerivedKey) -> Self {
        if plain.is_empty() {
            return Self::default();
        }

        match seal_bytes(plain.as_bytes(), key) {
            Ok(bytes) => Self(STANDARD.encode(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "Cipher unavailable, storing API key base64-encoded only");
                Self(STANDARD.encode(plain.as_bytes()))
            }
        }
    }

    /// Recover the plaintext
    ///
    /// Never fails. A value that is not base64 comes back unchanged; a value
    /// that decodes but does not decrypt comes back as the decoded bytes.
    /// The latter keeps keys written before encryption readable, and also
    /// means a corrupted ciphertext surfaces as a (wrong) key rather than an
    /// error.
    pub fn open(&self, key: &DerivedKey) -> SecretValue {
        if self.0.is_empty() {
            return SecretValue::empty();
        }

        let Ok(decoded) = STANDARD.decode(self.0.as_bytes()) else {
            return SecretValue::new(self.0.clone());
        };

        if let Some(plain) = open_bytes(&decoded, key)
            && let Ok(text) = String::from_utf8(plain)
        {
            return SecretValue::new(text);
        }

        tracing::debug!("Stored API key did not decrypt, using decoded value as-is");
        SecretValue::new(String::from_utf8_lossy(&decoded).into_owned())
    }
}

impl std::fmt::Debug for EncryptedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EncryptedSecret")
            .field(&format!("{} bytes", self.0.len()))
            .finish()
    }
}

/// `iv || "::" || AES-256-GCM(plain)`
pub(crate) fn seal_bytes(plain: &[u8], key: &DerivedKey) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plain)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(IV_SIZE + IV_MARKER.len() + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(IV_MARKER);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`seal_bytes`]; `None` when the layout or tag does not check out
pub(crate) fn open_bytes(decoded: &[u8], key: &DerivedKey) -> Option<Vec<u8>> {
    let header = IV_SIZE + IV_MARKER.len();
    if decoded.len() <= header || &decoded[IV_SIZE..header] != IV_MARKER {
        return None;
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).ok()?;
    cipher
        .decrypt(Nonce::from_slice(&decoded[..IV_SIZE]), &decoded[header..])
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_key_is_deterministic() {
        let a = DerivedKey::derive("installation-salt");
        let b = DerivedKey::derive("installation-salt");
        let c = DerivedKey::derive("other-salt");

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
        assert_eq!(a.as_bytes().len(), KEY_SIZE);
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = DerivedKey::derive("installation-salt");
        for plain in ["abc123", "sk-live-0123456789abcdef", "ключ-🔑", "a"] {
            let sealed = EncryptedSecret::seal(plain, &key);
            assert_ne!(sealed.as_str(), plain);
            assert_eq!(sealed.open(&key).as_str(), plain);
        }
    }

    #[test]
    fn test_seal_uses_fresh_iv() {
        let key = DerivedKey::derive("installation-salt");
        let first = EncryptedSecret::seal("abc123", &key);
        let second = EncryptedSecret::seal("abc123", &key);
        assert_ne!(first, second);

        let first_iv = &STANDARD.decode(first.as_str()).unwrap()[..IV_SIZE];
        let second_iv = &STANDARD.decode(second.as_str()).unwrap()[..IV_SIZE];
        assert_ne!(first_iv, second_iv);
    }

    #[test]
    fn test_sealed_layout_has_marker() {
        let key = DerivedKey::derive("installation-salt");
        let sealed = EncryptedSecret::seal("abc123", &key);
        let decoded = STANDARD.decode(sealed.as_str()).unwrap();
        assert_eq!(&decoded[IV_SIZE..IV_SIZE + 2], IV_MARKER);
        // 6 bytes of plaintext plus the 16 byte tag
        assert_eq!(decoded.len(), IV_SIZE + 2 + 6 + 16);
    }

    #[test]
    fn test_empty_seals_to_empty() {
        let key = DerivedKey::derive("installation-salt");
        let sealed = EncryptedSecret::seal("", &key);
        assert!(sealed.is_empty());
        assert!(sealed.open(&key).is_empty());
    }

    #[test]
    fn test_wrong_key_fails_closed_at_cipher_level() {
        let key = DerivedKey::derive("installation-salt");
        let other = DerivedKey::derive("rotated-salt");
        let sealed = seal_bytes(b"abc123", &key).unwrap();

        assert!(open_bytes(&sealed, &other).is_none());
        assert_eq!(open_bytes(&sealed, &key).unwrap(), b"abc123");
    }

    #[test]
    fn test_tampered_ciphertext_fails_closed() {
        let key = DerivedKey::derive("installation-salt");
        let mut sealed = seal_bytes(b"abc123", &key).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(open_bytes(&sealed, &key).is_none());
    }

    #[test]
    fn test_open_legacy_base64_value() {
        // Keys stored before encryption existed were plain base64
        let key = DerivedKey::derive("installation-salt");
        let legacy = EncryptedSecret::from_stored(STANDARD.encode("legacy-key"));
        assert_eq!(legacy.open(&key).as_str(), "legacy-key");
    }

    #[test]
    fn test_open_non_base64_returns_stored_value() {
        let key = DerivedKey::derive("installation-salt");
        let raw = EncryptedSecret::from_stored("not*base64!");
        assert_eq!(raw.open(&key).as_str(), "not*base64!");
    }

    #[test]
    fn test_open_with_wrong_key_falls_back_to_decoded_bytes() {
        // Preserved behavior: a value that fails to decrypt is handed back
        // as its decoded bytes instead of an error, so the caller receives
        // a wrong key rather than nothing.
        let key = DerivedKey::derive("installation-salt");
        let other = DerivedKey::derive("rotated-salt");
        let sealed = EncryptedSecret::seal("abc123", &key);

        let recovered = sealed.open(&other);
        assert!(!recovered.is_empty());
        assert_ne!(recovered.as_str(), "abc123");
    }

    #[test]
    fn test_secret_value_redaction() {
        let secret = SecretValue::new("sk-test-12345");
        assert_eq!(secret.redacted(), "***2345");
        assert_eq!(SecretValue::new("abc").redacted(), "***");

        let debug = format!("{:?}", secret);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_derived_key_debug_redacted() {
        let debug = format!("{:?}", DerivedKey::derive("salt"));
        assert!(debug.contains("[REDACTED]"));
    }
}
