//! Cipher key loading and validation

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashSet;
use std::fmt;

use crate::errors::{DomainError, DomainResult, OtpError};

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// Keys with fewer distinct byte values are rejected as low-entropy
const MIN_DISTINCT_BYTES: usize = 20;

/// Values that show up in sample configs and must never reach a deployment
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-256-bit-secret-key",
    "changeme",
    "change-me",
    "secret",
    "CHANGE_ME",
];

/// 256-bit key material for the OTP cipher
#[derive(Clone)]
pub struct CipherKey([u8; KEY_SIZE]);

impl CipherKey {
    /// Decode and validate a base64 encoded key
    pub fn from_base64(encoded: &str) -> DomainResult<Self> {
        let encoded = encoded.trim();
        if PLACEHOLDER_KEYS.iter().any(|p| p.eq_ignore_ascii_case(encoded)) {
            return Err(config_error("cipher key is a placeholder value"));
        }

        let bytes = BASE64
            .decode(encoded)
            .map_err(|_| config_error("cipher key is not valid base64"))?;

        Self::from_bytes(&bytes)
    }

    /// Validate raw key material
    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            config_error(&format!(
                "cipher key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;

        let distinct: HashSet<u8> = key.iter().copied().collect();
        if distinct.len() < MIN_DISTINCT_BYTES {
            return Err(config_error("cipher key has too little entropy"));
        }
        // A passphrase is not a key; random material is almost never all printable
        if key.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(config_error(
                "cipher key looks like a passphrase; use 32 random bytes",
            ));
        }

        Ok(Self(key))
    }

    /// Fresh random key (tests and keyless development runs)
    pub fn generate() -> DomainResult<Self> {
        let mut key = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| OtpError::GeneratorUnavailable {
                reason: e.to_string(),
            })?;
        Ok(Self(key))
    }

    /// Base64 form, e.g. for printing a freshly generated key once
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(<redacted>)")
    }
}

fn config_error(message: &str) -> DomainError {
    DomainError::Configuration {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_round_trips_through_base64() {
        let key = CipherKey::generate().expect("rng available");
        let loaded = CipherKey::from_base64(&key.to_base64()).expect("valid key");
        assert_eq!(loaded.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let short = BASE64.encode([7u8; 16]);
        assert!(matches!(
            CipherKey::from_base64(&short),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_rejects_placeholder() {
        assert!(CipherKey::from_base64("your-256-bit-secret-key").is_err());
        assert!(CipherKey::from_base64("changeme").is_err());
    }

    #[test]
    fn test_rejects_low_entropy_keys() {
        let repeated = BASE64.encode([0x41u8; KEY_SIZE]);
        assert!(CipherKey::from_base64(&repeated).is_err());

        // ASCII passphrase padded to 32 bytes
        let padded = BASE64.encode(b"aaaaaaaabbbbbbbbccccccccdddddddd");
        assert!(CipherKey::from_base64(&padded).is_err());

        assert!(matches!(
            CipherKey::from_bytes(b"my-super-secret-passphrase-12345"),
            Err(DomainError::Configuration { .. })
        ));

        // Every byte distinct, but all printable
        let printable = b"Zq7!mK2#vX9@pL4$wR8%nT6^bY3&cJ5*";
        assert_eq!(printable.iter().collect::<HashSet<_>>().len(), KEY_SIZE);
        assert!(matches!(
            CipherKey::from_bytes(printable),
            Err(DomainError::Configuration { message }) if message.contains("passphrase")
        ));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(CipherKey::from_base64("***not-base64***").is_err());
    }

    #[test]
    fn test_debug_hides_material() {
        let key = CipherKey::generate().expect("rng available");
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "CipherKey(<redacted>)");
        assert!(!rendered.contains(&key.to_base64()));
    }
}
