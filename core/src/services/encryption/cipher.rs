//! OTP cipher using AES-256-GCM

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use crate::domain::value_objects::EncryptedCode;
use crate::errors::{DomainError, DomainResult, OtpError};

use super::key::CipherKey;

/// AES-GCM nonce size in bytes
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// Trait defining OTP encryption operations
pub trait OtpCipher: Send + Sync {
    /// Encrypt a plaintext code with a fresh nonce
    fn encrypt(&self, plaintext: &str) -> DomainResult<EncryptedCode>;

    /// Decrypt a stored code, failing on tampering, truncation or a wrong key
    fn decrypt(&self, encrypted: &EncryptedCode) -> DomainResult<String>;
}

/// AES-GCM based OTP cipher
#[derive(Clone)]
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &CipherKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Generate a random nonce for AES-GCM
    fn generate_nonce() -> DomainResult<[u8; NONCE_SIZE]> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| OtpError::GeneratorUnavailable {
                reason: e.to_string(),
            })?;
        Ok(nonce)
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesGcmCipher")
    }
}

impl OtpCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> DomainResult<EncryptedCode> {
        let nonce = Self::generate_nonce()?;

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| DomainError::Internal {
                message: format!("Encryption failed: {}", e),
            })?;

        let mut bytes = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&ciphertext);
        Ok(EncryptedCode::from_bytes(bytes))
    }

    fn decrypt(&self, encrypted: &EncryptedCode) -> DomainResult<String> {
        let bytes = encrypted.as_bytes();
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(OtpError::Decryption {
                reason: "ciphertext too short".to_string(),
            }
            .into());
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| OtpError::Decryption {
                reason: "authentication failed".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|_| {
            DomainError::from(OtpError::Decryption {
                reason: "plaintext is not valid UTF-8".to_string(),
            })
        })
    }
}
