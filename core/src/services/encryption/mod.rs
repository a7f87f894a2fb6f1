//! Encryption of OTP codes at rest

pub mod cipher;
pub mod key;

// Re-export main types
pub use cipher::{AesGcmCipher, OtpCipher, NONCE_SIZE, TAG_SIZE};
pub use key::{CipherKey, KEY_SIZE};
