//! OTP record entity: one issued code bound to one contact.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Contact, EncryptedCode};

pub use otp_shared::config::otp::{
    DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS, DEFAULT_TTL_SECONDS,
};

/// Lifecycle state of the OTP for a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpState {
    /// No record is stored for the contact
    NoActiveOtp,
    /// A code is stored and can still be verified
    Pending,
    /// The code was verified and consumed
    Verified,
    /// The code outlived its TTL
    Expired,
    /// The attempt budget was used up
    Exhausted,
}

/// Stored OTP record
///
/// The plaintext code never appears here; `encrypted_code` holds
/// `nonce || ciphertext+tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Identifies a single issuance; conditional store operations match on it
    pub id: Uuid,

    /// Normalized contact identifier (the store key)
    pub contact: String,

    /// Encrypted code
    pub encrypted_code: EncryptedCode,

    /// Timestamp when the code was issued
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the code is rejected
    pub expires_at: DateTime<Utc>,

    /// Verification attempts charged to this issuance so far
    pub attempt_count: u32,
}

impl OtpRecord {
    /// Creates a fresh record with a new id and zero attempts
    ///
    /// # Arguments
    ///
    /// * `contact` - The contact the code was issued to
    /// * `encrypted_code` - The encrypted code
    /// * `now` - Issuance time
    /// * `ttl_seconds` - Seconds until the code expires
    pub fn new(
        contact: &Contact,
        encrypted_code: EncryptedCode,
        now: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact: contact.as_str().to_string(),
            encrypted_code,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            attempt_count: 0,
        }
    }

    /// A record is expired once `now` is strictly past `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempt_count >= max_attempts
    }

    /// Derive the state of a stored record. Expiry takes precedence.
    pub fn state_at(&self, now: DateTime<Utc>, max_attempts: u32) -> OtpState {
        if self.is_expired_at(now) {
            OtpState::Expired
        } else if self.is_exhausted(max_attempts) {
            OtpState::Exhausted
        } else {
            OtpState::Pending
        }
    }
}
