//! Types for OTP manager results

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of issuing a code. The plaintext code is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueOtpResult {
    /// When the issued code stops verifying
    pub expires_at: DateTime<Utc>,
    /// Seconds from issuance until expiry
    pub expires_in_seconds: i64,
    /// Whether the dispatcher accepted the code
    pub delivered: bool,
    /// Dispatcher message id, when delivered
    pub message_id: Option<String>,
}

/// Summary of one sweep cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Expired OTP records removed
    pub expired_records: usize,
    /// Idle rate limit windows dropped
    pub rate_limit_keys: usize,
    /// Errors encountered during the cycle
    pub errors: Vec<String>,
}

impl SweepResult {
    pub fn total_removed(&self) -> usize {
        self.expired_records + self.rate_limit_keys
    }
}
