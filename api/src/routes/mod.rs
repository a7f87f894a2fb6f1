//! Route handlers
//!
//! - `otp` - issuance and verification
//! - `health` - liveness and service information

pub mod health;
pub mod otp;
