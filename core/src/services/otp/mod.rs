//! OTP manager: issuance, verification and expiry sweeping
//!
//! This module ties the generator, cipher, record store, rate limiter and
//! delivery dispatcher together:
//! - `OtpService::issue_otp` rate-limits, generates, stores and dispatches a code
//! - `OtpService::verify_otp` checks expiry, attempt budget and the code itself
//! - `OtpSweeper` periodically purges expired records and idle rate windows

mod config;
mod service;
mod sweeper;
mod traits;
mod types;


pub use config::OtpServiceConfig;
pub use service::OtpService;
pub use sweeper::OtpSweeper;
pub use traits::{DeliveryDispatcher, DeliveryError, DeliveryReceipt};
pub use types::{IssueOtpResult, SweepResult};
