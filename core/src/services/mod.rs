//! Business services containing domain logic and use cases.

pub mod clock;
pub mod encryption;
pub mod generator;
pub mod otp;
pub mod rate_limit;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use encryption::{AesGcmCipher, CipherKey, OtpCipher};
pub use generator::{CodeGenerator, OsRngCodeGenerator};
pub use otp::{
    DeliveryDispatcher, DeliveryError, DeliveryReceipt, IssueOtpResult, OtpService,
    OtpServiceConfig, OtpSweeper, SweepResult,
};
pub use rate_limit::{AllowAllRateLimiter, InMemoryRateLimiter, RateLimitDecision, RateLimiter};
