//! # OTP Guard Core
//!
//! Core OTP lifecycle logic for the OTP Guard backend.
//! This crate contains the OTP record entity, contact value objects, the code
//! generator and cipher, rate limiting, the OTP manager service, repository
//! interfaces, and error types that the infrastructure and API layers build on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
