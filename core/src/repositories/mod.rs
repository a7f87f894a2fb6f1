pub mod otp_store;

pub use otp_store::{AttemptReservation, InMemoryOtpStore, OtpStore, StorageBackend};
