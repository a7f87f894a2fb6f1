//! Common utility functions

pub mod contact;

pub use contact::{is_valid_email, is_valid_phone, mask_contact};
