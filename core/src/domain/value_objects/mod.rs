//! Value objects representing immutable domain concepts.

pub mod contact;
pub mod encrypted_code;

// Re-export commonly used types
pub use contact::{Contact, ContactKind};
pub use encrypted_code::EncryptedCode;
