//! Contact identifier value object

use serde::{Deserialize, Serialize};
use std::fmt;

use otp_shared::contact::{
    is_valid_email, is_valid_phone, mask_email, mask_phone_number, normalize_email,
    normalize_phone_number, MAX_CONTACT_LENGTH,
};

use crate::errors::{DomainError, DomainResult};

/// The channel a contact is reached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
}

/// A validated, normalized contact identifier (email address or E.164 phone number)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    value: String,
    kind: ContactKind,
}

impl Contact {
    /// Parse and normalize user input.
    ///
    /// Emails are trimmed and lower-cased. Phone numbers have formatting
    /// characters stripped and must be E.164.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Contact is required"));
        }
        if trimmed.len() > MAX_CONTACT_LENGTH {
            return Err(DomainError::validation("Contact is too long"));
        }

        if trimmed.contains('@') {
            if is_valid_email(trimmed) {
                return Ok(Self {
                    value: normalize_email(trimmed),
                    kind: ContactKind::Email,
                });
            }
            return Err(DomainError::validation("Invalid email address"));
        }

        if is_valid_phone(trimmed) {
            return Ok(Self {
                value: normalize_phone_number(trimmed),
                kind: ContactKind::Phone,
            });
        }

        Err(DomainError::validation(
            "Contact must be an email address or an E.164 phone number",
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> ContactKind {
        self.kind
    }

    /// Log-safe representation
    pub fn masked(&self) -> String {
        match self.kind {
            ContactKind::Email => mask_email(&self.value),
            ContactKind::Phone => mask_phone_number(&self.value),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

// Debug output also lands in logs, so it stays masked
impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("value", &self.masked())
            .field("kind", &self.kind)
            .finish()
    }
}
