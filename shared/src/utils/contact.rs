//! Contact identifier utilities (email addresses and phone numbers)

use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately simple local@domain.tld shape, lower-cased input expected
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*\.[a-z]{2,}$")
        .expect("email regex is valid")
});

// E.164 with at least 7 digits after the leading +
static E164_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("E.164 regex is valid"));

/// Maximum accepted raw input length
pub const MAX_CONTACT_LENGTH: usize = 254;

/// Normalize an email address (trim and lower-case)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a phone number by removing formatting characters.
/// Anything else is kept so validation can reject it.
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

/// Check whether the input looks like an email address
pub fn is_valid_email(email: &str) -> bool {
    let normalized = normalize_email(email);
    normalized.len() <= MAX_CONTACT_LENGTH && EMAIL_REGEX.is_match(&normalized)
}

/// Check if a phone number is valid international E.164
pub fn is_valid_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    E164_REGEX.is_match(&normalized)
}

/// Mask an email for logs (e.g., j***@example.com)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Mask a phone number for logs (e.g., +86****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 && normalized.is_ascii() {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Mask any contact identifier for logs
pub fn mask_contact(contact: &str) -> String {
    if contact.contains('@') {
        mask_email(contact)
    } else {
        mask_phone_number(contact)
    }
}
