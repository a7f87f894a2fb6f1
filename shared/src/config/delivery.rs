//! Delivery dispatcher configuration

use serde::{Deserialize, Serialize};

/// Settings for the logging delivery dispatcher
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Print plaintext codes in the dispatcher log line.
    /// Local development only; refused in production.
    #[serde(default)]
    pub reveal_codes: bool,

    /// Product name used in the delivered message
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl DeliveryConfig {
    pub fn sender_name(&self) -> &str {
        if self.sender_name.is_empty() {
            "OTP Guard"
        } else {
            &self.sender_name
        }
    }
}

fn default_sender_name() -> String {
    String::from("OTP Guard")
}
