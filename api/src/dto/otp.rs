use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendOtpRequest {
    /// Email address or E.164 phone number
    /// Examples: "user@example.com", "+14155552671"
    #[validate(length(min = 3, max = 254))]
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    /// Same contact the code was sent to
    #[validate(length(min = 3, max = 254))]
    pub contact: String,

    /// Code received by the user
    #[validate(length(min = 1, max = 16))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub message: String,
    /// Seconds until the issued code expires
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
}
