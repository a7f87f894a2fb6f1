//! OTP route handlers
//!
//! - `POST /send-otp` issues a code and hands it to the delivery channel
//! - `POST /verify-otp` checks a submitted code

pub mod send_otp;
pub mod verify_otp;

pub use send_otp::send_otp;
pub use verify_otp::verify_otp;

use actix_web::HttpRequest;

use crate::state::AppState;

/// Client address used for rate limiting.
///
/// The socket peer is authoritative. `X-Forwarded-For` (first entry) and
/// `X-Real-IP` are read only when the peer is a trusted proxy.
pub fn extract_client_ip(req: &HttpRequest, state: &AppState) -> Option<String> {
    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string())?;

    if !state.is_trusted_proxy(&peer_ip) {
        return Some(peer_ip);
    }

    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        req.headers()
            .get("X-Real-IP")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    Some(
        forwarded
            .or_else(real_ip)
            .map(String::from)
            .unwrap_or(peer_ip),
    )
}
