//! # OTP Guard API
//!
//! HTTP surface of the OTP service: `POST /send-otp`, `POST /verify-otp`,
//! `GET /health` and `GET /`. Library exports exist for the binary and for
//! integration tests.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use app::create_app;
pub use state::AppState;
