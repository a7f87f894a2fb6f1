//! Integration tests for the OTP endpoints
//!
//! The app is built with in-memory backends and a dispatcher that captures
//! delivered codes, so tests can verify codes without them ever appearing
//! in a response.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{http::header, http::StatusCode, test, web};
use serde_json::{json, Value};

use otp_api::{create_app, AppState};
use otp_core::{
    AesGcmCipher, CipherKey, Contact, DeliveryDispatcher, DeliveryError, DeliveryReceipt,
    InMemoryOtpStore, InMemoryRateLimiter, ManualClock, OtpService, OtpServiceConfig,
};
use otp_shared::{AppConfig, RateLimitScope};

#[derive(Default)]
struct CapturingDispatcher {
    codes: Mutex<HashMap<String, String>>,
}

impl CapturingDispatcher {
    fn code_for(&self, contact: &str) -> String {
        self.codes
            .lock()
            .unwrap()
            .get(contact)
            .cloned()
            .expect("no code delivered")
    }
}

#[async_trait]
impl DeliveryDispatcher for CapturingDispatcher {
    async fn send(&self, contact: &Contact, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        self.codes
            .lock()
            .unwrap()
            .insert(contact.as_str().to_string(), code.to_string());
        Ok(DeliveryReceipt {
            message_id: "captured".to_string(),
            channel: "test".to_string(),
        })
    }

    fn channel_name(&self) -> &str {
        "test"
    }
}

struct TestContext {
    state: web::Data<AppState>,
    dispatcher: Arc<CapturingDispatcher>,
    clock: Arc<ManualClock>,
    config: AppConfig,
}

fn context_with(scope: RateLimitScope, trusted_proxies: Vec<String>) -> TestContext {
    let mut config = AppConfig::development();
    config.server.trusted_proxies = trusted_proxies;
    config.rate_limit.scope = scope;

    let clock = Arc::new(ManualClock::default());
    let dispatcher = Arc::new(CapturingDispatcher::default());
    let service = OtpService::new(
        Arc::new(InMemoryOtpStore::new()),
        Arc::new(InMemoryRateLimiter::with_clock(5, 60, clock.clone())),
        dispatcher.clone(),
        Arc::new(AesGcmCipher::new(&CipherKey::generate().unwrap())),
        OtpServiceConfig::from_config(&config.otp, &config.rate_limit),
    )
    .with_clock(clock.clone());

    let state = web::Data::new(AppState::new(Arc::new(service), &config.server));

    TestContext {
        state,
        dispatcher,
        clock,
        config,
    }
}

fn context() -> TestContext {
    context_with(RateLimitScope::Both, Vec::new())
}

fn send_request(contact: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/send-otp")
        .set_json(json!({ "contact": contact }))
}

fn verify_request(contact: &str, otp: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/verify-otp")
        .set_json(json!({ "contact": contact, "otp": otp }))
}

fn wrong_code(code: &str) -> String {
    code.chars()
        .map(|c| if c == '9' { '0' } else { char::from(c as u8 + 1) })
        .collect()
}

#[actix_web::test]
async fn test_send_otp_never_returns_the_code() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = test::call_service(&app, send_request("user@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    let code = ctx.dispatcher.code_for("user@example.com");
    assert!(!text.contains(&code));

    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["message"], "OTP sent successfully.");
    assert_eq!(json["expires_in"], 120);
}

#[actix_web::test]
async fn test_verify_succeeds_once() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    test::call_service(&app, send_request("User@Example.com").to_request()).await;
    let code = ctx.dispatcher.code_for("user@example.com");

    let resp = test::call_service(&app, verify_request("user@example.com", &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], true);

    let resp = test::call_service(&app, verify_request("user@example.com", &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_all_verification_failures_look_identical() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    // Unknown contact
    let resp = test::call_service(&app, verify_request("nobody@example.com", "123456").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let no_active: Value = test::read_body_json(resp).await;

    // Wrong code
    test::call_service(&app, send_request("a@b.com").to_request()).await;
    let code = ctx.dispatcher.code_for("a@b.com");
    let resp = test::call_service(&app, verify_request("a@b.com", &wrong_code(&code)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let invalid: Value = test::read_body_json(resp).await;

    // Expired
    ctx.clock.advance(chrono::Duration::seconds(121));
    let resp = test::call_service(&app, verify_request("a@b.com", &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let expired: Value = test::read_body_json(resp).await;

    // Malformed contact
    let resp = test::call_service(&app, verify_request("not-a-contact", "123456").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let malformed: Value = test::read_body_json(resp).await;

    for body in [&no_active, &invalid, &expired, &malformed] {
        assert_eq!(body["error"], "Invalid or expired verification code");
        assert_eq!(body["code"], "VERIFICATION_FAILED");
        assert!(body.get("details").is_none());
    }
}

#[actix_web::test]
async fn test_exhaustion_then_original_code_fails() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    test::call_service(&app, send_request("a@b.com").to_request()).await;
    let code = ctx.dispatcher.code_for("a@b.com");
    let wrong = wrong_code(&code);

    for _ in 0..5 {
        let resp = test::call_service(&app, verify_request("a@b.com", &wrong).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let resp = test::call_service(&app, verify_request("a@b.com", &code).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_sixth_send_is_rate_limited() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    for _ in 0..5 {
        let resp = test::call_service(&app, send_request("a@b.com").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, send_request("a@b.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["code"], "RATE_LIMIT_EXCEEDED");
}

#[actix_web::test]
async fn test_send_rejects_malformed_contact() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = test::call_service(&app, send_request("not a contact").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/send-otp")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_verify_malformed_body_is_generic() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/verify-otp")
            .set_json(json!({ "contact": "a@b.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Invalid or expired verification code");
}

#[actix_web::test]
async fn test_forwarded_for_ignored_from_untrusted_peer() {
    let ctx = context_with(RateLimitScope::Ip, Vec::new());
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    for i in 0..5 {
        let req = send_request(&format!("user{}@example.com", i))
            .peer_addr("192.0.2.10:5000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("203.0.113.{}", i)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // Spoofed header does not reset the peer's window
    let req = send_request("late@example.com")
        .peer_addr("192.0.2.10:5000".parse().unwrap())
        .insert_header(("X-Forwarded-For", "203.0.113.99"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_forwarded_for_honoured_from_trusted_proxy() {
    let ctx = context_with(RateLimitScope::Ip, vec!["10.0.0.1".to_string()]);
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    for i in 0..6 {
        let req = send_request(&format!("user{}@example.com", i))
            .peer_addr("10.0.0.1:5000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("203.0.113.{}, 10.0.0.1", i)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_health_and_info() {
    let ctx = context();
    let app = test::init_service(create_app(ctx.state.clone(), &ctx.config)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["storage"], "memory");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
