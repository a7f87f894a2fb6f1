//! Security middleware for enforcing HTTPS and response hardening.
//!
//! This middleware ensures that all requests meet security requirements including:
//! - HTTPS enforcement outside development
//! - Security headers (HSTS, CSP, `Cache-Control: no-store`)
//! - Request origin sanity checks

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    http::header::{self, HeaderValue},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use otp_shared::{Environment, ServerConfig};

/// Security middleware factory for enforcing HTTPS and security policies
#[derive(Debug, Clone)]
pub struct SecurityMiddleware {
    /// Whether to enforce HTTPS (disabled in development)
    enforce_https: bool,
    /// Whether to add security headers
    add_security_headers: bool,
    /// Peers whose X-Forwarded-Proto header is trusted
    trusted_proxies: Vec<String>,
}

impl SecurityMiddleware {
    /// Configure for an environment; HTTPS is enforced everywhere except development
    pub fn from_config(environment: Environment, server: &ServerConfig) -> Self {
        let enforce_https = !environment.is_development();

        tracing::info!(
            enforce_https,
            trusted_proxies = ?server.trusted_proxies,
            "Security middleware configured"
        );

        Self {
            enforce_https,
            add_security_headers: true,
            trusted_proxies: server.trusted_proxies.clone(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            enforce_https: self.enforce_https,
            add_security_headers: self.add_security_headers,
            trusted_proxies: Rc::new(self.trusted_proxies.clone()),
        }))
    }
}

/// Security middleware service implementation
pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    enforce_https: bool,
    add_security_headers: bool,
    trusted_proxies: Rc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let enforce_https = self.enforce_https;
        let add_security_headers = self.add_security_headers;
        let trusted_proxies = Rc::clone(&self.trusted_proxies);

        Box::pin(async move {
            // Check HTTPS enforcement
            if enforce_https && !is_secure_request(&req, &trusted_proxies) {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.path(),
                    "Insecure request blocked"
                );
                return Err(ErrorForbidden("HTTPS required"));
            }

            // Validate request origin if present
            if let Some(origin) = req.headers().get(header::ORIGIN) {
                if !is_valid_origin(origin) {
                    tracing::warn!(
                        origin = ?origin,
                        method = %req.method(),
                        path = %req.path(),
                        "Invalid origin blocked"
                    );
                    return Err(ErrorBadRequest("Invalid request origin"));
                }
            }

            // Process the request
            let mut response = service.call(req).await?;

            if add_security_headers {
                add_security_response_headers(&mut response);
            }

            Ok(response)
        })
    }
}

/// Checks if the request is secure (HTTPS or forwarded as HTTPS by a trusted proxy)
fn is_secure_request(req: &ServiceRequest, trusted_proxies: &[String]) -> bool {
    // ConnectionInfo::scheme() reads X-Forwarded-Proto from anyone; only the listener counts here
    if req.app_config().secure() {
        return true;
    }

    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string());
    let from_trusted_proxy = peer_ip
        .as_deref()
        .map(|ip| trusted_proxies.iter().any(|trusted| trusted == ip))
        .unwrap_or(false);

    from_trusted_proxy
        && req
            .headers()
            .get("x-forwarded-proto")
            .and_then(|proto| proto.to_str().ok())
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false)
}

/// Origins must at least look like web origins; CORS decides the rest
fn is_valid_origin(origin: &HeaderValue) -> bool {
    origin
        .to_str()
        .map(|origin| origin.starts_with("http://") || origin.starts_with("https://"))
        .unwrap_or(false)
}

/// Adds security headers to the response
fn add_security_response_headers<B>(response: &mut ServiceResponse<B>) {
    let headers = response.headers_mut();

    // Enforce HTTPS for 1 year, including subdomains
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );

    // Responses carry verification outcomes; never cache them
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn middleware(environment: Environment, trusted_proxies: &[&str]) -> SecurityMiddleware {
        let server = ServerConfig {
            trusted_proxies: trusted_proxies.iter().map(|p| p.to_string()).collect(),
            ..ServerConfig::default()
        };
        SecurityMiddleware::from_config(environment, &server)
    }

    #[actix_web::test]
    async fn test_development_allows_http_and_sets_headers() {
        let app = test::init_service(
            App::new()
                .wrap(middleware(Environment::Development, &[]))
                .route("/health", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    }

    #[actix_web::test]
    async fn test_production_rejects_plain_http() {
        let app = test::init_service(
            App::new()
                .wrap(middleware(Environment::Production, &[]))
                .route("/health", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let result = test::try_call_service(&app, req).await;
        let status = match result {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_trusted_proxy_forwarded_https() {
        let app = test::init_service(
            App::new()
                .wrap(middleware(Environment::Production, &["10.0.0.1"]))
                .route("/health", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .peer_addr("10.0.0.1:4000".parse().unwrap())
            .insert_header(("x-forwarded-proto", "https"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[::core::prelude::v1::test]
    fn test_origin_validation() {
        assert!(is_valid_origin(&HeaderValue::from_static("https://app.example.com")));
        assert!(!is_valid_origin(&HeaderValue::from_static("null")));
    }
}
