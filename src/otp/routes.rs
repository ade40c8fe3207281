//! REST endpoints for the OTP backend.
//!
//! `POST /send-otp` relays a code to the address and stores it server-side;
//! `POST /verify-otp` checks and deletes it. Neither endpoint authenticates,
//! matching the deployed backend's contract.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use super::mailer::OtpMailer;
use super::store::OtpStore;

/// Shared state for the OTP routes.
#[derive(Clone)]
pub struct OtpServerState {
    pub store: Arc<OtpStore>,
    pub mailer: Arc<dyn OtpMailer>,
}

/// Build the Axum router for the OTP backend.
pub fn otp_routes(state: OtpServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "plant-assist-otp"
    }))
}

#[derive(Debug, Deserialize)]
struct SendOtpRequest {
    #[serde(default)]
    email: String,
    /// Client-generated code. When absent the backend generates one itself.
    otp: Option<String>,
}

async fn send_otp(
    State(state): State<OtpServerState>,
    Json(request): Json<SendOtpRequest>,
) -> impl IntoResponse {
    if request.email.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Email is required"})),
        );
    }

    let code = request.otp.unwrap_or_else(super::generate_code);
    state.store.insert(&request.email, &code);

    match state.mailer.send_code(&request.email, &code).await {
        Ok(()) => {
            info!(email = %request.email, "OTP sent");
            (
                StatusCode::OK,
                Json(serde_json::json!({"message": "OTP sent successfully!"})),
            )
        }
        Err(e) => {
            warn!(email = %request.email, error = %e, "OTP relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to send OTP"})),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyOtpRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    otp: String,
}

async fn verify_otp(
    State(state): State<OtpServerState>,
    Json(request): Json<VerifyOtpRequest>,
) -> impl IntoResponse {
    if state.store.verify(&request.email, &request.otp) {
        info!(email = %request.email, "OTP verified");
        (
            StatusCode::OK,
            Json(serde_json::json!({"message": "OTP verified successfully!"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid or expired OTP"})),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::error::MailError;

    /// Mailer stub: records sends, optionally fails every relay.
    struct StubMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl StubMailer {
        fn working() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl OtpMailer for StubMailer {
        async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Relay("simulated relay failure".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn app(mailer: Arc<StubMailer>) -> (Router, Arc<OtpStore>) {
        let store = Arc::new(OtpStore::new());
        let state = OtpServerState {
            store: Arc::clone(&store),
            mailer,
        };
        (otp_routes(state), store)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn send_otp_without_email_is_bad_request() {
        let (app, store) = app(StubMailer::working());
        let response = app.oneshot(post_json("/send-otp", r#"{}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn send_otp_stores_client_code_and_relays_it() {
        let mailer = StubMailer::working();
        let (app, store) = app(Arc::clone(&mailer));

        let response = app
            .oneshot(post_json(
                "/send-otp",
                r#"{"email": "a@b.com", "otp": "123456"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.pending("a@b.com").as_deref(), Some("123456"));
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("a@b.com".to_string(), "123456".to_string())]);
    }

    #[tokio::test]
    async fn send_otp_generates_code_when_client_omits_one() {
        let mailer = StubMailer::working();
        let (app, store) = app(Arc::clone(&mailer));

        let response = app
            .oneshot(post_json("/send-otp", r#"{"email": "a@b.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let code = store.pending("a@b.com").unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn relay_failure_is_internal_server_error() {
        let (app, _store) = app(StubMailer::broken());

        let response = app
            .oneshot(post_json(
                "/send-otp",
                r#"{"email": "a@b.com", "otp": "123456"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn verify_otp_matches_then_deletes() {
        let (app, store) = app(StubMailer::working());
        store.insert("a@b.com", "123456");

        let ok = app
            .clone()
            .oneshot(post_json(
                "/verify-otp",
                r#"{"email": "a@b.com", "otp": "123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        // Record is gone; replay fails.
        let replay = app
            .oneshot(post_json(
                "/verify-otp",
                r#"{"email": "a@b.com", "otp": "123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_otp_mismatch_or_absent_is_bad_request() {
        let (app, store) = app(StubMailer::working());
        store.insert("a@b.com", "123456");

        let mismatch = app
            .clone()
            .oneshot(post_json(
                "/verify-otp",
                r#"{"email": "a@b.com", "otp": "654321"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

        let absent = app
            .oneshot(post_json(
                "/verify-otp",
                r#"{"email": "nobody@b.com", "otp": "123456"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(absent.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _store) = app(StubMailer::working());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
