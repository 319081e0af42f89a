mod config;
mod http;
mod intake;
mod metrics;
mod models;
mod monday;
mod relay;
mod security;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use config::AppConfig;
use intake::IntakeSchema;
use models::WriteResponse;
use monday::{MondayClient, MondayError};
use relay::Relay;
use security::{AuthState, require_shared_secret};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(target = "intake.api", "server crashed: {err}");
    }
}

async fn run() -> eyre::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    if config.monday.api_key().is_none() {
        warn!(
            target = "intake.api",
            "MONDAY_API_KEY is not set; every write will fail until it is configured"
        );
    }

    let relay = Relay::new(IntakeSchema::default(), MondayClient::new(config.monday.clone()));
    let auth = AuthState::new(config.shared_secret.clone());
    let app = app(AppState { relay }, auth, config.body_limit);

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!(target = "intake.api", "listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    relay: Relay,
}

fn app(state: AppState, auth: AuthState, body_limit: usize) -> Router {
    // Preflight (any OPTIONS request) is answered by the CORS layer itself.
    let cors = CorsLayer::new()
        .allow_headers(Any)
        .allow_methods(Any)
        .allow_origin(Any);

    let intake = Router::new()
        .route("/write", post(write_item).fallback(not_found))
        .route_layer(middleware::from_fn_with_state(auth, require_shared_secret));

    Router::new()
        .route("/health", get(health))
        .merge(intake)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Liveness probe.
///
/// - Method: `GET`
/// - Path: `/health`
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "intake-relay",
    }))
}

/// Create one board item from an agent's call-intake payload.
///
/// - Method: `POST`
/// - Path: `/write`
/// - Auth: `Authorization: Bearer <secret>` or `X-Intake-Key` when `INTAKE_SHARED_SECRET` is set
/// - Body: intake JSON, optionally wrapped in `payload`, `data` or `body`
/// - Response: `WriteResponse`
async fn write_item(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<WriteResponse>, AppError> {
    crate::metrics::inc_requests("/write");
    let body = body?;
    let payload = parse_body(&body)?;
    let submission = state.relay.submit(payload).await?;
    crate::metrics::inc_outcome("created");
    Ok(Json(WriteResponse::created(submission)))
}

async fn not_found() -> (StatusCode, Json<WriteResponse>) {
    (StatusCode::NOT_FOUND, Json(WriteResponse::failure("Not found")))
}

fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|err| AppError::InvalidJson(err.to_string()))
}

#[derive(Debug)]
enum AppError {
    InvalidJson(String),
    BodyTooLarge(String),
    Monday(MondayError),
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge(rejection.body_text())
        } else {
            Self::InvalidJson(rejection.body_text())
        }
    }
}

impl From<MondayError> for AppError {
    fn from(value: MondayError) -> Self {
        Self::Monday(value)
    }
}

impl AppError {
    fn outcome(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => "invalid_json",
            AppError::BodyTooLarge(_) => "body_too_large",
            AppError::Monday(MondayError::MissingApiKey) => "missing_api_key",
            AppError::Monday(MondayError::Network(_)) => "network_error",
            AppError::Monday(MondayError::Malformed { .. }) => "malformed_upstream",
            AppError::Monday(MondayError::Rejected { .. }) => "upstream_rejected",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        crate::metrics::inc_outcome(self.outcome());
        let (status, payload) = match self {
            AppError::InvalidJson(detail) => (
                StatusCode::BAD_REQUEST,
                WriteResponse::failure("Invalid JSON body").with_error(detail),
            ),
            AppError::BodyTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                WriteResponse::failure("Request body too large").with_error(detail),
            ),
            AppError::Monday(MondayError::MissingApiKey) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                WriteResponse::failure("MONDAY_API_KEY is not configured on the server"),
            ),
            AppError::Monday(MondayError::Network(detail)) => (
                StatusCode::BAD_GATEWAY,
                WriteResponse::failure("Network error contacting monday.com").with_error(detail),
            ),
            AppError::Monday(MondayError::Malformed { status, raw }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                WriteResponse::failure("monday.com returned a non-JSON response")
                    .with_status(status)
                    .with_raw(raw),
            ),
            AppError::Monday(MondayError::Rejected { status, body }) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                WriteResponse::failure("monday.com API error")
                    .with_status(status)
                    .with_monday_response(body),
            ),
        };
        (status, Json(payload)).into_response()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::schema::column_ids;
    use crate::monday::MondayConfig;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(api_url: &str, api_key: Option<&str>, secret: Option<&str>) -> Router {
        test_app_with_limit(api_url, api_key, secret, 256 * 1024)
    }

    fn test_app_with_limit(
        api_url: &str,
        api_key: Option<&str>,
        secret: Option<&str>,
        body_limit: usize,
    ) -> Router {
        let mut config = MondayConfig::new(api_url);
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        let relay = Relay::new(IntakeSchema::default(), MondayClient::new(config));
        app(
            AppState { relay },
            AuthState::new(secret.map(str::to_string)),
            body_limit,
        )
    }

    fn post_write(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/write")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn sent_columns(server: &MockServer) -> Value {
        let requests = server.received_requests().await.expect("recorded");
        assert_eq!(requests.len(), 1);
        let sent: Value = serde_json::from_slice(&requests[0].body).expect("json body");
        let encoded = sent["variables"]["columnValues"].as_str().expect("string");
        serde_json::from_str(encoded).expect("encoded columns")
    }

    #[tokio::test]
    async fn write_creates_item_with_normalized_columns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"create_item": {"id": "1", "name": "A"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(
            router,
            post_write(r#"{"name":"A","phone":"17145551212","division":"Texas"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["mondayItemId"], "1");
        assert_eq!(body["mondayItemName"], "A");
        assert_eq!(body["itemName"], "A");
        assert_eq!(
            body["mondayResponse"],
            json!({"data": {"create_item": {"id": "1", "name": "A"}}})
        );

        let columns = sent_columns(&server).await;
        assert_eq!(columns[column_ids::PHONE]["phone"], "7145551212");
        assert_eq!(columns[column_ids::DIVISION], json!({"label": "Texas"}));
        assert!(columns.get(column_ids::CALLER_ID).is_none());
        assert!(columns.get(column_ids::ISSUE).is_none());
    }

    #[tokio::test]
    async fn write_without_api_key_fails_before_calling_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), None, None);
        let (status, body) = send(
            router,
            post_write(r#"{"name":"A","phone":"17145551212","division":"Texas"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], json!(false));
        assert!(body["message"].as_str().unwrap().contains("MONDAY_API_KEY"));
    }

    #[tokio::test]
    async fn graphql_errors_surface_with_upstream_status_and_body() {
        let server = MockServer::start().await;
        let upstream = json!({"errors": [{"message": "bad board"}]});
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(router, post_write(r#"{"name":"A"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(false));
        assert_eq!(body["status"], 200);
        assert_eq!(body["mondayResponse"], upstream);
    }

    #[tokio::test]
    async fn upstream_http_failure_keeps_its_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error_message": "nope"})))
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(router, post_write(r#"{"name":"A"}"#)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["mondayResponse"]["error_message"], "nope");
    }

    #[tokio::test]
    async fn non_json_upstream_is_500_with_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(router, post_write(r#"{"name":"A"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["raw"], "upstream exploded");
        assert_eq!(body["status"], 200);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_502() {
        let router = test_app("http://127.0.0.1:1/v2", Some("test-key"), None);
        let (status, body) = send(router, post_write(r#"{"name":"A"}"#)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["ok"], json!(false));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_json_is_400_with_parser_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(router, post_write("{\"name\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], json!(false));
        assert_eq!(body["message"], "Invalid JSON body");
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_body_gets_json_envelope_with_413() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let router = test_app_with_limit(&server.uri(), Some("test-key"), None, 16);
        let request = post_write(r#"{"name":"A fairly long caller name"}"#);
        let response = router.oneshot(request).await.expect("router response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: Value = serde_json::from_slice(&bytes).expect("json envelope");
        assert_eq!(body["ok"], json!(false));
        assert_eq!(body["message"], "Request body too large");
    }

    #[tokio::test]
    async fn enveloped_body_is_unwrapped_before_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"create_item": {"id": "9", "name": "Jane – Lost card"}}
            })))
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), None);
        let (status, body) = send(
            router,
            post_write(r#"{"body":"{\"name\":\"Jane\",\"issue\":\"Lost card\",\"division\":\"Mars\"}"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["itemName"], "Jane – Lost card");
        let columns = sent_columns(&server).await;
        assert_eq!(columns[column_ids::DIVISION], json!({"label": "Other"}));
        assert_eq!(columns[column_ids::ISSUE], "Lost card");
    }

    #[tokio::test]
    async fn unknown_route_and_method_are_404() {
        let router = test_app("http://127.0.0.1:1/v2", Some("test-key"), None);
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"ok": false, "message": "Not found"}));

        let request = Request::builder()
            .method("GET")
            .uri("/write")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not found");
    }

    #[tokio::test]
    async fn preflight_returns_permissive_cors_headers() {
        let router = test_app("http://127.0.0.1:1/v2", Some("test-key"), Some("s3cret"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/write")
            .header("origin", "https://agent.example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.expect("response");
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn shared_secret_guards_write() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"create_item": {"id": "5", "name": "A"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let router = test_app(&server.uri(), Some("test-key"), Some("s3cret"));
        let (status, body) = send(router.clone(), post_write(r#"{"name":"A"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], json!(false));

        let mut request = post_write(r#"{"name":"A"}"#);
        request
            .headers_mut()
            .insert("X-Intake-Key", "s3cret".parse().unwrap());
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mondayItemId"], "5");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = test_app("http://127.0.0.1:1/v2", None, None);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
