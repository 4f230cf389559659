// ABOUTME: HTTP front end for the scrape relay: POST /scrape with a form-encoded url, GET /health.
// ABOUTME: Maps ExtractionResult to JSON responses and turns handler panics into 500 errors.

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use scrape_relay::{panic_message, ExtractionResult, FailureKind, Relay, Sink};

/// Shared, immutable application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Form body of `POST /scrape`.
#[derive(Debug, Deserialize)]
pub struct ScrapeForm {
    pub url: Option<String>,
}

/// Sink that renders a result as an HTTP response.
///
/// Pages are `200 {title,url,content}`, missing input is `400 {error}`, and
/// every other failure is `500 {error}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpResponder;

impl Sink for HttpResponder {
    type Output = Response;

    fn emit(self, result: &ExtractionResult) -> Response {
        let status = match result.failure_kind() {
            None => StatusCode::OK,
            Some(FailureKind::Input) => StatusCode::BAD_REQUEST,
            Some(FailureKind::Extraction) | Some(FailureKind::Unexpected) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(result)).into_response()
    }
}

async fn scrape(
    State(state): State<AppState>,
    form: Result<Form<ScrapeForm>, FormRejection>,
) -> Response {
    let url = match form {
        Ok(Form(form)) => form.url,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable scrape form");
            None
        }
    };
    state.relay.handle_into(url.as_deref(), HttpResponder).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(&*err);
    tracing::error!(panic = %detail, "request handler panicked");
    HttpResponder.emit(&ExtractionResult::failure(
        FailureKind::Unexpected,
        format!("Unexpected error: {}", detail),
    ))
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    with_layers(
        Router::new()
            .route("/scrape", post(scrape))
            .route("/health", get(health))
            .with_state(state),
    )
}
