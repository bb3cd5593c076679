//! HTTP surface: single captures, batch runs, and the stored-file mount
//!
//! Routes:
//! - `GET|POST /screenshot` - one capture, PNG bytes back
//! - `POST /capturar`       - batch sweep for a named client, JSON report
//! - `GET /test?url=...`    - batch sweep with a synthesized client name
//! - `GET /`                - status page
//! - `/files/*`             - static mount of the batch output tree

use crate::batch::{self, BatchRequest};
use crate::{capture, normalize_url, CaptureRequest, Error, Section, Viewport};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tracing::error;

/// Shared server state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Root of the batch output tree, served under `/files`
    pub output_root: PathBuf,
    /// Base URL the server is reachable at, for `url_local` links
    pub public_base: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let files = ServeDir::new(state.output_root.clone());

    Router::new()
        .route("/", get(status_page))
        .route("/screenshot", get(screenshot_get).post(screenshot_post))
        .route("/capturar", post(run_batch))
        .route("/test", get(run_test_batch))
        .nest_service("/files", files)
        .with_state(state)
}

/// JSON error envelope: `{error, message, stack, details}`
///
/// `stack` carries the debug rendering of the error chain; automation
/// clients read `message` for the human-readable cause.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
    stack: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid request",
            stack: message.clone(),
            message,
        }
    }

    fn from_capture(err: Error) -> Self {
        match err {
            Error::InvalidRequest(msg) => Self::bad_request(msg),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: "Failed to take screenshot",
                message: other.to_string(),
                stack: format!("{other:?}"),
            },
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Failed to take screenshot",
            stack: message.clone(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.error,
                "message": self.message,
                "stack": self.stack,
                "details": "check server logs for more info",
            })),
        )
            .into_response()
    }
}

async fn status_page() -> Html<&'static str> {
    Html(
        "<h1>Screenshot API is running</h1>\
         <p>POST /screenshot - single capture</p>\
         <p>POST /capturar - batch capture for a client</p>\
         <p>GET /test?url=https://example.com - quick batch test</p>",
    )
}

/// Viewport as the wire accepts it: an object or a JSON-encoded string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ViewportParam {
    Dims(Viewport),
    Encoded(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScreenshotBody {
    url: Option<String>,
    viewport: Option<ViewportParam>,
    section: Option<String>,
    device_scale_factor: Option<f64>,
    full_page: Option<bool>,
    add_browser_bar: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScreenshotQuery {
    url: Option<String>,
    viewport: Option<String>,
    section: Option<String>,
    device_scale_factor: Option<f64>,
    full_page: Option<bool>,
    add_browser_bar: Option<bool>,
    skip_bar: Option<bool>,
}

/// Parse the boundary fields into a typed request, once
///
/// Missing fields take documented defaults; present-but-malformed input is
/// a reported validation error, not a silent default.
fn build_request(
    url: Option<String>,
    viewport: Option<ViewportParam>,
    section: Option<String>,
    device_scale_factor: Option<f64>,
    full_page: Option<bool>,
    add_browser_bar: Option<bool>,
    skip_bar: bool,
) -> Result<CaptureRequest, ApiError> {
    let url = url.unwrap_or_else(|| "https://example.com".to_string());
    let url = normalize_url(&url).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let viewport = match viewport {
        None => Viewport::default(),
        Some(ViewportParam::Dims(v)) => v,
        Some(ViewportParam::Encoded(raw)) => serde_json::from_str(&raw)
            .map_err(|e| ApiError::bad_request(format!("malformed viewport {raw:?}: {e}")))?,
    };
    if viewport.width == 0 || viewport.height == 0 {
        return Err(ApiError::bad_request(format!(
            "viewport dimensions must be positive, got {}x{}",
            viewport.width, viewport.height
        )));
    }

    let device_scale_factor = device_scale_factor.unwrap_or(1.0);
    if !(device_scale_factor > 0.0) {
        return Err(ApiError::bad_request(format!(
            "deviceScaleFactor must be positive, got {device_scale_factor}"
        )));
    }

    Ok(CaptureRequest {
        url,
        viewport,
        device_scale_factor,
        section: Section::from_name(section.as_deref().unwrap_or("header")),
        full_page: full_page.unwrap_or(false),
        browser_bar: add_browser_bar.unwrap_or(true) && !skip_bar,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SkipBarQuery {
    skip_bar: Option<bool>,
}

async fn screenshot_post(
    Query(flags): Query<SkipBarQuery>,
    body: Option<Json<ScreenshotBody>>,
) -> Result<Response, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let request = build_request(
        body.url,
        body.viewport,
        body.section,
        body.device_scale_factor,
        body.full_page,
        body.add_browser_bar,
        flags.skip_bar.unwrap_or(false),
    )?;
    run_capture(request).await
}

async fn screenshot_get(Query(query): Query<ScreenshotQuery>) -> Result<Response, ApiError> {
    let request = build_request(
        query.url,
        query.viewport.map(ViewportParam::Encoded),
        query.section,
        query.device_scale_factor,
        query.full_page,
        query.add_browser_bar,
        query.skip_bar.unwrap_or(false),
    )?;
    run_capture(request).await
}

async fn run_capture(request: CaptureRequest) -> Result<Response, ApiError> {
    let bytes = tokio::task::spawn_blocking(move || capture::capture_once(&request))
        .await
        .map_err(|e| ApiError::internal(format!("capture task panicked: {e}")))?
        .map_err(|e| {
            error!(error = %e, "capture failed");
            ApiError::from_capture(e)
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    )
        .into_response())
}

async fn run_batch(State(state): State<AppState>, Json(request): Json<BatchRequest>) -> Response {
    batch_response(state, request).await
}

#[derive(Debug, Deserialize)]
struct TestQuery {
    url: Option<String>,
}

async fn run_test_batch(State(state): State<AppState>, Query(query): Query<TestQuery>) -> Response {
    let Some(url) = query.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing url parameter" })),
        )
            .into_response();
    };

    let request = BatchRequest {
        url_base: url,
        cliente_nombre: "test_capture".to_string(),
        wp_url: None,
        wp_user: None,
        wp_pass: None,
        include_browser_bar: true,
    };
    batch_response(state, request).await
}

async fn batch_response(state: AppState, request: BatchRequest) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        batch::run(&request, &state.output_root, Some(&state.public_base))
    })
    .await;

    match result {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "batch run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": format!("batch task panicked: {e}") })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_defaults() {
        let request = build_request(None, None, None, None, None, None, false).unwrap();
        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.viewport, Viewport::default());
        assert_eq!(request.section, Section::Header);
        assert!(request.browser_bar);
        assert!(!request.full_page);
    }

    #[test]
    fn test_build_request_encoded_viewport() {
        let request = build_request(
            Some("example.com".into()),
            Some(ViewportParam::Encoded(r#"{"width":800,"height":600}"#.into())),
            Some("footer".into()),
            None,
            None,
            None,
            false,
        )
        .unwrap();
        assert_eq!(request.viewport, Viewport { width: 800, height: 600 });
        assert_eq!(request.section, Section::Footer);
    }

    #[test]
    fn test_build_request_rejects_malformed_viewport() {
        let err = build_request(
            None,
            Some(ViewportParam::Encoded("not json".into())),
            None,
            None,
            None,
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_build_request_rejects_zero_viewport() {
        let err = build_request(
            None,
            Some(ViewportParam::Dims(Viewport { width: 0, height: 600 })),
            None,
            None,
            None,
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_skip_bar_forces_overlay_off() {
        let request = build_request(None, None, None, None, None, Some(true), true).unwrap();
        assert!(!request.browser_bar);
    }

    #[test]
    fn test_negative_scale_rejected() {
        let err = build_request(None, None, None, Some(-2.0), None, None, false).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
