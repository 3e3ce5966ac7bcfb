//! axum hosting for [`crate::handler::process_statement`].
//!
//! The router is a thin adapter: it pulls the method and raw body off the
//! request and hands both to the handler. Two things live here because they
//! concern hosting rather than extraction. A panic inside a request becomes
//! a 500 JSON body with the usual CORS headers. A body over the size limit
//! is answered in the same JSON shape instead of axum's plain-text rejection.

use crate::config::ExtractionConfig;
use crate::error::{ErrorBody, ExtractError};
use crate::handler::{apply_cors_headers, process_statement};
use crate::pipeline::anthropic::MessagesApi;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Largest accepted request body. A base64 PDF is ~4/3 of the file size, so
/// this admits statements up to roughly 24 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn MessagesApi>,
    pub config: Arc<ExtractionConfig>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(api: Arc<dyn MessagesApi>, config: ExtractionConfig) -> Self {
        Self {
            api,
            config: Arc::new(config),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, n: usize) -> Self {
        self.max_body_bytes = n;
        self
    }
}

/// Build the router. The handler answers every method at `/` and
/// `/process-statement`; method policy is the handler's own.
pub fn router(state: AppState) -> Router {
    let limit = state.max_body_bytes;
    Router::new()
        .route("/", any(process_statement_route))
        .route("/process-statement", any(process_statement_route))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn process_statement_route(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => process_statement(&method, &body, state.api.as_ref(), &state.config).await,
        Err(rejection) => {
            let status = rejection.status();
            let mut response = (
                status,
                Json(ErrorBody {
                    error: rejection.body_text(),
                    raw: None,
                }),
            )
                .into_response();
            apply_cors_headers(&mut response);
            response
        }
    }
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };
    error!("Function error: panic: {}", detail);

    let mut response = ExtractError::Internal(detail).into_response();
    apply_cors_headers(&mut response);
    response
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Statement extraction endpoint listening");

    let shutdown_signal = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::anthropic::{MessagesRequest, MessagesResponse};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct FixedApi(&'static str);

    #[async_trait]
    impl MessagesApi for FixedApi {
        async fn create_message(
            &self,
            _request: &MessagesRequest,
            _api_key: &str,
        ) -> Result<MessagesResponse, ExtractError> {
            Ok(MessagesResponse::from_text(self.0))
        }
    }

    struct PanickingApi;

    #[async_trait]
    impl MessagesApi for PanickingApi {
        async fn create_message(
            &self,
            _request: &MessagesRequest,
            _api_key: &str,
        ) -> Result<MessagesResponse, ExtractError> {
            panic!("stub exploded")
        }
    }

    const SYSCO: &str = r#"{"transactions":[{"date":"2026-02-15","merchant":"SYSCO FOODS","amount":1234.56,"category":"Food & Supplies"}]}"#;

    fn app(api: Arc<dyn MessagesApi>) -> Router {
        router(AppState::new(api, ExtractionConfig::default()))
    }

    fn make_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_on_both_paths() {
        for uri in ["/", "/process-statement"] {
            let req = make_request("POST", uri, r#"{"pdfBase64":"JVBERi0x","apiKey":"sk-test"}"#);
            let response = app(Arc::new(FixedApi(SYSCO))).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
            assert_eq!(&body[..], SYSCO.as_bytes());
        }
    }

    #[tokio::test]
    async fn preflight_through_router() {
        let req = make_request("OPTIONS", "/process-statement", "");
        let response = app(Arc::new(FixedApi(SYSCO))).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-methods").unwrap(),
            "POST, OPTIONS"
        );
    }

    #[tokio::test]
    async fn get_through_router_is_405() {
        let req = make_request("GET", "/", "");
        let response = app(Arc::new(FixedApi(SYSCO))).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn oversized_body_is_json_413() {
        let state = AppState::new(Arc::new(FixedApi(SYSCO)), ExtractionConfig::default())
            .with_max_body_bytes(16);
        let req = make_request("POST", "/", r#"{"pdfBase64":"JVBERi0xLjQKJeLjz9MK","apiKey":"sk-test"}"#);
        let response = router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn panic_becomes_500_json() {
        let req = make_request("POST", "/", r#"{"pdfBase64":"JVBERi0x","apiKey":"sk-test"}"#);
        let response = app(Arc::new(PanickingApi)).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "stub exploded");
    }
}
