//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the delivery handler
//! - Wire up middleware (tracing, request ID)
//! - Serve on a listener until shutdown
//! - Dispatch: method → host → source → freshness → parameters → adapter
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use axum::{
    body::Body,
    extract::State,
    http::{header::IF_MODIFIED_SINCE, request::Parts, HeaderMap, Method, Request},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{LiveConfig, Snapshot};
use crate::http::request::{
    propagate_request_id_layer, request_host, request_id, set_request_id_layer,
};
use crate::http::response::{not_modified, DeliveryError};
use crate::imaging::source::{locate, SourceAsset};
use crate::imaging::{ImageAdapter, ImageTransform};
use crate::negotiation::{QueryParams, RequestedParameters};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<LiveConfig>,
    pub adapter: ImageAdapter,
}

/// HTTP server for adaptive image delivery.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the live configuration.
    pub fn new(live: Arc<LiveConfig>, transform: Arc<dyn ImageTransform>) -> Self {
        let state = AppState {
            live,
            adapter: ImageAdapter::new(transform),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Every path goes to the delivery handler; the request ID is assigned
    /// outermost so trace spans and responses both carry it.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(deliver)
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Delivery handler. Loads one config snapshot and uses it for the whole request.
async fn deliver(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let snapshot = state.live.load();
    let deadline = snapshot
        .config
        .timeouts
        .request_timeout()
        .map(|timeout| tokio::time::Instant::now() + timeout);

    let (parts, _body) = request.into_parts();
    let request_id = request_id(&parts.headers);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %parts.uri.path(),
        "Dispatching request"
    );

    let response = match dispatch(&state, &snapshot, &parts, deadline).await {
        Ok(response) => response,
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, path = %parts.uri.path(), error = %e, "Request failed");
            } else {
                tracing::debug!(request_id = %request_id, path = %parts.uri.path(), status = %status, error = %e, "Request rejected");
            }
            e.into_response()
        }
    };

    metrics::record_request(&parts.method, response.status().as_u16(), started);
    response
}

async fn dispatch(
    state: &AppState,
    snapshot: &Snapshot,
    parts: &Parts,
    deadline: Option<tokio::time::Instant>,
) -> Result<Response, DeliveryError> {
    let head_only = match parts.method {
        Method::GET => false,
        Method::HEAD => true,
        ref other => return Err(DeliveryError::MethodNotAllowed(other.clone())),
    };

    let host = request_host(&parts.headers, &parts.uri);
    let root = snapshot.routes.resolve(&host).ok_or_else(|| {
        tracing::debug!(host = %host, "No docroot for host");
        DeliveryError::NotFound
    })?;
    let path = locate(root, parts.uri.path()).ok_or(DeliveryError::NotFound)?;
    let asset = SourceAsset::stat(path).await?;

    let delivery = &snapshot.config.delivery;
    if let Some(since) = if_modified_since(&parts.headers) {
        if asset.not_modified_since(since) {
            return Ok(not_modified(delivery, asset.last_modified()));
        }
    }

    let query = QueryParams::parse(parts.uri.query());
    let transform = RequestedParameters::resolve(&query, &parts.headers, delivery.content_negotiation)
        .validate()?;

    state
        .adapter
        .adapt(&asset, &transform, delivery, deadline, head_only)
        .await
        .inspect_err(|e| {
            if matches!(e, DeliveryError::DeadlineExceeded) {
                tracing::warn!(path = %asset.path().display(), "Request deadline exceeded during transform");
            }
        })
}

/// `If-Modified-Since` as a timestamp; absent or unparsable headers are ignored.
fn if_modified_since(headers: &HeaderMap) -> Option<SystemTime> {
    let value = headers.get(IF_MODIFIED_SINCE)?.to_str().ok()?;
    httpdate::parse_http_date(value.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_if_modified_since_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(if_modified_since(&headers), None);

        headers.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("yesterday"));
        assert_eq!(if_modified_since(&headers), None);

        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );
        let expected = std::time::UNIX_EPOCH + std::time::Duration::from_secs(784_111_777);
        assert_eq!(if_modified_since(&headers), Some(expected));
    }
}
