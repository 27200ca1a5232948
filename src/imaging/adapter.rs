//! Image adaptation.
//!
//! # Responsibilities
//! - Decide output size, format and Content-DPR from the source and the request
//! - Run the transform off the async executor, bounded by the request deadline
//! - Assemble the 200 response headers
//!
//! # Design Decisions
//! - Planning is a pure function so every branch is testable without a codec
//! - Outputs at or above the WebP dimension ceiling keep the source format
//! - Any transform failure is a 500; the cause is only logged

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;

use crate::config::schema::DeliveryConfig;
use crate::http::response::{
    format_content_dpr, insert_cache_headers, insert_negotiation_headers, insert_text,
    DeliveryError, CONTENT_DPR,
};
use crate::imaging::source::SourceAsset;
use crate::imaging::transform::{Encoding, ImageTransform, RenderPlan, SourceImage};
use crate::negotiation::TransformRequest;
use crate::observability::metrics;

/// Largest width or height (exclusive) the WebP encoder accepts.
pub const MAX_WEBP_DIMENSION: u32 = 16383;

/// The adapter's decision for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationPlan {
    pub width: u32,
    pub height: u32,
    /// DPR correction when a target width was requested.
    pub content_dpr: Option<f64>,
    pub render: RenderPlan,
}

/// Decide how to adapt `source` for `request`.
pub fn plan(source: &SourceImage, request: &TransformRequest) -> AdaptationPlan {
    let requested = request.target_width();
    let width = if requested > 0 {
        requested.min(source.width)
    } else {
        source.width
    };

    let content_dpr =
        (requested > 0).then(|| f64::from(width) / f64::from(requested) * request.dpr());

    let height = scaled_height(source, width);
    let resize = (width != source.width).then_some((width, height));

    let encoding = if width < MAX_WEBP_DIMENSION && height < MAX_WEBP_DIMENSION {
        Encoding::WebP {
            quality: request.quality(),
        }
    } else {
        Encoding::Native(source.format.passthrough())
    };

    AdaptationPlan {
        width,
        height,
        content_dpr,
        render: RenderPlan { resize, encoding },
    }
}

/// Height preserving the aspect ratio at `width`, rounded, never zero.
fn scaled_height(source: &SourceImage, width: u32) -> u32 {
    if source.width == 0 || width == source.width {
        return source.height;
    }
    let natural_width = u64::from(source.width);
    let scaled = (u64::from(source.height) * u64::from(width) * 2 + natural_width) / (natural_width * 2);
    u32::try_from(scaled.max(1)).unwrap_or(u32::MAX)
}

/// Runs transforms and builds successful responses.
#[derive(Clone)]
pub struct ImageAdapter {
    transform: Arc<dyn ImageTransform>,
}

impl ImageAdapter {
    pub fn new(transform: Arc<dyn ImageTransform>) -> Self {
        Self { transform }
    }

    /// Produce the 200 response for `asset`, or a 500-class error.
    pub async fn adapt(
        &self,
        asset: &SourceAsset,
        request: &TransformRequest,
        delivery: &DeliveryConfig,
        deadline: Option<tokio::time::Instant>,
        head_only: bool,
    ) -> Result<Response, DeliveryError> {
        let started = Instant::now();
        let transform = Arc::clone(&self.transform);
        let path = asset.path().to_path_buf();
        let job_request = request.clone();

        let job = tokio::task::spawn_blocking(move || {
            let source = transform.inspect(&path)?;
            let plan = plan(&source, &job_request);
            let bytes = transform.render(&path, &plan.render)?;
            Ok::<_, DeliveryError>((plan, bytes))
        });

        let joined = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, job)
                .await
                .map_err(|_| DeliveryError::DeadlineExceeded)?,
            None => job.await,
        };
        let (plan, bytes) = joined.map_err(|e| DeliveryError::Task(e.to_string()))??;

        metrics::record_transform(plan.render.encoding.label(), started);
        tracing::debug!(
            path = %asset.path().display(),
            width = plan.width,
            height = plan.height,
            encoding = plan.render.encoding.label(),
            bytes = bytes.len(),
            "Image adapted"
        );

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        insert_cache_headers(headers, delivery, asset.last_modified());
        insert_text(headers, CONTENT_TYPE, &plan.render.encoding.content_type());
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        if request.negotiated() {
            insert_negotiation_headers(headers, delivery);
        }
        if request.needs_content_dpr() {
            if let Some(dpr) = plan.content_dpr.filter(|dpr| *dpr != 0.0) {
                insert_text(headers, CONTENT_DPR, &format_content_dpr(dpr));
            }
        }

        if !head_only {
            *response.body_mut() = Body::from(bytes);
        }
        Ok(response)
    }
}
