//! Transform parameter resolution.
//!
//! # Responsibilities
//! - Parse query overrides (`q`, `dpr`, `w`, `vw`)
//! - Fall back to client-hint negotiation when enabled
//! - Validate the result into a [`TransformRequest`]
//!
//! # Design Decisions
//! - Every field goes through one parse-or-default combinator
//! - A value must parse completely (after trimming) or the default applies
//! - Float fields additionally reject NaN and infinities
//! - `TransformRequest` has private fields; `validate` is the only way to build one

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::HeaderMap;
use thiserror::Error;

use crate::negotiation::hints::ClientHints;
use crate::negotiation::quality::{encode_quality, DEFAULT_QUALITY};

pub const QUALITY_PARAM: &str = "q";
pub const DPR_PARAM: &str = "dpr";
pub const WIDTH_PARAM: &str = "w";
pub const VIEWPORT_WIDTH_PARAM: &str = "vw";

/// Parse a raw value, `None` when absent or unparsable.
pub fn parse_opt<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Parse a raw value, or use `default` when absent or unparsable.
pub fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    parse_opt(raw).unwrap_or(default)
}

/// Like [`parse_opt`] for floats, treating NaN and infinities as unparsable.
pub fn parse_finite(raw: Option<&str>) -> Option<f64> {
    parse_opt::<f64>(raw).filter(|value| value.is_finite())
}

/// A header value as text, if present and visible ASCII.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Decoded query string. The first occurrence of a key wins.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = HashMap::new();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
            }
        }
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Parameters as resolved from the request, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedParameters {
    pub quality: i64,
    pub dpr: f64,
    pub width: i64,
    pub viewport_width: i64,
    pub negotiated: bool,
    pub needs_content_dpr: bool,
}

impl Default for RequestedParameters {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY.into(),
            dpr: 1.0,
            width: 0,
            viewport_width: 0,
            negotiated: false,
            needs_content_dpr: false,
        }
    }
}

impl RequestedParameters {
    /// Resolve parameters from explicit query overrides, client hints, or defaults.
    pub fn resolve(query: &QueryParams, headers: &HeaderMap, content_negotiation: bool) -> Self {
        if query.get(QUALITY_PARAM).is_some_and(|q| !q.is_empty()) {
            return Self::from_query(query);
        }
        if content_negotiation && ClientHints::present(headers) {
            return Self::from_hints(&ClientHints::from_headers(headers));
        }
        Self::default()
    }

    fn from_query(query: &QueryParams) -> Self {
        Self {
            quality: parse_or(query.get(QUALITY_PARAM), DEFAULT_QUALITY.into()),
            dpr: parse_finite(query.get(DPR_PARAM)).unwrap_or(1.0),
            width: parse_or(query.get(WIDTH_PARAM), 0),
            viewport_width: parse_or(query.get(VIEWPORT_WIDTH_PARAM), 0),
            negotiated: false,
            needs_content_dpr: false,
        }
    }

    pub fn from_hints(hints: &ClientHints) -> Self {
        Self {
            quality: encode_quality(hints.network_quality()).into(),
            dpr: if hints.save_data { 1.0 } else { hints.dpr },
            width: hints.width_px,
            viewport_width: hints.viewport_width_px,
            negotiated: true,
            needs_content_dpr: hints.width_px > 0,
        }
    }

    /// Check ranges and pick the effective target width.
    pub fn validate(self) -> Result<TransformRequest, InvalidParameters> {
        if self.width < 0 {
            return Err(InvalidParameters::NegativeWidth(self.width));
        }
        if self.viewport_width < 0 {
            return Err(InvalidParameters::NegativeWidth(self.viewport_width));
        }
        let quality = u8::try_from(self.quality)
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or(InvalidParameters::QualityOutOfRange(self.quality))?;
        if !(self.dpr.is_finite() && self.dpr > 0.0) {
            return Err(InvalidParameters::NonPositiveDpr(self.dpr));
        }

        let target = if self.width > 0 { self.width } else { self.viewport_width };
        let target_width = u32::try_from(target).unwrap_or(u32::MAX);

        Ok(TransformRequest {
            quality,
            target_width,
            dpr: self.dpr,
            negotiated: self.negotiated,
            needs_content_dpr: self.needs_content_dpr,
        })
    }
}

/// Why requested parameters were rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameters {
    #[error("negative width {0}")]
    NegativeWidth(i64),

    #[error("quality {0} outside 1..=100")]
    QualityOutOfRange(i64),

    #[error("device pixel ratio {0} must be positive")]
    NonPositiveDpr(f64),
}

/// Validated transform parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    quality: u8,
    target_width: u32,
    dpr: f64,
    negotiated: bool,
    needs_content_dpr: bool,
}

impl TransformRequest {
    /// Encoder quality, 1..=100.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Requested width in pixels, 0 for natural size.
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Whether the parameters came from client hints.
    pub fn negotiated(&self) -> bool {
        self.negotiated
    }

    pub fn needs_content_dpr(&self) -> bool {
        self.needs_content_dpr
    }
}
