//! Client hint extraction.
//!
//! # Responsibilities
//! - Read the network and device hint headers of one request
//! - Apply the per-field defaults through `params::parse_or`
//!
//! # Design Decisions
//! - Header names are matched case-insensitively (HeaderMap semantics)
//! - `Save-Data` is read from its real wire name
//! - An absent `Downlink` is `None`, not zero, so it never triggers a penalty

use axum::http::HeaderMap;

use crate::negotiation::params::{header_str, parse_finite, parse_or};

pub const ECT: &str = "ect";
pub const RTT: &str = "rtt";
pub const DOWNLINK: &str = "downlink";
pub const WIDTH: &str = "width";
pub const VIEWPORT_WIDTH: &str = "viewport-width";
pub const DPR: &str = "dpr";
pub const SAVE_DATA: &str = "save-data";

/// Effective connection type tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ect {
    Slow2G,
    TwoG,
    ThreeG,
    /// `4g`, and the tier for anything unrecognized.
    #[default]
    FourG,
}

impl Ect {
    /// Parse an `ECT` header value. Unknown values fall back to [`Ect::FourG`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => Ect::Slow2G,
            "2g" => Ect::TwoG,
            "3g" => Ect::ThreeG,
            _ => Ect::FourG,
        }
    }
}

/// Snapshot of the hints carried by one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientHints {
    pub save_data: bool,
    pub ect: Ect,
    pub rtt_ms: u32,
    pub downlink_mbps: Option<f64>,
    pub width_px: i64,
    pub viewport_width_px: i64,
    pub dpr: f64,
}

impl Default for ClientHints {
    fn default() -> Self {
        Self {
            save_data: false,
            ect: Ect::FourG,
            rtt_ms: 0,
            downlink_mbps: None,
            width_px: 0,
            viewport_width_px: 0,
            dpr: 1.0,
        }
    }
}

impl ClientHints {
    /// Returns true if any header that turns on negotiation is present.
    pub fn present(headers: &HeaderMap) -> bool {
        [ECT, WIDTH, VIEWPORT_WIDTH, SAVE_DATA]
            .iter()
            .any(|name| headers.contains_key(*name))
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let save_data = header_str(headers, SAVE_DATA)
            .map(|v| v.trim().eq_ignore_ascii_case("on"))
            .unwrap_or(false);

        Self {
            save_data,
            ect: header_str(headers, ECT).map(Ect::parse).unwrap_or_default(),
            rtt_ms: parse_or(header_str(headers, RTT), 0),
            downlink_mbps: parse_finite(header_str(headers, DOWNLINK)).filter(|dl| *dl >= 0.0),
            width_px: parse_or(header_str(headers, WIDTH), 0),
            viewport_width_px: parse_or(header_str(headers, VIEWPORT_WIDTH), 0),
            dpr: parse_finite(header_str(headers, DPR)).unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes()).unwrap();
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_ect_parse() {
        assert_eq!(Ect::parse("slow-2g"), Ect::Slow2G);
        assert_eq!(Ect::parse("2G"), Ect::TwoG);
        assert_eq!(Ect::parse(" 3g "), Ect::ThreeG);
        assert_eq!(Ect::parse("4g"), Ect::FourG);
        assert_eq!(Ect::parse("5g"), Ect::FourG);
    }

    #[test]
    fn test_defaults_when_absent() {
        let hints = ClientHints::from_headers(&HeaderMap::new());
        assert_eq!(hints, ClientHints::default());
        assert!(!ClientHints::present(&HeaderMap::new()));
    }

    #[test]
    fn test_reads_all_hints() {
        let map = headers(&[
            ("ECT", "3g"),
            ("RTT", "900"),
            ("Downlink", "0.3"),
            ("Width", "320"),
            ("Viewport-Width", "1024"),
            ("DPR", "2.5"),
        ]);
        let hints = ClientHints::from_headers(&map);
        assert_eq!(hints.ect, Ect::ThreeG);
        assert_eq!(hints.rtt_ms, 900);
        assert_eq!(hints.downlink_mbps, Some(0.3));
        assert_eq!(hints.width_px, 320);
        assert_eq!(hints.viewport_width_px, 1024);
        assert_eq!(hints.dpr, 2.5);
        assert!(!hints.save_data);
    }

    #[test]
    fn test_save_data_uses_wire_header_name() {
        let map = headers(&[("Save-Data", "On")]);
        assert!(ClientHints::present(&map));
        assert!(ClientHints::from_headers(&map).save_data);

        let map = headers(&[("Save-Data", "off")]);
        assert!(!ClientHints::from_headers(&map).save_data);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let map = headers(&[("RTT", "fast"), ("Downlink", "NaN"), ("Width", "12px"), ("DPR", "inf")]);
        let hints = ClientHints::from_headers(&map);
        assert_eq!(hints.rtt_ms, 0);
        assert_eq!(hints.downlink_mbps, None);
        assert_eq!(hints.width_px, 0);
        assert_eq!(hints.dpr, 1.0);
    }

    #[test]
    fn test_integer_hints_require_whole_values() {
        let map = headers(&[("RTT", "900.5"), ("Width", "320.5"), ("Viewport-Width", "1024.0")]);
        let hints = ClientHints::from_headers(&map);
        assert_eq!(hints.rtt_ms, 0);
        assert_eq!(hints.width_px, 0);
        assert_eq!(hints.viewport_width_px, 0);
    }

    #[test]
    fn test_rtt_and_downlink_alone_do_not_trigger_negotiation() {
        let map = headers(&[("RTT", "100"), ("Downlink", "10"), ("DPR", "2")]);
        assert!(!ClientHints::present(&map));
    }
}
