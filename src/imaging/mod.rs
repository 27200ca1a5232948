//! Image subsystem.
//!
//! # Data Flow
//! ```text
//! request path + docroot
//!     → source.rs (locate, stat, freshness)
//!     → adapter.rs (plan size/format, run transform under the deadline)
//!     → transform.rs (decode, resize, encode)
//!     → 200 response with caching and negotiation headers
//! ```
//!
//! # Design Decisions
//! - The codec sits behind the `ImageTransform` trait so the adapter can be
//!   tested without encoding real images
//! - Decoding and encoding run on the blocking pool

pub mod adapter;
pub mod source;
pub mod transform;

pub use adapter::ImageAdapter;
pub use source::SourceAsset;
pub use transform::{ImageTransform, RasterTransform};
