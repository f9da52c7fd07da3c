//! Streaming, line-granular image format conversion engine.
//!
//! Converts between pixel formats (sample type, bit depth, subsampling,
//! color family and matrix/transfer/primaries metadata) by assembling a
//! chain of [`filter::Filter`] stages and driving them with a ring-buffered
//! [`scheduler::Scheduler`], the same two-phase "build a graph, then run it"
//! shape as the original API's `zimg_filter_graph_build`/`_process` pair.
//!
//! [`graph::FilterGraph`] is the entry point most callers want; the lower
//! modules are exposed for the conformance harness and for callers who want
//! to drive a custom filter chain directly.

pub mod buffer;
pub mod error;
pub mod filter;
pub mod filters;
pub mod format;
pub mod graph;
pub mod last_error;
pub mod pixel;
pub mod scheduler;

pub use error::{Error, ErrorCode, Result};
pub use format::ImageFormat;
pub use graph::{FilterGraph, FilterGraphParams};
pub use last_error::{clear_last_error, last_error};
pub use pixel::PixelType;

/// API version, mirroring `zimg2_api_version`: callers can branch on this to
/// detect which optional behaviors are present.
pub const API_VERSION: u32 = 4;

/// Returns `(major, minor, micro)` for this crate, the Rust-native
/// counterpart of `zimg_get_version_info`.
pub fn version_info() -> (u32, u32, u32) {
    let mut parts = env!("CARGO_PKG_VERSION").split('.').map(|p| p.parse().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// Returns the API version this build implements, the counterpart of
/// `zimg_get_api_version`.
pub fn api_version() -> u32 {
    API_VERSION
}
