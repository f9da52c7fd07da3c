//! Error types for the conversion engine.

use thiserror::Error;

/// Stable numeric error code, mirrored from the original API's integer error codes.
///
/// Each variant has a fixed discriminant so callers that only see the numeric
/// code (e.g. across an FFI boundary, were one ever added) can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Allocation of a ring buffer, scratch region, or graph node failed.
    OutOfMemory = 1,
    /// An argument violated a documented precondition.
    IllegalArgument = 2,
    /// The requested conversion has no supported filter chain.
    UnsupportedOperation = 3,
    /// An arithmetic computation would overflow its representable range.
    NumericOverflow = 4,
    /// An internal invariant was violated (a bug in this crate, not caller error).
    LogicError = 5,
    /// A GRAY or RGB format was given non-zero chroma subsampling.
    GreyscaleSubsampling = 6,
    /// Two formats that must share a color family do not.
    ColorFamilyMismatch = 7,
    /// A dimension is not divisible by the required subsampling factor.
    ImageNotDivisible = 8,
    /// A requested bit depth exceeds the pixel type's container width.
    BitDepthOverflow = 9,
    /// Catch-all for failures with no more specific code.
    Unknown = 0,
}

/// Errors produced by graph construction or argument validation.
///
/// `process` itself never returns an error (see the spec's failure semantics):
/// these are all raised at `FilterGraph::build` time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Allocation of a ring buffer or scratch region failed.
    #[error("out of memory: {reason}")]
    OutOfMemory {
        /// Human-readable description of what allocation failed.
        reason: String,
    },

    /// An argument violated a documented precondition.
    #[error("illegal argument: {message}")]
    IllegalArgument {
        /// Human-readable description of the violated precondition.
        message: String,
    },

    /// No supported filter chain exists for the requested conversion.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable description of what is unsupported.
        message: String,
    },

    /// A computed quantity overflowed its representable range.
    #[error("numeric overflow: {message}")]
    NumericOverflow {
        /// Human-readable description of the overflow.
        message: String,
    },

    /// An internal invariant was violated.
    #[error("logic error: {message}")]
    LogicError {
        /// Human-readable description of the violated invariant.
        message: String,
    },

    /// A GRAY or RGB format was given non-zero chroma subsampling.
    #[error("greyscale/RGB format cannot be subsampled: {message}")]
    GreyscaleSubsampling {
        /// Human-readable description.
        message: String,
    },

    /// Two formats that must share a color family do not.
    #[error("color family mismatch: {message}")]
    ColorFamilyMismatch {
        /// Human-readable description.
        message: String,
    },

    /// A dimension is not divisible by the required subsampling factor.
    #[error("dimension {dimension} not divisible by subsampling factor {factor}")]
    ImageNotDivisible {
        /// The offending dimension.
        dimension: usize,
        /// The subsampling factor it must divide evenly by.
        factor: usize,
    },

    /// A requested bit depth exceeds the pixel type's container width.
    #[error("bit depth {depth} exceeds container width {max} for this pixel type")]
    BitDepthOverflow {
        /// The requested depth.
        depth: u32,
        /// The maximum depth the container can hold.
        max: u32,
    },

    /// Catch-all for failures with no more specific code.
    #[error("unknown error: {message}")]
    Unknown {
        /// Human-readable description.
        message: String,
    },
}

impl Error {
    /// The stable numeric code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            Error::IllegalArgument { .. } => ErrorCode::IllegalArgument,
            Error::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            Error::NumericOverflow { .. } => ErrorCode::NumericOverflow,
            Error::LogicError { .. } => ErrorCode::LogicError,
            Error::GreyscaleSubsampling { .. } => ErrorCode::GreyscaleSubsampling,
            Error::ColorFamilyMismatch { .. } => ErrorCode::ColorFamilyMismatch,
            Error::ImageNotDivisible { .. } => ErrorCode::ImageNotDivisible,
            Error::BitDepthOverflow { .. } => ErrorCode::BitDepthOverflow,
            Error::Unknown { .. } => ErrorCode::Unknown,
        }
    }

    /// Constructs an [`Error::IllegalArgument`] from a displayable message.
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Error::IllegalArgument { message: message.into() }
    }

    /// Constructs an [`Error::UnsupportedOperation`] from a displayable message.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedOperation { message: message.into() }
    }

    /// Constructs an [`Error::LogicError`] from a displayable message.
    pub fn logic_error(message: impl Into<String>) -> Self {
        Error::LogicError { message: message.into() }
    }

    /// True if this error indicates a format-validation problem rather than
    /// a resource-exhaustion problem.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::GreyscaleSubsampling { .. }
                | Error::ColorFamilyMismatch { .. }
                | Error::ImageNotDivisible { .. }
                | Error::BitDepthOverflow { .. }
        )
    }

    /// True if this error indicates allocation failure.
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}

/// Result type used throughout the conversion engine.
pub type Result<T> = std::result::Result<T, Error>;
