//! Error taxonomy for the tracking pipeline
//!
//! Every variant is recoverable: callers downgrade to path interpolation or a
//! synthetic orbit instead of aborting the tick loop.

use thiserror::Error;

/// Result type for orbit pipeline operations
pub type OrbitResult<T> = Result<T, OrbitError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// Element set text failed length, checksum or field validation.
    #[error("malformed element set: {0}")]
    MalformedElementSet(String),

    /// The analytic model reported a non-physical state for this instant.
    #[error("propagation failure: {0}")]
    PropagationFailure(String),

    /// The element set source could not deliver data for a satellite.
    #[error("fetch failed for NORAD {norad}: {message}")]
    Fetch { norad: u32, message: String },

    /// A coordinate was NaN/Inf or outside its sanity range.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A sampled path had too few valid samples or a discontinuity.
    #[error("path rejected: {0}")]
    PathQualityRejected(String),
}

impl OrbitError {
    pub fn fetch(norad: u32, err: impl std::fmt::Display) -> Self {
        OrbitError::Fetch {
            norad,
            message: err.to_string(),
        }
    }
}
