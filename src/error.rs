//! Error types for loading and preparing a home value table.
//!
//! Only file-level failures surface here. Row-level problems (unparseable
//! month headers, short rows, non-numeric cells) are recovered inside the
//! preparer and never become a [`DataError`]. Geocoding failures are
//! reported as [`GeocodeError`] by the backend and swallowed by the
//! geocoder.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::data::prepare::DatasetPreparer`].
#[derive(Debug, Error)]
pub enum DataError {
    /// The input file does not exist.
    #[error(
        "Data file not found: {}. Place the CSV next to the executable or set ZHVI_DATA_PATH.",
        .path.display()
    )]
    Unavailable { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not parseable as delimited text.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required identifying column is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

impl DataError {
    /// Whether this is the "file is simply not there" case, which the UI
    /// reports as a plain message rather than an error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DataError::Unavailable { .. })
    }
}

/// Errors from a geocoding backend. The geocoder turns every one of these
/// into "coordinates unknown".
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Transport or decode failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the service.
    #[error("Geocoder returned status {0}")]
    Status(u16),

    /// A result whose coordinates are not numbers.
    #[error("Invalid coordinate in response: {0}")]
    InvalidCoordinate(String),
}

/// Result type for data preparation.
pub type DataResult<T> = Result<T, DataError>;
