use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one listing into a record. Always contained to that listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("field {field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("unknown {field} label: {label:?}")]
    UnknownLabel { field: &'static str, label: String },
}

impl ExtractionError {
    /// True when the failure comes from a gap in the translation vocabulary.
    pub fn is_unknown_label(&self) -> bool {
        matches!(self, ExtractionError::UnknownLabel { .. })
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("timed out waiting for {url} to become ready")]
    WaitTimeout { url: String },

    #[error("failed to capture snapshot: {0}")]
    Snapshot(String),

    #[error("precondition not met: {0}")]
    Precondition(String),
}

impl FetchError {
    /// Wait timeouts end the whole run, everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::WaitTimeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("invalid selector for {role}: {selector:?} ({reason})")]
    Selector {
        role: String,
        selector: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("output failed: {0}")]
    Sink(#[from] SinkError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}
