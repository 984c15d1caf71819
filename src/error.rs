//! Error types for the topic-harvest crate.
//!
//! All errors carry stable string messages suitable for logs and reports.
//! Search backends map their own failures into [`HarvestError::Search`].

/// Errors that can occur while acquiring content.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// A search backend call failed.
    #[error("search error: {0}")]
    Search(String),

    /// The base query of a session failed, so no content was acquired.
    #[error("base search failed: {0}")]
    BaseSearch(String),

    /// Invalid harvest configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A fixture document could not be loaded or parsed.
    #[error("fixture error: {0}")]
    Fixture(String),

    /// A report could not be rendered or serialised.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for topic-harvest results.
pub type Result<T> = std::result::Result<T, HarvestError>;
