use thiserror::Error;

/// Top-level datapass errors.
#[derive(Debug, Error)]
pub enum DatapassError {
    #[error("Failed to render into page document: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a dataset read can fail. The orchestrator recovers from all of
/// them the same way, by falling back to the default dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Headless environment: there is no page origin to resolve against.
    #[error("no page origin available to resolve {path}")]
    NoOrigin { path: String },

    #[error("invalid data URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Failed to fetch data from {path}")]
    Status { path: String, status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
