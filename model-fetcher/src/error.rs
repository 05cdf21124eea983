use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API returned {0}")]
    Api(String),
    #[error("No downloadable model found for \"{0}\"")]
    NoResult(String),
    #[error("Model {0} has no GLB download")]
    NoGlbDownload(String),
    #[error("No API token; pass --token or set MODEL_API_TOKEN")]
    MissingToken,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
