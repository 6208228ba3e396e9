use thiserror::Error;

/// Why an overlay could not be produced. Both variants are recoverable:
/// the caller falls back to marker rendering without surfacing an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no raster available")]
    Unavailable,
    #[error("failed to decode raster: {0}")]
    DecodeFailed(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend responded with status {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}
