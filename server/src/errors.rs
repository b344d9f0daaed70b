use thiserror::Error;

/// Result type alias for server operations
pub type Result<T, E = AvatarError> = std::result::Result<T, E>;

/// Errors that can occur while serving avatar requests.
///
/// Almost none of these reach a client as a 5xx: input problems degrade to
/// the fallback chain, remote problems are negative-cached and redirected
/// locally. What remains is infrastructure (I/O, response assembly).
#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("failed to build response: {0}")]
    ResponseBuild(String),

    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("image encode failed: {0}")]
    ImageEncode(String),

    #[error("response serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("identity store error: {0}")]
    Store(#[from] identity::StoreError),

    #[error("upstream client error: {0}")]
    UpstreamClient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for AvatarError {
    fn from(e: image::ImageError) -> Self {
        AvatarError::ImageDecode(e.to_string())
    }
}
