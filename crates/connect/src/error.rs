//! External service error types

/// Connector result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the external service wrappers
///
/// No retries happen at this layer; a failure is propagated untouched for
/// the boundary to map to a 5xx-equivalent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Turn a non-success response into an [`Error::Api`] carrying the body text
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
