//! Error types for the reviewbot clients

use reviewbot_core::truncate_chars;
use thiserror::Error;

/// Longest API error message kept, in characters; error pages can be huge
pub const MAX_API_MESSAGE_CHARS: usize = 300;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to an external API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    ///
    /// The message is cut to [`MAX_API_MESSAGE_CHARS`].
    pub fn api_error(status: u16, message: impl AsRef<str>) -> Self {
        Self::ApiError {
            status,
            message: truncate_chars(message.as_ref().trim(), MAX_API_MESSAGE_CHARS),
        }
    }
}

/// Failure querying the review-status API
#[derive(Debug, Error)]
#[error("failed to fetch homework statuses: {0}")]
pub struct FetchError(#[from] pub ClientError);

/// Failure delivering a message through the bot API
#[derive(Debug, Error)]
#[error("failed to deliver message: {0}")]
pub struct DeliveryError(#[from] pub ClientError);
