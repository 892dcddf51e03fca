//! Reviewbot HTTP Clients
//!
//! Thin, typed clients for the two external services the notifier talks to:
//! - [`ReviewApiClient`]: the homework review-status API
//! - [`TelegramClient`]: the Telegram Bot API, used to deliver notifications
//!
//! Both clients share one [`reqwest::Client`], built by [`http_client`] with
//! an explicit request timeout.
//!
//! # Example
//!
//! ```no_run
//! use reviewbot_client::{ReviewApiClient, TelegramClient, http_client};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = http_client(Duration::from_secs(30))?;
//!     let reviews = ReviewApiClient::with_client(
//!         "https://praktikum.yandex.ru/api/user_api/homework_statuses/",
//!         "review-token",
//!         http.clone(),
//!     );
//!     let telegram = TelegramClient::with_client("https://api.telegram.org", "bot-token", "42", http);
//!
//!     let statuses = reviews.fetch_statuses(None).await?;
//!     println!("{} submission(s)", statuses.homeworks.len());
//!     telegram.send_message("hello").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod review;
mod telegram;

// Re-export commonly used types
pub use error::{ClientError, DeliveryError, FetchError, Result};
pub use review::ReviewApiClient;
pub use reviewbot_core::dto::homework::HomeworkStatuses;
pub use telegram::TelegramClient;

use reqwest::Client;
use std::time::Duration;

/// Request timeout used by the `new` constructors
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by both API clients
///
/// Every request made through it fails after `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Reads the response body, turning non-success statuses into an API error
async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::api_error(status.as_u16(), body));
    }

    Ok(body)
}
