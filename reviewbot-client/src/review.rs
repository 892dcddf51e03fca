//! Review-status API client

use reqwest::Client;
use reviewbot_core::Checkpoint;
use reviewbot_core::dto::homework::HomeworkStatuses;
use tracing::debug;

use crate::error::{ClientError, FetchError};
use crate::{DEFAULT_REQUEST_TIMEOUT, http_client, read_success_body};

/// Client for the homework review-status endpoint
#[derive(Clone)]
pub struct ReviewApiClient {
    /// Full URL of the status endpoint
    endpoint: String,
    /// OAuth token sent in the `Authorization` header
    token: String,
    client: Client,
}

impl ReviewApiClient {
    /// Create a new client whose requests time out after [`DEFAULT_REQUEST_TIMEOUT`]
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> crate::Result<Self> {
        let client = http_client(DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::with_client(endpoint, token, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(endpoint: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches submissions updated since `since` (now, when `None`)
    ///
    /// # Errors
    /// Transport failures, non-success status codes and non-JSON bodies.
    /// A JSON body with an unexpected shape is not an error; see
    /// [`HomeworkStatuses::parse`].
    pub async fn fetch_statuses(
        &self,
        since: Option<Checkpoint>,
    ) -> Result<HomeworkStatuses, FetchError> {
        let from_date = since.unwrap_or_else(Checkpoint::now);
        debug!("Querying homework statuses from_date={}", from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from_date", from_date.as_secs())])
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .send()
            .await
            .map_err(ClientError::from)?;

        let body = read_success_body(response).await?;

        let statuses = HomeworkStatuses::parse(&body).map_err(|e| {
            ClientError::ParseError(format!("Failed to parse JSON response: {}", e))
        })?;

        debug!(
            "Received {} submission(s), current_date={:?}",
            statuses.homeworks.len(),
            statuses.current_date
        );

        Ok(statuses)
    }
}

impl std::fmt::Debug for ReviewApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewApiClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}
