//! Telegram Bot API client
//!
//! Only `sendMessage` is needed: every notification goes to the single chat
//! configured at startup.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, DeliveryError};
use crate::{DEFAULT_REQUEST_TIMEOUT, http_client};

/// Sends text messages to one fixed chat through the Bot API
#[derive(Clone)]
pub struct TelegramClient {
    /// Bot API base URL (e.g., "https://api.telegram.org")
    base_url: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    /// Create a new client whose requests time out after [`DEFAULT_REQUEST_TIMEOUT`]
    pub fn new(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> crate::Result<Self> {
        let client = http_client(DEFAULT_REQUEST_TIMEOUT)?;
        Ok(Self::with_client(base_url, bot_token, chat_id, client))
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    /// Get the base URL of the Bot API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the recipient chat
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    /// Send a text message to the configured chat
    ///
    /// # Errors
    /// Transport failures and any response that is not `"ok": true`.
    /// Request URLs are stripped from transport errors since they embed the
    /// bot token.
    pub async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::RequestFailed(e.without_url()))?;

        match serde_json::from_str::<TelegramApiResponse>(&body) {
            Ok(result) if result.ok => {
                info!("Message sent to chat {}", self.chat_id);
                Ok(())
            }
            Ok(result) => Err(ClientError::api_error(
                status.as_u16(),
                result.description.unwrap_or_default(),
            )
            .into()),
            Err(_) if !status.is_success() => {
                Err(ClientError::api_error(status.as_u16(), body).into())
            }
            Err(e) => Err(ClientError::ParseError(format!("Invalid send response: {}", e)).into()),
        }
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
