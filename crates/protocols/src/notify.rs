//! Notification delivery. The default sink only logs; Telegram delivery is
//! opt-in via `TELEGRAM_TOKEN`.

use crate::error::ProviderError;
use crate::REQUEST_TIMEOUT;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivery channel for user notifications, addressed by platform id.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers `text` to the user behind `platform_id`.
    async fn notify(&self, platform_id: i64, text: &str) -> Result<(), ProviderError>;
}

/// Sink that records the would-be delivery in the log and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, platform_id: i64, text: &str) -> Result<(), ProviderError> {
        info!(user = platform_id, message = %text, "would notify user");
        Ok(())
    }
}

/// Sink delivering through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramSink {
    client: Client,
    send_url: String,
}

impl TelegramSink {
    /// Builds a sink for the bot behind `token`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(token: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::request)?;
        Ok(Self {
            client,
            send_url: format!("{TELEGRAM_API_BASE}/bot{token}/sendMessage"),
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn notify(&self, platform_id: i64, text: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(&self.send_url)
            .json(&json!({ "chat_id": platform_id, "text": text }))
            .send()
            .await
            .map_err(ProviderError::request)?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_always_succeeds() {
        LogSink.notify(42, "Low gas prices: 28 Gwei").await.unwrap();
    }
}
