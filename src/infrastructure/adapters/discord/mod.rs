//! Discord adapter

pub mod gateway;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::traits::{Bot, BotInfo};

pub use gateway::{GatewaySession, INTENT_GUILD_MESSAGES, INTENT_MESSAGE_CONTENT};

/// Discord REST API base URL
const API_BASE: &str = "https://discord.com/api/v10";

/// Discord gateway URL
const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Discord bot adapter
pub struct DiscordAdapter {
    token: String,
    client: Client,
    api_base: String,
    gateway_url: String,
    intents: u64,
    info: BotInfo,
}

impl DiscordAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            api_base: API_BASE.to_string(),
            gateway_url: GATEWAY_URL.to_string(),
            intents: INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT,
            info: BotInfo::default(),
        }
    }

    #[cfg(test)]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Open the gateway session and learn the bot's own identity
    pub async fn connect(&mut self) -> Result<GatewaySession, BotError> {
        let (session, info) = GatewaySession::open(&self.gateway_url, &self.token, self.intents).await?;
        self.info = info;
        Ok(session)
    }

    /// Get the API URL for a path
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }
}

#[async_trait]
impl Bot for DiscordAdapter {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct CreateMessageRequest<'a> {
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResponse {
            id: String,
        }

        tracing::debug!("Sending to {}: {}", channel_id, text);

        let url = self.api_url(&format!("channels/{}/messages", channel_id));
        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&CreateMessageRequest { content: text })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("Discord API error {}: {}", status, error)));
        }

        let data: MessageResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.id)
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
