//! GroupMe bot client.
//!
//! Posts text through `POST /bots/post`. Character-limit handling happens
//! before this layer; the client sends exactly what it is given.

use async_trait::async_trait;
use common::config::GroupMeConfig;
use common::{format_error_chain, ChatSink, Error};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct BotPost<'a> {
    bot_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct GroupMeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bot_id: String,
}

impl GroupMeClient {
    pub fn new(cfg: &GroupMeConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("league-notifier/0.1")
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build GroupMe HTTP client");

        Self {
            client,
            base_url: cfg.base_url.trim().trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            bot_id: cfg.bot_id.clone(),
        }
    }

    fn post_url(&self) -> String {
        format!("{}/bots/post", self.base_url)
    }

    /// Send one message as the configured bot.
    pub async fn send_message(&self, text: &str) -> Result<(), Error> {
        let body = BotPost {
            bot_id: &self.bot_id,
            text,
        };

        let mut req = self.client.post(self.post_url()).json(&body);
        if !self.api_key.is_empty() {
            req = req.header("X-Access-Token", &self.api_key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::GroupMe(format_error_chain(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("GroupMe rejected bot post: {} {}", status, body);
            return Err(Error::GroupMe(format!(
                "bot post returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        debug!("Posted {} chars to GroupMe", text.chars().count());
        Ok(())
    }
}

#[async_trait]
impl ChatSink for GroupMeClient {
    async fn post(&self, text: &str) -> Result<(), Error> {
        self.send_message(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url_trims_trailing_slash() {
        let cfg = GroupMeConfig {
            base_url: "https://api.groupme.com/v3/".into(),
            bot_id: "bot-1".into(),
            ..GroupMeConfig::default()
        };
        let client = GroupMeClient::new(&cfg);
        assert_eq!(client.post_url(), "https://api.groupme.com/v3/bots/post");
    }

    #[test]
    fn test_bot_post_body_shape() {
        let body = BotPost {
            bot_id: "bot-1",
            text: "hello",
        };
        let json = serde_json::to_value(&body).expect("body serializes");
        assert_eq!(json, serde_json::json!({"bot_id": "bot-1", "text": "hello"}));
    }
}
