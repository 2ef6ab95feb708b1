//! Slack delivery via `chat.postMessage`.
//!
//! The sink posts one message per announcement with the bot identity from the
//! configuration. The plain `text` field doubles as the notification fallback
//! while a single `section` block carries the same content as mrkdwn.

use crate::config::Config;
use crate::error::{Error, Result};
use serde_json::{Value, json};
use tracing::{info, instrument};

/// Slack Web API endpoint for posting a message.
const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Delivery abstraction for the notification channel.
///
/// Failures are reported to the caller; whether a failure aborts the run or
/// is swallowed is the orchestrator's decision, not the sink's.
pub trait Notify {
    /// Deliver one message.
    async fn send(&self, message: &str) -> Result<()>;
}

/// [`Notify`] implementation posting to a Slack channel.
#[derive(Debug, Clone)]
pub struct SlackSink {
    client: reqwest::Client,
    token: String,
    channel: String,
    username: String,
    icon_emoji: String,
}

impl SlackSink {
    /// Build a sink from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.slack_token.clone(),
            channel: config.slack_channel_id.clone(),
            username: config.bot_name.clone(),
            icon_emoji: config.bot_icon.clone(),
        }
    }

    /// Request body for `chat.postMessage`.
    fn payload(&self, message: &str) -> Value {
        json!({
            "channel": self.channel,
            "text": message,
            "username": self.username,
            "icon_emoji": self.icon_emoji,
            "blocks": [
                {
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": message,
                    },
                },
            ],
        })
    }
}

impl Notify for SlackSink {
    #[instrument(level = "info", skip_all)]
    async fn send(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&self.payload(message))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Delivery(e.to_string()))?;

        // Slack reports API-level failures as 200 with {"ok": false, ...}.
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::Delivery(reason.to_string()));
        }

        info!(channel = %self.channel, "Sent Slack message");
        Ok(())
    }
}
