//! Telegram Bot API implementation of the transport contract.
//!
//! Uses long polling (`getUpdates`) for inbound events and plain
//! `sendMessage` / `sendMediaGroup` calls for output. Only the handful
//! of fields the dialog needs are deserialized; everything else in the
//! Telegram payload is ignored.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use roomscout_core::types::DbId;

use crate::transport::{EventPayload, EventUser, InboundEvent, Keyboard, Transport, TransportError};

/// Long-poll wait passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Long-polling Telegram transport.
pub struct TelegramTransport {
    client: reqwest::Client,
    base_url: String,
    /// Next update offset to request; advances past every seen update.
    offset: i64,
    /// Events decoded from the last poll but not yet handed out.
    pending: VecDeque<InboundEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
    text: Option<String>,
    from: Option<TgUser>,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: String,
    data: Option<String>,
    from: TgUser,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

impl From<TgUser> for EventUser {
    fn from(user: TgUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
        }
    }
}

impl TelegramTransport {
    /// Create a transport for one bot token.
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{token}"),
            offset: 0,
            pending: VecDeque::new(),
        }
    }

    /// Call one Bot API method and unwrap the result envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        match envelope.result {
            Some(result) if envelope.ok => Ok(result),
            _ => Err(TransportError::Api {
                status: status.as_u16(),
                body: envelope
                    .description
                    .unwrap_or_else(|| "missing result".to_string()),
            }),
        }
    }

    fn reply_markup(keyboard: &Keyboard) -> serde_json::Value {
        let rows: Vec<Vec<serde_json::Value>> = keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|choice| {
                        serde_json::json!({
                            "text": choice.label,
                            "callback_data": choice.data,
                        })
                    })
                    .collect()
            })
            .collect();
        serde_json::json!({ "inline_keyboard": rows })
    }

    fn decode(&mut self, update: Update) {
        if let Some(message) = update.message {
            if let (Some(text), Some(from)) = (message.text, message.from) {
                self.pending.push_back(InboundEvent {
                    user: from.into(),
                    payload: EventPayload::Text(text),
                });
            }
        } else if let Some(query) = update.callback_query {
            if let Some(data) = query.data {
                self.pending.push_back(InboundEvent {
                    user: query.from.into(),
                    payload: EventPayload::Choice(data),
                });
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn next_event(&mut self) -> Result<InboundEvent, TransportError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            let updates: Vec<Update> = self
                .call(
                    "getUpdates",
                    &serde_json::json!({
                        "timeout": POLL_TIMEOUT_SECS,
                        "offset": self.offset,
                        "allowed_updates": ["message", "callback_query"],
                    }),
                )
                .await?;

            for update in updates {
                self.offset = self.offset.max(update.update_id + 1);
                if let Some(query) = &update.callback_query {
                    // Stop the client-side spinner; best effort only.
                    let ack = self
                        .call::<serde_json::Value>(
                            "answerCallbackQuery",
                            &serde_json::json!({ "callback_query_id": query.id }),
                        )
                        .await;
                    if let Err(error) = ack {
                        tracing::debug!(error = %error, "callback acknowledgment failed");
                    }
                }
                self.decode(update);
            }
        }
    }

    async fn send_prompt(
        &self,
        user_id: DbId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut params = serde_json::json!({
            "chat_id": user_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = Self::reply_markup(keyboard);
        }
        self.call::<serde_json::Value>("sendMessage", &params)
            .await?;
        Ok(())
    }

    async fn send_block(
        &self,
        user_id: DbId,
        text: &str,
        media: &[String],
    ) -> Result<(), TransportError> {
        self.call::<serde_json::Value>(
            "sendMessage",
            &serde_json::json!({
                "chat_id": user_id,
                "text": text,
                "disable_web_page_preview": true,
            }),
        )
        .await?;

        if !media.is_empty() {
            let group: Vec<serde_json::Value> = media
                .iter()
                .map(|url| serde_json::json!({ "type": "photo", "media": url }))
                .collect();
            self.call::<serde_json::Value>(
                "sendMediaGroup",
                &serde_json::json!({ "chat_id": user_id, "media": group }),
            )
            .await?;
        }
        Ok(())
    }
}
