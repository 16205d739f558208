/// Telegram Bot API transport
///
/// Outbound calls go to `{api_url}/bot{token}/{method}` as JSON. Inbound traffic
/// arrives as webhook [`Update`]s, converted into [`InboundEvent`]s.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    ButtonGrid, ChatId, ClickEvent, ClickRef, Command, InboundEvent, MessageRef, MessagingChannel,
};
use crate::error::{AppError, AppResult};

// ============================================================================
// Webhook update types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// Converts the update into an event the bot handles
    ///
    /// Returns `None` for updates the bot ignores: non-command text, edits,
    /// and any other update kind.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            return Some(InboundEvent::ButtonClick(ClickEvent {
                click: ClickRef(query.id),
                user_id: query.from.id,
                message: query.message.map(|m| MessageRef {
                    chat_id: m.chat.id,
                    message_id: m.message_id,
                }),
                data: query.data.unwrap_or_default(),
            }));
        }

        let message = self.message?;
        let command = Command::parse(message.text.as_deref()?)?;
        let user_id = message.from.map(|u| u.id).unwrap_or(message.chat.id);

        Some(InboundEvent::Command {
            user_id,
            chat_id: message.chat.id,
            command,
        })
    }
}

// ============================================================================
// Bot API client
// ============================================================================

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

impl<'a> From<&'a ButtonGrid> for InlineKeyboardMarkup<'a> {
    fn from(grid: &'a ButtonGrid) -> Self {
        Self {
            inline_keyboard: grid
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: &b.label,
                            callback_data: &b.data,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramChannel {
    http_client: HttpClient,
    api_url: String,
    token: String,
}

impl TelegramChannel {
    pub fn new(token: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> AppResult<T> {
        let url = format!("{}/bot{}/{}", self.api_url, self.token, method);
        let response = self.http_client.post(&url).json(&body).send().await?;
        let status = response.status();

        // Telegram reports failures as {"ok": false, "description": ...} with a 4xx status
        let parsed: ApiResponse<T> = response.json().await.map_err(|e| {
            AppError::Channel(format!("{} returned unreadable response ({}): {}", method, status, e))
        })?;

        if !parsed.ok {
            return Err(AppError::Channel(format!(
                "{} failed ({}): {}",
                method,
                status,
                parsed.description.unwrap_or_default()
            )));
        }

        parsed
            .result
            .ok_or_else(|| AppError::Channel(format!("{} returned no result", method)))
    }

    /// Points Telegram at this service's webhook endpoint
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> AppResult<()> {
        let mut body = json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(secret) = secret {
            body["secret_token"] = json!(secret);
        }

        let _: bool = self.call("setWebhook", body).await?;
        tracing::info!(url = %url, "Telegram webhook registered");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
    chat: Chat,
}

#[async_trait::async_trait]
impl MessagingChannel for TelegramChannel {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<MessageRef> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(grid) = buttons {
            body["reply_markup"] = json!(InlineKeyboardMarkup::from(grid));
        }

        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(MessageRef {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<()> {
        let mut body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(grid) = buttons {
            body["reply_markup"] = json!(InlineKeyboardMarkup::from(grid));
        }

        // editMessageText answers with the edited Message
        let _: serde_json::Value = self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn answer_click(&self, click: &ClickRef, text: &str, alert: bool) -> AppResult<()> {
        let body = json!({
            "callback_query_id": click.0,
            "text": text,
            "show_alert": alert,
        });

        let _: bool = self.call("answerCallbackQuery", body).await?;
        Ok(())
    }
}
