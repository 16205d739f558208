/// Conversational transport abstraction
///
/// The bot talks to users through a [`MessagingChannel`]: it sends and edits
/// messages carrying button grids and answers button clicks. Inbound traffic
/// arrives as [`InboundEvent`]s produced by the transport adapter.
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{GenreId, UserId},
};

pub mod sessions;
pub mod telegram;

pub use sessions::{Dispatch, SessionId, SessionLease, SessionRegistry};

/// Identifier of the chat a message is sent to
pub type ChatId = i64;

/// Handle of a message the bot sent, used to edit it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// Handle of a button click, used to answer it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClickRef(pub String);

/// An inline button: a label shown to the user and the payload echoed back on click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: ButtonPayload) -> Self {
        Self {
            label: label.into(),
            data: payload.to_string(),
        }
    }
}

/// Rows of buttons, top to bottom
pub type ButtonGrid = Vec<Vec<Button>>;

/// Domain value carried by a preferences menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPayload {
    Genre(GenreId),
    Done,
}

const DONE_TOKEN: &str = "done";

impl Display for ButtonPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonPayload::Genre(id) => write!(f, "{}", id),
            ButtonPayload::Done => write!(f, "{}", DONE_TOKEN),
        }
    }
}

impl FromStr for ButtonPayload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == DONE_TOKEN {
            return Ok(ButtonPayload::Done);
        }
        s.parse::<GenreId>()
            .map(ButtonPayload::Genre)
            .map_err(|_| format!("unrecognized button payload: {:?}", s))
    }
}

/// Chat commands the bot reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    SetPreferences,
    Recommend,
}

impl Command {
    /// Matches a command at the start of a message
    ///
    /// Accepts the `/command@botname` form used in group chats and ignores
    /// anything after the command word.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name {
            "start" => Some(Command::Start),
            "setpreferences" => Some(Command::SetPreferences),
            "recommend" => Some(Command::Recommend),
            _ => None,
        }
    }
}

/// A button click delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub click: ClickRef,
    pub user_id: UserId,
    /// Message the clicked button belongs to, when the transport reports it
    pub message: Option<MessageRef>,
    pub data: String,
}

/// Inbound traffic the bot handles
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Command {
        user_id: UserId,
        chat_id: ChatId,
        command: Command,
    },
    ButtonClick(ClickEvent),
}

#[async_trait::async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Sends a new message, optionally with buttons
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<MessageRef>;

    /// Replaces the text and buttons of a message sent earlier
    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<()>;

    /// Acknowledges a click, optionally as a modal alert
    async fn answer_click(&self, click: &ClickRef, text: &str, alert: bool) -> AppResult<()>;
}
