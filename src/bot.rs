//! Command handling for the chat bot
//!
//! Commands run on their own tasks so a long-running preferences dialog never
//! blocks other users. Button clicks are routed synchronously into the owning
//! dialog session to keep their order.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    channel::{
        ChatId, ClickEvent, Command, Dispatch, InboundEvent, MessagingChannel, SessionRegistry,
    },
    config::Config,
    db::PreferenceStore,
    error::AppResult,
    models::UserId,
    services::{
        dialog::STALE_MENU_TEXT, formatting::format_movie_message, DialogOutcome,
        PreferenceDialog, RecommendationEngine,
    },
};

pub const HELP_TEXT: &str = "Use /setpreferences to set your favorite genres.\n\
                             Use /recommend to get movie recommendations.";
pub const NO_PREFERENCES_TEXT: &str = "Please set your preferences using /setpreferences first.";
pub const NO_RESULTS_TEXT: &str = "No recommendations found. Try updating your preferences.";
pub const ALREADY_OPEN_TEXT: &str =
    "You already have an open preferences menu. Finish it or wait for it to expire.";
pub const ERROR_TEXT: &str = "Something went wrong. Please try again later.";

pub fn welcome_text() -> String {
    format!(
        "Welcome to the Movie Recommendation Bot! 🎥\n\n{}",
        HELP_TEXT
    )
}

/// Tunables of the bot's user-facing behavior
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub dialog_timeout: Duration,
    pub min_recommendations: usize,
    pub max_results_shown: usize,
    pub default_language: String,
    pub image_base_url: String,
}

impl From<&Config> for BotSettings {
    fn from(config: &Config) -> Self {
        Self {
            dialog_timeout: config.dialog_timeout(),
            min_recommendations: config.min_recommendations,
            max_results_shown: config.max_results_shown,
            default_language: config.default_language.clone(),
            image_base_url: config.tmdb_image_url.clone(),
        }
    }
}

pub struct BotService {
    channel: Arc<dyn MessagingChannel>,
    store: Arc<dyn PreferenceStore>,
    engine: RecommendationEngine,
    sessions: Arc<SessionRegistry>,
    settings: BotSettings,
}

impl BotService {
    pub fn new(
        channel: Arc<dyn MessagingChannel>,
        store: Arc<dyn PreferenceStore>,
        engine: RecommendationEngine,
        settings: BotSettings,
    ) -> Self {
        Self {
            channel,
            store,
            engine,
            sessions: Arc::new(SessionRegistry::new()),
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Hands an inbound event to the bot without waiting for it to be handled
    pub fn dispatch(self: &Arc<Self>, event: InboundEvent) {
        match event {
            InboundEvent::ButtonClick(click) => {
                if let Dispatch::NoSession(click) = self.sessions.dispatch(click) {
                    let bot = Arc::clone(self);
                    tokio::spawn(async move { bot.reject_click(&click).await });
                }
            }
            InboundEvent::Command {
                user_id,
                chat_id,
                command,
            } => {
                let bot = Arc::clone(self);
                tokio::spawn(async move { bot.run_command(user_id, chat_id, command).await });
            }
        }
    }

    /// Runs a command to completion, reporting failures to the user
    pub async fn run_command(&self, user_id: UserId, chat_id: ChatId, command: Command) {
        tracing::info!(user_id, command = ?command, "Handling command");

        let result = match command {
            Command::Start => self.start(chat_id).await,
            Command::SetPreferences => self.set_preferences(user_id, chat_id).await,
            Command::Recommend => self.recommend(user_id, chat_id).await,
        };

        if let Err(e) = result {
            tracing::error!(user_id, command = ?command, error = %e, "Command failed");
            if let Err(e) = self.channel.send_message(chat_id, ERROR_TEXT, None).await {
                tracing::warn!(user_id, error = %e, "Failed to report command failure");
            }
        }
    }

    async fn start(&self, chat_id: ChatId) -> AppResult<()> {
        self.channel
            .send_message(chat_id, &welcome_text(), None)
            .await?;
        Ok(())
    }

    async fn set_preferences(&self, user_id: UserId, chat_id: ChatId) -> AppResult<()> {
        let Some(mut lease) = self.sessions.open(user_id) else {
            self.channel
                .send_message(chat_id, ALREADY_OPEN_TEXT, None)
                .await?;
            return Ok(());
        };

        let dialog = PreferenceDialog::load(
            self.channel.clone(),
            self.store.clone(),
            user_id,
            chat_id,
            self.settings.dialog_timeout,
            self.settings.default_language.clone(),
        )
        .await?;

        if let DialogOutcome::Saved(_) = dialog.run(&mut lease).await? {
            self.channel.send_message(chat_id, HELP_TEXT, None).await?;
        }
        Ok(())
    }

    async fn recommend(&self, user_id: UserId, chat_id: ChatId) -> AppResult<()> {
        let Some(preferences) = self.store.find_one(user_id).await? else {
            self.channel
                .send_message(chat_id, NO_PREFERENCES_TEXT, None)
                .await?;
            return Ok(());
        };

        let filters = preferences.recommendation_filters();
        let language = if preferences.preferred_language.is_empty() {
            self.settings.default_language.as_str()
        } else {
            preferences.preferred_language.as_str()
        };

        let movies = self
            .engine
            .recommend(
                &filters.genre_ids,
                &filters.keywords,
                language,
                self.settings.min_recommendations,
            )
            .await;

        if movies.is_empty() {
            self.channel
                .send_message(chat_id, NO_RESULTS_TEXT, None)
                .await?;
            return Ok(());
        }

        for movie in movies.iter().take(self.settings.max_results_shown) {
            let text = format_movie_message(movie, &self.settings.image_base_url);
            self.channel.send_message(chat_id, &text, None).await?;
        }
        self.channel.send_message(chat_id, HELP_TEXT, None).await?;

        tracing::info!(
            user_id,
            found = movies.len(),
            sent = movies.len().min(self.settings.max_results_shown),
            "Recommendations sent"
        );
        Ok(())
    }

    async fn reject_click(&self, click: &ClickEvent) {
        tracing::debug!(user_id = click.user_id, "Click without an open session");
        if let Err(e) = self
            .channel
            .answer_click(&click.click, STALE_MENU_TEXT, false)
            .await
        {
            tracing::warn!(user_id = click.user_id, error = %e, "Failed to answer click");
        }
    }
}
