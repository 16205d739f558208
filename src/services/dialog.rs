use std::sync::Arc;
use std::time::Duration;

use crate::{
    channel::{
        Button, ButtonGrid, ButtonPayload, ChatId, ClickEvent, MessageRef, MessagingChannel,
        SessionLease,
    },
    db::PreferenceStore,
    error::AppResult,
    models::{toggle_genre, GenreCatalog, GenreId, PreferenceUpdate, UserId},
};

pub const MENU_TEXT: &str = "Select your favorite genres:";
pub const DONE_LABEL: &str = "Done ✅";
pub const ADDED_TEXT: &str = "Added to favorites";
pub const REMOVED_TEXT: &str = "Removed from favorites";
pub const SAVING_TEXT: &str = "Saving preferences...";
pub const SAVED_TEXT: &str = "✅ Preferences saved!";
pub const TIMEOUT_TEXT: &str = "You took too long to respond. Please try again.";
pub const UNKNOWN_OPTION_TEXT: &str = "Unknown option";
pub const STALE_MENU_TEXT: &str = "This menu is no longer active.";

const BUTTONS_PER_ROW: usize = 3;

/// Builds the genre menu for the given working set
///
/// One button per catalog genre, three per row, marked ✅ when selected and
/// ❌ otherwise, followed by a row holding the done button.
pub fn render_menu(working_set: &[GenreId]) -> ButtonGrid {
    let mut grid: ButtonGrid = GenreCatalog::all()
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|genre| {
                    let mark = if working_set.contains(&genre.id) {
                        "✅"
                    } else {
                        "❌"
                    };
                    Button::new(
                        format!("{} {}", genre.name, mark),
                        ButtonPayload::Genre(genre.id),
                    )
                })
                .collect()
        })
        .collect();

    grid.push(vec![Button::new(DONE_LABEL, ButtonPayload::Done)]);
    grid
}

/// How a dialog session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The working set was committed to the store
    Saved(Vec<GenreId>),
    /// No click arrived in time; nothing was stored
    TimedOut,
}

#[derive(Debug)]
enum DialogState {
    Rendering,
    AwaitingInteraction,
    ToggleReceived { click: ClickEvent, genre_id: GenreId },
    DoneReceived { click: ClickEvent },
    Committing,
    TimedOut,
    Closed(DialogOutcome),
}

/// Interactive multi-select of favorite genres for one user
///
/// The dialog keeps an uncommitted working set seeded from the store, shows it
/// as a single menu message that is edited in place after every toggle, and
/// writes it back only when the user presses done.
pub struct PreferenceDialog {
    channel: Arc<dyn MessagingChannel>,
    store: Arc<dyn PreferenceStore>,
    user_id: UserId,
    chat_id: ChatId,
    timeout: Duration,
    language: String,
    working_set: Vec<GenreId>,
    menu: Option<MessageRef>,
    rendered: Option<ButtonGrid>,
}

impl PreferenceDialog {
    /// Seeds the working set from the user's stored genres
    pub async fn load(
        channel: Arc<dyn MessagingChannel>,
        store: Arc<dyn PreferenceStore>,
        user_id: UserId,
        chat_id: ChatId,
        timeout: Duration,
        language: String,
    ) -> AppResult<Self> {
        let working_set: Vec<GenreId> = store
            .find_one(user_id)
            .await?
            .map(|prefs| prefs.favorite_genres)
            .unwrap_or_default()
            .into_iter()
            .filter(|id| GenreCatalog::contains(*id))
            .collect();

        Ok(Self {
            channel,
            store,
            user_id,
            chat_id,
            timeout,
            language,
            working_set,
            menu: None,
            rendered: None,
        })
    }

    pub fn working_set(&self) -> &[GenreId] {
        &self.working_set
    }

    /// Drives the dialog until it closes
    pub async fn run(mut self, lease: &mut SessionLease) -> AppResult<DialogOutcome> {
        tracing::info!(
            user_id = self.user_id,
            session_id = %lease.id(),
            selected = self.working_set.len(),
            "Preference dialog started"
        );

        let mut state = DialogState::Rendering;

        loop {
            tracing::trace!(session_id = %lease.id(), state = ?state, "Dialog transition");

            state = match state {
                DialogState::Rendering => {
                    self.render().await?;
                    DialogState::AwaitingInteraction
                }
                DialogState::AwaitingInteraction => match lease.next_click(self.timeout).await {
                    Some(click) => self.classify(click).await,
                    None => DialogState::TimedOut,
                },
                DialogState::ToggleReceived { click, genre_id } => {
                    let added = toggle_genre(&mut self.working_set, genre_id);
                    let ack = if added { ADDED_TEXT } else { REMOVED_TEXT };
                    self.acknowledge(&click, ack, true).await;
                    DialogState::Rendering
                }
                DialogState::DoneReceived { click } => {
                    self.acknowledge(&click, SAVING_TEXT, false).await;
                    DialogState::Committing
                }
                DialogState::Committing => {
                    self.store
                        .upsert(
                            self.user_id,
                            PreferenceUpdate {
                                favorite_genres: Some(self.working_set.clone()),
                                preferred_language: Some(self.language.clone()),
                            },
                        )
                        .await?;
                    self.channel
                        .send_message(self.chat_id, SAVED_TEXT, None)
                        .await?;

                    tracing::info!(
                        user_id = self.user_id,
                        session_id = %lease.id(),
                        genres = ?self.working_set,
                        "Preferences saved"
                    );
                    DialogState::Closed(DialogOutcome::Saved(self.working_set.clone()))
                }
                DialogState::TimedOut => {
                    tracing::info!(
                        user_id = self.user_id,
                        session_id = %lease.id(),
                        "Preference dialog timed out"
                    );
                    self.channel
                        .send_message(self.chat_id, TIMEOUT_TEXT, None)
                        .await?;
                    DialogState::Closed(DialogOutcome::TimedOut)
                }
                DialogState::Closed(outcome) => return Ok(outcome),
            };
        }
    }

    /// Sends the menu the first time, then edits the same message in place
    async fn render(&mut self) -> AppResult<()> {
        let grid = render_menu(&self.working_set);

        match self.menu {
            None => {
                let message = self
                    .channel
                    .send_message(self.chat_id, MENU_TEXT, Some(&grid))
                    .await?;
                self.menu = Some(message);
            }
            // An identical edit is rejected by the transport; nothing to show anyway
            Some(_) if self.rendered.as_ref() == Some(&grid) => {}
            Some(message) => {
                self.channel
                    .edit_message(&message, MENU_TEXT, Some(&grid))
                    .await?;
            }
        }

        self.rendered = Some(grid);
        Ok(())
    }

    /// Maps a click to the next state
    async fn classify(&self, click: ClickEvent) -> DialogState {
        if let (Some(menu), Some(clicked)) = (self.menu, click.message) {
            if menu != clicked {
                self.acknowledge(&click, STALE_MENU_TEXT, false).await;
                return DialogState::AwaitingInteraction;
            }
        }

        match click.data.parse::<ButtonPayload>() {
            Ok(ButtonPayload::Done) => DialogState::DoneReceived { click },
            Ok(ButtonPayload::Genre(genre_id)) if GenreCatalog::contains(genre_id) => {
                DialogState::ToggleReceived { click, genre_id }
            }
            other => {
                tracing::warn!(
                    user_id = self.user_id,
                    data = %click.data,
                    parsed = ?other,
                    "Ignoring unexpected button payload"
                );
                self.acknowledge(&click, UNKNOWN_OPTION_TEXT, false).await;
                DialogState::Rendering
            }
        }
    }

    async fn acknowledge(&self, click: &ClickEvent, text: &str, alert: bool) {
        if let Err(e) = self.channel.answer_click(&click.click, text, alert).await {
            tracing::warn!(user_id = self.user_id, error = %e, "Failed to answer click");
        }
    }
}
