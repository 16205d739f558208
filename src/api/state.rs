use std::sync::Arc;

use crate::bot::BotService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<BotService>,
    /// Expected value of the webhook secret header, when one is configured
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(bot: Arc<BotService>, webhook_secret: Option<String>) -> Self {
        Self {
            bot,
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }
}
