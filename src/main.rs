use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use movie_bot::{
    api::{create_router, AppState, WEBHOOK_PATH},
    bot::{BotService, BotSettings},
    channel::telegram::TelegramChannel,
    config::Config,
    db::{self, InMemoryPreferenceStore, PgPreferenceStore, PreferenceStore},
    services::{RecommendationEngine, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_bot=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn PreferenceStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgPreferenceStore::new(pool, config.default_language.clone()))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, preferences are kept in memory only");
            Arc::new(InMemoryPreferenceStore::new(config.default_language.clone()))
        }
    };

    let provider = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let channel = Arc::new(TelegramChannel::new(
        config.telegram_bot_token.clone(),
        config.telegram_api_url.clone(),
    ));

    if let Some(public_url) = &config.public_url {
        let webhook_url = format!("{}{}", public_url.trim_end_matches('/'), WEBHOOK_PATH);
        channel
            .set_webhook(&webhook_url, config.webhook_secret.as_deref())
            .await?;
    }

    let bot = Arc::new(BotService::new(
        channel,
        store,
        RecommendationEngine::new(provider),
        BotSettings::from(&config),
    ));

    let app = create_router(AppState::new(bot, config.webhook_secret.clone()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Bot is running");
    axum::serve(listener, app).await?;

    Ok(())
}
