use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use movie_bot::{
    api::{create_router, AppState},
    bot::{welcome_text, BotService, BotSettings, HELP_TEXT, NO_PREFERENCES_TEXT},
    channel::{ButtonGrid, ChatId, ClickRef, MessageRef, MessagingChannel},
    db::{InMemoryPreferenceStore, PreferenceStore},
    error::AppResult,
    models::{DiscoveryQuery, KeywordId, MovieResult},
    services::{
        dialog::{MENU_TEXT, SAVED_TEXT, STALE_MENU_TEXT},
        CatalogProvider, RecommendationEngine,
    },
};

const USER: i64 = 5550001;
const SECRET: &str = "s3cret";

#[derive(Default)]
struct FakeChannel {
    sent: Mutex<Vec<String>>,
    answers: Mutex<Vec<String>>,
}

impl FakeChannel {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn answers(&self) -> Vec<String> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessagingChannel for FakeChannel {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        _buttons: Option<&ButtonGrid>,
    ) -> AppResult<MessageRef> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(text.to_string());
        Ok(MessageRef {
            chat_id,
            message_id: sent.len() as i64,
        })
    }

    async fn edit_message(
        &self,
        _message: &MessageRef,
        _text: &str,
        _buttons: Option<&ButtonGrid>,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn answer_click(&self, _click: &ClickRef, text: &str, _alert: bool) -> AppResult<()> {
        self.answers.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Catalog where every discovery page holds the same popular titles
struct PopularCatalog;

#[async_trait::async_trait]
impl CatalogProvider for PopularCatalog {
    async fn search_keywords(&self, _query: &str) -> AppResult<Vec<KeywordId>> {
        Ok(vec![])
    }

    async fn discover(&self, _query: &DiscoveryQuery) -> AppResult<Vec<MovieResult>> {
        Ok((1..=20)
            .map(|i| MovieResult {
                title: format!("Blockbuster {}", i),
                overview: None,
                release_date: None,
                poster_path: None,
            })
            .collect())
    }
}

struct TestApp {
    server: TestServer,
    channel: Arc<FakeChannel>,
    store: Arc<InMemoryPreferenceStore>,
}

fn create_test_app(secret: Option<&str>) -> TestApp {
    let channel = Arc::new(FakeChannel::default());
    let store = Arc::new(InMemoryPreferenceStore::new("en"));
    let bot = Arc::new(BotService::new(
        channel.clone(),
        store.clone(),
        RecommendationEngine::new(Arc::new(PopularCatalog)),
        BotSettings {
            dialog_timeout: Duration::from_secs(60),
            min_recommendations: 20,
            max_results_shown: 5,
            default_language: "en".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        },
    ));

    let app = create_router(AppState::new(bot, secret.map(str::to_string)));
    TestApp {
        server: TestServer::new(app).unwrap(),
        channel,
        store,
    }
}

fn command_update(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "chat": {"id": USER, "type": "private"},
            "from": {"id": USER, "is_bot": false, "first_name": "Test"},
            "text": text
        }
    })
}

fn click_update(update_id: i64, data: &str, message_id: i64) -> Value {
    json!({
        "update_id": update_id,
        "callback_query": {
            "id": format!("cb-{}", update_id),
            "from": {"id": USER},
            "message": {"message_id": message_id, "chat": {"id": USER}},
            "data": data
        }
    })
}

async fn wait_until<F: Fn() -> bool>(check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

fn secret_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-telegram-bot-api-secret-token"),
        HeaderValue::from_static(SECRET),
    )
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(None);
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_start_command() {
    let app = create_test_app(None);

    let response = app
        .server
        .post("/telegram/webhook")
        .json(&command_update(1, "/start"))
        .await;
    response.assert_status_ok();

    wait_until(|| !app.channel.sent().is_empty()).await;
    assert_eq!(app.channel.sent(), vec![welcome_text()]);
}

#[tokio::test]
async fn test_webhook_rejects_bad_secret() {
    let app = create_test_app(Some(SECRET));

    let response = app
        .server
        .post("/telegram/webhook")
        .add_header(
            HeaderName::from_static("x-telegram-bot-api-secret-token"),
            HeaderValue::from_static("wrong"),
        )
        .json(&command_update(2, "/start"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.channel.sent().is_empty());
}

#[tokio::test]
async fn test_webhook_accepts_valid_secret() {
    let app = create_test_app(Some(SECRET));
    let (name, value) = secret_header();

    let response = app
        .server
        .post("/telegram/webhook")
        .add_header(name, value)
        .json(&command_update(3, "/recommend"))
        .await;

    response.assert_status_ok();
    wait_until(|| !app.channel.sent().is_empty()).await;
    assert_eq!(app.channel.sent(), vec![NO_PREFERENCES_TEXT]);
}

#[tokio::test]
async fn test_non_command_text_ignored() {
    let app = create_test_app(None);

    let response = app
        .server
        .post("/telegram/webhook")
        .json(&command_update(4, "what should I watch?"))
        .await;

    response.assert_status_ok();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.channel.sent().is_empty());
}

#[tokio::test]
async fn test_stale_click_answered() {
    let app = create_test_app(None);

    let response = app
        .server
        .post("/telegram/webhook")
        .json(&click_update(5, "28", 1))
        .await;

    response.assert_status_ok();
    wait_until(|| !app.channel.answers().is_empty()).await;
    assert_eq!(app.channel.answers(), vec![STALE_MENU_TEXT]);
}

#[tokio::test]
async fn test_set_preferences_then_recommend() {
    let app = create_test_app(None);

    app.server
        .post("/telegram/webhook")
        .json(&command_update(10, "/setpreferences"))
        .await
        .assert_status_ok();
    wait_until(|| app.channel.sent() == vec![MENU_TEXT]).await;

    // the menu is the first message the fake channel sent
    for (i, data) in ["28", "12", "done"].iter().enumerate() {
        app.server
            .post("/telegram/webhook")
            .json(&click_update(11 + i as i64, data, 1))
            .await
            .assert_status_ok();
    }
    wait_until(|| app.channel.sent().len() == 3).await;
    assert_eq!(app.channel.sent(), vec![MENU_TEXT, SAVED_TEXT, HELP_TEXT]);

    let stored = app.store.find_one(USER).await.unwrap().unwrap();
    assert_eq!(stored.favorite_genres, vec![28, 12]);

    app.server
        .post("/telegram/webhook")
        .json(&command_update(20, "/recommend"))
        .await
        .assert_status_ok();

    // five movies are shown, followed by the usage reminder
    wait_until(|| app.channel.sent().len() == 9).await;
    let sent = app.channel.sent();
    assert!(sent[3].contains("Blockbuster 1"));
    assert!(sent[7].contains("Blockbuster 5"));
    assert_eq!(sent[8], HELP_TEXT);
}
