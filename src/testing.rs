//! In-process fakes shared by the unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::{
    channel::{ButtonGrid, ChatId, ClickRef, MessageRef, MessagingChannel},
    error::AppResult,
    models::{DiscoveryQuery, KeywordId, MovieResult},
    services::providers::CatalogProvider,
};

pub fn movies(prefix: &str, count: usize) -> Vec<MovieResult> {
    (1..=count)
        .map(|i| MovieResult {
            title: format!("{} {}", prefix, i),
            overview: Some(format!("Overview of {} {}", prefix, i)),
            release_date: Some("2020-01-01".to_string()),
            poster_path: None,
        })
        .collect()
}

type DiscoverFn = dyn Fn(&DiscoveryQuery) -> AppResult<Vec<MovieResult>> + Send + Sync;

/// Catalog answering discovery calls from a closure and recording every query
pub struct ScriptedCatalog {
    discover: Box<DiscoverFn>,
    keywords: HashMap<String, KeywordId>,
    queries: Mutex<Vec<DiscoveryQuery>>,
    keyword_lookups: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new<F>(discover: F) -> Self
    where
        F: Fn(&DiscoveryQuery) -> AppResult<Vec<MovieResult>> + Send + Sync + 'static,
    {
        Self {
            discover: Box::new(discover),
            keywords: HashMap::new(),
            queries: Mutex::new(Vec::new()),
            keyword_lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_keyword(mut self, keyword: &str, id: KeywordId) -> Self {
        self.keywords.insert(keyword.to_string(), id);
        self
    }

    pub fn queries(&self) -> Vec<DiscoveryQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn keyword_lookups(&self) -> Vec<String> {
        self.keyword_lookups.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CatalogProvider for ScriptedCatalog {
    async fn search_keywords(&self, query: &str) -> AppResult<Vec<KeywordId>> {
        self.keyword_lookups.lock().unwrap().push(query.to_string());
        Ok(self.keywords.get(query).copied().into_iter().collect())
    }

    async fn discover(&self, query: &DiscoveryQuery) -> AppResult<Vec<MovieResult>> {
        self.queries.lock().unwrap().push(query.clone());
        (self.discover)(query)
    }
}

/// Something the bot sent through the channel
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Sent {
        message: MessageRef,
        text: String,
        buttons: Option<ButtonGrid>,
    },
    Edited {
        message: MessageRef,
        text: String,
        buttons: Option<ButtonGrid>,
    },
    Answered {
        click: ClickRef,
        text: String,
        alert: bool,
    },
}

/// Channel that records outbound traffic instead of delivering it
#[derive(Default)]
pub struct RecordingChannel {
    outbound: Mutex<Vec<Outbound>>,
    next_message_id: AtomicI64,
}

impl RecordingChannel {
    pub fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Sent { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Answered { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl MessagingChannel for RecordingChannel {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<MessageRef> {
        let message = MessageRef {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.outbound.lock().unwrap().push(Outbound::Sent {
            message,
            text: text.to_string(),
            buttons: buttons.cloned(),
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> AppResult<()> {
        self.outbound.lock().unwrap().push(Outbound::Edited {
            message: *message,
            text: text.to_string(),
            buttons: buttons.cloned(),
        });
        Ok(())
    }

    async fn answer_click(&self, click: &ClickRef, text: &str, alert: bool) -> AppResult<()> {
        self.outbound.lock().unwrap().push(Outbound::Answered {
            click: click.clone(),
            text: text.to_string(),
            alert,
        });
        Ok(())
    }
}
