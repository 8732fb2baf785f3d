#![allow(dead_code)]

use async_trait::async_trait;
use lettre::Message;
use std::sync::{Arc, Mutex};

use banquet_hall::config::Config;
use banquet_hall::error::AppResult;
use banquet_hall::mailer::Mailer;
use banquet_hall::models::{Event, EventType, GuestInfo, NewEvent, UserId};
use banquet_hall::services::events;
use banquet_hall::store::MemoryStore;
use banquet_hall::AppState;

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Message>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: Message) -> AppResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::seeded());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::with_store(config, store.clone(), mailer.clone());
    TestApp {
        state,
        store,
        mailer,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub async fn create_event_in(state: &AppState, owner: UserId, hole_id: i64) -> Event {
    events::create_event(
        state,
        NewEvent {
            owner,
            hole_id,
            description: "Anniversary dinner".to_string(),
            event_type: EventType::Birthday,
            date_planned: None,
        },
    )
    .await
    .unwrap()
}

pub fn guest_info(first_name: &str) -> GuestInfo {
    GuestInfo {
        first_name: first_name.to_string(),
        last_name: "Guest".to_string(),
        email: None,
    }
}
