pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::task;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::mailer::{FileMailer, LogMailer, Mailer};
use crate::models::EventId;
use crate::store::{BanquetStore, MemoryStore, PgStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BanquetStore>,
    pub cache: Option<cache::CacheService>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn BanquetStore> = match config.storage.backend {
            StorageBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
                let db = database::Database::new(url, config.database.pool_size).await?;
                info!("Database connected");
                db.run_migrations().await?;
                Arc::new(PgStore::new(db))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage, data is lost on restart");
                Arc::new(MemoryStore::seeded())
            }
        };

        let cache = match &config.redis.url {
            Some(url) => {
                let redis = redis_client::RedisClient::new(url).await?;
                info!("Redis connected");
                Some(cache::CacheService::new(redis, config.cache.clone()))
            }
            None => {
                info!("REDIS_URL not set, cache disabled");
                None
            }
        };

        let mailer: Arc<dyn Mailer> = match &config.mail.outbox_dir {
            Some(dir) => Arc::new(FileMailer::new(dir.clone())),
            None => Arc::new(LogMailer),
        };

        let state = Arc::new(Self {
            store,
            cache,
            mailer,
            config,
        });

        let state_for_bg = state.clone();
        task::spawn(async move {
            // Warmup cache в фоне
            if let Some(cache) = &state_for_bg.cache {
                cache.warmup_cache(state_for_bg.store.as_ref()).await;
            }
        });

        Ok(state)
    }

    /// State without a cache, over an already built store.
    pub fn with_store(config: Config, store: Arc<dyn BanquetStore>, mailer: Arc<dyn Mailer>) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: None,
            mailer,
            config,
        })
    }

    /// Drops the cached seat listing of the event. Cache failures are logged only.
    pub async fn invalidate_seats(&self, event_id: EventId) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_seats(event_id).await {
                warn!(event_id, error = %e, "failed to invalidate seat cache");
            }
        }
    }
}

/// Complete HTTP application: banner, health check and the `/api` tree.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Banquet Hall API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
