use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::Config;
use crate::queue::RenderQueue;
use crate::render::{self, Renderer};
use crate::repositories::{LinkStore, PgLinkStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Link persistence (PostgreSQL in production)
    pub store: Arc<dyn LinkStore>,
    /// Render queue with its running worker pool
    pub render_queue: RenderQueue,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState by connecting to the database and starting the render workers
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        // Connect to PostgreSQL with SQLx (for migrations)
        let pg_pool = PgPool::connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;
        pg_pool.close().await;

        // Connect to PostgreSQL with SeaORM
        let mut opt = ConnectOptions::new(&config.database_url);
        opt.max_connections(50)
            .min_connections(2)
            .sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        let renderer =
            render::from_config(&config).map_err(|e| AppStateError::Renderer(e.to_string()))?;

        Ok(Self::with_components(config, Arc::new(PgLinkStore::new(db)), renderer).await)
    }

    /// Create AppState with a custom store and renderer (for testing)
    pub async fn with_components(
        config: Config,
        store: Arc<dyn LinkStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let render_queue = RenderQueue::start(
            config.render_worker_count,
            config.render_queue_capacity,
            store.clone(),
            renderer,
        )
        .await;

        Self {
            store,
            render_queue,
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Renderer setup error: {0}")]
    Renderer(String),
}
