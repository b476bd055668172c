pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::database::{CatalogStore, InterviewStore, MemoryStore, NotificationDispatcher, PgStore};
use crate::middleware::auth::JwtKeys;
use crate::services::{interview_service::InterviewService, question_service::QuestionService};
use crate::utils::time::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub interview_service: InterviewService,
    pub question_service: QuestionService,
    pub jwt_keys: JwtKeys,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::from_stores(
            store.clone(),
            store.clone(),
            store,
            Arc::new(SystemClock),
            &config.jwt_secret,
            config.default_link_expiry_hours,
        )
    }

    pub fn from_stores(
        catalog: Arc<dyn CatalogStore>,
        interviews: Arc<dyn InterviewStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        jwt_secret: &str,
        default_expiry_hours: i64,
    ) -> Self {
        Self {
            question_service: QuestionService::new(catalog.clone()),
            interview_service: InterviewService::new(
                catalog,
                interviews,
                dispatcher,
                clock,
                default_expiry_hours,
            ),
            jwt_keys: JwtKeys::new(jwt_secret),
        }
    }

    /// State backed entirely by one [`MemoryStore`].
    pub fn in_memory(store: MemoryStore, clock: Arc<dyn Clock>, jwt_secret: &str) -> Self {
        let store = Arc::new(store);
        Self::from_stores(
            store.clone(),
            store.clone(),
            store,
            clock,
            jwt_secret,
            config::DEFAULT_LINK_EXPIRY_HOURS,
        )
    }
}
