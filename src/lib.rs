pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::Database;
use crate::services::providers::{GeminiClient, LanguageModel, UrlReputationProvider, VirusTotalClient};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    /// `None` when VirusTotal is not configured
    pub reputation: Option<Arc<dyn UrlReputationProvider>>,
    /// `None` when Gemini is not configured
    pub llm: Option<Arc<dyn LanguageModel>>,
}

impl AppState {
    /// Builds the external clients whose API keys are configured.
    pub fn new(db: Database, config: Config) -> anyhow::Result<Self> {
        let reputation: Option<Arc<dyn UrlReputationProvider>> = match config.virustotal.api_key.as_deref() {
            Some(key) if config.virustotal_enabled() => {
                Some(Arc::new(VirusTotalClient::new(key.trim(), &config.virustotal)?))
            }
            _ => None,
        };

        let llm: Option<Arc<dyn LanguageModel>> = match config.gemini.api_key.as_deref() {
            Some(key) if config.gemini_enabled() => {
                Some(Arc::new(GeminiClient::new(key.trim(), &config.gemini)?))
            }
            _ => None,
        };

        tracing::info!(
            virustotal = reputation.is_some(),
            gemini = llm.is_some(),
            "External collaborators configured"
        );

        Ok(Self {
            db,
            config,
            reputation,
            llm,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
