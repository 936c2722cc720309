use std::sync::Arc;

use quotes_core::error::CoreError;
use quotes_core::render::WidgetRenderer;
use quotes_core::tokens::TokenSigner;
use quotes_db::QuoteCatalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: quotes_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Compiled widget templates.
    pub renderer: Arc<WidgetRenderer>,
    /// Issues and checks refresh tokens.
    pub signer: Arc<TokenSigner>,
}

impl AppState {
    /// Build the state, compiling templates once up front.
    pub fn new(pool: quotes_db::DbPool, config: ServerConfig) -> Result<Self, CoreError> {
        let renderer = WidgetRenderer::new()?;
        let signer = TokenSigner::new(config.nonce_secret.clone(), config.nonce_lifetime_secs);

        Ok(Self {
            pool,
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            signer: Arc::new(signer),
        })
    }

    /// Published quotes as a selection source.
    pub fn catalog(&self) -> QuoteCatalog {
        QuoteCatalog::new(self.pool.clone())
    }
}
