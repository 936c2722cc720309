use quotes_core::i18n::DEFAULT_LOCALE;
use quotes_core::tokens::DEFAULT_TOKEN_LIFETIME_SECS;

/// Secret used when `NONCE_SECRET` is unset. Fine for local development only.
pub const DEV_NONCE_SECRET: &str = "quotes-widget-dev-secret";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Externally visible base URL; the refresh endpoint URL handed to pages
    /// is derived from it.
    pub public_base_url: String,
    /// Secret for refresh tokens.
    pub nonce_secret: String,
    pub nonce_lifetime_secs: i64,
    /// Locale used when a request names none.
    pub default_locale: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | `sqlite://quotes.db`       |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    /// | `NONCE_SECRET`         | development secret         |
    /// | `NONCE_LIFETIME_SECS`  | `86400`                    |
    /// | `DEFAULT_LOCALE`       | `en`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://quotes.db".into());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        let nonce_secret = std::env::var("NONCE_SECRET").unwrap_or_else(|_| {
            tracing::warn!("NONCE_SECRET is not set, using the development secret");
            DEV_NONCE_SECRET.into()
        });

        let nonce_lifetime_secs: i64 = std::env::var("NONCE_LIFETIME_SECS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_LIFETIME_SECS.to_string())
            .parse()
            .expect("NONCE_LIFETIME_SECS must be a valid i64");

        let default_locale =
            std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            public_base_url,
            nonce_secret,
            nonce_lifetime_secs,
            default_locale,
        }
    }

    /// Absolute URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        format!(
            "{}/api/v1/refresh",
            self.public_base_url.trim_end_matches('/')
        )
    }
}
