use axum::http::HeaderValue;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` selects the in-memory store (debug only).
    pub database_url: Option<String>,
    pub port: u16,
    /// Origins allowed to make cross-origin requests. `*` allows any origin.
    pub cors_origins: Vec<String>,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = match lookup("DEBUG") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow::anyhow!("DEBUG must be true or false, got {:?}", raw))?,
            None => false,
        };

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })
            .transpose()?;

        if database_url.is_none() && !debug {
            anyhow::bail!(
                "DATABASE_URL environment variable required (the in-memory store is only \
                 available with DEBUG=true)"
            );
        }

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            None => DEFAULT_PORT,
        };

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                anyhow::bail!("CORS_ORIGINS contains an invalid origin: {:?}", origin);
            }
        }

        Ok(Self {
            database_url,
            port,
            cors_origins,
            debug,
        })
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "leads_api=debug,tower_http=debug"
        } else {
            "leads_api=info,tower_http=info"
        }
    }

    /// Logs the loaded configuration without sensitive values.
    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded successfully");
        match &self.database_url {
            Some(url) => {
                tracing::debug!("Database URL: {}...", url.chars().take(20).collect::<String>())
            }
            None => tracing::warn!("No DATABASE_URL configured, leads will be kept in memory"),
        }
        tracing::debug!("CORS origins: {:?}", self.cors_origins);
        tracing::debug!("Server Port: {}", self.port);
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Parses the boolean spellings accepted for flags such as `DEBUG`.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
