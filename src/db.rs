use crate::config::Config;
use crate::db_storage::PgLeadRepository;
use crate::repository::{InMemoryLeadRepository, LeadRepository};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

const CREATE_LEADS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id           BIGSERIAL PRIMARY KEY,
    name         VARCHAR(255) NOT NULL CHECK (char_length(name) > 0),
    job_title    VARCHAR(255),
    phone_number VARCHAR(50),
    company      VARCHAR(255) NOT NULL CHECK (char_length(company) > 0),
    email        VARCHAR(255),
    headcount    INTEGER CHECK (headcount >= 0),
    industry     VARCHAR(100),
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at   TIMESTAMPTZ
)
"#;

const CREATE_INDUSTRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_leads_industry ON leads (industry)";

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Creates the `leads` table and its index if they do not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_LEADS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDUSTRY_INDEX)
            .execute(&self.pool)
            .await?;
        tracing::info!("Lead schema ready");
        Ok(())
    }
}

/// Picks the lead store for this process: Postgres when a connection string
/// is configured, otherwise the in-memory store.
pub async fn repository_from_config(config: &Config) -> anyhow::Result<Arc<dyn LeadRepository>> {
    match &config.database_url {
        Some(url) => {
            let db = Database::connect(url).await?;
            tracing::info!("Database connection pool established");
            Ok(Arc::new(PgLeadRepository::new(db.pool)))
        }
        None => {
            tracing::warn!("Using in-memory lead store, data will not survive a restart");
            Ok(Arc::new(InMemoryLeadRepository::new()))
        }
    }
}
