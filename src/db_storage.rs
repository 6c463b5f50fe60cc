use crate::errors::{AppError, ResultExt};
use crate::models::{FieldUpdate, Lead, LeadChanges, LeadFilter, NewLead};
use crate::repository::LeadRepository;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Column list shared by every statement returning a full lead row.
const LEAD_COLUMNS: &str = "id, name, job_title, phone_number, company, email, headcount, \
                            industry, created_at, updated_at";

/// Postgres-backed lead storage.
///
/// Every write is a single statement, so each create/update/delete commits
/// atomically without explicit transactions.
#[derive(Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends `, column = <value>` for set or cleared fields.
fn push_assignment<'a, T>(
    qb: &mut QueryBuilder<'a, Postgres>,
    column: &str,
    update: FieldUpdate<T>,
) where
    T: 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send,
{
    match update {
        FieldUpdate::Unchanged => {}
        FieldUpdate::Clear => {
            qb.push(", ").push(column).push(" = NULL");
        }
        FieldUpdate::Set(value) => {
            qb.push(", ").push(column).push(" = ").push_bind(value);
        }
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM leads WHERE TRUE",
            LEAD_COLUMNS
        ));

        if let Some(industry) = filter.industry() {
            qb.push(" AND industry = ").push_bind(industry.to_string());
        }
        if let Some(min) = filter.headcount_min {
            qb.push(" AND headcount >= ").push_bind(min);
        }
        if let Some(max) = filter.headcount_max {
            qb.push(" AND headcount <= ").push_bind(max);
        }
        qb.push(" ORDER BY id");

        qb.build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list leads")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>, AppError> {
        sqlx::query_as::<_, Lead>(&format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load lead {}", id))
    }

    async fn create(&self, lead: NewLead) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            INSERT INTO leads (name, job_title, phone_number, company, email, headcount, industry)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(lead.name)
        .bind(lead.job_title)
        .bind(lead.phone_number)
        .bind(lead.company)
        .bind(lead.email)
        .bind(lead.headcount)
        .bind(lead.industry)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert lead")?;

        tracing::debug!("Inserted lead {}", lead.id);
        Ok(lead)
    }

    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError> {
        // updated_at never precedes created_at
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE leads SET updated_at = GREATEST(NOW(), created_at)",
        );

        if let Some(name) = changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(company) = changes.company {
            qb.push(", company = ").push_bind(company);
        }
        push_assignment(&mut qb, "job_title", changes.job_title);
        push_assignment(&mut qb, "phone_number", changes.phone_number);
        push_assignment(&mut qb, "email", changes.email);
        push_assignment(&mut qb, "headcount", changes.headcount);
        push_assignment(&mut qb, "industry", changes.industry);

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(LEAD_COLUMNS);

        qb.build_query_as::<Lead>()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to update lead {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete lead {}", id))?;

        Ok(result.rows_affected() > 0)
    }
}
