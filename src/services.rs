use crate::errors::AppError;
use crate::models::{LeadChanges, LeadFilter, NewLead};
use crate::repository::LeadRepository;
use crate::validation::LeadResponse;
use std::sync::Arc;

/// Orchestrates lead operations on top of a [`LeadRepository`].
///
/// Absence is reported as `None`/`false`; turning it into a not-found
/// response is left to the handlers.
#[derive(Clone)]
pub struct LeadService {
    repository: Arc<dyn LeadRepository>,
}

impl LeadService {
    pub fn new(repository: Arc<dyn LeadRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<LeadResponse>, AppError> {
        let leads = self.repository.list(filter).await?;
        tracing::debug!("Listed {} leads for filter {:?}", leads.len(), filter);
        Ok(leads.into_iter().map(LeadResponse::from).collect())
    }

    pub async fn get_lead(&self, id: i64) -> Result<Option<LeadResponse>, AppError> {
        Ok(self.repository.get_by_id(id).await?.map(LeadResponse::from))
    }

    pub async fn create_lead(&self, lead: NewLead) -> Result<LeadResponse, AppError> {
        let lead = self.repository.create(lead).await?;
        tracing::info!("Created lead {} ({})", lead.id, lead.company);
        Ok(lead.into())
    }

    pub async fn update_lead(
        &self,
        id: i64,
        changes: LeadChanges,
    ) -> Result<Option<LeadResponse>, AppError> {
        if changes.is_empty() {
            tracing::debug!("Update for lead {} carries no fields, only updated_at changes", id);
        }
        let updated = self.repository.update(id, changes).await?;
        if updated.is_some() {
            tracing::info!("Updated lead {}", id);
        }
        Ok(updated.map(LeadResponse::from))
    }

    pub async fn delete_lead(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            tracing::info!("Deleted lead {}", id);
        }
        Ok(deleted)
    }

    /// Extension point for augmenting a lead with third-party data.
    ///
    /// No provider is wired in yet, so this is a lookup that returns the lead
    /// exactly as stored.
    pub async fn enrich_lead(&self, id: i64) -> Result<Option<LeadResponse>, AppError> {
        let lead = self.repository.get_by_id(id).await?;
        if lead.is_some() {
            tracing::debug!("No enrichment provider configured, returning lead {} as is", id);
        }
        Ok(lead.map(LeadResponse::from))
    }
}
