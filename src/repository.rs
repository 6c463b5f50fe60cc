//! Data access abstraction over the lead store.
//!
//! Orchestration only sees [`LeadRepository`], so the backing engine
//! (Postgres in `db_storage`, or the in-memory map below) can be swapped at
//! startup without touching the service or the handlers.

use crate::errors::AppError;
use crate::models::{Lead, LeadChanges, LeadFilter, NewLead};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// All leads matching `filter`. Nothing matching is an empty list, not an error.
    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>, AppError>;

    /// Inserts a lead, assigning its identifier and creation timestamp.
    async fn create(&self, lead: NewLead) -> Result<Lead, AppError>;

    /// Applies `changes` and refreshes `updated_at`. `None` when `id` is unknown.
    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    leads: BTreeMap<i64, Lead>,
}

/// Process-local store. Contents live as long as the process and are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryLeadRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .leads
            .values()
            .filter(|lead| filter.matches(lead))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>, AppError> {
        Ok(self.state.read().await.leads.get(&id).cloned())
    }

    async fn create(&self, lead: NewLead) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        // ids are never handed out twice, even after deletes
        state.last_id += 1;
        let lead = lead.into_lead(state.last_id, Utc::now());
        state.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.write().await;
        let Some(lead) = state.leads.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(lead);
        lead.updated_at = Some(Utc::now().max(lead.created_at));
        Ok(Some(lead.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.write().await.leads.remove(&id).is_some())
    }
}
