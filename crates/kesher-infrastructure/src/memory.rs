//! In-memory repository implementations.
//!
//! Backed by `tokio::sync::RwLock`-wrapped maps. These serve tests and
//! embedded/single-process deployments where no durable store is wired in.

use async_trait::async_trait;
use kesher_core::error::{KesherError, Result};
use kesher_core::scenario::{Scenario, ScenarioCatalog, ScenarioRepository};
use kesher_core::session::{SessionRecord, SessionRecordRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read-only scenario source over an owned scenario list.
pub struct InMemoryScenarioRepository {
    scenarios: Vec<Scenario>,
}

impl InMemoryScenarioRepository {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Wraps the built-in catalog.
    pub fn builtin() -> Self {
        Self::new(ScenarioCatalog::builtin().list().to_vec())
    }
}

#[async_trait]
impl ScenarioRepository for InMemoryScenarioRepository {
    async fn find_by_id(&self, scenario_id: &str) -> Result<Option<Scenario>> {
        Ok(self.scenarios.iter().find(|s| s.id == scenario_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Scenario>> {
        Ok(self.scenarios.clone())
    }
}

/// Append-only in-memory record store.
#[derive(Default)]
pub struct InMemorySessionRecordRepository {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRecordRepository for InMemorySessionRecordRepository {
    async fn insert(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(KesherError::internal(format!(
                "record '{}' already exists; records are append-only",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, record_id: &str) -> Result<Option<SessionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(record_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>> {
        let records = self.records.read().await;
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
