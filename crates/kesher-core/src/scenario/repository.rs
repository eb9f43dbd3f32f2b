//! Scenario repository trait.
//!
//! Defines the interface for catalogs that are served from a record store
//! rather than compiled in.

use super::model::Scenario;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract read-only source of scenario definitions.
///
/// Implementations back the catalog with a record store. Scenarios are
/// immutable, so the trait exposes no write operations.
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    /// Finds a scenario by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Scenario))`: Scenario found
    /// - `Ok(None)`: Scenario not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, scenario_id: &str) -> Result<Option<Scenario>>;

    /// Lists all scenarios in stable order.
    async fn list_all(&self) -> Result<Vec<Scenario>>;
}
