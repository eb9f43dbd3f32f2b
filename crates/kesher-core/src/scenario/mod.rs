//! Scenario domain module.
//!
//! Scenarios are immutable definitions of a simulated conversational starting
//! point and goal. A built-in catalog ships with the crate; additional
//! scenarios can be served through the `ScenarioRepository` trait.
//!
//! # Module Structure
//!
//! - `model`: Scenario definition types (`Scenario`, `Difficulty`)
//! - `catalog`: Built-in catalog with pure filters
//! - `repository`: Repository trait for record-store-backed catalogs

mod catalog;
mod model;
mod repository;

// Re-export public API
pub use catalog::ScenarioCatalog;
pub use model::{Difficulty, Scenario};
pub use repository::ScenarioRepository;
