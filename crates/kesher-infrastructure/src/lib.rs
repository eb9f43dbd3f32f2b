//! Persistence backends for the Kesher simulator.
//!
//! Implementations of the repository traits defined in `kesher-core`:
//! in-memory variants for tests and embedded use, and a directory-of-TOML
//! store for finalized session records.

pub mod dir_record_repository;
pub mod memory;

pub use dir_record_repository::DirSessionRecordRepository;
pub use memory::{InMemoryScenarioRepository, InMemorySessionRecordRepository};
