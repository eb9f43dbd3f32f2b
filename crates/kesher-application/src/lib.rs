//! Application layer for the Kesher simulator.
//!
//! This crate provides the use case that coordinates between the domain and
//! infrastructure layers: the caller-facing session lifecycle (start,
//! submit, retry, end, feedback, scenario listing) with per-session
//! serialization and the provider retry policy.

pub mod registry;
pub mod simulator_usecase;

pub use registry::SessionRegistry;
pub use simulator_usecase::{ScenarioFilter, SimulatorUseCase};
