//! Kesher core domain: the dating-conversation simulator.
//!
//! This crate holds everything the simulator is, independent of any backend:
//! the scenario catalog, the emotional state model and its transition rules,
//! the session model with its turn state machine, the turn processor, the
//! feedback scorer, and the traits the outside world plugs into
//! ([`provider::DialogueProvider`] for generation,
//! [`session::SessionRecordRepository`] and [`scenario::ScenarioRepository`]
//! for persistence).

pub mod emotional_state;
pub mod error;
pub mod feedback;
pub mod provider;
pub mod scenario;
pub mod session;
pub mod turn;

// Re-export common error type
pub use error::{KesherError, Result};
