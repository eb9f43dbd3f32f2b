//! Session domain module.
//!
//! A session is one in-progress or completed run of the simulator for a
//! given scenario. It exclusively owns its message sequence and its current
//! emotional state.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`Speaker`, `Message`)
//! - `model`: Core session model (`SimulationSession`, `TurnState`)
//! - `record`: Finalized session records (`SessionRecord`)
//! - `repository`: Repository trait for record persistence

mod message;
mod model;
mod record;
mod repository;

// Re-export public API
pub use message::{Message, PARTNER_REPLY_MAX_LEN, Speaker, USER_MESSAGE_MAX_LEN};
pub use model::{SimulationSession, TurnState};
pub use record::SessionRecord;
pub use repository::SessionRecordRepository;
