//! Language-generation providers for the Kesher simulator.
//!
//! Two implementations of `kesher_core::provider::DialogueProvider`:
//!
//! - [`OpenAiProvider`]: calls an OpenAI-compatible Chat Completions API over
//!   REST. The partner reply and disposition signal come back as one JSON
//!   object.
//! - [`ScriptedProvider`]: deterministic, offline. Used in tests and anywhere
//!   a real backend is unavailable.

pub mod openai_provider;
pub mod prompt;
pub mod scripted;

pub use openai_provider::OpenAiProvider;
pub use scripted::ScriptedProvider;
