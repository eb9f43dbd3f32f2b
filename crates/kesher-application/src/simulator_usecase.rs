//! Simulator use case implementation.
//!
//! `SimulatorUseCase` is the surface the surrounding application calls:
//! start a session, submit messages, retry a stalled reply, end and score a
//! session, fetch feedback, list scenarios. It owns the per-session locking
//! rule and the upstream retry policy; everything semantic lives in
//! `kesher-core`.

use crate::registry::SessionRegistry;
use kesher_core::error::{KesherError, Result};
use kesher_core::feedback::{FeedbackResult, FeedbackScorer};
use kesher_core::provider::DialogueProvider;
use kesher_core::scenario::{Difficulty, Scenario, ScenarioRepository};
use kesher_core::session::{SessionRecord, SessionRecordRepository, SimulationSession, TurnState};
use kesher_core::turn::TurnProcessor;
use std::sync::Arc;
use std::time::Duration;

/// Automatic retries of a retryable provider failure before the error is
/// surfaced to the caller.
const UPSTREAM_RETRY_LIMIT: u32 = 1;

/// Upper bound on an honored `retry-after` hint.
const RETRY_DELAY_CAP: Duration = Duration::from_secs(30);

/// Optional filter for scenario listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

/// Coordinates sessions, the turn processor, the scorer, and persistence.
pub struct SimulatorUseCase {
    /// Read-only source of scenario definitions
    scenario_repository: Arc<dyn ScenarioRepository>,
    /// Append-only store for finalized session records
    record_repository: Arc<dyn SessionRecordRepository>,
    /// Runs the turn state machine against the generation provider
    processor: TurnProcessor,
    /// Deterministic post-session scorer
    scorer: FeedbackScorer,
    /// Live sessions with their per-session mutation locks
    registry: SessionRegistry,
}

impl SimulatorUseCase {
    /// Creates a new `SimulatorUseCase`.
    ///
    /// # Arguments
    ///
    /// * `scenario_repository` - Source of scenario definitions
    /// * `record_repository` - Store for finalized session records
    /// * `provider` - The language-generation backend
    pub fn new(
        scenario_repository: Arc<dyn ScenarioRepository>,
        record_repository: Arc<dyn SessionRecordRepository>,
        provider: Arc<dyn DialogueProvider>,
    ) -> Self {
        Self {
            scenario_repository,
            record_repository,
            processor: TurnProcessor::new(provider),
            scorer: FeedbackScorer::new(),
            registry: SessionRegistry::new(),
        }
    }

    /// Convenience constructor: built-in scenario catalog, in-memory record
    /// store.
    pub fn in_memory(provider: Arc<dyn DialogueProvider>) -> Self {
        Self::new(
            Arc::new(kesher_infrastructure::InMemoryScenarioRepository::builtin()),
            Arc::new(kesher_infrastructure::InMemorySessionRecordRepository::new()),
            provider,
        )
    }

    /// Starts a new session for a scenario.
    ///
    /// The fresh session has zero messages, the user's turn next, and the
    /// emotional state at its neutral baseline. Nothing is persisted until
    /// the session is finalized.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::NotFound` for an unknown scenario id.
    pub async fn start_session(&self, scenario_id: &str) -> Result<SimulationSession> {
        let scenario = self
            .scenario_repository
            .find_by_id(scenario_id)
            .await?
            .ok_or_else(|| KesherError::not_found("scenario", scenario_id))?;

        let session = SimulationSession::start(&scenario);
        tracing::debug!(session_id = %session.id, scenario_id, "session started");

        self.registry.insert(session.clone()).await;
        Ok(session)
    }

    /// Submits a user message and resolves the partner reply.
    ///
    /// Runs the two turn transitions in sequence. A retryable provider
    /// failure is retried once automatically; if it still fails, the session
    /// is left awaiting the partner reply (the user message is preserved)
    /// and the upstream error is surfaced - [`Self::retry_reply`] resumes
    /// from there.
    ///
    /// # Errors
    ///
    /// - `KesherError::NotFound` for an unknown session id.
    /// - `KesherError::Validation` for an empty or over-long message.
    /// - `KesherError::State` if the session is closed, a reply is already
    ///   pending, or another mutation of the same session is in flight.
    /// - `KesherError::Upstream` if the provider fails after retries.
    pub async fn submit_message(&self, session_id: &str, text: &str) -> Result<SimulationSession> {
        let entry = self.session_entry(session_id).await?;
        let mut session = lock_for_mutation(&entry, session_id)?;

        self.processor.submit_user_message(&mut session, text)?;
        self.generate_with_retry(&mut session).await?;
        Ok(session.clone())
    }

    /// Re-attempts reply generation for a session stalled in
    /// `AwaitingPartnerReply` after an upstream failure.
    ///
    /// Idempotent with respect to the conversation: only the reply
    /// transition runs, so the pending user message is never duplicated.
    ///
    /// # Errors
    ///
    /// - `KesherError::NotFound` for an unknown session id.
    /// - `KesherError::State` if no reply is pending or another mutation is
    ///   in flight.
    /// - `KesherError::Upstream` if the provider fails again.
    pub async fn retry_reply(&self, session_id: &str) -> Result<SimulationSession> {
        let entry = self.session_entry(session_id).await?;
        let mut session = lock_for_mutation(&entry, session_id)?;

        self.generate_with_retry(&mut session).await?;
        Ok(session.clone())
    }

    /// Ends a session: scores it, persists the finalized record, closes the
    /// session.
    ///
    /// The record is persisted before the session closes. If the store
    /// rejects the insert, the session stays in `AwaitingUser` and
    /// `end_session` can simply be called again.
    ///
    /// # Returns
    ///
    /// The id of the persisted record.
    ///
    /// # Errors
    ///
    /// - `KesherError::NotFound` for an unknown session id.
    /// - `KesherError::Validation` if the session has zero messages.
    /// - `KesherError::State` if the session is already closed, a reply is
    ///   pending, or another mutation is in flight.
    pub async fn end_session(&self, session_id: &str) -> Result<String> {
        let entry = self.session_entry(session_id).await?;
        let mut session = lock_for_mutation(&entry, session_id)?;

        if session.messages.is_empty() {
            return Err(KesherError::validation(
                "cannot end a session with no messages",
            ));
        }
        match session.turn_state {
            TurnState::AwaitingUser => {}
            TurnState::AwaitingPartnerReply => {
                return Err(KesherError::state(
                    "cannot end a session while a partner reply is pending",
                ));
            }
            TurnState::Closed => {
                return Err(KesherError::state("session is already closed"));
            }
        }

        let feedback = self.scorer.score(&session)?;
        let record = SessionRecord::new(
            session.id.clone(),
            session.scenario_id.clone(),
            session.messages.clone(),
            session.emotional_state,
            feedback,
            session_duration_secs(&session),
        );
        self.record_repository.insert(&record).await?;

        // The state was checked above, so closing cannot fail here.
        self.processor.close(&mut session)?;

        tracing::debug!(
            session_id = %session.id,
            record_id = %record.id,
            overall = record.feedback.overall,
            "session finalized"
        );
        Ok(record.id)
    }

    /// Drops a closed session from the registry.
    ///
    /// Closed sessions stay resolvable (so a late `submit_message` surfaces
    /// StateError rather than NotFound) until the caller explicitly evicts
    /// them; after eviction the id resolves to NotFound.
    ///
    /// # Errors
    ///
    /// - `KesherError::NotFound` for an unknown session id.
    /// - `KesherError::State` if the session is still live or another
    ///   mutation is in flight.
    pub async fn evict_session(&self, session_id: &str) -> Result<()> {
        let entry = self.session_entry(session_id).await?;
        {
            let session = lock_for_mutation(&entry, session_id)?;
            if session.turn_state != TurnState::Closed {
                return Err(KesherError::state(
                    "only closed sessions can be evicted; end the session first",
                ));
            }
        }
        self.registry.remove(session_id).await;
        tracing::debug!(session_id, "session evicted");
        Ok(())
    }

    /// Fetches the feedback of a finalized session by record id.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::NotFound` if no record carries the id.
    pub async fn get_feedback(&self, record_id: &str) -> Result<FeedbackResult> {
        Ok(self.get_record(record_id).await?.feedback)
    }

    /// Fetches a full finalized record by id.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::NotFound` if no record carries the id.
    pub async fn get_record(&self, record_id: &str) -> Result<SessionRecord> {
        self.record_repository
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| KesherError::not_found("record", record_id))
    }

    /// Returns a snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns `KesherError::NotFound` for an unknown session id.
    pub async fn get_session(&self, session_id: &str) -> Result<SimulationSession> {
        let entry = self.session_entry(session_id).await?;
        let session = entry.lock().await;
        Ok(session.clone())
    }

    /// Lists scenarios, optionally filtered by difficulty and/or category.
    pub async fn list_scenarios(&self, filter: Option<ScenarioFilter>) -> Result<Vec<Scenario>> {
        let scenarios = self.scenario_repository.list_all().await?;
        let Some(filter) = filter else {
            return Ok(scenarios);
        };

        Ok(scenarios
            .into_iter()
            .filter(|s| {
                filter.difficulty.is_none_or(|d| s.difficulty == d)
                    && filter.category.as_ref().is_none_or(|c| &s.category == c)
            })
            .collect())
    }

    async fn session_entry(
        &self,
        session_id: &str,
    ) -> Result<std::sync::Arc<tokio::sync::Mutex<SimulationSession>>> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| KesherError::not_found("session", session_id))
    }

    /// Runs the reply transition with the bounded automatic retry policy,
    /// honoring the provider's `retry-after` hint (capped) before retrying.
    async fn generate_with_retry(&self, session: &mut SimulationSession) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.processor.generate_reply(session).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempts < UPSTREAM_RETRY_LIMIT => {
                    attempts += 1;
                    tracing::warn!(
                        session_id = %session.id,
                        attempt = attempts,
                        error = %e,
                        "retrying reply generation"
                    );
                    if let Some(delay) = e.retry_after() {
                        tokio::time::sleep(delay.min(RETRY_DELAY_CAP)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Acquires the session's mutation lock without waiting.
///
/// Concurrent `continue` calls on one session are a caller programming
/// error, so a held lock surfaces `StateError` instead of queueing.
fn lock_for_mutation<'a>(
    entry: &'a std::sync::Arc<tokio::sync::Mutex<SimulationSession>>,
    session_id: &str,
) -> Result<tokio::sync::MutexGuard<'a, SimulationSession>> {
    entry.try_lock().map_err(|_| {
        KesherError::state(format!(
            "session '{session_id}' already has a mutation in flight"
        ))
    })
}

fn session_duration_secs(session: &SimulationSession) -> i64 {
    chrono::DateTime::parse_from_rfc3339(&session.created_at)
        .map(|created| (chrono::Utc::now() - created.with_timezone(&chrono::Utc)).num_seconds())
        .unwrap_or(0)
}
