//! Directory-based SessionRecordRepository implementation.
//!
//! One TOML file per finalized record:
//!
//! ```text
//! base_dir/
//! └── records/
//!     ├── record-id-1.toml
//!     └── record-id-2.toml
//! ```
//!
//! Records are append-only, so there is no update path and an existing file
//! is never overwritten.

use async_trait::async_trait;
use kesher_core::error::{KesherError, Result};
use kesher_core::session::{SessionRecord, SessionRecordRepository};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-per-record TOML store for finalized sessions.
pub struct DirSessionRecordRepository {
    records_dir: PathBuf,
}

impl DirSessionRecordRepository {
    /// Creates a repository at the default location
    /// (`<user config dir>/kesher`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    /// or the directory structure cannot be created.
    pub async fn default_location() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| KesherError::io("could not determine the user config directory"))?
            .join("kesher");
        Self::new(base_dir).await
    }

    /// Creates a repository rooted at `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records directory cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let records_dir = base_dir.as_ref().join("records");
        fs::create_dir_all(&records_dir).await?;
        Ok(Self { records_dir })
    }

    /// Returns the directory record files are stored in.
    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    fn record_path(&self, record_id: &str) -> PathBuf {
        self.records_dir.join(format!("{record_id}.toml"))
    }
}

#[async_trait]
impl SessionRecordRepository for DirSessionRecordRepository {
    async fn insert(&self, record: &SessionRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        if fs::try_exists(&path).await? {
            return Err(KesherError::internal(format!(
                "record '{}' already exists; records are append-only",
                record.id
            )));
        }

        let serialized = toml::to_string_pretty(record)?;
        fs::write(&path, serialized).await?;
        tracing::debug!(record_id = %record.id, path = %path.display(), "record persisted");
        Ok(())
    }

    async fn find_by_id(&self, record_id: &str) -> Result<Option<SessionRecord>> {
        let path = self.record_path(record_id);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(toml::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.records_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            match toml::from_str::<SessionRecord>(&contents) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A corrupt file must not hide the rest of the store.
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record");
                }
            }
        }

        // Most recent first.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kesher_core::emotional_state::EmotionalState;
    use kesher_core::feedback::{Criterion, CriterionScore, FeedbackResult};
    use kesher_core::session::{Message, Speaker};
    use tempfile::TempDir;

    fn test_record(session_id: &str) -> SessionRecord {
        SessionRecord::new(
            session_id,
            "first-date-coffee",
            vec![
                Message {
                    speaker: Speaker::User,
                    content: "I'm really glad we could meet today".to_string(),
                    timestamp: "2025-01-01T00:00:00Z".to_string(),
                },
                Message {
                    speaker: Speaker::Partner,
                    content: "Me too! Did you find the place okay?".to_string(),
                    timestamp: "2025-01-01T00:00:05Z".to_string(),
                },
            ],
            EmotionalState::initial().apply_delta(12, 12),
            FeedbackResult {
                scores: vec![CriterionScore {
                    criterion: Criterion::Empathy,
                    score: 84,
                    comment: "Empathy was excellent.".to_string(),
                }],
                overall: 84,
                strengths: vec!["You acknowledged your date's feelings".to_string()],
                improvements: Vec::new(),
                tips: Vec::new(),
            },
            95,
        )
    }

    #[tokio::test]
    async fn test_insert_then_read_back_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let repository = DirSessionRecordRepository::new(temp_dir.path()).await.unwrap();

        let record = test_record("session-1");
        repository.insert(&record).await.unwrap();

        let loaded = repository.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages, record.messages);
        assert_eq!(loaded.final_state, record.final_state);
        assert_eq!(loaded.feedback, record.feedback);
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let repository = DirSessionRecordRepository::new(temp_dir.path()).await.unwrap();

        let record = test_record("session-1");
        repository.insert(&record).await.unwrap();
        assert!(repository.insert(&record).await.is_err());

        // The original file is untouched.
        let loaded = repository.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_find_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let repository = DirSessionRecordRepository::new(temp_dir.path()).await.unwrap();

        assert!(repository.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_most_recent_first() {
        let temp_dir = TempDir::new().unwrap();
        let repository = DirSessionRecordRepository::new(temp_dir.path()).await.unwrap();

        let mut first = test_record("session-1");
        first.created_at = "2025-01-01T00:00:00Z".to_string();
        let mut second = test_record("session-2");
        second.created_at = "2025-06-01T00:00:00Z".to_string();

        repository.insert(&first).await.unwrap();
        repository.insert(&second).await.unwrap();

        let all = repository.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, "session-2");
        assert_eq!(all[1].session_id, "session-1");
    }
}
