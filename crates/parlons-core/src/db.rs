//! Snapshot persistence and session-history export.

use crate::assessment::UserAssessment;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::{ItemId, MemoryState, Session, SessionStatus, Settings};
use crate::progress::LearnerProgress;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Version written into snapshots and export bundles.
pub const SCHEMA_VERSION: u32 = 1;

const LEARNER_KEY: &str = "learner";

/// Everything needed to resume a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub settings: Settings,
    pub assessment: UserAssessment,
    #[serde(default)]
    pub progress: LearnerProgress,
    /// Completed sessions, oldest first.
    pub sessions: Vec<Session>,
    pub memory: BTreeMap<ItemId, MemoryState>,
}

/// Portable session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub settings: Settings,
    pub sessions: Vec<Session>,
}

impl ExportBundle {
    pub fn new(settings: Settings, sessions: Vec<Session>, timestamp: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            timestamp,
            settings,
            sessions,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a bundle.
    pub fn from_json(s: &str) -> Result<Self> {
        let bundle: Self =
            serde_json::from_str(s).map_err(|e| Error::InvalidImport(format!("malformed bundle: {e}")))?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Reject bundles that would corrupt learner state.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema {
                found: self.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        if !(self.settings.speech_rate > 0.0 && self.settings.speech_rate <= 10.0) {
            return Err(Error::InvalidImport(format!(
                "speech rate out of range: {}",
                self.settings.speech_rate
            )));
        }

        let in_range = |x: f64| (0.0..=100.0).contains(&x);
        let mut seen = HashSet::new();
        for session in &self.sessions {
            if !seen.insert(session.id) {
                return Err(Error::InvalidImport(format!("session {} appears twice", session.id)));
            }
            if session.status != SessionStatus::Completed {
                return Err(Error::InvalidImport(format!("session {} is not completed", session.id)));
            }
            let response_ids = session.responses.iter().map(|r| &r.item_id);
            if session.items.iter().chain(response_ids).any(String::is_empty) {
                return Err(Error::InvalidImport(format!("session {} has an empty item id", session.id)));
            }
            for response in &session.responses {
                if ![response.accuracy, response.pronunciation, response.confidence]
                    .into_iter()
                    .all(in_range)
                {
                    return Err(Error::InvalidImport(format!(
                        "session {} has a score outside 0-100",
                        session.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Reject sessions that mention items missing from `catalog`.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<()> {
        for session in &self.sessions {
            let response_ids = session.responses.iter().map(|r| &r.item_id);
            if let Some(unknown) = session
                .items
                .iter()
                .chain(response_ids)
                .find(|id| catalog.get_by_id(id).is_none())
            {
                return Err(Error::InvalidImport(format!(
                    "session {} refers to unknown item {unknown}",
                    session.id
                )));
            }
        }
        Ok(())
    }
}

/// SQLite store for learner snapshots.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                schema_version INTEGER NOT NULL,
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Replace the stored snapshot.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, schema_version, payload, saved_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                LEARNER_KEY,
                snapshot.schema_version,
                payload,
                snapshot.saved_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(sessions = snapshot.sessions.len(), "snapshot saved");
        Ok(())
    }

    /// Load the stored snapshot, if any.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        let row: Option<(u32, String)> = self
            .conn
            .query_row(
                "SELECT schema_version, payload FROM snapshots WHERE key = ?1",
                params![LEARNER_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((version, payload)) = row else {
            return Ok(None);
        };
        if version > SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(Some(serde_json::from_str(&payload)?))
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Forget the stored snapshot.
    pub fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?1", params![LEARNER_KEY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CefrLevel, SessionKind};

    fn snapshot() -> Snapshot {
        let mut session = Session::new(
            SessionKind::NewContent,
            CefrLevel::A1,
            vec!["a1_1".to_string()],
            Utc::now(),
        );
        session.status = SessionStatus::Completed;
        Snapshot {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            settings: Settings::default(),
            assessment: UserAssessment::default(),
            progress: LearnerProgress {
                streak: 2,
                total_sessions: 4,
                ..LearnerProgress::default()
            },
            sessions: vec![session],
            memory: BTreeMap::new(),
        }
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let db = Database::in_memory().unwrap();
        assert!(db.load_snapshot().unwrap().is_none());

        let snap = snapshot();
        db.save_snapshot(&snap).unwrap();
        assert_eq!(db.load_snapshot().unwrap(), Some(snap));

        db.clear().unwrap();
        assert!(db.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let db = Database::in_memory().unwrap();
        let mut snap = snapshot();
        snap.schema_version = SCHEMA_VERSION + 1;
        db.save_snapshot(&snap).unwrap();

        assert!(matches!(
            db.load_snapshot(),
            Err(Error::UnsupportedSchema { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_bundle_validation() {
        let snap = snapshot();
        let bundle = ExportBundle::new(Settings::default(), snap.sessions.clone(), Utc::now());
        let parsed = ExportBundle::from_json(&bundle.to_json().unwrap()).unwrap();
        assert_eq!(parsed, bundle);

        let mut active = bundle.clone();
        active.sessions[0].status = SessionStatus::Active;
        assert!(matches!(active.validate(), Err(Error::InvalidImport(_))));

        let mut silent = bundle.clone();
        silent.settings.speech_rate = 0.0;
        assert!(matches!(silent.validate(), Err(Error::InvalidImport(_))));

        assert!(matches!(
            ExportBundle::from_json("{ not json"),
            Err(Error::InvalidImport(_))
        ));
    }

    fn response(item_id: &str) -> crate::models::UserResponse {
        crate::models::UserResponse {
            item_id: item_id.to_string(),
            spoken_text: "bonjour".to_string(),
            response_ms: 700,
            accuracy: 100.0,
            pronunciation: 100.0,
            confidence: 100.0,
            hesitation: false,
            is_correct: true,
            next_step: crate::models::NextStep::Continue,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_bundle_rejects_bad_item_ids() {
        let bundle = ExportBundle::new(Settings::default(), snapshot().sessions, Utc::now());

        let mut blank_response = bundle.clone();
        blank_response.sessions[0].responses.push(response(""));
        assert!(matches!(blank_response.validate(), Err(Error::InvalidImport(_))));

        let mut repeated = bundle.clone();
        repeated.sessions.push(repeated.sessions[0].clone());
        assert!(matches!(repeated.validate(), Err(Error::InvalidImport(_))));

        let catalog = Catalog::builtin();
        assert!(bundle.validate_against(&catalog).is_ok());

        let mut foreign_item = bundle.clone();
        foreign_item.sessions[0].items.push("ghost".to_string());
        assert!(foreign_item.validate().is_ok());
        assert!(matches!(foreign_item.validate_against(&catalog), Err(Error::InvalidImport(_))));

        let mut foreign_response = bundle;
        foreign_response.sessions[0].responses.push(response("phantom"));
        assert!(matches!(
            foreign_response.validate_against(&catalog),
            Err(Error::InvalidImport(_))
        ));
    }

    #[test]
    fn test_snapshot_without_progress_loads() {
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value.as_object_mut().unwrap().remove("progress");
        let loaded: Snapshot = serde_json::from_value(value).unwrap();
        assert_eq!(loaded.progress, LearnerProgress::default());
    }
}
