//! SQLite-based state and session-history storage.
//!
//! Provides persistent storage for:
//! - The single [`SessionState`] and the block-list, in a `kv` table whose
//!   keys are wire-compatible with the dashboard protocol (`isFocusing`,
//!   `endTime`, `unlockPhrase`, `blockedSites`, `blockedKeywords`)
//! - Focus-session history and statistics
//!
//! Defaults are seeded on first open, so a fresh install always reads a
//! well-formed idle state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::DatabaseError;
use crate::rules::BlockList;
use crate::session::SessionState;

const KEY_IS_FOCUSING: &str = "isFocusing";
const KEY_END_TIME: &str = "endTime";
const KEY_UNLOCK_PHRASE: &str = "unlockPhrase";
const KEY_BLOCKED_SITES: &str = "blockedSites";
const KEY_BLOCKED_KEYWORDS: &str = "blockedKeywords";
const KEY_ACTIVE_SESSION: &str = "activeSessionId";

/// How a recorded focus session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    /// Ran its full length.
    Completed,
    /// Ended early through the passphrase-gated stop.
    Stopped,
    /// Overwritten by a new start while still running.
    Superseded,
}

impl SessionOutcome {
    fn as_str(self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Stopped => "stopped",
            SessionOutcome::Superseded => "superseded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub uuid: String,
    pub planned_min: u64,
    pub actual_min: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub outcome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub stopped_sessions: u64,
    pub total_focus_min: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// SQLite database for session state, block-list, and history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/focusgate.db`.
    ///
    /// Creates the file, schema, and seeded defaults if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("focusgate.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database. Mainly useful for tests.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid        TEXT NOT NULL,
                planned_min INTEGER NOT NULL,
                actual_min  INTEGER NOT NULL DEFAULT 0,
                started_at  TEXT NOT NULL,
                ended_at    TEXT,
                outcome     TEXT NOT NULL DEFAULT 'active'
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_outcome ON sessions(outcome);

            -- Install-time defaults: a fresh database reads as idle.
            INSERT OR IGNORE INTO kv (key, value) VALUES
                ('isFocusing', 'false'),
                ('endTime', '0'),
                ('unlockPhrase', ''),
                ('blockedSites', '[]'),
                ('blockedKeywords', '[]');",
        )?;
        Ok(())
    }

    // ── kv store ─────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── session state ────────────────────────────────────────────────

    /// Load the persisted session state; missing keys read as idle.
    pub fn load_session_state(&self) -> Result<SessionState, DatabaseError> {
        let is_focusing = self
            .kv_get(KEY_IS_FOCUSING)?
            .map(|v| v == "true")
            .unwrap_or(false);
        let end_time = match self.kv_get(KEY_END_TIME)? {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| DatabaseError::CorruptValue {
                    key: KEY_END_TIME.to_string(),
                    message: e.to_string(),
                })?,
            None => 0,
        };
        let unlock_phrase = self.kv_get(KEY_UNLOCK_PHRASE)?.unwrap_or_default();
        Ok(SessionState {
            is_focusing,
            end_time,
            unlock_phrase,
        })
    }

    /// Persist the session state under its three kv keys.
    pub fn save_session_state(&self, state: &SessionState) -> Result<(), DatabaseError> {
        self.kv_set(KEY_IS_FOCUSING, if state.is_focusing { "true" } else { "false" })?;
        self.kv_set(KEY_END_TIME, &state.end_time.to_string())?;
        self.kv_set(KEY_UNLOCK_PHRASE, &state.unlock_phrase)?;
        Ok(())
    }

    /// Stored unlock phrase; empty string when unset.
    pub fn unlock_phrase(&self) -> Result<String, DatabaseError> {
        Ok(self.kv_get(KEY_UNLOCK_PHRASE)?.unwrap_or_default())
    }

    /// Store the unlock phrase ahead of a start command.
    pub fn set_unlock_phrase(&self, phrase: &str) -> Result<(), DatabaseError> {
        self.kv_set(KEY_UNLOCK_PHRASE, phrase)
    }

    // ── block-list ───────────────────────────────────────────────────

    pub fn load_block_list(&self) -> Result<BlockList, DatabaseError> {
        let sites = self.load_string_list(KEY_BLOCKED_SITES)?;
        let keywords = self.load_string_list(KEY_BLOCKED_KEYWORDS)?;
        Ok(BlockList::from_parts(sites, keywords))
    }

    pub fn save_block_list(&self, list: &BlockList) -> Result<(), DatabaseError> {
        self.kv_set(KEY_BLOCKED_SITES, &encode_string_list(list.sites())?)?;
        self.kv_set(KEY_BLOCKED_KEYWORDS, &encode_string_list(list.keywords())?)?;
        Ok(())
    }

    fn load_string_list(&self, key: &str) -> Result<Vec<String>, DatabaseError> {
        match self.kv_get(key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| DatabaseError::CorruptValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
            None => Ok(Vec::new()),
        }
    }

    // ── session history ──────────────────────────────────────────────

    /// Open a history row for a starting session and remember it as active.
    ///
    /// Any row still marked active (e.g. left over from a crash) is closed
    /// out as superseded first.
    pub fn begin_session(
        &self,
        planned_min: u32,
        started_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "UPDATE sessions SET outcome = 'superseded', ended_at = ?1 WHERE outcome = 'active'",
            params![started_at.to_rfc3339()],
        )?;
        self.conn.execute(
            "INSERT INTO sessions (uuid, planned_min, started_at) VALUES (?1, ?2, ?3)",
            params![
                Uuid::new_v4().to_string(),
                planned_min,
                started_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.kv_set(KEY_ACTIVE_SESSION, &id.to_string())?;
        Ok(id)
    }

    /// Close out the active history row, if any, recording the outcome and
    /// the minutes actually spent (clamped to the planned length).
    pub fn finish_session(
        &self,
        outcome: SessionOutcome,
        ended_at: DateTime<Utc>,
    ) -> Result<Option<i64>, DatabaseError> {
        let Some(raw_id) = self.kv_get(KEY_ACTIVE_SESSION)? else {
            return Ok(None);
        };
        let id = raw_id.parse::<i64>().map_err(|e| DatabaseError::CorruptValue {
            key: KEY_ACTIVE_SESSION.to_string(),
            message: e.to_string(),
        })?;

        let row = self
            .conn
            .query_row(
                "SELECT planned_min, started_at FROM sessions WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, String>(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(DatabaseError::from(other)),
            })?;
        let Some((planned_min, started_raw)) = row else {
            self.kv_delete(KEY_ACTIVE_SESSION)?;
            return Ok(None);
        };

        let started_at = DateTime::parse_from_rfc3339(&started_raw)
            .map_err(|e| DatabaseError::CorruptValue {
                key: "sessions.started_at".to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);
        let elapsed_min = (ended_at - started_at).num_minutes().max(0) as u64;
        let actual_min = match outcome {
            SessionOutcome::Completed => planned_min,
            _ => elapsed_min.min(planned_min),
        };

        self.conn.execute(
            "UPDATE sessions SET outcome = ?1, ended_at = ?2, actual_min = ?3 WHERE id = ?4",
            params![outcome.as_str(), ended_at.to_rfc3339(), actual_min, id],
        )?;
        self.kv_delete(KEY_ACTIVE_SESSION)?;
        Ok(Some(id))
    }

    /// Most recent finished sessions, newest first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, planned_min, actual_min, started_at, ended_at, outcome
             FROM sessions
             WHERE outcome != 'active'
             ORDER BY started_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, uuid, planned_min, actual_min, started_raw, ended_raw, outcome) = row?;
            records.push(SessionRecord {
                id,
                uuid,
                planned_min,
                actual_min,
                started_at: parse_timestamp(&started_raw, "sessions.started_at")?,
                ended_at: match ended_raw {
                    Some(raw) => Some(parse_timestamp(&raw, "sessions.ended_at")?),
                    None => None,
                },
                outcome,
            });
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<SessionStats, DatabaseError> {
        self.stats_since(Some(today_start()))
    }

    pub fn stats_all(&self) -> Result<SessionStats, DatabaseError> {
        let mut stats = self.stats_since(None)?;
        let today = self.stats_since(Some(today_start()))?;
        stats.today_sessions = today.today_sessions;
        stats.today_focus_min = today.today_focus_min;
        Ok(stats)
    }

    fn stats_since(&self, since: Option<String>) -> Result<SessionStats, DatabaseError> {
        let (sql, filter) = match &since {
            Some(bound) => (
                "SELECT outcome, COUNT(*), COALESCE(SUM(actual_min), 0)
                 FROM sessions
                 WHERE outcome != 'active' AND started_at >= ?1
                 GROUP BY outcome",
                Some(bound.as_str()),
            ),
            None => (
                "SELECT outcome, COUNT(*), COALESCE(SUM(actual_min), 0)
                 FROM sessions
                 WHERE outcome != 'active'
                 GROUP BY outcome",
                None,
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        };
        let rows = match filter {
            Some(bound) => stmt.query_map(params![bound], map_row)?,
            None => stmt.query_map([], map_row)?,
        };

        let mut stats = SessionStats::default();
        for row in rows {
            let (outcome, count, minutes) = row?;
            stats.total_sessions += count;
            stats.total_focus_min += minutes;
            match outcome.as_str() {
                "completed" => stats.completed_sessions += count,
                "stopped" => stats.stopped_sessions += count,
                _ => {}
            }
        }
        if since.is_some() {
            stats.today_sessions = stats.total_sessions;
            stats.today_focus_min = stats.total_focus_min;
        }
        Ok(stats)
    }
}

fn encode_string_list(entries: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(entries).map_err(|e| DatabaseError::CorruptValue {
        key: "string list".to_string(),
        message: e.to_string(),
    })
}

fn parse_timestamp(raw: &str, key: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}

fn today_start() -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    format!("{today}T00:00:00+00:00")
}
