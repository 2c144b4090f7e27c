//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Pomodoro sessions (one row per session, upserted on every transition)
//! - Study sessions that pomodoro sessions may be linked to
//! - Per-user session statistics

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::persist::SessionStore;
use crate::timer::{PomodoroConfig, SessionRecord, TimerState};

const SESSION_COLUMNS: &str = "id, user_id, study_session_id, phase, paused_from, phase_duration_secs,
     focus_duration, break_duration, long_break_duration, cycles_until_long_break,
     current_cycle, cycles_completed, is_active, started_at, paused_at, completed_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub cycles_completed: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub active_sessions: u64,
    pub total_cycles: u64,
}

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/stayfocus.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("stayfocus.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS pomodoro_sessions (
                    id                      TEXT PRIMARY KEY,
                    user_id                 TEXT NOT NULL,
                    study_session_id        TEXT,
                    phase                   TEXT NOT NULL,
                    paused_from             TEXT,
                    phase_duration_secs     INTEGER NOT NULL,
                    focus_duration          INTEGER NOT NULL,
                    break_duration          INTEGER NOT NULL,
                    long_break_duration     INTEGER NOT NULL,
                    cycles_until_long_break INTEGER NOT NULL,
                    current_cycle           INTEGER NOT NULL DEFAULT 1,
                    cycles_completed        INTEGER NOT NULL DEFAULT 0,
                    is_active               INTEGER NOT NULL DEFAULT 1,
                    started_at              TEXT,
                    paused_at               TEXT,
                    completed_at            TEXT,
                    updated_at              TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS study_sessions (
                    id               TEXT PRIMARY KEY,
                    user_id          TEXT NOT NULL,
                    title            TEXT NOT NULL DEFAULT '',
                    cycles_completed INTEGER NOT NULL DEFAULT 0,
                    created_at       TEXT NOT NULL,
                    updated_at       TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_pomodoro_sessions_user_active
                    ON pomodoro_sessions(user_id, is_active, updated_at);
                CREATE INDEX IF NOT EXISTS idx_study_sessions_user ON study_sessions(user_id);",
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Most recent sessions for `user_id`, newest first.
    pub fn list_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<SessionRecord>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM pomodoro_sessions
             WHERE user_id = ?1
             ORDER BY updated_at DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], RawSession::from_row)
            .map_err(DatabaseError::from)?;

        let mut records = Vec::new();
        for row in rows {
            let raw = row.map_err(DatabaseError::from)?;
            records.push(raw.into_record()?);
        }
        Ok(records)
    }

    pub fn stats(&self, user_id: &str) -> Result<SessionStats> {
        let stats = self
            .conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN completed_at IS NOT NULL THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN is_active = 1 AND completed_at IS NULL THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(cycles_completed), 0)
                 FROM pomodoro_sessions
                 WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(SessionStats {
                        total_sessions: row.get(0)?,
                        completed_sessions: row.get(1)?,
                        active_sessions: row.get(2)?,
                        total_cycles: row.get(3)?,
                    })
                },
            )
            .map_err(DatabaseError::from)?;
        Ok(stats)
    }

    /// Create a study session that pomodoro sessions can link to.
    pub fn create_study_session(&self, user_id: &str, title: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = ts(Utc::now());
        self.conn
            .execute(
                "INSERT INTO study_sessions (id, user_id, title, cycles_completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?4)",
                params![id, user_id, title, now],
            )
            .map_err(DatabaseError::from)?;
        Ok(id)
    }

    pub fn study_session(&self, id: &str) -> Result<Option<StudySession>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, user_id, title, cycles_completed, created_at, updated_at
                 FROM study_sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(DatabaseError::from)?;

        let Some((id, user_id, title, cycles_completed, created_at, updated_at)) = raw else {
            return Ok(None);
        };
        Ok(Some(StudySession {
            created_at: parse_ts(&id, &created_at)?,
            updated_at: parse_ts(&id, &updated_at)?,
            id,
            user_id,
            title,
            cycles_completed,
        }))
    }
}

impl SessionStore for Database {
    fn fetch_active(&self, user_id: &str) -> Result<Option<SessionRecord>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM pomodoro_sessions
             WHERE user_id = ?1 AND is_active = 1 AND completed_at IS NULL
             ORDER BY updated_at DESC
             LIMIT 1"
        );
        let raw = self
            .conn
            .query_row(&sql, params![user_id], RawSession::from_row)
            .optional()
            .map_err(DatabaseError::from)?;
        match raw {
            Some(raw) => Ok(Some(raw.into_record()?)),
            None => Ok(None),
        }
    }

    fn upsert(&mut self, record: &SessionRecord) -> Result<()> {
        let paused_from = match record.state {
            TimerState::Paused(phase) => Some(phase.as_str()),
            _ => None,
        };
        self.conn
            .execute(
                "INSERT OR REPLACE INTO pomodoro_sessions (
                    id, user_id, study_session_id, phase, paused_from, phase_duration_secs,
                    focus_duration, break_duration, long_break_duration, cycles_until_long_break,
                    current_cycle, cycles_completed, is_active, started_at, paused_at,
                    completed_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    record.id.to_string(),
                    record.user_id,
                    record.study_session_id,
                    record.state.as_str(),
                    paused_from,
                    record.phase_secs,
                    record.config.focus_duration,
                    record.config.break_duration,
                    record.config.long_break_duration,
                    record.config.cycles_until_long_break,
                    record.current_cycle,
                    record.cycles_completed,
                    record.is_active,
                    record.started_at.map(ts),
                    record.paused_at.map(ts),
                    record.completed_at.map(ts),
                    ts(record.updated_at),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn complete(&mut self, session_id: Uuid, completed_at: DateTime<Utc>) -> Result<()> {
        let at = ts(completed_at);
        self.conn
            .execute(
                "UPDATE pomodoro_sessions
                 SET is_active = 0, completed_at = ?2, updated_at = ?2
                 WHERE id = ?1",
                params![session_id.to_string(), at],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn record_study_cycle(&mut self, study_session_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE study_sessions
                 SET cycles_completed = cycles_completed + 1, updated_at = ?2
                 WHERE id = ?1",
                params![study_session_id, ts(Utc::now())],
            )
            .map_err(DatabaseError::from)?;
        Ok(changed > 0)
    }
}

/// Column values as stored, before validation.
struct RawSession {
    id: String,
    user_id: String,
    study_session_id: Option<String>,
    phase: String,
    paused_from: Option<String>,
    phase_secs: u64,
    config: PomodoroConfig,
    current_cycle: u32,
    cycles_completed: u32,
    is_active: bool,
    started_at: Option<String>,
    paused_at: Option<String>,
    completed_at: Option<String>,
    updated_at: String,
}

impl RawSession {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            study_session_id: row.get(2)?,
            phase: row.get(3)?,
            paused_from: row.get(4)?,
            phase_secs: row.get(5)?,
            config: PomodoroConfig {
                focus_duration: row.get(6)?,
                break_duration: row.get(7)?,
                long_break_duration: row.get(8)?,
                cycles_until_long_break: row.get(9)?,
            },
            current_cycle: row.get(10)?,
            cycles_completed: row.get(11)?,
            is_active: row.get(12)?,
            started_at: row.get(13)?,
            paused_at: row.get(14)?,
            completed_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    fn into_record(self) -> Result<SessionRecord, DatabaseError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| DatabaseError::Corrupt {
            id: self.id.clone(),
            message: format!("invalid session id: {e}"),
        })?;
        let state = TimerState::from_parts(&self.phase, self.paused_from.as_deref()).ok_or_else(
            || DatabaseError::Corrupt {
                id: self.id.clone(),
                message: format!(
                    "unknown phase '{}' (paused_from: {:?})",
                    self.phase, self.paused_from
                ),
            },
        )?;
        let started_at = parse_opt_ts(&self.id, self.started_at.as_deref())?;
        let paused_at = parse_opt_ts(&self.id, self.paused_at.as_deref())?;
        let completed_at = parse_opt_ts(&self.id, self.completed_at.as_deref())?;
        let updated_at = parse_ts(&self.id, &self.updated_at)?;

        Ok(SessionRecord {
            id,
            user_id: self.user_id,
            study_session_id: self.study_session_id,
            state,
            phase_secs: self.phase_secs,
            config: self.config,
            current_cycle: self.current_cycle,
            cycles_completed: self.cycles_completed,
            is_active: self.is_active,
            started_at,
            paused_at,
            completed_at,
            updated_at,
        })
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(id: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt {
            id: id.to_string(),
            message: format!("invalid timestamp '{value}': {e}"),
        })
}

fn parse_opt_ts(id: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    value.map(|v| parse_ts(id, v)).transpose()
}
