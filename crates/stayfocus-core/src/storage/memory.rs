//! In-memory [`SessionStore`], for tests and embedders without SQLite.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, DatabaseError, Result};
use crate::persist::SessionStore;
use crate::timer::SessionRecord;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<Uuid, SessionRecord>,
    study_cycles: HashMap<String, u32>,
    fail_writes: bool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, as if the backend were unreachable.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn add_study_session(&mut self, id: &str) {
        self.study_cycles.entry(id.to_string()).or_insert(0);
    }

    pub fn study_cycles(&self, id: &str) -> Option<u32> {
        self.study_cycles.get(id).copied()
    }

    pub fn sessions(&self) -> Vec<&SessionRecord> {
        self.sessions.values().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&SessionRecord> {
        self.sessions.get(&id)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(CoreError::Database(DatabaseError::QueryFailed(
                "store unavailable".into(),
            )));
        }
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    fn fetch_active(&self, user_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self
            .sessions
            .values()
            .filter(|r| r.user_id == user_id && r.is_active && r.completed_at.is_none())
            .max_by_key(|r| r.updated_at)
            .cloned())
    }

    fn upsert(&mut self, record: &SessionRecord) -> Result<()> {
        self.check_writable()?;
        self.sessions.insert(record.id, record.clone());
        Ok(())
    }

    fn complete(&mut self, session_id: Uuid, completed_at: DateTime<Utc>) -> Result<()> {
        self.check_writable()?;
        if let Some(record) = self.sessions.get_mut(&session_id) {
            record.is_active = false;
            record.completed_at = Some(completed_at);
            record.updated_at = completed_at;
        }
        Ok(())
    }

    fn record_study_cycle(&mut self, study_session_id: &str) -> Result<bool> {
        self.check_writable()?;
        match self.study_cycles.get_mut(study_session_id) {
            Some(count) => {
                *count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
