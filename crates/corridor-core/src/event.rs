use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::SessionId;

/// One lifecycle step in a session's audit trail.
///
/// Event kinds cover the lifecycle of a request: provider attempts, circuit
/// transitions, structured-retry steps, SLA boundaries, and the final
/// outcome. `details` is a free-form map so new fields don't require a
/// schema migration; `duration_ms` is set wherever a bounded operation ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub ts: DateTime<Utc>,
    pub session_id: SessionId,
    pub event: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl TimelineEvent {
    pub fn new(session_id: SessionId, event: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            ts: Utc::now(),
            session_id,
            event: event.into(),
            details,
        }
    }
}

/// Append-only event timeline: one global log plus one file per session.
///
/// Writes are best-effort — a logging failure must never interrupt the
/// routing attempt loop that produced the event.
#[derive(Debug, Clone)]
pub struct Timeline {
    logs_dir: PathBuf,
}

impl Timeline {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.logs_dir.join("sessions")
    }

    pub fn global_log_path(&self) -> PathBuf {
        self.logs_dir.join("poc_timeline.log")
    }

    pub fn session_log_path(&self, session_id: SessionId) -> PathBuf {
        self.sessions_dir().join(format!("{session_id}.jsonl"))
    }

    /// Append one event to both the global log and the per-session log.
    /// Silently swallows I/O errors so the caller's hot path is never
    /// interrupted by a full disk or a missing directory.
    pub fn append(&self, event: &TimelineEvent) {
        let _ = self.try_append(event);
    }

    fn try_append(&self, event: &TimelineEvent) -> std::io::Result<()> {
        fs::create_dir_all(&self.logs_dir)?;
        fs::create_dir_all(self.sessions_dir())?;
        let line = serde_json::to_string(event).unwrap_or_default();

        append_line(&self.global_log_path(), &line)?;
        append_line(&self.session_log_path(event.session_id), &line)?;
        Ok(())
    }

    /// Read back a session's events in append order.
    pub fn read_session(&self, session_id: SessionId) -> std::io::Result<Vec<TimelineEvent>> {
        read_jsonl(&self.session_log_path(session_id))
    }

    /// Read back the global timeline in append order.
    pub fn read_global(&self) -> std::io::Result<Vec<TimelineEvent>> {
        read_jsonl(&self.global_log_path())
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{line}")
}

fn read_jsonl(path: &Path) -> std::io::Result<Vec<TimelineEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = Timeline::new(dir.path().join("logs"));
        let session_id = SessionId::new_v4();

        let mut details = Map::new();
        details.insert("provider".into(), Value::String("p1".into()));
        timeline.append(&TimelineEvent::new(session_id, "provider_attempt", details));

        let events = timeline.read_session(session_id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "provider_attempt");
        assert_eq!(events[0].details.get("provider").unwrap(), "p1");

        let global = timeline.read_global().unwrap();
        assert_eq!(global.len(), 1);
    }
}
