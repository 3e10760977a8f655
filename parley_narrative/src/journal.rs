//! Journal export - the full session history in a stable, serializable form.

use parley_rules::{Npc, SessionId, SessionState, TurnRecord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::ports::{Clock, ExportSink, SystemClock};

/// Snapshot of a session for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalExport {
    pub session_id: SessionId,
    pub setting: String,
    pub opening_scene: String,
    pub current_dilemma: String,
    pub total_successes: u32,
    pub total_failures: u32,
    pub ending: Option<String>,
    pub turns: Vec<TurnRecord>,
    /// Roster in display order.
    pub npcs: Vec<Npc>,
}

impl JournalExport {
    pub fn from_session(session: &SessionState) -> Self {
        Self {
            session_id: session.id(),
            setting: session.setting().to_string(),
            opening_scene: session.opening_scene().to_string(),
            current_dilemma: session.dilemma().to_string(),
            total_successes: session.total_successes(),
            total_failures: session.total_failures(),
            ending: session.ending().map(str::to_string),
            turns: session.history().to_vec(),
            npcs: session.npcs().to_vec(),
        }
    }
}

/// Writes journals as pretty-printed JSON files into a directory.
pub struct JsonJournalWriter {
    output_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonJournalWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn file_name(&self, journal: &JournalExport) -> String {
        let session = journal.session_id.to_string();
        format!(
            "journal_{}_{}.json",
            self.clock.now().format("%Y%m%dT%H%M%SZ"),
            &session[..8]
        )
    }
}

impl ExportSink for JsonJournalWriter {
    fn export(&self, journal: &JournalExport) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(self.file_name(journal));
        let json = serde_json::to_string_pretty(journal)?;
        std::fs::write(&path, json)?;
        tracing::info!(path = %path.display(), turns = journal.turns.len(), "journal exported");
        Ok(path)
    }
}
