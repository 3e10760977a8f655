//! Collaborator ports: presentation, export, and time.
//!
//! The engine depends only on these traits. Console, GUI, or web adapters
//! live outside this crate.

use chrono::{DateTime, Utc};
use parley_rules::{Branch, Npc};
use std::path::PathBuf;

use crate::journal::JournalExport;
use crate::resolver::TurnResolution;

/// What the player asked for at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// Free-form persuasion text. Never checked against branch suggestions.
    Message(String),
    /// Replay the last input whose generation failed.
    Retry,
    /// Export the journal.
    Export,
    Quit,
}

/// Display side of the game loop.
pub trait Presenter {
    /// Show the roster and current hints before the player speaks.
    fn render_roster(&mut self, dilemma: &str, npcs: &[Npc], branches: &[Branch]);

    fn render_turn(&mut self, resolution: &TurnResolution);

    fn prompt_input(&mut self) -> PlayerInput;

    fn render_notice(&mut self, message: &str);
}

/// Receives the journal on demand.
#[cfg_attr(test, mockall::automock)]
pub trait ExportSink {
    /// Write the journal somewhere and report where.
    fn export(&self, journal: &JournalExport) -> std::io::Result<PathBuf>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
