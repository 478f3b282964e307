// Message types exchanged between the TUI, the app orchestrator, and the
// background tasks it spawns.

use std::collections::BTreeSet;
use std::path::PathBuf;

use uuid::Uuid;

use crate::session::draw::{DrawPhase, WinnerRecord};
use crate::session::grouping::Group;
use crate::session::roster::Participant;

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

/// A user action forwarded from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Append names typed by the user (newline/comma separated).
    AddNames(String),
    /// Append names read from a text or CSV file.
    ImportFile(PathBuf),
    LoadMockNames,
    RemoveParticipant(Uuid),
    DedupeRoster,
    /// Empty the roster. The TUI only sends this after the user confirms.
    ClearRoster,
    SetAllowDuplicates(bool),
    Spin,
    ResetDraw,
    SetGroupSize(usize),
    GenerateGroups,
    SetTheme(String),
    RequestGroupNames,
    ExportGroups,
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Participants,
    Draw,
    Grouping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line message shown to the user in the notice bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Full copy of everything the TUI renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub roster: Vec<Participant>,
    pub duplicate_names: BTreeSet<String>,
    pub draw_phase: DrawPhase,
    pub allow_duplicates: bool,
    pub remaining_count: usize,
    /// Most recent first.
    pub winners: Vec<WinnerRecord>,
    pub groups: Vec<Group>,
    pub group_size: usize,
    pub theme: String,
    pub naming_in_flight: bool,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// Suspense name to flash while a spin is running.
    DrawTick(String),
    /// The spin finished with this winner.
    DrawSettled(WinnerRecord),
    Notice(Notice),
}

// ---------------------------------------------------------------------------
// Background tasks -> app
// ---------------------------------------------------------------------------

/// Emitted by the spin ticker task. `generation` identifies the spin so that
/// events from a cancelled ticker are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawEvent {
    Tick { generation: u64 },
    Finished { generation: u64 },
}

impl DrawEvent {
    pub fn generation(&self) -> u64 {
        match self {
            DrawEvent::Tick { generation } | DrawEvent::Finished { generation } => *generation,
        }
    }
}

/// Outcome of one group-naming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingEvent {
    /// Matches `AppState::naming_generation` at request time.
    pub generation: u64,
    /// Candidate names, or a description of what went wrong.
    pub result: Result<Vec<String>, String>,
}
