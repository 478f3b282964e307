// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the application state. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{AppSnapshot, Notice, TabId, UiUpdate, UserCommand};
use crate::session::draw::{DrawPhase, WinnerRecord};
use crate::session::grouping::Group;
use crate::session::roster::Participant;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Which text field the user is typing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Names separated by commas or line breaks.
    AddNames,
    /// Path of a `.txt`/`.csv` file to import.
    ImportPath,
    /// Naming theme for the grouping tab.
    Theme,
}

/// Which yes/no question is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Quit,
    ClearRoster,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated via `UiUpdate` messages from the app orchestrator. The
/// `render_frame` function reads this struct to draw the screen.
#[derive(Debug, Default)]
pub struct ViewState {
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

    /// Which tab is active in the main panel.
    pub active_tab: TabId,
    /// Highlighted row on the participants tab.
    pub selected: usize,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    pub input_mode: Option<InputMode>,
    pub input_buffer: String,
    pub confirm: Option<ConfirmKind>,
    /// Most recent notice from the app.
    pub notice: Option<Notice>,
    /// Name flashing during a spin.
    pub spin_name: Option<String>,
    /// Winner of the spin that just settled.
    pub last_winner: Option<WinnerRecord>,
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator.
    ///
    /// Local fields (tab, selection, scroll, modes) are left unchanged apart
    /// from clamping the selection to the new roster.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if snapshot.draw_phase != DrawPhase::Running {
            self.spin_name = None;
        }
        if snapshot.winners.is_empty() {
            self.last_winner = None;
        }

        self.roster = snapshot.roster;
        self.duplicate_names = snapshot.duplicate_names;
        self.draw_phase = snapshot.draw_phase;
        self.allow_duplicates = snapshot.allow_duplicates;
        self.remaining_count = snapshot.remaining_count;
        self.winners = snapshot.winners;
        self.groups = snapshot.groups;
        self.group_size = snapshot.group_size;
        self.theme = snapshot.theme;
        self.naming_in_flight = snapshot.naming_in_flight;

        self.selected = self.selected.min(self.roster.len().saturating_sub(1));
    }

    pub fn is_spinning(&self) -> bool {
        self.draw_phase == DrawPhase::Running
    }

    pub fn selected_participant(&self) -> Option<&Participant> {
        self.roster.get(self.selected)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::DrawTick(name) => {
            state.spin_name = Some(name);
            state.last_winner = None;
        }
        UiUpdate::DrawSettled(record) => {
            state.spin_name = None;
            state.last_winner = Some(record);
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: status bar, active tab, notice and help rows,
/// then any modal overlay.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active_tab {
        TabId::Participants => widgets::participants::render(frame, layout.main_panel, state),
        TabId::Draw => widgets::draw::render(frame, layout.main_panel, state),
        TabId::Grouping => widgets::groups::render(frame, layout.main_panel, state),
    }
    widgets::help_bar::render_notice(frame, layout.notice_bar, state);
    widgets::help_bar::render_help(frame, layout.help_bar, state);

    if let Some(mode) = state.input_mode {
        widgets::input_box::render(frame, frame.area(), mode, &state.input_buffer);
    }
    if let Some(kind) = state.confirm {
        widgets::confirm::render(frame, frame.area(), kind);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen and
///    bracketed paste so pasted name lists arrive as one event).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableBracketedPaste)?;

    // 2. Set panic hook to restore terminal on crash.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        if let Some(cmd) = input::handle_paste(&text, &mut view_state) {
                            let _ = cmd_tx.send(cmd).await;
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events: the next render tick picks up the new size
                    }
                    Some(Err(_)) | None => {
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
