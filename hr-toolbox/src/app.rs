// Application state and orchestration logic.
//
// The central event loop that owns the roster, the draw and grouping engines,
// and the group list. It applies user commands from the TUI, drives the spin
// ticker and naming tasks it spawns, and pushes UI updates to the TUI render
// loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::export;
use crate::import;
use crate::naming::{NameSource, NamingError};
use crate::protocol::{AppSnapshot, DrawEvent, NamingEvent, Notice, UiUpdate, UserCommand};
use crate::session::draw::DrawEngine;
use crate::session::grouping::{
    apply_candidate_names, apply_fallback_names, Group, GroupingEngine, GroupingError,
};
use crate::session::roster::Roster;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub roster: Roster,
    pub draw: DrawEngine,
    pub grouping: GroupingEngine,
    /// Result of the latest grouping run. Replaced wholesale on each run.
    pub groups: Vec<Group>,
    pub group_size: usize,
    pub theme: String,
    /// Shared with spawned naming tasks.
    pub name_source: Arc<dyn NameSource>,
    pub naming_task: Option<JoinHandle<()>>,
    /// Identifies the current naming request. Bumped on every request and
    /// whenever the groups or roster change, so late replies are dropped.
    pub naming_generation: u64,
    pub naming_in_flight: bool,
    pub spin_task: Option<JoinHandle<()>>,
    /// Identifies the current spin ticker. Bumped on every spin and cancel.
    pub spin_generation: u64,
    pub draw_tx: mpsc::Sender<DrawEvent>,
    pub naming_tx: mpsc::Sender<NamingEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        name_source: Arc<dyn NameSource>,
        draw_tx: mpsc::Sender<DrawEvent>,
        naming_tx: mpsc::Sender<NamingEvent>,
    ) -> Self {
        let draw = DrawEngine::new(config.draw.allow_duplicates);
        let group_size = config.grouping.default_group_size;
        let theme = config.grouping.default_theme.clone();

        AppState {
            config,
            roster: Roster::new(),
            draw,
            grouping: GroupingEngine::default(),
            groups: Vec::new(),
            group_size,
            theme,
            name_source,
            naming_task: None,
            naming_generation: 0,
            naming_in_flight: false,
            spin_task: None,
            spin_generation: 0,
            draw_tx,
            naming_tx,
        }
    }

    /// Build a full snapshot for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            roster: self.roster.participants().to_vec(),
            duplicate_names: self.roster.duplicate_names(),
            draw_phase: self.draw.phase(),
            allow_duplicates: self.draw.allow_duplicates(),
            remaining_count: self.draw.remaining().len(),
            winners: self.draw.winners().to_vec(),
            groups: self.groups.clone(),
            group_size: self.group_size,
            theme: self.theme.clone(),
            naming_in_flight: self.naming_in_flight,
        }
    }

    /// Bring dependent state in line after any roster mutation.
    ///
    /// Resyncs the draw pool (winners are kept), cancels a running spin, and
    /// invalidates any outstanding naming request. Returns `true` if a spin
    /// was cancelled.
    pub fn on_roster_changed(&mut self) -> bool {
        let cancelled = self.cancel_spin();
        self.draw.sync_pool(self.roster.participants());
        self.cancel_naming_task();
        info!(
            "Roster now has {} participants (revision {})",
            self.roster.len(),
            self.roster.revision()
        );
        cancelled
    }

    // -- Draw ---------------------------------------------------------------

    /// Start a spin and its ticker task.
    pub fn start_spin(&mut self) -> Result<(), crate::session::draw::DrawError> {
        self.draw.begin_spin(self.roster.participants())?;

        self.spin_generation += 1;
        let generation = self.spin_generation;
        let interval = Duration::from_millis(self.config.draw.tick_interval_ms);
        let count = self.config.draw.tick_count;
        let tx = self.draw_tx.clone();

        self.spin_task = Some(spawn_spin_ticker(tx, generation, interval, count));
        info!("Spin started (gen: {})", generation);
        Ok(())
    }

    /// Abort the ticker and return a running engine to rest. Returns whether
    /// a spin was actually running.
    pub fn cancel_spin(&mut self) -> bool {
        if let Some(handle) = self.spin_task.take() {
            handle.abort();
        }
        self.spin_generation += 1;
        let cancelled = self.draw.cancel();
        if cancelled {
            info!("Cancelled running spin");
        }
        cancelled
    }

    /// Cancel any spin, clear the winners log, and refill the pool.
    pub fn reset_draw(&mut self) {
        self.cancel_spin();
        self.draw.reset(self.roster.participants());
    }

    // -- Naming -------------------------------------------------------------

    /// Cancel the naming task if one is running and invalidate its reply.
    pub fn cancel_naming_task(&mut self) {
        if let Some(handle) = self.naming_task.take() {
            handle.abort();
            info!("Cancelled group naming task");
        }
        self.naming_generation += 1;
        self.naming_in_flight = false;
    }

    /// Ask the name source for one name per group.
    ///
    /// The request runs in a spawned task bounded by `naming.timeout_secs`
    /// and reports back through `naming_tx`, tagged with the generation.
    pub fn request_group_names(&mut self) -> Result<u64, NamingError> {
        if self.groups.is_empty() {
            return Err(NamingError::NoGroups);
        }
        if self.naming_in_flight {
            return Err(NamingError::InFlight);
        }

        self.naming_generation += 1;
        let generation = self.naming_generation;
        let count = self.groups.len();
        let theme = self.theme.clone();
        let timeout = Duration::from_secs(self.config.naming.timeout_secs);
        let source = Arc::clone(&self.name_source);
        let tx = self.naming_tx.clone();

        self.naming_in_flight = true;
        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, source.suggest_names(count, &theme)).await {
                Ok(Ok(names)) => Ok(names),
                Ok(Err(e)) => Err(format!("{e:#}")),
                Err(_) => Err(format!("no reply within {}s", timeout.as_secs())),
            };
            let _ = tx.send(NamingEvent { generation, result }).await;
        });

        self.naming_task = Some(handle);
        info!(
            "Requested names for {} groups (theme: {}, gen: {})",
            count, self.theme, generation
        );
        Ok(generation)
    }
}

/// Emit `count` ticks `interval` apart, then `Finished`.
fn spawn_spin_ticker(
    tx: mpsc::Sender<DrawEvent>,
    generation: u64,
    interval: Duration,
    count: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for _ in 0..count {
            ticker.tick().await;
            if tx.send(DrawEvent::Tick { generation }).await.is_err() {
                return;
            }
        }
        ticker.tick().await;
        let _ = tx.send(DrawEvent::Finished { generation }).await;
    })
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on three channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Spin ticker events
/// 3. Naming results
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut draw_rx: mpsc::Receiver<DrawEvent>,
    mut naming_rx: mpsc::Receiver<NamingEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Spin ticker ---
            Some(event) = draw_rx.recv() => {
                handle_draw_event(&mut state, event, &ui_tx).await;
            }

            // --- Naming results ---
            Some(event) = naming_rx.recv() => {
                handle_naming_event(&mut state, event, &ui_tx).await;
            }
        }
    }

    // Cleanup
    state.cancel_spin();
    state.cancel_naming_task();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

async fn notify(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Handle an event from the spin ticker.
async fn handle_draw_event(state: &mut AppState, event: DrawEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    if event.generation() != state.spin_generation || !state.draw.is_running() {
        debug!(
            "Discarding stale draw event (event gen: {}, current gen: {})",
            event.generation(),
            state.spin_generation
        );
        return;
    }

    match event {
        DrawEvent::Tick { .. } => {
            if let Some(name) = state.draw.tick_name(state.roster.participants()) {
                let _ = ui_tx.send(UiUpdate::DrawTick(name)).await;
            }
        }
        DrawEvent::Finished { .. } => {
            state.spin_task = None;
            match state.draw.settle(state.roster.participants()) {
                Ok(record) => {
                    let _ = ui_tx.send(UiUpdate::DrawSettled(record)).await;
                }
                Err(e) => {
                    warn!("Spin could not settle: {}", e);
                    notify(ui_tx, Notice::warning(e.to_string())).await;
                }
            }
            send_snapshot(state, ui_tx).await;
        }
    }
}

/// Handle the result of a naming request.
async fn handle_naming_event(
    state: &mut AppState,
    event: NamingEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.generation != state.naming_generation {
        debug!(
            "Discarding stale naming result (event gen: {}, current gen: {})",
            event.generation, state.naming_generation
        );
        return;
    }

    state.naming_task = None;
    state.naming_in_flight = false;

    match event.result {
        Ok(names) => {
            let renamed = apply_candidate_names(&mut state.groups, &names);
            info!("Applied {} suggested group names", renamed);
            notify(ui_tx, Notice::info(format!("Named {renamed} of {} groups", state.groups.len()))).await;
        }
        Err(message) => {
            warn!("Group naming failed: {}", message);
            apply_fallback_names(&mut state.groups);
            notify(
                ui_tx,
                Notice::warning(format!("Group naming failed ({message}); using default names")),
            )
            .await;
        }
    }
    send_snapshot(state, ui_tx).await;
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::AddNames(text) => {
            let added = state.roster.add_from_text(&text);
            if added == 0 {
                notify(ui_tx, Notice::warning("No names entered")).await;
                return;
            }
            roster_changed(state, ui_tx, format!("Added {added} participants")).await;
        }
        UserCommand::ImportFile(path) => match import::read_names_file(&path) {
            Ok(text) => {
                let added = state.roster.add_from_text(&text);
                if added == 0 {
                    notify(ui_tx, Notice::warning(format!("No names found in {}", path.display()))).await;
                    return;
                }
                roster_changed(
                    state,
                    ui_tx,
                    format!("Imported {added} participants from {}", path.display()),
                )
                .await;
            }
            Err(e) => {
                warn!("Import failed: {}", e);
                notify(ui_tx, Notice::error(e.to_string())).await;
            }
        },
        UserCommand::LoadMockNames => {
            let added = state.roster.add_from_mock_set();
            roster_changed(state, ui_tx, format!("Loaded {added} sample participants")).await;
        }
        UserCommand::RemoveParticipant(id) => {
            let name = state.roster.get(id).map(|p| p.name.clone());
            if state.roster.remove(id) {
                let name = name.unwrap_or_default();
                roster_changed(state, ui_tx, format!("Removed {name}")).await;
            } else {
                debug!("Remove ignored, no participant with id {}", id);
            }
        }
        UserCommand::DedupeRoster => {
            let dropped = state.roster.dedupe();
            if dropped == 0 {
                notify(ui_tx, Notice::info("No duplicate names")).await;
                return;
            }
            roster_changed(state, ui_tx, format!("Removed {dropped} duplicate entries")).await;
        }
        UserCommand::ClearRoster => {
            let dropped = state.roster.clear();
            if dropped == 0 {
                return;
            }
            roster_changed(state, ui_tx, format!("Cleared {dropped} participants")).await;
        }
        UserCommand::SetAllowDuplicates(allow) => {
            match state.draw.set_allow_duplicates(allow) {
                Ok(()) => {
                    info!("Allow multiple wins: {}", allow);
                    send_snapshot(state, ui_tx).await;
                }
                Err(e) => notify(ui_tx, Notice::warning(e.to_string())).await,
            }
        }
        UserCommand::Spin => match state.start_spin() {
            Ok(()) => send_snapshot(state, ui_tx).await,
            Err(e) => {
                info!("Spin rejected: {}", e);
                notify(ui_tx, Notice::warning(e.to_string())).await;
            }
        },
        UserCommand::ResetDraw => {
            state.reset_draw();
            notify(ui_tx, Notice::info("Draw reset")).await;
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::SetGroupSize(size) => {
            if size == 0 {
                notify(ui_tx, Notice::warning(GroupingError::InvalidGroupSize(size).to_string())).await;
                return;
            }
            state.group_size = size;
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::GenerateGroups => {
            match state.grouping.group(state.roster.participants(), state.group_size) {
                Ok(groups) => {
                    state.cancel_naming_task();
                    let count = groups.len();
                    state.groups = groups;
                    notify(ui_tx, Notice::info(format!("Created {count} groups"))).await;
                    send_snapshot(state, ui_tx).await;
                }
                Err(e) => notify(ui_tx, Notice::warning(e.to_string())).await,
            }
        }
        UserCommand::SetTheme(theme) => {
            let theme = theme.trim();
            state.theme = if theme.is_empty() {
                state.config.grouping.default_theme.clone()
            } else {
                theme.to_string()
            };
            send_snapshot(state, ui_tx).await;
        }
        UserCommand::RequestGroupNames => match state.request_group_names() {
            Ok(_) => send_snapshot(state, ui_tx).await,
            Err(e) => notify(ui_tx, Notice::warning(e.to_string())).await,
        },
        UserCommand::ExportGroups => {
            if state.groups.is_empty() {
                notify(ui_tx, Notice::warning("Generate groups before exporting")).await;
                return;
            }
            let dir = export::export_dir(&state.config.export);
            let today = chrono::Local::now().date_naive();
            match export::export_groups(&dir, &state.groups, today) {
                Ok(outcome) => {
                    let text = if outcome.replaced {
                        format!("Exported to {} (overwrote today's earlier export)", outcome.path.display())
                    } else {
                        format!("Exported to {}", outcome.path.display())
                    };
                    notify(ui_tx, Notice::info(text)).await;
                }
                Err(e) => {
                    warn!("Export failed: {:#}", e);
                    notify(ui_tx, Notice::error(format!("Export failed: {e:#}"))).await;
                }
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Shared tail of every roster mutation.
async fn roster_changed(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>, message: String) {
    if state.on_roster_changed() {
        notify(ui_tx, Notice::warning("Roster changed during the spin; draw cancelled")).await;
    }
    notify(ui_tx, Notice::info(message)).await;
    send_snapshot(state, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
