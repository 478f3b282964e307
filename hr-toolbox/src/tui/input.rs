// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching,
// selection, text entry, confirmation dialogs).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{ConfirmKind, InputMode, ViewState};
use crate::protocol::{TabId, UserCommand};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when the key press was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if let Some(kind) = view_state.confirm {
        return handle_confirm(key_event, kind, view_state);
    }

    if let Some(mode) = view_state.input_mode {
        return handle_text_input(key_event, mode, view_state);
    }

    // Global keys
    match key_event.code {
        KeyCode::Char('1') => {
            view_state.active_tab = TabId::Participants;
            return None;
        }
        KeyCode::Char('2') => {
            view_state.active_tab = TabId::Draw;
            return None;
        }
        KeyCode::Char('3') => {
            view_state.active_tab = TabId::Grouping;
            return None;
        }
        KeyCode::Tab => {
            view_state.active_tab = next_tab(view_state.active_tab);
            return None;
        }
        KeyCode::Char('q') => {
            view_state.confirm = Some(ConfirmKind::Quit);
            return None;
        }
        _ => {}
    }

    match view_state.active_tab {
        TabId::Participants => handle_participants_key(key_event, view_state),
        TabId::Draw => handle_draw_key(key_event, view_state),
        TabId::Grouping => handle_grouping_key(key_event, view_state),
    }
}

fn next_tab(tab: TabId) -> TabId {
    match tab {
        TabId::Participants => TabId::Draw,
        TabId::Draw => TabId::Grouping,
        TabId::Grouping => TabId::Participants,
    }
}

/// Handle key events while a yes/no dialog is open.
///
/// `y` confirms, `n` or `Esc` cancels, everything else is blocked. For the
/// quit dialog `q` also confirms.
fn handle_confirm(
    key_event: KeyEvent,
    kind: ConfirmKind,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    match (key_event.code, kind) {
        (KeyCode::Char('y') | KeyCode::Char('Y'), _)
        | (KeyCode::Char('q') | KeyCode::Char('Q'), ConfirmKind::Quit) => {
            view_state.confirm = None;
            Some(match kind {
                ConfirmKind::Quit => UserCommand::Quit,
                ConfirmKind::ClearRoster => UserCommand::ClearRoster,
            })
        }
        (KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc, _) => {
            view_state.confirm = None;
            None
        }
        _ => None,
    }
}

/// Handle key events while typing into a text field.
///
/// Printable characters are appended, Backspace deletes, Enter submits and
/// Esc abandons the entry. Alt+Enter starts a new line in the names field.
fn handle_text_input(
    key_event: KeyEvent,
    mode: InputMode,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter
            if mode == InputMode::AddNames && key_event.modifiers.contains(KeyModifiers::ALT) =>
        {
            view_state.input_buffer.push('\n');
            None
        }
        KeyCode::Esc => {
            view_state.input_mode = None;
            view_state.input_buffer.clear();
            None
        }
        KeyCode::Enter => {
            view_state.input_mode = None;
            let text = std::mem::take(&mut view_state.input_buffer);
            match mode {
                InputMode::AddNames => Some(UserCommand::AddNames(text)),
                InputMode::ImportPath => {
                    let path = text.trim();
                    if path.is_empty() {
                        None
                    } else {
                        Some(UserCommand::ImportFile(PathBuf::from(path)))
                    }
                }
                InputMode::Theme => Some(UserCommand::SetTheme(text)),
            }
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.input_buffer.push(c);
            None
        }
        _ => None,
    }
}

/// Handle a bracketed paste.
///
/// Inside a text field the pasted text is inserted as typed; the names field
/// keeps line breaks, the single-line fields turn them into spaces. On the
/// participants tab a paste outside any field adds the names directly.
/// Pasted text never reaches the tab key bindings.
pub fn handle_paste(text: &str, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.confirm.is_some() {
        return None;
    }
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    match view_state.input_mode {
        Some(InputMode::AddNames) => {
            view_state.input_buffer.push_str(&text);
            None
        }
        Some(InputMode::ImportPath | InputMode::Theme) => {
            let single_line = text.replace('\n', " ");
            view_state.input_buffer.push_str(single_line.trim_end());
            None
        }
        None if view_state.active_tab == TabId::Participants && !text.trim().is_empty() => {
            Some(UserCommand::AddNames(text))
        }
        None => None,
    }
}

fn handle_participants_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('a') => {
            start_input(view_state, InputMode::AddNames, String::new());
            None
        }
        KeyCode::Char('i') => {
            start_input(view_state, InputMode::ImportPath, String::new());
            None
        }
        KeyCode::Char('m') => Some(UserCommand::LoadMockNames),
        KeyCode::Char('d') => Some(UserCommand::DedupeRoster),
        KeyCode::Char('x') | KeyCode::Delete => view_state
            .selected_participant()
            .map(|p| UserCommand::RemoveParticipant(p.id)),
        KeyCode::Char('C') => {
            if !view_state.roster.is_empty() {
                view_state.confirm = Some(ConfirmKind::ClearRoster);
            }
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.selected + 1 < view_state.roster.len() {
                view_state.selected += 1;
            }
            None
        }
        KeyCode::Home => {
            view_state.selected = 0;
            None
        }
        KeyCode::End => {
            view_state.selected = view_state.roster.len().saturating_sub(1);
            None
        }
        _ => None,
    }
}

fn handle_draw_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            if view_state.is_spinning() {
                None
            } else {
                Some(UserCommand::Spin)
            }
        }
        KeyCode::Char('u') => {
            if view_state.is_spinning() {
                None
            } else {
                Some(UserCommand::SetAllowDuplicates(!view_state.allow_duplicates))
            }
        }
        KeyCode::Char('R') => Some(UserCommand::ResetDraw),
        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, "winners");
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, "winners");
            None
        }
        _ => None,
    }
}

fn handle_grouping_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            let size = clamp_group_size(view_state.group_size + 1, view_state.roster.len());
            (size != view_state.group_size).then_some(UserCommand::SetGroupSize(size))
        }
        KeyCode::Char('-') | KeyCode::Left => {
            let size = clamp_group_size(view_state.group_size.saturating_sub(1), view_state.roster.len());
            (size != view_state.group_size).then_some(UserCommand::SetGroupSize(size))
        }
        KeyCode::Char('g') => Some(UserCommand::GenerateGroups),
        KeyCode::Char('t') => {
            let current = view_state.theme.clone();
            start_input(view_state, InputMode::Theme, current);
            None
        }
        KeyCode::Char('n') => {
            if view_state.naming_in_flight {
                None
            } else {
                Some(UserCommand::RequestGroupNames)
            }
        }
        KeyCode::Char('e') => Some(UserCommand::ExportGroups),
        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, "groups");
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, "groups");
            None
        }
        _ => None,
    }
}

/// Keep the group size control within `1..=max(roster_len, 1)`.
pub fn clamp_group_size(size: usize, roster_len: usize) -> usize {
    size.clamp(1, roster_len.max(1))
}

fn start_input(view_state: &mut ViewState, mode: InputMode, initial: String) {
    view_state.input_mode = Some(mode);
    view_state.input_buffer = initial;
}

fn scroll_up(view_state: &mut ViewState, key: &str) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(1);
}

fn scroll_down(view_state: &mut ViewState, key: &str) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(1);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
