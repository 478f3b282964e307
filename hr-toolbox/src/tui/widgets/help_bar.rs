// Notice and help rows at the bottom of the screen.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{NoticeLevel, TabId};
use crate::tui::ViewState;

/// Render the latest notice, colored by level.
pub fn render_notice(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(format!(" {}", notice.text), Style::default().fg(color)))
        }
        None => Line::raw(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render key hints for the current tab or mode.
pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Key hints for the current tab or mode.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.confirm.is_some() {
        return " y:Confirm | n/Esc:Cancel";
    }
    if state.input_mode.is_some() {
        return " Enter:Submit | Esc:Cancel | Backspace:Delete";
    }
    match state.active_tab {
        TabId::Participants => {
            " a:Add | i:Import | m:Sample | x:Remove | d:Dedupe | C:Clear | 1-3:Tabs | q:Quit"
        }
        TabId::Draw => " Space:Spin | u:Multiple wins | R:Reset | j/k:Scroll | 1-3:Tabs | q:Quit",
        TabId::Grouping => {
            " +/-:Size | g:Group | t:Theme | n:Name groups | e:Export CSV | 1-3:Tabs | q:Quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Notice;
    use crate::tui::{ConfirmKind, InputMode};

    #[test]
    fn help_text_follows_mode_then_tab() {
        let mut state = ViewState::default();
        assert!(help_text(&state).contains("a:Add"));

        state.active_tab = TabId::Draw;
        assert!(help_text(&state).contains("Space:Spin"));

        state.input_mode = Some(InputMode::Theme);
        assert!(help_text(&state).contains("Enter:Submit"));

        state.confirm = Some(ConfirmKind::Quit);
        assert!(help_text(&state).contains("y:Confirm"));
    }

    #[test]
    fn render_notice_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(60, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.notice = Some(Notice::error("Export failed: disk full"));
        terminal
            .draw(|frame| render_notice(frame, frame.area(), &state))
            .unwrap();
    }
}
