// Status bar widget: tab bar, roster size, duplicate count.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [tab bar] | [roster count] [duplicate count]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " HR Toolbox ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    spans.extend(tab_spans(state.active_tab));

    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("{} participants", state.roster.len()),
        Style::default().fg(Color::White),
    ));

    let dupes = state.duplicate_names.len();
    if dupes > 0 {
        spans.push(Span::styled(
            format!("  {dupes} duplicate names"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans with the active tab highlighted.
/// E.g. "[1:Participants] [2:Lucky Draw] [3:Grouping]"
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let tabs = [TabId::Participants, TabId::Draw, TabId::Grouping];

    let mut spans = Vec::new();
    for (idx, tab_id) in tabs.into_iter().enumerate() {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", idx + 1, tab_label(tab_id)), style));
        spans.push(Span::raw(" "));
    }
    spans
}

/// Return the label for a tab.
pub fn tab_label(tab: TabId) -> &'static str {
    match tab {
        TabId::Participants => "Participants",
        TabId::Draw => "Lucky Draw",
        TabId::Grouping => "Grouping",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
