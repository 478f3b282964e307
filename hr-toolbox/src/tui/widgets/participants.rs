// Participants widget: the roster in insertion order.
//
// Each row: "{n:>3}. {name}", duplicates in yellow with a marker, the
// selected row highlighted. The list scrolls to keep the selection visible.

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the participant list into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if state.roster.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::raw(""),
            Line::raw("  No participants yet."),
            Line::raw("  a: type names   i: import a file   m: load sample names"),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Participants"));
        frame.render_widget(paragraph, area);
        return;
    }

    // Visible row count: subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let total = state.roster.len();
    let offset = selection_offset(state.selected, total, visible_rows);

    let items: Vec<ListItem> = state
        .roster
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(idx, participant)| {
            let is_dup = state.duplicate_names.contains(&participant.name);
            let mut style = if is_dup {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            if idx == state.selected {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            let mut spans = vec![Span::styled(format!("{:>3}. {}", idx + 1, participant.name), style)];
            if is_dup {
                spans.push(Span::styled("  (duplicate)", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = if state.duplicate_names.is_empty() {
        format!("Participants ({total})")
    } else {
        format!(
            "Participants ({total}, {} duplicate names, d: remove duplicates)",
            state.duplicate_names.len()
        )
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);

    if total > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(visible_rows)).position(offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );
    }
}

/// First visible row such that `selected` stays on screen, pinned to the
/// bottom once the list is scrolled.
pub fn selection_offset(selected: usize, total: usize, visible_rows: usize) -> usize {
    if selected < visible_rows {
        return 0;
    }
    (selected + 1 - visible_rows).min(total.saturating_sub(visible_rows))
}
