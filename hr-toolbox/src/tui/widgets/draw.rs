// Lucky draw widget: spin display on the left, winners log on the right.

use ratatui::layout::{Alignment, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use super::clamp_scroll;
use crate::session::draw::{DrawPhase, WinnerRecord};
use crate::tui::layout::split_draw_panel;
use crate::tui::ViewState;

/// Render the draw tab into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (display_area, log_area) = split_draw_panel(area);
    render_display(frame, display_area, state);
    render_winners(frame, log_area, state);
}

fn render_display(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (headline, style) = headline(state);

    let mode = if state.allow_duplicates {
        "multiple wins allowed"
    } else {
        "each person wins once"
    };
    let pool = if state.allow_duplicates {
        format!("{} entrants", state.roster.len())
    } else {
        format!("{} of {} still in the pool", state.remaining_count, state.roster.len())
    };

    let inner_height = area.height.saturating_sub(2);
    let top_pad = inner_height.saturating_sub(5) / 2;

    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::raw("")).collect();
    lines.push(Line::from(Span::styled(headline, style)));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(pool, Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(mode, Style::default().fg(Color::Gray))));

    let border = if state.draw_phase == DrawPhase::Running {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Lucky Draw"),
    );
    frame.render_widget(paragraph, area);
}

/// Main line of the spin display and its style.
pub fn headline(state: &ViewState) -> (String, Style) {
    if let Some(name) = &state.spin_name {
        return (
            name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
    }
    if let Some(record) = &state.last_winner {
        return (
            format!("#{}  {}", record.sequence_number, record.participant.name),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        );
    }
    if state.roster.is_empty() {
        return (
            "Add participants first".to_string(),
            Style::default().fg(Color::DarkGray),
        );
    }
    if !state.allow_duplicates && state.remaining_count == 0 {
        return (
            "Everyone has won. R: reset".to_string(),
            Style::default().fg(Color::DarkGray),
        );
    }
    (
        "Press space to spin".to_string(),
        Style::default().fg(Color::White),
    )
}

fn render_winners(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!("Winners ({})", state.winners.len());

    if state.winners.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2);
    let total = state.winners.len();
    let offset = state.scroll_offset.get("winners").copied().unwrap_or(0);
    let offset = clamp_scroll(offset, total, visible_rows);

    let items: Vec<ListItem> = state
        .winners
        .iter()
        .skip(offset)
        .take(visible_rows.max(1))
        .enumerate()
        .map(|(row, record)| {
            let style = if row + offset == 0 {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(format_winner(record), style)))
        })
        .collect();

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

/// "#3 Ann"
pub fn format_winner(record: &WinnerRecord) -> String {
    format!("#{} {}", record.sequence_number, record.participant.name)
}
