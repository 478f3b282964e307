// Yes/no confirmation overlay.
//
// Renders a centered modal dialog on top of the main layout while
// `ViewState::confirm` is set: quitting, and clearing the roster.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::tui::ConfirmKind;

const DIALOG_WIDTH: u16 = 36;
const DIALOG_HEIGHT: u16 = 5;

/// Title and question for each dialog.
pub fn dialog_text(kind: ConfirmKind) -> (&'static str, &'static str) {
    match kind {
        ConfirmKind::Quit => (" Quit? ", "Really quit?"),
        ConfirmKind::ClearRoster => (" Clear roster? ", "Clear all participants?"),
    }
}

/// Render the confirmation overlay centered on the screen.
pub fn render(frame: &mut Frame, area: Rect, kind: ConfirmKind) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);

    // Clear the area behind the dialog so it renders cleanly on top
    frame.render_widget(Clear, dialog_area);

    let (title, question) = dialog_text(kind);
    let accent = match kind {
        ConfirmKind::Quit => Color::Yellow,
        ConfirmKind::ClearRoster => Color::Red,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(
            title,
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));

    let text = Line::from(vec![
        Span::raw(format!("  {question} (")),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
