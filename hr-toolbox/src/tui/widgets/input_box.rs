// Text entry overlay for adding names, import paths, and the naming theme.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::tui::InputMode;

const DIALOG_HEIGHT: u16 = 5;

/// Title and hint shown for each input mode.
pub fn prompt(mode: InputMode) -> (&'static str, &'static str) {
    match mode {
        InputMode::AddNames => (" Add names ", "Commas or Alt+Enter between names, paste works"),
        InputMode::ImportPath => (" Import file ", "Path to a .txt or .csv file"),
        InputMode::Theme => (" Naming theme ", "Theme for suggested group names"),
    }
}

/// Render the entry dialog with the current buffer and a block cursor.
pub fn render(frame: &mut Frame, area: Rect, mode: InputMode, buffer: &str) {
    let width = (area.width * 3 / 4).max(30);
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let (title, hint) = prompt(mode);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    // Line breaks show as separators; keep the tail of long input visible
    let inner_width = dialog_area.width.saturating_sub(4) as usize;
    let chars: Vec<char> = buffer.replace('\n', " / ").chars().collect();
    let visible: String = chars[chars.len().saturating_sub(inner_width)..].iter().collect();

    let lines = vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(visible, Style::default().fg(Color::White)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(Span::styled(
            format!(" {hint}. Enter: ok, Esc: cancel"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered(width: u16, mode: InputMode, buffer: &str) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 12)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), mode, buffer))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn shows_title_and_buffer() {
        let text = rendered(80, InputMode::ImportPath, "names.csv");
        assert!(text.contains("Import file"));
        assert!(text.contains("names.csv"));
    }

    #[test]
    fn line_breaks_render_as_separators() {
        let text = rendered(80, InputMode::AddNames, "Ann\nBob");
        assert!(text.contains("Ann / Bob"));
    }

    #[test]
    fn long_input_shows_tail() {
        let long = format!("{}END", "x".repeat(200));
        let text = rendered(60, InputMode::AddNames, &long);
        assert!(text.contains("END"));
    }
}
