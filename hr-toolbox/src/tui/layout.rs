// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel (active tab)                           |
// |                                                   |
// +--------------------------------------------------+
// | Notice Bar (1 row)                                |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: tab bar, roster and duplicate counts.
    pub status_bar: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Latest notice from the app.
    pub notice_bar: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // notice bar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        notice_bar: vertical[2],
        help_bar: vertical[3],
    }
}

/// Split the draw tab into the spin display (left) and winners log (right).
pub fn split_draw_panel(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (horizontal[0], horizontal[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("main_panel", layout.main_panel),
            ("notice_bar", layout.notice_bar),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in &rects {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn bars_are_single_rows_and_main_fills_rest() {
        let area = test_area();
        let layout = build_layout(area);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.notice_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.main_panel.height, area.height - 3);
        assert_eq!(layout.help_bar.y, area.height - 1);
    }

    #[test]
    fn draw_panel_split_covers_width() {
        let area = Rect::new(0, 1, 100, 30);
        let (display, log) = split_draw_panel(area);
        assert_eq!(display.width + log.width, area.width);
        assert!(display.width > log.width);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let layout = build_layout(Rect::new(0, 0, 10, 4));
        assert!(layout.main_panel.height <= 4);
    }
}
