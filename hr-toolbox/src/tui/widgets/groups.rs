// Grouping widget: controls summary and the current groups.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::clamp_scroll;
use crate::session::grouping::Group;
use crate::tui::ViewState;

/// Render the grouping tab into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_controls(frame, sections[0], state);
    render_groups(frame, sections[1], state);
}

fn render_controls(frame: &mut Frame, area: Rect, state: &ViewState) {
    let naming = if state.naming_in_flight {
        Span::styled("  naming groups...", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::raw(" Group size: "),
        Span::styled(
            state.group_size.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  ({} groups)", expected_groups(state.roster.len(), state.group_size))),
        Span::raw("   Theme: "),
        Span::styled(state.theme.clone(), Style::default().fg(Color::Cyan)),
        naming,
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Grouping"));
    frame.render_widget(paragraph, area);
}

/// How many groups the current roster and size would produce.
pub fn expected_groups(roster_len: usize, group_size: usize) -> usize {
    if group_size == 0 {
        return 0;
    }
    roster_len.div_ceil(group_size)
}

fn render_groups(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!("Groups ({})", state.groups.len());

    if state.groups.is_empty() {
        let paragraph = Paragraph::new("  No groups yet. g: generate")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = group_lines(&state.groups);
    let visible_rows = (area.height as usize).saturating_sub(2);
    let offset = state.scroll_offset.get("groups").copied().unwrap_or(0);
    let offset = clamp_scroll(offset, lines.len(), visible_rows);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((offset as u16, 0));
    frame.render_widget(paragraph, area);
}

/// One header line per group followed by its members on one line.
pub fn group_lines(groups: &[Group]) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(groups.len() * 3);
    for group in groups {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {}", group.name),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({})", group.members.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        let members: Vec<&str> = group.members.iter().map(|m| m.name.as_str()).collect();
        lines.push(Line::raw(format!("   {}", members.join(", "))));
        lines.push(Line::raw(""));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::roster::Participant;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use uuid::Uuid;

    fn group(name: &str, members: &[&str]) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: name.into(),
            members: members.iter().map(|m| Participant::new(*m)).collect(),
        }
    }

    #[test]
    fn expected_groups_rounds_up() {
        assert_eq!(expected_groups(5, 2), 3);
        assert_eq!(expected_groups(6, 3), 2);
        assert_eq!(expected_groups(0, 3), 0);
        assert_eq!(expected_groups(4, 0), 0);
    }

    #[test]
    fn group_lines_list_members() {
        let lines = group_lines(&[group("Falcons", &["Ann", "Bob"]), group("Group 2", &["Cy"])]);
        assert_eq!(lines.len(), 6);
        let members: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(members, "   Ann, Bob");
    }

    #[test]
    fn render_shows_names_and_naming_state() {
        let mut state = ViewState::default();
        state.group_size = 2;
        state.theme = "Space".into();
        state.naming_in_flight = true;
        state.groups = vec![group("Rockets", &["Ann", "Bob"])];

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Rockets"));
        assert!(text.contains("Theme: Space"));
        assert!(text.contains("naming groups..."));
    }
}
