// crates/tracker-dashboard/src/components/help.rs

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

const SHORTCUTS: &[(&str, &str, Color)] = &[
    ("↑/k ↓/j", "Select previous / next row", Color::White),
    ("K / J", "Move selected row up / down", Color::Cyan),
    ("g / G", "Move selected row to top / bottom", Color::Cyan),
    ("space/x", "Toggle task done", Color::Yellow),
    ("w", "New workstream", Color::Green),
    ("p", "New project in selected workstream", Color::Green),
    ("t", "New task in selected project", Color::Green),
    ("d", "Delete selected row", Color::Red),
    ("[ / ]", "Previous / next month", Color::Magenta),
    (".", "Back to this month", Color::Magenta),
    ("Tab", "Next panel", Color::Blue),
    ("Shift+Tab", "Previous panel", Color::Blue),
    ("r", "Reload from store", Color::Gray),
    ("?/F1", "Toggle help", Color::Gray),
    ("q", "Quit", Color::Red),
];

pub fn draw_help(f: &mut Frame, area: Rect) {
    f.render_widget(Clear, area);

    let help_items: Vec<ListItem> = SHORTCUTS
        .iter()
        .map(|(keys, action, color)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{keys:<10}"),
                    Style::default().fg(*color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" - "),
                Span::raw(*action),
            ]))
        })
        .collect();

    let help_list = List::new(help_items).block(
        Block::default()
            .title(" Help - Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(help_list, area);

    let footer = Paragraph::new("Press ? or ESC to close help")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);

    let footer_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(2),
        width: area.width,
        height: 1,
    };

    f.render_widget(footer, footer_area);
}
