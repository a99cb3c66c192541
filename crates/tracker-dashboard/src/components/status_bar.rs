// crates/tracker-dashboard/src/components/status_bar.rs

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};

pub fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (msg, style) = match app.input_mode {
        InputMode::Normal => {
            let key = |k: &'static str, color: Color| {
                Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
            };
            let mut spans = Vec::new();
            if app.shows_admin_controls() {
                spans.extend([
                    key("[w/p/t]", Color::Green),
                    Span::raw("Add "),
                    key("[d]", Color::Red),
                    Span::raw("elete "),
                    key("[K/J]", Color::Cyan),
                    Span::raw("Move "),
                ]);
            }
            spans.extend([
                key("[space]", Color::Yellow),
                Span::raw("Done "),
                key("[q]", Color::Gray),
                Span::raw("uit  "),
            ]);
            if let Some(message) = &app.status_message {
                spans.push(Span::styled(message.as_str(), Style::default().fg(app.theme.focus())));
            } else if let Some(at) = app.last_sync {
                spans.push(Span::styled(
                    format!("Synced {}", at.format("%H:%M:%S")),
                    Style::default().fg(app.theme.muted()),
                ));
            }
            (Line::from(spans), Style::default())
        }
        InputMode::Editing => {
            let input = vec![
                Span::raw("Editing "),
                Span::styled(
                    app.form.as_ref().map(|form| form.kind.title()).unwrap_or(""),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" [Tab] Next field [Enter] Save [Esc] Close"),
            ];
            (Line::from(input), Style::default().fg(Color::Yellow))
        }
    };

    let status_block = Block::default()
        .borders(Borders::ALL)
        .border_style(style);

    let paragraph = Paragraph::new(msg)
        .block(status_block)
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}
