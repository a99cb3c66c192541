// crates/tracker-dashboard/src/components/workstreams.rs

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::color;

pub fn draw_workstreams(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = if app.legend.is_empty() {
        vec![Line::from(Span::styled(
            "No workstreams yet",
            Style::default().fg(app.theme.muted()),
        ))]
    } else {
        app.legend
            .values()
            .map(|(name, rgb)| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(color(*rgb))),
                    Span::styled(name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", rgb.to_hex()),
                        Style::default().fg(app.theme.muted()),
                    ),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Workstreams ")
            .borders(Borders::ALL),
    );
    f.render_widget(paragraph, area);
}
