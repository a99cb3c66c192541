// crates/tracker-dashboard/src/components/digest.rs

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::{App, Panel};
use crate::ui::{color, panel_border};

pub fn draw_digest(f: &mut Frame, area: Rect, app: &App) {
    let digest = &app.digest;
    let window = digest.window();

    let header = Row::new(vec!["Due", "Task", "Project", "Assignee"])
        .style(Style::default().fg(app.theme.muted()).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = digest
        .rows()
        .iter()
        .map(|row| {
            let due_style = if row.overdue {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.label.clone()).style(due_style),
                Cell::from(row.title.clone()).style(Style::default().fg(color(row.color))),
                Cell::from(row.project_title.clone()),
                Cell::from(row.assignee.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(17),  // Due
        Constraint::Min(12),     // Task
        Constraint::Min(10),     // Project
        Constraint::Length(10),  // Assignee
    ];

    let title = if digest.is_empty() {
        format!(" This week {} ~ {}: nothing due ", window.start, window.end)
    } else {
        format!(
            " This week {} ~ {} ({} overdue) ",
            window.start,
            window.end,
            digest.overdue_count()
        )
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(panel_border(app, Panel::Digest)),
    );

    f.render_widget(table, area);
}
