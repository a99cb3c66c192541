// crates/tracker-dashboard/src/components/entry_form.rs

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, FormKind};

pub fn draw_entry_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    f.render_widget(Clear, area);

    // Name the parent so the user knows where the row will land.
    let parent = match &form.kind {
        FormKind::Workstream => String::new(),
        FormKind::Project(ws) => app
            .board
            .workstream(ws)
            .map(|w| format!(" in {}", w.name))
            .unwrap_or_default(),
        FormKind::Task(project) => app
            .board
            .project(project)
            .map(|p| format!(" in {}", p.title))
            .unwrap_or_default(),
    };

    let block = Block::default()
        .title(format!(" {}{} ", form.kind.title(), parent))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.focus()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let labels = form.kind.field_labels();
    let mut constraints: Vec<Constraint> = labels.iter().map(|_| Constraint::Length(2)).collect();
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let values = app.form_values();
    for (i, label) in labels.iter().enumerate() {
        let active = i == form.field;
        let value = values.get(i).copied().unwrap_or("");
        let mut spans = vec![
            Span::styled(
                format!("{label}: "),
                if active {
                    Style::default().fg(app.theme.focus()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(app.theme.muted())
                },
            ),
            Span::raw(value),
        ];
        if active {
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
        f.render_widget(
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM)),
            chunks[i],
        );
    }

    let footer = Paragraph::new("[Tab] Next field | [Enter] Save | [Esc] Close (keeps draft)")
        .style(Style::default().fg(app.theme.muted()))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[labels.len() + 1]);
}
