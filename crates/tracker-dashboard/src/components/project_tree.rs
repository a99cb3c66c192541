// crates/tracker-dashboard/src/components/project_tree.rs

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::app::{App, Panel, TreeRow};
use crate::ui::{color, panel_border};

pub fn draw_project_tree(f: &mut Frame, area: Rect, app: &App) {
    let board = &app.board;
    let muted = Style::default().fg(app.theme.muted());

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .filter_map(|row| {
            let line = match row {
                TreeRow::Workstream(id) => {
                    let ws = board.workstream(id)?;
                    Line::from(vec![
                        Span::styled("■ ", Style::default().fg(color(ws.display_color()))),
                        Span::styled(ws.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    ])
                }
                TreeRow::Project(id) => {
                    let project = board.project(id)?;
                    let mut spans = vec![Span::raw("  "), Span::raw(project.title.as_str())];
                    if let Some(status) = &project.status {
                        spans.push(Span::styled(format!(" [{status}]"), muted));
                    }
                    Line::from(spans)
                }
                TreeRow::Task(id) => {
                    let task = board.task(id)?;
                    let (check, title_style) = if task.done {
                        ("[x] ", muted.add_modifier(Modifier::CROSSED_OUT))
                    } else {
                        ("[ ] ", Style::default())
                    };
                    let due = task
                        .due_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "no date".to_string());
                    let overdue = !task.done && task.due_date.is_some_and(|d| d < app.today);
                    Line::from(vec![
                        Span::raw("    "),
                        Span::styled(check, Style::default().fg(color(board.task_color(task)))),
                        Span::styled(task.title.as_str(), title_style),
                        Span::styled(
                            format!("  {due}"),
                            if overdue { Style::default().fg(Color::Red) } else { muted },
                        ),
                        Span::styled(
                            format!("  {}", task.assignee.as_deref().unwrap_or("-")),
                            muted,
                        ),
                    ])
                }
            };
            Some(ListItem::new(line))
        })
        .collect();

    let title = if app.rows.is_empty() && app.loaded {
        " Projects (empty, press w to add a workstream) "
    } else {
        " Projects "
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(panel_border(app, Panel::Projects)),
        )
        .highlight_style(Style::default().bg(app.theme.selection()));

    let mut state = ListState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
