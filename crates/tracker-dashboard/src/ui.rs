// crates/tracker-dashboard/src/ui.rs

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tracker_core::Rgb;

use crate::app::{App, Panel};
use crate::components::{
    calendar::draw_calendar,
    dialog::{draw_alert, draw_confirm},
    digest::draw_digest,
    entry_form::draw_entry_form,
    help::draw_help,
    project_tree::draw_project_tree,
    status_bar::draw_status_bar,
    workstreams::draw_workstreams,
};

pub fn draw(f: &mut Frame, app: &App) {
    // Main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(3),   // Status bar
        ])
        .split(f.size());

    draw_header(f, chunks[0], app);
    draw_main_content(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    // Overlays, lowest first
    if app.form.is_some() {
        draw_entry_form(f, centered_rect(50, 40, f.size()), app);
    }
    if app.pending_delete.is_some() {
        draw_confirm(f, centered_rect(50, 20, f.size()), app);
    }
    if app.alert.is_some() {
        draw_alert(f, centered_rect(50, 20, f.size()), app);
    }
    if app.show_help {
        draw_help(f, centered_rect(60, 70, f.size()));
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(40),
            Constraint::Percentage(25),
        ])
        .split(area);

    // Left: who is signed in
    let role_color = if app.shows_admin_controls() {
        Color::Green
    } else {
        Color::Yellow
    };
    let left_text = vec![
        Span::styled(
            app.display_email(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(app.display_role(), Style::default().fg(role_color)),
    ];
    let left_paragraph = Paragraph::new(Line::from(left_text))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(left_paragraph, header_chunks[0]);

    // Center: board counts
    let open = app.board.tasks().iter().filter(|t| !t.done).count();
    let center_text = if app.loaded {
        format!(
            "Workstreams: {} | Projects: {} | Open tasks: {}/{}",
            app.board.workstreams().len(),
            app.board.projects().len(),
            open,
            app.board.tasks().len()
        )
    } else {
        "Loading...".to_string()
    };
    let center_paragraph = Paragraph::new(center_text)
        .style(Style::default().fg(app.theme.focus()))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(center_paragraph, header_chunks[1]);

    // Right: help hints
    let right_paragraph = Paragraph::new("[?]Help [Tab]Panel [r]Reload")
        .style(Style::default().fg(app.theme.muted()))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(right_paragraph, header_chunks[2]);
}

fn draw_main_content(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),  // Legend + tree
            Constraint::Percentage(55),  // Calendar + digest
        ])
        .split(area);

    let legend_height = (app.legend.len() as u16).max(1) + 2;
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(legend_height), Constraint::Min(5)])
        .split(chunks[0]);

    draw_workstreams(f, left_chunks[0], app);
    draw_project_tree(f, left_chunks[1], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_calendar(f, right_chunks[0], app);
    draw_digest(f, right_chunks[1], app);
}

/// Border style for a panel, highlighted when it has focus.
pub(crate) fn panel_border(app: &App, panel: Panel) -> Style {
    if app.current_panel == panel {
        Style::default().fg(app.theme.focus())
    } else {
        Style::default().fg(app.theme.text())
    }
}

pub(crate) fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
