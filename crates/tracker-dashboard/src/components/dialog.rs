// crates/tracker-dashboard/src/components/dialog.rs

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Yes/no prompt shown before any delete is sent.
pub fn draw_confirm(f: &mut Frame, area: Rect, app: &App) {
    let Some(pending) = &app.pending_delete else {
        return;
    };

    f.render_widget(Clear, area);

    let text = vec![
        Line::from(pending.prompt.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Delete   "),
            Span::styled("[n/Esc]", Style::default().fg(app.theme.muted())),
            Span::raw(" Keep"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Confirm delete ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(paragraph, area);
}

pub fn draw_alert(f: &mut Frame, area: Rect, app: &App) {
    let Some(alert) = &app.alert else {
        return;
    };

    f.render_widget(Clear, area);

    let text = vec![
        Line::from(alert.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter/Esc] Dismiss",
            Style::default().fg(app.theme.muted()),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!(" {} ", alert.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(paragraph, area);
}
