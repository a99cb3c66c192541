// crates/tracker-dashboard/src/components/calendar.rs

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use tracker_core::CalendarCell;

use crate::app::{App, Panel};
use crate::ui::{color, panel_border};

/// Month grid with one dot per open task due that day.
pub fn draw_calendar(f: &mut Frame, area: Rect, app: &App) {
    let grid = &app.grid;

    let header = Row::new(
        grid.week_start()
            .weekdays()
            .iter()
            .map(|wd| Cell::from(wd.to_string())),
    )
    .style(Style::default().fg(app.theme.muted()).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = grid
        .weeks()
        .map(|week| {
            let cells = week.iter().map(|cell| match cell {
                CalendarCell::Blank => Cell::from(""),
                CalendarCell::Day(day) => {
                    let number_style = if day.date == app.today {
                        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let mut dots: Vec<Span> = day
                        .markers
                        .iter()
                        .map(|m| Span::styled("●", Style::default().fg(color(m.color))))
                        .collect();
                    if day.hidden > 0 {
                        dots.push(Span::styled(
                            format!("+{}", day.hidden),
                            Style::default().fg(app.theme.muted()),
                        ));
                    }
                    Cell::from(Text::from(vec![
                        Line::from(Span::styled(day.date.format("%e").to_string(), number_style)),
                        Line::from(dots),
                    ]))
                }
            });
            Row::new(cells).height(2)
        })
        .collect();

    let widths = [Constraint::Ratio(1, 7); 7];

    let title = format!(" {}  [ prev  ] next  . today ", grid.cursor().title());
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(panel_border(app, Panel::Calendar)),
    );

    f.render_widget(table, area);
}
