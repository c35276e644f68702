use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::view::ReviewContext;

pub const REVIEW_ACTIONS: &str = "Up/Down scroll • PgUp/PgDn page • Enter/Esc/q close";

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &ReviewContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(area);

    let actions = Paragraph::new(format!("Actions: {REVIEW_ACTIONS}"))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions, rows[0]);

    let mut status = ctx.status.message().to_string();
    if let Some(focus) = &ctx.form.focus {
        status.push_str(" • focus: ");
        status.push_str(&focus.element_name());
    }
    if !ctx.form.diff.is_empty() {
        status.push_str(&format!(
            " • changed since approval: {}",
            ctx.form.diff.changes().len() + ctx.form.diff.changed_machines().len()
        ));
    }

    let badge = if ctx.status.is_error() {
        Span::styled("[!]", Style::default().fg(Color::Red).bg(Color::Black))
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };

    let status_widget = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status),
        Span::raw(" "),
        badge,
    ]))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::NONE));
    frame.render_widget(status_widget, rows[1]);
}
