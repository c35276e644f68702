use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, Paragraph},
};

use crate::{app::StatusLine, form::FormState};

use super::{footer::render_footer, lines::form_lines};

pub struct ReviewContext<'a> {
    pub form: &'a FormState,
    pub status: &'a StatusLine,
    pub scroll: u16,
}

pub fn draw(frame: &mut Frame<'_>, ctx: ReviewContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(frame.area());

    let body_area = chunks[0];
    let lines = form_lines(ctx.form, body_area.width.saturating_sub(2));
    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(ctx.form.chrome.title.as_str()),
        )
        .scroll((ctx.scroll, 0));
    frame.render_widget(body, body_area);
    render_footer(frame, chunks[1], &ctx);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::domain::PageMode;

    #[test]
    fn draws_title_and_status() {
        let form = FormState::new(PageMode::Edit);
        let mut status = StatusLine::new();
        status.loaded("core");
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| {
                draw(
                    frame,
                    ReviewContext {
                        form: &form,
                        status: &status,
                        scroll: 0,
                    },
                )
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Edit build configuration"));
        assert!(screen.contains("Loaded configuration 'core'"));
    }
}
