use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, user_name: &str, today: NaiveDate, done: usize, total: usize) {
    let date_str = today.format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  ▲ habitforge  ", theme::ember().add_modifier(Modifier::BOLD)),
        Span::styled(user_name, theme::dim()),
    ]);

    let progress_style = if total > 0 && done == total {
        theme::green()
    } else {
        theme::amber()
    };
    let date_line = Line::from(vec![
        Span::styled(&date_str, theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(format!("{}/{} done today", done, total), progress_style),
    ]);

    let text = vec![title_line, Line::from(""), date_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::ember().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
