use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, or `message` in their place when there is one to show.
pub fn render(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let paragraph = Paragraph::new(Line::from(Span::styled(message, theme::amber())))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = [
        ("[space]", " toggle  "),
        ("[⏎]", " history  "),
        ("[a]", " add  "),
        ("[↑↓]", " move  "),
        ("[s]", " stats  "),
        ("[?]", " help  "),
        ("[q]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::ember()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
