use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::Habit;
use crate::tui::theme;
use crate::utils::format::{fit_width, format_days, progress_bar};

/// Streak panel for the focused habit. `week` holds the last seven days,
/// oldest first.
pub fn render(frame: &mut Frame, area: Rect, habit: Option<&Habit>, week: &[bool]) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::ember()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let Some(habit) = habit else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Nothing selected", theme::dim())),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for done in week {
        let (dot, style) = if *done {
            ("●", theme::green().add_modifier(Modifier::BOLD))
        } else {
            ("○", theme::dim())
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled(" ", theme::dim()));
    }
    let week_done = week.iter().filter(|d| **d).count();
    dot_spans.push(Span::styled(format!("  {}/7", week_done), theme::dim()));

    // 12 wide, full at 30 days
    let bar = progress_bar(habit.current_streak.min(30), 30, 12);
    let name_width = (area.width as usize).saturating_sub(4);

    let text = vec![
        Line::from(Span::styled(
            format!("  {}", fit_width(&habit.name, name_width)),
            theme::bold(),
        )),
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(bar, theme::green()),
            Span::styled(
                format!("  {}", format_days(habit.current_streak)),
                theme::green().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("  Best: {}", format_days(habit.longest_streak)),
            theme::dim(),
        )),
        Line::from(dot_spans),
    ];

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
