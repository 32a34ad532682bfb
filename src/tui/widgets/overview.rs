use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::HabitStats;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, stats: &HabitStats, window_days: u32) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Last {} days ", window_days),
            theme::ember(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let overall = &stats.overall_stats;
    let rate = overall.avg_completion_rate;

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Completion  ", theme::dim()),
            Span::styled(progress_bar(rate, 100, 10), theme::for_percentage(rate)),
            Span::styled(
                format!("  {}%", rate),
                theme::for_percentage(rate).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Habits      ", theme::dim()),
            Span::styled(overall.total_habits.to_string(), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Perfect     ", theme::dim()),
            Span::styled(format!("{} days", stats.perfect_days()), theme::green()),
        ]),
        Line::from(vec![
            Span::styled("  Streaks     ", theme::dim()),
            Span::styled(
                format!(
                    "{} now · {} best",
                    overall.current_streak_sum, overall.longest_streak_sum
                ),
                theme::amber(),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
