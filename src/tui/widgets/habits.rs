use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::Habit;
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    habits: &[Habit],
    done_today: &HashSet<i64>,
    focus_idx: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::ember()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet — press [a] to add one",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // name column shrinks with the panel
    let name_width = (area.width as usize).saturating_sub(26).clamp(8, 40);

    let items: Vec<ListItem> = habits
        .iter()
        .enumerate()
        .map(|(i, habit)| {
            let is_focused = i == focus_idx;
            let done = done_today.contains(&habit.id);

            let (icon, icon_style) = if done {
                ("●", theme::green())
            } else {
                ("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::ember().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let importance_style = match habit.importance.label() {
                "High" => theme::red(),
                "Medium" => theme::amber(),
                _ => theme::green(),
            };

            let line = Line::from(vec![
                Span::styled(if is_focused { " ▸ " } else { "   " }, theme::ember()),
                Span::styled(icon, icon_style),
                Span::styled(format!("  {}", fit_width(&habit.name, name_width)), name_style),
                Span::styled(format!(" {:<7}", habit.importance.label()), importance_style),
                Span::styled(format!("{:>4}d", habit.current_streak), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(focus_idx));

    let list = List::new(items).block(block);
    frame.render_stateful_widget(list, area, &mut state);
}
