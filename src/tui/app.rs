use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{EntryRepo, HabitRepo};
use crate::models::{Habit, HabitStats, NewHabit, User};
use crate::tracker::{habit_detail, habit_stats, toggle_on_connection, HabitDetail, ToggleRequest};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{habits, header, overview, statusbar, streak};
use crate::utils::dates::{days_between, format_date};
use crate::utils::format::{fit_width, progress_bar};

/// Windows the stats view cycles through with `w`.
const STATS_WINDOWS: [u32; 3] = [7, 30, 90];

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    /// One habit's recent history with a day cursor.
    Detail,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    NewHabit,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub user: User,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    /// Shown in the status bar until the next key press.
    pub message: Option<String>,

    // Cached state (refreshed on load)
    pub today: NaiveDate,
    pub habits: Vec<Habit>,
    pub done_today: HashSet<i64>,
    /// Last seven days per habit, oldest first.
    pub weeks: HashMap<i64, Vec<bool>>,
    pub stats: HabitStats,
    pub stats_window: u32,
    pub detail: Option<HabitDetail>,
    /// Index into `detail.history`.
    pub day_cursor: usize,
}

impl App {
    pub fn new(config: AppConfig, user: User, today: NaiveDate) -> Self {
        let stats_window = config.tracking.stats_window_days;
        App {
            view: View::Dashboard,
            config,
            user,
            focus_idx: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            message: None,
            today,
            habits: Vec::new(),
            done_today: HashSet::new(),
            weeks: HashMap::new(),
            stats: HabitStats::default(),
            stats_window,
            detail: None,
            day_cursor: 0,
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.habits = HabitRepo::list_for_user(conn, self.user.id)?;

        let week_start = self.today - Duration::days(6);
        let entries = EntryRepo::range_for_user(conn, self.user.id, week_start, self.today)?;
        let completed: HashSet<(i64, NaiveDate)> = entries
            .iter()
            .filter(|e| e.completed)
            .map(|e| (e.habit_id, e.date))
            .collect();

        self.done_today = self
            .habits
            .iter()
            .filter(|h| completed.contains(&(h.id, self.today)))
            .map(|h| h.id)
            .collect();
        self.weeks = self
            .habits
            .iter()
            .map(|h| {
                let days = days_between(week_start, self.today)
                    .map(|d| completed.contains(&(h.id, d)))
                    .collect();
                (h.id, days)
            })
            .collect();

        self.stats = habit_stats(
            conn,
            self.user.id,
            Some(self.stats_window),
            self.today,
        )?;

        if self.view == View::Detail {
            self.load_detail(conn)?;
        }

        if self.focus_idx >= self.habits.len() {
            self.focus_idx = self.habits.len().saturating_sub(1);
        }
        Ok(())
    }

    fn load_detail(&mut self, conn: &Connection) -> Result<()> {
        self.detail = match self.focused_habit() {
            Some(habit) => Some(habit_detail(conn, self.user.id, habit.id, self.today)?),
            None => None,
        };
        let days = self.detail.as_ref().map_or(0, |d| d.history.len());
        self.day_cursor = self.day_cursor.min(days.saturating_sub(1));
        Ok(())
    }

    fn open_detail(&mut self, conn: &Connection) {
        if self.focused_habit().is_none() {
            return;
        }
        self.view = View::Detail;
        // start on today
        self.day_cursor = usize::MAX;
        if let Err(e) = self.load_detail(conn) {
            log::warn!("loading habit detail failed: {:#}", e);
            self.message = Some(format!("✗ {}", e));
            self.view = View::Dashboard;
        }
    }

    /// Reload when the calendar day rolls over.
    pub fn tick(&mut self, conn: &Connection, today: NaiveDate) {
        if today != self.today {
            self.today = today;
            self.reload(conn);
        }
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            log::warn!("reload failed: {:#}", e);
            self.message = Some(format!("✗ {}", e));
        }
    }

    pub fn focused_habit(&self) -> Option<&Habit> {
        self.habits.get(self.focus_idx)
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Some terminals also report release and repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::NewHabit => self.handle_new_habit_input(key, conn),
            InputMode::Normal => {
                self.message = None;
                match self.view {
                    View::Dashboard => self.handle_dashboard_key(key, conn),
                    View::Detail => self.handle_detail_key(key, conn),
                    View::Stats => self.handle_stats_key(key, conn),
                    View::Help => self.handle_help_key(key),
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('a') => {
                self.input_mode = InputMode::NewHabit;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.habits.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(habit_id) = self.focused_habit().map(|h| h.id) {
                    self.toggle_day(conn, habit_id, self.today);
                }
            }
            KeyCode::Enter => {
                self.open_detail(conn);
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent, conn: &Connection) {
        let days = self.detail.as_ref().map_or(0, |d| d.history.len());
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.view = View::Dashboard;
                self.detail = None;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.day_cursor = self.day_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.day_cursor + 1 < days {
                    self.day_cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let target = self
                    .detail
                    .as_ref()
                    .and_then(|d| d.history.get(self.day_cursor).map(|day| (d.habit.id, day.date)));
                if let Some((habit_id, date)) = target {
                    self.toggle_day(conn, habit_id, date);
                }
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => {
                self.view = View::Dashboard;
            }
            KeyCode::Char('w') => {
                self.stats_window = next_window(self.stats_window);
                self.reload(conn);
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.view = View::Dashboard;
        }
    }

    fn handle_new_habit_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                match HabitRepo::create(conn, self.user.id, &NewHabit::named(self.input_buffer.as_str())) {
                    Ok(habit) => {
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.reload(conn);
                        self.focus_idx = self
                            .habits
                            .iter()
                            .position(|h| h.id == habit.id)
                            .unwrap_or(0);
                        self.message = Some(format!("✓ Added {}", habit.name));
                    }
                    Err(e) => {
                        self.input_error = Some(e.to_string());
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn toggle_day(&mut self, conn: &Connection, habit_id: i64, date: NaiveDate) {
        let request = ToggleRequest {
            user_id: self.user.id,
            habit_id,
            date: Some(format_date(date)),
            completed: None,
        };

        match toggle_on_connection(conn, self.config.tracking.atomic_toggle, &request, self.today) {
            Ok(toggled) => {
                let day = if date == self.today {
                    "today".to_string()
                } else {
                    date.format("%b %d").to_string()
                };
                self.message = Some(if toggled.entry.completed {
                    format!(
                        "✓ {} done {} · streak {}",
                        toggled.habit.name, day, toggled.habit.current_streak
                    )
                } else {
                    format!("○ {} unmarked {}", toggled.habit.name, day)
                });
                let message = self.message.take();
                self.reload(conn);
                if self.message.is_none() {
                    self.message = message;
                }
            }
            Err(e) => {
                log::warn!("toggle failed: {}", e);
                self.message = Some(format!("✗ {}", e));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Detail => self.draw_detail(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::NewHabit {
            self.draw_new_habit_input(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &self.user.name,
            self.today,
            self.done_today.len(),
            self.habits.len(),
        );
        statusbar::render(frame, outer_chunks[2], self.message.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(outer_chunks[1]);

        habits::render(
            frame,
            columns[0],
            &self.habits,
            &self.done_today,
            self.focus_idx,
        );

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // streak
                Constraint::Min(0),    // overview
            ])
            .split(columns[1]);

        let focused = self.focused_habit();
        let week = focused
            .and_then(|h| self.weeks.get(&h.id))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        streak::render(frame, right_chunks[0], focused, week);
        overview::render(
            frame,
            right_chunks[1],
            &self.stats,
            self.stats_window,
        );
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let overall = &self.stats.overall_stats;
        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::ember().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(
                    "last {} days · {} habits · {}% average · {} perfect days",
                    self.stats_window,
                    overall.total_habits,
                    overall.avg_completion_rate,
                    self.stats.perfect_days()
                ),
                theme::dim(),
            ),
            Span::styled("   [w] window  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        // Most recent days first so today is always visible
        let day_lines: Vec<Line> = self
            .stats
            .completion_per_day
            .iter()
            .rev()
            .map(|day| {
                Line::from(vec![
                    Span::styled(format!("  {}  ", day.date.format("%a %d %b")), theme::dim()),
                    Span::styled(
                        progress_bar(day.completed, day.total, 12),
                        theme::for_percentage(day.percentage),
                    ),
                    Span::styled(format!("  {:>3}%", day.percentage), theme::dim()),
                ])
            })
            .collect();
        let days_block = Block::default()
            .title(Span::styled(" Daily completion ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false))
            .style(theme::surface());
        frame.render_widget(Paragraph::new(day_lines).block(days_block), columns[0]);

        let name_width = (columns[1].width as usize).saturating_sub(34).clamp(6, 30);
        let mut habit_lines = vec![Line::from("")];
        if self.stats.habit_breakdown.is_empty() {
            habit_lines.push(Line::from(Span::styled("  No habits yet", theme::dim())));
        }
        for row in &self.stats.habit_breakdown {
            habit_lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", fit_width(&row.name, name_width)), theme::bold()),
                Span::styled(
                    progress_bar(row.completion_rate, 100, 10),
                    theme::for_percentage(row.completion_rate),
                ),
                Span::styled(format!(" {:>3}%", row.completion_rate), theme::dim()),
                Span::styled(
                    format!("  {}d / {}d", row.current_streak, row.longest_streak),
                    theme::amber(),
                ),
            ]));
        }
        let habits_block = Block::default()
            .title(Span::styled(" By habit (rate · streak / best) ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(false))
            .style(theme::surface());
        frame.render_widget(Paragraph::new(habit_lines).block(habits_block), columns[1]);

        statusbar::render(frame, chunks[2], Some("[Esc] back to dashboard"));
    }

    fn draw_detail(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        statusbar::render(
            frame,
            chunks[1],
            Some(self.message.as_deref().unwrap_or("[← →] day  [space] toggle  [Esc] back")),
        );

        let Some(detail) = &self.detail else {
            return;
        };
        let habit = &detail.habit;

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(format!("  {}", habit.name), theme::bold()),
                Span::styled(format!("   {}", habit.importance.label()), theme::dim()),
            ]),
        ];
        if let Some(description) = habit.description.as_deref().filter(|d| !d.is_empty()) {
            text.push(Line::from(Span::styled(format!("  {}", description), theme::dim())));
        }
        text.push(Line::from(""));

        // three columns per day
        let mut weekdays = vec![Span::raw("  ")];
        let mut marks = vec![Span::raw("  ")];
        let mut numbers = vec![Span::raw("  ")];
        for (idx, day) in detail.history.iter().enumerate() {
            let selected = idx == self.day_cursor;
            let mark_style = if day.completed { theme::green() } else { theme::dim() };
            let mark_style = if selected {
                mark_style.add_modifier(Modifier::REVERSED)
            } else {
                mark_style
            };
            let label_style = if selected { theme::ember() } else { theme::dim() };
            let weekday = day.date.format("%a").to_string();
            weekdays.push(Span::styled(
                format!("{:<3}", weekday.chars().next().unwrap_or(' ')),
                label_style,
            ));
            marks.push(Span::styled(
                if day.completed { " ● " } else { " · " },
                mark_style,
            ));
            numbers.push(Span::styled(day.date.format("%d ").to_string(), label_style));
        }
        text.push(Line::from(weekdays));
        text.push(Line::from(marks));
        text.push(Line::from(numbers));
        text.push(Line::from(""));

        if let Some(day) = detail.history.get(self.day_cursor) {
            text.push(Line::from(vec![
                Span::styled("  Selected    ", theme::dim()),
                Span::styled(day.date.format("%A, %b %d").to_string(), theme::ember()),
                Span::styled(
                    if day.completed { "  done" } else { "  not done" },
                    if day.completed { theme::green() } else { theme::dim() },
                ),
            ]));
        }
        text.push(Line::from(vec![
            Span::styled("  Completion  ", theme::dim()),
            Span::styled(
                progress_bar(detail.completion_rate, 100, 10),
                theme::for_percentage(detail.completion_rate),
            ),
            Span::styled(
                format!(
                    "  {}%  ({}/{} days)",
                    detail.completion_rate, detail.days_completed, detail.days_tracked
                ),
                theme::dim(),
            ),
        ]));
        text.push(Line::from(vec![
            Span::styled("  Streak      ", theme::dim()),
            Span::styled(
                format!("{}d now · {}d best", habit.current_streak, habit.longest_streak),
                theme::amber(),
            ),
        ]));
        if let Some(days) = detail.days_since_created {
            text.push(Line::from(vec![
                Span::styled("  Tracking    ", theme::dim()),
                Span::styled(format!("{} days", days), theme::bold()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(
                format!(" Last {} days ", detail.history.len()),
                theme::ember(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true))
            .style(theme::surface());
        frame.render_widget(Paragraph::new(text).block(block), chunks[0]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered(frame.area(), 52, 12);
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[space]", "Toggle today for the habit"),
            ("[Enter]", "Habit history, [← →] + [space]"),
            ("[w]", "Stats window 7/30/90 days"),
            ("[a]", "Add a habit"),
            ("[↑ ↓] / [k j]", "Move selection"),
            ("[s]", "Stats view"),
            ("[?]", "Toggle help"),
            ("[q] / [Esc]", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::ember().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<15}", key), theme::ember()),
                Span::styled(action, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::ember())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_new_habit_input(&self, frame: &mut Frame) {
        let height = if self.input_error.is_some() { 7 } else { 5 };
        let popup_area = centered(frame.area(), 50, height);
        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Name: ", theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::ember().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()), // block cursor
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a name, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(" New Habit ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// The next stats window after `current`, wrapping back to the shortest.
fn next_window(current: u32) -> u32 {
    STATS_WINDOWS
        .iter()
        .copied()
        .find(|&w| w > current)
        .unwrap_or(STATS_WINDOWS[0])
}

/// A `width` x `height` rectangle centred in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, user: User) -> Result<()> {
    let tick_rate = config.ui.tick_rate_ms;
    let mut app = App::new(config, user, Local::now().date_naive());
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => {
                    app.tick(&conn, Local::now().date_naive());
                }
            }
        }
    })();

    ratatui::restore();
    result
}
