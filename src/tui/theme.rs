use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(20, 18, 22);
pub const SURFACE: Color = Color::Rgb(30, 27, 34);
pub const BORDER: Color = Color::Rgb(62, 56, 70);
pub const TEXT: Color = Color::Rgb(226, 220, 232);
pub const TEXT_DIM: Color = Color::Rgb(128, 120, 138);
pub const EMBER: Color = Color::Rgb(232, 128, 64);
pub const GREEN: Color = Color::Rgb(98, 168, 110);
pub const AMBER: Color = Color::Rgb(214, 170, 72);
pub const RED: Color = Color::Rgb(196, 84, 84);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn ember() -> Style {
    Style::default().fg(EMBER)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        ember()
    } else {
        Style::default().fg(BORDER)
    }
}

/// Colour for a 0-100 completion percentage.
pub fn for_percentage(pct: u32) -> Style {
    match pct {
        80.. => green(),
        40..=79 => amber(),
        1..=39 => red(),
        _ => dim(),
    }
}
