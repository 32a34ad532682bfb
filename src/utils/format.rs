use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// "1 day" / "3 days"
pub fn format_days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// Pad or truncate `s` to exactly `width` terminal columns.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        let pad = width - s.width();
        return format!("{}{}", s, " ".repeat(pad));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// One glyph per day, oldest first: `●` done, `·` not.
pub fn history_strip(days: &[bool]) -> String {
    days.iter().map(|&done| if done { '●' } else { '·' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralises_days() {
        assert_eq!(format_days(0), "0 days");
        assert_eq!(format_days(1), "1 day");
        assert_eq!(format_days(12), "12 days");
    }

    #[test]
    fn fits_to_column_width() {
        assert_eq!(fit_width("Read", 6), "Read  ");
        assert_eq!(fit_width("Meditation", 6), "Medit…");
        assert_eq!(fit_width("Meditation", 6).width(), 6);
        // Wide glyphs count as two columns.
        assert_eq!(fit_width("読書する", 5).width(), 5);
    }

    #[test]
    fn history_strip_marks_each_day() {
        assert_eq!(history_strip(&[]), "");
        assert_eq!(history_strip(&[true, false, false, true]), "●··●");
    }

    #[test]
    fn progress_bar_scales() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(2, 4, 4), "██░░");
        assert_eq!(progress_bar(9, 4, 4), "████");
    }
}
