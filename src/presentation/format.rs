//! Text formatting shared by the views.

use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const LONG_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

const ELLIPSIS: char = '…';

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// "3 hours ago" style label for `date` as seen at `now`.
pub fn relative_time(date: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - date).whole_seconds();
    if seconds < MINUTE {
        return "just now".to_string();
    }

    let (count, unit) = if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < WEEK {
        (seconds / DAY, "day")
    } else if seconds < MONTH {
        (seconds / WEEK, "week")
    } else if seconds < YEAR {
        (seconds / MONTH, "month")
    } else {
        (seconds / YEAR, "year")
    };

    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

/// `January 15, 2024`.
pub fn long_date(date: OffsetDateTime) -> String {
    date.format(LONG_DATE)
        .unwrap_or_else(|_| date.date().to_string())
}

/// Greedy word wrap. Words wider than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > width && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Wrap and keep at most `max_lines`, marking truncation with an ellipsis.
pub fn clamp_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = wrap(text, width);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        if last.chars().count() >= width.max(1) {
            last.pop();
        }
        last.push(ELLIPSIS);
    }
    lines
}

pub fn rule(width: usize) -> String {
    "─".repeat(width)
}

/// Lay two blocks of text side by side, padding the left column.
pub fn columns(left: &str, right: &str, left_width: usize, gap: usize) -> String {
    let left: Vec<&str> = left.lines().collect();
    let right: Vec<&str> = right.lines().collect();
    let height = left.len().max(right.len());

    let mut out = String::new();
    for row in 0..height {
        let l = left.get(row).copied().unwrap_or_default();
        let r = right.get(row).copied().unwrap_or_default();
        let pad = left_width.saturating_sub(l.chars().count()) + gap;
        out.push_str(l);
        if !r.is_empty() {
            out.extend(std::iter::repeat_n(' ', pad));
            out.push_str(r);
        }
        out.push('\n');
    }
    out
}
