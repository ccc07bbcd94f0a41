use std::cmp::Ordering;

use chrono::{NaiveTime, Weekday};

use crate::error::{AppError, AppResult, ValidationCode};

/// Fixed weekday alphabet, Monday-first display order. These single-letter
/// tokens are the only recurrence-day vocabulary accepted at the boundary;
/// ISO weekday integers are never exposed.
pub const WEEKDAY_LETTERS: [&str; 7] = ["L", "M", "X", "J", "V", "S", "D"];

pub fn is_weekday_letter(letter: &str) -> bool {
    WEEKDAY_LETTERS.contains(&letter)
}

/// Canonical letter -> ordinal mapping in the platform's weekly-trigger
/// numbering: Sunday = 1 ... Saturday = 7.
pub fn weekday_letter_ordinal(letter: &str) -> AppResult<u32> {
    match letter {
        "D" => Ok(1),
        "L" => Ok(2),
        "M" => Ok(3),
        "X" => Ok(4),
        "J" => Ok(5),
        "V" => Ok(6),
        "S" => Ok(7),
        _ => Err(AppError::validation(
            ValidationCode::InvalidWeekday,
            format!("unknown weekday letter: {letter:?}"),
        )),
    }
}

pub fn weekday_letter_to_weekday(letter: &str) -> AppResult<Weekday> {
    match letter {
        "D" => Ok(Weekday::Sun),
        "L" => Ok(Weekday::Mon),
        "M" => Ok(Weekday::Tue),
        "X" => Ok(Weekday::Wed),
        "J" => Ok(Weekday::Thu),
        "V" => Ok(Weekday::Fri),
        "S" => Ok(Weekday::Sat),
        _ => Err(AppError::validation(
            ValidationCode::InvalidWeekday,
            format!("unknown weekday letter: {letter:?}"),
        )),
    }
}

/// Parse a "HH:mm" string. Both halves must parse as integers and form a
/// time chrono accepts; anything else is `None`, which downstream code
/// treats as "no usable time" rather than an error.
pub fn parse_hhmm(text: &str) -> Option<NaiveTime> {
    let (hour, minute) = text.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Numeric comparison of the "HHmm" digit value, used both for intra-day
/// ordering and list-level sorting. Malformed strings sort last.
pub fn compare_time_asc(a: &str, b: &str) -> Ordering {
    time_sort_key(a).cmp(&time_sort_key(b))
}

fn time_sort_key(text: &str) -> i64 {
    text.replace(':', "").parse::<i64>().unwrap_or(i64::MAX)
}
