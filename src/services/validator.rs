use crate::error::{AppError, AppResult, ValidationCode};
use crate::models::alarm::{Alarm, CATEGORIES, RECURRENCE_CUSTOM, RECURRENCE_KINDS, RECURRENCE_ONCE, RECURRENCE_DAILY};
use crate::utils::time::is_weekday_letter;

/// Structural validation of an alarm record. Pure; raised before any state
/// mutation. Updates must run this against the merged record, never the
/// patch alone.
pub fn validate(alarm: &Alarm) -> AppResult<()> {
    if alarm.title.trim().is_empty() {
        return Err(AppError::validation(
            ValidationCode::MissingTitle,
            "title is required",
        ));
    }

    if !CATEGORIES.contains(&alarm.category.as_str()) {
        return Err(AppError::validation(
            ValidationCode::InvalidCategory,
            format!("category must be one of: subject, task (got {:?})", alarm.category),
        ));
    }

    if !RECURRENCE_KINDS.contains(&alarm.recurrence_kind.as_str()) {
        return Err(AppError::validation(
            ValidationCode::InvalidRecurrence,
            format!(
                "recurrence must be one of: once, daily, custom (got {:?})",
                alarm.recurrence_kind
            ),
        ));
    }

    match alarm.recurrence_kind.as_str() {
        RECURRENCE_ONCE => {
            if alarm.date.as_deref().map_or(true, str::is_empty) {
                return Err(AppError::validation(
                    ValidationCode::MissingDate,
                    "date is required for a one-time alarm",
                ));
            }
            if alarm.time.as_deref().map_or(true, str::is_empty) {
                return Err(AppError::validation(
                    ValidationCode::MissingTime,
                    "time is required for a one-time alarm",
                ));
            }
        }
        RECURRENCE_DAILY => {
            if alarm.time.as_deref().map_or(true, str::is_empty) {
                return Err(AppError::validation(
                    ValidationCode::MissingTime,
                    "time is required for a daily alarm",
                ));
            }
        }
        RECURRENCE_CUSTOM => validate_custom(alarm)?,
        _ => unreachable!("recurrence kind checked above"),
    }

    Ok(())
}

fn validate_custom(alarm: &Alarm) -> AppResult<()> {
    let weekdays = alarm.weekdays.as_deref().unwrap_or_default();
    let times = alarm.times.as_deref().unwrap_or_default();
    let has_shared_form = !weekdays.is_empty() && !times.is_empty();

    let map = alarm.per_weekday_times.as_ref();
    let has_map_form = map.is_some_and(|map| !map.is_empty());

    if !has_shared_form && !has_map_form {
        return Err(AppError::validation(
            ValidationCode::MissingCustomSchedule,
            "a custom alarm needs weekdays and times, or a per-weekday schedule",
        ));
    }

    if has_shared_form {
        for letter in weekdays {
            if !is_weekday_letter(letter) {
                return Err(AppError::validation(
                    ValidationCode::InvalidWeekday,
                    format!("unknown weekday letter: {letter:?}"),
                ));
            }
        }
    }

    if has_map_form {
        for (letter, day_times) in map.into_iter().flatten() {
            if !is_weekday_letter(letter) {
                return Err(AppError::validation(
                    ValidationCode::InvalidWeekday,
                    format!("unknown weekday letter: {letter:?}"),
                ));
            }
            if day_times.is_empty() {
                return Err(AppError::validation(
                    ValidationCode::EmptyTimesForWeekday,
                    format!("weekday {letter} has no times assigned"),
                ));
            }
        }
    }

    Ok(())
}
