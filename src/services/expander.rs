use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::debug;

use crate::models::alarm::{Alarm, CustomSchedule, RECURRENCE_DAILY, RECURRENCE_ONCE};
use crate::utils::time::{parse_hhmm, weekday_letter_ordinal, weekday_letter_to_weekday};

/// Configuration for recurrence expansion.
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Number of weeks of concrete dated instances pre-generated for
    /// custom recurrences. The window only rolls forward on reseed, which
    /// is why every store mutation re-runs the full expansion.
    pub horizon_weeks: u32,
    /// Reference instant (local wall clock). Defaults to now.
    pub now: Option<NaiveDateTime>,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            horizon_weeks: 4,
            now: None,
        }
    }
}

impl ExpandConfig {
    pub fn reference_now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// A concrete point at which a notification should trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireInstant {
    /// Explicit dated one-shot. `weekday` is set for instants that came
    /// from a weekly custom form.
    OneShot {
        at: NaiveDateTime,
        weekday: Option<Weekday>,
    },
    /// Native platform daily repeat; the core does not enumerate days.
    DailyRepeat { hour: u32, minute: u32 },
}

/// Expand a validated alarm into its concrete fire instants. Unusable
/// times (unparseable, unknown weekday letters) are skipped rather than
/// raised: an alarm with nothing usable simply yields no instants, and the
/// scheduler treats that as a no-op.
pub fn expand(alarm: &Alarm, now: NaiveDateTime, horizon_weeks: u32) -> Vec<FireInstant> {
    let instants = match alarm.recurrence_kind.as_str() {
        RECURRENCE_ONCE => expand_once(alarm, now),
        RECURRENCE_DAILY => expand_daily(alarm),
        _ => expand_custom(alarm, now, horizon_weeks),
    };

    debug!(
        target: "app::alarms",
        alarm_id = %alarm.id,
        kind = %alarm.recurrence_kind,
        count = instants.len(),
        "expanded alarm"
    );

    instants
}

fn expand_once(alarm: &Alarm, now: NaiveDateTime) -> Vec<FireInstant> {
    let Some(time) = alarm.time.as_deref().and_then(parse_hhmm) else {
        return Vec::new();
    };

    match alarm
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    {
        // An explicit date is honored even when it is already in the past;
        // the platform decides what to do with an elapsed trigger.
        Some(date) => vec![FireInstant::OneShot {
            at: date.and_time(time),
            weekday: None,
        }],
        // Ad-hoc one-shot without a date rolls to the next occurrence of
        // that clock time.
        None => vec![FireInstant::OneShot {
            at: next_clock_occurrence(now, time),
            weekday: None,
        }],
    }
}

fn expand_daily(alarm: &Alarm) -> Vec<FireInstant> {
    match alarm.time.as_deref().and_then(parse_hhmm) {
        Some(time) => vec![FireInstant::DailyRepeat {
            hour: time.hour(),
            minute: time.minute(),
        }],
        None => Vec::new(),
    }
}

fn expand_custom(alarm: &Alarm, now: NaiveDateTime, horizon_weeks: u32) -> Vec<FireInstant> {
    let mut instants = Vec::new();

    match alarm.custom_schedule() {
        Some(CustomSchedule::PerWeekday(map)) => {
            for letter in sorted_by_ordinal(map.keys().map(String::as_str)) {
                if let Some(times) = map.get(letter) {
                    push_weekly_instants(&mut instants, letter, times, now, horizon_weeks);
                }
            }
        }
        Some(CustomSchedule::Shared { weekdays, times }) => {
            for letter in sorted_by_ordinal(weekdays.iter().map(String::as_str)) {
                push_weekly_instants(&mut instants, letter, times, now, horizon_weeks);
            }
        }
        Some(CustomSchedule::Fallback(time)) => {
            if let Some(time) = parse_hhmm(time) {
                instants.push(FireInstant::OneShot {
                    at: next_clock_occurrence(now, time),
                    weekday: None,
                });
            }
        }
        None => {}
    }

    instants
}

/// Weekday letters in canonical Sunday-first ordinal order, so expansion
/// output is stable regardless of how the caller ordered the set. Unknown
/// letters sort last and are skipped during expansion.
fn sorted_by_ordinal<'a>(letters: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut sorted: Vec<&str> = letters.collect();
    sorted.sort_by_key(|letter| weekday_letter_ordinal(letter).unwrap_or(u32::MAX));
    sorted
}

fn push_weekly_instants(
    instants: &mut Vec<FireInstant>,
    letter: &str,
    times: &[String],
    now: NaiveDateTime,
    horizon_weeks: u32,
) {
    let Ok(weekday) = weekday_letter_to_weekday(letter) else {
        return;
    };

    for time in times {
        let Some(time) = parse_hhmm(time) else {
            continue;
        };
        let first = next_weekday_occurrence(now, weekday, time);
        for week in 0..horizon_weeks {
            instants.push(FireInstant::OneShot {
                at: first + Duration::weeks(week as i64),
                weekday: Some(weekday),
            });
        }
    }
}

/// Next occurrence of `weekday` at `time`, strictly after `now`. A
/// candidate equal to `now` counts as already elapsed and advances a full
/// week, so a weekly form never fires at the very instant it is scheduled.
fn next_weekday_occurrence(now: NaiveDateTime, weekday: Weekday, time: NaiveTime) -> NaiveDateTime {
    let days_ahead = (weekday.num_days_from_sunday() as i64
        - now.weekday().num_days_from_sunday() as i64)
        .rem_euclid(7);
    let candidate = (now.date() + Duration::days(days_ahead)).and_time(time);
    if candidate <= now {
        candidate + Duration::weeks(1)
    } else {
        candidate
    }
}

/// Next occurrence of a bare clock time: today if still ahead, else
/// tomorrow.
fn next_clock_occurrence(now: NaiveDateTime, time: NaiveTime) -> NaiveDateTime {
    let candidate = now.date().and_time(time);
    if candidate <= now {
        candidate + Duration::days(1)
    } else {
        candidate
    }
}
