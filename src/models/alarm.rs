use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::compare_time_asc;

pub const CATEGORY_SUBJECT: &str = "subject";
pub const CATEGORY_TASK: &str = "task";
pub const CATEGORIES: [&str; 2] = [CATEGORY_SUBJECT, CATEGORY_TASK];

pub const RECURRENCE_ONCE: &str = "once";
pub const RECURRENCE_DAILY: &str = "daily";
pub const RECURRENCE_CUSTOM: &str = "custom";
pub const RECURRENCE_KINDS: [&str; 3] = [RECURRENCE_ONCE, RECURRENCE_DAILY, RECURRENCE_CUSTOM];

/// The scheduling unit. The three recurrence shapes (per-weekday map,
/// shared weekday list + times, single time/date) are overlapping optional
/// fields; [`Alarm::custom_schedule`] resolves which one is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    pub title: String,
    pub category: String,
    pub linked_id: Option<String>,
    pub recurrence_kind: String,
    /// ISO calendar date, only meaningful for `once`.
    pub date: Option<String>,
    /// "HH:mm", required for `once`/`daily`, fallback for `custom`.
    pub time: Option<String>,
    /// Shared time set for the `custom` weekdays form.
    pub times: Option<Vec<String>>,
    /// Weekday letters for the `custom` shared form.
    pub weekdays: Option<Vec<String>>,
    /// Independent per-day time lists; takes precedence over the shared
    /// form at expansion time.
    pub per_weekday_times: Option<BTreeMap<String, Vec<String>>>,
    pub tone: String,
    pub vibration_enabled: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new alarm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmCreateInput {
    pub title: String,
    pub category: String,
    pub linked_id: Option<String>,
    pub recurrence_kind: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub times: Option<Vec<String>>,
    pub weekdays: Option<Vec<String>>,
    pub per_weekday_times: Option<BTreeMap<String, Vec<String>>>,
    pub tone: String,
    pub vibration_enabled: bool,
    pub active: bool,
}

/// Partial patch merged into an existing alarm. Outer `Option` means "field
/// untouched", inner `Option` means "set or clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub linked_id: Option<Option<String>>,
    pub recurrence_kind: Option<String>,
    pub date: Option<Option<String>>,
    pub time: Option<Option<String>>,
    pub times: Option<Option<Vec<String>>>,
    pub weekdays: Option<Option<Vec<String>>>,
    pub per_weekday_times: Option<Option<BTreeMap<String, Vec<String>>>>,
    pub tone: Option<String>,
    pub vibration_enabled: Option<bool>,
    pub active: Option<bool>,
}

/// The recurrence shape that is authoritative for a `custom` alarm,
/// resolved by fixed precedence: per-weekday map > shared weekdays + times
/// > bare time fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomSchedule<'a> {
    PerWeekday(&'a BTreeMap<String, Vec<String>>),
    Shared {
        weekdays: &'a [String],
        times: &'a [String],
    },
    Fallback(&'a str),
}

impl Alarm {
    /// Create a new alarm from user input, assigning id and timestamp.
    pub fn new(input: AlarmCreateInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            category: input.category,
            linked_id: input.linked_id,
            recurrence_kind: input.recurrence_kind,
            date: input.date,
            time: input.time,
            times: input.times,
            weekdays: input.weekdays,
            per_weekday_times: input.per_weekday_times,
            tone: input.tone,
            vibration_enabled: input.vibration_enabled,
            active: input.active,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial patch in place. `id` and `created_at` are immutable.
    pub fn apply(&mut self, update: AlarmUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(linked_id) = update.linked_id {
            self.linked_id = linked_id;
        }
        if let Some(recurrence_kind) = update.recurrence_kind {
            self.recurrence_kind = recurrence_kind;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(times) = update.times {
            self.times = times;
        }
        if let Some(weekdays) = update.weekdays {
            self.weekdays = weekdays;
        }
        if let Some(per_weekday_times) = update.per_weekday_times {
            self.per_weekday_times = per_weekday_times;
        }
        if let Some(tone) = update.tone {
            self.tone = tone;
        }
        if let Some(vibration_enabled) = update.vibration_enabled {
            self.vibration_enabled = vibration_enabled;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
    }

    /// Clone of this alarm with the patch applied, so the merged record can
    /// be validated before anything is committed.
    pub fn merged(&self, update: AlarmUpdate) -> Self {
        let mut merged = self.clone();
        merged.apply(update);
        merged
    }

    /// Resolve the authoritative `custom` recurrence shape, or `None` when
    /// the alarm carries none of the three forms.
    pub fn custom_schedule(&self) -> Option<CustomSchedule<'_>> {
        if let Some(map) = self.per_weekday_times.as_ref() {
            if !map.is_empty() {
                return Some(CustomSchedule::PerWeekday(map));
            }
        }

        let weekdays = self.weekdays.as_deref().unwrap_or_default();
        let times = self.times.as_deref().unwrap_or_default();
        if !weekdays.is_empty() && !times.is_empty() {
            return Some(CustomSchedule::Shared { weekdays, times });
        }

        self.time.as_deref().map(CustomSchedule::Fallback)
    }

    /// Earliest "HH:mm" this alarm can fire on any day, used for list
    /// ordering. Per-weekday map wins, then `time`, then `times[0]`.
    pub fn earliest_time_of_day(&self) -> String {
        if let Some(map) = self.per_weekday_times.as_ref() {
            let earliest = map
                .values()
                .flatten()
                .min_by(|a, b| compare_time_asc(a, b));
            if let Some(earliest) = earliest {
                return earliest.clone();
            }
        }

        if let Some(time) = self.time.as_ref() {
            return time.clone();
        }

        self.times
            .as_ref()
            .and_then(|times| times.first())
            .cloned()
            .unwrap_or_else(|| "00:00".to_string())
    }
}
