use chrono::{Duration, Local};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::repositories::alarm_repository::AlarmRepository;
use crate::error::{AppError, AppResult};
use crate::models::alarm::{
    Alarm, AlarmCreateInput, AlarmUpdate, CATEGORY_SUBJECT, CATEGORY_TASK, RECURRENCE_CUSTOM,
    RECURRENCE_DAILY, RECURRENCE_ONCE,
};
use crate::models::tone::{tone_exists, DEFAULT_TONE};
use crate::services::notification::{AlarmAction, NotificationScheduler};
use crate::services::validator::validate;
use crate::utils::time::compare_time_asc;

#[derive(Default)]
struct StoreState {
    alarms: Vec<Alarm>,
    hydrated: bool,
    last_tone: Option<String>,
}

/// In-memory ordered alarm collection plus the mutation orchestration:
/// every create/update/toggle/remove validates, persists, emits a status
/// notification and reseeds the full platform schedule. Mutations are
/// serialized through a single lock so overlapping UI events cannot
/// interleave on the list.
pub struct AlarmStore {
    repo: AlarmRepository,
    scheduler: NotificationScheduler,
    state: Mutex<StoreState>,
}

impl AlarmStore {
    pub fn new(repo: AlarmRepository, scheduler: NotificationScheduler) -> Self {
        Self {
            repo,
            scheduler,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Hydrate from persistence once and reseed the platform schedule.
    /// Repeated calls are a no-op. A successful load of zero records seeds
    /// a few example alarms so a fresh install has something schedulable.
    pub async fn bootstrap(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.hydrated {
            return Ok(());
        }

        let mut alarms = self.repo.load_alarms()?;
        if alarms.is_empty() {
            alarms = seed_alarms();
            self.repo.save_alarms(&alarms)?;
            info!(target: "app::alarms", count = alarms.len(), "seeded example alarms");
        }

        order_by_active_and_time(&mut alarms);
        state.alarms = alarms;
        state.last_tone = self.repo.load_last_tone()?;
        state.hydrated = true;

        info!(target: "app::alarms", count = state.alarms.len(), "alarm store hydrated");
        self.scheduler.reseed_all_active(&state.alarms).await;
        Ok(())
    }

    pub async fn create(&self, input: AlarmCreateInput) -> AppResult<Alarm> {
        let alarm = Alarm::new(input);
        validate(&alarm)?;
        if !tone_exists(&alarm.tone) {
            // unknown tones are stored as-is; they just play the default
            // channel sound
            warn!(target: "app::alarms", alarm_id = %alarm.id, tone = %alarm.tone, "unknown tone");
        }

        let mut state = self.state.lock().await;
        state.alarms.push(alarm.clone());
        order_by_active_and_time(&mut state.alarms);
        self.repo.save_alarms(&state.alarms)?;

        self.scheduler
            .present_status(AlarmAction::Created, &alarm)
            .await;
        self.scheduler.reseed_all_active(&state.alarms).await;

        info!(target: "app::alarms", alarm_id = %alarm.id, "alarm created");
        Ok(alarm)
    }

    /// Merge the patch into the stored record, validate the merged record
    /// (never the patch alone), and only then commit. A patch that would
    /// leave the record invalid is rejected with no partial write.
    pub async fn update(&self, id: &str, patch: AlarmUpdate) -> AppResult<Alarm> {
        let mut state = self.state.lock().await;
        let index = state
            .alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or_else(AppError::not_found)?;

        let merged = state.alarms[index].merged(patch);
        validate(&merged)?;

        state.alarms[index] = merged.clone();
        order_by_active_and_time(&mut state.alarms);
        self.repo.save_alarms(&state.alarms)?;

        self.scheduler
            .present_status(AlarmAction::Updated, &merged)
            .await;
        self.scheduler.reseed_all_active(&state.alarms).await;

        info!(target: "app::alarms", alarm_id = %merged.id, "alarm updated");
        Ok(merged)
    }

    /// Flip only the active flag. No re-validation; the rest of the record
    /// is untouched.
    pub async fn toggle_active(&self, id: &str, active: bool) -> AppResult<Alarm> {
        let mut state = self.state.lock().await;
        let index = state
            .alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or_else(AppError::not_found)?;

        state.alarms[index].active = active;
        let alarm = state.alarms[index].clone();
        order_by_active_and_time(&mut state.alarms);
        self.repo.save_alarms(&state.alarms)?;

        let action = if active {
            AlarmAction::Activated
        } else {
            AlarmAction::Deactivated
        };
        self.scheduler.present_status(action, &alarm).await;
        self.scheduler.reseed_all_active(&state.alarms).await;

        info!(target: "app::alarms", alarm_id = %alarm.id, active, "alarm toggled");
        Ok(alarm)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let index = state
            .alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or_else(AppError::not_found)?;

        let removed = state.alarms.remove(index);
        self.repo.save_alarms(&state.alarms)?;

        self.scheduler
            .present_status(AlarmAction::Removed, &removed)
            .await;
        self.scheduler.reseed_all_active(&state.alarms).await;

        info!(target: "app::alarms", alarm_id = %removed.id, "alarm removed");
        Ok(())
    }

    pub async fn list_all(&self) -> Vec<Alarm> {
        self.state.lock().await.alarms.clone()
    }

    pub async fn list_by_category(&self, category: &str) -> Vec<Alarm> {
        self.state
            .lock()
            .await
            .alarms
            .iter()
            .filter(|alarm| alarm.category == category)
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Alarm> {
        self.state
            .lock()
            .await
            .alarms
            .iter()
            .find(|alarm| alarm.id == id)
            .cloned()
    }

    pub async fn set_last_tone(&self, tone: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.last_tone = Some(tone.to_string());
        self.repo.save_last_tone(tone)
    }

    pub async fn last_tone(&self) -> Option<String> {
        self.state.lock().await.last_tone.clone()
    }

    /// Drop every alarm and clear the platform queue.
    pub async fn clear_all(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.alarms.clear();
        self.repo.clear_alarms()?;
        if let Err(error) = self.scheduler.cancel_all().await {
            warn!(target: "app::alarms", %error, "cancel-all failed while clearing alarms");
        }
        Ok(())
    }
}

/// Active alarms sort before inactive ones; within each group, ascending
/// by earliest fire time of the day. Stable, so ties keep insertion order.
fn order_by_active_and_time(alarms: &mut [Alarm]) {
    alarms.sort_by(|a, b| {
        b.active.cmp(&a.active).then_with(|| {
            compare_time_asc(&a.earliest_time_of_day(), &b.earliest_time_of_day())
        })
    });
}

fn seed_alarms() -> Vec<Alarm> {
    let tomorrow = (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    vec![
        Alarm::new(AlarmCreateInput {
            title: "Calculus class".to_string(),
            category: CATEGORY_SUBJECT.to_string(),
            linked_id: None,
            recurrence_kind: RECURRENCE_CUSTOM.to_string(),
            date: None,
            time: None,
            times: Some(vec!["08:00".to_string()]),
            weekdays: Some(
                ["L", "M", "X", "J", "V"]
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            per_weekday_times: None,
            tone: DEFAULT_TONE.to_string(),
            vibration_enabled: true,
            active: true,
        }),
        Alarm::new(AlarmCreateInput {
            title: "Submit report".to_string(),
            category: CATEGORY_TASK.to_string(),
            linked_id: None,
            recurrence_kind: RECURRENCE_ONCE.to_string(),
            date: Some(tomorrow),
            time: Some("10:00".to_string()),
            times: None,
            weekdays: None,
            per_weekday_times: None,
            tone: "ding".to_string(),
            vibration_enabled: true,
            active: true,
        }),
        Alarm::new(AlarmCreateInput {
            title: "Evening review".to_string(),
            category: CATEGORY_TASK.to_string(),
            linked_id: None,
            recurrence_kind: RECURRENCE_DAILY.to_string(),
            date: None,
            time: Some("16:00".to_string()),
            times: None,
            weekdays: None,
            per_weekday_times: None,
            tone: "chime".to_string(),
            vibration_enabled: false,
            active: false,
        }),
    ]
}
