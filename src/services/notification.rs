use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::alarm::{Alarm, CATEGORY_SUBJECT, CATEGORY_TASK};
use crate::models::tone::TONE_BELL;
use crate::services::expander::{expand, ExpandConfig, FireInstant};

pub const DEFAULT_CHANNEL: &str = "default";
pub const ALARM_BELL_CHANNEL: &str = "alarm-bell";
const BELL_SOUND: &str = "bell.wav";
const DEFAULT_SOUND: &str = "default";
const VIBRATION_PATTERN: [u32; 4] = [250, 250, 250, 250];

/// What the platform should display and play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub sound: String,
    pub vibration_pattern: Option<Vec<u32>>,
}

/// When the platform should fire. The core never uses a native weekly
/// repeat; custom alarms always become explicit dated one-shots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTrigger {
    AtDateTime(NaiveDateTime),
    DailyRepeat { hour: u32, minute: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub content: NotificationContent,
    pub trigger: NotificationTrigger,
}

/// Store mutation summarized by a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmAction {
    Created,
    Updated,
    Activated,
    Deactivated,
    Removed,
}

impl AlarmAction {
    fn describe(self) -> &'static str {
        match self {
            AlarmAction::Created => "created",
            AlarmAction::Updated => "updated",
            AlarmAction::Activated => "activated",
            AlarmAction::Deactivated => "deactivated",
            AlarmAction::Removed => "removed",
        }
    }
}

/// Consumed platform capability for timed notifications. The queue behind
/// it is a single shared resource with no per-caller partitioning, which
/// is why cancellation is global.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Enqueue a timed notification, returning an opaque handle.
    async fn schedule(&self, request: NotificationRequest) -> AppResult<String>;

    /// Clear every scheduled notification, unconditionally.
    async fn cancel_all_scheduled(&self) -> AppResult<()>;

    /// Present an immediate, non-triggered notification.
    async fn present(&self, content: NotificationContent) -> AppResult<()>;
}

/// Maps alarms to platform notification requests and owns the reseed
/// protocol that keeps the device queue consistent with the alarm store.
#[derive(Clone)]
pub struct NotificationScheduler {
    gateway: Arc<dyn NotificationGateway>,
    config: ExpandConfig,
}

impl NotificationScheduler {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self::with_config(gateway, ExpandConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn NotificationGateway>, config: ExpandConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    /// Build the platform request for one fire instant of an alarm.
    pub fn build_request(alarm: &Alarm, instant: &FireInstant) -> NotificationRequest {
        let body = match alarm.category.as_str() {
            CATEGORY_SUBJECT => "Time for your class!",
            CATEGORY_TASK => "Time for your task!",
            _ => "Time for your reminder!",
        };

        let (channel_id, sound) = if alarm.tone == TONE_BELL {
            (ALARM_BELL_CHANNEL, BELL_SOUND)
        } else {
            (DEFAULT_CHANNEL, DEFAULT_SOUND)
        };

        let trigger = match instant {
            FireInstant::OneShot { at, .. } => NotificationTrigger::AtDateTime(*at),
            FireInstant::DailyRepeat { hour, minute } => NotificationTrigger::DailyRepeat {
                hour: *hour,
                minute: *minute,
            },
        };

        NotificationRequest {
            content: NotificationContent {
                title: alarm.title.clone(),
                body: body.to_string(),
                channel_id: channel_id.to_string(),
                sound: sound.to_string(),
                vibration_pattern: alarm
                    .vibration_enabled
                    .then(|| VIBRATION_PATTERN.to_vec()),
            },
            trigger,
        }
    }

    /// Expand one alarm and enqueue a request per instant. Inactive alarms
    /// and alarms with no usable time are a no-op. Returns how many
    /// requests were enqueued.
    pub async fn schedule_alarm(&self, alarm: &Alarm) -> AppResult<usize> {
        if !alarm.active {
            return Ok(0);
        }

        let now = self.config.reference_now();
        let instants = expand(alarm, now, self.config.horizon_weeks);
        if instants.is_empty() {
            debug!(target: "app::notify", alarm_id = %alarm.id, "no usable fire instants, skipping");
            return Ok(0);
        }

        let count = instants.len();
        for instant in &instants {
            let request = Self::build_request(alarm, instant);
            self.gateway.schedule(request).await?;
        }

        debug!(target: "app::notify", alarm_id = %alarm.id, count, "scheduled alarm");
        Ok(count)
    }

    pub async fn cancel_all(&self) -> AppResult<()> {
        self.gateway.cancel_all_scheduled().await
    }

    /// Cancel everything, then reschedule every active alarm. Per-alarm
    /// scheduling runs as an all-settle batch: one alarm's failure is
    /// logged and isolated, never blocking the rest. This full rebuild is
    /// the only mutation-consistency mechanism; there is no per-alarm
    /// notification-id bookkeeping.
    pub async fn reseed_all_active(&self, alarms: &[Alarm]) -> usize {
        if let Err(error) = self.cancel_all().await {
            warn!(target: "app::notify", %error, "cancel-all failed during reseed");
        }

        let results = join_all(
            alarms
                .iter()
                .filter(|alarm| alarm.active)
                .map(|alarm| async move { (alarm.id.clone(), self.schedule_alarm(alarm).await) }),
        )
        .await;

        let mut total = 0;
        for (alarm_id, result) in results {
            match result {
                Ok(count) => total += count,
                Err(error) => {
                    warn!(target: "app::notify", %alarm_id, %error, "failed to schedule alarm during reseed");
                }
            }
        }

        info!(target: "app::notify", total, "reseeded active alarm schedule");
        total
    }

    /// Fire-and-forget status notification for a store mutation. Failures
    /// are logged and swallowed.
    pub async fn present_status(&self, action: AlarmAction, alarm: &Alarm) {
        let content = NotificationContent {
            title: "Alarms".to_string(),
            body: format!("Alarm \"{}\" {}", alarm.title, action.describe()),
            channel_id: DEFAULT_CHANNEL.to_string(),
            sound: DEFAULT_SOUND.to_string(),
            vibration_pattern: None,
        };

        if let Err(error) = self.gateway.present(content).await {
            warn!(
                target: "app::notify",
                alarm_id = %alarm.id,
                action = action.describe(),
                %error,
                "failed to present status notification"
            );
        }
    }
}

/// Gateway backed by an in-memory queue, for headless runs and tests.
#[derive(Default)]
pub struct InMemoryGateway {
    next_handle: AtomicU64,
    scheduled: Mutex<Vec<(String, NotificationRequest)>>,
    presented: Mutex<Vec<NotificationContent>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_requests(&self) -> Vec<NotificationRequest> {
        self.scheduled
            .lock()
            .expect("gateway queue poisoned")
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn presented_contents(&self) -> Vec<NotificationContent> {
        self.presented
            .lock()
            .expect("gateway queue poisoned")
            .clone()
    }
}

#[async_trait]
impl NotificationGateway for InMemoryGateway {
    async fn schedule(&self, request: NotificationRequest) -> AppResult<String> {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed).to_string();
        self.scheduled
            .lock()
            .map_err(|_| AppError::scheduling("gateway queue poisoned"))?
            .push((handle.clone(), request));
        Ok(handle)
    }

    async fn cancel_all_scheduled(&self) -> AppResult<()> {
        self.scheduled
            .lock()
            .map_err(|_| AppError::scheduling("gateway queue poisoned"))?
            .clear();
        Ok(())
    }

    async fn present(&self, content: NotificationContent) -> AppResult<()> {
        self.presented
            .lock()
            .map_err(|_| AppError::scheduling("gateway queue poisoned"))?
            .push(content);
        Ok(())
    }
}
