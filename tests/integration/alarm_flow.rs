use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use tempfile::{tempdir, TempDir};

use studybell::db::repositories::alarm_repository::AlarmRepository;
use studybell::db::DbPool;
use studybell::error::ValidationCode;
use studybell::models::alarm::{
    AlarmCreateInput, AlarmUpdate, CATEGORY_SUBJECT, CATEGORY_TASK, RECURRENCE_CUSTOM,
    RECURRENCE_DAILY,
};
use studybell::services::alarm_store::AlarmStore;
use studybell::services::expander::ExpandConfig;
use studybell::services::notification::{
    InMemoryGateway, NotificationGateway, NotificationScheduler, NotificationTrigger,
};

// 2026-08-19 is a Wednesday.
fn wednesday_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 19)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn setup_store(dir: &TempDir) -> (AlarmStore, Arc<InMemoryGateway>) {
    studybell::utils::logger::init_logging(dir.path().join("logs")).expect("logging");
    let pool = DbPool::new(dir.path().join("alarms.sqlite")).expect("db pool");
    let gateway = Arc::new(InMemoryGateway::new());
    let scheduler = NotificationScheduler::with_config(
        Arc::clone(&gateway) as Arc<dyn NotificationGateway>,
        ExpandConfig {
            horizon_weeks: 4,
            now: Some(wednesday_noon()),
        },
    );
    (AlarmStore::new(AlarmRepository::new(pool), scheduler), gateway)
}

fn math_class_input() -> AlarmCreateInput {
    AlarmCreateInput {
        title: "Math class".to_string(),
        category: CATEGORY_SUBJECT.to_string(),
        linked_id: None,
        recurrence_kind: RECURRENCE_CUSTOM.to_string(),
        date: None,
        time: None,
        times: Some(vec!["08:00".to_string()]),
        weekdays: Some(vec!["L".to_string(), "X".to_string(), "V".to_string()]),
        per_weekday_times: None,
        tone: "bell".to_string(),
        vibration_enabled: true,
        active: true,
    }
}

fn daily_input(title: &str, time: &str) -> AlarmCreateInput {
    AlarmCreateInput {
        title: title.to_string(),
        category: CATEGORY_TASK.to_string(),
        linked_id: None,
        recurrence_kind: RECURRENCE_DAILY.to_string(),
        date: None,
        time: Some(time.to_string()),
        times: None,
        weekdays: None,
        per_weekday_times: None,
        tone: "chime".to_string(),
        vibration_enabled: false,
        active: true,
    }
}

#[tokio::test]
async fn bootstrap_seeds_examples_and_is_idempotent() {
    let dir = tempdir().expect("temp dir");
    let (store, gateway) = setup_store(&dir);

    store.bootstrap().await.expect("bootstrap");
    let seeded = store.list_all().await;
    assert_eq!(seeded.len(), 3);
    assert!(!gateway.scheduled_requests().is_empty());

    // ordering invariant holds on the seeded list
    let first_inactive = seeded.iter().position(|a| !a.active);
    if let Some(boundary) = first_inactive {
        assert!(seeded[boundary..].iter().all(|a| !a.active));
    }

    // second call is a no-op, not a re-seed
    store.bootstrap().await.expect("bootstrap again");
    assert_eq!(store.list_all().await.len(), 3);
}

#[tokio::test]
async fn creating_a_custom_alarm_schedules_the_full_rolling_window() {
    let dir = tempdir().expect("temp dir");
    let (store, gateway) = setup_store(&dir);

    store.create(math_class_input()).await.expect("create");

    // Mon/Wed/Fri at 08:00 over 4 weeks -> 12 dated one-shots
    let requests = gateway.scheduled_requests();
    assert_eq!(requests.len(), 12);

    for request in &requests {
        assert_eq!(request.content.title, "Math class");
        assert_eq!(request.content.body, "Time for your class!");
        match &request.trigger {
            NotificationTrigger::AtDateTime(at) => {
                assert!(*at > wednesday_noon());
                assert_eq!(at.format("%H:%M").to_string(), "08:00");
                assert!(matches!(
                    at.weekday(),
                    Weekday::Mon | Weekday::Wed | Weekday::Fri
                ));
            }
            other => panic!("custom alarms must not use native repeats: {other:?}"),
        }
    }
}

#[tokio::test]
async fn invalid_merge_is_rejected_with_no_partial_write() {
    let dir = tempdir().expect("temp dir");
    let (store, _gateway) = setup_store(&dir);

    let alarm = store
        .create(daily_input("Evening review", "16:00"))
        .await
        .expect("create");

    // switching to custom without any weekday data must fail...
    let err = store
        .update(
            &alarm.id,
            AlarmUpdate {
                recurrence_kind: Some(RECURRENCE_CUSTOM.to_string()),
                time: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect_err("merged record is invalid");
    assert_eq!(
        err.validation_code(),
        Some(ValidationCode::MissingCustomSchedule)
    );

    // ...and the stored record is untouched
    let stored = store.get_by_id(&alarm.id).await.expect("still present");
    assert_eq!(stored.recurrence_kind, RECURRENCE_DAILY);
    assert_eq!(stored.time.as_deref(), Some("16:00"));
}

#[tokio::test]
async fn patch_operations_on_unknown_ids_raise_not_found() {
    let dir = tempdir().expect("temp dir");
    let (store, _gateway) = setup_store(&dir);

    let err = store
        .update("no-such-id", AlarmUpdate::default())
        .await
        .expect_err("unknown id");
    assert!(matches!(err, studybell::error::AppError::NotFound));

    let err = store
        .toggle_active("no-such-id", false)
        .await
        .expect_err("unknown id");
    assert!(matches!(err, studybell::error::AppError::NotFound));

    let err = store.remove("no-such-id").await.expect_err("unknown id");
    assert!(matches!(err, studybell::error::AppError::NotFound));
}

#[tokio::test]
async fn ordering_invariant_holds_after_every_mutation() {
    let dir = tempdir().expect("temp dir");
    let (store, _gateway) = setup_store(&dir);

    store
        .create(daily_input("Late task", "18:00"))
        .await
        .expect("create");
    store
        .create(daily_input("Early task", "06:00"))
        .await
        .expect("create");
    let math = store.create(math_class_input()).await.expect("create");

    let titles: Vec<String> = store.list_all().await.iter().map(|a| a.title.clone()).collect();
    assert_eq!(titles, vec!["Early task", "Math class", "Late task"]);

    // deactivating pushes the alarm behind every active one
    store
        .toggle_active(&math.id, false)
        .await
        .expect("toggle off");
    let alarms = store.list_all().await;
    let titles: Vec<&str> = alarms.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Early task", "Late task", "Math class"]);
    assert!(!alarms.last().unwrap().active);
}

#[tokio::test]
async fn alarms_survive_a_persistence_round_trip() {
    let dir = tempdir().expect("temp dir");

    let created = {
        let (store, _gateway) = setup_store(&dir);
        store.create(math_class_input()).await.expect("create")
    };

    // a fresh store over the same database hydrates the saved list and
    // does not re-seed examples
    let (store, _gateway) = setup_store(&dir);
    store.bootstrap().await.expect("bootstrap");

    let alarms = store.list_all().await;
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0], created);
}

#[tokio::test]
async fn listing_filters_by_category_and_status_notifications_fire() {
    let dir = tempdir().expect("temp dir");
    let (store, gateway) = setup_store(&dir);

    let math = store.create(math_class_input()).await.expect("create");
    store
        .create(daily_input("Submit draft", "10:00"))
        .await
        .expect("create");

    assert_eq!(store.list_by_category(CATEGORY_SUBJECT).await.len(), 1);
    assert_eq!(store.list_by_category(CATEGORY_TASK).await.len(), 1);

    store.remove(&math.id).await.expect("remove");
    assert_eq!(store.list_by_category(CATEGORY_SUBJECT).await.len(), 0);

    let bodies: Vec<String> = gateway
        .presented_contents()
        .into_iter()
        .map(|content| content.body)
        .collect();
    assert!(bodies.contains(&"Alarm \"Math class\" created".to_string()));
    assert!(bodies.contains(&"Alarm \"Math class\" removed".to_string()));
}

#[tokio::test]
async fn last_tone_round_trips_through_the_store() {
    let dir = tempdir().expect("temp dir");
    let (store, _gateway) = setup_store(&dir);

    assert_eq!(store.last_tone().await, None);
    store.set_last_tone("wood").await.expect("set tone");
    assert_eq!(store.last_tone().await, Some("wood".to_string()));
}
