use tracing::debug;

use crate::db::repositories::storage_repository::StorageRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::alarm::Alarm;

const KEY_ALARM_LIST: &str = "alarms:list";
const KEY_LAST_TONE: &str = "alarms:last_tone";

/// Persists the full alarm collection as one JSON document plus the last
/// tone the user picked. The collection is small and always read/written
/// whole, so a key-value round trip beats a relational layout here.
#[derive(Clone)]
pub struct AlarmRepository {
    db: DbPool,
}

impl AlarmRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn load_alarms(&self) -> AppResult<Vec<Alarm>> {
        self.db.with_connection(|conn| {
            let row = StorageRepository::get(conn, KEY_ALARM_LIST)?;
            match row {
                Some(row) => {
                    let alarms: Vec<Alarm> = serde_json::from_str(&row.value)?;
                    debug!(target: "app::db", count = alarms.len(), "loaded alarm list");
                    Ok(alarms)
                }
                None => Ok(Vec::new()),
            }
        })
    }

    pub fn save_alarms(&self, alarms: &[Alarm]) -> AppResult<()> {
        let json = serde_json::to_string(alarms)?;
        self.db.with_connection(|conn| {
            StorageRepository::upsert(conn, KEY_ALARM_LIST, &json)?;
            debug!(target: "app::db", count = alarms.len(), "persisted alarm list");
            Ok(())
        })
    }

    pub fn clear_alarms(&self) -> AppResult<()> {
        self.db
            .with_connection(|conn| StorageRepository::delete(conn, KEY_ALARM_LIST))
    }

    pub fn load_last_tone(&self) -> AppResult<Option<String>> {
        self.db.with_connection(|conn| {
            Ok(StorageRepository::get(conn, KEY_LAST_TONE)?.map(|row| row.value))
        })
    }

    pub fn save_last_tone(&self, tone: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| StorageRepository::upsert(conn, KEY_LAST_TONE, tone))
    }
}
