//! JSON-file backed alarm store.
//!
//! Durable enough for a single-user clock: the whole alarm set is held
//! in memory and rewritten to disk after each mutation. The file is a
//! plain JSON array of alarm definitions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use time::Date;
use tokio::sync::Mutex;

use super::{Alarms, AlarmStore, NewAlarm};
use crate::alarm::{AlarmDefinition, AlarmId};
use crate::error::Result;
use crate::tracing::prelude::*;

pub struct JsonFileStore {
    path: PathBuf,
    alarms: Mutex<Alarms>,
}

impl JsonFileStore {
    /// Open the store, loading existing alarms or starting empty when
    /// the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let defs: Vec<AlarmDefinition> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Alarm file missing, starting empty");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), count = defs.len(), "Alarm store loaded");

        Ok(Self {
            path,
            alarms: Mutex::new(Alarms::from_definitions(defs)),
        })
    }

    async fn persist(&self, alarms: &Alarms) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let defs: Vec<&AlarmDefinition> = alarms.by_id.values().collect();
        let bytes = serde_json::to_vec_pretty(&defs)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl AlarmStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<AlarmDefinition>> {
        Ok(self.alarms.lock().await.sorted())
    }

    async fn get(&self, id: AlarmId) -> Result<Option<AlarmDefinition>> {
        Ok(self.alarms.lock().await.by_id.get(&id).cloned())
    }

    async fn create(&self, alarm: NewAlarm) -> Result<AlarmDefinition> {
        let mut alarms = self.alarms.lock().await;
        let created = alarms.insert(alarm);
        self.persist(&alarms).await?;
        info!(alarm = %created.id, "Alarm created");
        Ok(created)
    }

    async fn upsert(&self, alarm: AlarmDefinition) -> Result<AlarmDefinition> {
        let mut alarms = self.alarms.lock().await;
        let updated = alarms.replace(alarm)?;
        self.persist(&alarms).await?;
        info!(alarm = %updated.id, "Alarm updated");
        Ok(updated)
    }

    async fn delete(&self, id: AlarmId) -> Result<bool> {
        let mut alarms = self.alarms.lock().await;
        let existed = alarms.by_id.remove(&id).is_some();
        if existed {
            self.persist(&alarms).await?;
            info!(alarm = %id, "Alarm deleted");
        }
        Ok(existed)
    }

    async fn mark_fired(&self, id: AlarmId, date: Date) -> Result<()> {
        let mut alarms = self.alarms.lock().await;
        alarms.mark_fired(id, date)?;
        self.persist(&alarms).await
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::alarm::{TimeOfDay, Weekday};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pialarm-test-{}-{name}.json", std::process::id()))
    }

    fn new_alarm() -> NewAlarm {
        NewAlarm {
            label: "wake".into(),
            time_of_day: TimeOfDay { hour: 7, minute: 0 },
            days_of_week: vec![Weekday::Mon],
            enabled: true,
            sound_reference: "chime.mp3".into(),
        }
    }

    #[tokio::test]
    async fn survives_reopen() {
        let path = temp_path("reopen");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        let created = store.create(new_alarm()).await.unwrap();
        store
            .mark_fired(created.id, date!(2026 - 08 - 24))
            .await
            .unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).await.unwrap();
        let alarms = store.list().await.unwrap();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].id, created.id);
        assert_eq!(alarms[0].last_fired_date, Some(date!(2026 - 08 - 24)));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let path = temp_path("missing");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn id_sequence_continues_after_reopen() {
        let path = temp_path("sequence");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        let a = store.create(new_alarm()).await.unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).await.unwrap();
        let b = store.create(new_alarm()).await.unwrap();
        assert!(b.id > a.id);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
