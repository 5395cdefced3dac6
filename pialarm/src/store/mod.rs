//! Alarm store collaborator.
//!
//! The scheduling core only calls [`AlarmStore::list`] and
//! [`AlarmStore::mark_fired`]; create/update/delete are invoked by the
//! web layer directly against the store and never pass through the
//! session task.

pub mod json;

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::alarm::{AlarmDefinition, AlarmId, TimeOfDay, Weekday};
use crate::error::{Error, Result};

pub use json::JsonFileStore;

/// Alarm fields supplied by the caller at creation; the store assigns
/// the id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAlarm {
    pub label: String,
    pub time_of_day: TimeOfDay,
    pub days_of_week: Vec<Weekday>,
    pub enabled: bool,
    pub sound_reference: String,
}

#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// All alarms, ordered by trigger time then id.
    async fn list(&self) -> Result<Vec<AlarmDefinition>>;

    async fn get(&self, id: AlarmId) -> Result<Option<AlarmDefinition>>;

    /// Insert a new alarm and assign its id.
    async fn create(&self, alarm: NewAlarm) -> Result<AlarmDefinition>;

    /// Replace an existing alarm. Fails with [`Error::AlarmNotFound`] for
    /// an unknown id; ids are only ever minted by [`create`](Self::create).
    async fn upsert(&self, alarm: AlarmDefinition) -> Result<AlarmDefinition>;

    /// Remove an alarm. Returns whether it existed.
    async fn delete(&self, id: AlarmId) -> Result<bool>;

    /// Record that `id` reached the ringing state on `date`. Called only
    /// by the session task.
    async fn mark_fired(&self, id: AlarmId, date: Date) -> Result<()>;
}

#[derive(Default)]
struct Alarms {
    by_id: BTreeMap<AlarmId, AlarmDefinition>,
    next_id: u64,
}

impl Alarms {
    fn from_definitions(defs: Vec<AlarmDefinition>) -> Self {
        let next_id = defs.iter().map(|a| a.id.0 + 1).max().unwrap_or(1);
        let by_id = defs.into_iter().map(|a| (a.id, a)).collect();
        Self { by_id, next_id }
    }

    fn sorted(&self) -> Vec<AlarmDefinition> {
        let mut alarms: Vec<_> = self.by_id.values().cloned().collect();
        alarms.sort_by_key(|a| (a.time_of_day.hour, a.time_of_day.minute, a.id));
        alarms
    }

    fn insert(&mut self, new: NewAlarm) -> AlarmDefinition {
        let id = AlarmId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        let alarm = AlarmDefinition {
            id,
            label: new.label,
            time_of_day: new.time_of_day,
            days_of_week: new.days_of_week,
            enabled: new.enabled,
            sound_reference: new.sound_reference,
            last_fired_date: None,
        };
        self.by_id.insert(id, alarm.clone());
        alarm
    }

    fn replace(&mut self, alarm: AlarmDefinition) -> Result<AlarmDefinition> {
        if !self.by_id.contains_key(&alarm.id) {
            return Err(Error::AlarmNotFound(alarm.id));
        }
        self.by_id.insert(alarm.id, alarm.clone());
        Ok(alarm)
    }

    fn mark_fired(&mut self, id: AlarmId, date: Date) -> Result<()> {
        let alarm = self.by_id.get_mut(&id).ok_or(Error::AlarmNotFound(id))?;
        alarm.last_fired_date = Some(date);
        Ok(())
    }
}

/// In-memory store for tests and simulation runs.
#[derive(Default)]
pub struct MemoryStore {
    alarms: Mutex<Alarms>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alarms(defs: Vec<AlarmDefinition>) -> Self {
        Self {
            alarms: Mutex::new(Alarms::from_definitions(defs)),
        }
    }
}

#[async_trait]
impl AlarmStore for MemoryStore {
    async fn list(&self) -> Result<Vec<AlarmDefinition>> {
        Ok(self.alarms.lock().sorted())
    }

    async fn get(&self, id: AlarmId) -> Result<Option<AlarmDefinition>> {
        Ok(self.alarms.lock().by_id.get(&id).cloned())
    }

    async fn create(&self, alarm: NewAlarm) -> Result<AlarmDefinition> {
        Ok(self.alarms.lock().insert(alarm))
    }

    async fn upsert(&self, alarm: AlarmDefinition) -> Result<AlarmDefinition> {
        self.alarms.lock().replace(alarm)
    }

    async fn delete(&self, id: AlarmId) -> Result<bool> {
        Ok(self.alarms.lock().by_id.remove(&id).is_some())
    }

    async fn mark_fired(&self, id: AlarmId, date: Date) -> Result<()> {
        self.alarms.lock().mark_fired(id, date)
    }
}
