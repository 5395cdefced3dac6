//! API data transfer objects.
//!
//! These types define the API contract shared between the daemon and
//! clients. Timestamps travel as RFC 3339 strings and weekdays as their
//! short names, keeping the wire format independent of the internal
//! time types.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::alarm::AlarmDefinition;
use crate::alarm::session::SessionSnapshot;

/// Session snapshot plus the daemon's current time.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct StatusResponse {
    /// One of `idle`, `ringing`, `snoozed`.
    pub state: String,
    pub active_alarm_id: Option<u64>,
    /// RFC 3339, present while ringing.
    pub ring_started_at: Option<String>,
    /// RFC 3339, present while snoozed.
    pub snooze_until: Option<String>,
    /// Daemon's current local time, RFC 3339.
    pub now: String,
}

impl StatusResponse {
    pub fn new(snapshot: &SessionSnapshot, now: OffsetDateTime) -> Self {
        Self {
            state: match snapshot.state {
                crate::alarm::session::SessionState::Idle => "idle",
                crate::alarm::session::SessionState::Ringing => "ringing",
                crate::alarm::session::SessionState::Snoozed => "snoozed",
            }
            .to_string(),
            active_alarm_id: snapshot.active_alarm_id.map(|id| id.0),
            ring_started_at: snapshot.ring_started_at.map(rfc3339),
            snooze_until: snapshot.snooze_until.map(rfc3339),
            now: rfc3339(now),
        }
    }
}

/// Alarm fields accepted on create and update.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct AlarmBody {
    #[serde(default)]
    pub label: String,
    pub hour: u8,
    pub minute: u8,
    /// Short weekday names: `Mon` through `Sun`.
    pub days_of_week: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub sound_reference: String,
}

fn default_enabled() -> bool {
    true
}

/// Alarm as reported by the daemon.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct AlarmResponse {
    pub id: u64,
    pub label: String,
    pub hour: u8,
    pub minute: u8,
    /// `HH:MM` for display.
    pub time_display: String,
    pub days_of_week: Vec<String>,
    pub enabled: bool,
    pub sound_reference: String,
    /// ISO calendar date of the last fire, if any.
    pub last_fired_date: Option<String>,
}

impl From<AlarmDefinition> for AlarmResponse {
    fn from(alarm: AlarmDefinition) -> Self {
        Self {
            id: alarm.id.0,
            label: alarm.label,
            hour: alarm.time_of_day.hour,
            minute: alarm.time_of_day.minute,
            time_display: alarm.time_of_day.to_string(),
            days_of_week: alarm
                .days_of_week
                .iter()
                .map(|day| day.to_string())
                .collect(),
            enabled: alarm.enabled,
            sound_reference: alarm.sound_reference,
            last_fired_date: alarm.last_fired_date.map(|date| date.to_string()),
        }
    }
}

fn rfc3339(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.to_string())
}
