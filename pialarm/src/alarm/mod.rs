//! Alarm domain types and the scheduling core.
//!
//! [`evaluator`] decides which alarms are eligible to fire on a given
//! tick, [`session`] owns the lifecycle of the currently active alarm,
//! and [`router`] serializes commands from all producers into the single
//! session task.

pub mod evaluator;
pub mod router;
pub mod session;

use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::{Error, Result};

/// Opaque alarm identifier, assigned by the store at creation.
///
/// Ordered so the session can break same-minute ties deterministically
/// (lowest id wins).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AlarmId(pub u64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Day of the week an alarm is eligible on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<time::Weekday> for Weekday {
    fn from(day: time::Weekday) -> Self {
        match day {
            time::Weekday::Monday => Weekday::Mon,
            time::Weekday::Tuesday => Weekday::Tue,
            time::Weekday::Wednesday => Weekday::Wed,
            time::Weekday::Thursday => Weekday::Thu,
            time::Weekday::Friday => Weekday::Fri,
            time::Weekday::Saturday => Weekday::Sat,
            time::Weekday::Sunday => Weekday::Sun,
        }
    }
}

/// Wall-clock trigger time, minute granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidAlarm(format!(
                "time of day out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A configured alarm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlarmDefinition {
    pub id: AlarmId,

    /// User-facing name, may be empty.
    #[serde(default)]
    pub label: String,

    pub time_of_day: TimeOfDay,

    /// Weekdays the alarm is eligible on. An empty set means the alarm
    /// never fires, independent of `enabled`.
    pub days_of_week: Vec<Weekday>,

    pub enabled: bool,

    /// Opaque reference to an audio asset, handed to the audio sink as-is.
    pub sound_reference: String,

    /// Last local date this alarm reached the ringing state. Guards
    /// against re-firing within the same day after a dismiss. Written
    /// only by the session task, never by the web layer.
    #[serde(default)]
    pub last_fired_date: Option<Date>,
}
