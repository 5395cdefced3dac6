//! Alarm session state machine.
//!
//! Owns the lifecycle of the currently active alarm. Exactly one session
//! exists process-wide; alarms never stack. A second alarm whose minute
//! arrives while the session is ringing or snoozed is deferred: its
//! `last_fired_date` stays untouched, so the evaluator re-offers it on
//! every later tick until it wins a turn or the day rolls over.
//!
//! ```text
//!            tick + candidate                snooze
//!  Idle ───────────────────────► Ringing ───────────► Snoozed ──┐
//!   ▲                              │  ▲                  │      │ snooze
//!   │   dismiss / max ring time    │  │ tick ≥ snooze    │      │ (timer
//!   ├──────────────────────────────┘  │       until      │      │ reset)
//!   │           dismiss               └──────────────────┘      │
//!   └──────────────────────────────────────────◄────────────────┘
//! ```
//!
//! Every command has a defined effect in every state, so the machine is
//! infallible: illegal combinations are no-ops, never errors.

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};

use super::{AlarmDefinition, AlarmId};
use crate::tracing::prelude::*;

/// Side-effect intent emitted by a transition, consumed by the audio sink.
///
/// Intents are fire-and-forget: the session state is authoritative even
/// if the audio device fails to start, so a later dismiss still silences
/// whatever did start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideEffect {
    StartAudio { sound_reference: String },
    StopAudio,
}

/// Timing knobs, supplied by the host configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a snooze suppresses ringing before the automatic re-ring.
    pub snooze_duration: Duration,

    /// Safety cap on a single ringing period. Checked on each tick rather
    /// than with a cancellable timer, which is immune to cancellation
    /// races.
    pub max_ring_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snooze_duration: Duration::minutes(9),
            max_ring_duration: Duration::minutes(30),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Ringing,
    Snoozed,
}

/// Point-in-time copy of the session, safe to hand to display and web
/// collaborators without exposing the machine itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub active_alarm_id: Option<AlarmId>,
    pub ring_started_at: Option<OffsetDateTime>,
    pub snooze_until: Option<OffsetDateTime>,
}

/// Result of a tick: effects to dispatch, plus the alarm that just fired
/// (if any) so the caller can persist its `last_fired_date`.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub effects: Vec<SideEffect>,
    pub fired: Option<(AlarmId, Date)>,
}

pub struct AlarmSession {
    config: SessionConfig,
    state: SessionState,
    active_alarm_id: Option<AlarmId>,
    active_sound: Option<String>,
    ring_started_at: Option<OffsetDateTime>,
    snooze_until: Option<OffsetDateTime>,
    /// High-water mark of observed time. A system clock step backwards
    /// must not cause duplicate fires or missed snooze expiries, so any
    /// earlier timestamp is clamped up to this.
    last_now: Option<OffsetDateTime>,
}

impl AlarmSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            active_alarm_id: None,
            active_sound: None,
            ring_started_at: None,
            snooze_until: None,
            last_now: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            active_alarm_id: self.active_alarm_id,
            ring_started_at: self.ring_started_at,
            snooze_until: self.snooze_until,
        }
    }

    /// Advance the session to `now`.
    ///
    /// `candidates` are the alarms the evaluator found eligible this tick;
    /// only consulted while idle. The lowest id wins, everything else is
    /// deferred.
    pub fn handle_tick(&mut self, now: OffsetDateTime, candidates: &[AlarmDefinition]) -> TickOutcome {
        let now = self.clamp(now);
        let mut outcome = TickOutcome::default();

        match self.state {
            SessionState::Idle => {
                let Some(winner) = candidates.iter().min_by_key(|alarm| alarm.id) else {
                    return outcome;
                };

                info!(alarm = %winner.id, label = %winner.label, "Alarm fired");
                self.state = SessionState::Ringing;
                self.active_alarm_id = Some(winner.id);
                self.active_sound = Some(winner.sound_reference.clone());
                self.ring_started_at = Some(now);
                outcome.fired = Some((winner.id, now.date()));
                outcome.effects.push(SideEffect::StartAudio {
                    sound_reference: winner.sound_reference.clone(),
                });
            }

            SessionState::Ringing => {
                let expired = self
                    .ring_started_at
                    .is_some_and(|started| now - started >= self.config.max_ring_duration);
                if expired {
                    warn!(
                        alarm = ?self.active_alarm_id,
                        "Maximum ring duration reached, auto-dismissing"
                    );
                    self.reset_to_idle();
                    outcome.effects.push(SideEffect::StopAudio);
                }
            }

            SessionState::Snoozed => {
                let due = self.snooze_until.is_some_and(|until| now >= until);
                if due {
                    info!(alarm = ?self.active_alarm_id, "Snooze expired, re-ringing");
                    self.state = SessionState::Ringing;
                    self.ring_started_at = Some(now);
                    self.snooze_until = None;
                    if let Some(sound) = &self.active_sound {
                        outcome.effects.push(SideEffect::StartAudio {
                            sound_reference: sound.clone(),
                        });
                    }
                }
            }
        }

        outcome
    }

    /// Snooze the active alarm. Re-snoozing while already snoozed resets
    /// the timer rather than stacking. A no-op while idle.
    pub fn handle_snooze(&mut self, now: OffsetDateTime) -> Vec<SideEffect> {
        let now = self.clamp(now);

        match self.state {
            SessionState::Ringing => {
                let until = now + self.config.snooze_duration;
                info!(alarm = ?self.active_alarm_id, %until, "Alarm snoozed");
                self.state = SessionState::Snoozed;
                self.ring_started_at = None;
                self.snooze_until = Some(until);
                vec![SideEffect::StopAudio]
            }
            SessionState::Snoozed => {
                let until = now + self.config.snooze_duration;
                debug!(%until, "Snooze timer reset");
                self.snooze_until = Some(until);
                vec![]
            }
            SessionState::Idle => {
                debug!("Snooze ignored, no active alarm");
                vec![]
            }
        }
    }

    /// Dismiss the active alarm for the day. A no-op while idle.
    pub fn handle_dismiss(&mut self) -> Vec<SideEffect> {
        match self.state {
            SessionState::Ringing | SessionState::Snoozed => {
                info!(alarm = ?self.active_alarm_id, "Alarm dismissed");
                self.reset_to_idle();
                vec![SideEffect::StopAudio]
            }
            SessionState::Idle => {
                debug!("Dismiss ignored, no active alarm");
                vec![]
            }
        }
    }

    fn reset_to_idle(&mut self) {
        self.state = SessionState::Idle;
        self.active_alarm_id = None;
        self.active_sound = None;
        self.ring_started_at = None;
        self.snooze_until = None;
    }

    fn clamp(&mut self, now: OffsetDateTime) -> OffsetDateTime {
        let now = match self.last_now {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_now = Some(now);
        now
    }
}
