//! Command router and session task.
//!
//! Commands from all producers (ticker, button listeners, web handlers)
//! funnel through one mpsc queue into a single consuming task that owns
//! the [`AlarmSession`]. The single consumer is the mutual exclusion:
//! each command is fully processed (state updated, effects dispatched,
//! fire history persisted) before the next is taken, so a dismiss from
//! the web can never interleave with a tick's re-ring.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::evaluator;
use super::session::{AlarmSession, SessionSnapshot, SessionState, SideEffect};
use crate::clock::ClockSource;
use crate::store::AlarmStore;
use crate::tracing::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Snooze,
    Dismiss,
    Tick(OffsetDateTime),
}

/// Cloneable submission handle, safe to hand to any producer task.
#[derive(Clone)]
pub struct CommandRouter {
    tx: mpsc::Sender<Command>,
}

impl CommandRouter {
    pub fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    /// Queue a command for the session task. Waits for queue capacity.
    pub async fn submit(&self, command: Command) {
        if self.tx.send(command).await.is_err() {
            warn!("Command dropped, session task gone");
        }
    }

    /// Queue a command without waiting; drops the command when the queue
    /// is full. For producers that must not block (interrupt handlers).
    pub fn try_submit(&self, command: Command) {
        if let Err(err) = self.tx.try_send(command) {
            warn!(%err, "Command dropped");
        }
    }

    /// Convenience wrapper for the host's periodic scheduler.
    pub async fn tick(&self, now: OffsetDateTime) {
        self.submit(Command::Tick(now)).await;
    }
}

/// Single-consumer task owning the session state machine.
pub struct SessionTask {
    session: AlarmSession,
    store: Arc<dyn AlarmStore>,
    clock: Arc<dyn ClockSource>,
    command_rx: mpsc::Receiver<Command>,
    effect_tx: mpsc::Sender<SideEffect>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// High-water mark of tick timestamps, applied before evaluation so
    /// a backwards clock step cannot produce a spurious candidate set.
    last_tick: Option<OffsetDateTime>,
}

impl SessionTask {
    pub fn new(
        session: AlarmSession,
        store: Arc<dyn AlarmStore>,
        clock: Arc<dyn ClockSource>,
        command_rx: mpsc::Receiver<Command>,
        effect_tx: mpsc::Sender<SideEffect>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            session,
            store,
            clock,
            command_rx,
            effect_tx,
            snapshot_tx,
            last_tick: None,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        trace!("Session task started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    break;
                }
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle(command).await,
                        None => break,
                    }
                }
            }
        }

        trace!("Session task stopped");
    }

    async fn handle(&mut self, command: Command) {
        let effects = match command {
            Command::Tick(now) => self.handle_tick(now).await,
            Command::Snooze => self.session.handle_snooze(self.clock.now()),
            Command::Dismiss => self.session.handle_dismiss(),
        };

        if self.snapshot_tx.send(self.session.snapshot()).is_err() {
            debug!("Snapshot channel closed");
        }

        for effect in effects {
            if self.effect_tx.send(effect).await.is_err() {
                debug!("Side-effect channel closed");
            }
        }
    }

    async fn handle_tick(&mut self, now: OffsetDateTime) -> Vec<SideEffect> {
        let now = match self.last_tick {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_tick = Some(now);

        // The store is only consulted while idle; an active session
        // defers every other alarm anyway.
        let candidates = if self.session.state() == SessionState::Idle {
            match self.store.list().await {
                Ok(alarms) => {
                    let eligible = evaluator::evaluate(now, &alarms);
                    alarms
                        .into_iter()
                        .filter(|alarm| eligible.contains(&alarm.id))
                        .collect()
                }
                Err(err) => {
                    error!(%err, "Alarm store unavailable, skipping evaluation");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let outcome = self.session.handle_tick(now, &candidates);

        if let Some((id, date)) = outcome.fired {
            if let Err(err) = self.store.mark_fired(id, date).await {
                // The session stays authoritative; worst case the alarm
                // re-fires after a restart.
                error!(alarm = %id, %err, "Failed to persist fire history");
            }
        }

        outcome.effects
    }
}
