//! Display collaborator.
//!
//! A capability trait with a console variant; the real OLED driver on
//! the Pi implements the same trait and is selected at construction.
//! The task re-renders whenever the session publishes a new snapshot,
//! reading the watch channel without ever blocking an in-flight
//! transition.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::alarm::session::{SessionSnapshot, SessionState};
use crate::tracing::prelude::*;

pub trait Display: Send {
    fn render(&mut self, snapshot: &SessionSnapshot);
}

/// Log-only display for development hosts.
pub struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        match snapshot.state {
            SessionState::Idle => info!("DISPLAY idle"),
            SessionState::Ringing => {
                info!(alarm = ?snapshot.active_alarm_id, "DISPLAY ringing")
            }
            SessionState::Snoozed => {
                info!(until = ?snapshot.snooze_until, "DISPLAY snoozed")
            }
        }
    }
}

/// Render session snapshots until cancelled.
pub async fn task(
    mut snapshots: watch::Receiver<SessionSnapshot>,
    mut display: Box<dyn Display>,
    cancel: CancellationToken,
) {
    trace!("Display task started");

    display.render(&snapshots.borrow_and_update().clone());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                display.render(&snapshot);
            }
        }
    }

    trace!("Display task stopped");
}
