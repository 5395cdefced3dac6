//! Physical button producer.
//!
//! GPIO edge detection is a hardware collaborator; it delivers raw
//! [`ButtonEvent`]s on an mpsc channel. This task debounces them (a
//! minimum inter-press interval per button) and forwards the survivors
//! to the command router. The state machine never sees a bounce.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::alarm::router::{Command, CommandRouter};
use crate::tracing::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    Snooze,
    Dismiss,
}

/// Minimum-interval press filter.
///
/// The first press always passes; subsequent presses are suppressed
/// until `min_interval` has elapsed since the last accepted one.
#[derive(Debug)]
pub struct Debouncer {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    pub fn accept(&mut self) -> bool {
        let now = Instant::now();
        match self.last_accepted {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

/// Forward debounced button presses as commands until cancelled.
pub async fn task(
    mut events: mpsc::Receiver<ButtonEvent>,
    router: CommandRouter,
    debounce_interval: Duration,
    cancel: CancellationToken,
) {
    trace!("Button task started");

    let mut snooze_debounce = Debouncer::new(debounce_interval);
    let mut dismiss_debounce = Debouncer::new(debounce_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let (debounce, command) = match event {
                    ButtonEvent::Snooze => (&mut snooze_debounce, Command::Snooze),
                    ButtonEvent::Dismiss => (&mut dismiss_debounce, Command::Dismiss),
                };
                if debounce.accept() {
                    debug!(?event, "Button pressed");
                    router.submit(command).await;
                } else {
                    trace!(?event, "Button bounce suppressed");
                }
            }
        }
    }

    trace!("Button task stopped");
}

#[cfg(test)]
mod tests {
    use tokio::time;

    use super::*;

    // start_paused makes Instant::now() deterministic so the debounce
    // window can be stepped over exactly.

    #[tokio::test(start_paused = true)]
    async fn first_press_always_passes() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        assert!(debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn press_within_window_is_suppressed() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        assert!(debounce.accept());

        time::advance(Duration::from_millis(299)).await;
        assert!(!debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn press_after_window_passes() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        assert!(debounce.accept());

        time::advance(Duration::from_millis(300)).await;
        assert!(debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn suppressed_press_does_not_extend_the_window() {
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        assert!(debounce.accept());

        time::advance(Duration::from_millis(200)).await;
        assert!(!debounce.accept());

        time::advance(Duration::from_millis(100)).await;
        assert!(debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn task_forwards_debounced_presses() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(task(
            event_rx,
            CommandRouter::new(command_tx),
            Duration::from_millis(300),
            cancel.clone(),
        ));

        // Two rapid presses collapse to one command; buttons debounce
        // independently.
        event_tx.send(ButtonEvent::Snooze).await.unwrap();
        event_tx.send(ButtonEvent::Snooze).await.unwrap();
        event_tx.send(ButtonEvent::Dismiss).await.unwrap();
        drop(event_tx);
        handle.await.unwrap();

        assert_eq!(command_rx.recv().await, Some(Command::Snooze));
        assert_eq!(command_rx.recv().await, Some(Command::Dismiss));
        assert_eq!(command_rx.recv().await, None);
    }
}
