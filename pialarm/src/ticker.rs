//! Periodic tick producer.
//!
//! Reads the clock and submits a `Tick` command on a fixed interval.
//! The interval must stay below one minute: the trigger evaluator
//! matches minute-exact, so a slower ticker can skip past an alarm's
//! minute entirely.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::alarm::router::CommandRouter;
use crate::clock::ClockSource;
use crate::tracing::prelude::*;

pub async fn task(
    clock: Arc<dyn ClockSource>,
    router: CommandRouter,
    period: Duration,
    cancel: CancellationToken,
) {
    trace!("Ticker started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            _ = interval.tick() => {
                router.tick(clock.now()).await;
            }
        }
    }

    trace!("Ticker stopped");
}
