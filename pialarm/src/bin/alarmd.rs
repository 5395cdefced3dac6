//! PiAlarm daemon.
//!
//! Wires the scheduling core to its collaborators and runs until
//! SIGINT: a session task consuming the command queue, a periodic
//! ticker, the debounced button producer, the audio and display sinks,
//! and the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use pialarm::alarm::router::{CommandRouter, SessionTask};
use pialarm::alarm::session::AlarmSession;
use pialarm::api::{self, SharedState};
use pialarm::audio::{self, ConsoleAudioSink};
use pialarm::buttons;
use pialarm::clock::{ClockSource, SystemClock};
use pialarm::config::Config;
use pialarm::display::{self, ConsoleDisplay};
use pialarm::store::{AlarmStore, JsonFileStore};
use pialarm::ticker;
use pialarm::tracing::prelude::*;

const COMMAND_QUEUE_DEPTH: usize = 64;
const EFFECT_QUEUE_DEPTH: usize = 16;
const BUTTON_QUEUE_DEPTH: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    pialarm::tracing::init();

    let config_path = std::env::var("PIALARM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = Config::load(&config_path)?;

    let clock: Arc<dyn ClockSource> = match config.utc_offset() {
        Some(offset) => Arc::new(SystemClock::new(offset)),
        None => Arc::new(SystemClock::local()),
    };
    let store: Arc<dyn AlarmStore> = Arc::new(JsonFileStore::open(&config.alarms_file).await?);

    let session = AlarmSession::new(config.session_config());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (effect_tx, effect_rx) = mpsc::channel(EFFECT_QUEUE_DEPTH);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let commands = CommandRouter::new(command_tx);

    let session_task = SessionTask::new(
        session,
        store.clone(),
        clock.clone(),
        command_rx,
        effect_tx,
        snapshot_tx,
    );

    // The GPIO collaborator plugs raw presses into this channel; held
    // open for the process lifetime so the button task keeps running on
    // hosts without hardware attached.
    let (_button_tx, button_rx) = mpsc::channel(BUTTON_QUEUE_DEPTH);

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    tasks.push(tokio::spawn(session_task.run(cancel.clone())));
    tasks.push(tokio::spawn(audio::task(
        effect_rx,
        Box::new(ConsoleAudioSink),
        cancel.clone(),
    )));
    tasks.push(tokio::spawn(display::task(
        snapshot_rx.clone(),
        Box::new(ConsoleDisplay),
        cancel.clone(),
    )));
    tasks.push(tokio::spawn(buttons::task(
        button_rx,
        commands.clone(),
        Duration::from_millis(config.button_debounce_ms),
        cancel.clone(),
    )));
    tasks.push(tokio::spawn(ticker::task(
        clock.clone(),
        commands.clone(),
        Duration::from_secs(config.tick_interval_secs),
        cancel.clone(),
    )));

    let api_state = SharedState {
        commands: commands.clone(),
        store: store.clone(),
        clock: clock.clone(),
        snapshot_rx,
    };
    let mut server = tokio::spawn(api::serve(api_state, config.web_port, cancel.clone()));

    info!("PiAlarm running");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            cancel.cancel();
            server.await??;
        }
        result = &mut server => {
            error!("API server exited unexpectedly");
            cancel.cancel();
            result??;
        }
    }

    for task in tasks {
        task.await?;
    }

    info!("PiAlarm stopped");
    Ok(())
}
