//! Audio sink collaborator.
//!
//! The session task emits [`SideEffect`] intents into an mpsc channel;
//! this task forwards them to whichever [`AudioSink`] was selected at
//! construction. Sink failures are logged and dropped: the session state
//! stays authoritative even when the audio device misbehaves, so a later
//! stop intent still silences whatever did start.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::alarm::session::SideEffect;
use crate::tracing::prelude::*;

pub trait AudioSink: Send {
    /// Begin looping playback of the referenced sound.
    fn start(&mut self, sound_reference: &str) -> anyhow::Result<()>;

    /// Stop playback. Stopping while nothing plays is fine.
    fn stop(&mut self) -> anyhow::Result<()>;
}

/// Sink that only logs, for development hosts without an audio device.
pub struct ConsoleAudioSink;

impl AudioSink for ConsoleAudioSink {
    fn start(&mut self, sound_reference: &str) -> anyhow::Result<()> {
        info!(sound = %sound_reference, "AUDIO START");
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        info!("AUDIO STOP");
        Ok(())
    }
}

/// Forward side-effect intents to the sink until cancelled.
pub async fn task(
    mut effects: mpsc::Receiver<SideEffect>,
    mut sink: Box<dyn AudioSink>,
    cancel: CancellationToken,
) {
    trace!("Audio task started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            }
            effect = effects.recv() => {
                let Some(effect) = effect else { break };
                let result = match &effect {
                    SideEffect::StartAudio { sound_reference } => sink.start(sound_reference),
                    SideEffect::StopAudio => sink.stop(),
                };
                if let Err(err) = result {
                    error!(?effect, %err, "Audio sink failed");
                }
            }
        }
    }

    trace!("Audio task stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl AudioSink for RecordingSink {
        fn start(&mut self, sound_reference: &str) -> anyhow::Result<()> {
            self.calls.lock().push(format!("start:{sound_reference}"));
            Ok(())
        }

        fn stop(&mut self) -> anyhow::Result<()> {
            self.calls.lock().push("stop".into());
            Ok(())
        }
    }

    struct FailingSink;

    impl AudioSink for FailingSink {
        fn start(&mut self, _sound_reference: &str) -> anyhow::Result<()> {
            anyhow::bail!("device unavailable")
        }

        fn stop(&mut self) -> anyhow::Result<()> {
            anyhow::bail!("device unavailable")
        }
    }

    #[tokio::test]
    async fn forwards_intents_in_order() {
        let sink = RecordingSink::default();
        let calls = sink.calls.clone();
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(task(rx, Box::new(sink), cancel.clone()));

        tx.send(SideEffect::StartAudio {
            sound_reference: "chime.mp3".into(),
        })
        .await
        .unwrap();
        tx.send(SideEffect::StopAudio).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*calls.lock(), vec!["start:chime.mp3", "stop"]);
    }

    #[tokio::test]
    async fn sink_failure_does_not_stop_the_task() {
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(task(rx, Box::new(FailingSink), cancel.clone()));

        tx.send(SideEffect::StartAudio {
            sound_reference: "chime.mp3".into(),
        })
        .await
        .unwrap();
        tx.send(SideEffect::StopAudio).await.unwrap();
        drop(tx);

        // Task drains the queue and exits cleanly despite the failures.
        handle.await.unwrap();
    }
}
