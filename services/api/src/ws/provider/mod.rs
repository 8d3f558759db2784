//! Manages the streaming connection to the speech-recognition provider.
//!
//! A session that is listening owns one provider task. Audio frames flow
//! in over an mpsc channel; transcription events flow back to the session
//! loop as explicit [`SpeechEvent`] variants rather than callbacks.

pub mod deepgram;

use crate::config::Config;
use bytes::Bytes;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::error;

/// An event surfaced by the active speech recognition stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// The upstream connection is established.
    Connected,
    /// An interim hypothesis for the current utterance.
    Partial(String),
    /// A finalized transcript for a completed utterance.
    Final(String),
    /// The provider detected the start of speech.
    SpeechStarted,
    /// The provider detected the end of an utterance.
    UtteranceEnd,
    /// The upstream connection closed normally.
    Closed,
    /// The stream failed; the session must be restarted by the user.
    Failed(String),
}

/// Handle to a running speech provider task.
pub(crate) struct SpeechHandle {
    /// Raw PCM16 audio frames to relay upstream.
    pub audio_tx: mpsc::Sender<Bytes>,
    pub task: JoinHandle<()>,
}

/// Spawns the speech provider task for one listening interval.
///
/// Events are delivered on `events`; the returned handle feeds audio in
/// and aborts the task on teardown. A connection or stream failure is
/// reported as [`SpeechEvent::Failed`]; there is no automatic reconnect.
pub(crate) fn start_speech_stream(
    config: &Config,
    speech_key: String,
    events: mpsc::Sender<SpeechEvent>,
) -> SpeechHandle {
    let (audio_tx, audio_rx) = mpsc::channel::<Bytes>(128);
    let url = deepgram::listen_url(&config.speech_endpoint, &config.speech_model);

    let task = tokio::spawn(async move {
        if let Err(e) = deepgram::run(&url, &speech_key, audio_rx, events.clone()).await {
            error!(error = ?e, "Speech provider task failed");
            let _ = events
                .send(SpeechEvent::Failed(format!(
                    "Speech recognition connection failed: {e}"
                )))
                .await;
        }
    });

    SpeechHandle { audio_tx, task }
}
