//! Handles the streaming WebSocket connection to Deepgram for transcription.

use super::SpeechEvent;
use anyhow::{Context, Result};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message as WsMessage},
};
use tracing::{debug, info};

/// Audio format the client is expected to capture and stream: raw PCM16,
/// mono, 16 kHz. The listen URL advertises the same parameters upstream.
pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u32 = 1;

/// Builds the listen URL with interim results and endpoint detection on.
pub(super) fn listen_url(endpoint: &str, model: &str) -> String {
    format!(
        "{endpoint}?model={model}&language=en&smart_format=true&interim_results=true\
         &endpointing=true&encoding=linear16&sample_rate={SAMPLE_RATE}&channels={CHANNELS}"
    )
}

// Wire format of the events Deepgram sends over the listen socket. Only
// the variants the session cares about are modelled; everything else
// (e.g. `Metadata`) falls through to `Ignored`.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum StreamEvent {
    Results {
        #[serde(default)]
        channel: Option<Channel>,
        #[serde(default)]
        is_final: bool,
    },
    SpeechStarted,
    UtteranceEnd,
    #[serde(other)]
    Ignored,
}

#[derive(Deserialize, Debug, Default)]
struct Channel {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize, Debug)]
struct Alternative {
    transcript: String,
}

/// Runs the provider loop: relays audio frames upstream and turns the
/// provider's JSON events into [`SpeechEvent`]s until either side closes.
pub(super) async fn run(
    url: &str,
    speech_key: &str,
    mut audio_rx: mpsc::Receiver<Bytes>,
    events: mpsc::Sender<SpeechEvent>,
) -> Result<()> {
    let mut request = url
        .into_client_request()
        .context("Invalid speech endpoint URL")?;
    request
        .headers_mut()
        .insert("Authorization", format!("Token {speech_key}").parse()?);

    let (ws_stream, _) = connect_async(request)
        .await
        .context("Failed to connect to the speech recognition endpoint")?;
    info!("Connected to speech recognition stream.");
    let _ = events.send(SpeechEvent::Connected).await;

    let (mut upstream_tx, mut upstream_rx) = ws_stream.split();

    loop {
        tokio::select! {
            frame = audio_rx.recv() => match frame {
                Some(data) => {
                    upstream_tx
                        .send(WsMessage::Binary(data))
                        .await
                        .context("Failed to send audio frame upstream")?;
                }
                None => {
                    // The session dropped the audio sender; close cleanly.
                    let _ = upstream_tx.send(WsMessage::Close(None)).await;
                    let _ = events.send(SpeechEvent::Closed).await;
                    break;
                }
            },
            msg = upstream_rx.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => handle_event(&text, &events).await,
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Speech recognition stream closed by server.");
                    let _ = events.send(SpeechEvent::Closed).await;
                    break;
                }
                Some(Err(e)) => {
                    return Err(e).context("Error reading from the speech recognition stream");
                }
                _ => {}
            },
        }
    }

    Ok(())
}

async fn handle_event(text: &str, events: &mpsc::Sender<SpeechEvent>) {
    let event = match serde_json::from_str::<StreamEvent>(text) {
        Ok(event) => event,
        Err(_) => {
            debug!(raw = text, "Ignoring unparseable speech event");
            return;
        }
    };

    match event {
        StreamEvent::Results { channel, is_final } => {
            let transcript = channel
                .and_then(|c| c.alternatives.into_iter().next())
                .map(|alternative| alternative.transcript);
            if let Some(transcript) = transcript {
                let transcript = transcript.trim();
                if !transcript.is_empty() {
                    let event = if is_final {
                        SpeechEvent::Final(transcript.to_string())
                    } else {
                        SpeechEvent::Partial(transcript.to_string())
                    };
                    let _ = events.send(event).await;
                }
            }
        }
        StreamEvent::SpeechStarted => {
            let _ = events.send(SpeechEvent::SpeechStarted).await;
        }
        StreamEvent::UtteranceEnd => {
            let _ = events.send(SpeechEvent::UtteranceEnd).await;
        }
        StreamEvent::Ignored => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_url_parameters() {
        let url = listen_url("wss://api.deepgram.com/v1/listen", "nova-2-general");
        assert!(url.starts_with("wss://api.deepgram.com/v1/listen?model=nova-2-general&"));
        assert!(url.contains("interim_results=true"));
        assert!(url.contains("endpointing=true"));
        assert!(url.contains("smart_format=true"));
        assert!(url.contains("encoding=linear16"));
        assert!(url.contains("sample_rate=16000"));
        assert!(url.contains("channels=1"));
    }

    async fn events_for(raw: &str) -> Vec<SpeechEvent> {
        let (tx, mut rx) = mpsc::channel(8);
        handle_event(raw, &tx).await;
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_interim_result_becomes_partial() {
        let raw = r#"{
            "type": "Results",
            "channel": {"alternatives": [{"transcript": "hello wor", "confidence": 0.82}]},
            "is_final": false
        }"#;
        assert_eq!(
            events_for(raw).await,
            vec![SpeechEvent::Partial("hello wor".to_string())]
        );
    }

    #[tokio::test]
    async fn test_final_result_becomes_final() {
        let raw = r#"{
            "type": "Results",
            "channel": {"alternatives": [{"transcript": "hello world", "confidence": 0.97}]},
            "is_final": true
        }"#;
        assert_eq!(
            events_for(raw).await,
            vec![SpeechEvent::Final("hello world".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_transcript_is_dropped() {
        let raw = r#"{
            "type": "Results",
            "channel": {"alternatives": [{"transcript": "  "}]},
            "is_final": true
        }"#;
        assert!(events_for(raw).await.is_empty());
    }

    #[tokio::test]
    async fn test_speech_lifecycle_events() {
        let started = r#"{"type": "SpeechStarted", "timestamp": 1.25}"#;
        assert_eq!(events_for(started).await, vec![SpeechEvent::SpeechStarted]);

        let ended = r#"{"type": "UtteranceEnd", "last_word_end": 4.5}"#;
        assert_eq!(events_for(ended).await, vec![SpeechEvent::UtteranceEnd]);
    }

    #[tokio::test]
    async fn test_unknown_event_types_are_ignored() {
        let metadata = r#"{"type": "Metadata", "request_id": "abc"}"#;
        assert!(events_for(metadata).await.is_empty());

        let garbage = "not json at all";
        assert!(events_for(garbage).await.is_empty());
    }
}
