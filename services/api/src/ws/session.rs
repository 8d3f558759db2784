//! Manages the WebSocket connection lifecycle for an interview session.

use super::{
    protocol::{ClientMessage, ServerMessage},
    provider::{self, SpeechEvent, SpeechHandle},
    turn,
};
use crate::state::AppState;
use anyhow::{Context, Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use greenroom_core::{
    conversation::ConversationEntry,
    feedback::{self, FeedbackReport},
    intake::InterviewConfig,
    interview::{self, Orchestrator},
    llm_client::OpenAICompatibleClient,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Pause between announcing the end of the interview and delivering the
/// feedback report.
const ENDING_DELAY: Duration = Duration::from_secs(2);

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Where the session is in its lifecycle. No state is re-enterable: a new
/// interview means a new connection with a fresh configuration. The
/// terminal ending phase is not a variant: completing or ending the
/// interview runs the finish sequence and exits the session loop.
enum SessionPhase {
    /// Configured, waiting for the first microphone activation.
    Starting,
    /// The interview is running.
    Active,
}

/// Main handler for an individual WebSocket connection.
///
/// Performs the `start` handshake to collect and validate the session
/// configuration, then runs the session loop until the interview ends or
/// the client disconnects.
#[instrument(name = "interview_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", session_id.to_string());
    info!("New WebSocket connection. Awaiting session start...");

    let (mut socket_tx, mut socket_rx) = socket.split();

    // The first message from the client must be `start`.
    let config = match await_start(&mut socket_rx).await {
        Ok(config) => config,
        Err(e) => {
            warn!("Session start failed: {e:#}");
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    if send_msg(&mut socket_tx, ServerMessage::Started { session_id })
        .await
        .is_err()
    {
        error!("Failed to send Started message to client.");
        return;
    }

    if let Err(e) = run_interview_session(state, socket_tx, socket_rx, config).await {
        error!(error = ?e, "Interview session terminated with error.");
    }
    info!("Interview session finished.");
}

/// Receives and validates the `start` message that opens every session.
async fn await_start(socket_rx: &mut SplitStream<WebSocket>) -> Result<InterviewConfig> {
    let ws_msg = socket_rx
        .next()
        .await
        .context("Client disconnected before starting the session")?
        .context("Error receiving the first message")?;

    let Message::Text(text) = ws_msg else {
        return Err(anyhow!("First message must be a text `start` message"));
    };
    let msg: ClientMessage = serde_json::from_str(&text).context("Malformed `start` message")?;
    let ClientMessage::Start { config } = msg else {
        return Err(anyhow!("First message must be `start`"));
    };

    config
        .validate()
        .map_err(|e| anyhow!("Invalid session setup: {e}"))?;

    // Over-limit documents are flagged, not rejected.
    let over_limit = config.over_limit_documents();
    if !over_limit.is_empty() {
        warn!(?over_limit, "Session documents exceed word limits");
    }

    Ok(config)
}

/// The main event loop for an active interview session.
///
/// Listens for client control messages and audio, and for events from the
/// speech provider task. Orchestrator turns are awaited inline, one at a
/// time: a final transcript that arrives mid-turn waits in the speech
/// event channel until the current turn resolves.
async fn run_interview_session(
    state: Arc<AppState>,
    mut socket_tx: SplitSink<WebSocket, Message>,
    mut socket_rx: SplitStream<WebSocket>,
    config: InterviewConfig,
) -> Result<()> {
    let openai_config = async_openai::config::OpenAIConfig::new()
        .with_api_key(&config.credentials.llm_key)
        .with_api_base(&state.config.openai_api_base);
    let chat = OpenAICompatibleClient::new(openai_config, state.config.chat_model.clone());
    let orchestrator = Orchestrator::default();

    let mut history: Vec<ConversationEntry> = Vec::new();
    let mut phase = SessionPhase::Starting;
    let mut speech: Option<SpeechHandle> = None;

    // The speech event channel outlives individual provider connections;
    // the session keeps one sender so `recv` stays live across restarts
    // of the listening stream.
    let (speech_tx, mut speech_rx) = mpsc::channel::<SpeechEvent>(64);

    loop {
        tokio::select! {
            // Handle messages from the client WebSocket.
            msg_option = socket_rx.next() => {
                let Some(msg_result) = msg_option else {
                    info!("Client stream ended. Shutting down session.");
                    break;
                };
                match msg_result {
                    Ok(Message::Text(text)) => {
                        let Ok(msg) = serde_json::from_str::<ClientMessage>(&text) else {
                            warn!("Ignoring malformed client message.");
                            continue;
                        };
                        match msg {
                            ClientMessage::Start { .. } => {
                                warn!("Ignoring duplicate `start` message.");
                            }
                            ClientMessage::StartListening => {
                                if speech.is_none() {
                                    speech = Some(provider::start_speech_stream(
                                        &state.config,
                                        config.credentials.speech_key.clone(),
                                        speech_tx.clone(),
                                    ));
                                }
                                if matches!(phase, SessionPhase::Starting) {
                                    phase = SessionPhase::Active;
                                    let entry =
                                        ConversationEntry::interviewer(interview::OPENING_QUESTION);
                                    history.push(entry.clone());
                                    send_msg(&mut socket_tx, ServerMessage::EntryAdded { entry })
                                        .await?;
                                }
                            }
                            ClientMessage::StopListening => {
                                if let Some(handle) = speech.take() {
                                    handle.task.abort();
                                    send_msg(&mut socket_tx, ServerMessage::SpeechClosed).await?;
                                }
                            }
                            ClientMessage::EndInterview => {
                                info!("Interview ended by the client; synthesizing feedback.");
                                let report = feedback::generate(&chat, &config, &history).await;
                                finish_session(&mut socket_tx, report, &history).await?;
                                break;
                            }
                        }
                    }
                    Ok(Message::Binary(data)) => {
                        if let Some(handle) = &speech {
                            if let Err(e) = handle.audio_tx.send(data).await {
                                error!("Failed to forward audio frame to provider task: {}", e);
                            }
                        } else {
                            warn!("Received audio data from client, but listening is not active.");
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("Client sent close frame. Shutting down session.");
                        break;
                    }
                    Ok(Message::Ping(_) | Message::Pong(_)) => {}
                    Err(e) => {
                        error!("Error receiving from client WebSocket: {:?}", e);
                        break;
                    }
                }
            },
            // Handle events from the speech provider task.
            Some(event) = speech_rx.recv() => {
                match event {
                    SpeechEvent::Connected => {
                        send_msg(&mut socket_tx, ServerMessage::SpeechConnected).await?;
                    }
                    SpeechEvent::Partial(text) => {
                        send_msg(&mut socket_tx, ServerMessage::PartialTranscript { text }).await?;
                    }
                    SpeechEvent::SpeechStarted => {
                        send_msg(&mut socket_tx, ServerMessage::SpeechStarted).await?;
                    }
                    SpeechEvent::UtteranceEnd => {
                        send_msg(&mut socket_tx, ServerMessage::UtteranceEnd).await?;
                    }
                    SpeechEvent::Final(transcript) => {
                        if !matches!(phase, SessionPhase::Active) {
                            warn!("Dropping final transcript outside the active phase.");
                            continue;
                        }
                        match turn::run_turn(
                            &orchestrator,
                            &chat,
                            &config,
                            &mut history,
                            &transcript,
                            &mut socket_tx,
                        )
                        .await
                        {
                            Ok(Some(report)) => {
                                finish_session(&mut socket_tx, report, &history).await?;
                                break;
                            }
                            Ok(None) => {}
                            Err(e) => {
                                error!(error = ?e, "Failed to produce the next question");
                                send_msg(
                                    &mut socket_tx,
                                    ServerMessage::Error {
                                        message:
                                            "Failed to continue interview. Please check your connection."
                                                .to_string(),
                                    },
                                )
                                .await?;
                            }
                        }
                    }
                    SpeechEvent::Closed => {
                        speech = None;
                        send_msg(&mut socket_tx, ServerMessage::SpeechClosed).await?;
                    }
                    SpeechEvent::Failed(message) => {
                        speech = None;
                        send_msg(&mut socket_tx, ServerMessage::Error { message }).await?;
                    }
                }
            },
            // If all channels close, exit the loop.
            else => break,
        }
    }

    // Clean up the provider task on exit.
    if let Some(handle) = speech.take() {
        handle.task.abort();
    }
    info!("WebSocket connection closed and interview session terminated.");
    Ok(())
}

/// Terminal sequence: announce the end, hold briefly, deliver the report.
async fn finish_session(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    feedback: FeedbackReport,
    history: &[ConversationEntry],
) -> Result<()> {
    send_msg(socket_tx, ServerMessage::Ending).await?;
    tokio::time::sleep(ENDING_DELAY).await;
    send_msg(
        socket_tx,
        ServerMessage::Completed {
            feedback,
            history: history.to_vec(),
        },
    )
    .await
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
