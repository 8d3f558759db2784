//! Drives one orchestrator turn for a finalized candidate transcript.

use super::{protocol::ServerMessage, session::send_msg};
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use greenroom_core::{
    conversation::ConversationEntry,
    feedback::FeedbackReport,
    intake::InterviewConfig,
    interview::{Orchestrator, TurnOutcome},
    llm_client::ChatClient,
};

/// Appends the candidate's utterance, asks the orchestrator for the next
/// step, and appends the resulting question.
///
/// The candidate entry is pushed and announced before the model call so
/// the client renders it immediately; the orchestrator receives the
/// history as it stood before this utterance, with the transcript passed
/// separately. Returns the feedback report when the interview completed,
/// `None` when it continues.
pub(super) async fn run_turn(
    orchestrator: &Orchestrator,
    chat: &dyn ChatClient,
    config: &InterviewConfig,
    history: &mut Vec<ConversationEntry>,
    transcript: &str,
    socket_tx: &mut SplitSink<WebSocket, Message>,
) -> Result<Option<FeedbackReport>> {
    let entry = ConversationEntry::candidate(transcript);
    history.push(entry.clone());
    send_msg(socket_tx, ServerMessage::EntryAdded { entry }).await?;

    let prior = &history[..history.len() - 1];
    let outcome = orchestrator
        .next_turn(chat, config, prior, transcript)
        .await?;

    match outcome {
        TurnOutcome::NextQuestion(question) => {
            let entry = ConversationEntry::interviewer(question);
            history.push(entry.clone());
            send_msg(socket_tx, ServerMessage::EntryAdded { entry }).await?;
            Ok(None)
        }
        TurnOutcome::Complete(report) => Ok(Some(report)),
    }
}
