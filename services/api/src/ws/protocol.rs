//! Defines the WebSocket message protocol between the browser client and the API server.
//!
//! Text frames carry the JSON messages below, tagged by `type`. Binary
//! frames from the client carry raw PCM16 microphone audio (mono, 16 kHz)
//! and are relayed to the speech provider while listening is active.

use greenroom_core::{
    conversation::ConversationEntry, feedback::FeedbackReport, intake::InterviewConfig,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Configures the session. This must be the first message.
    Start { config: InterviewConfig },
    /// Opens the speech recognition stream; the first activation also
    /// starts the interview.
    StartListening,
    /// Closes the speech recognition stream. A no-op if not listening.
    StopListening,
    /// Ends the interview early and requests feedback.
    EndInterview,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the session is configured and ready.
    Started { session_id: Uuid },
    /// The speech recognition stream is connected.
    SpeechConnected,
    /// The speech recognition stream has closed.
    SpeechClosed,
    /// An interim transcription hypothesis, superseded by the next update.
    PartialTranscript { text: String },
    /// The candidate has started speaking.
    SpeechStarted,
    /// The candidate's utterance has ended.
    UtteranceEnd,
    /// A finalized entry was appended to the conversation.
    EntryAdded { entry: ConversationEntry },
    /// The interview is over; the feedback report follows shortly.
    Ending,
    /// The terminal feedback report and the full conversation.
    Completed {
        feedback: FeedbackReport,
        history: Vec<ConversationEntry>,
    },
    /// Reports an error to the client.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_start_message_parses() {
        let json = r#"{
            "type": "start",
            "config": {
                "jobDescription": "JD",
                "resume": "CV",
                "credentials": {"speechKey": "a", "ttsKey": "b", "llmKey": "c"}
            }
        }"#;

        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Start { config } => assert_eq!(config.resume, "CV"),
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn test_client_control_messages_parse() {
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type": "start_listening"}"#).unwrap(),
            ClientMessage::StartListening
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type": "stop_listening"}"#).unwrap(),
            ClientMessage::StopListening
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type": "end_interview"}"#).unwrap(),
            ClientMessage::EndInterview
        ));
    }

    #[test]
    fn test_client_unknown_type_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "mystery"}"#).is_err());
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let msg = ServerMessage::PartialTranscript {
            text: "so far".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"partial_transcript","text":"so far"}"#
        );

        let msg = ServerMessage::Error {
            message: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"error","message":"boom"}"#
        );
    }

    #[test]
    fn test_server_entry_added_carries_entry() {
        let entry = ConversationEntry::interviewer("Why here?");
        let json = serde_json::to_string(&ServerMessage::EntryAdded { entry }).unwrap();
        assert!(json.starts_with(r#"{"type":"entry_added","entry":"#));
        assert!(json.contains(r#""speaker":"interviewer""#));
    }
}
