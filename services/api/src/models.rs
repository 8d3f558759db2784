//! REST API Models
//!
//! Wire-level request and response bodies for the interview endpoints.
//! Field names are camelCase to match the browser client's payloads; the
//! domain types they carry live in `greenroom-core`.

use greenroom_core::conversation::ConversationEntry;
use greenroom_core::feedback::FeedbackReport;
use greenroom_core::intake::Credentials;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for one orchestrator turn.
#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// The candidate's finalized transcript for this turn.
    pub transcript: String,
    /// Prior conversation, oldest first. Does not include `transcript`.
    #[serde(default)]
    pub conversation_history: Vec<ConversationEntry>,
    pub job_description: String,
    pub resume: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub credentials: Credentials,
}

/// Response body for one orchestrator turn: either the next question or the
/// terminal feedback report.
#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackReport>,
}

impl TurnResponse {
    pub fn question(question: String) -> Self {
        Self {
            is_complete: false,
            question: Some(question),
            feedback: None,
        }
    }

    pub fn complete(feedback: FeedbackReport) -> Self {
        Self {
            is_complete: true,
            question: None,
            feedback: Some(feedback),
        }
    }
}

/// Request body for the transcript export endpoint.
#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    #[serde(default)]
    pub conversation_history: Vec<ConversationEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenroom_core::feedback::{Improvement, Strength};

    #[test]
    fn test_turn_request_deserializes_client_payload() {
        let json = r#"{
            "transcript": "I led the migration to Rust.",
            "conversationHistory": [
                {"speaker": "interviewer", "message": "Tell me about a project.", "timestamp": "2024-03-01T14:30:00Z"}
            ],
            "jobDescription": "Backend engineer",
            "resume": "Ten years of experience",
            "coverLetter": "Excited to apply",
            "credentials": {"speechKey": "a", "ttsKey": "b", "llmKey": "c"}
        }"#;

        let request: TurnRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.transcript, "I led the migration to Rust.");
        assert_eq!(request.conversation_history.len(), 1);
        assert_eq!(request.cover_letter.as_deref(), Some("Excited to apply"));
        assert_eq!(request.credentials.speech_key, "a");
    }

    #[test]
    fn test_turn_request_optional_fields_default() {
        let json = r#"{
            "transcript": "Hello",
            "jobDescription": "JD",
            "resume": "CV",
            "credentials": {"speechKey": "a", "ttsKey": "b", "llmKey": "c"}
        }"#;

        let request: TurnRequest = serde_json::from_str(json).unwrap();
        assert!(request.conversation_history.is_empty());
        assert!(request.cover_letter.is_none());
    }

    #[test]
    fn test_question_response_shape() {
        let response = TurnResponse::question("Why this company?".to_string());
        let json = serde_json::to_string(&response).unwrap();

        assert_eq!(
            json,
            r#"{"isComplete":false,"question":"Why this company?"}"#
        );
    }

    #[test]
    fn test_complete_response_shape() {
        let report = FeedbackReport {
            strengths: vec![Strength {
                title: "S".to_string(),
                description: "d".to_string(),
                moment: "m".to_string(),
            }],
            improvements: vec![Improvement {
                title: "I".to_string(),
                description: "d".to_string(),
                suggestion: "s".to_string(),
            }],
        };

        let json = serde_json::to_string(&TurnResponse::complete(report)).unwrap();
        assert!(json.starts_with(r#"{"isComplete":true,"feedback":"#));
        assert!(!json.contains("\"question\""));
        assert!(json.contains("\"strengths\""));
        assert!(json.contains("\"improvements\""));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Missing required fields".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"message":"Missing required fields"}"#
        );
    }
}
