//! The interview conversation log.
//!
//! A session's history is an ordered, append-only list of
//! [`ConversationEntry`] values. Order is chronological and meaningful:
//! turn order drives prompting, and the transcript export reproduces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Who produced a conversation entry.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

impl Speaker {
    /// Uppercase label used in exported transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Speaker::Interviewer => "INTERVIEWER",
            Speaker::Candidate => "CANDIDATE",
        }
    }
}

// Lowercase form, matching the wire representation; used when rendering
// history into prompts.
impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "interviewer"),
            Speaker::Candidate => write!(f, "candidate"),
        }
    }
}

/// One turn of the interview, appended as it happens.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn interviewer(message: impl Into<String>) -> Self {
        Self::new(Speaker::Interviewer, message)
    }

    pub fn candidate(message: impl Into<String>) -> Self {
        Self::new(Speaker::Candidate, message)
    }
}

/// Renders the history as `speaker: message` lines for embedding in a
/// prompt.
pub fn render_history(history: &[ConversationEntry]) -> String {
    history
        .iter()
        .map(|entry| format!("{}: {}", entry.speaker, entry.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the history as a downloadable plain-text transcript.
///
/// One block per entry, `[HH:MM:SS] SPEAKER: message`, blocks separated by
/// a blank line.
pub fn format_transcript(history: &[ConversationEntry]) -> String {
    history
        .iter()
        .map(|entry| {
            format!(
                "[{}] {}: {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.speaker.label(),
                entry.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_at(speaker: Speaker, message: &str, secs: u32) -> ConversationEntry {
        ConversationEntry {
            speaker,
            message: message.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, secs).unwrap(),
        }
    }

    #[test]
    fn test_speaker_serialization_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&Speaker::Interviewer).unwrap(),
            "\"interviewer\""
        );
        assert_eq!(
            serde_json::to_string(&Speaker::Candidate).unwrap(),
            "\"candidate\""
        );

        let speaker: Speaker = serde_json::from_str("\"candidate\"").unwrap();
        assert_eq!(speaker, Speaker::Candidate);
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = entry_at(Speaker::Interviewer, "Tell me about yourself.", 0);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"interviewer\""));

        let deserialized: ConversationEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
    }

    #[test]
    fn test_render_history_lines() {
        let history = vec![
            entry_at(Speaker::Interviewer, "Why this role?", 0),
            entry_at(Speaker::Candidate, "I enjoy the domain.", 5),
        ];

        let rendered = render_history(&history);
        assert_eq!(
            rendered,
            "interviewer: Why this role?\ncandidate: I enjoy the domain."
        );
    }

    #[test]
    fn test_render_history_empty() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn test_transcript_block_per_entry() {
        let history = vec![
            entry_at(Speaker::Interviewer, "First question", 0),
            entry_at(Speaker::Candidate, "First answer", 10),
            entry_at(Speaker::Interviewer, "Second question", 20),
        ];

        let transcript = format_transcript(&history);
        let blocks: Vec<&str> = transcript.split("\n\n").collect();
        assert_eq!(blocks.len(), history.len());

        for (block, entry) in blocks.iter().zip(&history) {
            assert!(block.starts_with('['));
            assert!(block.contains(&format!("] {}: ", entry.speaker.label())));
            assert!(block.ends_with(entry.message.as_str()));
        }
    }

    #[test]
    fn test_transcript_timestamp_format() {
        let history = vec![entry_at(Speaker::Candidate, "hello", 7)];
        assert_eq!(format_transcript(&history), "[14:30:07] CANDIDATE: hello");
    }

    #[test]
    fn test_transcript_empty_history() {
        assert_eq!(format_transcript(&[]), "");
    }
}
