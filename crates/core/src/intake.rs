//! Document and credential intake for a new interview session.
//!
//! Setup collects three free-text documents and three third-party API keys.
//! Word limits are configuration data on the field kind; exceeding a limit
//! flags the field but does not reject it, while missing required fields
//! block the session from starting.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Third-party API keys supplied by the client for the duration of one
/// session. Held in memory only and dropped with the session.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Key for the speech-recognition streaming endpoint.
    pub speech_key: String,
    /// Key for a text-to-speech provider. Collected for setup parity but
    /// currently unused: no TTS call is made anywhere in the service.
    pub tts_key: String,
    /// Key for the chat-completion endpoint.
    pub llm_key: String,
}

/// Everything the session needs, immutable once setup completes.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfig {
    pub job_description: String,
    pub resume: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub credentials: Credentials,
}

/// The free-text documents collected during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    JobDescription,
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Per-field word ceiling for the over-limit indicator.
    pub fn word_limit(self) -> usize {
        match self {
            DocumentKind::JobDescription => 650,
            DocumentKind::Resume => 500,
            DocumentKind::CoverLetter => 400,
        }
    }

    pub fn required(self) -> bool {
        !matches!(self, DocumentKind::CoverLetter)
    }

    /// Whether the given text exceeds this field's word limit.
    pub fn over_limit(self, text: &str) -> bool {
        word_count(text) > self.word_limit()
    }
}

/// Counts whitespace-separated words; empty or whitespace-only text is 0.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("a job description is required")]
    MissingJobDescription,
    #[error("a resume is required")]
    MissingResume,
    #[error("missing API credential: {0}")]
    MissingCredential(&'static str),
}

impl InterviewConfig {
    /// Presence validation: required documents and all three credentials.
    ///
    /// Word limits are deliberately not enforced here; over-limit documents
    /// are reported by [`InterviewConfig::over_limit_documents`] instead.
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.job_description.trim().is_empty() {
            return Err(IntakeError::MissingJobDescription);
        }
        if self.resume.trim().is_empty() {
            return Err(IntakeError::MissingResume);
        }
        if self.credentials.speech_key.trim().is_empty() {
            return Err(IntakeError::MissingCredential("speech"));
        }
        if self.credentials.tts_key.trim().is_empty() {
            return Err(IntakeError::MissingCredential("tts"));
        }
        if self.credentials.llm_key.trim().is_empty() {
            return Err(IntakeError::MissingCredential("llm"));
        }
        Ok(())
    }

    /// Which documents currently exceed their word limits.
    pub fn over_limit_documents(&self) -> Vec<DocumentKind> {
        let mut over = Vec::new();
        if DocumentKind::JobDescription.over_limit(&self.job_description) {
            over.push(DocumentKind::JobDescription);
        }
        if DocumentKind::Resume.over_limit(&self.resume) {
            over.push(DocumentKind::Resume);
        }
        if let Some(cover_letter) = &self.cover_letter {
            if DocumentKind::CoverLetter.over_limit(cover_letter) {
                over.push(DocumentKind::CoverLetter);
            }
        }
        over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> InterviewConfig {
        InterviewConfig {
            job_description: "Senior engineer building storage systems".to_string(),
            resume: "Ten years of systems programming".to_string(),
            cover_letter: None,
            credentials: Credentials {
                speech_key: "dg-key".to_string(),
                tts_key: "tts-key".to_string(),
                llm_key: "sk-key".to_string(),
            },
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("two  words"), 2);
        assert_eq!(word_count("  leading and trailing  "), 3);
    }

    #[test]
    fn test_over_limit_strictly_above() {
        let kind = DocumentKind::Resume;
        assert!(!kind.over_limit(&words(kind.word_limit() - 1)));
        assert!(!kind.over_limit(&words(kind.word_limit())));
        assert!(kind.over_limit(&words(kind.word_limit() + 1)));
    }

    #[test]
    fn test_word_limits_per_field() {
        assert_eq!(DocumentKind::JobDescription.word_limit(), 650);
        assert_eq!(DocumentKind::Resume.word_limit(), 500);
        assert_eq!(DocumentKind::CoverLetter.word_limit(), 400);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert_eq!(valid_config().validate(), Ok(()));
    }

    #[test]
    fn test_validate_cover_letter_optional() {
        let mut config = valid_config();
        config.cover_letter = None;
        assert_eq!(config.validate(), Ok(()));

        config.cover_letter = Some("I am excited about this role.".to_string());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_missing_documents() {
        let mut config = valid_config();
        config.job_description = "   ".to_string();
        assert_eq!(config.validate(), Err(IntakeError::MissingJobDescription));

        let mut config = valid_config();
        config.resume = String::new();
        assert_eq!(config.validate(), Err(IntakeError::MissingResume));
    }

    #[test]
    fn test_validate_rejects_each_missing_credential() {
        let mut config = valid_config();
        config.credentials.speech_key = String::new();
        assert_eq!(
            config.validate(),
            Err(IntakeError::MissingCredential("speech"))
        );

        let mut config = valid_config();
        config.credentials.tts_key = String::new();
        assert_eq!(config.validate(), Err(IntakeError::MissingCredential("tts")));

        let mut config = valid_config();
        config.credentials.llm_key = String::new();
        assert_eq!(config.validate(), Err(IntakeError::MissingCredential("llm")));
    }

    #[test]
    fn test_over_limit_documents_reports_flagged_fields() {
        let mut config = valid_config();
        assert!(config.over_limit_documents().is_empty());

        config.resume = words(501);
        config.cover_letter = Some(words(401));
        assert_eq!(
            config.over_limit_documents(),
            vec![DocumentKind::Resume, DocumentKind::CoverLetter]
        );
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let json = r#"{
            "jobDescription": "Build things",
            "resume": "Built things",
            "coverLetter": "Please hire me",
            "credentials": {
                "speechKey": "a",
                "ttsKey": "b",
                "llmKey": "c"
            }
        }"#;

        let config: InterviewConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.job_description, "Build things");
        assert_eq!(config.cover_letter.as_deref(), Some("Please hire me"));
        assert_eq!(config.credentials.llm_key, "c");
    }
}
