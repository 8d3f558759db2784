//! Feedback synthesis for a finished interview.
//!
//! One chat-completion call turns the full conversation into a structured
//! report. Any failure along the way (transport error, empty output,
//! unparseable JSON) is replaced by a fixed fallback report so the session
//! always reaches a terminal feedback state.

use crate::conversation::{self, ConversationEntry};
use crate::intake::InterviewConfig;
use crate::llm_client::{ChatClient, ChatRequest};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

pub const FEEDBACK_TEMPERATURE: f32 = 0.3;
pub const FEEDBACK_MAX_TOKENS: u32 = 1000;

/// Something the candidate did well, anchored to a moment in the interview.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Strength {
    pub title: String,
    pub description: String,
    /// A literal quote or moment from the conversation supporting the point.
    pub moment: String,
}

/// An area to work on, with actionable advice.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Improvement {
    pub title: String,
    pub description: String,
    pub suggestion: String,
}

/// The terminal artifact of a session. Produced exactly once.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct FeedbackReport {
    pub strengths: Vec<Strength>,
    pub improvements: Vec<Improvement>,
}

impl FeedbackReport {
    /// The fixed report used when feedback generation fails. Always carries
    /// one item per list so the feedback screen is never empty.
    pub fn fallback() -> Self {
        Self {
            strengths: vec![Strength {
                title: "Participated in Mock Interview".to_string(),
                description:
                    "You completed the interview process and engaged with the questions"
                        .to_string(),
                moment: "Throughout the interview session".to_string(),
            }],
            improvements: vec![Improvement {
                title: "Continue Practicing".to_string(),
                description: "Regular practice helps improve interview performance".to_string(),
                suggestion:
                    "Schedule regular mock interviews to build confidence and refine your responses"
                        .to_string(),
            }],
        }
    }
}

fn build_feedback_prompt(config: &InterviewConfig, history: &[ConversationEntry]) -> String {
    let cover_letter_section = config
        .cover_letter
        .as_deref()
        .map(|text| format!("Cover Letter:\n{text}\n\n"))
        .unwrap_or_default();

    format!(
        r#"As an expert interview coach, analyze this mock interview and provide constructive feedback. Focus on specific moments and actionable advice.

Job Description:
{job_description}

Candidate's Resume:
{resume}

{cover_letter_section}Interview Conversation:
{conversation}

Please provide feedback in the following JSON format:
{{
  "strengths": [
    {{
      "title": "Strength title",
      "description": "What they did well",
      "moment": "Specific quote or moment from the interview"
    }}
  ],
  "improvements": [
    {{
      "title": "Area for improvement",
      "description": "What could be better",
      "suggestion": "Specific actionable advice"
    }}
  ]
}}

Focus on:
- Communication clarity and structure
- Specific examples and evidence provided
- Alignment with job requirements
- Professional presence and confidence
- Areas where responses could be strengthened

Provide 2-4 items in each category. Be specific and reference actual moments from the conversation."#,
        job_description = config.job_description,
        resume = config.resume,
        cover_letter_section = cover_letter_section,
        conversation = conversation::render_history(history),
    )
}

/// Parses the model's output into a report.
///
/// Models frequently wrap the JSON object in a code fence or surrounding
/// prose, so when a direct parse fails the outermost `{...}` region is
/// extracted and tried once more. A report with an empty list on either
/// side is treated as malformed.
pub fn parse_report(text: &str) -> Result<FeedbackReport> {
    let report: FeedbackReport = match serde_json::from_str(text) {
        Ok(report) => report,
        Err(_) => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str(&text[start..=end]).context("malformed feedback JSON")?
            }
            _ => anyhow::bail!("no JSON object in feedback output"),
        },
    };

    if report.strengths.is_empty() || report.improvements.is_empty() {
        anyhow::bail!("feedback report is missing strengths or improvements");
    }
    Ok(report)
}

async fn try_generate(
    chat: &dyn ChatClient,
    config: &InterviewConfig,
    history: &[ConversationEntry],
) -> Result<FeedbackReport> {
    let response = chat
        .complete(ChatRequest {
            system: "You are an expert interview coach providing detailed, constructive feedback."
                .to_string(),
            user: build_feedback_prompt(config, history),
            temperature: FEEDBACK_TEMPERATURE,
            max_tokens: FEEDBACK_MAX_TOKENS,
        })
        .await
        .context("feedback completion failed")?;

    parse_report(&response)
}

/// Produces the feedback report for a finished interview.
///
/// Infallible by contract: any failure is logged and replaced by
/// [`FeedbackReport::fallback`].
pub async fn generate(
    chat: &dyn ChatClient,
    config: &InterviewConfig,
    history: &[ConversationEntry],
) -> FeedbackReport {
    match try_generate(chat, config, history).await {
        Ok(report) => report,
        Err(error) => {
            warn!(?error, "feedback generation failed, using fallback report");
            FeedbackReport::fallback()
        }
    }
}
