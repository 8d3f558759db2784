//! The dialogue orchestrator.
//!
//! Each finalized candidate transcript drives exactly one chat-completion
//! call. The model either supplies the next interview question or signals
//! termination with the completion sentinel; a hard cap on conversation
//! length forces termination regardless of what the model says.

use crate::conversation::{self, ConversationEntry, Speaker};
use crate::feedback::{self, FeedbackReport};
use crate::intake::InterviewConfig;
use crate::llm_client::{ChatClient, ChatRequest};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Out-of-band token the model must return, alone, to end the interview.
/// Matched by exact string equality on the trimmed response; a question
/// that merely contains it keeps the interview going.
pub const COMPLETION_SENTINEL: &str = "INTERVIEW_COMPLETE";

/// Hard ceiling on conversation length. Reaching it forces completion no
/// matter what the model answered.
pub const MAX_CONVERSATION_ENTRIES: usize = 20;

/// The fixed question that opens every interview.
pub const OPENING_QUESTION: &str = "Hello! Thank you for taking the time to interview with us \
    today. Let's start with a simple question: Can you tell me a bit about yourself and why \
    you're interested in this position?";

pub const QUESTION_TEMPERATURE: f32 = 0.7;
pub const QUESTION_MAX_TOKENS: u32 = 300;

/// Exchange-count boundaries for the interviewer's pacing guidance.
///
/// These are prompt configuration, not control flow: they decide which
/// pacing hint is rendered into the system prompt for the current turn.
#[derive(Debug, Clone, Copy)]
pub struct PhaseThresholds {
    /// Exchanges below this count are the opening phase.
    pub early: usize,
    /// Exchanges above this count are the closing phase.
    pub late: usize,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self { early: 3, late: 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewPhase {
    Early,
    Mid,
    Late,
}

impl PhaseThresholds {
    pub fn phase_of(&self, exchanges: usize) -> InterviewPhase {
        if exchanges < self.early {
            InterviewPhase::Early
        } else if exchanges <= self.late {
            InterviewPhase::Mid
        } else {
            InterviewPhase::Late
        }
    }
}

/// The result of one orchestrator turn.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The interview continues with this question.
    NextQuestion(String),
    /// The interview is over; the feedback report is the terminal artifact.
    Complete(FeedbackReport),
}

/// Drives the question/termination loop for a session.
#[derive(Debug, Default, Clone, Copy)]
pub struct Orchestrator {
    thresholds: PhaseThresholds,
}

impl Orchestrator {
    pub fn new(thresholds: PhaseThresholds) -> Self {
        Self { thresholds }
    }

    /// Runs one turn: one completion call for the finalized `transcript`
    /// against the accumulated `history` (which does not yet include the
    /// transcript itself).
    ///
    /// Completion is decided by the trimmed response equalling
    /// [`COMPLETION_SENTINEL`] or by `history` having reached
    /// [`MAX_CONVERSATION_ENTRIES`], whichever comes first. On completion
    /// the feedback synthesizer runs on the same history; otherwise the
    /// response text is the next question. Call errors and empty output
    /// propagate to the caller; there is no retry.
    pub async fn next_turn(
        &self,
        chat: &dyn ChatClient,
        config: &InterviewConfig,
        history: &[ConversationEntry],
        transcript: &str,
    ) -> Result<TurnOutcome> {
        let system = self.build_system_prompt(config, history, transcript);
        let user = format!(
            "Please provide your next interview question or end the interview if appropriate. \
             The candidate just said: \"{transcript}\""
        );

        let response = chat
            .complete(ChatRequest {
                system,
                user,
                temperature: QUESTION_TEMPERATURE,
                max_tokens: QUESTION_MAX_TOKENS,
            })
            .await
            .context("question completion failed")?;
        let answer = response.trim();

        if answer == COMPLETION_SENTINEL || history.len() >= MAX_CONVERSATION_ENTRIES {
            info!(
                entries = history.len(),
                by_sentinel = answer == COMPLETION_SENTINEL,
                "interview complete, synthesizing feedback"
            );
            let report = feedback::generate(chat, config, history).await;
            return Ok(TurnOutcome::Complete(report));
        }

        debug!(entries = history.len(), "next question generated");
        Ok(TurnOutcome::NextQuestion(answer.to_string()))
    }

    fn build_system_prompt(
        &self,
        config: &InterviewConfig,
        history: &[ConversationEntry],
        transcript: &str,
    ) -> String {
        let exchanges = history
            .iter()
            .filter(|entry| entry.speaker == Speaker::Candidate)
            .count();
        let pacing = self.pacing_guidance(exchanges);

        let cover_letter_section = config
            .cover_letter
            .as_deref()
            .map(|text| format!("Cover Letter:\n{text}\n\n"))
            .unwrap_or_default();

        format!(
            r#"You are a professional job interviewer conducting a mock interview. Your role is to:

1. Ask relevant questions based on the job description and candidate's resume
2. Follow up on the candidate's responses with appropriate probing questions
3. Maintain a professional but friendly tone
4. Keep the interview flowing naturally
5. End the interview after 8-12 meaningful exchanges
6. Focus on behavioral, technical, and situational questions appropriate for the role

Job Description:
{job_description}

Candidate's Resume:
{resume}

{cover_letter_section}Current conversation:
{conversation}

Candidate's latest response: {transcript}

Instructions:
- {pacing}
- If you determine the interview should end (after sufficient questions), respond with exactly: "{sentinel}"
- Otherwise, provide your next interview question as a natural response
- Keep questions focused and professional
- Avoid yes/no questions; ask open-ended questions that encourage detailed responses"#,
            job_description = config.job_description,
            resume = config.resume,
            cover_letter_section = cover_letter_section,
            conversation = conversation::render_history(history),
            transcript = transcript,
            pacing = pacing,
            sentinel = COMPLETION_SENTINEL,
        )
    }

    fn pacing_guidance(&self, exchanges: usize) -> String {
        match self.thresholds.phase_of(exchanges) {
            InterviewPhase::Early => format!(
                "This is early in the interview (fewer than {} exchanges so far): ask foundational questions",
                self.thresholds.early
            ),
            InterviewPhase::Mid => format!(
                "This is mid-interview ({}-{} exchanges so far): dive deeper into skills, experience, and scenarios",
                self.thresholds.early, self.thresholds.late
            ),
            InterviewPhase::Late => format!(
                "This is late in the interview ({}+ exchanges so far): ask closing questions and prepare to end",
                self.thresholds.late
            ),
        }
    }
}
