//! Axum Handlers for the REST API
//!
//! The interview-turn endpoint and the transcript export. Uses `utoipa`
//! doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use greenroom_core::{
    conversation,
    intake::InterviewConfig,
    interview::{Orchestrator, TurnOutcome},
    llm_client::OpenAICompatibleClient,
};
use std::sync::Arc;
use tracing::error;

use crate::{
    models::{ErrorResponse, TranscriptRequest, TurnRequest, TurnResponse},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Builds the per-request chat client from the caller's LLM credential.
fn chat_client_for(state: &AppState, llm_key: &str) -> OpenAICompatibleClient {
    let openai_config = async_openai::config::OpenAIConfig::new()
        .with_api_key(llm_key)
        .with_api_base(&state.config.openai_api_base);
    OpenAICompatibleClient::new(openai_config, state.config.chat_model.clone())
}

/// Run one interview turn: next question or terminal feedback.
#[utoipa::path(
    post,
    path = "/interview",
    request_body = TurnRequest,
    responses(
        (status = 200, description = "Next question or terminal feedback", body = TurnResponse),
        (status = 400, description = "Missing transcript or credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn interview_turn(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    if payload.transcript.trim().is_empty() || payload.credentials.llm_key.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let config = InterviewConfig {
        job_description: payload.job_description,
        resume: payload.resume,
        cover_letter: payload.cover_letter,
        credentials: payload.credentials,
    };
    let chat = chat_client_for(&state, &config.credentials.llm_key);

    let outcome = Orchestrator::default()
        .next_turn(
            &chat,
            &config,
            &payload.conversation_history,
            &payload.transcript,
        )
        .await?;

    let response = match outcome {
        TurnOutcome::NextQuestion(question) => TurnResponse::question(question),
        TurnOutcome::Complete(feedback) => TurnResponse::complete(feedback),
    };
    Ok(Json(response))
}

/// Export the conversation as a plain-text transcript download.
#[utoipa::path(
    post,
    path = "/interview/transcript",
    request_body = TranscriptRequest,
    responses(
        (status = 200, description = "Plain-text transcript attachment", body = String, content_type = "text/plain")
    )
)]
pub async fn export_transcript(Json(payload): Json<TranscriptRequest>) -> Response {
    let body = conversation::format_transcript(&payload.conversation_history);
    let filename = format!("interview-transcript-{}.txt", Utc::now().format("%Y-%m-%d"));

    (
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
