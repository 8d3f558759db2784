//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, TranscriptRequest, TurnRequest, TurnResponse},
    state::AppState,
    ws::ws_handler,
};
use greenroom_core::{
    conversation::{ConversationEntry, Speaker},
    feedback::{FeedbackReport, Improvement, Strength},
    intake::{Credentials, InterviewConfig},
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::interview_turn, handlers::export_transcript),
    components(schemas(
        TurnRequest,
        TurnResponse,
        TranscriptRequest,
        ErrorResponse,
        ConversationEntry,
        Speaker,
        Credentials,
        InterviewConfig,
        FeedbackReport,
        Strength,
        Improvement
    )),
    tags(
        (name = "greenroom API", description = "Mock-interview turns, feedback, and transcript export")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/interview", post(handlers::interview_turn))
        .route("/interview/transcript", post(handlers::export_transcript))
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
