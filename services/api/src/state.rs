//! Shared Application State
//!
//! This module defines the `AppState` struct holding resources shared by
//! all handlers. greenroom keeps no store and no shared provider clients:
//! interview data lives only inside its session task, and LLM/speech
//! clients are built per session from client-supplied credentials.

use crate::config::Config;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}
