//! WebSocket Session Management
//!
//! This module contains the core logic for running live interview sessions
//! over WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle, from handshake to termination.
//! - `turn`: Runs one orchestrator turn per finalized candidate transcript.
//! - `provider`: Handles the streaming connection to the speech-recognition provider.

pub mod protocol;
mod provider;
pub mod session;
mod turn;

pub use session::ws_handler;
