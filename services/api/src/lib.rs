//! Greenroom API Library Crate
//!
//! This library contains all the logic for the greenroom web service:
//! application state, env configuration, REST handlers, the WebSocket
//! session runtime, and routing. The `bin/api.rs` binary is a thin wrapper
//! around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
