//! Core domain logic for the greenroom mock-interview service.
//!
//! This crate has no HTTP or WebSocket surface. It holds the conversation
//! log, document intake rules, the dialogue orchestrator that drives the
//! interviewer, the feedback synthesizer, and the chat-completion client
//! abstraction. The `services/api` crate wires these into a web service.

pub mod conversation;
pub mod feedback;
pub mod intake;
pub mod interview;
pub mod llm_client;
