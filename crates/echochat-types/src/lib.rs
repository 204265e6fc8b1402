//! Shared domain types for EchoChat.
//!
//! This crate contains the core domain types used across the workspace:
//! chat sessions and messages, the model catalog entry, device identity,
//! inference request/response shapes, configuration, sync status, and the
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod model;
pub mod sync;
