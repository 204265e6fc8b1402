//! Storage abstractions for EchoChat.
//!
//! Defines the durable key-value port that the local session store and
//! the identity provider persist through, plus an in-memory implementation.
//! The file-backed implementation lives in echochat-infra.

pub mod kv_store;
pub mod memory;
