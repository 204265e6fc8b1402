//! Infrastructure layer for EchoChat.
//!
//! Concrete implementations of the ports defined in `echochat-core`:
//! a file-backed key-value store, the HTTP remote session gateway and the
//! HTTP inference client, plus configuration loading and data directory
//! resolution.

pub mod config;
pub mod llm;
pub mod remote;
pub mod storage;
