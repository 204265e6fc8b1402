//! Storage adapters for EchoChat.

pub mod file_store;
