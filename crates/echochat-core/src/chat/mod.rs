//! Chat orchestration for EchoChat.
//!
//! `ChatController` owns the active session and the cached session list,
//! and drives one send at a time through the synchronizer and an
//! inference client.

pub mod controller;
pub mod title;
