//! Session synchronization, chat orchestration and port traits for EchoChat.
//!
//! This crate defines the "ports" (storage, remote gateway and inference
//! traits) that the infrastructure layer implements, together with the
//! algorithms that drive them: the local session store, the device
//! identity provider, the session synchronizer and the chat controller.
//! It depends only on `echochat-types` -- never on `echochat-infra` or any
//! HTTP/filesystem crate.

pub mod catalog;
pub mod chat;
pub mod identity;
pub mod llm;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
