//! Session synchronization for EchoChat.
//!
//! `SessionSynchronizer` merges the local session store with the remote
//! session store into one view and orchestrates every write: local first
//! (the durability guarantee of record), remote second as a tracked
//! background mirror.

pub mod mirror;
pub mod observer;
pub mod synchronizer;
