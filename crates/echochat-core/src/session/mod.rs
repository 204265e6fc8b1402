//! Local session persistence.

pub mod local_store;
