//! Remote session store abstractions for EchoChat.
//!
//! Defines the `RemoteSessionGateway` trait that the infrastructure layer
//! implements over HTTP, plus the gateway used when no remote endpoint is
//! configured.

pub mod gateway;
