//! Model inference abstractions for EchoChat.
//!
//! - `InferenceClient`: RPITIT trait for concrete inference backends
//! - `BoxInferenceClient`: object-safe wrapper for runtime selection
//! - `SimulatedInferenceClient`: deterministic offline replies

pub mod box_client;
pub mod client;
pub mod simulated;
