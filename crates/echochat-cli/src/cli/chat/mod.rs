//! Interactive CLI chat for EchoChat.
//!
//! Welcome banner, async line input, slash commands and the send loop.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
