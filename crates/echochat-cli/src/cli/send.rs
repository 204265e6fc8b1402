//! One-shot message command.

use anyhow::{Context, Result};
use console::style;

use echochat_types::chat::MessageRole;

use super::session::resolve_session_id;
use crate::state::AppState;

/// Send `message` to a session (the most recent one by default) and print
/// the assistant's reply.
///
/// # Examples
///
/// ```bash
/// echochat send "hello"
/// echochat send "and in Rust?" --session 3f2a --json
/// ```
pub async fn send_message(
    state: &mut AppState,
    message: &str,
    session: Option<&str>,
    json: bool,
) -> Result<()> {
    let controller = &mut state.controller;
    controller.initialize().await?;

    if let Some(input) = session {
        let id = resolve_session_id(controller.sessions(), input)?;
        controller.select_session(&id).await?;
    }

    let spinner = (!json).then(|| {
        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(template) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message("thinking...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });

    let result = controller.send_message(message).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let session = result.context("Failed to send message")?;

    let reply = session
        .last_message()
        .filter(|m| m.role == MessageRole::Assistant)
        .context("No reply was recorded")?;

    if json {
        let out = serde_json::json!({
            "session_id": session.id,
            "title": session.title,
            "reply": reply,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!(
            "  {} {}",
            style(reply.model.as_deref().unwrap_or("Assistant")).cyan().bold(),
            reply.content
        );
        println!();
    }
    Ok(())
}
