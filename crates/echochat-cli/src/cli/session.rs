//! Session management CLI commands: list, show, new, delete, reset-local.
//!
//! Provides session browsing with rich tables, Markdown/JSON display,
//! and deletion with confirmation prompt.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use echochat_types::chat::{ChatSession, MessageRole};

use crate::state::AppState;

/// List every session in the merged local/remote view, most recent first.
///
/// # Examples
///
/// ```bash
/// echochat sessions
/// echochat sessions --json
/// ```
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let mut sessions = state.sync().list_sessions().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("echochat chat").yellow()
        );
        println!();
        return Ok(());
    }

    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);

    for session in &sessions {
        let preview = session
            .last_message()
            .map(|m| truncate(&m.content, 40))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(short_id(&session.id)).fg(Color::DarkGrey),
            Cell::new(truncate(&session.title, 40)).fg(Color::Cyan),
            Cell::new(session.effective_model_id()).fg(Color::White),
            Cell::new(session.messages.len().to_string()).fg(Color::White),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(preview).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a session as Markdown (default) or JSON.
///
/// # Examples
///
/// ```bash
/// echochat show 3f2a
/// echochat show 3f2a9c1e-... --json
/// ```
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let session = find_session(state, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!("# {}", session.title);
    println!();
    println!("- **ID:** {}", session.id);
    println!("- **Model:** {}", session.effective_model_id());
    println!(
        "- **Created:** {}",
        session.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "- **Updated:** {}",
        session.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("- **Messages:** {}", session.messages.len());
    println!();
    println!("---");
    println!();

    for msg in &session.messages {
        let role_label = match msg.role {
            MessageRole::User => "**You**".to_string(),
            MessageRole::Assistant => match &msg.model {
                Some(model) => format!("**Assistant** ({model})"),
                None => "**Assistant**".to_string(),
            },
            MessageRole::System => "**System**".to_string(),
        };

        let timestamp = msg.timestamp.format("%H:%M");
        println!("### {role_label} ({timestamp})");
        println!();
        println!("{}", msg.content);
        println!();
    }

    Ok(())
}

/// Create an empty session using the configured default model.
pub async fn new_session(state: &AppState, json: bool) -> Result<()> {
    let session = state
        .sync()
        .save_session(ChatSession::new(state.controller.default_model()))
        .await
        .context("Failed to save new session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "  {} Created session {} ({})",
            style("+").green().bold(),
            style(&session.id).cyan(),
            session.effective_model_id()
        );
    }
    Ok(())
}

/// Delete a session with confirmation.
///
/// # Examples
///
/// ```bash
/// echochat delete 3f2a
/// echochat delete 3f2a --force
/// ```
pub async fn delete_session(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let session = find_session(state, id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&session.title).red().bold(),
                session.messages.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.sync().delete_session(&session.id).await;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": session.id})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session.title
        );
    }

    Ok(())
}

/// Wipe the local session cache. Remote copies reappear on the next listing.
pub fn reset_local(state: &AppState, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt("Delete every locally cached session?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state
        .sync()
        .clear_local()
        .context("Failed to clear local sessions")?;

    if json {
        println!("{}", serde_json::json!({"cleared": true}));
    } else {
        println!("  {} Local session cache cleared.", style("x").red().bold());
        if state.sync().is_remote_configured() {
            println!(
                "  {}",
                style("Remote sessions are untouched and will reappear on the next sync.").dim()
            );
        }
    }
    Ok(())
}

// --- Lookup and formatting helpers ---

async fn find_session(state: &AppState, id: &str) -> Result<ChatSession> {
    let sessions = state.sync().list_sessions().await;
    let resolved = resolve_session_id(&sessions, id)?;
    sessions
        .into_iter()
        .find(|s| s.id == resolved)
        .with_context(|| format!("Session '{id}' not found"))
}

/// Resolve a full session id or a unique prefix of one.
pub fn resolve_session_id(sessions: &[ChatSession], input: &str) -> Result<String> {
    let input = input.trim();
    if let Some(exact) = sessions.iter().find(|s| s.id == input) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&ChatSession> = sessions
        .iter()
        .filter(|s| !input.is_empty() && s.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => bail!("Session '{input}' not found"),
        _ => bail!(
            "Session prefix '{input}' is ambiguous ({} matches)",
            matches.len()
        ),
    }
}

/// First 8 characters of an id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((cut, _)) => &id[..cut],
        None => id,
    }
}

/// Cut `text` to `max` characters with a trailing ellipsis, on one line.
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
