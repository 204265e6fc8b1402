//! Sync and configuration status command.

use anyhow::Result;
use chrono::Utc;
use console::style;

use echochat_core::llm::client::InferenceClient;

use crate::state::AppState;

/// Display where sessions live, whether they sync, and which backend
/// answers messages.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let sync = state.sync();
    let sessions = sync.list_sessions().await;
    let sync_status = sync.sync_status();
    let device_id = sync.device_id();
    let inference = state.controller.inference().name();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "ephemeral": state.ephemeral,
            "device_id": device_id,
            "sessions": sessions.len(),
            "default_model": state.controller.default_model(),
            "inference": inference,
            "sync": sync_status,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} EchoChat v{}",
        style("*").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Storage ──").dim());
    if state.ephemeral {
        println!("  Store:     {}", style("in-memory (ephemeral)").yellow());
    } else {
        println!("  Data dir:  {}", style(state.data_dir.display()).dim());
    }
    println!("  Sessions:  {}", style(sessions.len()).bold());
    println!("  Device:    {}", style(&device_id).dim());
    println!();

    println!("  {}", style("── Sync ──").dim());
    if sync_status.remote_configured {
        let base_url = state.config.remote.base_url.as_deref().unwrap_or_default();
        println!("  Remote:    {}", style(base_url).cyan());
        let ago = sync_status.time_ago(Utc::now());
        let last = if sync_status.last_synced.is_some() {
            style(ago).green()
        } else {
            style(ago).yellow()
        };
        println!("  Last sync: {last}");
    } else {
        println!("  Remote:    {}", style("not configured (local only)").dim());
    }
    println!();

    println!("  {}", style("── Inference ──").dim());
    println!("  Backend:   {}", style(inference).bold());
    if let Some(url) = &state.config.inference.base_url {
        println!("  Endpoint:  {}", style(url).cyan());
    }
    println!("  Default:   {}", state.controller.default_model());
    println!();

    Ok(())
}
