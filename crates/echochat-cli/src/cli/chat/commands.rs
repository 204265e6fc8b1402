//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat session management.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Leave the chat.
    Exit,
    /// Start a new session and switch to it.
    New,
    /// List sessions.
    Sessions,
    /// Switch to another session by id or id prefix.
    Switch(String),
    /// Delete a session by id or id prefix.
    Delete(String),
    /// Change the active session's model; no argument lists models.
    Model(Option<String>),
    /// Show the active session's messages.
    History,
    /// Reload sessions from local and remote storage.
    Refresh,
    /// Show sync status.
    Status,
    /// Unknown command or missing argument.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/sessions" | "/ls" => ChatCommand::Sessions,
        "/switch" | "/open" => match arg {
            Some(id) => ChatCommand::Switch(id),
            None => ChatCommand::Unknown("/switch requires a session id".to_string()),
        },
        "/delete" | "/rm" => match arg {
            Some(id) => ChatCommand::Delete(id),
            None => ChatCommand::Unknown("/delete requires a session id".to_string()),
        },
        "/model" => ChatCommand::Model(arg),
        "/history" => ChatCommand::History,
        "/refresh" | "/sync" => ChatCommand::Refresh,
        "/status" => ChatCommand::Status,
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/new", "Start a new session"),
        ("/sessions", "List sessions"),
        ("/switch <id>", "Switch to a session (id prefix is enough)"),
        ("/delete <id>", "Delete a session"),
        ("/model [id]", "Show models or change this session's model"),
        ("/history", "Show this session's messages"),
        ("/refresh", "Reload sessions from storage and remote"),
        ("/status", "Show sync status"),
        ("/clear", "Clear the screen"),
        ("/exit", "Leave the chat"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, description) in rows {
        println!("  {:<14} {}", style(command).cyan(), description);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
