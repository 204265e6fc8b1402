//! Welcome banner for the interactive chat.

use console::style;

use crate::cli::session::short_id;

/// Print the banner shown when the chat loop starts.
pub fn print_welcome_banner(title: &str, model: &str, session_id: &str, sync_line: &str) {
    println!();
    println!("  {} {}", style("*").cyan().bold(), style("EchoChat").cyan().bold());
    println!();
    println!("  {}  {}", style("Session:").bold(), style(title).dim());
    println!("  {}       {}", style("ID:").bold(), style(short_id(session_id)).dim());
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!("  {}     {}", style("Sync:").bold(), style(sync_line).dim());
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
