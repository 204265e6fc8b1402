//! The interactive chat loop.
//!
//! Reads lines, routes slash commands, and sends everything else through
//! the chat controller with a thinking spinner.

use std::time::Duration;

use chrono::Utc;
use console::style;

use echochat_core::catalog;
use echochat_types::chat::{ChatSession, MessageRole};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use crate::cli::session::{resolve_session_id, short_id, truncate};
use crate::state::{AppState, ConcreteController};

/// What the loop should do after a command.
enum Flow {
    Continue,
    Exit,
}

fn thinking_spinner() -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    if let Ok(template) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn sync_line(controller: &ConcreteController) -> String {
    let status = controller.synchronizer().sync_status();
    if status.remote_configured {
        format!("remote, {}", status.time_ago(Utc::now()).to_lowercase())
    } else {
        "local only".to_string()
    }
}

fn active_summary(controller: &ConcreteController) -> Option<(String, String, String)> {
    controller.active_session().map(|s| {
        (
            s.title.clone(),
            s.effective_model_id().to_string(),
            s.id.clone(),
        )
    })
}

/// Run the interactive chat until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &mut AppState, session: Option<&str>) -> anyhow::Result<()> {
    let controller = &mut state.controller;
    controller.initialize().await?;

    if let Some(input) = session {
        let id = resolve_session_id(controller.sessions(), input)?;
        controller.select_session(&id).await?;
    }

    if let Some((title, model, id)) = active_summary(controller) {
        print_welcome_banner(&title, &model, &id, &sync_line(controller));
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    if let ChatCommand::Clear = cmd {
                        chat_input.clear();
                        continue;
                    }
                    match handle_command(controller, cmd).await {
                        Flow::Continue => continue,
                        Flow::Exit => {
                            println!("\n  {}", style("Chat ended.").dim());
                            break;
                        }
                    }
                }

                let spinner = thinking_spinner();
                let result = controller.send_message(&text).await;
                spinner.finish_and_clear();

                match result {
                    Ok(session) => print_reply(&session),
                    Err(e) => {
                        println!("\n  {} {e}\n", style("!").red().bold());
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_reply(session: &ChatSession) {
    if let Some(reply) = session
        .last_message()
        .filter(|m| m.role == MessageRole::Assistant)
    {
        let name = reply.model.as_deref().unwrap_or("Assistant");
        println!();
        println!("  {} {}", style(format!("{name} >")).cyan().bold(), reply.content);
        println!();
    }
}

async fn handle_command(controller: &mut ConcreteController, cmd: ChatCommand) -> Flow {
    match cmd {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Exit => return Flow::Exit,
        ChatCommand::Clear => {}

        ChatCommand::New => match controller.new_session().await {
            Ok(session) => println!(
                "\n  {} New session {} ({})\n",
                style("+").green().bold(),
                style(short_id(&session.id)).cyan(),
                session.effective_model_id()
            ),
            Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
        },

        ChatCommand::Sessions => print_sessions(controller),

        ChatCommand::Switch(input) => {
            let switched = match resolve_session_id(controller.sessions(), &input) {
                Ok(id) => controller
                    .select_session(&id)
                    .await
                    .map(|s| s.title.clone())
                    .map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            match switched {
                Ok(title) => println!(
                    "\n  {} Switched to '{}'\n",
                    style(">").cyan().bold(),
                    style(title).cyan()
                ),
                Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
            }
        }

        ChatCommand::Delete(input) => {
            let deleted = match resolve_session_id(controller.sessions(), &input) {
                Ok(id) => controller
                    .delete_session(&id)
                    .await
                    .map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            match deleted {
                Ok(()) => {
                    let now_on = controller
                        .active_session()
                        .map(|s| s.title.clone())
                        .unwrap_or_default();
                    println!(
                        "\n  {} Deleted. Active session: '{}'\n",
                        style("x").red().bold(),
                        style(now_on).cyan()
                    );
                }
                Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
            }
        }

        ChatCommand::Model(None) => {
            let current = controller
                .active_session()
                .map(|s| s.effective_model_id().to_string())
                .unwrap_or_default();
            println!();
            for model in catalog::available_models() {
                let marker = if model.id == current { "*" } else { " " };
                println!(
                    "  {} {:<10} {}",
                    style(marker).green().bold(),
                    style(&model.id).cyan(),
                    style(model.description.as_deref().unwrap_or("")).dim()
                );
            }
            println!();
        }

        ChatCommand::Model(Some(model_id)) => match controller.set_model(&model_id).await {
            Ok(session) => println!(
                "\n  {} Model set to {}\n",
                style("*").cyan().bold(),
                style(session.effective_model_id()).cyan()
            ),
            Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
        },

        ChatCommand::History => {
            println!();
            if let Some(session) = controller.active_session() {
                for msg in &session.messages {
                    let role_label = match msg.role {
                        MessageRole::User => format!("{}", style("You").green()),
                        MessageRole::Assistant => {
                            format!("{}", style(msg.model.as_deref().unwrap_or("Assistant")).cyan())
                        }
                        MessageRole::System => "System".to_string(),
                    };
                    println!("  {} {}", style(role_label).bold(), truncate(&msg.content, 100));
                }
                if session.messages.is_empty() {
                    println!("  {}", style("No messages yet.").dim());
                }
            }
            println!();
        }

        ChatCommand::Refresh => match controller.refresh().await {
            Ok(()) => println!(
                "\n  {} {} sessions loaded\n",
                style("*").cyan().bold(),
                controller.sessions().len()
            ),
            Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
        },

        ChatCommand::Status => {
            let status = controller.synchronizer().sync_status();
            println!();
            println!("  Sync:     {}", sync_line(controller));
            println!("  Pending:  {}", status.pending_mirrors);
            println!("  Device:   {}", style(controller.synchronizer().device_id()).dim());
            println!();
        }

        ChatCommand::Unknown(cmd_name) => {
            println!(
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(cmd_name).dim()
            );
        }
    }
    Flow::Continue
}

fn print_sessions(controller: &ConcreteController) {
    let active = controller.active_session_id();
    let mut sessions: Vec<&ChatSession> = controller.sessions().iter().collect();
    sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    println!();
    for session in sessions {
        let marker = if Some(session.id.as_str()) == active { "*" } else { " " };
        println!(
            "  {} {}  {:<32}  {}",
            style(marker).green().bold(),
            style(short_id(&session.id)).dim(),
            truncate(&session.title, 32),
            style(format!("{} msgs", session.messages.len())).dim()
        );
    }
    println!();
}
