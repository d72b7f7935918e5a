//! Slash command parsing for the chat loop.

use std::io::Write;

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Leave the chat room.
    Exit,
    /// Resend the last message that could not be sent.
    Retry,
    /// Dismiss the current error banner.
    Dismiss,
    /// Show connection state and who is signed in.
    Status,
    /// Reprint every message currently in the feed.
    History,
    /// Unknown command.
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

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/retry" | "/r" => Some(ChatCommand::Retry),
        "/dismiss" => Some(ChatCommand::Dismiss),
        "/status" => Some(ChatCommand::Status),
        "/history" => Some(ChatCommand::History),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> std::io::Result<()> {
    let rows = [
        ("/help", "Show this help message"),
        ("/history", "Reprint recent messages"),
        ("/retry", "Resend the last unsent message"),
        ("/dismiss", "Hide the error banner"),
        ("/status", "Show connection status"),
        ("/clear", "Clear the screen"),
        ("/quit", "Leave the chat room"),
    ];

    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (name, help) in rows {
        writeln!(out, "  {:<10} {}", style(name).cyan(), help)?;
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Ctrl+D to leave").dim())?;
    writeln!(out)?;
    Ok(())
}
