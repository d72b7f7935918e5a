//! Line formatting for chat output.

use chrono::Local;
use console::style;

use fooorum_types::chat::{ChatMessage, ConnectionState};
use fooorum_types::error::SendRejected;

/// One chat line: local time, author (or "You"), text.
pub fn format_message(message: &ChatMessage, own: bool) -> String {
    let time = message.created_at.with_timezone(&Local).format("%H:%M");
    let author = if own {
        style("You".to_string()).green().bold()
    } else {
        style(message.author.clone()).cyan().bold()
    };
    format!("  {} {} {}", style(time).dim(), author, message.text)
}

/// JSON-lines form used with `--json`.
pub fn format_message_json(message: &ChatMessage, own: bool) -> String {
    serde_json::json!({
        "id": message.id,
        "author": message.author,
        "text": message.text,
        "created_at": message.created_at,
        "own": own,
    })
    .to_string()
}

pub fn format_state(state: ConnectionState) -> String {
    match state {
        ConnectionState::Connecting => format!("  {}", style("Connecting...").dim()),
        ConnectionState::Open => format!("  {} {}", style("●").green(), style("Connected").dim()),
        ConnectionState::Reconnecting => {
            format!("  {} {}", style("●").yellow(), style("Reconnecting...").dim())
        }
    }
}

pub fn format_error(message: &str) -> String {
    format!(
        "  {} {} {}",
        style("!").red().bold(),
        message,
        style("(/dismiss to hide)").dim()
    )
}

pub fn format_rejection(rejected: SendRejected) -> String {
    let hint = match rejected {
        SendRejected::EmptyMessage => "",
        SendRejected::Unauthenticated => " Run `fooorum login` first.",
        SendRejected::NotReady => " Use /retry once connected.",
    };
    format!("  {} {}{}", style("!").yellow().bold(), rejected, style(hint).dim())
}
