//! The interactive chat loop.
//!
//! Multiplexes prompt input with transport events in one `select!`. All
//! output goes through the readline `SharedWriter` so it lands above the
//! prompt. Leaving the loop tears the transport down.

use std::collections::HashSet;
use std::io::Write;

use console::style;
use tokio::sync::broadcast::error::RecvError;

use fooorum_core::chat::{ChatEvent, ChatTransport, Draft};
use fooorum_infra::endpoints::chat_socket_url;
use fooorum_types::chat::{ChatMessage, MessageId};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer;
use crate::state::AppState;

/// Tracks which messages have been printed, so the history seed never
/// repeats a live message that arrived first.
struct Printer {
    printed: HashSet<MessageId>,
    json: bool,
}

impl Printer {
    fn new(json: bool) -> Self {
        Self {
            printed: HashSet::new(),
            json,
        }
    }

    fn print(
        &mut self,
        out: &mut impl Write,
        message: &ChatMessage,
        own: bool,
    ) -> std::io::Result<()> {
        if !self.printed.insert(message.id.clone()) {
            return Ok(());
        }
        let line = if self.json {
            renderer::format_message_json(message, own)
        } else {
            renderer::format_message(message, own)
        };
        writeln!(out, "{line}")
    }

    /// Print feed entries not shown yet, oldest first.
    async fn print_feed(
        &mut self,
        out: &mut impl Write,
        transport: &ChatTransport,
    ) -> std::io::Result<()> {
        for message in transport.messages().await.iter().rev() {
            let own = transport.is_own(message);
            self.print(out, message, own)?;
        }
        Ok(())
    }

    /// Forget ids that have left the feed.
    async fn forget_pruned(&mut self, transport: &ChatTransport) {
        let live: HashSet<MessageId> = transport
            .messages()
            .await
            .into_iter()
            .map(|m| m.id)
            .collect();
        self.printed.retain(|id| live.contains(id));
    }
}

/// What a submitted prompt line asks for.
#[derive(Debug, PartialEq)]
enum Submitted<'a> {
    Blank,
    Command(ChatCommand),
    /// Chat text, exactly as typed.
    Message(&'a str),
}

fn classify(line: &str) -> Submitted<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Submitted::Blank
    } else if let Some(cmd) = commands::parse(trimmed) {
        Submitted::Command(cmd)
    } else {
        Submitted::Message(line)
    }
}

pub async fn run_chat_loop(state: &AppState, json: bool) -> anyhow::Result<()> {
    let transport = state.mount_chat()?;
    let mut events = transport.subscribe();
    let user = state.session.current_user();

    let prompt = match &user {
        Some(user) => format!("  {} ", style(format!("{} >", user.username)).green().bold()),
        None => format!("  {} ", style("(read-only) >").dim()),
    };
    let (mut input, mut out) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let socket = chat_socket_url(&state.config.forum_url)?;
    if !json {
        print_welcome_banner(&mut out, socket.as_str(), user.as_ref())?;
    }

    let mut printer = Printer::new(json);
    let mut draft = Draft::default();

    loop {
        tokio::select! {
            line = input.read_line() => match line {
                InputEvent::Eof => break,
                InputEvent::Interrupted => {
                    writeln!(out, "  {}", style("Press Ctrl+D or type /quit to leave.").dim())?;
                }
                InputEvent::Message(text) => match classify(&text) {
                    Submitted::Blank => {}
                    Submitted::Command(cmd) => match cmd {
                        ChatCommand::Help => commands::print_help(&mut out)?,
                        ChatCommand::Clear => input.clear(),
                        ChatCommand::Exit => break,
                        ChatCommand::Retry => {
                            if draft.is_blank() {
                                writeln!(out, "  {}", style("Nothing to resend.").dim())?;
                            } else if let Err(rejected) = transport.submit(&mut draft).await {
                                writeln!(out, "{}", renderer::format_rejection(rejected))?;
                            }
                        }
                        ChatCommand::Dismiss => transport.dismiss_error().await,
                        ChatCommand::Status => {
                            writeln!(out, "{}", renderer::format_state(transport.state()))?;
                            if let Some(error) = transport.error().await {
                                writeln!(out, "{}", renderer::format_error(&error))?;
                            }
                        }
                        ChatCommand::History => {
                            printer.printed.clear();
                            printer.print_feed(&mut out, &transport).await?;
                        }
                        ChatCommand::Unknown(name) => {
                            writeln!(
                                out,
                                "  {} Unknown command: {}. Type /help for available commands.",
                                style("?").yellow().bold(),
                                style(name).dim()
                            )?;
                        }
                    },
                    Submitted::Message(raw) => {
                        draft.set(raw);
                        if let Err(rejected) = transport.submit(&mut draft).await {
                            writeln!(out, "{}", renderer::format_rejection(rejected))?;
                        }
                    }
                },
            },

            event = events.recv() => match event {
                Ok(ChatEvent::MessageAccepted(message)) => {
                    let own = transport.is_own(&message);
                    printer.print(&mut out, &message, own)?;
                }
                Ok(ChatEvent::HistoryLoaded { .. }) => {
                    printer.print_feed(&mut out, &transport).await?;
                }
                Ok(ChatEvent::StateChanged(next)) => {
                    if !json {
                        writeln!(out, "{}", renderer::format_state(next))?;
                    }
                }
                Ok(ChatEvent::Error(message)) => {
                    writeln!(out, "{}", renderer::format_error(&message))?;
                }
                Ok(ChatEvent::Pruned { .. }) => printer.forget_pruned(&transport).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chat view fell behind, reprinting feed");
                    printer.print_feed(&mut out, &transport).await?;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    if !json {
        writeln!(out, "\n  {}", style("Left the chat.").dim())?;
    }
    input.finish();
    transport.teardown().await;
    Ok(())
}
