//! Welcome banner for the chat room.

use std::io::Write;

use console::style;

use fooorum_types::identity::Identity;

/// Print where we are connecting and as whom.
pub fn print_welcome_banner(
    out: &mut impl Write,
    socket_url: &str,
    user: Option<&Identity>,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Fooorum chat").cyan().bold())?;
    writeln!(out, "  {}  {}", style("Server:").bold(), style(socket_url).dim())?;
    match user {
        Some(user) => writeln!(
            out,
            "  {}  {} ({})",
            style("User:").bold(),
            user.username,
            style(user.role).dim()
        )?,
        None => writeln!(
            out,
            "  {}  {}",
            style("User:").bold(),
            style("not logged in (read-only)").yellow()
        )?,
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to leave").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    Ok(())
}
