//! Account commands: login, register, logout, whoami.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Input, Password};

use fooorum_types::identity::Identity;

use crate::state::AppState;

fn prompt_text(label: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(label).interact_text()?),
    }
}

fn prompt_password(value: Option<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Password::new().with_prompt("Password").interact()?),
    }
}

fn print_signed_in(identity: &Identity, verb: &str, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({"authenticated": true, "user": identity})
        );
    } else {
        println!(
            "  {} {} as {} ({})",
            style("✓").green().bold(),
            verb,
            style(&identity.username).bold(),
            style(identity.role).dim()
        );
    }
    Ok(())
}

/// Log in and persist the token.
///
/// # Examples
///
/// ```bash
/// # Interactive prompts (recommended)
/// fooorum login
///
/// # Script/automation mode
/// FOOORUM_PASSWORD=... fooorum login --email me@example.com
/// ```
pub async fn login(
    state: &AppState,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let email = prompt_text("Email", email)?;
    let password = prompt_password(password)?;

    let identity = state.session.login(&email, &password).await?;
    print_signed_in(&identity, "Logged in", json)
}

/// Register a new account; on success the user is logged in.
pub async fn register(
    state: &AppState,
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let email = prompt_text("Email", email)?;
    let username = prompt_text("Username", username)?;
    let password = prompt_password(password)?;

    let identity = state.session.register(&email, &password, &username).await?;
    print_signed_in(&identity, "Registered", json)
}

/// Clear the stored token. Never fails.
pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    let was_authenticated = state.session.is_authenticated();
    state.session.logout().await;

    if json {
        println!("{}", serde_json::json!({"authenticated": false}));
    } else if was_authenticated {
        println!("  {} Logged out", style("✓").green().bold());
    } else {
        println!("  {} Not logged in", style("i").blue().bold());
    }
    Ok(())
}

/// Show the identity decoded from the stored token.
pub fn whoami(state: &AppState, json: bool) -> Result<()> {
    let user = state.session.current_user();

    if json {
        println!(
            "{}",
            serde_json::json!({"authenticated": user.is_some(), "user": user})
        );
        return Ok(());
    }

    let Some(user) = user else {
        println!();
        println!(
            "  {} Not logged in. Sign in with: {}",
            style("i").blue().bold(),
            style("fooorum login").yellow()
        );
        println!();
        return Ok(());
    };

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("User ID").fg(Color::White),
        Cell::new("Username").fg(Color::White),
        Cell::new("Role").fg(Color::White),
    ]);
    let role_color = if user.is_staff() { Color::Yellow } else { Color::DarkGrey };
    table.add_row(vec![
        Cell::new(user.user_id),
        Cell::new(&user.username).fg(Color::Cyan),
        Cell::new(user.role.to_string()).fg(role_color),
    ]);

    println!();
    println!("{table}");
    println!();
    Ok(())
}
