//! `fooorum config`: print the effective configuration.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use fooorum_infra::endpoints::chat_socket_url;

use crate::state::AppState;

pub fn show_config(state: &AppState, json: bool) -> Result<()> {
    let config = &state.config;
    let socket = chat_socket_url(&config.forum_url)
        .map(|u| u.to_string())
        .unwrap_or_else(|e| format!("invalid ({e})"));

    if json {
        println!(
            "{}",
            serde_json::json!({
                "config": config,
                "chat_socket_url": socket,
                "data_dir": state.data_dir,
                "token_file": state.token_store.path(),
            })
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Setting").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    let rows: Vec<(&str, String)> = vec![
        ("auth_url", config.auth_url.clone()),
        ("forum_url", config.forum_url.clone()),
        ("chat socket", socket),
        ("reconnect_delay_secs", config.reconnect_delay_secs.to_string()),
        ("prune_interval_secs", config.prune_interval_secs.to_string()),
        ("retention_minutes", config.retention_minutes.to_string()),
        ("seen_capacity", config.seen_capacity.to_string()),
        ("seen_ttl_minutes", config.seen_ttl_minutes.to_string()),
        ("request_timeout_secs", config.request_timeout_secs.to_string()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).fg(Color::Cyan), Cell::new(value)]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {}  {}",
        style("Data dir:").bold(),
        style(state.data_dir.display()).dim()
    );
    println!(
        "  {}  {}",
        style("Token:").bold(),
        style(state.token_store.path().display()).dim()
    );
    println!();
    Ok(())
}
