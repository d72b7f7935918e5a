//! Infrastructure layer for the Fooorum client.
//!
//! Implements the ports defined in `fooorum-core`: the auth and history HTTP
//! clients (reqwest), the chat socket connector (tokio-tungstenite), and the
//! file-backed token store. Also owns config loading and endpoint derivation.

pub mod config;
pub mod endpoints;
pub mod filesystem;
pub mod http;
pub mod ws;
