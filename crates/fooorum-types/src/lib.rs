//! Shared domain types for the Fooorum client.
//!
//! This crate contains the types exchanged between the session manager, the
//! chat transport and the infrastructure adapters: identities and roles, auth
//! wire payloads, chat messages and frames, client configuration, and the
//! error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
