//! Client-side authentication state.
//!
//! `SessionManager` is the only mutator (`login`, `register`, `logout`,
//! `restore_session`); every other collaborator holds a cloned
//! `SessionContext` and reads `is_authenticated` / `current_user` from it.

pub mod api;
pub mod context;
pub mod manager;
pub mod store;
pub mod token;

pub use context::{Session, SessionContext};
pub use manager::SessionManager;
