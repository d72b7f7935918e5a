//! Business logic and port definitions for the Fooorum client.
//!
//! Two components live here: the session manager (bearer token lifecycle and
//! the identity read model) and the chat transport (history seeding, live
//! socket supervision, de-duplication, pruning). Both talk to the outside
//! world only through traits that `fooorum-infra` implements -- this crate
//! never depends on an HTTP or WebSocket library.

pub mod chat;
pub mod session;
