//! Observability setup for the Fooorum client.

pub mod tracing_setup;

pub use tracing_setup::{Verbosity, init_tracing, shutdown_tracing};
