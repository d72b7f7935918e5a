//! Interactive CLI chat room.
//!
//! Prints the history seed and live messages as they arrive, reads lines from
//! the prompt and sends them, and handles slash commands.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
