//! Channels the bot is reachable on, and the activity model they share.

pub mod activity;
pub mod cli;
pub mod webhook;

pub use activity::*;
pub use cli::CliChannel;
pub use webhook::webhook_routes;
