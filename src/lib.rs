pub mod checks;
pub mod commands;
pub mod config;
pub mod data;
pub mod editor;
pub mod error_handler;
pub mod handlers;
pub mod logging;
pub mod welcome;

pub const BOT_NAME: &str = "herald";
pub const COMMAND_TARGET: &str = "herald::command";
pub const ERROR_TARGET: &str = "herald::error";
pub const EVENT_TARGET: &str = "herald::handlers";
pub const INTERACTION_TARGET: &str = "herald::interaction";
pub const CONSOLE_TARGET: &str = "herald";

pub use data::{Data, DataInner, GuildConfig};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
