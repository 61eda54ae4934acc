//! Configuration loading, validation, and env substitution.
//!
//! Config files: `botmux.toml`, `botmux.yaml`, `botmux.yml`, or `botmux.json`.
//! Searched in `./` then `~/.config/botmux/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{ConfigSource, LoadedConfig, config_dir, find_config_file, load_config, resolve},
    schema::{BotConfig, BotmuxConfig, QueueConfig, TelegramSettings},
    validate::{Diagnostic, Severity, has_errors, validate},
};
