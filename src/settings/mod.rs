//! Server settings
//!
//! Process-wide configuration for the HTTP server and the CLI, loaded from
//! YAML or TOML and swapped atomically on reload.

pub mod settings_struct;

pub use settings_struct::{
    update_settings_from_content, update_settings_from_file, Settings, SettingsError,
};
