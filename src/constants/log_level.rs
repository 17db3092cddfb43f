//! Log level names of the different clients.
//!
//! Callers configure a clash-style level (`silent`, `error`, `warning`,
//! `info`, `debug`); JSON clients spell some of them differently.

pub const LOG_LEVEL_SILENT: &str = "silent";
pub const LOG_LEVEL_ERROR: &str = "error";
pub const LOG_LEVEL_WARNING: &str = "warning";
pub const LOG_LEVEL_INFO: &str = "info";
pub const LOG_LEVEL_DEBUG: &str = "debug";

/// Normalize a clash log level, unknown names become `info`.
pub fn clash_log_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "silent" | "none" | "off" => LOG_LEVEL_SILENT,
        "error" | "fatal" | "panic" => LOG_LEVEL_ERROR,
        "warning" | "warn" => LOG_LEVEL_WARNING,
        "debug" | "trace" | "verbose" => LOG_LEVEL_DEBUG,
        _ => LOG_LEVEL_INFO,
    }
}

/// v2ray uses `none` instead of `silent`.
pub fn v2ray_log_level(level: &str) -> &'static str {
    match clash_log_level(level) {
        LOG_LEVEL_SILENT => "none",
        other => other,
    }
}

/// sing-box uses `warn` and has no silent level; silence is `disabled: true`.
pub fn singbox_log_level(level: &str) -> (&'static str, bool) {
    match clash_log_level(level) {
        LOG_LEVEL_SILENT => (LOG_LEVEL_ERROR, true),
        LOG_LEVEL_WARNING => ("warn", false),
        other => (other, false),
    }
}
