pub mod log_level;

/// Link schemes understood by the parsers, including the `://` separator.
pub const KNOWN_SCHEMES: [&str; 4] = ["ss://", "ssr://", "vmess://", "trojan://"];

/// Name of the select group every rule-based output falls back to.
pub const DEFAULT_GROUP_NAME: &str = "Proxy";

/// Health-check URL used by url-test/fallback groups without an explicit one.
pub const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";

/// Health-check interval in seconds used when a group does not set one.
pub const DEFAULT_TEST_INTERVAL: u32 = 300;

/// Built-in policy every client understands.
pub const DIRECT: &str = "DIRECT";
pub const REJECT: &str = "REJECT";

/// Whether `line` starts with one of [`KNOWN_SCHEMES`], ignoring case.
pub fn has_known_scheme(line: &str) -> bool {
    let line = line.trim_start();
    KNOWN_SCHEMES.iter().any(|scheme| {
        line.len() >= scheme.len()
            && line.is_char_boundary(scheme.len())
            && line[..scheme.len()].eq_ignore_ascii_case(scheme)
    })
}
