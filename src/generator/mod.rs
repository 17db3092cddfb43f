pub mod config;
pub mod yaml;

// Re-export group and rule helpers
pub use config::group::{build_groups, group_generate, ResolvedGroup};
pub use config::ruleconvert::Rule;

// Re-export format converters
pub use config::formats::clash::{proxy_to_clash, proxy_to_clash_output};
pub use config::formats::quanx::proxy_to_quanx;
pub use config::formats::singbox::proxy_to_singbox;
pub use config::formats::single::{proxy_to_single, proxy_to_uri};
pub use config::formats::surge::proxy_to_surge;
pub use config::formats::v2ray::proxy_to_v2ray;
