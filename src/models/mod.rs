//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the application,
//! separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use subconvert::models::{Proxy, ProxyKind, ProxyType};
//!
//! let proxy = Proxy::new(
//!     "Tokyo",
//!     "example.com",
//!     8388,
//!     ProxyKind::Shadowsocks {
//!         cipher: "aes-256-gcm".to_string(),
//!         password: "secret".to_string(),
//!         plugin: None,
//!         plugin_opts: None,
//!     },
//! );
//! assert_eq!(proxy.proxy_type(), ProxyType::Shadowsocks);
//! ```

mod override_config;
mod proxy;
mod target;

pub use override_config::*;
pub use proxy::*;
pub use target::SubconverterTarget;
