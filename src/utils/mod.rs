pub mod base64;
pub mod coerce;
#[cfg(feature = "web-api")]
pub mod http;
pub mod matcher;
pub mod url;

// Re-export common utilities
pub use self::base64::{base64_decode, base64_encode, url_safe_base64_encode};
pub use self::url::{url_decode, url_encode};
