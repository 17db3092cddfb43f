pub mod constants;
pub mod error;
pub mod generator;
pub mod interfaces;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;
#[cfg(feature = "web-api")]
pub mod web_handlers;

// Re-export the conversion entry points
pub use interfaces::{merge_and_convert, render, subconvert};
pub use parser::{parse, parse_mixed_subscription};

// Re-export the main types for easier access
pub use error::{ParseError, SubconvertError};
pub use models::{GroupDef, GroupType, OverrideConfig, Proxy, ProxyKind, ProxyType, SubconverterTarget};
pub use settings::Settings;
