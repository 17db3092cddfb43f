//! Error taxonomy for parsing and conversion.

use thiserror::Error;

use crate::models::ProxyType;

/// Failure to decode a single proxy link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("link does not start with {0}://")]
    MissingScheme(&'static str),

    #[error("invalid base64 payload in {0} link")]
    InvalidBase64(&'static str),

    #[error("invalid JSON payload in {scheme} link: {reason}")]
    InvalidJson {
        scheme: &'static str,
        reason: String,
    },

    #[error("missing field `{field}` in {scheme} link")]
    MissingField {
        scheme: &'static str,
        field: &'static str,
    },

    #[error("invalid {field} `{value}` in {scheme} link")]
    InvalidField {
        scheme: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("unsupported link scheme in `{0}`")]
    UnknownScheme(String),
}

impl ParseError {
    pub(crate) fn missing(scheme: &'static str, field: &'static str) -> Self {
        ParseError::MissingField { scheme, field }
    }

    pub(crate) fn invalid(scheme: &'static str, field: &'static str, value: &str) -> Self {
        ParseError::InvalidField {
            scheme,
            field,
            value: value.to_string(),
        }
    }
}

/// Errors surfaced by the conversion entry points.
#[derive(Error, Debug)]
pub enum SubconvertError {
    #[error("Invalid subscription string: {0}")]
    InvalidSubscription(String),

    #[error("Failed to parse proxy link: {0}")]
    Parse(#[from] ParseError),

    #[error("Unsupported target format: {0}")]
    UnsupportedTarget(String),

    #[error("Unsupported feature: {proxy} ({proxy_type}) cannot be represented in {target}: {reason}")]
    UnsupportedFeature {
        proxy: String,
        proxy_type: ProxyType,
        target: &'static str,
        reason: String,
    },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SubconvertError {
    /// Short machine-friendly classification, used by the HTTP layer and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubconvertError::InvalidSubscription(_) => "InvalidSubscriptionError",
            SubconvertError::Parse(_) => "ParseError",
            SubconvertError::UnsupportedTarget(_) => "UnsupportedTargetError",
            SubconvertError::UnsupportedFeature { .. } => "UnsupportedFeatureError",
            SubconvertError::InvalidOptions(_) => "InvalidOptionsError",
            SubconvertError::Json(_) | SubconvertError::Yaml(_) => "RenderError",
        }
    }
}

pub type Result<T, E = SubconvertError> = std::result::Result<T, E>;
