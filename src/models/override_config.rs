//! Caller-supplied options layered onto generated documents.

use serde::{Deserialize, Serialize};

/// Type of proxy group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupType {
    #[default]
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "url-test")]
    UrlTest,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "load-balance")]
    LoadBalance,
}

impl GroupType {
    /// Get string representation of the proxy group type
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Select => "select",
            GroupType::UrlTest => "url-test",
            GroupType::Fallback => "fallback",
            GroupType::LoadBalance => "load-balance",
        }
    }

    /// Whether the group performs health checks against a test URL.
    pub fn is_health_checked(&self) -> bool {
        !matches!(self, GroupType::Select)
    }
}

/// A user-defined proxy group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupDef {
    /// Name of the proxy group
    pub name: String,
    /// Selection type
    #[serde(rename = "type", default)]
    pub group_type: GroupType,
    /// URL for health checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Interval in seconds between health checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// Tolerance in milliseconds for url-test groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    /// Pattern restricting which proxies are added automatically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Add every parsed proxy to this group
    #[serde(rename = "include-all", alias = "includeAll", default)]
    pub include_all: bool,
    /// Explicit members, listed before any automatically added proxy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
}

impl GroupDef {
    pub fn new(name: impl Into<String>, group_type: GroupType) -> Self {
        GroupDef {
            name: name.into(),
            group_type,
            ..Default::default()
        }
    }
}

/// Options for rule-based outputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    /// Routing rules in clash syntax, e.g. `DOMAIN-KEYWORD,google,AI Services`
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Override configuration passed to the conversion entry points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideConfig {
    #[serde(default)]
    pub clash_options: ClashOptions,
    /// Render YAML-like outputs as JSON instead
    #[serde(default)]
    pub output_json: bool,
    /// Drop records a target cannot represent instead of failing
    #[serde(default)]
    pub skip_unsupported: bool,
}

impl OverrideConfig {
    pub fn with_output_json(mut self, output_json: bool) -> Self {
        self.output_json = output_json;
        self
    }

    pub fn with_skip_unsupported(mut self, skip: bool) -> Self {
        self.skip_unsupported = skip;
        self
    }

    /// Log level requested by the caller, `info` when unset.
    pub fn log_level(&self) -> &str {
        self.clash_options
            .log_level
            .as_deref()
            .filter(|level| !level.is_empty())
            .unwrap_or("info")
    }

    /// User rules with duplicates removed, first occurrence wins.
    pub fn dedup_rules(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.clash_options
            .rules
            .iter()
            .map(|rule| rule.trim())
            .filter(|rule| !rule.is_empty() && seen.insert(rule.to_string()))
            .map(str::to_string)
            .collect()
    }
}
