//! Node filters used by proxy groups.
//!
//! A filter is a name regex, optionally preceded by any number of attribute
//! matchers: `!!TYPE=<regex>!!`, `!!SERVER=<regex>!!`, `!!PORT=<ranges>!!`.
//! For example `!!TYPE=SS|VMESS!!!!PORT=443!!(?i)hk` keeps Shadowsocks and
//! VMess nodes on port 443 whose name contains "hk".

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, SubconvertError};
use crate::models::{Proxy, ProxyType};

lazy_static! {
    static ref MATCHER_REGEX: Regex =
        Regex::new(r"^!!(TYPE|SERVER|PORT)=(.+?)!!").expect("matcher regex is valid");
}

/// Compiled group filter.
#[derive(Debug, Clone)]
pub struct ProxyFilter {
    proxy_type: Option<Regex>,
    server: Option<Regex>,
    port: Option<String>,
    name: Option<Regex>,
}

impl ProxyFilter {
    /// Compile `filter`, failing with `InvalidOptions` on a bad regex.
    pub fn compile(filter: &str) -> Result<Self> {
        let mut compiled = ProxyFilter {
            proxy_type: None,
            server: None,
            port: None,
            name: None,
        };

        let mut rest = filter.trim();
        while let Some(captures) = MATCHER_REGEX.captures(rest) {
            let target = &captures[2];
            match &captures[1] {
                "TYPE" => compiled.proxy_type = Some(build_regex(filter, &format!("^(?:{})$", target))?),
                "SERVER" => compiled.server = Some(build_regex(filter, target)?),
                _ => compiled.port = Some(target.to_string()),
            }
            rest = &rest[captures[0].len()..];
        }

        if !rest.is_empty() {
            compiled.name = Some(build_regex(filter, rest)?);
        }
        Ok(compiled)
    }

    /// Whether `node` passes every part of the filter.
    pub fn matches(&self, node: &Proxy) -> bool {
        if let Some(re) = &self.proxy_type {
            if !re.is_match(type_name(node.proxy_type())) {
                return false;
            }
        }
        if let Some(re) = &self.server {
            if !re.is_match(&node.server) {
                return false;
            }
        }
        if let Some(range) = &self.port {
            if !match_range(range, node.port as i32) {
                return false;
            }
        }
        match &self.name {
            Some(re) => re.is_match(&node.display_name()),
            None => true,
        }
    }
}

fn build_regex(filter: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", pattern))
        .map_err(|e| SubconvertError::InvalidOptions(format!("invalid filter `{}`: {}", filter, e)))
}

fn type_name(proxy_type: ProxyType) -> &'static str {
    match proxy_type {
        ProxyType::Shadowsocks => "SS",
        ProxyType::ShadowsocksR => "SSR",
        ProxyType::VMess => "VMESS",
        ProxyType::Trojan => "TROJAN",
    }
}

/// Match a number against a range specification
///
/// Range specification can include:
/// * Single numbers: "1", "2"
/// * Ranges: "1-10", "100-200"
/// * Negation: "!1-10" (everything except 1-10)
/// * Multiple ranges: "1-10,20-30,50"
pub fn match_range(range: &str, target: i32) -> bool {
    let mut negate = false;
    let mut matched = false;

    for range_part in range.split(',') {
        let mut part = range_part.trim();

        if let Some(stripped) = part.strip_prefix('!') {
            negate = true;
            part = stripped;
        }

        if let Some((lower, upper)) = part.split_once('-') {
            let lower = lower.trim().parse::<i32>().unwrap_or(i32::MIN);
            let upper = upper.trim().parse::<i32>().unwrap_or(i32::MAX);
            if (lower..=upper).contains(&target) {
                matched = true;
                break;
            }
        } else if part.parse::<i32>() == Ok(target) {
            matched = true;
            break;
        }
    }

    negate != matched
}
