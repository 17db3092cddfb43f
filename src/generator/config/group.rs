//! Group generation utilities
//!
//! Resolves the caller's group definitions against the rendered proxies.
//! Every rule-based generator goes through [`build_groups`], so group
//! membership is identical across targets.

use std::collections::HashSet;

use crate::constants::{DEFAULT_GROUP_NAME, DEFAULT_TEST_INTERVAL, DEFAULT_TEST_URL, DIRECT};
use crate::error::Result;
use crate::models::{GroupDef, GroupType, OverrideConfig, Proxy};
use crate::utils::matcher::ProxyFilter;

/// A proxy group with its final member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub name: String,
    pub group_type: GroupType,
    pub url: String,
    pub interval: u32,
    pub tolerance: Option<u32>,
    pub members: Vec<String>,
}

/// Generates the member list of a group definition
///
/// Explicit `proxies` come first. Then, when `include-all` is set or a filter
/// is given, the names of matching nodes in node order. Duplicates are
/// collapsed and an empty group falls back to `DIRECT`.
pub fn group_generate(def: &GroupDef, nodes: &[&Proxy]) -> Result<Vec<String>> {
    let mut members: Vec<String> = def.proxies.clone();

    let filter = def
        .filter
        .as_deref()
        .filter(|filter| !filter.trim().is_empty())
        .map(ProxyFilter::compile)
        .transpose()?;

    if def.include_all || filter.is_some() {
        members.extend(
            nodes
                .iter()
                .filter(|node| filter.as_ref().map_or(true, |f| f.matches(node)))
                .map(|node| node.display_name()),
        );
    }

    Ok(non_empty(dedup(members)))
}

/// Resolve every group for the rendered `nodes`.
///
/// The catch-all select group comes first and lists the user groups followed
/// by every node. It is left out when the caller already defines a group
/// with the same name.
pub fn build_groups(nodes: &[&Proxy], config: &OverrideConfig) -> Result<Vec<ResolvedGroup>> {
    let defs = &config.clash_options.groups;
    let mut groups = Vec::with_capacity(defs.len() + 1);

    if !defs.iter().any(|def| def.name == DEFAULT_GROUP_NAME) {
        let members = defs
            .iter()
            .map(|def| def.name.clone())
            .chain(nodes.iter().map(|node| node.display_name()))
            .collect();
        groups.push(ResolvedGroup {
            name: DEFAULT_GROUP_NAME.to_string(),
            group_type: GroupType::Select,
            url: DEFAULT_TEST_URL.to_string(),
            interval: DEFAULT_TEST_INTERVAL,
            tolerance: None,
            members: non_empty(dedup(members)),
        });
    }

    for def in defs {
        groups.push(ResolvedGroup {
            name: def.name.clone(),
            group_type: def.group_type,
            url: def
                .url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_TEST_URL.to_string()),
            interval: def.interval.unwrap_or(DEFAULT_TEST_INTERVAL),
            tolerance: def.tolerance,
            members: group_generate(def, nodes)?,
        });
    }

    Ok(groups)
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

fn non_empty(members: Vec<String>) -> Vec<String> {
    if members.is_empty() {
        vec![DIRECT.to_string()]
    } else {
        members
    }
}
