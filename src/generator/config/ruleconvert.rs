//! Rule conversion between clash syntax and the other rule-based targets.

use log::debug;
use serde_json::{json, Map, Value};

use crate::constants::{DEFAULT_GROUP_NAME, DIRECT, REJECT};
use crate::models::OverrideConfig;

/// A routing rule in clash syntax: `TYPE,value,policy[,options...]`, or
/// `MATCH,policy` for the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub rule_type: String,
    pub value: String,
    pub policy: String,
    pub options: Vec<String>,
}

impl Rule {
    /// Parse one clash rule line. Lines without a policy yield `None`.
    pub fn parse(line: &str) -> Option<Rule> {
        let mut parts = line.split(',').map(str::trim);
        let rule_type = parts.next()?.to_uppercase();
        if rule_type.is_empty() {
            return None;
        }

        if rule_type == "MATCH" || rule_type == "FINAL" {
            let policy = parts.next().filter(|p| !p.is_empty())?;
            return Some(Rule {
                rule_type: "MATCH".to_string(),
                value: String::new(),
                policy: policy.to_string(),
                options: Vec::new(),
            });
        }

        let value = parts.next().filter(|v| !v.is_empty())?;
        let policy = parts.next().filter(|p| !p.is_empty())?;
        Some(Rule {
            rule_type,
            value: value.to_string(),
            policy: policy.to_string(),
            options: parts.map(str::to_string).collect(),
        })
    }

    pub fn is_final(&self) -> bool {
        self.rule_type == "MATCH"
    }
}

/// The caller's rules, deduplicated, with a `MATCH` fallback to the
/// catch-all group appended unless one is already present.
pub fn collect_rules(config: &OverrideConfig) -> Vec<Rule> {
    let mut rules: Vec<Rule> = config
        .dedup_rules()
        .iter()
        .filter_map(|line| {
            let rule = Rule::parse(line);
            if rule.is_none() {
                debug!("Ignoring malformed rule `{}`", line);
            }
            rule
        })
        .collect();

    if !rules.iter().any(Rule::is_final) {
        rules.push(Rule {
            rule_type: "MATCH".to_string(),
            value: String::new(),
            policy: DEFAULT_GROUP_NAME.to_string(),
            options: Vec::new(),
        });
    }
    rules
}

/// Clash rule line.
pub fn to_clash(rule: &Rule) -> String {
    if rule.is_final() {
        return format!("MATCH,{}", rule.policy);
    }
    let mut line = format!("{},{},{}", rule.rule_type, rule.value, rule.policy);
    for option in &rule.options {
        line.push(',');
        line.push_str(option);
    }
    line
}

/// Surge rule line, policy names already adapted by `policy`.
pub fn to_surge(rule: &Rule, policy: impl Fn(&str) -> String) -> String {
    if rule.is_final() {
        return format!("FINAL,{}", policy(&rule.policy));
    }
    let mut line = format!("{},{},{}", rule.rule_type, rule.value, policy(&rule.policy));
    for option in &rule.options {
        line.push(',');
        line.push_str(option);
    }
    line
}

/// Quantumult X `filter_local` line, or `None` for rule types it lacks.
pub fn to_quanx(rule: &Rule, policy: impl Fn(&str) -> String) -> Option<String> {
    let rule_type = match rule.rule_type.as_str() {
        "MATCH" => return Some(format!("final, {}", policy(&rule.policy))),
        "DOMAIN" => "host",
        "DOMAIN-SUFFIX" => "host-suffix",
        "DOMAIN-KEYWORD" => "host-keyword",
        "IP-CIDR" => "ip-cidr",
        "IP-CIDR6" => "ip6-cidr",
        "GEOIP" => "geoip",
        "USER-AGENT" => "user-agent",
        other => {
            debug!("Rule type {} has no Quantumult X equivalent", other);
            return None;
        }
    };
    Some(format!("{}, {}, {}", rule_type, rule.value, policy(&rule.policy)))
}

/// sing-box route rule, or `None` for the fallback and unsupported types.
pub fn to_singbox(rule: &Rule) -> Option<Value> {
    let key = match rule.rule_type.as_str() {
        "DOMAIN" => "domain",
        "DOMAIN-SUFFIX" => "domain_suffix",
        "DOMAIN-KEYWORD" => "domain_keyword",
        "DOMAIN-REGEX" => "domain_regex",
        "IP-CIDR" | "IP-CIDR6" => "ip_cidr",
        "SRC-IP-CIDR" => "source_ip_cidr",
        "PROCESS-NAME" => "process_name",
        "DST-PORT" => {
            let port: u16 = rule.value.parse().ok()?;
            return Some(json!({ "port": [port], "outbound": singbox_policy(&rule.policy) }));
        }
        other => {
            if other != "MATCH" {
                debug!("Rule type {} has no sing-box equivalent", other);
            }
            return None;
        }
    };
    let mut object = Map::new();
    object.insert(key.to_string(), json!([rule.value]));
    object.insert("outbound".to_string(), json!(singbox_policy(&rule.policy)));
    Some(Value::Object(object))
}

/// Outbound tag for a clash policy name in sing-box documents.
pub fn singbox_policy(policy: &str) -> String {
    match policy {
        DIRECT => "direct".to_string(),
        REJECT => "block".to_string(),
        other => other.to_string(),
    }
}
