use log::info;
use serde_json::{json, Value};

use crate::constants::log_level::singbox_log_level;
use crate::constants::DEFAULT_GROUP_NAME;
use crate::error::Result;
use crate::generator::config::formats::{convert_supported, SsPlugin};
use crate::generator::config::group::{build_groups, ResolvedGroup};
use crate::generator::config::ruleconvert::{collect_rules, singbox_policy, to_singbox};
use crate::models::{GroupType, OverrideConfig, Proxy, ProxyKind, SubconverterTarget};

const MIXED_PORT: u16 = 2080;

/// Convert proxies to SingBox format
///
/// Outbounds are the proxies in input order, then the proxy groups as
/// `selector`/`urltest` outbounds, then `direct` and `block`. Clash rules
/// are translated into `route.rules` and the fallback rule becomes
/// `route.final`.
pub fn proxy_to_singbox(nodes: &[Proxy], config: &OverrideConfig) -> Result<String> {
    let converted =
        convert_supported(nodes, SubconverterTarget::SingBox, config, proxy_to_singbox_outbound)?;
    let rendered: Vec<&Proxy> = converted.iter().map(|(node, _)| *node).collect();
    let groups = build_groups(&rendered, config)?;

    let mut outbounds: Vec<Value> = converted.into_iter().map(|(_, outbound)| outbound).collect();
    let proxy_count = outbounds.len();
    outbounds.extend(groups.iter().map(group_to_outbound));
    outbounds.push(json!({ "type": "direct", "tag": "direct" }));
    outbounds.push(json!({ "type": "block", "tag": "block" }));

    let mut route_rules = Vec::new();
    let mut final_outbound = DEFAULT_GROUP_NAME.to_string();
    for rule in collect_rules(config) {
        if rule.is_final() {
            final_outbound = singbox_policy(&rule.policy);
        } else if let Some(route_rule) = to_singbox(&rule) {
            route_rules.push(route_rule);
        }
    }

    let (level, disabled) = singbox_log_level(config.log_level());
    let document = json!({
        "log": {
            "disabled": disabled,
            "level": level,
            "timestamp": true
        },
        "inbounds": [{
            "type": "mixed",
            "tag": "mixed-in",
            "listen": "127.0.0.1",
            "listen_port": MIXED_PORT
        }],
        "outbounds": outbounds,
        "route": {
            "rules": route_rules,
            "final": final_outbound,
            "auto_detect_interface": true
        }
    });

    info!(
        "Rendered sing-box config with {} proxies and {} groups",
        proxy_count,
        groups.len()
    );
    Ok(serde_json::to_string_pretty(&document)?)
}

fn group_to_outbound(group: &ResolvedGroup) -> Value {
    let members: Vec<String> = group.members.iter().map(|m| singbox_policy(m)).collect();

    match group.group_type {
        GroupType::Select => json!({
            "type": "selector",
            "tag": group.name,
            "outbounds": members
        }),
        // sing-box has no fallback or load-balance outbound; urltest is the
        // closest health-checked equivalent.
        GroupType::UrlTest | GroupType::Fallback | GroupType::LoadBalance => {
            let mut outbound = json!({
                "type": "urltest",
                "tag": group.name,
                "outbounds": members,
                "url": group.url,
                "interval": format!("{}s", group.interval)
            });
            if let Some(tolerance) = group.tolerance {
                outbound["tolerance"] = json!(tolerance);
            }
            outbound
        }
    }
}

fn proxy_to_singbox_outbound(node: &Proxy) -> std::result::Result<Value, String> {
    let remark = node.display_name();

    match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            let mut outbound = json!({
                "type": "shadowsocks",
                "tag": remark,
                "server": node.server,
                "server_port": node.port,
                "method": cipher,
                "password": password
            });

            // Validate before passing the SIP003 plugin through unchanged
            if SsPlugin::parse(plugin.as_deref(), plugin_opts.as_deref())?.is_some() {
                outbound["plugin"] = json!(plugin);
                if let Some(opts) = plugin_opts.as_deref().filter(|o| !o.is_empty()) {
                    outbound["plugin_opts"] = json!(opts);
                }
            }
            Ok(outbound)
        }
        ProxyKind::ShadowsocksR { .. } => Err("ShadowsocksR has no sing-box outbound".to_string()),
        ProxyKind::VMess {
            uuid,
            alter_id,
            security,
            network,
            header_type,
            host,
            path,
            tls,
            sni,
        } => {
            let mut outbound = json!({
                "type": "vmess",
                "tag": remark,
                "server": node.server,
                "server_port": node.port,
                "uuid": uuid,
                "alter_id": alter_id,
                "security": security
            });

            if *tls {
                let server_name = sni.as_deref().unwrap_or(host.as_str());
                outbound["tls"] = json!({ "enabled": true });
                if !server_name.is_empty() {
                    outbound["tls"]["server_name"] = json!(server_name);
                }
            }

            match network.as_str() {
                "tcp" if header_type == "http" => {
                    outbound["transport"] = http_transport(host, path);
                }
                "tcp" => {}
                "ws" => outbound["transport"] = ws_transport(host, path),
                "h2" | "http" => outbound["transport"] = http_transport(host, path),
                "grpc" => {
                    outbound["transport"] = json!({ "type": "grpc", "service_name": path });
                }
                other => return Err(format!("network {} is not supported", other)),
            }
            Ok(outbound)
        }
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        } => {
            let mut outbound = json!({
                "type": "trojan",
                "tag": remark,
                "server": node.server,
                "server_port": node.port,
                "password": password,
                "tls": {
                    "enabled": true,
                    "server_name": sni,
                    "insecure": skip_cert_verify
                }
            });

            match network.as_deref() {
                None => {}
                Some("ws") => outbound["transport"] = ws_transport(host, path),
                Some("grpc") => {
                    outbound["transport"] = json!({ "type": "grpc", "service_name": path });
                }
                Some(other) => return Err(format!("network {} is not supported", other)),
            }
            Ok(outbound)
        }
    }
}

fn ws_transport(host: &str, path: &str) -> Value {
    let mut transport = json!({ "type": "ws", "path": path });
    if !host.is_empty() {
        transport["headers"] = json!({ "Host": host });
    }
    transport
}

fn http_transport(host: &str, path: &str) -> Value {
    let mut transport = json!({ "type": "http" });
    if !host.is_empty() {
        transport["host"] = json!([host]);
    }
    if !path.is_empty() {
        transport["path"] = json!(path);
    }
    transport
}
