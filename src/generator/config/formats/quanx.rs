use log::info;

use crate::constants::{DIRECT, REJECT};
use crate::error::Result;
use crate::generator::config::formats::{
    convert_supported, line_value, sanitize_line_name, SsPlugin,
};
use crate::generator::config::group::build_groups;
use crate::generator::config::ruleconvert::{collect_rules, to_quanx};
use crate::models::{GroupType, OverrideConfig, Proxy, ProxyKind, SubconverterTarget};

/// Convert proxies to Quantumult X format
///
/// Emits `[server_local]`, `[policy]` and `[filter_local]`. Each server line
/// ends with `tag=<name>`.
pub fn proxy_to_quanx(nodes: &[Proxy], config: &OverrideConfig) -> Result<String> {
    let converted =
        convert_supported(nodes, SubconverterTarget::QuantumultX, config, proxy_to_quanx_line)?;
    let rendered: Vec<&Proxy> = converted.iter().map(|(node, _)| *node).collect();
    let groups = build_groups(&rendered, config)?;

    let mut server_config = String::from("[server_local]\n");
    for (_, line) in &converted {
        server_config.push_str(line);
        server_config.push('\n');
    }

    let mut policy_config = String::from("[policy]\n");
    for group in &groups {
        let kind = match group.group_type {
            GroupType::Select => "static",
            GroupType::UrlTest => "url-latency-benchmark",
            GroupType::Fallback => "available",
            GroupType::LoadBalance => "round-robin",
        };
        let members: Vec<String> = group.members.iter().map(|m| quanx_policy(m)).collect();
        let mut line = format!(
            "{}={}, {}",
            kind,
            sanitize_line_name(&group.name),
            members.join(", ")
        );
        match group.group_type {
            GroupType::UrlTest => {
                line.push_str(&format!(
                    ", check-interval={}, tolerance={}",
                    group.interval,
                    group.tolerance.unwrap_or(0)
                ));
            }
            GroupType::Fallback => {
                line.push_str(&format!(", check-interval={}", group.interval));
            }
            _ => {}
        }
        policy_config.push_str(&line);
        policy_config.push('\n');
    }

    let mut filter_config = String::from("[filter_local]\n");
    for rule in collect_rules(config) {
        if let Some(line) = to_quanx(&rule, quanx_policy) {
            filter_config.push_str(&line);
            filter_config.push('\n');
        }
    }

    info!(
        "Rendered quantumult x config with {} servers and {} policies",
        converted.len(),
        groups.len()
    );
    Ok(format!("{}\n{}\n{}", server_config, policy_config, filter_config))
}

/// Built-in policies are lowercase in Quantumult X.
fn quanx_policy(name: &str) -> String {
    match name {
        DIRECT => "direct".to_string(),
        REJECT => "reject".to_string(),
        other => sanitize_line_name(other),
    }
}

/// One `[server_local]` line, or the reason the node cannot be expressed.
fn proxy_to_quanx_line(node: &Proxy) -> std::result::Result<String, String> {
    let endpoint = format!("{}:{}", node.server_for_uri(), node.port);
    let mut line = match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            let mut line = format!(
                "shadowsocks={}, method={}, password={}",
                endpoint,
                cipher,
                line_value("password", password)?
            );
            match SsPlugin::parse(plugin.as_deref(), plugin_opts.as_deref())? {
                None => {}
                Some(SsPlugin::Obfs { mode, host }) => {
                    line.push_str(&format!(", obfs={}", mode));
                    if let Some(host) = host {
                        line.push_str(&format!(", obfs-host={}", line_value("obfs-host", &host)?));
                    }
                }
                Some(SsPlugin::V2Ray {
                    mode, host, path, tls, ..
                }) => {
                    if mode != "websocket" {
                        return Err(format!("v2ray-plugin mode {} is not supported", mode));
                    }
                    line.push_str(if tls { ", obfs=wss" } else { ", obfs=ws" });
                    if let Some(host) = host {
                        line.push_str(&format!(", obfs-host={}", line_value("obfs-host", &host)?));
                    }
                    if let Some(path) = path {
                        line.push_str(&format!(", obfs-uri={}", line_value("path", &path)?));
                    }
                }
            }
            line.push_str(", fast-open=false, udp-relay=true");
            line
        }
        ProxyKind::ShadowsocksR {
            cipher,
            password,
            protocol,
            protocol_param,
            obfs,
            obfs_param,
            ..
        } => {
            let mut line = format!(
                "shadowsocks={}, method={}, password={}, ssr-protocol={}",
                endpoint,
                cipher,
                line_value("password", password)?,
                protocol
            );
            if !protocol_param.is_empty() {
                line.push_str(&format!(
                    ", ssr-protocol-param={}",
                    line_value("protocol-param", protocol_param)?
                ));
            }
            line.push_str(&format!(", obfs={}", obfs));
            if !obfs_param.is_empty() {
                line.push_str(&format!(", obfs-host={}", line_value("obfs-param", obfs_param)?));
            }
            line.push_str(", fast-open=false, udp-relay=false");
            line
        }
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
            let method = if security == "auto" {
                "chacha20-poly1305"
            } else {
                security.as_str()
            };
            let mut line = format!(
                "vmess={}, method={}, password={}",
                endpoint,
                method,
                line_value("uuid", uuid)?
            );
            let tls_host = line_value("sni", sni.as_deref().unwrap_or(host.as_str()))?;

            match network.as_str() {
                "ws" => {
                    line.push_str(if *tls { ", obfs=wss" } else { ", obfs=ws" });
                    push_obfs_target(&mut line, host, path)?;
                    if *tls && !tls_host.is_empty() {
                        line.push_str(&format!(", tls-host={}", tls_host));
                    }
                }
                "tcp" if header_type == "http" => {
                    line.push_str(", obfs=http");
                    push_obfs_target(&mut line, host, path)?;
                }
                "tcp" => {
                    if *tls {
                        line.push_str(", over-tls=true");
                        if !tls_host.is_empty() {
                            line.push_str(&format!(", tls-host={}", tls_host));
                        }
                    }
                }
                other => return Err(format!("network {} is not supported", other)),
            }
            if *alter_id != 0 {
                line.push_str(", aead=false");
            }
            line.push_str(", fast-open=false, udp-relay=false");
            line
        }
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        } => {
            let mut line = format!(
                "trojan={}, password={}",
                endpoint,
                line_value("password", password)?
            );
            match network.as_deref() {
                None => line.push_str(", over-tls=true"),
                Some("ws") => {
                    line.push_str(", obfs=wss");
                    push_obfs_target(&mut line, host, path)?;
                }
                Some(other) => return Err(format!("network {} is not supported", other)),
            }
            line.push_str(&format!(
                ", tls-host={}, tls-verification={}, fast-open=false, udp-relay=false",
                line_value("sni", sni)?,
                !skip_cert_verify
            ));
            line
        }
    };

    line.push_str(&format!(", tag={}", sanitize_line_name(&node.display_name())));
    Ok(line)
}

fn push_obfs_target(line: &mut String, host: &str, path: &str) -> std::result::Result<(), String> {
    if !host.is_empty() {
        line.push_str(&format!(", obfs-host={}", line_value("host", host)?));
    }
    if !path.is_empty() {
        line.push_str(&format!(", obfs-uri={}", line_value("path", path)?));
    }
    Ok(())
}
