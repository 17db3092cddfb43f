use log::info;

use crate::error::Result;
use crate::generator::config::formats::{
    convert_supported, line_value, sanitize_line_name, SsPlugin,
};
use crate::generator::config::group::build_groups;
use crate::generator::config::ruleconvert::{collect_rules, to_surge};
use crate::models::{GroupType, OverrideConfig, Proxy, ProxyKind, SubconverterTarget};

/// Convert proxies to Surge format
///
/// Emits the `[Proxy]`, `[Proxy Group]` and `[Rule]` sections. Names are
/// sanitized so `,` and `=` cannot split a line.
pub fn proxy_to_surge(nodes: &[Proxy], config: &OverrideConfig) -> Result<String> {
    let converted = convert_supported(nodes, SubconverterTarget::Surge, config, proxy_to_surge_line)?;
    let rendered: Vec<&Proxy> = converted.iter().map(|(node, _)| *node).collect();
    let groups = build_groups(&rendered, config)?;

    let mut proxy_config = String::from("[Proxy]\n");
    for (_, line) in &converted {
        proxy_config.push_str(line);
        proxy_config.push('\n');
    }

    let mut group_config = String::from("[Proxy Group]\n");
    for group in &groups {
        let members: Vec<String> = group.members.iter().map(|m| sanitize_line_name(m)).collect();
        let mut line = format!(
            "{} = {}, {}",
            sanitize_line_name(&group.name),
            group.group_type.as_str(),
            members.join(", ")
        );
        if group.group_type.is_health_checked() {
            line.push_str(&format!(", url={}, interval={}", group.url, group.interval));
        }
        if group.group_type == GroupType::UrlTest {
            if let Some(tolerance) = group.tolerance {
                line.push_str(&format!(", tolerance={}", tolerance));
            }
        }
        group_config.push_str(&line);
        group_config.push('\n');
    }

    let mut rule_config = String::from("[Rule]\n");
    for rule in collect_rules(config) {
        rule_config.push_str(&to_surge(&rule, |policy| sanitize_line_name(policy)));
        rule_config.push('\n');
    }

    info!(
        "Rendered surge config with {} proxies and {} groups",
        converted.len(),
        groups.len()
    );
    Ok(format!("{}\n{}\n{}", proxy_config, group_config, rule_config))
}

/// One `[Proxy]` line, or the reason the node cannot be expressed.
fn proxy_to_surge_line(node: &Proxy) -> std::result::Result<String, String> {
    let remark = sanitize_line_name(&node.display_name());

    let line = match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            let mut line = format!(
                "{} = ss, {}, {}, encrypt-method={}, password={}",
                remark,
                node.server,
                node.port,
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
                Some(SsPlugin::V2Ray { .. }) => {
                    return Err("v2ray-plugin is not supported".to_string());
                }
            }
            line.push_str(", udp-relay=true");
            line
        }
        ProxyKind::ShadowsocksR { .. } => {
            return Err("ShadowsocksR has no Surge proxy type".to_string());
        }
        ProxyKind::VMess {
            uuid,
            alter_id,
            network,
            host,
            path,
            tls,
            sni,
            ..
        } => {
            let mut line = format!(
                "{} = custom, {}, {}, username={}",
                remark,
                node.server,
                node.port,
                line_value("uuid", uuid)?
            );
            match network.as_str() {
                "tcp" => line.push_str(", transport=tcp"),
                "ws" => {
                    line.push_str(", transport=ws, ws=true");
                    if !path.is_empty() {
                        line.push_str(&format!(", ws-path={}", line_value("path", path)?));
                    }
                    if !host.is_empty() {
                        line.push_str(&format!(", ws-headers=Host:{}", line_value("host", host)?));
                    }
                }
                other => return Err(format!("network {} is not supported", other)),
            }
            if *tls {
                line.push_str(", tls=true");
                if let Some(sni) = sni {
                    line.push_str(&format!(", sni={}", line_value("sni", sni)?));
                }
            }
            if *alter_id == 0 {
                line.push_str(", vmess-aead=true");
            }
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
                "{} = trojan, {}, {}, password={}, sni={}",
                remark,
                node.server,
                node.port,
                line_value("password", password)?,
                line_value("sni", sni)?
            );
            if *skip_cert_verify {
                line.push_str(", skip-cert-verify=true");
            }
            match network.as_deref() {
                None => {}
                Some("ws") => {
                    line.push_str(", ws=true");
                    if !path.is_empty() {
                        line.push_str(&format!(", ws-path={}", line_value("path", path)?));
                    }
                    if !host.is_empty() {
                        line.push_str(&format!(", ws-headers=Host:{}", line_value("host", host)?));
                    }
                }
                Some(other) => return Err(format!("network {} is not supported", other)),
            }
            line
        }
    };

    Ok(line)
}
