use log::info;
use serde_json::{json, Value};

use crate::constants::log_level::v2ray_log_level;
use crate::error::Result;
use crate::generator::config::formats::{convert_supported, SsPlugin};
use crate::models::{OverrideConfig, Proxy, ProxyKind, SubconverterTarget};

const SOCKS_PORT: u16 = 10808;
const HTTP_PORT: u16 = 10809;

/// Convert proxies to a V2Ray client configuration
///
/// Proxies become outbounds in input order, tagged with their names and
/// followed by the `direct` and `block` outbounds. Private addresses are
/// routed to `direct`.
pub fn proxy_to_v2ray(nodes: &[Proxy], config: &OverrideConfig) -> Result<String> {
    let converted = convert_supported(nodes, SubconverterTarget::V2Ray, config, proxy_to_v2ray_outbound)?;

    let mut outbounds: Vec<Value> = converted.into_iter().map(|(_, outbound)| outbound).collect();
    let proxy_count = outbounds.len();
    outbounds.push(json!({ "protocol": "freedom", "tag": "direct" }));
    outbounds.push(json!({ "protocol": "blackhole", "tag": "block" }));

    let document = json!({
        "log": {
            "loglevel": v2ray_log_level(config.log_level())
        },
        "inbounds": [
            {
                "tag": "socks",
                "listen": "127.0.0.1",
                "port": SOCKS_PORT,
                "protocol": "socks",
                "settings": { "auth": "noauth", "udp": true },
                "sniffing": { "enabled": true, "destOverride": ["http", "tls"] }
            },
            {
                "tag": "http",
                "listen": "127.0.0.1",
                "port": HTTP_PORT,
                "protocol": "http",
                "settings": {}
            }
        ],
        "outbounds": outbounds,
        "routing": {
            "domainStrategy": "IPIfNonMatch",
            "rules": [
                { "type": "field", "ip": ["geoip:private"], "outboundTag": "direct" }
            ]
        }
    });

    info!("Rendered v2ray config with {} proxy outbounds", proxy_count);
    Ok(serde_json::to_string_pretty(&document)?)
}

fn proxy_to_v2ray_outbound(node: &Proxy) -> std::result::Result<Value, String> {
    let remark = node.display_name();

    match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            if SsPlugin::parse(plugin.as_deref(), plugin_opts.as_deref())?.is_some() {
                return Err("shadowsocks plugins are not supported".to_string());
            }
            Ok(json!({
                "protocol": "shadowsocks",
                "tag": remark,
                "settings": {
                    "servers": [{
                        "address": node.server,
                        "port": node.port,
                        "method": cipher,
                        "password": password
                    }]
                }
            }))
        }
        ProxyKind::ShadowsocksR { .. } => Err("ShadowsocksR has no V2Ray outbound".to_string()),
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
            let mut stream = json!({
                "network": network,
                "security": if *tls { "tls" } else { "none" }
            });
            if *tls {
                let server_name = sni.as_deref().unwrap_or(host.as_str());
                stream["tlsSettings"] = if server_name.is_empty() {
                    json!({})
                } else {
                    json!({ "serverName": server_name })
                };
            }

            match network.as_str() {
                "tcp" => {
                    if header_type == "http" {
                        let request_path = if path.is_empty() { "/" } else { path.as_str() };
                        stream["tcpSettings"] = json!({
                            "header": {
                                "type": "http",
                                "request": {
                                    "path": [request_path],
                                    "headers": { "Host": non_empty_list(host) }
                                }
                            }
                        });
                    }
                }
                "ws" => {
                    stream["wsSettings"] = json!({ "path": path });
                    if !host.is_empty() {
                        stream["wsSettings"]["headers"] = json!({ "Host": host });
                    }
                }
                "h2" | "http" => {
                    stream["network"] = json!("http");
                    stream["httpSettings"] = json!({
                        "host": non_empty_list(host),
                        "path": path
                    });
                }
                "grpc" => {
                    stream["grpcSettings"] = json!({ "serviceName": path });
                }
                "kcp" | "quic" => {}
                other => return Err(format!("network {} is not supported", other)),
            }

            Ok(json!({
                "protocol": "vmess",
                "tag": remark,
                "settings": {
                    "vnext": [{
                        "address": node.server,
                        "port": node.port,
                        "users": [{
                            "id": uuid,
                            "alterId": alter_id,
                            "security": security
                        }]
                    }]
                },
                "streamSettings": stream
            }))
        }
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        } => {
            let mut stream = json!({
                "network": network.as_deref().unwrap_or("tcp"),
                "security": "tls",
                "tlsSettings": {
                    "serverName": sni,
                    "allowInsecure": skip_cert_verify
                }
            });
            match network.as_deref() {
                None => {}
                Some("ws") => {
                    stream["wsSettings"] = json!({ "path": path });
                    if !host.is_empty() {
                        stream["wsSettings"]["headers"] = json!({ "Host": host });
                    }
                }
                Some("grpc") => {
                    stream["grpcSettings"] = json!({ "serviceName": path });
                }
                Some(other) => return Err(format!("network {} is not supported", other)),
            }

            Ok(json!({
                "protocol": "trojan",
                "tag": remark,
                "settings": {
                    "servers": [{
                        "address": node.server,
                        "port": node.port,
                        "password": password
                    }]
                },
                "streamSettings": stream
            }))
        }
    }
}

fn non_empty_list(value: &str) -> Vec<&str> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value]
    }
}
