use log::info;

use crate::constants::log_level::clash_log_level;
use crate::error::Result;
use crate::generator::config::formats::{convert_supported, SsPlugin};
use crate::generator::config::group::{build_groups, ResolvedGroup};
use crate::generator::config::ruleconvert::{collect_rules, to_clash};
use crate::generator::yaml::clash_output::{
    ClashProxy, ClashProxyGroup, ClashYamlOutput, CommonProxyOptions, GrpcOpts, H2Opts,
    HostHeader, HttpHeaders, HttpOpts, PluginOpts, WsOpts,
};
use crate::models::{GroupType, OverrideConfig, Proxy, ProxyKind, SubconverterTarget};

/// Convert proxies to Clash format
///
/// Builds the whole document (general keys, proxies, proxy groups and
/// rules) and serializes it as YAML, or as pretty JSON when `outputJson` is
/// set.
///
/// # Arguments
/// * `nodes` - List of proxy nodes to convert
/// * `config` - Caller overrides (groups, rules, log level)
/// * `clash_r` - Whether to use ClashR parameter names for SSR
pub fn proxy_to_clash(nodes: &[Proxy], config: &OverrideConfig, clash_r: bool) -> Result<String> {
    let doc = proxy_to_clash_output(nodes, config, clash_r)?;
    info!(
        "Rendered clash document with {} proxies and {} groups",
        doc.proxies.len(),
        doc.proxy_groups.len()
    );

    if config.output_json {
        Ok(serde_json::to_string_pretty(&doc)?)
    } else {
        Ok(serde_yaml::to_string(&doc)?)
    }
}

/// Build the Clash document model without serializing it.
pub fn proxy_to_clash_output(
    nodes: &[Proxy],
    config: &OverrideConfig,
    clash_r: bool,
) -> Result<ClashYamlOutput> {
    let target = if clash_r {
        SubconverterTarget::ClashR
    } else {
        SubconverterTarget::Clash
    };
    let converted = convert_supported(nodes, target, config, |node| proxy_to_clash_proxy(node, clash_r))?;

    let rendered: Vec<&Proxy> = converted.iter().map(|(node, _)| *node).collect();
    let proxy_groups = build_groups(&rendered, config)?
        .into_iter()
        .map(to_clash_group)
        .collect();

    Ok(ClashYamlOutput {
        log_level: clash_log_level(config.log_level()).to_string(),
        proxies: converted.into_iter().map(|(_, proxy)| proxy).collect(),
        proxy_groups,
        rules: collect_rules(config).iter().map(to_clash).collect(),
        ..Default::default()
    })
}

/// Map a single node to its Clash proxy entry.
fn proxy_to_clash_proxy(node: &Proxy, clash_r: bool) -> std::result::Result<ClashProxy, String> {
    let mut common = CommonProxyOptions::new(node.display_name(), node.server.clone(), node.port);

    let proxy = match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            common.udp = Some(true);
            let (plugin, plugin_opts) =
                match SsPlugin::parse(plugin.as_deref(), plugin_opts.as_deref())? {
                    None => (None, None),
                    Some(SsPlugin::Obfs { mode, host }) => (
                        Some("obfs".to_string()),
                        Some(PluginOpts {
                            mode,
                            host,
                            ..Default::default()
                        }),
                    ),
                    Some(SsPlugin::V2Ray {
                        mode,
                        host,
                        path,
                        tls,
                        mux,
                    }) => (
                        Some("v2ray-plugin".to_string()),
                        Some(PluginOpts {
                            mode,
                            host,
                            path,
                            tls,
                            mux,
                        }),
                    ),
                };
            ClashProxy::Shadowsocks {
                common,
                cipher: cipher.clone(),
                password: password.clone(),
                plugin,
                plugin_opts,
            }
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
            common.udp = Some(true);
            // Clash only accepts the SSR ciphers it implements; "none" is spelled "dummy"
            let cipher: &str = if cipher == "none" { "dummy" } else { cipher };
            let (protocol_param, obfs_param, protocolparam, obfsparam) = if clash_r {
                (None, None, Some(protocol_param.clone()), Some(obfs_param.clone()))
            } else {
                (Some(protocol_param.clone()), Some(obfs_param.clone()), None, None)
            };
            ClashProxy::ShadowsocksR {
                common,
                cipher: cipher.to_string(),
                password: password.clone(),
                protocol: protocol.clone(),
                obfs: obfs.clone(),
                protocol_param,
                obfs_param,
                protocolparam,
                obfsparam,
            }
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
            common.udp = Some(true);
            common.tls = Some(*tls);
            let mut network_name = Some(network.clone());
            let (mut ws_opts, mut h2_opts, mut http_opts, mut grpc_opts) = (None, None, None, None);

            match network.as_str() {
                "tcp" if header_type == "http" => {
                    network_name = Some("http".to_string());
                    http_opts = Some(HttpOpts {
                        method: "GET".to_string(),
                        path: vec![if path.is_empty() { "/".to_string() } else { path.clone() }],
                        headers: non_empty(host).map(|host| HttpHeaders { host: vec![host] }),
                    });
                }
                "tcp" => network_name = None,
                "ws" => {
                    ws_opts = Some(WsOpts {
                        path: if path.is_empty() { "/".to_string() } else { path.clone() },
                        headers: non_empty(host).map(|host| HostHeader { host }),
                    });
                }
                "h2" | "http" => {
                    network_name = Some("h2".to_string());
                    h2_opts = Some(H2Opts {
                        host: non_empty(host).into_iter().collect(),
                        path: if path.is_empty() { "/".to_string() } else { path.clone() },
                    });
                }
                "grpc" => {
                    grpc_opts = Some(GrpcOpts {
                        grpc_service_name: path.clone(),
                    });
                }
                other => return Err(format!("network {} is not supported", other)),
            }

            ClashProxy::VMess {
                common,
                uuid: uuid.clone(),
                alter_id: *alter_id,
                cipher: security.clone(),
                network: network_name,
                ws_opts,
                h2_opts,
                http_opts,
                grpc_opts,
                servername: sni.clone().filter(|_| *tls),
            }
        }
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        } => {
            common.udp = Some(true);
            common.sni = non_empty(sni);
            common.skip_cert_verify = Some(*skip_cert_verify);
            let (ws_opts, grpc_opts) = match network.as_deref() {
                None => (None, None),
                Some("ws") => (
                    Some(WsOpts {
                        path: if path.is_empty() { "/".to_string() } else { path.clone() },
                        headers: non_empty(host).map(|host| HostHeader { host }),
                    }),
                    None,
                ),
                Some("grpc") => (
                    None,
                    Some(GrpcOpts {
                        grpc_service_name: path.clone(),
                    }),
                ),
                Some(other) => return Err(format!("network {} is not supported", other)),
            };
            ClashProxy::Trojan {
                common,
                password: password.clone(),
                network: network.clone(),
                ws_opts,
                grpc_opts,
            }
        }
    };

    Ok(proxy)
}

fn to_clash_group(group: ResolvedGroup) -> ClashProxyGroup {
    let ResolvedGroup {
        name,
        group_type,
        url,
        interval,
        tolerance,
        members: proxies,
    } = group;

    match group_type {
        GroupType::Select => ClashProxyGroup::Select { name, proxies },
        GroupType::UrlTest => ClashProxyGroup::UrlTest {
            name,
            proxies,
            url,
            interval,
            tolerance,
        },
        GroupType::Fallback => ClashProxyGroup::Fallback {
            name,
            proxies,
            url,
            interval,
        },
        GroupType::LoadBalance => ClashProxyGroup::LoadBalance {
            name,
            proxies,
            url,
            interval,
            strategy: "consistent-hashing".to_string(),
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupDef;
    use serde_json::Value;

    fn ss(name: &str, plugin: Option<&str>, opts: Option<&str>) -> Proxy {
        Proxy::new(
            name,
            "10.0.0.1",
            8388,
            ProxyKind::Shadowsocks {
                cipher: "aes-256-gcm".to_string(),
                password: "test".to_string(),
                plugin: plugin.map(str::to_string),
                plugin_opts: opts.map(str::to_string),
            },
        )
    }

    fn ssr() -> Proxy {
        Proxy::new(
            "TargetSSR",
            "192.168.1.1",
            8388,
            ProxyKind::ShadowsocksR {
                cipher: "aes-256-cfb".to_string(),
                password: "test".to_string(),
                protocol: "auth_aes128_md5".to_string(),
                protocol_param: "p".to_string(),
                obfs: "tls1.2_ticket_auth".to_string(),
                obfs_param: "o".to_string(),
                group: String::new(),
            },
        )
    }

    fn vmess_ws() -> Proxy {
        Proxy::new(
            "TargetVMess",
            "10.0.0.3",
            8443,
            ProxyKind::VMess {
                uuid: "b8be1234-5678-90ab-cdef-1234567890ab".to_string(),
                alter_id: 0,
                security: "auto".to_string(),
                network: "ws".to_string(),
                header_type: "none".to_string(),
                host: "vmess.example.com".to_string(),
                path: "/ws".to_string(),
                tls: true,
                sni: None,
            },
        )
    }

    fn render_json(nodes: &[Proxy], config: &OverrideConfig, clash_r: bool) -> Value {
        let config = config.clone().with_output_json(true);
        serde_json::from_str(&proxy_to_clash(nodes, &config, clash_r).unwrap()).unwrap()
    }

    #[test]
    fn test_clash_proxies_and_catch_all() {
        let nodes = [ss("TargetSS", None, None), vmess_ws()];
        let doc = render_json(&nodes, &OverrideConfig::default(), false);

        assert_eq!(doc["log-level"], "info");
        assert_eq!(doc["proxies"].as_array().unwrap().len(), 2);
        assert_eq!(doc["proxies"][0]["cipher"], "aes-256-gcm");
        assert_eq!(doc["proxies"][1]["type"], "vmess");
        assert_eq!(doc["proxies"][1]["alterId"], 0);
        assert_eq!(doc["proxies"][1]["network"], "ws");
        assert_eq!(doc["proxies"][1]["tls"], true);
        assert_eq!(doc["proxies"][1]["ws-opts"]["path"], "/ws");
        assert_eq!(doc["proxies"][1]["ws-opts"]["headers"]["Host"], "vmess.example.com");

        assert_eq!(doc["proxy-groups"][0]["name"], "Proxy");
        assert_eq!(
            doc["proxy-groups"][0]["proxies"],
            serde_json::json!(["TargetSS", "TargetVMess"])
        );
        assert_eq!(doc["rules"], serde_json::json!(["MATCH,Proxy"]));
    }

    #[test]
    fn test_ssr_param_names_differ_for_clashr() {
        let nodes = [ssr()];
        let clash = render_json(&nodes, &OverrideConfig::default(), false);
        assert_eq!(clash["proxies"][0]["protocol-param"], "p");
        assert!(clash["proxies"][0].get("protocolparam").is_none());

        let clash_r = render_json(&nodes, &OverrideConfig::default(), true);
        assert_eq!(clash_r["proxies"][0]["protocolparam"], "p");
        assert_eq!(clash_r["proxies"][0]["obfsparam"], "o");
        assert!(clash_r["proxies"][0].get("obfs-param").is_none());
    }

    #[test]
    fn test_ss_plugins() {
        let nodes = [
            ss("obfs", Some("simple-obfs"), Some("obfs=http;obfs-host=bing.com")),
            ss("v2", Some("v2ray-plugin"), Some("mode=websocket;tls;host=cdn.com;path=/ray")),
        ];
        let doc = render_json(&nodes, &OverrideConfig::default(), false);
        assert_eq!(doc["proxies"][0]["plugin"], "obfs");
        assert_eq!(doc["proxies"][0]["plugin-opts"]["mode"], "http");
        assert_eq!(doc["proxies"][0]["plugin-opts"]["host"], "bing.com");
        assert_eq!(doc["proxies"][1]["plugin"], "v2ray-plugin");
        assert_eq!(doc["proxies"][1]["plugin-opts"]["tls"], true);
        assert_eq!(doc["proxies"][1]["plugin-opts"]["path"], "/ray");

        let bad = [ss("kcp", Some("kcptun"), None)];
        let err = proxy_to_clash(&bad, &OverrideConfig::default(), false).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedFeatureError");
    }

    #[test]
    fn test_user_groups_and_rules() {
        let mut config = OverrideConfig::default();
        config.clash_options.log_level = Some("warning".to_string());
        let mut ai = GroupDef::new("AI Services", GroupType::UrlTest);
        ai.include_all = true;
        ai.filter = Some("VMess".to_string());
        config.clash_options.groups.push(ai);
        config.clash_options.rules = vec![
            "DOMAIN-KEYWORD,openai,AI Services".to_string(),
            "DOMAIN-KEYWORD,openai,AI Services".to_string(),
        ];

        let doc = render_json(&[ss("TargetSS", None, None), vmess_ws()], &config, false);
        assert_eq!(doc["log-level"], "warning");
        assert_eq!(doc["proxy-groups"][0]["proxies"][0], "AI Services");
        assert_eq!(doc["proxy-groups"][1]["type"], "url-test");
        assert_eq!(doc["proxy-groups"][1]["proxies"], serde_json::json!(["TargetVMess"]));
        assert_eq!(doc["proxy-groups"][1]["interval"], 300);
        assert_eq!(
            doc["rules"],
            serde_json::json!(["DOMAIN-KEYWORD,openai,AI Services", "MATCH,Proxy"])
        );
    }

    #[test]
    fn test_yaml_and_json_carry_same_data() {
        let nodes = [ss("TargetSS", None, None), ssr(), vmess_ws()];
        let config = OverrideConfig::default();
        let yaml = proxy_to_clash(&nodes, &config, false).unwrap();
        let from_yaml: Value = serde_yaml::from_str(&yaml).unwrap();

        assert!(yaml.contains("proxies:"));
        assert!(yaml.contains("proxy-groups:"));
        assert_eq!(from_yaml, render_json(&nodes, &config, false));
    }
}
