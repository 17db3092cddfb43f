pub mod clash;
pub mod quanx;
pub mod singbox;
pub mod single;
pub mod surge;
pub mod v2ray;

// Re-export all format converters
pub use clash::proxy_to_clash;
pub use quanx::proxy_to_quanx;
pub use singbox::proxy_to_singbox;
pub use single::proxy_to_single;
pub use surge::proxy_to_surge;
pub use v2ray::proxy_to_v2ray;

use log::warn;

use crate::error::{Result, SubconvertError};
use crate::models::{OverrideConfig, Proxy, SubconverterTarget};

/// Convert every node with `convert`, which returns the reason when a node
/// cannot be represented in `target`.
///
/// Unrepresentable nodes fail the conversion, or are dropped with a warning
/// when `skipUnsupported` is set.
pub(crate) fn convert_supported<'a, T>(
    nodes: &'a [Proxy],
    target: SubconverterTarget,
    config: &OverrideConfig,
    mut convert: impl FnMut(&Proxy) -> std::result::Result<T, String>,
) -> Result<Vec<(&'a Proxy, T)>> {
    let mut converted = Vec::with_capacity(nodes.len());
    for node in nodes {
        match convert(node) {
            Ok(value) => converted.push((node, value)),
            Err(reason) if config.skip_unsupported => {
                warn!(
                    "Skipping {} proxy {} for {}: {}",
                    node.proxy_type(),
                    node.display_name(),
                    target,
                    reason
                );
            }
            Err(reason) => {
                return Err(SubconvertError::UnsupportedFeature {
                    proxy: node.display_name(),
                    proxy_type: node.proxy_type(),
                    target: target.as_str(),
                    reason,
                })
            }
        }
    }
    Ok(converted)
}

/// Shadowsocks plugin recognized by the config generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SsPlugin {
    /// `obfs-local` / `simple-obfs`
    Obfs { mode: String, host: Option<String> },
    /// `v2ray-plugin`
    V2Ray {
        mode: String,
        host: Option<String>,
        path: Option<String>,
        tls: bool,
        mux: bool,
    },
}

impl SsPlugin {
    /// Interpret a SIP002 plugin name and its `key=value;flag` options.
    pub(crate) fn parse(
        plugin: Option<&str>,
        opts: Option<&str>,
    ) -> std::result::Result<Option<SsPlugin>, String> {
        let plugin = match plugin.map(str::trim).filter(|p| !p.is_empty()) {
            Some(plugin) => plugin,
            None => return Ok(None),
        };

        let opts: Vec<(&str, &str)> = opts
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|opt| !opt.is_empty())
            .map(|opt| opt.split_once('=').unwrap_or((opt, "")))
            .collect();
        let get = |key: &str| {
            opts.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .filter(|v| !v.is_empty())
        };
        let has = |key: &str| opts.iter().any(|(k, _)| *k == key);

        match plugin {
            "obfs-local" | "simple-obfs" => Ok(Some(SsPlugin::Obfs {
                mode: get("obfs").unwrap_or_else(|| "http".to_string()),
                host: get("obfs-host"),
            })),
            "v2ray-plugin" => Ok(Some(SsPlugin::V2Ray {
                mode: get("mode").unwrap_or_else(|| "websocket".to_string()),
                host: get("host"),
                path: get("path"),
                tls: has("tls"),
                mux: get("mux").is_some_and(|v| v != "0" && v != "false"),
            })),
            other => Err(format!("plugin {} is not supported", other)),
        }
    }
}

/// Replace characters that would break `key = value, ...` config lines.
pub(crate) fn sanitize_line_name(name: &str) -> String {
    name.replace(',', "_").replace('=', "-")
}

/// Check a value bound for a `key=value, ...` config line.
///
/// Values cannot be escaped in those formats, so a comma or line break makes
/// the node unrepresentable.
pub(crate) fn line_value<'a>(field: &str, value: &'a str) -> std::result::Result<&'a str, String> {
    if value.contains([',', '\n', '\r']) {
        Err(format!("{} contains a line separator", field))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyKind;

    fn ssr() -> Proxy {
        Proxy::new(
            "R",
            "1.1.1.1",
            8388,
            ProxyKind::ShadowsocksR {
                cipher: "aes-256-cfb".to_string(),
                password: "pw".to_string(),
                protocol: "origin".to_string(),
                protocol_param: String::new(),
                obfs: "plain".to_string(),
                obfs_param: String::new(),
                group: String::new(),
            },
        )
    }

    #[test]
    fn test_convert_supported_strict_and_skip() {
        let nodes = [ssr()];
        let reject = |_: &Proxy| -> std::result::Result<(), String> { Err("no ssr".to_string()) };

        let err = convert_supported(&nodes, SubconverterTarget::Surge, &OverrideConfig::default(), reject)
            .unwrap_err();
        assert_eq!(err.kind(), "UnsupportedFeatureError");
        assert!(err.to_string().contains("surge"));

        let config = OverrideConfig::default().with_skip_unsupported(true);
        let converted = convert_supported(&nodes, SubconverterTarget::Surge, &config, reject).unwrap();
        assert!(converted.is_empty());
    }

    #[test]
    fn test_ss_plugin_parse() {
        assert_eq!(SsPlugin::parse(None, None), Ok(None));
        assert_eq!(
            SsPlugin::parse(Some("obfs-local"), Some("obfs=tls;obfs-host=bing.com")),
            Ok(Some(SsPlugin::Obfs {
                mode: "tls".to_string(),
                host: Some("bing.com".to_string())
            }))
        );
        assert_eq!(
            SsPlugin::parse(Some("v2ray-plugin"), Some("tls;host=cdn.com;path=/ray")),
            Ok(Some(SsPlugin::V2Ray {
                mode: "websocket".to_string(),
                host: Some("cdn.com".to_string()),
                path: Some("/ray".to_string()),
                tls: true,
                mux: false,
            }))
        );
        assert!(SsPlugin::parse(Some("kcptun"), None).is_err());
    }

    #[test]
    fn test_sanitize_line_name() {
        assert_eq!(sanitize_line_name("HK, 01 = fast"), "HK_ 01 - fast");
        assert_eq!(sanitize_line_name("TargetSS"), "TargetSS");
    }

    #[test]
    fn test_line_value() {
        assert_eq!(line_value("password", "a=b"), Ok("a=b"));
        assert!(line_value("password", "a,b").is_err());
        assert!(line_value("sni", "a\nb").is_err());
    }
}
