use log::debug;
use serde_json::json;

use crate::models::{Proxy, ProxyKind, ProxyType};
use crate::utils::base64::{base64_encode, url_safe_base64_encode};
use crate::utils::url::url_encode;

/// Convert a proxy to a single URI
///
/// This is the inverse of the link parsers: feeding the result back through
/// `explode` yields an equal record.
pub fn proxy_to_uri(node: &Proxy) -> String {
    let remark = node.display_name();

    match &node.kind {
        ProxyKind::Shadowsocks {
            cipher,
            password,
            plugin,
            plugin_opts,
        } => {
            // Format: ss://BASE64(method:password)@server:port/?plugin=plugin_data#remark
            let user_info = base64_encode(&format!("{}:{}", cipher, password));
            let mut uri = format!("ss://{}@{}:{}", user_info, node.server_for_uri(), node.port);

            if let Some(plugin) = plugin.as_deref().filter(|p| !p.is_empty()) {
                let plugin_data = match plugin_opts.as_deref().filter(|o| !o.is_empty()) {
                    Some(opts) => format!("{};{}", plugin, opts),
                    None => plugin.to_string(),
                };
                uri.push_str(&format!("/?plugin={}", url_encode(&plugin_data)));
            }

            uri.push_str(&format!("#{}", url_encode(&remark)));
            uri
        }
        ProxyKind::ShadowsocksR {
            cipher,
            password,
            protocol,
            protocol_param,
            obfs,
            obfs_param,
            group,
        } => {
            // Format: ssr://BASE64(server:port:protocol:method:obfs:BASE64(password)/?remarks=BASE64(remark)&...)
            let mut plain_text = format!(
                "{}:{}:{}:{}:{}:{}/?remarks={}",
                node.server,
                node.port,
                protocol,
                cipher,
                obfs,
                url_safe_base64_encode(password),
                url_safe_base64_encode(&remark)
            );

            for (key, value) in [
                ("group", group),
                ("protoparam", protocol_param),
                ("obfsparam", obfs_param),
            ] {
                if !value.is_empty() {
                    plain_text.push_str(&format!("&{}={}", key, url_safe_base64_encode(value)));
                }
            }

            format!("ssr://{}", url_safe_base64_encode(&plain_text))
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
            // Format: vmess://BASE64(JSON)
            let mut vmess_json = json!({
                "v": "2",
                "ps": remark,
                "add": node.server,
                "port": node.port.to_string(),
                "id": uuid,
                "aid": alter_id.to_string(),
                "net": network,
                "type": header_type,
                "host": host,
                "path": path,
                "tls": if *tls { "tls" } else { "" }
            });

            if security != "auto" {
                vmess_json["scy"] = json!(security);
            }
            if let Some(sni) = sni.as_deref().filter(|s| !s.is_empty()) {
                vmess_json["sni"] = json!(sni);
            }

            format!("vmess://{}", base64_encode(&vmess_json.to_string()))
        }
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        } => {
            // Format: trojan://password@server:port?sni=..[&allowInsecure=1][&type=ws&host=..&path=..]#remark
            let mut uri = format!(
                "trojan://{}@{}:{}?sni={}",
                url_encode(password),
                node.server_for_uri(),
                node.port,
                url_encode(sni)
            );

            if *skip_cert_verify {
                uri.push_str("&allowInsecure=1");
            }
            if let Some(network) = network {
                uri.push_str(&format!(
                    "&type={}&host={}&path={}",
                    url_encode(network),
                    url_encode(host),
                    url_encode(path)
                ));
            }

            uri.push_str(&format!("#{}", url_encode(&remark)));
            uri
        }
    }
}

/// Convert proxies to a newline-separated link list
///
/// With `only` set, nodes of other types are left out; the result may then be
/// empty. No trailing newline is emitted.
pub fn proxy_to_single(nodes: &[Proxy], only: Option<ProxyType>) -> String {
    let links: Vec<String> = nodes
        .iter()
        .filter(|node| only.map_or(true, |t| node.proxy_type() == t))
        .map(proxy_to_uri)
        .collect();

    debug!("Rendered {} of {} proxies as links", links.len(), nodes.len());
    links.join("\n")
}
