use crate::error::ParseError;
use crate::models::{default_remark, Proxy, ProxyKind, ProxyType};
use crate::parser::explodes::{remark_or_default, strip_scheme};
use crate::utils::coerce::{str_to_bool, str_to_port};
use crate::utils::url::{parse_query, query_get, split_fragment, split_host_port, url_decode};

const SCHEME: &str = "trojan";
const DEFAULT_PORT: u16 = 443;

/// Parse a Trojan link into a Proxy object
///
/// `trojan://password@host[:port][?sni=..&allowInsecure=..&type=ws&host=..&path=..][#name]`.
/// `peer` is accepted in place of `sni`, which falls back to the server.
pub fn explode_trojan(trojan: &str) -> Result<Proxy, ParseError> {
    let content = strip_scheme(trojan, SCHEME)?;
    let (content, remark) = split_fragment(content);

    let (main, query) = match content.split_once('?') {
        Some((main, query)) => (main, query),
        None => (content, ""),
    };
    let main = main.trim_end_matches('/');

    let (password, host_port) = main
        .rsplit_once('@')
        .ok_or_else(|| ParseError::missing(SCHEME, "password"))?;
    let password = url_decode(password);
    if password.is_empty() {
        return Err(ParseError::missing(SCHEME, "password"));
    }

    let (server, port) = match split_host_port(host_port) {
        Some((server, port)) => {
            let port = str_to_port(port).ok_or_else(|| ParseError::invalid(SCHEME, "port", port))?;
            (server, port)
        }
        None => (
            host_port.trim_start_matches('[').trim_end_matches(']').to_string(),
            DEFAULT_PORT,
        ),
    };
    if server.is_empty() {
        return Err(ParseError::missing(SCHEME, "server"));
    }

    let params = parse_query(query);
    let sni = query_get(&params, "sni")
        .or_else(|| query_get(&params, "peer"))
        .filter(|sni| !sni.is_empty())
        .unwrap_or(server.as_str())
        .to_string();
    let skip_cert_verify = query_get(&params, "allowInsecure").is_some_and(str_to_bool);

    let network = query_get(&params, "type")
        .map(str::to_lowercase)
        .filter(|net| !net.is_empty() && net != "tcp" && net != "original");
    let (host, path) = if network.is_some() {
        (
            query_get(&params, "host").unwrap_or_default().to_string(),
            query_get(&params, "path").unwrap_or_default().to_string(),
        )
    } else {
        (String::new(), String::new())
    };

    let name = remark_or_default(remark, || default_remark(ProxyType::Trojan, &server, port));

    Ok(Proxy::new(
        name,
        server,
        port,
        ProxyKind::Trojan {
            password,
            sni,
            skip_cert_verify,
            network,
            host,
            path,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_trojan() {
        let proxy =
            explode_trojan("trojan://password123@10.0.0.4:443?sni=example.com#TargetTrojan").unwrap();

        assert_eq!(proxy.name, "TargetTrojan");
        assert_eq!(proxy.server, "10.0.0.4");
        assert_eq!(proxy.port, 443);
        assert_eq!(
            proxy.kind,
            ProxyKind::Trojan {
                password: "password123".to_string(),
                sni: "example.com".to_string(),
                skip_cert_verify: false,
                network: None,
                host: String::new(),
                path: String::new(),
            }
        );
    }

    #[test]
    fn test_explode_trojan_defaults() {
        let proxy = explode_trojan("trojan://p%40ss@example.org").unwrap();

        assert_eq!(proxy.port, 443);
        assert_eq!(proxy.name, "trojan://example.org:443");
        match proxy.kind {
            ProxyKind::Trojan { password, sni, .. } => {
                assert_eq!(password, "p@ss");
                assert_eq!(sni, "example.org");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_explode_trojan_ws_and_insecure() {
        let proxy = explode_trojan(
            "trojan://pw@[2001:db8::4]:8443/?peer=cdn.example.com&allowInsecure=true&type=ws&host=cdn.example.com&path=%2Ftrojan#WS%20Node",
        )
        .unwrap();

        assert_eq!(proxy.server, "2001:db8::4");
        assert_eq!(proxy.name, "WS Node");
        assert_eq!(
            proxy.kind,
            ProxyKind::Trojan {
                password: "pw".to_string(),
                sni: "cdn.example.com".to_string(),
                skip_cert_verify: true,
                network: Some("ws".to_string()),
                host: "cdn.example.com".to_string(),
                path: "/trojan".to_string(),
            }
        );
    }

    #[test]
    fn test_explode_trojan_errors() {
        assert_eq!(
            explode_trojan("ss://pw@host:443"),
            Err(ParseError::MissingScheme("trojan"))
        );
        assert_eq!(
            explode_trojan("trojan://host:443"),
            Err(ParseError::missing("trojan", "password"))
        );
        assert_eq!(
            explode_trojan("trojan://pw@host:https"),
            Err(ParseError::invalid("trojan", "port", "https"))
        );
    }
}
