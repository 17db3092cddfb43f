use crate::error::ParseError;
use crate::models::{default_remark, Proxy, ProxyKind, ProxyType};
use crate::parser::explodes::{remark_or_default, strip_scheme};
use crate::utils::base64::base64_decode;
use crate::utils::coerce::str_to_port;
use crate::utils::url::{parse_query, query_get, split_fragment, split_host_port, url_decode};

const SCHEME: &str = "ss";

/// Parse a Shadowsocks link into a Proxy object
///
/// Accepts the SIP002 form `ss://base64(method:password)@host:port/?plugin=...#name`
/// (userinfo may also be plain percent-encoded `method:password`) and the legacy
/// form `ss://base64(method:password@host:port)#name`.
pub fn explode_ss(ss: &str) -> Result<Proxy, ParseError> {
    let content = strip_scheme(ss, SCHEME)?;
    let (content, remark) = split_fragment(content);
    // Replace "/?" with "?" so both SIP002 query spellings look the same
    let content = content.replace("/?", "?");
    let content = content.as_str();

    // Extract plugin and other query parameters
    let (main, query) = match content.split_once('?') {
        Some((main, query)) => (main, Some(query)),
        None => (content, None),
    };
    let (plugin, plugin_opts) = match query {
        Some(query) => parse_plugin(query),
        None => (None, None),
    };

    let main = main.trim_end_matches('/');
    let (method, password, server, port) = if main.contains('@') {
        // SIP002 format (userinfo@server:port)
        let (secret, server_port) = main
            .rsplit_once('@')
            .ok_or_else(|| ParseError::missing(SCHEME, "server"))?;
        let (method, password) = decode_user_info(secret)?;
        let (server, port) = parse_server_port(server_port)?;
        (method, password, server, port)
    } else {
        // Legacy format, everything is base64
        let decoded = base64_decode(main).ok_or(ParseError::InvalidBase64(SCHEME))?;
        let (method_pass, server_port) = decoded
            .rsplit_once('@')
            .ok_or_else(|| ParseError::missing(SCHEME, "server"))?;
        let (method, password) = method_pass
            .split_once(':')
            .ok_or_else(|| ParseError::missing(SCHEME, "password"))?;
        let (server, port) = parse_server_port(server_port)?;
        (method.to_string(), password.to_string(), server, port)
    };

    if method.is_empty() {
        return Err(ParseError::missing(SCHEME, "cipher"));
    }

    let name = remark_or_default(remark, || {
        default_remark(ProxyType::Shadowsocks, &server, port)
    });

    Ok(Proxy::new(
        name,
        server,
        port,
        ProxyKind::Shadowsocks {
            cipher: method,
            password,
            plugin,
            plugin_opts,
        },
    ))
}

/// Decode the SIP002 userinfo into `(method, password)`.
fn decode_user_info(secret: &str) -> Result<(String, String), ParseError> {
    let secret = url_decode(secret);
    let plain = if secret.contains(':') {
        secret
    } else {
        base64_decode(&secret).ok_or(ParseError::InvalidBase64(SCHEME))?
    };

    let (method, password) = plain
        .split_once(':')
        .ok_or_else(|| ParseError::missing(SCHEME, "password"))?;
    Ok((method.to_string(), password.to_string()))
}

fn parse_server_port(server_port: &str) -> Result<(String, u16), ParseError> {
    let (server, port) =
        split_host_port(server_port).ok_or_else(|| ParseError::missing(SCHEME, "port"))?;
    let port = str_to_port(port).ok_or_else(|| ParseError::invalid(SCHEME, "port", port))?;
    Ok((server, port))
}

/// Split the `plugin` query parameter into name and options at the first `;`.
fn parse_plugin(query: &str) -> (Option<String>, Option<String>) {
    let params = parse_query(query);
    match query_get(&params, "plugin") {
        Some(plugin) if !plugin.is_empty() => match plugin.split_once(';') {
            Some((name, opts)) => (Some(name.to_string()), Some(opts.to_string())),
            None => (Some(plugin.to_string()), None),
        },
        _ => (None, None),
    }
}
