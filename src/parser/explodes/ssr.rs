use crate::error::ParseError;
use crate::models::{default_remark, Proxy, ProxyKind, ProxyType};
use crate::parser::explodes::{remark_or_default, strip_scheme};
use crate::utils::base64::base64_decode;
use crate::utils::coerce::str_to_port;
use crate::utils::url::split_fragment;

const SCHEME: &str = "ssr";

/// Parse a ShadowsocksR link into a Proxy object
///
/// The payload is one base64 blob of
/// `host:port:protocol:method:obfs:base64(password)/?remarks=..&group=..`
/// where every parameter value is itself base64. Fields are split from the
/// right so IPv6 hosts survive.
pub fn explode_ssr(ssr: &str) -> Result<Proxy, ParseError> {
    let encoded = strip_scheme(ssr, SCHEME)?;
    let (encoded, fragment) = split_fragment(encoded);

    let decoded = base64_decode(encoded).ok_or(ParseError::InvalidBase64(SCHEME))?;
    let decoded = decoded.trim();

    let (main, query) = match decoded.split_once("/?") {
        Some((main, query)) => (main, query),
        None => match decoded.split_once('?') {
            Some((main, query)) => (main, query),
            None => (decoded, ""),
        },
    };
    let main = main.trim_end_matches('/');

    let mut parts = main.rsplitn(6, ':');
    let password_encoded = parts.next().unwrap_or_default();
    let obfs = parts
        .next()
        .ok_or_else(|| ParseError::missing(SCHEME, "obfs"))?;
    let method = parts
        .next()
        .ok_or_else(|| ParseError::missing(SCHEME, "method"))?;
    let protocol = parts
        .next()
        .ok_or_else(|| ParseError::missing(SCHEME, "protocol"))?;
    let port_str = parts
        .next()
        .ok_or_else(|| ParseError::missing(SCHEME, "port"))?;
    let server = parts
        .next()
        .filter(|server| !server.is_empty())
        .ok_or_else(|| ParseError::missing(SCHEME, "server"))?;

    let server = server.trim_start_matches('[').trim_end_matches(']');
    let port = str_to_port(port_str).ok_or_else(|| ParseError::invalid(SCHEME, "port", port_str))?;
    if method.is_empty() {
        return Err(ParseError::missing(SCHEME, "method"));
    }
    let password = if password_encoded.is_empty() {
        String::new()
    } else {
        base64_decode(password_encoded).ok_or(ParseError::InvalidBase64(SCHEME))?
    };

    let params = ParamReader::new(query);
    let remarks = params.get("remarks");
    let name = remark_or_default(fragment, || {
        remark_or_default(Some(remarks), || {
            default_remark(ProxyType::ShadowsocksR, server, port)
        })
    });

    Ok(Proxy::new(
        name,
        server,
        port,
        ProxyKind::ShadowsocksR {
            cipher: method.to_string(),
            password,
            protocol: protocol.to_string(),
            protocol_param: params.get("protoparam"),
            obfs: obfs.to_string(),
            obfs_param: params.get("obfsparam"),
            group: params.get("group"),
        },
    ))
}

/// SSR query parameters.
///
/// Values are base64 and may contain `+`, so this does not go through
/// form-urlencoded decoding.
struct ParamReader<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> ParamReader<'a> {
    fn new(query: &'a str) -> Self {
        let pairs = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        ParamReader { pairs }
    }

    /// Decoded value for `key`; absent or undecodable values are empty.
    fn get(&self, key: &str) -> String {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| base64_decode(v))
            .unwrap_or_default()
    }
}
