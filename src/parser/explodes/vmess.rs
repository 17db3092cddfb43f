use serde_json::Value;

use crate::error::ParseError;
use crate::models::{default_remark, Proxy, ProxyKind, ProxyType};
use crate::parser::explodes::{remark_or_default, strip_scheme};
use crate::utils::base64::base64_decode;
use crate::utils::coerce::{to_bool, to_port, to_string, to_u16};
use crate::utils::url::split_fragment;

const SCHEME: &str = "vmess";

/// Parse a VMess link into a Proxy object
///
/// The payload is base64 of a JSON object in the v2rayN layout
/// (`v, ps, add, port, id, aid, scy, net, type, host, path, tls, sni`).
/// `port` and `aid` may be numbers or strings. `tls` is true for any value
/// other than empty, `none`, `false` or `0`.
pub fn explode_vmess(vmess: &str) -> Result<Proxy, ParseError> {
    let encoded = strip_scheme(vmess, SCHEME)?;
    let (encoded, fragment) = split_fragment(encoded);

    let decoded = base64_decode(encoded).ok_or(ParseError::InvalidBase64(SCHEME))?;
    let json: Value = serde_json::from_str(&decoded).map_err(|e| ParseError::InvalidJson {
        scheme: SCHEME,
        reason: e.to_string(),
    })?;
    if !json.is_object() {
        return Err(ParseError::InvalidJson {
            scheme: SCHEME,
            reason: "expected an object".to_string(),
        });
    }

    let server = to_string(&json["add"]);
    if server.is_empty() {
        return Err(ParseError::missing(SCHEME, "add"));
    }
    let port = match &json["port"] {
        Value::Null => return Err(ParseError::missing(SCHEME, "port")),
        value => to_port(value).ok_or_else(|| ParseError::invalid(SCHEME, "port", &to_string(value)))?,
    };
    let uuid = to_string(&json["id"]);
    if uuid.is_empty() {
        return Err(ParseError::missing(SCHEME, "id"));
    }
    let alter_id =
        to_u16(&json["aid"]).ok_or_else(|| ParseError::invalid(SCHEME, "aid", &to_string(&json["aid"])))?;

    let security = non_empty_or(to_string(&json["scy"]), "auto");
    let network = non_empty_or(to_string(&json["net"]), "tcp").to_lowercase();
    let header_type = non_empty_or(to_string(&json["type"]), "none");
    let sni = Some(to_string(&json["sni"])).filter(|sni| !sni.is_empty());

    let remark = fragment.or_else(|| Some(to_string(&json["ps"])));
    let name = remark_or_default(remark, || default_remark(ProxyType::VMess, &server, port));

    Ok(Proxy::new(
        name,
        server,
        port,
        ProxyKind::VMess {
            uuid,
            alter_id,
            security,
            network,
            header_type,
            host: to_string(&json["host"]),
            path: to_string(&json["path"]),
            tls: to_bool(&json["tls"]),
            sni,
        },
    ))
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
