pub mod ss;
pub mod ssr;
pub mod trojan;
pub mod vmess;

use log::debug;

use crate::error::ParseError;
use crate::models::Proxy;

pub use ss::explode_ss;
pub use ssr::explode_ssr;
pub use trojan::explode_trojan;
pub use vmess::explode_vmess;

/// Explode a proxy link into a Proxy object
///
/// This function detects the type of proxy link by its scheme (case-insensitive)
/// and calls the appropriate parser.
pub fn explode(link: &str) -> Result<Proxy, ParseError> {
    let link = link.trim();
    let scheme = link
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| ParseError::UnknownScheme(preview(link)))?;

    debug!("Exploding {} link", scheme);
    match scheme.as_str() {
        "ss" => explode_ss(link),
        "ssr" => explode_ssr(link),
        "vmess" => explode_vmess(link),
        "trojan" => explode_trojan(link),
        _ => Err(ParseError::UnknownScheme(preview(link))),
    }
}

/// Strip `scheme://` from the start of `link`, ignoring case.
pub(crate) fn strip_scheme<'a>(link: &'a str, scheme: &'static str) -> Result<&'a str, ParseError> {
    match link.trim().split_once("://") {
        Some((head, rest)) if head.eq_ignore_ascii_case(scheme) => Ok(rest),
        _ => Err(ParseError::MissingScheme(scheme)),
    }
}

/// Use the decoded remark when it carries text, otherwise the generated default.
pub(crate) fn remark_or_default(remark: Option<String>, default: impl FnOnce() -> String) -> String {
    match remark {
        Some(remark) if !remark.trim().is_empty() => remark,
        _ => default(),
    }
}

/// Short prefix of a link for error messages, never leaking a full credential.
fn preview(link: &str) -> String {
    let end = link
        .char_indices()
        .nth(24)
        .map(|(idx, _)| idx)
        .unwrap_or(link.len());
    if end < link.len() {
        format!("{}...", &link[..end])
    } else {
        link.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyType;

    #[test]
    fn test_explode_dispatches_by_scheme() {
        let proxy = explode("  SS://YWVzLTI1Ni1nY206dGVzdA==@10.0.0.1:8388#TargetSS ").unwrap();
        assert_eq!(proxy.proxy_type(), ProxyType::Shadowsocks);
        assert_eq!(proxy.name, "TargetSS");

        let proxy = explode("trojan://password123@10.0.0.4:443?sni=example.com#TargetTrojan").unwrap();
        assert_eq!(proxy.proxy_type(), ProxyType::Trojan);
    }

    #[test]
    fn test_explode_unknown_scheme() {
        assert!(matches!(
            explode("hysteria2://secret@host:443"),
            Err(ParseError::UnknownScheme(_))
        ));
        assert!(matches!(explode("just text"), Err(ParseError::UnknownScheme(_))));
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("VMess://abc", "vmess"), Ok("abc"));
        assert_eq!(strip_scheme("ssr://abc", "ss"), Err(ParseError::MissingScheme("ss")));
        assert_eq!(strip_scheme("ss:", "ss"), Err(ParseError::MissingScheme("ss")));
    }
}
