//! Proxy model definitions
//!
//! Contains the canonical proxy record every parser produces and every
//! generator consumes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the type of a proxy.
/// This is the canonical enum used for proxy type identification across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Shadowsocks,
    ShadowsocksR,
    VMess,
    Trojan,
}

impl ProxyType {
    /// Link scheme and serialized `type` tag.
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "ss",
            ProxyType::ShadowsocksR => "ssr",
            ProxyType::VMess => "vmess",
            ProxyType::Trojan => "trojan",
        }
    }

    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "SS",
            ProxyType::ShadowsocksR => "SSR",
            ProxyType::VMess => "VMess",
            ProxyType::Trojan => "Trojan",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol-specific part of a proxy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProxyKind {
    #[serde(rename = "ss")]
    Shadowsocks {
        cipher: String,
        password: String,
        /// Plugin name, e.g. `obfs-local` or `v2ray-plugin`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<String>,
        /// Plugin options in the format of `key1=value1;key2=value2`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin_opts: Option<String>,
    },
    #[serde(rename = "ssr")]
    ShadowsocksR {
        cipher: String,
        password: String,
        protocol: String,
        #[serde(default)]
        protocol_param: String,
        obfs: String,
        #[serde(default)]
        obfs_param: String,
        #[serde(default)]
        group: String,
    },
    #[serde(rename = "vmess")]
    VMess {
        uuid: String,
        #[serde(default)]
        alter_id: u16,
        security: String,
        network: String,
        header_type: String,
        #[serde(default)]
        host: String,
        #[serde(default)]
        path: String,
        #[serde(default)]
        tls: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sni: Option<String>,
    },
    #[serde(rename = "trojan")]
    Trojan {
        password: String,
        sni: String,
        #[serde(default)]
        skip_cert_verify: bool,
        /// `None` for plain TLS over TCP
        #[serde(default, skip_serializing_if = "Option::is_none")]
        network: Option<String>,
        #[serde(default)]
        host: String,
        #[serde(default)]
        path: String,
    },
}

/// Represents a proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(flatten)]
    pub kind: ProxyKind,
}

impl Proxy {
    pub fn new(name: impl Into<String>, server: impl Into<String>, port: u16, kind: ProxyKind) -> Self {
        Proxy {
            name: name.into(),
            server: server.into(),
            port,
            kind,
        }
    }

    pub fn proxy_type(&self) -> ProxyType {
        match self.kind {
            ProxyKind::Shadowsocks { .. } => ProxyType::Shadowsocks,
            ProxyKind::ShadowsocksR { .. } => ProxyType::ShadowsocksR,
            ProxyKind::VMess { .. } => ProxyType::VMess,
            ProxyKind::Trojan { .. } => ProxyType::Trojan,
        }
    }

    /// Name used as the identifier in generated documents.
    ///
    /// Falls back to `server:port` so that every generator can still refer to
    /// a record whose source carried no label.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("{}:{}", self.server, self.port)
        } else {
            self.name.clone()
        }
    }

    /// Server formatted for `host:port` joins, bracketing IPv6 literals.
    pub fn server_for_uri(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]", self.server)
        } else {
            self.server.clone()
        }
    }
}

/// Name given to a record whose link carries no remark.
pub fn default_remark(proxy_type: ProxyType, server: &str, port: u16) -> String {
    format!("{}://{}:{}", proxy_type.scheme(), server, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trojan(name: &str) -> Proxy {
        Proxy::new(
            name,
            "example.com",
            443,
            ProxyKind::Trojan {
                password: "secret".to_string(),
                sni: "example.com".to_string(),
                skip_cert_verify: false,
                network: None,
                host: String::new(),
                path: String::new(),
            },
        )
    }

    #[test]
    fn test_display_name_falls_back_to_endpoint() {
        assert_eq!(trojan("Tokyo").display_name(), "Tokyo");
        assert_eq!(trojan("").display_name(), "example.com:443");
        assert_eq!(trojan("   ").display_name(), "example.com:443");
    }

    #[test]
    fn test_serialized_record_carries_type_tag() {
        let value = serde_json::to_value(trojan("Tokyo")).unwrap();
        assert_eq!(value["type"], "trojan");
        assert_eq!(value["port"], 443);
        assert_eq!(value["sni"], "example.com");

        let back: Proxy = serde_json::from_value(value).unwrap();
        assert_eq!(back.proxy_type(), ProxyType::Trojan);
    }

    #[test]
    fn test_ipv6_server_is_bracketed() {
        let mut proxy = trojan("v6");
        proxy.server = "2001:db8::1".to_string();
        assert_eq!(proxy.server_for_uri(), "[2001:db8::1]");
    }
}
