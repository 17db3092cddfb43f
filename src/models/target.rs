use std::fmt;
use std::str::FromStr;

use crate::error::SubconvertError;
use crate::models::ProxyType;

/// The output format for subconverter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubconverterTarget {
    Mixed,
    Clash,
    ClashR,
    Surge,
    QuantumultX,
    V2Ray,
    SingBox,
    SS,
    SSR,
    VMess,
    Trojan,
}

impl SubconverterTarget {
    pub const ALL: [SubconverterTarget; 11] = [
        SubconverterTarget::Mixed,
        SubconverterTarget::Clash,
        SubconverterTarget::ClashR,
        SubconverterTarget::Surge,
        SubconverterTarget::QuantumultX,
        SubconverterTarget::V2Ray,
        SubconverterTarget::SingBox,
        SubconverterTarget::SS,
        SubconverterTarget::SSR,
        SubconverterTarget::VMess,
        SubconverterTarget::Trojan,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubconverterTarget::Mixed => "mixed",
            SubconverterTarget::Clash => "clash",
            SubconverterTarget::ClashR => "clashr",
            SubconverterTarget::Surge => "surge",
            SubconverterTarget::QuantumultX => "quanx",
            SubconverterTarget::V2Ray => "v2ray",
            SubconverterTarget::SingBox => "singbox",
            SubconverterTarget::SS => "ss",
            SubconverterTarget::SSR => "ssr",
            SubconverterTarget::VMess => "vmess",
            SubconverterTarget::Trojan => "trojan",
        }
    }

    /// Targets whose document is always JSON.
    pub fn is_json_native(&self) -> bool {
        matches!(self, SubconverterTarget::V2Ray | SubconverterTarget::SingBox)
    }

    /// Proxy type kept by the single-protocol link targets.
    pub fn single_proxy_type(&self) -> Option<ProxyType> {
        match self {
            SubconverterTarget::SS => Some(ProxyType::Shadowsocks),
            SubconverterTarget::SSR => Some(ProxyType::ShadowsocksR),
            SubconverterTarget::VMess => Some(ProxyType::VMess),
            SubconverterTarget::Trojan => Some(ProxyType::Trojan),
            _ => None,
        }
    }

    /// Whether the rendered document is JSON for the given `outputJson` flag.
    pub fn renders_json(&self, output_json: bool) -> bool {
        self.is_json_native()
            || (output_json
                && matches!(self, SubconverterTarget::Clash | SubconverterTarget::ClashR))
    }

    /// Content type of the rendered document.
    pub fn content_type(&self, output_json: bool) -> &'static str {
        if self.renders_json(output_json) {
            "application/json; charset=utf-8"
        } else {
            "text/plain; charset=utf-8"
        }
    }
}

impl FromStr for SubconverterTarget {
    type Err = SubconvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        SubconverterTarget::ALL
            .into_iter()
            .find(|target| target.as_str() == name)
            .ok_or_else(|| SubconvertError::UnsupportedTarget(s.to_string()))
    }
}

impl fmt::Display for SubconverterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
