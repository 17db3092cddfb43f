//! Conversion entry points: read a subscription, then render it for a target.

use log::{debug, info};

use crate::error::{Result, SubconvertError};
use crate::generator::config::formats::{
    clash::proxy_to_clash, quanx::proxy_to_quanx, singbox::proxy_to_singbox,
    single::proxy_to_single, surge::proxy_to_surge, v2ray::proxy_to_v2ray,
};
use crate::models::{OverrideConfig, Proxy, SubconverterTarget};
use crate::parser::{merge_subscriptions, parse};

/// Convert one subscription text into the `target` format
///
/// The text is validated first, then the target name, so an empty body is
/// always reported as an invalid subscription.
pub fn subconvert(text: &str, target: &str, config: &OverrideConfig) -> Result<String> {
    if text.trim().is_empty() {
        return Err(SubconvertError::InvalidSubscription(
            "subscription is empty".to_string(),
        ));
    }
    let target: SubconverterTarget = target.parse()?;

    let nodes = parse(text)?;
    info!("Parsed {} nodes for target {}", nodes.len(), target);
    render(&nodes, target, config)
}

/// Convert several subscription texts into one `target` document.
///
/// Records keep source order and duplicates are not removed.
pub fn merge_and_convert<S: AsRef<str>>(
    sources: &[S],
    target: &str,
    config: &OverrideConfig,
) -> Result<String> {
    if sources.iter().all(|source| source.as_ref().trim().is_empty()) {
        return Err(SubconvertError::InvalidSubscription(
            "no subscription content to merge".to_string(),
        ));
    }
    let target: SubconverterTarget = target.parse()?;

    let nodes = merge_subscriptions(sources)?;
    info!(
        "Merged {} nodes from {} sources for target {}",
        nodes.len(),
        sources.len(),
        target
    );
    render(&nodes, target, config)
}

/// Render already parsed records for `target`.
pub fn render(nodes: &[Proxy], target: SubconverterTarget, config: &OverrideConfig) -> Result<String> {
    let output = match target {
        SubconverterTarget::Clash => {
            info!("Generate target: Clash");
            proxy_to_clash(nodes, config, false)?
        }
        SubconverterTarget::ClashR => {
            info!("Generate target: ClashR");
            proxy_to_clash(nodes, config, true)?
        }
        SubconverterTarget::Surge => {
            info!("Generate target: Surge");
            proxy_to_surge(nodes, config)?
        }
        SubconverterTarget::QuantumultX => {
            info!("Generate target: Quantumult X");
            proxy_to_quanx(nodes, config)?
        }
        SubconverterTarget::V2Ray => {
            info!("Generate target: V2Ray");
            proxy_to_v2ray(nodes, config)?
        }
        SubconverterTarget::SingBox => {
            info!("Generate target: SingBox");
            proxy_to_singbox(nodes, config)?
        }
        SubconverterTarget::Mixed => {
            info!("Generate target: Mixed");
            proxy_to_single(nodes, None)
        }
        SubconverterTarget::SS
        | SubconverterTarget::SSR
        | SubconverterTarget::VMess
        | SubconverterTarget::Trojan => {
            info!("Generate target: {}", target.as_str().to_uppercase());
            proxy_to_single(nodes, target.single_proxy_type())
        }
    };

    debug!("Generated {} bytes for {}", output.len(), target);
    Ok(output)
}
