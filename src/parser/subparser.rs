//! Subscription reader
//!
//! Splits a raw subscription payload into links and explodes each one.

use log::{debug, warn};

use crate::constants::has_known_scheme;
use crate::error::{ParseError, Result, SubconvertError};
use crate::models::Proxy;
use crate::parser::explodes::explode;
use crate::utils::base64::base64_decode;

/// Parse a subscription into proxy records.
///
/// The payload is either a newline-delimited link list or a single base64
/// blob of one. Blank lines and lines starting with `#` are dropped before
/// either reading, so comments may precede a blob. The blob is only tried
/// when no line starts with a known scheme, and is decoded at most once.
///
/// Malformed links next to valid ones are skipped. When nothing parses, the
/// first link error is returned, or [`SubconvertError::InvalidSubscription`]
/// when no line carried a known scheme at all.
pub fn parse(text: &str) -> Result<Vec<Proxy>> {
    if text.trim().is_empty() {
        return Err(SubconvertError::InvalidSubscription(
            "subscription is empty".to_string(),
        ));
    }

    let lines = content_lines(text);
    if lines.iter().any(|line| has_known_scheme(line)) {
        return explode_lines(&lines);
    }

    debug!("No plain proxy link found, decoding subscription as base64");
    let decoded = base64_decode(&lines.concat()).ok_or_else(|| {
        SubconvertError::InvalidSubscription("no recognizable proxy link".to_string())
    })?;
    let lines = content_lines(&decoded);
    if !lines.iter().any(|line| has_known_scheme(line)) {
        return Err(SubconvertError::InvalidSubscription(
            "no recognizable proxy link after base64 decoding".to_string(),
        ));
    }
    explode_lines(&lines)
}

/// Parse a `|`-delimited list of segments, each either a plain link or the
/// base64 of one link.
///
/// Segments that do not yield a proxy are skipped, so the result may be empty.
/// A segment decoding to several lines is skipped rather than exploded whole.
pub fn parse_mixed_subscription(text: &str) -> Vec<Proxy> {
    let mut nodes = Vec::new();

    for (index, segment) in text.split('|').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let link = if has_known_scheme(segment) {
            segment.to_string()
        } else {
            match base64_decode(segment) {
                Some(decoded) if decoded.trim().contains(['\n', '\r']) => {
                    warn!("Skipping segment {}: decodes to more than one line", index);
                    continue;
                }
                Some(decoded) if has_known_scheme(decoded.trim()) => decoded.trim().to_string(),
                _ => {
                    warn!("Skipping segment {}: not a proxy link", index);
                    continue;
                }
            }
        };

        match explode(&link) {
            Ok(node) => nodes.push(node),
            Err(e) => warn!("Skipping segment {}: {}", index, e),
        }
    }

    debug!("Parsed {} proxies from mixed subscription", nodes.len());
    nodes
}

fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

fn explode_lines(lines: &[&str]) -> Result<Vec<Proxy>> {
    let mut nodes = Vec::with_capacity(lines.len());
    let mut first_error: Option<ParseError> = None;

    for line in lines {
        if !has_known_scheme(line) {
            debug!("Ignoring line without a known scheme");
            continue;
        }
        match explode(line) {
            Ok(node) => {
                debug!("Parsed {} proxy {}", node.proxy_type(), node.name);
                nodes.push(node);
            }
            Err(e) => {
                warn!("Skipping malformed link: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    match (nodes.is_empty(), first_error) {
        (true, Some(e)) => Err(e.into()),
        (true, None) => Err(SubconvertError::InvalidSubscription(
            "no recognizable proxy link".to_string(),
        )),
        _ => Ok(nodes),
    }
}
