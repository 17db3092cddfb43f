use log::debug;

use crate::error::Result;
use crate::models::Proxy;
use crate::parser::subparser::parse;

/// Parse every subscription and concatenate the results.
///
/// Source order is kept, then order within each source. Duplicates are not
/// removed. The first source that fails to parse fails the whole merge.
pub fn merge_subscriptions<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Proxy>> {
    let mut nodes = Vec::new();
    for (index, source) in sources.iter().enumerate() {
        let parsed = parse(source.as_ref())?;
        debug!("Source {} contributed {} proxies", index, parsed.len());
        nodes.extend(parsed);
    }
    Ok(nodes)
}
