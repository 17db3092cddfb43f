//! URL encoding/decoding utilities

/// Encodes a string using URL encoding
///
/// # Examples
/// ```
/// use subconvert::utils::url::url_encode;
///
/// let encoded = url_encode("Hello World!");
/// assert_eq!(encoded, "Hello%20World%21");
/// ```
pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Decodes a URL-encoded string
///
/// Returns the original string if decoding fails.
///
/// # Examples
/// ```
/// use subconvert::utils::url::url_decode;
///
/// let decoded = url_decode("Hello%20World%21");
/// assert_eq!(decoded, "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Split `link` at the first `#`, returning the link body and the decoded fragment.
pub fn split_fragment(link: &str) -> (&str, Option<String>) {
    match link.split_once('#') {
        Some((body, fragment)) => (body, Some(url_decode(fragment))),
        None => (link, None),
    }
}

/// Parse an `a=1&b=2` query string, decoding keys and values.
///
/// Later duplicates do not replace earlier keys; callers look values up with
/// [`query_get`].
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// First value for `key` in a parsed query.
pub fn query_get<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Split `host:port`, accepting bracketed IPv6 literals.
///
/// The port is returned verbatim so callers can report it when it is not numeric.
pub fn split_host_port(input: &str) -> Option<(String, &str)> {
    let input = input.trim().trim_end_matches('/');
    if let Some(rest) = input.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        return Some((host.to_string(), port));
    }
    let (host, port) = input.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fragment_decodes_name() {
        let (body, name) = split_fragment("trojan://pw@host:443#Hong%20Kong%2001");
        assert_eq!(body, "trojan://pw@host:443");
        assert_eq!(name.as_deref(), Some("Hong Kong 01"));
        assert_eq!(split_fragment("ss://abc").1, None);
    }

    #[test]
    fn test_parse_query_first_value_wins() {
        let params = parse_query("sni=a.com&allowInsecure=1&sni=b.com&path=%2Fws");
        assert_eq!(query_get(&params, "sni"), Some("a.com"));
        assert_eq!(query_get(&params, "path"), Some("/ws"));
        assert_eq!(query_get(&params, "peer"), None);
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("1.2.3.4:8388"), Some(("1.2.3.4".to_string(), "8388")));
        assert_eq!(split_host_port("[2001:db8::1]:443"), Some(("2001:db8::1".to_string(), "443")));
        assert_eq!(split_host_port("example.com:abc"), Some(("example.com".to_string(), "abc")));
        assert_eq!(split_host_port("example.com"), None);
    }
}
