use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Decoder accepting padded and unpadded input alike.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes a Base64 string to its original form.
///
/// Subscription providers are inconsistent, so this accepts both the standard
/// and the URL-safe alphabet, with or without padding, and ignores whitespace
/// and line breaks inside the payload.
///
/// # Returns
/// The decoded string, or `None` if the input is not valid Base64 or does not
/// decode to UTF-8.
pub fn base64_decode(input: &str) -> Option<String> {
    let cleaned: String = url_safe_base64_reverse(input)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let cleaned = cleaned.trim_end_matches('=');
    if cleaned.is_empty() {
        return None;
    }

    let decoded = LENIENT.decode(cleaned).ok()?;
    String::from_utf8(decoded).ok()
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Converts a Base64 string to URL-safe Base64 format by replacing specific characters.
pub fn url_safe_base64_apply(input: &str) -> String {
    input
        .replace('+', "-")
        .replace('/', "_")
        .replace('=', "") // Remove padding
}

/// Encodes a string to URL-safe Base64 format.
pub fn url_safe_base64_encode(input: &str) -> String {
    url_safe_base64_apply(&base64_encode(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_padded_and_unpadded() {
        assert_eq!(base64_decode("YWVzLTI1Ni1nY206dGVzdA==").as_deref(), Some("aes-256-gcm:test"));
        assert_eq!(base64_decode("YWVzLTI1Ni1nY206dGVzdA").as_deref(), Some("aes-256-gcm:test"));
    }

    #[test]
    fn test_decode_url_safe_alphabet() {
        let encoded = url_safe_base64_encode("a/?b>c");
        assert!(!encoded.contains('='));
        assert_eq!(base64_decode(&encoded).as_deref(), Some("a/?b>c"));
    }

    #[test]
    fn test_decode_ignores_line_wrapping() {
        let encoded = base64_encode("ss://one\ntrojan://two\n");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\r\n{}\n", head, tail);
        assert_eq!(base64_decode(&wrapped).as_deref(), Some("ss://one\ntrojan://two\n"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(base64_decode(""), None);
        assert_eq!(base64_decode("not base64!"), None);
        assert_eq!(base64_decode("ss://abc@host:1"), None);
    }
}
