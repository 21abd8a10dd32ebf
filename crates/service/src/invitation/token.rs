use rand::{rngs::OsRng, RngCore};

pub const TOKEN_BYTES: usize = 16;

/// 16 random bytes from the OS rng, lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// `{base}/invite/accept/{token}`
pub fn build_link(base_url: &str, token: &str) -> String {
    format!("{}/invite/accept/{}", base_url.trim_end_matches('/'), token)
}

/// Last non-empty path segment of an invitation link, ignoring query and fragment.
///
/// A bare token is accepted as its own link.
pub fn extract_token(link: &str) -> Option<&str> {
    let link = link.trim();
    let path = link.split(['?', '#']).next().unwrap_or_default();
    let token = path.rsplit('/').find(|s| !s.is_empty())?;
    if token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_32_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn link_roundtrips_through_extract() {
        let link = build_link("https://app.example.com/", "abc123");
        assert_eq!(link, "https://app.example.com/invite/accept/abc123");
        assert_eq!(extract_token(&link), Some("abc123"));
    }

    #[test]
    fn extract_handles_trailing_slash_and_query() {
        assert_eq!(extract_token("http://h/invite/accept/tok/"), Some("tok"));
        assert_eq!(extract_token("http://h/invite/accept/tok?x=1"), Some("tok"));
        assert_eq!(extract_token("tok"), Some("tok"));
    }

    #[test]
    fn extract_rejects_empty_and_garbage() {
        assert_eq!(extract_token(""), None);
        assert_eq!(extract_token("   "), None);
        assert_eq!(extract_token("///"), None);
        assert_eq!(extract_token("http://h/accept/not a token"), None);
    }
}
