//! Ticker sanitization.

/// Lower-case the raw path parameter and keep only letters, digits and
/// underscore. Everything else is dropped, not rejected.
///
/// The sanitized value is interpolated into outbound upstream URLs, so this
/// doubles as an injection guard.
pub fn sanitize_ticker(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_symbols_and_lowercases() {
        assert_eq!(sanitize_ticker("AAPL!! 123"), "aapl123");
    }

    #[test]
    fn test_symbols_only_becomes_empty() {
        assert_eq!(sanitize_ticker("!@#$%^&*()"), "");
    }

    #[test]
    fn test_underscore_kept() {
        assert_eq!(sanitize_ticker("CBRF_USD"), "cbrf_usd");
    }

    #[test]
    fn test_non_ascii_letters_kept() {
        assert_eq!(sanitize_ticker("ЛУКОЙЛ"), "лукойл");
    }

    #[test]
    fn test_path_traversal_stripped() {
        assert_eq!(sanitize_ticker("../../etc/passwd"), "etcpasswd");
    }
}
