//! Target URL validation and query manipulation.

use url::{form_urlencoded, Url};

/// Returns true iff `s` parses as an absolute URL with scheme http or https.
pub fn is_absolute_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Decode a raw query string into key/value pairs, preserving order and
/// duplicates.
pub fn query_params(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

/// Append extra query parameters to a target URL, joining with `&` when the
/// target already carries a query and `?` otherwise.
pub fn merge_query(target: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return target.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    let extra = serializer.finish();
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{target}{separator}{extra}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_only() {
        assert!(is_absolute_http_url("https://example.com"));
        assert!(is_absolute_http_url("http://example.com/path?x=1"));
        assert!(!is_absolute_http_url("ftp://x"));
        assert!(!is_absolute_http_url("javascript:alert(1)"));
        assert!(!is_absolute_http_url("not a url"));
        assert!(!is_absolute_http_url("/relative/path"));
    }

    #[test]
    fn merge_uses_question_mark_without_existing_query() {
        let merged = merge_query(
            "http://a.com/path",
            &[("x".to_string(), "1".to_string())],
        );
        assert_eq!(merged, "http://a.com/path?x=1");
    }

    #[test]
    fn merge_uses_ampersand_with_existing_query() {
        let merged = merge_query(
            "http://a.com/path?a=1",
            &[("x".to_string(), "two words".to_string())],
        );
        assert_eq!(merged, "http://a.com/path?a=1&x=two+words");
    }

    #[test]
    fn merge_with_no_params_is_identity() {
        assert_eq!(merge_query("http://a.com/", &[]), "http://a.com/");
    }

    #[test]
    fn query_params_preserve_duplicates() {
        let params = query_params("a=1&a=2&b=x");
        assert_eq!(
            params,
            vec![
                ("a".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("b".to_string(), "x".to_string()),
            ]
        );
    }
}
