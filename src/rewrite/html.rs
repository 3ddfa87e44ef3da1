//! Absolute-link rewriting for proxied HTML documents.
//!
//! Four transforms, applied in order over the whole document:
//! 1. remove every `<script>...</script>` element, including multi-line bodies;
//! 2. rewrite absolute `href` attributes to `/proxy?url=<encoded>`;
//! 3. rewrite absolute `src` attributes the same way;
//! 4. rewrite `<form>` actions that resolve to absolute http(s) URLs to
//!    `/formproxy?url=<encoded>`.
//!
//! Quote style of the original attribute is preserved.

use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

use crate::proxy::target::is_absolute_http_url;

/// Characters escaped when a captured URL is embedded as a query value:
/// everything except ASCII alphanumerics and `- _ . ! ~ * ' ( )`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href=(["'])(https?://[^"']+)["']"#).unwrap());

static SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src=(["'])(https?://[^"']+)["']"#).unwrap());

static FORM_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<form\b[^>]*?\baction=)("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

/// Percent-encode a URL for embedding as a `url=` query value.
fn encode_target(url: &str) -> String {
    utf8_percent_encode(url, QUERY_VALUE).to_string()
}

/// Rewrite one captured quoted attribute to a proxy endpoint, preserving the
/// opening quote character on both sides.
fn rewrite_attribute(caps: &Captures, attribute: &str, endpoint: &str) -> String {
    let quote = &caps[1];
    let url = &caps[2];
    format!(
        "{attribute}={quote}{endpoint}?url={}{quote}",
        encode_target(url)
    )
}

/// Remove every script element in its entirety.
pub fn strip_scripts(html: &str) -> String {
    SCRIPT.replace_all(html, "").into_owned()
}

/// Rewrite absolute `href` and `src` attributes to `/proxy?url=...`.
pub fn rewrite_links(html: &str) -> String {
    let html = HREF.replace_all(html, |caps: &Captures| {
        rewrite_attribute(caps, "href", "/proxy")
    });
    SRC.replace_all(&html, |caps: &Captures| {
        rewrite_attribute(caps, "src", "/proxy")
    })
    .into_owned()
}

/// Rewrite `<form>` actions to `/formproxy?url=...`.
///
/// The captured action value may be double-quoted, single-quoted, or bare;
/// after stripping surrounding quotes, any value that parses as an absolute
/// http(s) URL is rewritten. Relative actions are left alone.
pub fn rewrite_form_actions(html: &str) -> String {
    FORM_ACTION
        .replace_all(html, |caps: &Captures| {
            let prefix = &caps[1];
            let raw = &caps[2];
            let action = raw.trim_matches(|c| c == '"' || c == '\'');
            if is_absolute_http_url(action) {
                let quote = match raw.chars().next() {
                    Some('\'') => '\'',
                    _ => '"',
                };
                format!(
                    "{prefix}{quote}/formproxy?url={}{quote}",
                    encode_target(action)
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Apply the full rewrite pipeline to a document.
pub fn rewrite(html: &str) -> String {
    let html = strip_scripts(html);
    let html = rewrite_links(&html);
    rewrite_form_actions(&html)
}
