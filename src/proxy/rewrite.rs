//! Link rewriting for proxied content.
//!
//! # Responsibilities
//! - Decide which content types are eligible for rewriting
//! - Rewrite references that point back at the proxied origin so they
//!   route through the proxy prefix
//! - Leave everything else byte-for-byte untouched
//!
//! # Design Decisions
//! - Same-origin references only; links to third parties are not proxied
//! - Ordered literal replacement, no regex to guarantee O(n) scanning
//! - Scheme-relative `//host` references are left alone (too ambiguous
//!   to rewrite conservatively)

use url::Url;

/// Content types whose bodies get link rewriting. Everything else is
/// relayed as opaque bytes.
const REWRITABLE_TYPES: &[&str] = &["text/html", "text/css", "application/xhtml+xml"];

/// Attribute/function markers that introduce a root-relative reference.
const RELATIVE_MARKERS: &[&str] = &[
    "href=\"", "href='", "src=\"", "src='", "action=\"", "action='", "url(\"", "url('", "url(",
];

/// Whether a response with this `Content-Type` should be rewritten.
pub fn is_rewritable(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    REWRITABLE_TYPES
        .iter()
        .any(|t| essence.eq_ignore_ascii_case(t))
}

/// The `host[:port]` form of a target URL, as it appears in proxy paths.
pub fn origin_of(target: &Url) -> String {
    let host = target.host_str().unwrap_or_default();
    match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Rewrite references in `body` that point back at `target`'s origin so
/// they route through the proxy prefix on `external_url`.
///
/// Two rule families, applied in order:
/// 1. Absolute `http(s)://<origin>` references become
///    `http://<external_url><prefix>/<origin>`.
/// 2. Root-relative `href`/`src`/`action`/`url(` references are
///    re-rooted under `<prefix>/<origin>/`.
pub fn rewrite_links(body: &str, target: &Url, external_url: &str, prefix: &str) -> String {
    let origin = origin_of(target);
    let local_base = format!("{}/{}", prefix, origin);
    let absolute_base = format!("http://{}{}", external_url, local_base);

    let mut out = replace_origin(body, &format!("http://{}", origin), &absolute_base);
    out = replace_origin(&out, &format!("https://{}", origin), &absolute_base);

    for marker in RELATIVE_MARKERS {
        out = reroot_relative(&out, marker, &local_base);
    }
    out
}

/// Replace every occurrence of `needle` that ends at a reference
/// boundary. `http://example.com` must not match inside
/// `http://example.com.evil.org`.
fn replace_origin(body: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(idx) = rest.find(needle) {
        let end = idx + needle.len();
        out.push_str(&rest[..idx]);
        if rest[end..].chars().next().map_or(true, is_reference_end) {
            out.push_str(replacement);
        } else {
            out.push_str(needle);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn is_reference_end(c: char) -> bool {
    matches!(c, '/' | '"' | '\'' | '?' | '#' | ')' | '<' | '>') || c.is_whitespace()
}

/// Insert `local_base` after `marker` wherever a root-relative path
/// follows. A double slash means a scheme-relative reference and is
/// left untouched.
fn reroot_relative(body: &str, marker: &str, local_base: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(idx) = rest.find(marker) {
        let end = idx + marker.len();
        out.push_str(&rest[..end]);
        let tail = &rest[end..];
        if tail.starts_with('/') && !tail.starts_with("//") {
            out.push_str(local_base);
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
