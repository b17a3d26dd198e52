//! URL handling for forum pages
//!
//! Resolution of relative hrefs against the page they were found on, and the
//! link shapes the forum uses for sub-forums, post permalinks and the
//! copy-to-clipboard permalink action.

mod patterns;

pub use patterns::{clipboard_path, is_forum_link, is_post_permalink, CLIPBOARD_PREFIX};

use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use forocoches_feed::url::resolve_link;
///
/// let base = Url::parse("https://forocoches.com/foro/forumdisplay.php?f=2").unwrap();
/// let link = resolve_link("showthread.php?p=10#post10", &base).unwrap();
/// assert_eq!(link.as_str(), "https://forocoches.com/foro/showthread.php?p=10#post10");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
