use once_cell::sync::Lazy;
use regex::Regex;

static FORUM_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"forumdisplay\.php\?f=\d+$").expect("valid forum link regex"));

static POST_PERMALINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"showthread\.php\?p=\d+#post\d+$").expect("valid post permalink regex")
});

/// Literal that opens the permalink action on every post block
pub const CLIPBOARD_PREFIX: &str = r#"copyToClipboard("https://"+window.location.hostname+""#;

/// True for hrefs pointing at a sub-forum listing (`forumdisplay.php?f=N`)
pub fn is_forum_link(href: &str) -> bool {
    FORUM_LINK.is_match(href.trim())
}

/// True for hrefs addressing one post inside a thread (`showthread.php?p=N#postN`)
pub fn is_post_permalink(href: &str) -> bool {
    POST_PERMALINK.is_match(href.trim())
}

/// Extracts the site-relative path from a post's copy-to-clipboard action
///
/// The action looks like
/// `copyToClipboard("https://"+window.location.hostname+"/foro/showthread.php?p=1#post1");return false;`
/// and the path is everything between the prefix and the next double quote.
pub fn clipboard_path(onclick: &str) -> Option<&str> {
    let start = onclick.find(CLIPBOARD_PREFIX)? + CLIPBOARD_PREFIX.len();
    let rest = &onclick[start..];
    let end = rest.find('"')?;
    let path = rest[..end].trim();
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}
