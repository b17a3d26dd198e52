//! Listing page parsers
//!
//! Two layouts are understood:
//! - sub-forum pages, where each thread row links the thread's latest post
//!   (`showthread.php?p=N#postN`);
//! - the legacy homepage table, where each row carries the posted time and
//!   links to the thread's first and (optionally) last page.

use crate::crawler::scan::{scan_until_stop, Scan};
use crate::model::ThreadReference;
use crate::timestamp::AgeWindow;
use crate::url::{is_post_permalink, resolve_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Containers holding the thread list, most specific first; the whole
/// document is searched when none is present
const CONTENT_CONTAINERS: &[&str] = &["#threadbits_forum", "main"];

/// Extracts up to `max_results` post permalinks from a sub-forum page
///
/// Permalinks are taken in document order (the forum lists the most recently
/// active threads first) and resolved against `forum_url`.
pub fn list_thread_permalinks(
    forum_html: &str,
    forum_url: &Url,
    max_results: usize,
) -> Vec<ThreadReference> {
    let document = Html::parse_document(forum_html);
    let container = find_container(&document);

    let mut threads = Vec::new();
    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in container.select(&a_selector) {
            if threads.len() >= max_results {
                break;
            }
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_post_permalink(href) {
                continue;
            }
            if let Some(url) = resolve_link(href, forum_url) {
                threads.push(ThreadReference::new(url));
            }
        }
    }

    threads
}

fn find_container(document: &Html) -> ElementRef<'_> {
    CONTENT_CONTAINERS
        .iter()
        .find_map(|css| {
            let selector = Selector::parse(css).ok()?;
            document.select(&selector).next()
        })
        .unwrap_or_else(|| document.root_element())
}

/// Reads the legacy homepage table of latest threads
///
/// Each row is `<td/> <td>HH:MM</td> <td><a>category</a><a>title</a>[<a>last page</a>]</td>`.
/// Rows are newest first, so the scan stops at the first row older than the
/// window; rows without a time (headers, layout rows) are passed over.
pub fn list_recent_threads(
    homepage_html: &str,
    base_url: &Url,
    window: &AgeWindow,
) -> Vec<ThreadReference> {
    let document = Html::parse_document(homepage_html);
    let Ok(row_selector) = Selector::parse("tr") else {
        return Vec::new();
    };

    scan_until_stop(document.select(&row_selector), |row| {
        evaluate_row(row, base_url, window)
    })
    .collect()
}

fn evaluate_row(row: ElementRef<'_>, base_url: &Url, window: &AgeWindow) -> Scan<ThreadReference> {
    let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
    if cells.len() < 3 {
        return Scan::Skip;
    }

    let posted = element_text(cells[1]);
    let Some((_, check)) = window.place(&posted) else {
        return Scan::Skip;
    };
    if !check.within {
        tracing::debug!(
            "Listing row at {} is {}s old, stopping scan",
            posted,
            check.elapsed_seconds
        );
        return Scan::Stop;
    }

    let anchors: Vec<ElementRef<'_>> = child_elements(cells[2], "a").collect();
    if anchors.len() < 2 {
        return Scan::Skip;
    }

    let title = element_text(anchors[1]);
    let target = if anchors.len() >= 3 { anchors[2] } else { anchors[1] };

    match target
        .value()
        .attr("href")
        .and_then(|href| resolve_link(href, base_url))
    {
        Some(url) => Scan::Yield(ThreadReference::with_title(url, title)),
        None => Scan::Skip,
    }
}

/// Direct element children with the given tag name
fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
