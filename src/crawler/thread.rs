//! Thread page parser
//!
//! A thread page lists its posts oldest first. Each post block looks like:
//!
//! ```text
//! <div class="postbit_wrapper">
//!     <span class="postdate old">Hoy 10:42</span>
//!     <a onclick='copyToClipboard("https://"+window.location.hostname+"/foro/showthread.php?p=N#postN")'>
//!     <div id="post_message_N">
//!         <div class="squote">quoted text</div>   (optional, always first)
//!         reply text
//!     </div>
//! </div>
//! ```
//!
//! Posts are read newest first and the scan ends at the first post that is not
//! from today, has an unreadable time, or is older than the window.

use crate::crawler::scan::{scan_until_stop, Scan};
use crate::model::Item;
use crate::timestamp::{format_created_at, AgeWindow};
use crate::url::clipboard_path;
use crate::{ScrapeError, SOURCE_DOMAIN};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Marker the forum puts on labels of posts published today
pub const TODAY_MARKER: &str = "Hoy";

static POST_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.postbit_wrapper"));
static POST_DATE: Lazy<Selector> = Lazy::new(|| selector("span.postdate"));
static POST_MESSAGE: Lazy<Selector> = Lazy::new(|| selector(r#"div[id*="post_message"]"#));
static QUOTE: Lazy<Selector> = Lazy::new(|| selector("div.squote"));
static ONCLICK: Lazy<Selector> = Lazy::new(|| selector("a[onclick]"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Per-thread inputs to the post scan
#[derive(Debug, Clone)]
pub struct ThreadContext<'a> {
    /// Page being parsed, for log messages
    pub page_url: &'a Url,

    /// Site root the clipboard permalink paths are relative to
    pub base_url: &'a Url,

    /// Title from the listing; wins over the page heading when present
    pub listing_title: Option<&'a str>,

    pub window: AgeWindow,

    /// Minimum characters of stripped content for a post to be emitted
    pub min_post_length: usize,

    /// Prefix content with `"<title>. "`
    pub include_title_in_content: bool,
}

/// A parsed thread page
pub struct ThreadPage {
    document: Html,
}

impl ThreadPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Text of the page's primary heading
    pub fn heading(&self) -> Option<String> {
        self.document
            .select(&HEADING)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Post blocks in document order (oldest first)
    pub fn post_blocks(&self) -> Vec<ElementRef<'_>> {
        self.document.select(&POST_BLOCK).collect()
    }

    /// Items for the posts inside the window, newest first
    ///
    /// Evaluation is lazy: posts past the first stopping point are never read.
    pub fn items<'p>(&'p self, ctx: &'p ThreadContext<'p>) -> impl Iterator<Item = Item> + 'p {
        let title = ctx
            .listing_title
            .map(str::to_string)
            .or_else(|| self.heading());

        let blocks = match title {
            Some(_) => self.post_blocks(),
            None => {
                tracing::warn!("No thread title on {}, skipping thread", ctx.page_url);
                Vec::new()
            }
        };
        let title = title.unwrap_or_default();

        scan_until_stop(blocks.into_iter().rev(), move |block| {
            match evaluate_post(block, &title, ctx) {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::warn!("Abandoning thread {}: {}", ctx.page_url, e);
                    Scan::Stop
                }
            }
        })
    }
}

/// Parses a thread page and returns the in-window items, newest first
pub fn parse_thread(thread_html: &str, ctx: &ThreadContext<'_>) -> Vec<Item> {
    let page = ThreadPage::parse(thread_html);
    let items: Vec<Item> = page.items(ctx).collect();
    items
}

/// Decides what to do with one post block
fn evaluate_post(
    block: ElementRef<'_>,
    title: &str,
    ctx: &ThreadContext<'_>,
) -> Result<Scan<Item>, ScrapeError> {
    let label = first_text(block, &POST_DATE)
        .ok_or_else(|| parse_error(ctx, "post without date label"))?;

    let Some(hhmm) = today_time(&label) else {
        return Ok(Scan::Stop);
    };

    let Some((timestamp, check)) = ctx.window.place(hhmm) else {
        tracing::debug!("Unreadable post time {:?} on {}", label, ctx.page_url);
        return Ok(Scan::Stop);
    };

    if !check.within {
        return Ok(Scan::Stop);
    }

    let body = last_text(block, &POST_MESSAGE)
        .ok_or_else(|| parse_error(ctx, "post without message body"))?;
    let quote = first_text(block, &QUOTE).unwrap_or_default();
    let content = strip_quote(&body, &quote);

    if content.is_empty() {
        return Ok(Scan::Skip);
    }
    if content.chars().count() < ctx.min_post_length {
        tracing::debug!(
            "Post shorter than {} characters on {}",
            ctx.min_post_length,
            ctx.page_url
        );
        return Ok(Scan::Skip);
    }

    let path = block
        .select(&ONCLICK)
        .filter_map(|anchor| anchor.value().attr("onclick"))
        .find_map(clipboard_path)
        .ok_or_else(|| parse_error(ctx, "post without permalink action"))?;
    let url = ctx.base_url.join(path)?;

    let content = if ctx.include_title_in_content {
        format!("{}. {}", title, content)
    } else {
        content.to_string()
    };

    Ok(Scan::Yield(Item {
        title: title.to_string(),
        content,
        author: None,
        created_at: format_created_at(&timestamp),
        url: url.to_string(),
        domain: SOURCE_DOMAIN.to_string(),
    }))
}

/// The `HH:MM` part of a "today" label, or `None` for any other day
///
/// `"Hoy 10:42"` and `"Hoy, 10:42"` both give `"10:42"`.
pub fn today_time(label: &str) -> Option<&str> {
    let start = label.find(TODAY_MARKER)? + TODAY_MARKER.len();
    Some(
        label[start..]
            .trim_start_matches(|c: char| c == ',' || c.is_whitespace())
            .trim_end(),
    )
}

/// Removes the quoted block from the start of a post body
///
/// Quoted text is rendered before the reply, so it is only removed when the
/// body starts with it.
pub fn strip_quote<'a>(body: &'a str, quote: &str) -> &'a str {
    let body = body.trim();
    let quote = quote.trim();
    if quote.is_empty() {
        return body;
    }
    body.strip_prefix(quote).unwrap_or(body).trim()
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|found| found.text().collect::<String>().trim().to_string())
}

fn last_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .last()
        .map(|found| found.text().collect::<String>().trim().to_string())
}

fn parse_error(ctx: &ThreadContext<'_>, message: &str) -> ScrapeError {
    ScrapeError::HtmlParse {
        url: ctx.page_url.to_string(),
        message: message.to_string(),
    }
}
