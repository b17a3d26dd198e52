//! Sub-forum discovery and selection
//!
//! The homepage links every sub-forum. Each run harvests the general
//! sub-forum plus a few others picked at random, so repeated runs spread
//! their requests across the site.

use crate::model::ForumReference;
use crate::url::{is_forum_link, resolve_link};
use crate::ScrapeError;
use rand::seq::SliceRandom;
use rand::Rng;
use scraper::{Html, Selector};
use url::Url;

/// Extracts every sub-forum URL linked from the homepage
///
/// URLs are absolute, deduplicated, and in document order.
pub fn list_forums(homepage_html: &str, homepage_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(homepage_html);
    let mut forums: Vec<Url> = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_forum_link(href) {
                continue;
            }
            if let Some(url) = resolve_link(href, homepage_url) {
                if !forums.contains(&url) {
                    forums.push(url);
                }
            }
        }
    }

    forums
}

/// Chooses the sub-forums to harvest
///
/// The general sub-forum always comes first, followed by `sample_size`
/// distinct sub-forums sampled uniformly without replacement from
/// `discovered` (the general one excluded).
///
/// # Errors
///
/// `ScrapeError::InsufficientForums` when fewer than `sample_size`
/// candidates were discovered.
pub fn select_forums<R: Rng + ?Sized>(
    general: &Url,
    discovered: &[Url],
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<ForumReference>, ScrapeError> {
    let candidates: Vec<&Url> = discovered.iter().filter(|url| *url != general).collect();

    if candidates.len() < sample_size {
        return Err(ScrapeError::InsufficientForums {
            found: candidates.len(),
            required: sample_size,
        });
    }

    let mut selected = Vec::with_capacity(sample_size + 1);
    selected.push(ForumReference::new(general.clone()));
    selected.extend(
        candidates
            .choose_multiple(rng, sample_size)
            .map(|url| ForumReference::new((*url).clone())),
    );

    Ok(selected)
}
