//! Conference listing harvester.
//!
//! Listing pages are dblp tables of contents: every paper is an
//! `<li class="entry ...">` block holding `itemprop="author"` spans and a
//! `<span class="title">`. The page is fetched once per (venue, year); any
//! failure yields an empty result for that pair.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::{
    classifier::Classifier,
    config::{Config, Venue},
    http::Transport,
    item::PaperRecord,
    text::element_text,
};

/// A paper as it appears on a listing page, before topic filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub authors: Vec<String>,
}

struct ListingSelectors {
    entry: Selector,
    title: Selector,
    author: Selector,
}

static SELECTORS: Lazy<ListingSelectors> = Lazy::new(|| ListingSelectors {
    entry: Selector::parse("li.entry").expect("Failed to parse entry selector"),
    title: Selector::parse("span.title").expect("Failed to parse title selector"),
    author: Selector::parse(r#"span[itemprop="author"] span[itemprop="name"]"#)
        .expect("Failed to parse author selector"),
});

/// Split a listing page into entries. Blocks without a title are skipped.
pub fn parse_entries(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    document
        .select(&SELECTORS.entry)
        .filter_map(|entry| {
            let title = entry
                .select(&SELECTORS.title)
                .next()
                .map(|t| clean_title(element_text(t)))
                .filter(|t| !t.is_empty())?;
            let authors = entry
                .select(&SELECTORS.author)
                .map(element_text)
                .filter(|a| !a.is_empty())
                .collect();
            Some(ListingEntry { title, authors })
        })
        .collect()
}

/// dblp terminates titles with a period.
fn clean_title(t: String) -> String {
    match t.strip_suffix('.') {
        Some(stripped) if !stripped.ends_with('.') => stripped.trim_end().to_string(),
        _ => t,
    }
}

/// Keep the entries that match a topic, tagged with venue and year.
pub fn select_papers(
    entries: Vec<ListingEntry>,
    classifier: &Classifier,
    proceedings: &str,
    year: i32,
) -> Vec<PaperRecord> {
    entries
        .into_iter()
        .filter_map(|e| {
            let topic = classifier.classify(&e.title)?;
            Some(PaperRecord {
                title: e.title,
                authors: e.authors,
                year,
                proceedings: proceedings.to_string(),
                topic,
            })
        })
        .collect()
}

/// Fetch and filter one listing page.
pub fn harvest_listing(
    http: &dyn Transport,
    cfg: &Config,
    classifier: &Classifier,
    venue: &Venue,
    year: i32,
) -> Vec<PaperRecord> {
    let url = cfg.listing_url(venue, year);
    let html = match http.get_text(&url, &[]) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(venue = %venue.key, year, "listing unavailable: {e}");
            return Vec::new();
        }
    };
    let entries = parse_entries(&html);
    let total = entries.len();
    let papers = select_papers(entries, classifier, &venue.display_name(), year);
    tracing::info!(
        venue = %venue.key,
        year,
        total,
        matched = papers.len(),
        "harvested listing"
    );
    papers
}

/// Harvest every configured (venue, year) pair, venue-major.
pub fn harvest_all(http: &dyn Transport, cfg: &Config) -> Vec<PaperRecord> {
    let classifier = cfg.classifier();
    cfg.pairs()
        .flat_map(|(venue, year)| harvest_listing(http, cfg, &classifier, venue, year))
        .collect()
}
