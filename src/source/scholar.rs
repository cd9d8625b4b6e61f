use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::{
    http::{FetchError, Transport},
    source::{Hit, SearchBackend},
    text::element_text,
};

const SEARCH_URL: &str = "https://scholar.google.com/scholar";

/// Google Scholar results page scrape. A result's e-print link is the side
/// "[PDF]" link Scholar shows next to it.
pub struct Scholar;

struct ResultSelectors {
    result: Selector,
    title: Selector,
    eprint: Selector,
}

static SELECTORS: Lazy<ResultSelectors> = Lazy::new(|| ResultSelectors {
    result: Selector::parse("div.gs_r.gs_or").expect("Failed to parse result selector"),
    title: Selector::parse("h3.gs_rt").expect("Failed to parse title selector"),
    eprint: Selector::parse("div.gs_or_ggsm a[href]").expect("Failed to parse e-print selector"),
});
/// `[PDF]`, `[HTML]`, `[CITATION]` and friends in front of titles.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:\[[A-Z]+\]\s*)+").unwrap());

impl Scholar {
    pub fn query_url(title: &str) -> String {
        let mut url = Url::parse(SEARCH_URL).expect("static Scholar URL");
        url.query_pairs_mut()
            .append_pair("q", title)
            .append_pair("hl", "en");
        url.into()
    }
}

impl SearchBackend for Scholar {
    fn search(&self, http: &dyn Transport, query: &str) -> Result<Vec<Hit>, FetchError> {
        let html = http.get_text(&Self::query_url(query), &[])?;
        Ok(parse_results(&html))
    }
}

pub fn parse_results(html: &str) -> Vec<Hit> {
    let document = Html::parse_document(html);
    document
        .select(&SELECTORS.result)
        .filter_map(|result| {
            let title = result
                .select(&SELECTORS.title)
                .next()
                .map(|t| MARKER_RE.replace(&element_text(t), "").into_owned())
                .unwrap_or_default();
            let eprint = result
                .select(&SELECTORS.eprint)
                .next()
                .and_then(|a| a.value().attr("href"));
            if title.is_empty() && eprint.is_none() {
                return None;
            }
            Some(Hit::new(&title, eprint))
        })
        .collect()
}
