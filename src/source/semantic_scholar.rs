use serde::Deserialize;
use url::Url;

use crate::{
    http::{FetchError, Transport},
    source::{Hit, SearchBackend},
};

const SEARCH_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";

/// Semantic Scholar Graph API paper search.
pub struct SemanticScholar {
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
struct Paper {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "openAccessPdf", default)]
    open_access_pdf: Option<OpenAccessPdf>,
}

#[derive(Debug, Deserialize)]
struct OpenAccessPdf {
    #[serde(default)]
    url: Option<String>,
}

impl SemanticScholar {
    pub fn new(api_key: Option<String>) -> Self {
        SemanticScholar { api_key }
    }

    pub fn query_url(title: &str) -> String {
        let mut url = Url::parse(SEARCH_URL).expect("static Semantic Scholar URL");
        url.query_pairs_mut()
            .append_pair("query", title)
            .append_pair("fields", "title,openAccessPdf")
            .append_pair("limit", "1");
        url.into()
    }
}

impl SearchBackend for SemanticScholar {
    fn search(&self, http: &dyn Transport, query: &str) -> Result<Vec<Hit>, FetchError> {
        let headers: Vec<(&str, &str)> = self
            .api_key
            .as_deref()
            .map(|k| vec![("x-api-key", k)])
            .unwrap_or_default();
        let body = http.get_text(&Self::query_url(query), &headers)?;
        Ok(parse_response(&body))
    }
}

/// Malformed bodies are treated as an empty result set.
fn parse_response(body: &str) -> Vec<Hit> {
    let res: SearchResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("unreadable Semantic Scholar response: {e}");
            return Vec::new();
        }
    };
    res.data
        .into_iter()
        .map(|p| {
            let pdf = p.open_access_pdf.and_then(|o| o.url);
            Hit::new(p.title.as_deref().unwrap_or_default(), pdf.as_deref())
        })
        .collect()
}
