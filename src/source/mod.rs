use crate::http::{FetchError, Transport};

pub mod arxiv;
pub mod scholar;
pub mod semantic_scholar;

/// One search result: the title the provider reports and its PDF link, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub title: String,
    pub pdf_url: Option<String>,
}

impl Hit {
    pub fn new(title: &str, pdf_url: Option<&str>) -> Self {
        Hit {
            title: title.to_string(),
            pdf_url: pdf_url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }
}

/// A provider that can be searched by free-text title.
pub trait SearchBackend {
    /// Results in provider order. An empty list means "nothing found".
    fn search(&self, http: &dyn Transport, query: &str) -> Result<Vec<Hit>, FetchError>;
}
