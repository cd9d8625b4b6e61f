use crate::{
    config::SourcesConfig,
    http::Transport,
    source::{
        Hit, SearchBackend, arxiv::Arxiv, scholar::Scholar, semantic_scholar::SemanticScholar,
    },
    text::normalize_title,
};

/// How a strategy decides whether a result set yields a usable link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Accept the first hit whose normalised title equals the query's and
    /// that carries a PDF link.
    ExactTitle,
    /// Accept the first hit's PDF link, whatever its title.
    FirstHit,
}

impl MatchPolicy {
    pub fn select(self, query: &str, hits: &[Hit]) -> Option<String> {
        match self {
            MatchPolicy::ExactTitle => {
                let wanted = normalize_title(query);
                hits.iter()
                    .filter(|h| normalize_title(&h.title) == wanted)
                    .find_map(|h| h.pdf_url.clone())
            }
            MatchPolicy::FirstHit => hits.first().and_then(|h| h.pdf_url.clone()),
        }
    }
}

/// One step of the fallback chain.
pub struct Strategy {
    pub name: &'static str,
    pub backend: Box<dyn SearchBackend>,
    pub policy: MatchPolicy,
}

impl Strategy {
    pub fn new(name: &'static str, backend: impl SearchBackend + 'static, policy: MatchPolicy) -> Self {
        Strategy {
            name,
            backend: Box::new(backend),
            policy,
        }
    }

    /// Never fails: every provider error counts as "no link".
    pub fn lookup(&self, http: &dyn Transport, title: &str) -> Option<String> {
        let hits = match self.backend.search(http, title) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::debug!(strategy = self.name, "lookup failed: {e}");
                return None;
            }
        };
        if hits.is_empty() {
            tracing::debug!(strategy = self.name, title, "no results");
            return None;
        }
        let link = self.policy.select(title, &hits);
        if link.is_none() {
            tracing::debug!(strategy = self.name, title, "no acceptable PDF link");
        }
        link
    }
}

/// A PDF link and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: String,
    pub strategy: &'static str,
}

/// Tries each strategy in order and stops at the first link.
pub struct Resolver {
    strategies: Vec<Strategy>,
}

impl Resolver {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Resolver { strategies }
    }

    /// NOTE: Ordering is important here, as it signifies priority. The exact
    /// title match comes first; the looser sources only fill the gaps.
    pub fn default_chain(sources: &SourcesConfig) -> Self {
        Resolver::new(vec![
            Strategy::new(
                "arxiv",
                Arxiv::new(sources.arxiv_max_results),
                MatchPolicy::ExactTitle,
            ),
            Strategy::new(
                "semantic-scholar",
                SemanticScholar::new(sources.semantic_scholar_api_key.clone()),
                MatchPolicy::FirstHit,
            ),
            Strategy::new("scholar", Scholar, MatchPolicy::FirstHit),
        ])
    }

    pub fn resolve(&self, http: &dyn Transport, title: &str) -> Option<Resolved> {
        self.strategies.iter().find_map(|s| {
            s.lookup(http, title).map(|url| Resolved {
                url,
                strategy: s.name,
            })
        })
    }
}
