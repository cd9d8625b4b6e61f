use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use chrono::Datelike;
use serde::Deserialize;

use crate::classifier::{ATTACK_KEYWORDS, DEFENSE_KEYWORDS, Classifier};

pub const DEFAULT_LISTING_URL: &str = "https://dblp.org/db/conf/{venue}/{venue}{year}.html";
pub const DEFAULT_START_YEAR: i32 = 2017;

/// Run configuration. Every field has a built-in default, so a missing config
/// file means "use the defaults", and a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub out_dir: PathBuf,
    pub start_year: i32,
    /// Inclusive; the current year when unset.
    pub end_year: Option<i32>,
    /// Listing page template with `{venue}` and `{year}` placeholders.
    pub listing_url: String,
    pub venues: Vec<Venue>,
    pub keywords: Keywords,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Venue {
    /// Identifier used to build the listing URL, e.g. `ccs`.
    pub key: String,
    /// Display name written to `proceedings`; the upper-cased key when unset.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Keywords {
    pub attack: Vec<String>,
    pub defense: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Overall timeout for listing pages and search APIs.
    pub timeout_secs: u64,
    /// Overall timeout for PDF downloads.
    pub download_timeout_secs: u64,
    /// Largest listing page or API response accepted, in bytes.
    pub max_page_bytes: u64,
    /// Largest PDF accepted, in bytes.
    pub max_download_bytes: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub arxiv_max_results: u32,
    pub semantic_scholar_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            out_dir: PathBuf::from("output"),
            start_year: DEFAULT_START_YEAR,
            end_year: None,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            venues: default_venues(),
            keywords: Keywords::default(),
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Keywords {
            attack: ATTACK_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            defense: DEFENSE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_secs: 10,
            timeout_secs: 30,
            download_timeout_secs: 120,
            max_page_bytes: 64 * 1024 * 1024,
            max_download_bytes: 100 * 1024 * 1024,
            user_agent: format!(
                "Mozilla/5.0 (compatible; backdoor-papers/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            arxiv_max_results: 5,
            semantic_scholar_api_key: None,
        }
    }
}

fn default_venues() -> Vec<Venue> {
    vec![
        Venue::named("sp", "S&P"),
        Venue::new("ccs"),
        Venue::named("uss", "USENIX Security"),
        Venue::new("ndss"),
        Venue::new("icml"),
        Venue::new("iclr"),
        Venue::new("cvpr"),
        Venue::new("aaai"),
    ]
}

impl Venue {
    pub fn new(key: &str) -> Self {
        Venue {
            key: key.to_string(),
            name: None,
        }
    }

    pub fn named(key: &str, name: &str) -> Self {
        Venue {
            key: key.to_string(),
            name: Some(name.to_string()),
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.key.to_uppercase())
    }
}

impl Config {
    /// Read a TOML config file. A missing or malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        cfg.apply_env();
        cfg
    }

    fn apply_env(&mut self) {
        if self.sources.semantic_scholar_api_key.is_none()
            && let Ok(key) = std::env::var("SEMANTIC_SCHOLAR_API_KEY")
            && !key.trim().is_empty()
        {
            self.sources.semantic_scholar_api_key = Some(key.trim().to_string());
        }
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        let end = self
            .end_year
            .unwrap_or_else(|| chrono::Local::now().year());
        self.start_year..=end
    }

    /// Venue-major, year-minor.
    pub fn pairs(&self) -> impl Iterator<Item = (&Venue, i32)> + '_ {
        self.venues
            .iter()
            .flat_map(move |v| self.years().map(move |y| (v, y)))
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.keywords.attack.as_slice(), self.keywords.defense.as_slice())
    }

    pub fn listing_url(&self, venue: &Venue, year: i32) -> String {
        self.listing_url
            .replace("{venue}", &venue.key)
            .replace("{year}", &year.to_string())
    }

    pub fn papers_json(&self) -> PathBuf {
        self.out_dir.join("papers.json")
    }

    pub fn papers_csv(&self) -> PathBuf {
        self.out_dir.join("papers.csv")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.out_dir.join("papers")
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
