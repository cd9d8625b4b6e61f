use serde::{Deserialize, Serialize};

/// A paper kept by the harvester. Written once to `papers.json` and read back
/// unchanged by the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    /// Display name of the venue, e.g. "CCS".
    pub proceedings: String,
    #[serde(rename = "type")]
    pub topic: Topic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Attack,
    Defense,
    Both,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Attack => "attack",
            Topic::Defense => "defense",
            Topic::Both => "both",
        }
    }
}
