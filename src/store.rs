use std::{fs, path::Path};

use anyhow::Context;
use serde::Serialize;

use crate::item::PaperRecord;

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write the records as a pretty-printed JSON array.
pub fn write_json(path: &Path, papers: &[PaperRecord]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(papers).context("failed to serialise papers")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Read records written by [`write_json`]. The file must exist.
pub fn read_json(path: &Path) -> anyhow::Result<Vec<PaperRecord>> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "cannot read {}; run the `fetch` mode first",
            path.display()
        )
    })?;
    serde_json::from_str(&raw).with_context(|| format!("malformed paper list in {}", path.display()))
}

#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    authors: String,
    year: i32,
    proceedings: &'a str,
    #[serde(rename = "type")]
    topic: &'static str,
}

/// Same shape as the JSON file; authors are joined with `; `.
pub fn write_csv(path: &Path, papers: &[PaperRecord]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for p in papers {
        wtr.serialize(CsvRow {
            title: &p.title,
            authors: p.authors.join("; "),
            year: p.year,
            proceedings: &p.proceedings,
            topic: p.topic.as_str(),
        })
        .context("failed to write CSV record")?;
    }
    wtr.flush().context("failed to flush CSV")?;
    Ok(())
}
