//! PDF downloader and missing-log writer.
//!
//! Layout under the output directory:
//!
//! - `papers/<venue>/<title>.pdf` for every resolved paper
//! - `missing_<venue>.txt`, one title per line, for papers no source could
//!   resolve. These logs are reset at the start of every run.

use std::{
    collections::BTreeSet,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{http::Transport, item::PaperRecord, resolver::Resolver, text::sanitize_filename};

const MISSING_PREFIX: &str = "missing_";

/// Counters for one downloader run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
}

pub fn missing_log_path(out_dir: &Path, venue: &str) -> PathBuf {
    out_dir.join(format!("{MISSING_PREFIX}{}.txt", sanitize_filename(venue)))
}

pub fn pdf_path(pdf_dir: &Path, paper: &PaperRecord) -> PathBuf {
    pdf_dir
        .join(sanitize_filename(&paper.proceedings))
        .join(format!("{}.pdf", sanitize_filename(&paper.title)))
}

/// Delete every `missing_*.txt` left in `out_dir`, then create an empty log
/// for each venue about to be processed.
pub fn reset_missing_logs<'a>(
    out_dir: &Path,
    venues: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.display()))?;
    for entry in fs::read_dir(out_dir)
        .with_context(|| format!("failed to list {}", out_dir.display()))?
    {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(MISSING_PREFIX) && n.ends_with(".txt"));
        if is_log && path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    let venues: BTreeSet<&str> = venues.into_iter().collect();
    for venue in venues {
        let path = missing_log_path(out_dir, venue);
        fs::File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    }
    Ok(())
}

fn append_missing(out_dir: &Path, venue: &str, title: &str) -> anyhow::Result<()> {
    let path = missing_log_path(out_dir, venue);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{title}").with_context(|| format!("failed to write {}", path.display()))
}

/// What happened to one paper.
#[derive(Debug)]
enum Outcome {
    Skipped(PathBuf),
    Missing,
    Downloaded(PathBuf),
    Failed(anyhow::Error),
}

pub struct Downloader<'a> {
    http: &'a dyn Transport,
    resolver: &'a Resolver,
    out_dir: PathBuf,
    pdf_dir: PathBuf,
    skip_existing: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(http: &'a dyn Transport, resolver: &'a Resolver, out_dir: &Path, pdf_dir: &Path) -> Self {
        Downloader {
            http,
            resolver,
            out_dir: out_dir.to_path_buf(),
            pdf_dir: pdf_dir.to_path_buf(),
            skip_existing: false,
        }
    }

    /// Leave papers whose PDF is already on disk alone.
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Process every paper. Only the missing-log reset can abort the batch;
    /// per-paper failures are logged and counted.
    pub fn run(&self, papers: &[PaperRecord]) -> anyhow::Result<Summary> {
        reset_missing_logs(&self.out_dir, papers.iter().map(|p| p.proceedings.as_str()))?;

        let bar = ProgressBar::new(papers.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut summary = Summary::default();
        for paper in papers {
            bar.set_message(paper.title.clone());
            // Log with the bar hidden.
            match self.process(paper) {
                Outcome::Skipped(path) => {
                    summary.skipped += 1;
                    bar.suspend(|| tracing::debug!(path = %path.display(), "already downloaded"));
                }
                Outcome::Missing => {
                    summary.missing += 1;
                    let logged = append_missing(&self.out_dir, &paper.proceedings, &paper.title);
                    bar.suspend(|| {
                        tracing::info!(title = %paper.title, "no PDF source");
                        if let Err(e) = logged {
                            tracing::warn!("{e:#}");
                        }
                    });
                }
                Outcome::Downloaded(path) => {
                    summary.downloaded += 1;
                    bar.suspend(|| tracing::info!(path = %path.display(), "downloaded"));
                }
                Outcome::Failed(e) => {
                    summary.failed += 1;
                    bar.suspend(|| tracing::warn!(title = %paper.title, "download failed: {e:#}"));
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok(summary)
    }

    fn process(&self, paper: &PaperRecord) -> Outcome {
        let target = pdf_path(&self.pdf_dir, paper);
        if self.skip_existing && target.is_file() {
            return Outcome::Skipped(target);
        }
        let Some(resolved) = self.resolver.resolve(self.http, &paper.title) else {
            return Outcome::Missing;
        };
        match self.save(&resolved.url, &target) {
            Ok(()) => Outcome::Downloaded(target),
            Err(e) => Outcome::Failed(e),
        }
    }

    fn save(&self, url: &str, target: &Path) -> anyhow::Result<()> {
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let body = self.http.get_bytes(url)?;
        fs::write(target, body).with_context(|| format!("failed to write {}", target.display()))
    }
}
