use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command},
    config::Config,
    download::Downloader,
    http::HttpClient,
    resolver::Resolver,
};

mod classifier;
mod cli;
mod config;
mod download;
mod http;
mod item;
mod listing;
mod resolver;
mod source;
mod store;
mod text;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };
    if let Some(dir) = args.out_dir {
        cfg.out_dir = dir;
    }
    let http = HttpClient::new(&cfg.http);

    match args.command {
        Command::Fetch { csv } => fetch(&cfg, &http, csv),
        Command::Download { skip_existing } => download(&cfg, &http, skip_existing),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fetch(cfg: &Config, http: &HttpClient, csv: bool) -> anyhow::Result<()> {
    let years = cfg.years();
    tracing::info!(
        venues = cfg.venues.len(),
        from = years.start(),
        to = years.end(),
        "harvesting listings"
    );
    let papers = listing::harvest_all(http, cfg);

    let json = cfg.papers_json();
    store::write_json(&json, &papers)?;
    if csv {
        store::write_csv(&cfg.papers_csv(), &papers)?;
    }
    eprintln!(
        "{} {} papers written to {}",
        "✓".if_supports_color(Stderr, |t| t.green()),
        papers.len(),
        json.display()
    );
    Ok(())
}

fn download(cfg: &Config, http: &HttpClient, skip_existing: bool) -> anyhow::Result<()> {
    let papers = store::read_json(&cfg.papers_json())?;
    let resolver = Resolver::default_chain(&cfg.sources);
    let summary = Downloader::new(http, &resolver, &cfg.out_dir, &cfg.pdf_dir())
        .skip_existing(skip_existing)
        .run(&papers)?;

    let ok = format!("✓ {}", summary.downloaded);
    let missing = format!("✗ {}", summary.missing + summary.failed);
    eprintln!(
        "{}  {}  ({} not found, {} failed, {} skipped)",
        ok.if_supports_color(Stderr, |t| t.green()),
        missing.if_supports_color(Stderr, |t| t.red()),
        summary.missing,
        summary.failed,
        summary.skipped
    );
    Ok(())
}
