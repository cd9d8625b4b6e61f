use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file overriding the built-in venues, years, keywords and timeouts
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for papers.json, missing logs and downloaded PDFs
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Harvest matching papers from the venue listings into papers.json
    Fetch {
        /// Also write papers.csv
        #[arg(long)]
        csv: bool,
    },
    /// Download a PDF for every paper in papers.json
    Download {
        /// Skip papers whose PDF is already on disk
        #[arg(long)]
        skip_existing: bool,
    },
}
