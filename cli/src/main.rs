mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use drawmap::{PipelineConfig, RunMode, RunOptions, SelectionLayout};

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pos = cli.positionals()?;
    let mode = match pos.pulse_date {
        Some(pulse_date) => RunMode::Beacon { pulse_date, beacon_url: cli.beacon_url.clone() },
        None => RunMode::Date(cli.date.clone()),
    };
    let opts = RunOptions {
        selection: pos.selection,
        cartography: pos.cartography,
        output: pos.output,
        mode,
        config: PipelineConfig {
            strict_geometry: !cli.lenient_geometry,
            strict_counts: cli.strict_counts,
            selection: if cli.single_column { SelectionLayout::SINGLE_COLUMN } else { SelectionLayout::TWO_COLUMN },
            progress_every: cli.progress_every,
        },
        pretty: cli.pretty,
        manifest: cli.manifest,
    };

    let stats = drawmap::run(&opts)?;
    if !stats.missing.is_empty() || stats.truncated.is_some() {
        tracing::warn!(missing = stats.missing.len(), truncated = stats.truncated.is_some(), "report is incomplete");
    }
    Ok(())
}

fn main() -> Result<()> { run() }
