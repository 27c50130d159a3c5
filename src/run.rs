//! File-level orchestration: open inputs, resolve run metadata, stream, write the report.

use std::{ffi::OsString, fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::PipelineConfig;
use crate::kml::{open_cartography, PlacemarkReader};
use crate::pipeline::{Pipeline, RunStats};
use crate::report::{sha256_file, write_json, Manifest, PendingWrite, RunMetadata};

/// How the report is dated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Cite a plain date; today's local date when `None`.
    Date(Option<String>),
    /// Look up the beacon pulse emitted at `pulse_date` and cite it.
    Beacon { pulse_date: String, beacon_url: String },
}

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub selection: PathBuf,
    pub cartography: PathBuf,
    pub output: PathBuf,
    pub mode: RunMode,
    pub config: PipelineConfig,
    pub pretty: bool,
    /// Also write `<output>.manifest.json` with input/output digests.
    pub manifest: bool,
}

/// Run the pipeline end to end. Any error returned here is fatal for the run.
pub fn run(opts: &RunOptions) -> Result<RunStats> {
    // Open everything up front so I/O failures abort before any work is done.
    let selection = File::open(&opts.selection)
        .with_context(|| format!("[run] Failed to open selection file: {}", opts.selection.display()))?;
    let cartography = open_cartography(&opts.cartography)?;
    let sink = PendingWrite::open(&opts.output)?;

    let metadata = resolve_metadata(&opts.mode)?;

    let mut pipeline = Pipeline::new(opts.config);
    pipeline.load_selection(BufReader::new(selection))
        .with_context(|| format!("[run] Failed to read selection file: {}", opts.selection.display()))?;

    let mut reader = PlacemarkReader::new(cartography);
    pipeline.stream(&mut reader)
        .with_context(|| format!("[run] Failed to read cartography file: {}", opts.cartography.display()))?;

    let (report, stats) = pipeline.assemble(Some(metadata));
    sink.write_json(&report, opts.pretty)?;
    info!(output = %opts.output.display(), blocks = stats.inserted, "report written");

    if opts.manifest {
        let path = manifest_path(&opts.output);
        let files = [
            ("selection", &opts.selection),
            ("cartography", &opts.cartography),
            ("report", &opts.output),
        ]
        .into_iter()
        .map(|(role, path)| Ok((role, sha256_file(path)?)))
        .collect::<Result<_>>()?;
        write_json(&path, &Manifest::new(stats.counts(), files), true)?;
        info!(manifest = %path.display(), "manifest written");
    }

    Ok(stats)
}

fn resolve_metadata(mode: &RunMode) -> Result<RunMetadata> {
    match mode {
        RunMode::Date(date) => Ok(RunMetadata::Date {
            date: date.clone().unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
        }),
        #[cfg(feature = "beacon")]
        RunMode::Beacon { pulse_date, beacon_url } => {
            let pulse = crate::beacon::BeaconClient::new(beacon_url.as_str())?
                .pulse(pulse_date)
                .with_context(|| format!("[run] Failed to look up beacon pulse for {pulse_date}"))?;
            info!(pulse = pulse.pulse_index, chain = pulse.chain_index, "beacon pulse resolved");
            Ok(RunMetadata::Beacon(pulse))
        }
        #[cfg(not(feature = "beacon"))]
        RunMode::Beacon { .. } => anyhow::bail!("[run] Beacon lookup requested but drawmap was built without the `beacon` feature"),
    }
}

/// `<output>.manifest.json`, next to the report.
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".manifest.json");
    PathBuf::from(name)
}
