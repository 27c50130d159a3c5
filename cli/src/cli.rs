use std::path::PathBuf;

/// Census block lottery audit document builder
#[derive(clap::Parser, Debug)]
#[command(name = "drawmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// [PULSE_DATE] <SELECTION_CSV> <CARTOGRAPHY> <OUTPUT_JSON>; a leading pulse date switches to beacon mode
    #[arg(required = true, num_args = 3..=4, value_names = ["PULSE_DATE", "SELECTION_CSV", "CARTOGRAPHY", "OUTPUT_JSON"])]
    pub args: Vec<String>,

    /// Drop malformed coordinates instead of rejecting the block
    #[arg(long)]
    pub lenient_geometry: bool,

    /// Reject records whose housing/population counts are not integers
    #[arg(long)]
    pub strict_counts: bool,

    /// Selection CSV holds only the block id column
    #[arg(long)]
    pub single_column: bool,

    /// Date cited in date mode, defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Beacon pulse-by-time endpoint
    #[arg(long, default_value = drawmap::DEFAULT_BEACON_URL, value_hint = clap::ValueHint::Url)]
    pub beacon_url: String,

    /// Indent the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Also write <OUTPUT_JSON>.manifest.json with input/output digests
    #[arg(long)]
    pub manifest: bool,

    /// Log progress every N inserted blocks (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub progress_every: u64,
}

pub struct Positionals {
    pub pulse_date: Option<String>,
    pub selection: PathBuf,
    pub cartography: PathBuf,
    pub output: PathBuf,
}

impl Cli {
    /// Split the 3 or 4 positionals; clap has already enforced the count.
    pub fn positionals(&self) -> anyhow::Result<Positionals> {
        let (pulse_date, rest) = match self.args.as_slice() {
            [date, rest @ ..] if rest.len() == 3 => (Some(date.clone()), rest),
            rest if rest.len() == 3 => (None, rest),
            other => anyhow::bail!("[cli] expected 3 or 4 positional arguments, got {}", other.len()),
        };
        Ok(Positionals {
            pulse_date,
            selection: PathBuf::from(&rest[0]),
            cartography: PathBuf::from(&rest[1]),
            output: PathBuf::from(&rest[2]),
        })
    }
}
