//! flwdir CLI: run D8 network analysis on JSON grids and compare result sets.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use flwdir_core::{AnalysisOptions, BoundaryPolicy, FlowGrid, FlowNetwork, NetworkResult};

#[derive(Parser)]
#[command(name = "flwdir")]
#[command(author, version, about = "D8 drainage-network analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a D8 grid and write the result as JSON
    Analyze {
        /// Grid JSON: {"rows", "cols", "data"} or a nested array of rows
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Name stored as `test_name` (defaults to the input file stem)
        #[arg(long)]
        name: Option<String>,
        /// Treatment of cells draining off the grid
        #[arg(long, value_enum)]
        boundary: Option<BoundaryArg>,
        /// NODATA code, or "none" to disable
        #[arg(long, value_parser = parse_nodata)]
        nodata: Option<Nodata>,
        /// Options JSON; flags above override its fields
        #[arg(long)]
        options: Option<PathBuf>,
        /// Number of timed runs; the median is reported
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,
    },
    /// Compare two result files field by field
    Compare {
        /// First result file (one result or an array)
        left: PathBuf,
        /// Second result file (one result or an array)
        right: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoundaryArg {
    Pit,
    Invalid,
}

impl From<BoundaryArg> for BoundaryPolicy {
    fn from(b: BoundaryArg) -> Self {
        match b {
            BoundaryArg::Pit => BoundaryPolicy::Pit,
            BoundaryArg::Invalid => BoundaryPolicy::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Nodata(Option<u8>);

fn parse_nodata(s: &str) -> std::result::Result<Nodata, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(Nodata(None));
    }
    s.parse::<u8>()
        .map(|code| Nodata(Some(code)))
        .map_err(|_| format!("expected a code in 0..=255 or \"none\", got {s:?}"))
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn read_json(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_options(
    path: Option<&Path>,
    boundary: Option<BoundaryArg>,
    nodata: Option<Nodata>,
) -> Result<AnalysisOptions> {
    let mut opts = match path {
        Some(p) => AnalysisOptions::from_json_str(&read_json(p)?)
            .with_context(|| format!("Invalid options in {}", p.display()))?,
        None => AnalysisOptions::default(),
    };
    if let Some(b) = boundary {
        opts.boundary = b.into();
    }
    if let Some(Nodata(code)) = nodata {
        opts.nodata = code;
    }
    opts.validate().context("Invalid analysis options")?;
    Ok(opts)
}

fn median(mut xs: Vec<f64>) -> f64 {
    xs.sort_by(f64::total_cmp);
    xs[xs.len() / 2]
}

/// Results in a file: either a single object or an array of them.
fn load_results(path: &Path) -> Result<Vec<(String, NetworkResult)>> {
    let value: Value = serde_json::from_str(&read_json(path)?)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let name = item
                .get("test_name")
                .and_then(Value::as_str)
                .map_or_else(|| format!("#{i}"), str::to_owned);
            let result = serde_json::from_value(item)
                .with_context(|| format!("{}: entry {name} is not a network result", path.display()))?;
            Ok((name, result))
        })
        .collect()
}

// ─── Commands ───────────────────────────────────────────────────────────

fn analyze(
    input: &Path,
    output: Option<&Path>,
    name: Option<String>,
    opts: &AnalysisOptions,
    repeat: u32,
) -> Result<()> {
    let grid = FlowGrid::from_json_str(&read_json(input)?)
        .with_context(|| format!("Invalid grid in {}", input.display()))?;
    info!("Input: {} x {} ({} cells)", grid.rows(), grid.cols(), grid.size());

    let mut timings = Vec::with_capacity(repeat as usize);
    let mut network = None;
    for _ in 0..repeat {
        let start = Instant::now();
        let net = FlowNetwork::build(&grid, opts).context("Analysis failed")?;
        timings.push(start.elapsed().as_secs_f64());
        network = Some(net);
    }
    let Some(network) = network else {
        bail!("no analysis run");
    };
    let timing = median(timings);

    let summary = network.validation().summary();
    info!(
        "nnodes {} / {}, {} pits, {} invalid cells",
        network.nnodes(),
        grid.size(),
        network.idxs_pit().len(),
        summary.invalid()
    );
    debug!(
        max_rank = ?network.ranking().max_rank(),
        max_in_degree = network.upstream().max_in_degree(),
        median_seconds = timing,
        runs = repeat,
        "network shape and timing"
    );

    let name = name.unwrap_or_else(|| {
        input
            .file_stem()
            .map_or_else(|| "grid".to_owned(), |s| s.to_string_lossy().into_owned())
    });
    let mut json = serde_json::to_value(network.into_result())?;
    if let Value::Object(map) = &mut json {
        map.insert("test_name".into(), Value::String(name));
        map.insert("timing_seconds".into(), serde_json::json!(timing));
    }
    let text = serde_json::to_string_pretty(&json)?;

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Result saved to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn compare(left: &Path, right: &Path) -> Result<bool> {
    let a = load_results(left)?;
    let b = load_results(right)?;

    let mut all_match = true;
    if a.len() != b.len() {
        warn!("result counts differ: {} vs {}", a.len(), b.len());
        all_match = false;
    }

    for ((name_a, res_a), (name_b, res_b)) in a.iter().zip(&b) {
        let label = if name_a == name_b { name_a.clone() } else { format!("{name_a} / {name_b}") };
        let cmp = res_a.compare(res_b);
        if cmp.is_match() {
            info!("{label}: match");
        } else {
            all_match = false;
            warn!("{label}: {} field(s) differ", cmp.diffs().len());
            for diff in cmp.diffs() {
                warn!("  {diff}");
            }
        }
    }

    if all_match {
        info!("All {} result(s) match", a.len());
    }
    Ok(all_match)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Analyze { input, output, name, boundary, nodata, options, repeat } => {
            let opts = load_options(options.as_deref(), boundary, nodata)?;
            analyze(&input, output.as_deref(), name, &opts, repeat)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare { left, right } => {
            let ok = compare(&left, &right)?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
        }
    }
}
