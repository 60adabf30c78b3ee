//! ssrtrack: SSR pointer/time correlation and ACIS bias planning from the command line.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_wrap,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};

use ssrtrack_bias::{
    attribute_bias_intervals, load_catalog, BadCodeword, BiasRange, ConcernDeriver, Timeline,
    TrackerConfig,
};
use ssrtrack_core::{
    detect_swaps, downlink_bits_per_second, CodewordDetector, CodewordSample, Direction,
    EnableSample, MissionTime, PlaybackState, PointerCorrelator, ReferenceSample,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] ssrtrack_core::Error),

    #[error("Bias planning error: {0}")]
    Bias(#[from] ssrtrack_bias::Error),
}

/// A bad codeword hit given on the command line as `ADDRESS@TIME`.
#[derive(Debug, Clone, Copy)]
struct HitArg {
    address: u64,
    observed_at: MissionTime,
}

impl FromStr for HitArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (address, time) = s
            .split_once('@')
            .ok_or_else(|| format!("expected ADDRESS@TIME, got {s:?}"))?;
        let address = address
            .trim()
            .parse()
            .map_err(|e| format!("bad address {address:?}: {e}"))?;
        let observed_at = time.parse().map_err(|e| format!("{e}"))?;
        Ok(Self {
            address,
            observed_at,
        })
    }
}

/// Solid state recorder pointer tracking.
#[derive(Parser)]
#[command(name = "ssrtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (recorder geometry and bias policy)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expected record pointer address at a time
    Address {
        /// Target time (yday or MAUDE compact)
        #[arg(short, long)]
        time: MissionTime,

        /// Reference sample time
        #[arg(long)]
        ref_time: MissionTime,

        /// Reference sample address
        #[arg(long)]
        ref_address: u64,
    },

    /// Time at which the pointer was or will be at an address
    Time {
        /// Target address
        #[arg(short, long)]
        address: u64,

        /// Reference sample time
        #[arg(long)]
        ref_time: MissionTime,

        /// Reference sample address
        #[arg(long)]
        ref_address: u64,

        /// Whether the target was recorded after (forward) or before (backward) the reference
        #[arg(short, long)]
        direction: Option<Direction>,
    },

    /// Concern windows for the bias packets in a catalog
    Windows {
        /// JSON event catalog
        #[arg(long)]
        catalog: PathBuf,

        /// Reference sample time
        #[arg(long)]
        ref_time: MissionTime,

        /// Reference sample address
        #[arg(long)]
        ref_address: u64,

        /// Staleness epoch, normally the end of the last playback
        #[arg(long)]
        epoch: MissionTime,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Bias and concern-window timeline against the playback pointer
    Timeline {
        /// JSON event catalog
        #[arg(long)]
        catalog: PathBuf,

        /// Reference sample time
        #[arg(long)]
        ref_time: MissionTime,

        /// Reference sample address
        #[arg(long)]
        ref_address: u64,

        /// Staleness epoch, normally the end of the last playback
        #[arg(long)]
        epoch: MissionTime,

        /// Current playback pointer address
        #[arg(long)]
        playback: u64,

        /// Bad codeword hits as ADDRESS@TIME (playback pointer and ground time)
        #[arg(long, num_args = 1..)]
        bcw: Vec<HitArg>,

        /// JSON array of {"time", "playback", "playback_enabled",
        /// "playback_errors", "errors"} samples; hits of the current
        /// playback pass are added to the timeline
        #[arg(long)]
        codeword_samples: Option<PathBuf>,
    },

    /// Playback backlog and the record time of the data being played back
    Playback {
        /// Record pointer address
        #[arg(long)]
        record: u64,

        /// Playback pointer address
        #[arg(long)]
        playback: u64,

        /// Time of the record pointer sample
        #[arg(long)]
        ref_time: MissionTime,

        /// Telemetry format bit rate code
        #[arg(long, default_value = "3")]
        bit_rate_code: u8,
    },

    /// Prime/backup recorder swaps from record-enable samples
    Swaps {
        /// JSON array of {"time", "enabled"} samples
        #[arg(long)]
        samples: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match &cli.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            TrackerConfig::from_file(path)?
        }
        None => TrackerConfig::default(),
    };

    match cli.command {
        Commands::Address {
            time,
            ref_time,
            ref_address,
        } => {
            let correlator = correlator(&config, ref_time, ref_address)?;
            println!("{}", correlator.address_at_time(&time));
        }

        Commands::Time {
            address,
            ref_time,
            ref_address,
            direction,
        } => {
            let correlator = correlator(&config, ref_time, ref_address)?;
            let target = config.space.address(address as i64)?;
            let time = correlator.time_at_address_hinted(target, direction)?;
            println!("{}", time);
        }

        Commands::Windows {
            catalog,
            ref_time,
            ref_address,
            epoch,
            json,
        } => {
            let correlator = correlator(&config, ref_time, ref_address)?;
            let ranges = plan_ranges(&config, &correlator, &catalog, &epoch)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ranges)?);
            } else {
                print_ranges(&ranges);
            }
        }

        Commands::Timeline {
            catalog,
            ref_time,
            ref_address,
            epoch,
            playback,
            bcw,
            codeword_samples,
        } => {
            let correlator = correlator(&config, ref_time, ref_address)?;
            let ranges = plan_ranges(&config, &correlator, &catalog, &epoch)?;
            let playback = config.space.address(playback as i64)?;
            let mut bad_codewords = bcw
                .into_iter()
                .map(|hit| -> Result<BadCodeword> {
                    Ok(BadCodeword {
                        address: config.space.address(hit.address as i64)?,
                        observed_at: hit.observed_at,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if let Some(path) = codeword_samples {
                bad_codewords.extend(current_pass_hits(&path)?);
            }

            let timeline = Timeline::build(&ranges, playback, &bad_codewords, &correlator);
            println!(
                "{:<23} {:>10}  {:<26} {:<12} {}",
                "TIME", "ADDRESS", "EVENT", "STATUS", "LABEL"
            );
            println!("{:-<85}", "");
            for row in timeline.iter() {
                println!(
                    "{:<23} {:>10}  {:<26} {:<12} {}",
                    row.time.yday(),
                    row.address.as_u64(),
                    row.kind.to_string(),
                    format!("{:?}", row.status),
                    row.label
                );
            }
            println!("{} pending row(s)", timeline.pending().count());
        }

        Commands::Playback {
            record,
            playback,
            ref_time,
            bit_rate_code,
        } => {
            let correlator = correlator(&config, ref_time, record)?;
            let state = PlaybackState::new(
                config.space.address(record as i64)?,
                config.space.address(playback as i64)?,
            );
            let bps = downlink_bits_per_second(bit_rate_code);
            println!("Backlog: {} words", state.backlog_words(&config.space));
            println!("Recorded span: {:.1} s", state.recorded_span_secs(&config.space));
            println!(
                "Remaining playback at {} bps: {:.1} s",
                bps,
                state.remaining_playback_secs(&config.space, bps)
            );
            println!(
                "Playback record time: {}",
                state.playback_record_time(&correlator)
            );
        }

        Commands::Swaps { samples } => {
            let reader = BufReader::new(File::open(&samples)?);
            let mut samples: Vec<EnableSample> = serde_json::from_reader(reader)?;
            samples.sort_by_key(|sample| sample.time);
            let swaps = detect_swaps(samples);
            if swaps.is_empty() {
                println!("No recorder swaps");
            }
            for swap in swaps {
                let show = |t: Option<MissionTime>| t.map_or_else(|| "-".to_string(), |t| t.yday());
                println!("backup {}  prime {}", show(swap.to_backup), show(swap.to_prime));
            }
        }
    }

    Ok(())
}

fn correlator(
    config: &TrackerConfig,
    ref_time: MissionTime,
    ref_address: u64,
) -> Result<PointerCorrelator> {
    let reference = ReferenceSample::new(ref_time, ref_address, &config.space)?;
    Ok(PointerCorrelator::new(config.space, reference)?)
}

fn current_pass_hits(path: &Path) -> Result<Vec<BadCodeword>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples: Vec<CodewordSample> = serde_json::from_reader(reader)?;
    samples.sort_by_key(|sample| sample.time);
    let mut detector = CodewordDetector::new();
    for sample in samples {
        detector.push(sample);
    }
    log::debug!(
        "{} bad codeword hit(s) in samples, {} in the current pass",
        detector.hits().len(),
        detector.current_pass().len()
    );
    Ok(detector.current_pass().to_vec())
}

fn plan_ranges(
    config: &TrackerConfig,
    correlator: &PointerCorrelator,
    catalog: &Path,
    epoch: &MissionTime,
) -> Result<Vec<BiasRange>> {
    let events = load_catalog(catalog)?;
    let intervals = attribute_bias_intervals(&events, &config.policy)?;
    let deriver = ConcernDeriver::new(correlator, &config.policy);
    Ok(deriver.plan(intervals, epoch))
}

fn print_ranges(ranges: &[BiasRange]) {
    if ranges.is_empty() {
        println!("No bias intervals within the stale horizon");
        return;
    }
    for range in ranges {
        let interval = &range.interval;
        println!(
            "{} {}  {} - {}  addr {} - {}",
            interval.classification,
            interval.label,
            interval.start.yday(),
            interval.stop.yday(),
            range.address_start,
            range.address_stop
        );
        for (idx, window) in range.windows.iter().enumerate() {
            println!(
                "  CON# {}  {} - {}  addr {} - {}",
                idx + 1,
                window.start.yday(),
                window.stop.yday(),
                window.address_start,
                window.address_stop
            );
        }
    }
}
