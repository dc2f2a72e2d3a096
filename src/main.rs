use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use blindscan_rs::format::{canonicalize, OutputConfig};
use blindscan_rs::lock::{RunLock, DEFAULT_LOCK_PATH};
use blindscan_rs::session::{run_blindscan, ProcfsTransport, ScanOutcome, ScanRequest};
use blindscan_rs::types::{CanonicalResult, ScanReport};
use blindscan_rs::{nimsockets, types};

/// Delay before touching the frontend, so the driver that handed the tuner
/// over to us has finished releasing it.
const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// blindscan-rs — satellite transponder blind scan via the DVB frontend driver's procfs interface.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "blindscan-rs",
    version,
    about = "Discover satellite transponders using the frontend driver's hardware blind scan.",
    long_about = None
)]
struct Cli {
    /// Scan start frequency in MHz.
    #[arg(short = 's', long, default_value_t = 950)]
    start: u32,

    /// Scan stop frequency in MHz.
    #[arg(short = 'e', long, default_value_t = 1950)]
    stop: u32,

    /// Minimum symbol rate to scan in MS/s.
    #[arg(short = 'n', long, default_value_t = 2)]
    min: u32,

    /// Maximum symbol rate to scan in MS/s.
    #[arg(short = 'x', long, default_value_t = 45)]
    max: u32,

    /// Signal polarity is vertical.
    #[arg(short = 'V', long)]
    vertical: bool,

    /// Scan C-band.
    #[arg(short = 'C', long)]
    cband: bool,

    /// Scan Ku-band high.
    #[arg(short = 'H', long)]
    high: bool,

    /// NIM slot (0...3).
    #[arg(short = 'S', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    slot: u8,

    /// I2C device (0...3). Accepted for compatibility with the original tool.
    #[arg(short = 'I', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    i2c: u8,

    /// Write the run's results as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// PID/lock file enforcing one running instance.
    #[arg(long = "lock-file", default_value = DEFAULT_LOCK_PATH)]
    lock_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries only the machine-parsed "OK ..." lines; everything else
    // goes to stderr.
    eprintln!("blindscan-rs configuration:");
    eprintln!("  start        : {} MHz", cli.start);
    eprintln!("  stop         : {} MHz", cli.stop);
    eprintln!("  min          : {} MS/s", cli.min);
    eprintln!("  max          : {} MS/s", cli.max);
    eprintln!("  polarity     : {}", if cli.vertical { "vertical" } else { "horizontal" });
    eprintln!(
        "  band         : {}",
        if cli.cband {
            "C"
        } else if cli.high {
            "Ku high"
        } else {
            "Ku low"
        }
    );
    eprintln!("  slot         : {}", cli.slot);
    eprintln!("  i2c          : {}", cli.i2c);

    // Singleton lock is fatal before any scan work.
    let _lock = RunLock::acquire(&cli.lock_file)?;

    // Ctrl-C requests cooperative cancellation; the scan session observes the
    // token at its poll and candidate boundaries.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    tokio::select! {
        _ = tokio::time::sleep(SETTLE_DELAY) => {}
        _ = cancel.cancelled() => return Ok(()),
    }

    let Some(frontend) = nimsockets::resolve(nimsockets::NIM_SOCKETS_PATH, cli.slot as usize)
    else {
        eprintln!("no frontend device for NIM slot {}", cli.slot);
        return Ok(());
    };

    let mut transport = ProcfsTransport::for_frontend(frontend);
    if !transport.available() {
        eprintln!("frontend {frontend} does not support blind scan");
        return Ok(());
    }

    let request = ScanRequest {
        start_mhz: cli.start,
        stop_mhz: cli.stop,
        min_sr_msps: cli.min,
        max_sr_msps: cli.max,
    };
    let out_cfg = OutputConfig {
        vertical: cli.vertical,
        c_band: cli.cband,
        high_band: cli.high,
    };

    let mut results: Vec<CanonicalResult> = Vec::new();
    let outcome = run_blindscan(&mut transport, &request, &cancel, |candidate| {
        let canonical = canonicalize(&candidate, &out_cfg);
        println!("{}", canonical.to_line());
        let _ = io::stdout().flush();
        results.push(canonical);
    })
    .await;

    match outcome {
        ScanOutcome::Completed { candidate_count } => {
            eprintln!(
                "scan complete: {} candidate(s) reported, {} emitted",
                candidate_count,
                results.len()
            );
        }
        ScanOutcome::Cancelled => eprintln!("scan cancelled"),
        ScanOutcome::Unavailable => eprintln!("frontend {frontend} stopped responding; skipped"),
    }

    if let Some(path) = cli.output.as_deref() {
        let report = ScanReport {
            timestamp: types::now_iso_like(),
            slot: cli.slot,
            frontend,
            start_mhz: cli.start,
            stop_mhz: cli.stop,
            min_sr_msps: cli.min,
            max_sr_msps: cli.max,
            cancelled: outcome == ScanOutcome::Cancelled,
            transponders: results,
        };
        write_report_json(path, &report)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        eprintln!("wrote JSON report to {}", path.display());
    }

    Ok(())
}

fn write_report_json(path: &std::path::Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
