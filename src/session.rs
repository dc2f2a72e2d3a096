use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::candidate::{read_candidate, TransponderCandidate};
use crate::devfs;

/// Fixed re-poll interval required by the driver protocol.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Immutable scan parameters, in integer MHz / MS/s as the driver expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    pub start_mhz: u32,
    pub stop_mhz: u32,
    pub min_sr_msps: u32,
    pub max_sr_msps: u32,
}

impl ScanRequest {
    /// Control message that starts a scan: enable flag plus the four range
    /// fields, space-separated decimals.
    pub fn control_message(&self) -> String {
        format!(
            "1 {} {} {} {}",
            self.start_mhz, self.stop_mhz, self.min_sr_msps, self.max_sr_msps
        )
    }

    /// Control message that tells the driver to stop scanning.
    pub fn deactivate_message() -> &'static str {
        "0 0 0 0 0"
    }
}

/// One poll tick's view of the driver state. Discarded every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStatus {
    pub active: bool,
    /// Authoritative only once `active` is false.
    pub candidate_count: u32,
    /// Advisory; never used for control decisions. Signed because the driver
    /// prints it as a plain integer and may report -1.
    pub progress: i32,
}

impl ScanStatus {
    /// Parse a control-file response. Only the first three whitespace-separated
    /// integers matter; trailing fields are ignored. Anything less is `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let active: i32 = fields.next()?.parse().ok()?;
        let candidate_count: u32 = fields.next()?.parse().ok()?;
        let progress: i32 = fields.next()?.parse().ok()?;
        Some(ScanStatus {
            active: active != 0,
            candidate_count,
            progress,
        })
    }
}

/// Transport over the driver's two pseudo-files for one device.
///
/// A trait seam so the session state machine can be exercised against a mock
/// driver in tests as well as the real procfs interface.
pub trait DeviceTransport {
    fn write_control(&mut self, msg: &str) -> Result<()>;
    fn read_control(&mut self) -> Result<String>;
    fn write_info(&mut self, msg: &str) -> Result<()>;
    fn read_info(&mut self) -> Result<String>;
}

/// Production transport: `bs_ctrl` / `bs_info` under `/proc/stb/frontend/<id>/`.
#[derive(Debug, Clone)]
pub struct ProcfsTransport {
    ctrl: PathBuf,
    info: PathBuf,
}

impl ProcfsTransport {
    pub fn for_frontend(frontend_id: u32) -> Self {
        let base = format!("/proc/stb/frontend/{frontend_id}");
        Self {
            ctrl: Path::new(&base).join("bs_ctrl"),
            info: Path::new(&base).join("bs_info"),
        }
    }

    /// Whether this frontend exposes the blind-scan interface at all. Older
    /// drivers simply do not publish these files.
    pub fn available(&self) -> bool {
        self.ctrl.exists() && self.info.exists()
    }
}

impl DeviceTransport for ProcfsTransport {
    fn write_control(&mut self, msg: &str) -> Result<()> {
        devfs::write_str(&self.ctrl, msg)
    }

    fn read_control(&mut self) -> Result<String> {
        devfs::read_string(&self.ctrl)
    }

    fn write_info(&mut self, msg: &str) -> Result<()> {
        devfs::write_str(&self.info, msg)
    }

    fn read_info(&mut self) -> Result<String> {
        devfs::read_string(&self.info)
    }
}

/// Terminal state of one scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The driver finished its sweep; `candidate_count` is the count it
    /// reported on the final poll.
    Completed { candidate_count: u32 },
    /// Cancellation was observed; the deactivate message has been written.
    Cancelled,
    /// The device does not support blind scan, or the transport failed.
    /// Not a fatal program error; the device is skipped.
    Unavailable,
}

/// Run one blind scan: submit the request, poll until the driver reports
/// completion, then fetch each candidate record in index order and hand every
/// valid one to `emit`.
///
/// Cancellation is cooperative, checked at the top of every poll tick and
/// before every candidate index; both exits write the deactivate message to the
/// driver first. A malformed status line counts as "still active" for that tick
/// rather than an error, matching the driver's tolerant polling contract.
pub async fn run_blindscan<T: DeviceTransport>(
    transport: &mut T,
    request: &ScanRequest,
    cancel: &CancellationToken,
    mut emit: impl FnMut(TransponderCandidate),
) -> ScanOutcome {
    if transport.write_control(&request.control_message()).is_err() {
        return ScanOutcome::Unavailable;
    }

    let candidate_count = loop {
        if cancel.is_cancelled() {
            let _ = transport.write_control(ScanRequest::deactivate_message());
            return ScanOutcome::Cancelled;
        }

        let line = match transport.read_control() {
            Ok(line) => line,
            Err(_) => return ScanOutcome::Unavailable,
        };

        match ScanStatus::parse(&line) {
            Some(status) if !status.active => break status.candidate_count,
            // Unparsable status lines are treated as still-active.
            Some(_) | None => tokio::time::sleep(POLL_INTERVAL).await,
        }
    };

    for index in 0..candidate_count {
        if cancel.is_cancelled() {
            let _ = transport.write_control(ScanRequest::deactivate_message());
            return ScanOutcome::Cancelled;
        }

        if let Some(candidate) = read_candidate(transport, index) {
            emit(candidate);
        }
    }

    ScanOutcome::Completed { candidate_count }
}
