use crate::session::DeviceTransport;

/// Field count of one blind-scan info record.
pub const CANDIDATE_FIELDS: usize = 14;

/// One driver-reported transponder record, in raw driver units and codes.
///
/// `t2mi_plp_id` is -1 when the transponder carries no T2-MI stream;
/// `t2mi_pid` is only meaningful when it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransponderCandidate {
    pub index: i32,
    pub frequency: u32,
    pub symbol_rate: u32,
    pub delivery_system: i32,
    pub inversion: i32,
    pub pilot: i32,
    pub fec_inner: i32,
    pub modulation: i32,
    pub rolloff: i32,
    pub pls_mode: i32,
    pub stream_id: i32,
    pub pls_code: i32,
    pub t2mi_plp_id: i32,
    pub t2mi_pid: i32,
}

impl TransponderCandidate {
    /// Parse one info-file response.
    ///
    /// Exactly 14 whitespace-separated integers are required; fewer, more, or
    /// an unparsable field yields `None` rather than a partially populated
    /// record.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != CANDIDATE_FIELDS {
            return None;
        }

        Some(TransponderCandidate {
            index: fields[0].parse().ok()?,
            frequency: fields[1].parse().ok()?,
            symbol_rate: fields[2].parse().ok()?,
            delivery_system: fields[3].parse().ok()?,
            inversion: fields[4].parse().ok()?,
            pilot: fields[5].parse().ok()?,
            fec_inner: fields[6].parse().ok()?,
            modulation: fields[7].parse().ok()?,
            rolloff: fields[8].parse().ok()?,
            pls_mode: fields[9].parse().ok()?,
            stream_id: fields[10].parse().ok()?,
            pls_code: fields[11].parse().ok()?,
            t2mi_plp_id: fields[12].parse().ok()?,
            t2mi_pid: fields[13].parse().ok()?,
        })
    }

    /// Whether this transponder carries a T2-MI stream.
    pub fn has_t2mi(&self) -> bool {
        self.t2mi_plp_id != -1
    }
}

/// Fetch and validate the record at `index` from the driver's info file.
///
/// The decimal index is written first to select which record the next read
/// returns. A failed write or read, a malformed record, or a record whose
/// self-reported index differs from the requested one (a stale or out-of-order
/// response) all yield `None`; the caller moves on to the next index.
pub fn read_candidate<T: DeviceTransport>(
    transport: &mut T,
    index: u32,
) -> Option<TransponderCandidate> {
    transport.write_info(&index.to_string()).ok()?;
    let line = transport.read_info().ok()?;
    let candidate = TransponderCandidate::parse(&line)?;
    (candidate.index == index as i32).then_some(candidate)
}
