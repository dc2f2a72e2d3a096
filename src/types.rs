use serde::{Deserialize, Serialize};
use time::{format_description::well_known, OffsetDateTime};

/// One discovered transponder in canonical units and labels, ready to emit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResult {
    pub polarity: String,
    /// Downlink frequency in kHz, rounded and band-shifted.
    pub frequency: u32,
    /// Symbol rate in symbols/s, rounded.
    pub symbol_rate: u32,
    pub delivery_system: String,
    pub inversion: String,
    pub pilot: String,
    pub fec_inner: String,
    pub modulation: String,
    pub rolloff: String,
    pub pls_mode: i32,
    pub stream_id: i32,
    pub pls_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t2mi_plp_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t2mi_pid: Option<i32>,
}

impl CanonicalResult {
    /// Render the stdout protocol line, newline excluded. T2-MI fields are
    /// appended only when present.
    pub fn to_line(&self) -> String {
        let mut fields: Vec<String> = vec![
            "OK".to_string(),
            self.polarity.clone(),
            self.frequency.to_string(),
            self.symbol_rate.to_string(),
            self.delivery_system.clone(),
            self.inversion.clone(),
            self.pilot.clone(),
            self.fec_inner.clone(),
            self.modulation.clone(),
            self.rolloff.clone(),
            self.pls_mode.to_string(),
            self.stream_id.to_string(),
            self.pls_code.to_string(),
        ];
        if let (Some(plp_id), Some(pid)) = (self.t2mi_plp_id, self.t2mi_pid) {
            fields.push(plp_id.to_string());
            fields.push(pid.to_string());
        }
        fields.join(" ")
    }
}

/// Aggregate report of one run, written as pretty JSON when requested.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanReport {
    pub timestamp: String,
    pub slot: u8,
    pub frontend: u32,
    pub start_mhz: u32,
    pub stop_mhz: u32,
    pub min_sr_msps: u32,
    pub max_sr_msps: u32,
    pub cancelled: bool,
    pub transponders: Vec<CanonicalResult>,
}

/// RFC3339 UTC timestamp for report metadata.
pub fn now_iso_like() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
