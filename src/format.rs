//! Unit conversion and enumeration labelling for discovered transponders.
//!
//! Raw codes follow the `linux/dvb/frontend.h` enums. Every lookup table has an
//! explicit default so an unrecognized code from a newer driver still maps to a
//! usable label instead of an error.

use crate::candidate::TransponderCandidate;
use crate::types::CanonicalResult;

/// Polarity / band / local-oscillator flags of one run, applied identically to
/// every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub vertical: bool,
    pub c_band: bool,
    pub high_band: bool,
}

/// C-band LNB local oscillator, kHz.
const LO_C_BAND_KHZ: u32 = 5_150_000;
/// Ku-band universal LNB high-band local oscillator, kHz.
const LO_KU_HIGH_KHZ: u32 = 10_600_000;
/// Ku-band universal LNB low-band local oscillator, kHz.
const LO_KU_LOW_KHZ: u32 = 9_750_000;

/// Round a raw driver value (kHz) to the nearest 1000. Idempotent.
pub fn round_to_khz(raw: u32) -> u32 {
    (raw.saturating_add(500) / 1000) * 1000
}

/// Translate a rounded intermediate frequency to the satellite downlink
/// frequency for the selected band and LO.
pub fn downlink_frequency(rounded_khz: u32, c_band: bool, high_band: bool) -> u32 {
    if c_band {
        LO_C_BAND_KHZ.saturating_sub(rounded_khz)
    } else if high_band {
        rounded_khz + LO_KU_HIGH_KHZ
    } else {
        rounded_khz + LO_KU_LOW_KHZ
    }
}

fn lookup(table: &[(i32, &'static str)], code: i32, default: &'static str) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(default)
}

const DELIVERY_SYSTEMS: &[(i32, &str)] = &[(5, "DVB-S"), (6, "DVB-S2")];

const INVERSIONS: &[(i32, &str)] = &[(0, "INVERSION_OFF"), (1, "INVERSION_ON")];

const PILOTS: &[(i32, &str)] = &[(0, "PILOT_ON"), (1, "PILOT_OFF")];

const FEC_RATES: &[(i32, &str)] = &[
    (1, "FEC_1_2"),
    (2, "FEC_2_3"),
    (3, "FEC_3_4"),
    (4, "FEC_4_5"),
    (5, "FEC_5_6"),
    (6, "FEC_6_7"),
    (7, "FEC_7_8"),
    (8, "FEC_8_9"),
    (10, "FEC_3_5"),
    (11, "FEC_9_10"),
    (12, "FEC_2_5"),
];

const MODULATIONS: &[(i32, &str)] = &[(9, "8PSK"), (10, "16APSK"), (11, "32APSK")];

const ROLLOFFS: &[(i32, &str)] = &[(1, "ROLLOFF_20"), (2, "ROLLOFF_25")];

pub fn delivery_system_label(code: i32) -> &'static str {
    lookup(DELIVERY_SYSTEMS, code, "DVB-S2")
}

pub fn inversion_label(code: i32) -> &'static str {
    lookup(INVERSIONS, code, "INVERSION_AUTO")
}

pub fn pilot_label(code: i32) -> &'static str {
    lookup(PILOTS, code, "PILOT_AUTO")
}

pub fn fec_label(code: i32) -> &'static str {
    lookup(FEC_RATES, code, "FEC_AUTO")
}

pub fn modulation_label(code: i32) -> &'static str {
    lookup(MODULATIONS, code, "QPSK")
}

pub fn rolloff_label(code: i32) -> &'static str {
    lookup(ROLLOFFS, code, "ROLLOFF_35")
}

/// Derive the line-ready canonical value from one valid raw candidate.
pub fn canonicalize(candidate: &TransponderCandidate, cfg: &OutputConfig) -> CanonicalResult {
    let frequency = downlink_frequency(round_to_khz(candidate.frequency), cfg.c_band, cfg.high_band);
    let symbol_rate = round_to_khz(candidate.symbol_rate);

    let (t2mi_plp_id, t2mi_pid) = if candidate.has_t2mi() {
        (Some(candidate.t2mi_plp_id), Some(candidate.t2mi_pid))
    } else {
        (None, None)
    };

    CanonicalResult {
        polarity: if cfg.vertical { "VERTICAL" } else { "HORIZONTAL" }.to_string(),
        frequency,
        symbol_rate,
        delivery_system: delivery_system_label(candidate.delivery_system).to_string(),
        inversion: inversion_label(candidate.inversion).to_string(),
        pilot: pilot_label(candidate.pilot).to_string(),
        fec_inner: fec_label(candidate.fec_inner).to_string(),
        modulation: modulation_label(candidate.modulation).to_string(),
        rolloff: rolloff_label(candidate.rolloff).to_string(),
        pls_mode: candidate.pls_mode,
        stream_id: candidate.stream_id,
        pls_code: candidate.pls_code,
        t2mi_plp_id,
        t2mi_pid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_idempotent() {
        for raw in [0u32, 499, 500, 999, 1_168_301, 27_499_730] {
            let once = round_to_khz(raw);
            assert_eq!(round_to_khz(once), once);
        }
    }

    #[test]
    fn rounding_to_nearest_thousand() {
        assert_eq!(round_to_khz(1_168_499), 1_168_000);
        assert_eq!(round_to_khz(1_168_500), 1_169_000);
    }

    #[test]
    fn rounding_near_u32_max_does_not_overflow() {
        let rounded = round_to_khz(u32::MAX);
        assert_eq!(rounded, 4_294_967_000);
        assert_eq!(round_to_khz(rounded), rounded);
    }

    #[test]
    fn known_codes_map_to_names() {
        assert_eq!(delivery_system_label(5), "DVB-S");
        assert_eq!(inversion_label(1), "INVERSION_ON");
        assert_eq!(pilot_label(1), "PILOT_OFF");
        assert_eq!(fec_label(10), "FEC_3_5");
        assert_eq!(modulation_label(11), "32APSK");
        assert_eq!(rolloff_label(2), "ROLLOFF_25");
    }

    #[test]
    fn unknown_codes_fall_back_to_defaults() {
        assert_eq!(delivery_system_label(0), "DVB-S2");
        assert_eq!(inversion_label(42), "INVERSION_AUTO");
        assert_eq!(pilot_label(-3), "PILOT_AUTO");
        assert_eq!(fec_label(99), "FEC_AUTO");
        assert_eq!(modulation_label(1), "QPSK");
        assert_eq!(rolloff_label(17), "ROLLOFF_35");
    }
}
