use std::fs;
use std::path::Path;

/// Topology description published by the platform driver.
pub const NIM_SOCKETS_PATH: &str = "/proc/bus/nim_sockets";

/// Number of NIM sockets the platform exposes.
pub const MAX_SLOTS: usize = 4;

/// Mapping from logical NIM socket slot to physical frontend device id.
///
/// Rebuilt from the topology file on every resolution; never cached across scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMap {
    slots: [Option<u32>; MAX_SLOTS],
}

impl DeviceMap {
    /// Parse a line-oriented topology description.
    ///
    /// Two line shapes are recognized: a `NIM Socket <n>` header selects the
    /// current socket context, and an indented `Frontend_Device: <m>` line
    /// assigns a frontend id to that context. An assignment before any header
    /// is ignored, as is a header naming a slot outside 0..=3. All other lines
    /// are skipped.
    pub fn parse(text: &str) -> Self {
        let mut slots = [None; MAX_SLOTS];
        let mut current: Option<usize> = None;

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("NIM Socket ") {
                current = rest
                    .trim()
                    .trim_end_matches(':')
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n < MAX_SLOTS);
            } else if let Some(rest) = line.trim_start().strip_prefix("Frontend_Device:") {
                if let (Some(slot), Ok(id)) = (current, rest.trim().parse::<u32>()) {
                    slots[slot] = Some(id);
                }
            }
        }

        DeviceMap { slots }
    }

    /// Frontend id assigned to `slot`, if any.
    pub fn frontend(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot).copied().flatten()
    }
}

/// Resolve a logical slot number to a physical frontend id by reading the
/// topology file at `path`. A missing or unreadable file, or a slot that never
/// received an assignment, resolves to `None` — absence is an expected hardware
/// configuration state, not an error.
pub fn resolve(path: impl AsRef<Path>, slot: usize) -> Option<u32> {
    let text = fs::read_to_string(path).ok()?;
    DeviceMap::parse(&text).frontend(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_assignment() {
        let map = DeviceMap::parse("NIM Socket 0:\n\tType: DVB-S2\n\tFrontend_Device: 0\n");
        assert_eq!(map.frontend(0), Some(0));
        assert_eq!(map.frontend(1), None);
    }

    #[test]
    fn assignment_without_header_is_ignored() {
        let map = DeviceMap::parse("\tFrontend_Device: 3\nNIM Socket 1:\n\tFrontend_Device: 1\n");
        assert_eq!(map.frontend(1), Some(1));
        for slot in [0, 2, 3] {
            assert_eq!(map.frontend(slot), None);
        }
    }

    #[test]
    fn out_of_range_socket_header_is_ignored() {
        let map = DeviceMap::parse("NIM Socket 7:\n\tFrontend_Device: 2\n");
        assert_eq!(map, DeviceMap::default());
    }

    #[test]
    fn out_of_range_slot_lookup() {
        let map = DeviceMap::parse("NIM Socket 0:\n\tFrontend_Device: 0\n");
        assert_eq!(map.frontend(9), None);
    }

    #[test]
    fn missing_topology_file_resolves_to_none() {
        assert_eq!(resolve("/nonexistent/nim_sockets", 0), None);
    }
}
