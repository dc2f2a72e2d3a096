use blindscan_rs::nimsockets::DeviceMap;

const TOPOLOGY: &str = "\
NIM Socket 0:
\tType: DVB-S2
\tName: Si2166D
NIM Socket 2:
\tType: DVB-S2
\tName: AVL6211
\tFrontend_Device: 1
\tI2C_Device: 2
";

#[test]
fn socket_without_assignment_is_absent() {
    let map = DeviceMap::parse(TOPOLOGY);
    assert_eq!(map.frontend(0), None);
}

#[test]
fn assigned_socket_resolves_to_its_frontend() {
    let map = DeviceMap::parse(TOPOLOGY);
    assert_eq!(map.frontend(2), Some(1));
}

#[test]
fn unrelated_lines_are_skipped() {
    let map = DeviceMap::parse(TOPOLOGY);
    // I2C_Device lines must not be mistaken for frontend assignments.
    assert_eq!(map.frontend(1), None);
    assert_eq!(map.frontend(3), None);
}

#[test]
fn later_assignment_wins_for_the_same_socket() {
    let text = "NIM Socket 1:\n\tFrontend_Device: 0\nNIM Socket 1:\n\tFrontend_Device: 3\n";
    assert_eq!(DeviceMap::parse(text).frontend(1), Some(3));
}

#[test]
fn empty_topology_resolves_nothing() {
    let map = DeviceMap::parse("");
    for slot in 0..4 {
        assert_eq!(map.frontend(slot), None);
    }
}
