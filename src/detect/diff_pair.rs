//! Differential pair pass.
//!
//! Two devices of identical kind and geometry whose gates share a net and
//! whose sources share a net, but whose drains sit on different nets.
//! Gate nets that carry a diode-connected device of the same kind are bias
//! lines of a current mirror and are left for the mirror pass.

use std::collections::{BTreeMap, BTreeSet};

use super::detector::{shared_extra_pins, Candidate, Matching};
use crate::circuit::{Device, DeviceKind, PinRole};

/// Exact bucket key: kind, width bits, length bits, fingers, gate, source.
type BucketKey<'c> = (DeviceKind, u64, u64, u32, &'c str, &'c str);

pub(super) fn run(matching: &mut Matching<'_>) -> usize {
    let free = matching.free_devices();

    let bias_gates: BTreeSet<(DeviceKind, &str)> = free
        .iter()
        .copied()
        .filter(|d| d.is_diode_connected())
        .filter_map(|d| Some((d.kind, d.net_of(PinRole::Gate)?)))
        .collect();

    let mut buckets: BTreeMap<BucketKey<'_>, Vec<(&Device, &str)>> = BTreeMap::new();
    for device in free {
        let Some((gate, drain, source)) = device.terminals() else {
            continue;
        };
        if bias_gates.contains(&(device.kind, gate)) {
            continue;
        }
        let key = (
            device.kind,
            device.width.to_bits(),
            device.length.to_bits(),
            device.fingers,
            gate,
            source,
        );
        buckets.entry(key).or_default().push((device, drain));
    }

    let mut candidates = Vec::new();
    for members in buckets.values() {
        for (i, &(a, drain_a)) in members.iter().enumerate() {
            for &(b, drain_b) in &members[i + 1..] {
                if drain_a != drain_b {
                    let score = shared_extra_pins(a, b);
                    candidates.push(Candidate::new(score, &a.id, &b.id));
                }
            }
        }
    }

    matching.claim_best(candidates)
}

#[cfg(test)]
mod tests {
    use crate::circuit::{Circuit, Device, DeviceKind, Net};
    use crate::constraint::{Orientation, SymmetryPair};
    use crate::detect::{detect, DetectorConfig, SymmetryDetector};

    fn nmos(id: &str, g: &str, d: &str, s: &str) -> Device {
        Device::new(id, DeviceKind::Nmos, 10.0, 0.5)
            .with_pin("G", g)
            .with_pin("D", d)
            .with_pin("S", s)
    }

    #[test]
    fn test_basic_pair() {
        let circuit = Circuit::new(
            vec![
                nmos("M1", "VIN", "OUT1", "VSS"),
                nmos("M2", "VIN", "OUT2", "VSS"),
            ],
            vec![
                Net::new("VIN").with_endpoint("M1", "G").with_endpoint("M2", "G"),
                Net::new("VSS").with_endpoint("M1", "S").with_endpoint("M2", "S"),
            ],
        )
        .unwrap();

        let set = detect(&circuit);
        assert_eq!(
            set.pairs,
            vec![SymmetryPair::new("M1", "M2", Orientation::Vertical)]
        );
        assert!(set.groups.is_empty());
        assert!(set.self_symmetric.is_empty());
    }

    #[test]
    fn test_same_drain_not_paired() {
        let circuit = Circuit::from_devices(vec![
            nmos("M1", "VIN", "OUT", "VSS"),
            nmos("M2", "VIN", "OUT", "VSS"),
        ])
        .unwrap();
        assert!(detect(&circuit).is_empty());
    }

    #[test]
    fn test_geometry_must_match() {
        let circuit = Circuit::from_devices(vec![
            nmos("M1", "VIN", "OUT1", "VSS"),
            nmos("M2", "VIN", "OUT2", "VSS").with_fingers(2),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert!(set.pairs.is_empty());
        assert_eq!(set.self_symmetric, vec!["M2"]);
    }

    #[test]
    fn test_shared_bulk_preferred() {
        // M2 could pair with M1 or M3; only M3 shares its bulk net.
        let circuit = Circuit::from_devices(vec![
            nmos("M1", "VIN", "OUT1", "VSS").with_pin("B", "SUB1"),
            nmos("M2", "VIN", "OUT2", "VSS").with_pin("B", "SUB2"),
            nmos("M3", "VIN", "OUT3", "VSS").with_pin("B", "SUB2"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(
            set.pairs,
            vec![SymmetryPair::new("M2", "M3", Orientation::Vertical)]
        );
    }

    #[test]
    fn test_tie_goes_to_smaller_partner() {
        let circuit = Circuit::from_devices(vec![
            nmos("M3", "VIN", "C", "VSS"),
            nmos("M1", "VIN", "A", "VSS"),
            nmos("M2", "VIN", "B", "VSS"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(
            set.pairs,
            vec![SymmetryPair::new("M1", "M2", Orientation::Vertical)]
        );
    }

    #[test]
    fn test_mirror_gate_left_for_mirror_pass() {
        let circuit = Circuit::from_devices(vec![
            nmos("M1", "BIAS", "BIAS", "VSS"),
            nmos("M2", "BIAS", "OUT1", "VSS"),
            nmos("M3", "BIAS", "OUT2", "VSS"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert!(set.pairs.is_empty());
        assert_eq!(set.groups[0].members, vec!["M1", "M2", "M3"]);
    }

    #[test]
    fn test_ambiguous_gate_device_left_unmatched() {
        // M3 names its gate twice on different nets; it must not abort detection.
        let circuit = Circuit::from_devices(vec![
            nmos("M1", "VIN", "OUT1", "VSS"),
            nmos("M2", "VIN", "OUT2", "VSS"),
            nmos("M3", "VIN", "OUT3", "VSS").with_pin("gate", "OTHER"),
        ])
        .unwrap();

        let config = DetectorConfig::new()
            .with_cross_coupled(true)
            .with_propagation(true);
        for set in [detect(&circuit), SymmetryDetector::with_config(config).detect(&circuit)] {
            assert_eq!(
                set.pairs,
                vec![SymmetryPair::new("M1", "M2", Orientation::Vertical)]
            );
            assert_eq!(set.role_of("M3"), None);
            assert!(set.groups.is_empty());
            assert!(set.self_symmetric.is_empty());
        }
    }
}
