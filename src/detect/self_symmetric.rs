//! Self-symmetric fallback for multi-finger devices.

use super::detector::Matching;

pub(super) fn run(matching: &mut Matching<'_>, min_fingers: u32) -> usize {
    let mut claimed = 0;
    for device in matching.free_devices() {
        if device.fingers >= min_fingers && matching.claim_self_symmetric(&device.id) {
            claimed += 1;
        }
    }
    claimed
}

#[cfg(test)]
mod tests {
    use crate::circuit::{Circuit, Device, DeviceKind};
    use crate::detect::{detect, DetectorConfig, SymmetryDetector};

    #[test]
    fn test_four_finger_device() {
        let circuit = Circuit::from_devices(vec![
            Device::new("M9", DeviceKind::Nmos, 8.0, 1.0)
                .with_fingers(4)
                .with_pin("G", "BIAS")
                .with_pin("D", "TAIL")
                .with_pin("S", "VSS"),
            Device::new("M10", DeviceKind::Nmos, 8.0, 1.0)
                .with_pin("G", "EN")
                .with_pin("D", "OUT")
                .with_pin("S", "VSS"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(set.self_symmetric, vec!["M9"]);
        assert!(set.pairs.is_empty() && set.groups.is_empty());
    }

    #[test]
    fn test_threshold_configurable() {
        let circuit = Circuit::from_devices(vec![Device::new("M1", DeviceKind::Pmos, 1.0, 1.0)
            .with_fingers(2)
            .with_pin("G", "A")])
        .unwrap();
        let strict = DetectorConfig::new().with_min_self_symmetric_fingers(4);
        assert!(SymmetryDetector::with_config(strict).detect(&circuit).is_empty());
        assert_eq!(detect(&circuit).self_symmetric, vec!["M1"]);
    }
}
