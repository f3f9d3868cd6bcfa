//! Current mirror pass.
//!
//! Unclaimed devices are grouped by (kind, gate net). A group with a
//! diode-connected reference and one output becomes a pair, reference
//! first; with several outputs it becomes one symmetry group ordered as
//! reference then outputs by id.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use super::detector::Matching;
use crate::circuit::{Device, DeviceKind, PinRole};

pub(super) fn run(matching: &mut Matching<'_>) -> usize {
    let mut by_gate: BTreeMap<(DeviceKind, &str), Vec<&Device>> = BTreeMap::new();
    for device in matching.free_devices() {
        let (Some(gate), Some(_)) = (device.net_of(PinRole::Gate), device.net_of(PinRole::Drain))
        else {
            continue;
        };
        by_gate.entry((device.kind, gate)).or_default().push(device);
    }

    let mut claimed = 0;
    for devices in by_gate.values() {
        let (refs, outputs): (Vec<&Device>, Vec<&Device>) =
            devices.iter().copied().partition(|d| d.is_diode_connected());
        if outputs.is_empty() {
            continue;
        }
        let Some(reference) = pick_reference(&refs, &outputs) else {
            continue;
        };

        let ok = match outputs.as_slice() {
            [output] => matching.claim_pair(&reference.id, &output.id),
            _ => {
                let members = std::iter::once(reference.id.as_str())
                    .chain(outputs.iter().map(|d| d.id.as_str()))
                    .collect();
                matching.claim_group(members)
            }
        };
        if ok {
            claimed += 1 + outputs.len();
        }
    }
    claimed
}

/// The diode-connected device sharing the most non-gate nets with the
/// outputs; ties go to the smallest id.
fn pick_reference<'c>(refs: &[&'c Device], outputs: &[&'c Device]) -> Option<&'c Device> {
    refs.iter()
        .copied()
        .min_by_key(|r| (Reverse(shared_nets(r, outputs)), r.id.as_str()))
}

fn shared_nets(reference: &Device, outputs: &[&Device]) -> usize {
    let gate = reference.net_of(PinRole::Gate);
    let nets: BTreeSet<&str> = reference
        .pins
        .iter()
        .map(|p| p.net.as_str())
        .filter(|n| Some(*n) != gate)
        .collect();
    outputs
        .iter()
        .map(|o| {
            o.pins
                .iter()
                .map(|p| p.net.as_str())
                .collect::<BTreeSet<_>>()
                .intersection(&nets)
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::constraint::{Orientation, SymmetryPair};
    use crate::detect::detect;

    fn pmos(id: &str, g: &str, d: &str, s: &str) -> Device {
        Device::new(id, DeviceKind::Pmos, 20.0, 1.0)
            .with_pin("G", g)
            .with_pin("D", d)
            .with_pin("S", s)
    }

    #[test]
    fn test_three_device_mirror_is_one_group() {
        let circuit = Circuit::from_devices(vec![
            pmos("M7", "G", "OUTB", "VDD"),
            pmos("M6", "G", "OUTA", "VDD"),
            pmos("M5", "G", "G", "VDD"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert!(set.pairs.is_empty());
        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.groups[0].members, vec!["M5", "M6", "M7"]);
        assert_eq!(set.groups[0].orientation, Orientation::Vertical);
    }

    #[test]
    fn test_two_device_mirror_reference_first() {
        let circuit = Circuit::from_devices(vec![
            pmos("M1", "X", "OUT", "VDD"),
            pmos("M2", "X", "X", "VDD"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(set.pairs.len(), 1);
        assert_eq!(set.pairs[0].first, "M2");
        assert_eq!(set.pairs[0].second, "M1");
    }

    #[test]
    fn test_no_reference_no_mirror() {
        let circuit = Circuit::from_devices(vec![
            pmos("M1", "X", "OUT", "VDD"),
            pmos("M2", "X", "OUT", "VDD"),
        ])
        .unwrap();
        assert!(detect(&circuit).is_empty());
    }

    #[test]
    fn test_kinds_not_mixed() {
        let nmos_out = Device::new("M2", DeviceKind::Nmos, 20.0, 1.0)
            .with_pin("G", "X")
            .with_pin("D", "OUT")
            .with_pin("S", "VSS");
        let circuit = Circuit::from_devices(vec![pmos("M1", "X", "X", "VDD"), nmos_out]).unwrap();
        assert!(detect(&circuit).is_empty());
    }

    #[test]
    fn test_reference_sharing_most_nets_leads() {
        let circuit = Circuit::from_devices(vec![
            pmos("M1", "X", "X", "VDD2"),
            pmos("M2", "X", "X", "VDD"),
            pmos("M3", "X", "OUT", "VDD"),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(
            set.pairs,
            vec![SymmetryPair::new("M2", "M3", Orientation::Vertical)]
        );
        assert_eq!(set.role_of("M1"), None);
    }

    #[test]
    fn test_ratioed_outputs_still_grouped() {
        let circuit = Circuit::from_devices(vec![
            pmos("M1", "X", "X", "VDD"),
            pmos("M2", "X", "A", "VDD").with_fingers(2),
            pmos("M3", "X", "B", "VDD").with_fingers(4),
        ])
        .unwrap();
        let set = detect(&circuit);
        assert_eq!(set.groups[0].members, vec!["M1", "M2", "M3"]);
        assert!(set.self_symmetric.is_empty());
    }
}
