//! Cross-coupled pair pass: each gate sits on the other device's drain.

use std::collections::BTreeMap;

use super::detector::{shared_extra_pins, Candidate, Matching};
use crate::circuit::{Device, DeviceKind};

type BucketKey<'c> = (DeviceKind, u64, u64, u32, &'c str);

pub(super) fn run(matching: &mut Matching<'_>) -> usize {
    let mut buckets: BTreeMap<BucketKey<'_>, Vec<(&Device, &str, &str)>> = BTreeMap::new();
    for device in matching.free_devices() {
        let Some((gate, drain, source)) = device.terminals() else {
            continue;
        };
        let key = (
            device.kind,
            device.width.to_bits(),
            device.length.to_bits(),
            device.fingers,
            source,
        );
        buckets.entry(key).or_default().push((device, gate, drain));
    }

    let mut candidates = Vec::new();
    for members in buckets.values() {
        for (i, &(a, gate_a, drain_a)) in members.iter().enumerate() {
            for &(b, gate_b, drain_b) in &members[i + 1..] {
                if drain_a != drain_b && gate_a == drain_b && gate_b == drain_a {
                    let score = shared_extra_pins(a, b);
                    candidates.push(Candidate::new(score, &a.id, &b.id));
                }
            }
        }
    }

    matching.claim_best(candidates)
}
