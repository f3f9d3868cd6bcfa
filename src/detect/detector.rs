//! Pass orchestration and the shared claim state.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tracing::{debug, info};

use super::config::DetectorConfig;
use super::{cross_coupled, diff_pair, mirror, propagate, self_symmetric};
use crate::circuit::{Circuit, Device, PinRole};
use crate::constraint::{Orientation, SymmetryConstraintSet, SymmetryGroup, SymmetryPair};

/// Topology-driven symmetry detector.
///
/// Holds only its configuration, so one detector can be reused across any
/// number of circuits.
#[derive(Debug, Clone, Default)]
pub struct SymmetryDetector {
    config: DetectorConfig,
}

impl SymmetryDetector {
    /// Create a detector running the default passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with a custom configuration.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Find matched pairs, mirror groups and self-symmetric devices.
    ///
    /// Passes run in priority order and each device is claimed at most
    /// once; a device matching no pattern is simply absent from the result.
    /// The output depends only on device and net ids and attributes.
    pub fn detect(&self, circuit: &Circuit) -> SymmetryConstraintSet {
        let mut matching = Matching::new(circuit, self.config.pair_orientation);

        let n = diff_pair::run(&mut matching);
        debug!(claimed = n, "differential pair pass");

        if self.config.cross_coupled {
            let n = cross_coupled::run(&mut matching);
            debug!(claimed = n, "cross-coupled pass");
        }

        let n = mirror::run(&mut matching);
        debug!(claimed = n, "current mirror pass");

        if self.config.propagate {
            let n = propagate::run(&mut matching);
            debug!(claimed = n, "propagation pass");
        }

        let n = self_symmetric::run(&mut matching, self.config.min_self_symmetric_fingers);
        debug!(claimed = n, "self-symmetric pass");

        let set = matching.finish();
        info!(
            devices = circuit.num_devices(),
            pairs = set.pairs.len(),
            groups = set.groups.len(),
            self_symmetric = set.self_symmetric.len(),
            "symmetry detection complete"
        );
        set
    }
}

/// Run the default detector over `circuit`.
pub fn detect(circuit: &Circuit) -> SymmetryConstraintSet {
    SymmetryDetector::new().detect(circuit)
}

/// A scored candidate pair, `first < second` by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Candidate<'c> {
    pub score: usize,
    pub first: &'c str,
    pub second: &'c str,
}

impl<'c> Candidate<'c> {
    pub fn new(score: usize, a: &'c str, b: &'c str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            score,
            first,
            second,
        }
    }
}

/// Constraint set under construction plus the ids already claimed.
pub(super) struct Matching<'c> {
    circuit: &'c Circuit,
    claimed: BTreeSet<&'c str>,
    orientation: Orientation,
    set: SymmetryConstraintSet,
}

impl<'c> Matching<'c> {
    pub fn new(circuit: &'c Circuit, orientation: Orientation) -> Self {
        Self {
            circuit,
            claimed: BTreeSet::new(),
            orientation,
            set: SymmetryConstraintSet::new(),
        }
    }

    pub fn circuit(&self) -> &'c Circuit {
        self.circuit
    }

    pub fn is_free(&self, id: &str) -> bool {
        !self.claimed.contains(id)
    }

    /// Unclaimed devices in id order.
    pub fn free_devices(&self) -> Vec<&'c Device> {
        self.circuit
            .devices()
            .filter(|d| !self.claimed.contains(d.id.as_str()))
            .collect()
    }

    pub fn pairs(&self) -> &[SymmetryPair] {
        &self.set.pairs
    }

    /// Record a pair if both devices are still free.
    pub fn claim_pair(&mut self, first: &'c str, second: &'c str) -> bool {
        if first == second || !self.is_free(first) || !self.is_free(second) {
            return false;
        }
        self.claimed.insert(first);
        self.claimed.insert(second);
        self.set
            .pairs
            .push(SymmetryPair::new(first, second, self.orientation));
        true
    }

    /// Record a group if every member is still free.
    pub fn claim_group(&mut self, members: Vec<&'c str>) -> bool {
        let distinct: BTreeSet<&str> = members.iter().copied().collect();
        if members.len() < 2
            || distinct.len() != members.len()
            || members.iter().any(|m| !self.is_free(m))
        {
            return false;
        }
        self.claimed.extend(members.iter().copied());
        self.set
            .groups
            .push(SymmetryGroup::new(members, self.orientation));
        true
    }

    pub fn claim_self_symmetric(&mut self, id: &'c str) -> bool {
        if !self.claimed.insert(id) {
            return false;
        }
        self.set.self_symmetric.push(id.to_string());
        true
    }

    /// Accept candidates best-first: higher score, then smaller ids.
    /// Returns the number of devices claimed.
    pub fn claim_best(&mut self, mut candidates: Vec<Candidate<'c>>) -> usize {
        candidates.sort_by_key(|c| (Reverse(c.score), c.first, c.second));
        let mut claimed = 0;
        for c in candidates {
            if self.claim_pair(c.first, c.second) {
                claimed += 2;
            }
        }
        claimed
    }

    pub fn finish(self) -> SymmetryConstraintSet {
        self.set
    }
}

/// Pins outside gate/drain/source (bulk and unrecognised names) that both
/// devices tie to the same net.
pub(super) fn shared_extra_pins(a: &Device, b: &Device) -> usize {
    a.pins
        .iter()
        .filter(|p| {
            !matches!(
                p.role(),
                Some(PinRole::Gate | PinRole::Drain | PinRole::Source)
            )
        })
        .filter(|p| b.pin(&p.name).is_some_and(|q| q.net == p.net))
        .count()
}
