//! Symmetry axis estimation.
//!
//! Before placement there are no device coordinates, so the estimate is
//! provisional. [`CentroidAxisDetector`] ranks the matched devices by area
//! (W x L x NF, heaviest first, ties by id), gives them unit-spaced
//! coordinates `0, 1, 2, ...` in that order, and averages two readings:
//!
//! - the midpoint between the two heaviest devices
//! - the importance-weighted mean of all ranks
//!
//! Layout replaces this hint once real coordinates exist. The
//! [`AxisDetector`] trait is the seam for a better estimator.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::circuit::{Circuit, Device};
use crate::constraint::{Orientation, SymmetryConstraintSet};

/// Axis coordinate, or a marker that there was nothing to estimate from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisPosition {
    /// Fewer than two matched devices are known to the circuit
    Unresolved,
    /// Synthetic coordinate in rank units
    At(f64),
}

impl AxisPosition {
    pub fn value(&self) -> Option<f64> {
        match self {
            AxisPosition::Unresolved => None,
            AxisPosition::At(x) => Some(*x),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AxisPosition::At(_))
    }
}

impl fmt::Display for AxisPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisPosition::Unresolved => f.write_str("unresolved"),
            AxisPosition::At(x) => write!(f, "{}", x),
        }
    }
}

/// Estimated axis for a constraint set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEstimate {
    pub position: AxisPosition,
    pub orientation: Orientation,
}

impl AxisEstimate {
    /// No basis for an estimate: unresolved and VERTICAL.
    pub fn unresolved() -> Self {
        Self {
            position: AxisPosition::Unresolved,
            orientation: Orientation::Vertical,
        }
    }

    /// Store a resolved position as the set's axis. Unresolved estimates
    /// leave the set untouched. Returns whether the set changed.
    pub fn apply_to(&self, set: &mut SymmetryConstraintSet) -> bool {
        match self.position {
            AxisPosition::At(x) => {
                set.set_axis(x);
                true
            }
            AxisPosition::Unresolved => false,
        }
    }
}

impl fmt::Display for AxisEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.position, self.orientation)
    }
}

/// Anything that can turn a circuit and its constraints into an axis hint.
pub trait AxisDetector {
    fn estimate(&self, circuit: &Circuit, set: &SymmetryConstraintSet) -> AxisEstimate;
}

/// Area-weighted centroid over a synthetic one-dimensional placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidAxisDetector;

impl CentroidAxisDetector {
    pub fn new() -> Self {
        Self
    }
}

impl AxisDetector for CentroidAxisDetector {
    fn estimate(&self, circuit: &Circuit, set: &SymmetryConstraintSet) -> AxisEstimate {
        let orientation = majority_orientation(set);

        let ids: BTreeSet<&str> = set
            .pairs
            .iter()
            .flat_map(|p| p.members())
            .chain(set.groups.iter().flat_map(|g| g.members.iter().map(String::as_str)))
            .collect();
        let mut ranked: Vec<&Device> =
            ids.into_iter().filter_map(|id| circuit.device(id)).collect();

        if ranked.len() < 2 {
            debug!(matched = ranked.len(), "axis unresolved");
            return AxisEstimate {
                position: AxisPosition::Unresolved,
                orientation,
            };
        }

        ranked.sort_by(|a, b| {
            b.importance()
                .total_cmp(&a.importance())
                .then_with(|| a.id.cmp(&b.id))
        });

        // Heaviest two sit at ranks 0 and 1.
        let midpoint = 0.5;
        let total: f64 = ranked.iter().map(|d| d.importance()).sum();
        let centroid = ranked
            .iter()
            .enumerate()
            .map(|(rank, d)| rank as f64 * d.importance())
            .sum::<f64>()
            / total;
        let position = 0.5 * midpoint + 0.5 * centroid;

        debug!(
            matched = ranked.len(),
            midpoint,
            centroid,
            position,
            "provisional axis estimate"
        );
        AxisEstimate {
            position: AxisPosition::At(position),
            orientation,
        }
    }
}

/// Estimate the axis with [`CentroidAxisDetector`].
pub fn detect_axis(circuit: &Circuit, set: &SymmetryConstraintSet) -> AxisEstimate {
    CentroidAxisDetector.estimate(circuit, set)
}

/// Most common orientation among pairs and groups; ties go to VERTICAL.
fn majority_orientation(set: &SymmetryConstraintSet) -> Orientation {
    let orientations = set
        .pairs
        .iter()
        .map(|p| p.orientation)
        .chain(set.groups.iter().map(|g| g.orientation));
    let horizontal = orientations
        .clone()
        .filter(|o| *o == Orientation::Horizontal)
        .count();
    let vertical = orientations.count() - horizontal;
    if horizontal > vertical {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}
