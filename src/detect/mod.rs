//! Symmetry detection over a [`Circuit`](crate::circuit::Circuit).
//!
//! ## Passes
//!
//! Detection runs a fixed sequence of matching passes. A device claimed by
//! one pass is invisible to every later pass:
//!
//! 1. differential pairs
//! 2. cross-coupled pairs (optional)
//! 3. current mirrors
//! 4. propagation along matched drains (optional)
//! 5. self-symmetric multi-finger devices
//!
//! Candidates within a pass are ranked by how many further pins (bulk and
//! the like) the two devices tie to the same net, then by id, so the result
//! never depends on container iteration order.
//!
//! ```
//! use symmetry_core::circuit::{Circuit, Device, DeviceKind};
//! use symmetry_core::detect::detect;
//!
//! let nmos = |id: &str, drain: &str| {
//!     Device::new(id, DeviceKind::Nmos, 10.0, 0.5)
//!         .with_pin("G", "VIN")
//!         .with_pin("D", drain)
//!         .with_pin("S", "VSS")
//! };
//! let circuit = Circuit::from_devices(vec![nmos("M1", "OUT1"), nmos("M2", "OUT2")]).unwrap();
//! let set = detect(&circuit);
//! assert_eq!(set.pairs.len(), 1);
//! ```

mod config;
mod cross_coupled;
mod detector;
mod diff_pair;
mod mirror;
mod propagate;
mod self_symmetric;

pub use config::{DetectorConfig, DEFAULT_MIN_SELF_SYMMETRIC_FINGERS};
pub use detector::{detect, SymmetryDetector};
