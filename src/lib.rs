//! # Symmetry Core
//!
//! Symmetry constraint detection for analog IC layout.
//!
//! This library provides:
//! - A transistor-level circuit model loaded from SPICE-style netlists
//! - Topology-driven detection of differential pairs, current mirrors and
//!   self-symmetric multi-finger devices
//! - The `.sym` constraint format (parse, serialize, validate) and a JSON form
//! - A provisional symmetry axis estimate for the placer
//!
//! ## Architecture
//!
//! - [`netlist`] - Parser for SPICE/HSPICE MOS netlists
//! - [`circuit`] - Device/net graph and its structural invariants
//! - [`detect`] - Matching passes producing a constraint set
//! - [`constraint`] - Constraint set, `.sym` reader/writer, validation
//! - [`axis`] - Axis estimation from a constraint set
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! symmetry detect ota.sp -o ota.sym --axis
//! symmetry check ota.sym --netlist ota.sp
//! ```
//!
//! ### Library
//!
//! ```
//! use symmetry_core::{circuit::Circuit, constraint, detect, netlist};
//!
//! let ast = netlist::parse(
//!     "M1 out1 vin tail vss nch w=10u l=0.5u\n\
//!      M2 out2 vin tail vss nch w=10u l=0.5u\n",
//! )?;
//! let circuit = Circuit::from_netlist(ast)?;
//! let set = detect::detect(&circuit);
//! let text = constraint::serialize(&set);
//! assert!(text.contains("SYMMETRY_PAIR M1 M2"));
//! # Ok::<(), symmetry_core::SymmetryError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmSymmetry } from 'symmetry_core';
//!
//! const sym = WasmSymmetry.detect(netlistText);
//! ```

pub mod axis;
pub mod circuit;
pub mod constraint;
pub mod detect;
pub mod error;
pub mod netlist;

// Re-export main types for convenience
pub use axis::{detect_axis, AxisDetector, AxisEstimate, AxisPosition, CentroidAxisDetector};
pub use circuit::Circuit;
pub use constraint::{Orientation, SymmetryConstraintSet};
pub use detect::{DetectorConfig, SymmetryDetector};
pub use error::{Result, SymmetryError, ValidationError};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmSymmetry;
