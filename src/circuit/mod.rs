//! Circuit model: devices, pins and nets.
//!
//! A [`Circuit`] is the read-only input to symmetry detection. It is built
//! once, either programmatically or from a netlist (see [`crate::netlist`]),
//! and every structural invariant is checked at construction so the
//! matching passes never have to.

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, Device, Net, DEFAULT_DIMENSION};
pub use types::*;
