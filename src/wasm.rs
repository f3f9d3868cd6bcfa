//! WASM bindings for Symmetry Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmSymmetry } from 'symmetry_core';
//!
//! await init();
//!
//! const netlist = `
//!   M1 out1 vin tail vss nch w=10u l=0.5u
//!   M2 out2 vin tail vss nch w=10u l=0.5u
//! `;
//!
//! const symText = WasmSymmetry.detect(netlist);
//! const problems = WasmSymmetry.validate(symText, ["M1", "M2"]);
//! ```

use wasm_bindgen::prelude::*;

use crate::axis::{AxisDetector, CentroidAxisDetector};
use crate::circuit::Circuit;
use crate::constraint;
use crate::detect::{DetectorConfig, SymmetryDetector};
use crate::error::SymmetryError;
use crate::netlist;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: SymmetryError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Stateless entry points over netlist text and `.sym` text.
#[wasm_bindgen]
pub struct WasmSymmetry;

#[wasm_bindgen]
impl WasmSymmetry {
    /// Detect constraints in a netlist and return them as `.sym` text.
    #[wasm_bindgen]
    pub fn detect(netlist_text: &str) -> Result<String, JsValue> {
        Self::detect_with(netlist_text, false, false, true)
    }

    /// Detection with the optional passes and axis estimate toggled.
    #[wasm_bindgen]
    pub fn detect_with(
        netlist_text: &str,
        cross_coupled: bool,
        propagate: bool,
        with_axis: bool,
    ) -> Result<String, JsValue> {
        let ast = netlist::parse(netlist_text).map_err(to_js)?;
        let circuit = Circuit::from_netlist(ast).map_err(to_js)?;

        let config = DetectorConfig::new()
            .with_cross_coupled(cross_coupled)
            .with_propagation(propagate);
        let mut set = SymmetryDetector::with_config(config).detect(&circuit);
        if with_axis {
            CentroidAxisDetector.estimate(&circuit, &set).apply_to(&mut set);
        }
        Ok(constraint::serialize(&set))
    }

    /// Parse `.sym` text and validate it against a device list.
    ///
    /// Returns one message per problem; an empty array means valid.
    #[wasm_bindgen]
    pub fn validate(sym_text: &str, devices: Vec<String>) -> Result<Vec<String>, JsValue> {
        let set = constraint::parse(sym_text).map_err(to_js)?;
        Ok(constraint::validate(&set, devices)
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Convert `.sym` text to JSON.
    #[wasm_bindgen]
    pub fn to_json(sym_text: &str) -> Result<String, JsValue> {
        let set = constraint::parse(sym_text).map_err(to_js)?;
        constraint::to_json(&set).map_err(to_js)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
