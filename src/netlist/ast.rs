//! Syntax tree for a flattened SPICE-style netlist.

use std::collections::BTreeMap;

/// Parsed netlist: transistor instances plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// Transistor instances in file order
    pub instances: Vec<InstanceDef>,
    /// Names of `.subckt` blocks seen (their bodies are flattened)
    pub subcircuits: Vec<String>,
    /// Nets named by `.global`, never scoped to a subcircuit
    pub globals: Vec<String>,
    /// Element lines that were not transistors and were skipped
    pub skipped: Vec<SkippedElement>,
}

impl NetlistAst {
    /// Create a new empty netlist.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A MOS instance line.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDef {
    /// Instance name (`M1`, `MN_TAIL`, ...); `ota.M1` inside `.subckt ota`
    pub name: String,
    /// Terminal nets in drain, gate, source[, bulk] order
    pub nodes: Vec<String>,
    /// Enclosing `.subckt`, if any
    pub subckt: Option<String>,
    /// Model name (`nch`, `pmos`, ...)
    pub model: String,
    /// Instance parameters, keys lowercased, values scaled
    pub params: BTreeMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

impl InstanceDef {
    /// Look up a parameter by (lowercase) name.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

/// A non-transistor element that the loader ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    pub name: String,
    pub line: usize,
}
