//! Error types for symmetry detection and constraint handling.
//!
//! This module provides a unified error type [`SymmetryError`] that covers
//! every fatal condition: netlist loading, circuit construction, manual
//! constraint edits, `.sym` parsing and file I/O. Non-fatal diagnostics are
//! reported separately as [`ValidationError`] lists.

use thiserror::Error;

/// Result type alias using [`SymmetryError`].
pub type Result<T> = std::result::Result<T, SymmetryError>;

/// Unified error type for all fatal symmetry-core operations.
#[derive(Error, Debug)]
pub enum SymmetryError {
    // ============ Netlist Loading Errors ============
    /// Error during lexical analysis of a netlist
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// Malformed netlist statement
    #[error("Netlist error at line {line}: {message}")]
    NetlistParse { line: usize, message: String },

    /// Invalid parameter value on a netlist instance
    #[error("Invalid parameter '{param}' for device '{device}': {message}")]
    InvalidParameter {
        device: String,
        param: String,
        message: String,
    },

    // ============ Circuit Model Errors ============
    /// The circuit references a device, pin or net that does not exist,
    /// or violates another structural invariant.
    #[error("Structural invariant violated: {message}")]
    StructuralInvariant { message: String },

    // ============ Constraint Errors ============
    /// A device id is empty or contains whitespace or `#`
    #[error("Invalid device identifier {device:?}")]
    InvalidDeviceId { device: String },

    /// One or more devices were assigned more than one symmetry role
    #[error("Devices assigned more than one symmetry role: {}", devices.join(", "))]
    DuplicateRole { devices: Vec<String> },

    /// A symmetry group needs at least two members
    #[error("Symmetry group needs at least 2 devices, got {size}")]
    InvalidGroup { size: usize },

    /// Malformed `.sym` statement
    #[error("Parse error at line {line} near '{token}': {message}")]
    Parse {
        line: usize,
        token: String,
        message: String,
    },

    // ============ I/O Errors ============
    /// Error reading an input file
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error encoding or decoding constraint JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SymmetryError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a netlist parse error
    pub fn netlist(line: usize, message: impl Into<String>) -> Self {
        Self::NetlistParse {
            line,
            message: message.into(),
        }
    }

    /// Create a `.sym` parse error naming the offending token
    pub fn parse(line: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            token: token.into(),
            message: message.into(),
        }
    }

    /// Create a structural invariant error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            message: message.into(),
        }
    }

    /// Create a duplicate-role error; the device list is sorted and deduplicated.
    pub fn duplicate_role<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut devices: Vec<String> = devices.into_iter().map(Into::into).collect();
        devices.sort();
        devices.dedup();
        Self::DuplicateRole { devices }
    }
}

/// A non-fatal problem found while validating a constraint set.
///
/// Validation never stops at the first problem; callers receive the full
/// ordered list and decide what to do with it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A constraint references a device that is not in the design
    #[error("{role} references unknown device '{device}'")]
    UnknownDevice { device: String, role: String },

    /// A device holds more than one symmetry role
    #[error("Device '{device}' appears in {count} symmetry roles")]
    DuplicateRole { device: String, count: usize },

    /// A symmetry group has fewer than two members
    #[error("Symmetry group #{index} has {size} member(s), needs at least 2")]
    UndersizedGroup { index: usize, size: usize },

    /// The stored axis position is NaN or infinite
    #[error("Symmetry axis value {value} is not finite")]
    NonFiniteAxis { value: f64 },

    /// Matched devices are of different kinds
    #[error("{role} mixes device kinds: '{first}' is {first_kind}, '{second}' is {second_kind}")]
    KindMismatch {
        role: String,
        first: String,
        first_kind: String,
        second: String,
        second_kind: String,
    },

    /// Paired devices differ in geometry
    #[error(
        "{role} size mismatch between '{first}' and '{second}': \
         {param} ({first_value} != {second_value})"
    )]
    SizeMismatch {
        role: String,
        first: String,
        second: String,
        param: String,
        first_value: f64,
        second_value: f64,
    },
}

impl ValidationError {
    /// The device identifier the error is about, when there is a single one.
    pub fn device(&self) -> Option<&str> {
        match self {
            Self::UnknownDevice { device, .. } | Self::DuplicateRole { device, .. } => {
                Some(device)
            }
            _ => None,
        }
    }
}
