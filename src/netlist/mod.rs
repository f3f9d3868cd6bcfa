//! SPICE-style netlist loader.
//!
//! This module reads the transistor-level connectivity that symmetry
//! detection works on. It understands the common subset of HSPICE and
//! Spectre-in-SPICE-mode syntax that analog netlisters emit.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | instance | element | empty
//! comment     = '*' { any_char }          (first non-blank char)
//! trailing    = ('$' | ';' | '//') { any_char }
//! continued   = '+' { token }             (appends to the previous line)
//! directive   = '.' name { token }        (.subckt / .ends / .global / .end; others ignored)
//! instance    = 'M' name drain gate source [bulk] model { param '=' value }
//! element     = other_letter name { token }   (skipped)
//!
//! value       = number [scale [unit]]
//! scale       = 'f' | 'p' | 'n' | 'u' | 'm' | 'k' | 'meg' | 'g' | 't'
//! ```
//!
//! Parentheses around terminal lists are ignored, so `M1 (d g s b) nch`
//! parses like `M1 d g s b nch`.
//!
//! Instances inside a `.subckt NAME` block are flattened with their names
//! and local nets prefixed `NAME.`, so `M1` in `.subckt ota` becomes
//! `ota.M1`. Ground `0` and nets listed on a `.global` line keep their names.
//! Nested or repeated `.subckt` definitions are rejected.
//!
//! # Example
//!
//! ```text
//! * 5T OTA input stage
//! .subckt ota inp inn out vdd vss
//! M1 x   inp tail vss nch w=10u l=0.5u
//! M2 out inn tail vss nch w=10u l=0.5u
//! M3 x   x   vdd  vdd pch w=20u l=1u nf=2
//! M4 out x   vdd  vdd pch w=20u l=1u nf=2
//! .ends ota
//! ```
//!
//! Each MOS instance becomes a [`Device`](crate::circuit::Device) with pins
//! `D`, `G`, `S` and (when present) `B`; see
//! [`Circuit::from_netlist`](crate::circuit::Circuit::from_netlist).

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::{Result, SymmetryError};

/// Parse netlist text into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a netlist file.
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| SymmetryError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
