//! Symmetry constraint sets and their persisted forms.
//!
//! A [`SymmetryConstraintSet`] is a plain value: the detector builds one,
//! the `.sym` reader builds one, and callers may edit one by hand through
//! the `add_*` methods. Each device holds at most one role.
//!
//! # The `.sym` format
//!
//! ```text
//! # comment (also allowed after a statement)
//! SYMMETRY_AXIS  <number>
//! SYMMETRY_PAIR  <dev1> <dev2> [VERTICAL|HORIZONTAL]
//! SYMMETRY_GROUP <dev1> <dev2> ... [VERTICAL|HORIZONTAL]
//! SELF_SYMMETRY  <dev1> [<dev2> ...]
//! ```
//!
//! Keywords are case-sensitive. Orientation defaults to `VERTICAL`, and
//! at most one `SYMMETRY_AXIS` line may appear.

mod json;
mod parser;
mod set;
mod validate;

pub use json::{from_json, to_json};
pub use parser::{parse, serialize, KW_AXIS, KW_GROUP, KW_PAIR, KW_SELF};
pub use set::{Orientation, Role, SymmetryConstraintSet, SymmetryGroup, SymmetryPair};
pub use validate::{
    check_matching, check_matching_with, validate, validate_against, MATCH_TOLERANCE,
};

use std::path::Path;

use crate::error::{Result, SymmetryError};

/// Read and parse a `.sym` file.
pub fn read_sym_file(path: &Path) -> Result<SymmetryConstraintSet> {
    let content = std::fs::read_to_string(path).map_err(|e| SymmetryError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

/// Serialize a constraint set into a `.sym` file.
pub fn write_sym_file(path: &Path, set: &SymmetryConstraintSet) -> Result<()> {
    std::fs::write(path, serialize(set)).map_err(|e| SymmetryError::FileWrite {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sym_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ota.sym");

        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M2", Orientation::Vertical).unwrap();
        set.add_group(["M3", "M4", "M5"], Orientation::Horizontal).unwrap();
        set.set_axis(-2.5);

        write_sym_file(&path, &set).unwrap();
        let loaded = read_sym_file(&path).unwrap();
        assert!(set.same_constraints(&loaded));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sym_file(&dir.path().join("absent.sym")).unwrap_err();
        assert!(matches!(err, SymmetryError::FileRead { .. }));
    }
}
