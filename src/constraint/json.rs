//! JSON form of a constraint set.

use super::set::SymmetryConstraintSet;
use crate::circuit::is_valid_device_id;
use crate::error::{Result, SymmetryError};

/// Encode a constraint set as pretty-printed JSON.
pub fn to_json(set: &SymmetryConstraintSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(set)?)
}

/// Decode a constraint set, rejecting ids that `.sym` cannot carry and
/// devices that hold more than one role.
pub fn from_json(text: &str) -> Result<SymmetryConstraintSet> {
    let set: SymmetryConstraintSet = serde_json::from_str(text)?;
    if let Some(device) = set.devices().into_iter().find(|d| !is_valid_device_id(d)) {
        return Err(SymmetryError::InvalidDeviceId {
            device: device.to_string(),
        });
    }
    set.check_roles()?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Orientation;

    #[test]
    fn test_json_round_trip() {
        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M2", Orientation::Horizontal).unwrap();
        set.add_group(["M3", "M4", "M5"], Orientation::Vertical).unwrap();
        set.add_self_symmetric("M6").unwrap();
        set.set_axis(3.25);

        let text = to_json(&set).unwrap();
        assert!(text.contains("\"HORIZONTAL\""));
        assert_eq!(from_json(&text).unwrap(), set);
    }

    #[test]
    fn test_missing_fields_default() {
        let set = from_json(r#"{"pairs":[{"first":"M1","second":"M2"}]}"#).unwrap();
        assert_eq!(set.pairs[0].orientation, Orientation::Vertical);
        assert!(set.groups.is_empty());
        assert_eq!(set.axis, None);
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let err = from_json(r#"{"pairs":[{"first":"M1","second":"M2"}],"self_symmetric":["M2"]}"#)
            .unwrap_err();
        assert!(matches!(err, SymmetryError::DuplicateRole { .. }));
    }

    #[test]
    fn test_hash_in_device_id_rejected() {
        let err = from_json(r#"{"self_symmetric":["M#6"]}"#).unwrap_err();
        assert!(matches!(err, SymmetryError::InvalidDeviceId { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(from_json("{").unwrap_err(), SymmetryError::Json(_)));
    }
}
