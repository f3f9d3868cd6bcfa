//! Diagnostic checks over a constraint set.
//!
//! Nothing here mutates the set or fails fast: every function returns the
//! complete list of problems it found, in a stable order.

use std::collections::BTreeSet;

use super::set::{Role, SymmetryConstraintSet};
use crate::circuit::{Circuit, Device};
use crate::error::ValidationError;

/// Absolute tolerance used when comparing paired device geometry.
pub const MATCH_TOLERANCE: f64 = 1e-9;

/// Check a constraint set against the devices that actually exist.
///
/// Errors come back grouped in this order: unknown devices (declaration
/// order), devices holding several roles (by id), groups with fewer than
/// two members (by index, 1-based) and finally a non-finite axis.
pub fn validate<I, S>(set: &SymmetryConstraintSet, available_devices: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let available: BTreeSet<String> = available_devices
        .into_iter()
        .map(|d| d.as_ref().to_string())
        .collect();

    let mut errors = Vec::new();

    let mut reported: BTreeSet<(&str, String)> = BTreeSet::new();
    for (device, role) in set.memberships() {
        if available.contains(device) {
            continue;
        }
        let role = role.to_string();
        if reported.insert((device, role.clone())) {
            errors.push(ValidationError::UnknownDevice {
                device: device.to_string(),
                role,
            });
        }
    }

    errors.extend(
        set.duplicate_devices()
            .into_iter()
            .map(|(device, count)| ValidationError::DuplicateRole {
                device: device.to_string(),
                count,
            }),
    );

    errors.extend(
        set.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.len() < 2)
            .map(|(i, g)| ValidationError::UndersizedGroup {
                index: i + 1,
                size: g.len(),
            }),
    );

    if let Some(value) = set.axis.filter(|v| !v.is_finite()) {
        errors.push(ValidationError::NonFiniteAxis { value });
    }

    errors
}

/// [`validate`] against the devices of a circuit.
pub fn validate_against(set: &SymmetryConstraintSet, circuit: &Circuit) -> Vec<ValidationError> {
    validate(set, circuit.device_ids())
}

/// Electrical matching check using [`MATCH_TOLERANCE`].
pub fn check_matching(set: &SymmetryConstraintSet, circuit: &Circuit) -> Vec<ValidationError> {
    check_matching_with(set, circuit, MATCH_TOLERANCE)
}

/// Report matched devices whose kind differs, and paired devices whose
/// width, length or finger count differ by more than `tolerance`.
///
/// Groups hold ratioed mirrors, so only their kinds are compared (each
/// member against the first). Devices missing from the circuit are skipped.
pub fn check_matching_with(
    set: &SymmetryConstraintSet,
    circuit: &Circuit,
    tolerance: f64,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, pair) in set.pairs.iter().enumerate() {
        let (Some(a), Some(b)) = (circuit.device(&pair.first), circuit.device(&pair.second))
        else {
            continue;
        };
        let role = Role::Pair(i).to_string();
        if a.kind != b.kind {
            errors.push(kind_mismatch(&role, a, b));
            continue;
        }
        let params = [
            ("w", a.width, b.width),
            ("l", a.length, b.length),
            ("nf", a.fingers as f64, b.fingers as f64),
        ];
        for (param, x, y) in params {
            if (x - y).abs() > tolerance {
                errors.push(ValidationError::SizeMismatch {
                    role: role.clone(),
                    first: a.id.clone(),
                    second: b.id.clone(),
                    param: param.to_string(),
                    first_value: x,
                    second_value: y,
                });
            }
        }
    }

    for (i, group) in set.groups.iter().enumerate() {
        let mut members = group.members.iter().filter_map(|m| circuit.device(m));
        let Some(lead) = members.next() else {
            continue;
        };
        let role = Role::Group(i).to_string();
        for other in members.filter(|d| d.kind != lead.kind) {
            errors.push(kind_mismatch(&role, lead, other));
        }
    }

    errors
}

fn kind_mismatch(role: &str, a: &Device, b: &Device) -> ValidationError {
    ValidationError::KindMismatch {
        role: role.to_string(),
        first: a.id.clone(),
        first_kind: a.kind.to_string(),
        second: b.id.clone(),
        second_kind: b.kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::DeviceKind;
    use crate::constraint::{Orientation, SymmetryGroup, SymmetryPair};

    fn device(id: &str, kind: DeviceKind, w: f64) -> Device {
        Device::new(id, kind, w, 0.5)
            .with_pin("G", format!("{id}_g"))
            .with_pin("D", format!("{id}_d"))
            .with_pin("S", "VSS")
    }

    #[test]
    fn test_valid_set_has_no_errors() {
        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M2", Orientation::Vertical).unwrap();
        set.add_self_symmetric("M3").unwrap();
        set.set_axis(12.5);
        assert!(validate(&set, ["M1", "M2", "M3"]).is_empty());
    }

    #[test]
    fn test_unknown_device_named() {
        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M99", Orientation::Vertical).unwrap();
        let errors = validate(&set, ["M1", "M2"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].device(), Some("M99"));
        assert!(errors[0].to_string().contains("M99"));
    }

    #[test]
    fn test_error_order() {
        let set = SymmetryConstraintSet {
            pairs: vec![SymmetryPair::new("M1", "M2", Orientation::Vertical)],
            groups: vec![SymmetryGroup::new(["M2"], Orientation::Vertical)],
            self_symmetric: vec!["M7".to_string()],
            axis: Some(f64::NAN),
        };
        let errors = validate(&set, vec!["M1".to_string(), "M2".to_string()]);
        assert!(matches!(
            &errors[0],
            ValidationError::UnknownDevice { device, .. } if device == "M7"
        ));
        assert!(matches!(
            &errors[1],
            ValidationError::DuplicateRole { device, count: 2 } if device == "M2"
        ));
        assert!(matches!(errors[2], ValidationError::UndersizedGroup { index: 1, size: 1 }));
        assert!(matches!(errors[3], ValidationError::NonFiniteAxis { .. }));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let set = SymmetryConstraintSet {
            self_symmetric: vec!["M1".to_string(), "M1".to_string()],
            ..Default::default()
        };
        let before = set.clone();
        let _ = validate(&set, Vec::<String>::new());
        assert_eq!(set, before);
    }

    #[test]
    fn test_matching_reports_kind_and_size() {
        let circuit = Circuit::from_devices(vec![
            device("M1", DeviceKind::Nmos, 10.0),
            device("M2", DeviceKind::Nmos, 12.0),
            device("M3", DeviceKind::Nmos, 10.0),
            device("M4", DeviceKind::Pmos, 10.0),
            device("M5", DeviceKind::Pmos, 4.0),
            device("M6", DeviceKind::Pmos, 8.0),
        ])
        .unwrap();

        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M2", Orientation::Vertical).unwrap();
        set.add_pair("M3", "M4", Orientation::Vertical).unwrap();
        set.add_group(["M5", "M6"], Orientation::Vertical).unwrap();

        let errors = check_matching(&set, &circuit);
        assert_eq!(errors.len(), 2);
        match &errors[0] {
            ValidationError::SizeMismatch { param, first_value, second_value, .. } => {
                assert_eq!(param, "w");
                assert_eq!((*first_value, *second_value), (10.0, 12.0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            &errors[1],
            ValidationError::KindMismatch { second, .. } if second == "M4"
        ));
    }

    #[test]
    fn test_matching_within_tolerance() {
        let circuit = Circuit::from_devices(vec![
            device("M1", DeviceKind::Nmos, 10.0),
            device("M2", DeviceKind::Nmos, 10.0 + 1e-12),
        ])
        .unwrap();
        let mut set = SymmetryConstraintSet::new();
        set.add_pair("M1", "M2", Orientation::Vertical).unwrap();
        set.add_pair("M8", "M9", Orientation::Vertical).unwrap();
        assert!(check_matching(&set, &circuit).is_empty());
        assert!(!validate_against(&set, &circuit).is_empty());
    }
}
