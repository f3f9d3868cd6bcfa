//! Structural checks applied when a circuit is constructed.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, SymmetryError};

use super::graph::{Device, Net};
use super::types::is_valid_device_id;

/// Check device-level invariants.
///
/// Checks:
/// - Device ids are non-empty, unique and free of whitespace and `#`
/// - Finger count is at least 1
/// - Width and length are finite and positive
/// - Pin names are unique within a device and every pin names a net
pub(crate) fn check_devices(devices: &[Device]) -> Result<()> {
    let mut seen = HashSet::new();
    for device in devices {
        if device.id.is_empty() {
            return Err(SymmetryError::structural("device with empty identifier"));
        }
        if !is_valid_device_id(&device.id) {
            return Err(SymmetryError::InvalidDeviceId {
                device: device.id.clone(),
            });
        }
        if !seen.insert(device.id.as_str()) {
            return Err(SymmetryError::structural(format!(
                "device '{}' is declared twice",
                device.id
            )));
        }
        if device.fingers == 0 {
            return Err(SymmetryError::structural(format!(
                "device '{}' has finger count 0",
                device.id
            )));
        }
        for (param, value) in [("width", device.width), ("length", device.length)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SymmetryError::structural(format!(
                    "device '{}' has invalid {} {}",
                    device.id, param, value
                )));
            }
        }

        let mut pin_names = HashSet::new();
        for pin in &device.pins {
            if !pin_names.insert(pin.name.as_str()) {
                return Err(SymmetryError::structural(format!(
                    "device '{}' declares pin '{}' twice",
                    device.id, pin.name
                )));
            }
            if pin.net.is_empty() {
                return Err(SymmetryError::structural(format!(
                    "pin '{}.{}' is not connected to a named net",
                    device.id, pin.name
                )));
            }
        }
    }
    Ok(())
}

/// Check that every net endpoint names an existing device pin that is
/// wired to that same net.
pub(crate) fn check_nets(devices: &BTreeMap<String, Device>, nets: &[Net]) -> Result<()> {
    for net in nets {
        for endpoint in &net.endpoints {
            let device = devices.get(&endpoint.device).ok_or_else(|| {
                SymmetryError::structural(format!(
                    "net '{}' references unknown device '{}'",
                    net.id, endpoint.device
                ))
            })?;
            let pin = device.pin(&endpoint.pin).ok_or_else(|| {
                SymmetryError::structural(format!(
                    "net '{}' references unknown pin '{}' on device '{}'",
                    net.id, endpoint.pin, endpoint.device
                ))
            })?;
            if pin.net != net.id {
                return Err(SymmetryError::structural(format!(
                    "pin '{}' is listed on net '{}' but connects to '{}'",
                    endpoint, net.id, pin.net
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, DeviceKind};

    #[test]
    fn test_zero_fingers_rejected() {
        let device = Device::new("M1", DeviceKind::Nmos, 1.0, 1.0).with_fingers(0);
        let err = Circuit::from_devices(vec![device]).unwrap_err();
        assert!(err.to_string().contains("finger count 0"));
    }

    #[test]
    fn test_non_finite_width_rejected() {
        let device = Device::new("M1", DeviceKind::Pmos, f64::NAN, 1.0);
        assert!(Circuit::from_devices(vec![device]).is_err());
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let a = Device::new("M1", DeviceKind::Nmos, 1.0, 1.0);
        let b = Device::new("M1", DeviceKind::Nmos, 2.0, 1.0);
        let err = Circuit::from_devices(vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_unrepresentable_device_id_rejected() {
        for id in ["M#1", "M 1", "M1\t"] {
            let device = Device::new(id, DeviceKind::Nmos, 1.0, 1.0).with_pin("G", "IN");
            let err = Circuit::from_devices(vec![device]).unwrap_err();
            assert!(
                matches!(&err, SymmetryError::InvalidDeviceId { device } if device == id),
                "{id:?}: {err}"
            );
        }
    }

    #[test]
    fn test_unknown_pin_rejected() {
        let device = Device::new("M1", DeviceKind::Nmos, 1.0, 1.0).with_pin("G", "IN");
        let net = Net::new("IN").with_endpoint("M1", "X");
        let err = Circuit::new(vec![device], vec![net]).unwrap_err();
        assert!(err.to_string().contains("unknown pin 'X'"));
    }

    #[test]
    fn test_pin_net_disagreement_rejected() {
        let device = Device::new("M1", DeviceKind::Nmos, 1.0, 1.0).with_pin("G", "IN");
        let net = Net::new("OTHER").with_endpoint("M1", "G");
        assert!(Circuit::new(vec![device], vec![net]).is_err());
    }
}
