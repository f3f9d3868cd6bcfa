//! Device/net connectivity graph.

use std::collections::BTreeMap;

use super::types::{DeviceKind, Endpoint, Pin, PinRole};
use super::validate::{check_devices, check_nets};
use crate::error::{Result, SymmetryError};
use crate::netlist::{InstanceDef, NetlistAst};

/// Pin names assigned to MOS terminals in netlist order.
const MOS_PIN_NAMES: [&str; 4] = ["D", "G", "S", "B"];

/// Geometry used when a netlist instance omits `w` or `l`.
pub const DEFAULT_DIMENSION: f64 = 1.0;

/// A transistor-like device with named pins.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Unique device identifier (instance name)
    pub id: String,
    /// Transistor flavour
    pub kind: DeviceKind,
    /// Drawn gate width
    pub width: f64,
    /// Drawn gate length
    pub length: f64,
    /// Number of gate fingers (>= 1)
    pub fingers: u32,
    /// Pins in declaration order
    pub pins: Vec<Pin>,
}

impl Device {
    /// Create a single-finger device with no pins.
    pub fn new(id: impl Into<String>, kind: DeviceKind, width: f64, length: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            width,
            length,
            fingers: 1,
            pins: Vec::new(),
        }
    }

    /// Set the finger count.
    pub fn with_fingers(mut self, fingers: u32) -> Self {
        self.fingers = fingers;
        self
    }

    /// Append a pin connected to `net`.
    pub fn with_pin(mut self, name: impl Into<String>, net: impl Into<String>) -> Self {
        self.pins.push(Pin::new(name, net));
        self
    }

    /// Look up a pin by exact name.
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }

    /// Net attached to the pin playing `role`.
    ///
    /// Returns `None` when no pin has that role, or when several pins claim
    /// it with different nets (the device is then ambiguous and never
    /// matches on that role).
    pub fn net_of(&self, role: PinRole) -> Option<&str> {
        let mut found: Option<&str> = None;
        for pin in self.pins.iter().filter(|p| p.role() == Some(role)) {
            match found {
                None => found = Some(&pin.net),
                Some(net) if net == pin.net => {}
                Some(_) => return None,
            }
        }
        found
    }

    /// Gate, drain and source nets, if all three are unambiguous.
    pub fn terminals(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.net_of(PinRole::Gate)?,
            self.net_of(PinRole::Drain)?,
            self.net_of(PinRole::Source)?,
        ))
    }

    /// True when the drain is tied to the gate.
    pub fn is_diode_connected(&self) -> bool {
        matches!(
            (self.net_of(PinRole::Gate), self.net_of(PinRole::Drain)),
            (Some(g), Some(d)) if g == d
        )
    }

    /// Same kind, width, length and finger count.
    pub fn same_geometry(&self, other: &Device) -> bool {
        self.kind == other.kind
            && self.width == other.width
            && self.length == other.length
            && self.fingers == other.fingers
    }

    /// Area proxy used when no placement exists yet: W x L x NF.
    pub fn importance(&self) -> f64 {
        self.width * self.length * self.fingers as f64
    }
}

/// A net and the device pins it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    /// Unique net identifier
    pub id: String,
    /// Connected (device, pin) endpoints
    pub endpoints: Vec<Endpoint>,
}

impl Net {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoints: Vec::new(),
        }
    }

    /// Append an endpoint.
    pub fn with_endpoint(mut self, device: impl Into<String>, pin: impl Into<String>) -> Self {
        self.endpoints.push(Endpoint::new(device, pin));
        self
    }

    /// Nets with fewer than two endpoints carry no topology.
    pub fn is_informative(&self) -> bool {
        self.endpoints.len() >= 2
    }
}

/// A read-only netlist: devices keyed by id and nets keyed by id.
///
/// Both maps are ordered, so every traversal of a circuit is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    devices: BTreeMap<String, Device>,
    nets: BTreeMap<String, Net>,
}

impl Circuit {
    /// Build a circuit from explicit device and net lists.
    ///
    /// Nets referenced by device pins but missing from `nets` are created,
    /// and pins missing from a listed net's endpoints are added to it. Any
    /// contradiction (unknown device or pin, pin/net disagreement, bad
    /// geometry) is a [`SymmetryError::StructuralInvariant`].
    pub fn new(devices: Vec<Device>, nets: Vec<Net>) -> Result<Self> {
        check_devices(&devices)?;

        let devices: BTreeMap<String, Device> =
            devices.into_iter().map(|d| (d.id.clone(), d)).collect();

        check_nets(&devices, &nets)?;

        let mut net_map: BTreeMap<String, Net> = BTreeMap::new();
        for net in nets {
            if net_map.contains_key(&net.id) {
                return Err(SymmetryError::structural(format!(
                    "net '{}' is declared twice",
                    net.id
                )));
            }
            net_map.insert(net.id.clone(), net);
        }

        for device in devices.values() {
            for pin in &device.pins {
                let net = net_map
                    .entry(pin.net.clone())
                    .or_insert_with(|| Net::new(pin.net.clone()));
                let endpoint = Endpoint::new(device.id.clone(), pin.name.clone());
                if !net.endpoints.contains(&endpoint) {
                    net.endpoints.push(endpoint);
                }
            }
        }

        for net in net_map.values_mut() {
            net.endpoints.sort();
            net.endpoints.dedup();
        }

        Ok(Circuit {
            devices,
            nets: net_map,
        })
    }

    /// Build a circuit whose nets are derived from the device pins.
    pub fn from_devices(devices: Vec<Device>) -> Result<Self> {
        Self::new(devices, Vec::new())
    }

    /// Build a circuit from a parsed netlist.
    pub fn from_netlist(ast: NetlistAst) -> Result<Self> {
        let devices = ast
            .instances
            .iter()
            .map(device_from_instance)
            .collect::<Result<Vec<_>>>()?;
        Self::from_devices(devices)
    }

    /// Find a device by id.
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Find a net by id.
    pub fn net(&self, id: &str) -> Option<&Net> {
        self.nets.get(id)
    }

    /// All devices, ordered by id.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// All nets, ordered by id.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    /// Device ids in ascending order.
    pub fn device_ids(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Pins of a device, if it exists.
    pub fn pins_of(&self, device: &str) -> Option<&[Pin]> {
        self.devices.get(device).map(|d| d.pins.as_slice())
    }

    /// Endpoints of a net, if it exists.
    pub fn endpoints_of(&self, net: &str) -> Option<&[Endpoint]> {
        self.nets.get(net).map(|n| n.endpoints.as_slice())
    }

    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }
}

fn device_from_instance(instance: &InstanceDef) -> Result<Device> {
    let kind = DeviceKind::from_model(&instance.model).ok_or_else(|| {
        SymmetryError::InvalidParameter {
            device: instance.name.clone(),
            param: "model".to_string(),
            message: format!("'{}' is not an nmos/pmos model", instance.model),
        }
    })?;

    let width = instance.param("w").unwrap_or(DEFAULT_DIMENSION);
    let length = instance.param("l").unwrap_or(DEFAULT_DIMENSION);
    let fingers = match instance.param("nf") {
        None => 1,
        Some(nf) if nf >= 1.0 && nf.fract() == 0.0 && nf <= u32::MAX as f64 => nf as u32,
        Some(nf) => {
            return Err(SymmetryError::InvalidParameter {
                device: instance.name.clone(),
                param: "nf".to_string(),
                message: format!("finger count must be a positive integer, got {}", nf),
            })
        }
    };

    let mut device = Device::new(instance.name.clone(), kind, width, length).with_fingers(fingers);
    for (name, net) in MOS_PIN_NAMES.iter().zip(&instance.nodes) {
        device = device.with_pin(*name, net.clone());
    }
    Ok(device)
}
