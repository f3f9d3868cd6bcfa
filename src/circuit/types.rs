//! Core types for circuit representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transistor flavour of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// n-channel transistor
    Nmos,
    /// p-channel transistor
    Pmos,
}

impl DeviceKind {
    /// Classify a SPICE model name (`nmos`, `nch_lvt`, `pch_mac`, ...).
    pub fn from_model(model: &str) -> Option<Self> {
        let upper = model.to_uppercase();
        if upper.starts_with("NMOS") || upper.starts_with("NCH") || upper == "N" {
            Some(DeviceKind::Nmos)
        } else if upper.starts_with("PMOS") || upper.starts_with("PCH") || upper == "P" {
            Some(DeviceKind::Pmos)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Nmos => "nmos",
            DeviceKind::Pmos => "pmos",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_model(s).ok_or_else(|| format!("unknown device kind '{}'", s))
    }
}

/// Electrical role of a transistor pin, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinRole {
    Gate,
    Drain,
    Source,
    Bulk,
}

impl PinRole {
    /// Classify a pin name. Matching is case-insensitive; unrecognized names
    /// have no role and never take part in topology matching.
    pub fn from_pin_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "g" | "gate" => Some(PinRole::Gate),
            "d" | "drain" => Some(PinRole::Drain),
            "s" | "source" => Some(PinRole::Source),
            "b" | "bulk" | "body" | "sub" | "substrate" => Some(PinRole::Bulk),
            _ => None,
        }
    }

    /// Conventional short pin name.
    pub fn short_name(&self) -> &'static str {
        match self {
            PinRole::Gate => "G",
            PinRole::Drain => "D",
            PinRole::Source => "S",
            PinRole::Bulk => "B",
        }
    }
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A named device pin and the net it connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Pin name, unique within its device
    pub name: String,
    /// Name of the connected net
    pub net: String,
}

impl Pin {
    pub fn new(name: impl Into<String>, net: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            net: net.into(),
        }
    }

    /// Role of this pin, if its name is a recognized terminal name.
    pub fn role(&self) -> Option<PinRole> {
        PinRole::from_pin_name(&self.name)
    }
}

/// One (device, pin) connection point of a net.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub device: String,
    pub pin: String,
}

impl Endpoint {
    pub fn new(device: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.pin)
    }
}

/// True when `id` can name a device in a `.sym` file: non-empty, with no
/// whitespace and no `#` (which starts a comment there).
pub fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty() && !id.chars().any(|c| c.is_whitespace() || c == '#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_model() {
        assert_eq!(DeviceKind::from_model("nmos"), Some(DeviceKind::Nmos));
        assert_eq!(DeviceKind::from_model("nch_lvt"), Some(DeviceKind::Nmos));
        assert_eq!(DeviceKind::from_model("PCH_MAC"), Some(DeviceKind::Pmos));
        assert_eq!(DeviceKind::from_model("rppoly"), None);
        assert!("cap".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_pin_roles() {
        assert_eq!(PinRole::from_pin_name("G"), Some(PinRole::Gate));
        assert_eq!(PinRole::from_pin_name("drain"), Some(PinRole::Drain));
        assert_eq!(PinRole::from_pin_name("Source"), Some(PinRole::Source));
        assert_eq!(PinRole::from_pin_name("b"), Some(PinRole::Bulk));
        assert_eq!(PinRole::from_pin_name("plus"), None);
    }
}
