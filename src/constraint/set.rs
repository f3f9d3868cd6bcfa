//! Symmetry constraint value types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::circuit::is_valid_device_id;
use crate::error::{Result, SymmetryError};

/// Mirror direction of a symmetric structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    /// Mirrored left-right about a vertical axis
    #[default]
    Vertical,
    /// Mirrored top-bottom about a horizontal axis
    Horizontal,
}

impl Orientation {
    /// Keyword used in `.sym` files.
    pub fn keyword(&self) -> &'static str {
        match self {
            Orientation::Vertical => "VERTICAL",
            Orientation::Horizontal => "HORIZONTAL",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Orientation {
    type Err = String;

    /// Keywords are case-sensitive, like every `.sym` keyword.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "VERTICAL" => Ok(Orientation::Vertical),
            "HORIZONTAL" => Ok(Orientation::Horizontal),
            _ => Err(format!("invalid orientation '{}'", s)),
        }
    }
}

/// Two matched devices. Membership is unordered; the stored order is kept
/// for output (a current-mirror reference comes first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryPair {
    pub first: String,
    pub second: String,
    #[serde(default)]
    pub orientation: Orientation,
}

impl SymmetryPair {
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        orientation: Orientation,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            orientation,
        }
    }

    pub fn contains(&self, device: &str) -> bool {
        self.first == device || self.second == device
    }

    /// The other member of the pair, if `device` is one of them.
    pub fn partner(&self, device: &str) -> Option<&str> {
        if self.first == device {
            Some(&self.second)
        } else if self.second == device {
            Some(&self.first)
        } else {
            None
        }
    }

    pub fn members(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }
}

impl PartialEq for SymmetryPair {
    fn eq(&self, other: &Self) -> bool {
        self.orientation == other.orientation
            && ((self.first == other.first && self.second == other.second)
                || (self.first == other.second && self.second == other.first))
    }
}

impl Eq for SymmetryPair {}

/// An ordered chain of matched devices sharing one orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetryGroup {
    pub members: Vec<String>,
    #[serde(default)]
    pub orientation: Orientation,
}

impl SymmetryGroup {
    pub fn new<I, S>(members: I, orientation: Orientation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            orientation,
        }
    }

    pub fn contains(&self, device: &str) -> bool {
        self.members.iter().any(|m| m == device)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The symmetry role a device plays in a constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Index into [`SymmetryConstraintSet::pairs`]
    Pair(usize),
    /// Index into [`SymmetryConstraintSet::groups`]
    Group(usize),
    SelfSymmetric,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Pair(i) => write!(f, "symmetry pair #{}", i + 1),
            Role::Group(i) => write!(f, "symmetry group #{}", i + 1),
            Role::SelfSymmetric => write!(f, "self-symmetry"),
        }
    }
}

/// Pairs, groups and self-symmetric devices, plus an optional axis.
///
/// Fields are public so callers (and the parser) can assemble a set
/// directly; the `add_*` methods enforce that every device holds at most
/// one role, and [`validate`](super::validate) re-checks sets built by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymmetryConstraintSet {
    #[serde(default)]
    pub pairs: Vec<SymmetryPair>,
    #[serde(default)]
    pub groups: Vec<SymmetryGroup>,
    #[serde(default)]
    pub self_symmetric: Vec<String>,
    /// Axis coordinate, unit-less until layout consumes it
    #[serde(default)]
    pub axis: Option<f64>,
}

impl SymmetryConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the set holds no constraints (the axis is ignored).
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.groups.is_empty() && self.self_symmetric.is_empty()
    }

    /// Add a pair of distinct, currently unconstrained devices.
    pub fn add_pair(
        &mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        orientation: Orientation,
    ) -> Result<()> {
        let (first, second) = (first.into(), second.into());
        check_ids([first.as_str(), second.as_str()])?;
        let mut conflicts = self.claimed_among([first.as_str(), second.as_str()]);
        if first == second {
            conflicts.push(first.clone());
        }
        if !conflicts.is_empty() {
            return Err(SymmetryError::duplicate_role(conflicts));
        }
        self.pairs.push(SymmetryPair::new(first, second, orientation));
        Ok(())
    }

    /// Add a group of at least two distinct, currently unconstrained devices.
    pub fn add_group<I, S>(&mut self, members: I, orientation: Orientation) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = SymmetryGroup::new(members, orientation);
        if group.len() < 2 {
            return Err(SymmetryError::InvalidGroup { size: group.len() });
        }
        check_ids(group.members.iter().map(String::as_str))?;
        let mut conflicts = self.claimed_among(group.members.iter().map(String::as_str));
        conflicts.extend(repeated(group.members.iter().map(String::as_str)));
        if !conflicts.is_empty() {
            return Err(SymmetryError::duplicate_role(conflicts));
        }
        self.groups.push(group);
        Ok(())
    }

    /// Mark a currently unconstrained device as symmetric about its own center.
    pub fn add_self_symmetric(&mut self, device: impl Into<String>) -> Result<()> {
        let device = device.into();
        check_ids([device.as_str()])?;
        if self.role_of(&device).is_some() {
            return Err(SymmetryError::duplicate_role([device]));
        }
        self.self_symmetric.push(device);
        Ok(())
    }

    /// Set the axis coordinate.
    pub fn set_axis(&mut self, position: f64) {
        self.axis = Some(position);
    }

    /// First role held by `device`, if any.
    pub fn role_of(&self, device: &str) -> Option<Role> {
        if let Some(i) = self.pairs.iter().position(|p| p.contains(device)) {
            return Some(Role::Pair(i));
        }
        if let Some(i) = self.groups.iter().position(|g| g.contains(device)) {
            return Some(Role::Group(i));
        }
        self.self_symmetric
            .iter()
            .any(|d| d == device)
            .then_some(Role::SelfSymmetric)
    }

    /// Every (device, role) occurrence in declaration order: pairs, then
    /// groups, then self-symmetric devices.
    pub fn memberships(&self) -> Vec<(&str, Role)> {
        let mut out = Vec::new();
        for (i, pair) in self.pairs.iter().enumerate() {
            out.extend(pair.members().into_iter().map(|d| (d, Role::Pair(i))));
        }
        for (i, group) in self.groups.iter().enumerate() {
            out.extend(group.members.iter().map(|d| (d.as_str(), Role::Group(i))));
        }
        out.extend(
            self.self_symmetric
                .iter()
                .map(|d| (d.as_str(), Role::SelfSymmetric)),
        );
        out
    }

    /// Devices that occur more than once across all roles, with their
    /// occurrence counts, ordered by device id.
    pub fn duplicate_devices(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (device, _) in self.memberships() {
            *counts.entry(device).or_default() += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    /// Every constrained device id, in declaration order (duplicates kept).
    pub fn devices(&self) -> Vec<&str> {
        self.memberships().into_iter().map(|(d, _)| d).collect()
    }

    /// Fail with [`SymmetryError::DuplicateRole`] listing every device that
    /// holds more than one role.
    pub fn check_roles(&self) -> Result<()> {
        let duplicates = self.duplicate_devices();
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(SymmetryError::duplicate_role(duplicates.into_keys()))
        }
    }

    /// Same pairs, groups, self-symmetric devices and axis, ignoring order
    /// of statements and pair member order.
    pub fn same_constraints(&self, other: &Self) -> bool {
        fn sorted_pairs(set: &SymmetryConstraintSet) -> Vec<(String, String, Orientation)> {
            let mut pairs: Vec<_> = set
                .pairs
                .iter()
                .map(|p| {
                    let (a, b) = if p.first <= p.second {
                        (p.first.clone(), p.second.clone())
                    } else {
                        (p.second.clone(), p.first.clone())
                    };
                    (a, b, p.orientation)
                })
                .collect();
            pairs.sort_by(|x, y| (&x.0, &x.1).cmp(&(&y.0, &y.1)));
            pairs
        }
        fn sorted_groups(set: &SymmetryConstraintSet) -> Vec<&SymmetryGroup> {
            let mut groups: Vec<_> = set.groups.iter().collect();
            groups.sort_by(|a, b| a.members.cmp(&b.members));
            groups
        }
        fn sorted_self(set: &SymmetryConstraintSet) -> Vec<&String> {
            let mut devices: Vec<_> = set.self_symmetric.iter().collect();
            devices.sort();
            devices
        }
        let axis_equal = match (self.axis, other.axis) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a == b
                    || (a.is_nan() && b.is_nan())
                    || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
            }
            _ => false,
        };

        axis_equal
            && sorted_pairs(self) == sorted_pairs(other)
            && sorted_groups(self) == sorted_groups(other)
            && sorted_self(self) == sorted_self(other)
    }

    fn claimed_among<'a, I>(&self, devices: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        devices
            .into_iter()
            .filter(|d| self.role_of(d).is_some())
            .map(str::to_string)
            .collect()
    }
}

/// Fail on the first id that `.sym` text cannot carry.
fn check_ids<'a>(devices: impl IntoIterator<Item = &'a str>) -> Result<()> {
    match devices.into_iter().find(|d| !is_valid_device_id(d)) {
        Some(device) => Err(SymmetryError::InvalidDeviceId {
            device: device.to_string(),
        }),
        None => Ok(()),
    }
}

/// Ids that occur more than once in `devices`.
fn repeated<'a>(devices: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for d in devices {
        *counts.entry(d).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(d, _)| d.to_string())
        .collect()
}
