//! Detector configuration.

use crate::constraint::Orientation;

/// Smallest finger count classified as self-symmetric.
pub const DEFAULT_MIN_SELF_SYMMETRIC_FINGERS: u32 = 2;

/// Configuration for [`SymmetryDetector`](super::SymmetryDetector).
///
/// The default runs the three core passes (differential pair, current
/// mirror, self-symmetric) and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Run the cross-coupled pair pass after differential pairs.
    pub cross_coupled: bool,
    /// Grow new pairs outward from matched drains after the mirror pass.
    pub propagate: bool,
    /// Finger count at which an unmatched device becomes self-symmetric.
    pub min_self_symmetric_fingers: u32,
    /// Orientation given to every detected pair and group.
    pub pair_orientation: Orientation,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cross_coupled: false,
            propagate: false,
            min_self_symmetric_fingers: DEFAULT_MIN_SELF_SYMMETRIC_FINGERS,
            pair_orientation: Orientation::Vertical,
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the cross-coupled pair pass.
    pub fn with_cross_coupled(mut self, enabled: bool) -> Self {
        self.cross_coupled = enabled;
        self
    }

    /// Enable or disable symmetry propagation.
    pub fn with_propagation(mut self, enabled: bool) -> Self {
        self.propagate = enabled;
        self
    }

    /// Set the self-symmetric finger threshold (clamped to at least 2,
    /// since every device has one finger).
    pub fn with_min_self_symmetric_fingers(mut self, fingers: u32) -> Self {
        self.min_self_symmetric_fingers = fingers.max(2);
        self
    }

    /// Set the orientation tag for detected pairs and groups.
    pub fn with_pair_orientation(mut self, orientation: Orientation) -> Self {
        self.pair_orientation = orientation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = DetectorConfig::new()
            .with_cross_coupled(true)
            .with_min_self_symmetric_fingers(0)
            .with_pair_orientation(Orientation::Horizontal);
        assert!(config.cross_coupled);
        assert!(!config.propagate);
        assert_eq!(config.min_self_symmetric_fingers, 2);
        assert_eq!(config.pair_orientation, Orientation::Horizontal);
    }
}
