//! Haptic feedback port.
//!
//! Gesture components call `pulse` fire-and-forget; implementations must not
//! block the gesture context.

use std::fmt::Debug;

/// Relative strength of a tactile pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticIntensity {
    /// Time quantization steps, axis breaks and re-snaps.
    Light,
    /// Drag activation.
    Medium,
}

/// Platform haptic service.
pub trait HapticFeedback: Send + Sync + Debug {
    fn pulse(&self, intensity: HapticIntensity);
}

/// Haptics sink for hosts without a vibration motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl HapticFeedback for NoopHaptics {
    fn pulse(&self, _intensity: HapticIntensity) {}
}
