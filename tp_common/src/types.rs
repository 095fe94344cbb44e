//! Motion classification, planner selection, and source tagging.

use serde::{Deserialize, Serialize};

/// Commanded motion category, carried through for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionType {
    /// No motion.
    None = 0,
    /// Rapid traverse.
    Traverse = 1,
    /// Feed-rate linear move.
    Feed = 2,
    /// Circular/helical move.
    Arc = 3,
    /// Tool change motion.
    Toolchange = 4,
    /// Probing move.
    Probing = 5,
    /// Indexed rotary move.
    IndexRotary = 6,
}

impl MotionType {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Traverse),
            2 => Some(Self::Feed),
            3 => Some(Self::Arc),
            4 => Some(Self::Toolchange),
            5 => Some(Self::Probing),
            6 => Some(Self::IndexRotary),
            _ => None,
        }
    }
}

impl Default for MotionType {
    fn default() -> Self {
        Self::None
    }
}

/// Velocity-profile family selected by the host, polled once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlannerType {
    /// Trapezoidal velocity profile — acceleration steps instantly.
    Trapezoidal = 0,
    /// Jerk-limited S-curve profile.
    SCurve = 1,
}

impl PlannerType {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Trapezoidal),
            1 => Some(Self::SCurve),
            _ => None,
        }
    }
}

impl Default for PlannerType {
    fn default() -> Self {
        Self::SCurve
    }
}

/// Opaque per-segment source tag.
///
/// Assigned by the producer (typically an interpreter line reference)
/// and carried through the planner unmodified for traceability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceTag(pub u64);

// ─── Tests ──────────────────────────────────────────────────────────
