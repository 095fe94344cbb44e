//! Per-axis output-enable bitmask.
//!
//! Carried on every segment and echoed through the status-write
//! interface when that segment becomes active. Unknown bits are
//! preserved so the host can pass vendor-specific flags through
//! the planner unmodified.

use bitflags::bitflags;

bitflags! {
    /// Output-enable mask, one bit per machine axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AxisEnables: u32 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
        const A = 1 << 3;
        const B = 1 << 4;
        const C = 1 << 5;
        const U = 1 << 6;
        const V = 1 << 7;
        const W = 1 << 8;
    }
}

impl AxisEnables {
    /// Build from a raw mask, preserving unknown bits.
    #[inline]
    pub const fn from_mask(mask: u32) -> Self {
        Self::from_bits_retain(mask)
    }

    /// Raw mask value.
    #[inline]
    pub const fn mask(self) -> u32 {
        self.bits()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_raw_mask() {
        let e = AxisEnables::from_mask(0xFF);
        assert_eq!(e.mask(), 0xFF);
        assert!(e.contains(AxisEnables::X | AxisEnables::V));
        assert!(!e.contains(AxisEnables::W));
    }

    #[test]
    fn preserves_unknown_bits() {
        let e = AxisEnables::from_mask(0x8000_0001);
        assert_eq!(e.mask(), 0x8000_0001);
    }
}
