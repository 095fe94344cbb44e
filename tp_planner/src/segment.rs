//! Path segment data model.
//!
//! One commanded path primitive (line or circular/helical arc) with
//! its kinematic limits and per-cycle execution bookkeeping. Segments
//! are `Copy` so the queue arena can be pre-allocated and slots reused
//! without heap traffic.

use tp_common::cart::CART_FUZZ;
use tp_common::circle::Circle;
use tp_common::enables::AxisEnables;
use tp_common::types::{MotionType, SourceTag};
use tp_common::{Cart, Pose};

use crate::blend::Kink;
use crate::error::TpError;

/// Geometry of one commanded path primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentGeometry {
    Line {
        start: Pose,
        end: Pose,
    },
    Arc {
        start: Pose,
        end: Pose,
        circle: Circle,
    },
}

/// Kinematic limits requested for one segment.
///
/// All four values must be strictly positive; validated at
/// construction so the executor never sees a non-positive bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLimits {
    /// Requested (terminal) velocity [uu/s].
    pub req_vel: f64,
    /// Initial velocity ceiling from the producer [uu/s].
    pub max_vel: f64,
    /// Acceleration bound [uu/s²].
    pub max_acc: f64,
    /// Jerk bound [uu/s³].
    pub max_jerk: f64,
}

impl SegmentLimits {
    fn validate(&self) -> Result<(), TpError> {
        for (name, value) in [
            ("req_vel", self.req_vel),
            ("max_vel", self.max_vel),
            ("max_acc", self.max_acc),
            ("max_jerk", self.max_jerk),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(TpError::InvalidLimit { name, value });
            }
        }
        Ok(())
    }
}

/// One commanded path primitive plus its execution state.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Monotonically assigned sequence number, unique while queued.
    pub id: u32,
    pub geometry: SegmentGeometry,
    pub motion_type: MotionType,
    pub limits: SegmentLimits,
    /// Per-axis output enables, echoed when the segment activates.
    pub enables: AxisEnables,
    /// Requires the spindle to be at speed before starting (carried;
    /// spindle logic lives outside this core).
    pub at_speed: bool,
    /// Rotary axis to unlock for the duration of this move.
    pub rotary_index: Option<u8>,
    /// Opaque producer tag, carried through unmodified.
    pub tag: SourceTag,

    // ── Execution state ──
    /// Total path length [uu].
    pub length: f64,
    /// Arc length consumed so far [uu].
    pub progress: f64,
    /// Velocity this segment may carry into its successor [uu/s].
    /// Zero until a blendable successor is queued behind it.
    pub final_vel: f64,
    /// Direction discontinuity at entry, against the predecessor.
    pub kink: Kink,
    /// Rotary unlock requested but not yet confirmed.
    pub rotary_pending: bool,
}

/// Completion tolerance on consumed path length [uu].
pub const SEGMENT_DONE_EPS: f64 = 1e-9;

impl Segment {
    /// Build a linear segment. Rejects non-positive limits and
    /// zero-length geometry (no translation and no rotary/auxiliary
    /// displacement).
    #[allow(clippy::too_many_arguments)]
    pub fn line(
        id: u32,
        start: Pose,
        end: Pose,
        motion_type: MotionType,
        limits: SegmentLimits,
        enables: AxisEnables,
        at_speed: bool,
        rotary_index: Option<u8>,
        tag: SourceTag,
    ) -> Result<Self, TpError> {
        limits.validate()?;

        let tran_len = start.tran.distance_to(&end.tran);
        let length = if tran_len > CART_FUZZ {
            tran_len
        } else {
            // Rotary-only or auxiliary-only move: progress is measured
            // on the largest displaced coordinate.
            end.max_aux_delta(&start)
        };
        if length <= CART_FUZZ {
            return Err(TpError::DegenerateGeometry("zero-length line"));
        }

        Ok(Self {
            id,
            geometry: SegmentGeometry::Line { start, end },
            motion_type,
            limits,
            enables,
            at_speed,
            rotary_index,
            tag,
            length,
            progress: 0.0,
            final_vel: 0.0,
            kink: Kink::stop(),
            rotary_pending: rotary_index.is_some(),
        })
    }

    /// Build a circular/helical segment. Rejects non-positive limits,
    /// a zero-radius circle, and a degenerate plane normal.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        id: u32,
        start: Pose,
        end: Pose,
        center: Cart,
        normal: Cart,
        turn: i32,
        motion_type: MotionType,
        limits: SegmentLimits,
        enables: AxisEnables,
        at_speed: bool,
        tag: SourceTag,
    ) -> Result<Self, TpError> {
        limits.validate()?;

        let circle = Circle::from_points(start.tran, end.tran, center, normal, turn)
            .ok_or(TpError::DegenerateGeometry("zero-radius arc"))?;
        let length = circle.arc_length();
        if length <= CART_FUZZ {
            return Err(TpError::DegenerateGeometry("zero-length arc"));
        }

        Ok(Self {
            id,
            geometry: SegmentGeometry::Arc { start, end, circle },
            motion_type,
            limits,
            enables,
            at_speed,
            rotary_index: None,
            tag,
            length,
            progress: 0.0,
            final_vel: 0.0,
            kink: Kink::stop(),
            rotary_pending: false,
        })
    }

    /// Path length not yet consumed.
    #[inline]
    pub fn remaining(&self) -> f64 {
        (self.length - self.progress).max(0.0)
    }

    /// Whether the segment has been fully traversed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.progress >= self.length - SEGMENT_DONE_EPS
    }

    /// Commanded end pose.
    pub fn end_pose(&self) -> Pose {
        match self.geometry {
            SegmentGeometry::Line { end, .. } | SegmentGeometry::Arc { end, .. } => end,
        }
    }

    /// Pose at a given consumed path length.
    pub fn pose_at(&self, progress: f64) -> Pose {
        let t = if self.length > CART_FUZZ {
            (progress / self.length).clamp(0.0, 1.0)
        } else {
            1.0
        };
        match self.geometry {
            SegmentGeometry::Line { start, end } => start.lerp(&end, t),
            SegmentGeometry::Arc { start, end, circle } => {
                // Cartesian point from the circle; rotary/auxiliary
                // coordinates interpolate linearly with the angle.
                let mut pose = start.lerp(&end, t);
                pose.tran = circle.point_at(circle.angle_at_length(progress));
                pose
            }
        }
    }

    /// Unit direction of travel at a given consumed path length.
    ///
    /// Rotary-only lines have no Cartesian direction and report zero.
    pub fn direction_at(&self, progress: f64) -> Cart {
        match self.geometry {
            SegmentGeometry::Line { start, end } => {
                (end.tran - start.tran).unit().unwrap_or(Cart::ZERO)
            }
            SegmentGeometry::Arc { circle, .. } => {
                circle.tangent_at(circle.angle_at_length(progress))
            }
        }
    }

    /// Unit direction at entry.
    #[inline]
    pub fn start_direction(&self) -> Cart {
        self.direction_at(0.0)
    }

    /// Unit direction at exit.
    #[inline]
    pub fn end_direction(&self) -> Cart {
        self.direction_at(self.length)
    }
}

impl Default for Segment {
    /// Degenerate placeholder used to pre-fill queue arena slots.
    /// Never executed: real segments always come from the validating
    /// constructors.
    fn default() -> Self {
        Self {
            id: 0,
            geometry: SegmentGeometry::Line {
                start: Pose::ZERO,
                end: Pose::ZERO,
            },
            motion_type: MotionType::None,
            limits: SegmentLimits {
                req_vel: 0.0,
                max_vel: 0.0,
                max_acc: 0.0,
                max_jerk: 0.0,
            },
            enables: AxisEnables::empty(),
            at_speed: false,
            rotary_index: None,
            tag: SourceTag::default(),
            length: 0.0,
            progress: 0.0,
            final_vel: 0.0,
            kink: Kink::stop(),
            rotary_pending: false,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
