//! Motion-controller capability trait.
//!
//! The single boundary between the planning core and the host machine.
//! Status reads are polled once per cycle; status writes are invoked at
//! most once per cycle; the I/O callbacks default to no-ops so a host
//! implements only what its hardware supports. Implementations must be
//! non-blocking — they run inside the hard real-time cycle.

use crate::cart::Cart;
use crate::enables::AxisEnables;
use crate::pose::Pose;
use crate::types::PlannerType;

pub trait MotionInterface {
    // ── Status reads (polled once per cycle) ──

    /// Velocity-profile family selected by the host.
    fn planner_type(&self) -> PlannerType;

    /// Machine jerk limit, used when a segment carries no jerk bound
    /// of its own [uu/s³].
    fn jerk_limit(&self) -> f64;

    /// Control cycle period [s].
    fn cycle_time(&self) -> f64;

    /// Axes newly enabled by the host since the last cycle.
    fn enables_new(&self) -> AxisEnables;

    // ── Status writes (invoked at most once per cycle) ──

    /// Scalar path distance remaining on the active segment.
    fn set_distance_to_go(&mut self, distance: f64);

    /// Commanded path velocity [uu/s].
    fn set_current_vel(&mut self, vel: f64);

    /// Commanded path acceleration [uu/s²].
    fn set_current_acc(&mut self, acc: f64);

    /// Commanded path jerk [uu/s³].
    fn set_current_jerk(&mut self, jerk: f64);

    /// Velocity requested for the active segment [uu/s].
    fn set_requested_vel(&mut self, vel: f64);

    /// Per-coordinate distance to go.
    fn set_dtg_pose(&mut self, dtg: &Pose);

    /// Enable mask of the active segment.
    fn set_enables_queued(&mut self, enables: AxisEnables);

    /// Spindle-synchronization flag (passed through, never interpreted).
    fn set_spindle_sync(&mut self, sync: bool);

    /// Unit direction of travel.
    fn set_current_dir(&mut self, dir: &Cart);

    // ── Optional I/O callbacks (default: no-op) ──

    /// Write a digital output.
    fn dio_write(&mut self, _index: u16, _value: bool) {}

    /// Write an analog output.
    fn aio_write(&mut self, _index: u16, _value: f64) {}

    /// Request unlock (or re-lock) of an indexing rotary axis.
    fn set_rotary_unlock(&mut self, _axis: u8, _unlock: bool) {}

    /// Whether the indexing rotary axis has confirmed unlock.
    fn rotary_is_unlocked(&self, _axis: u8) -> bool {
        true
    }

    /// Host velocity limit for one axis [uu/s].
    fn axis_vel_limit(&self, _axis: usize) -> f64 {
        f64::INFINITY
    }

    /// Host acceleration limit for one axis [uu/s²].
    fn axis_acc_limit(&self, _axis: usize) -> f64 {
        f64::INFINITY
    }
}

/// Standalone stand-in: fixed status reads, discarded writes.
///
/// Used by tests and benches, and by hosts that drive the planner
/// without a live motion controller.
#[derive(Debug, Clone)]
pub struct StandaloneInterface {
    pub planner_type: PlannerType,
    pub jerk_limit: f64,
    pub cycle_time: f64,
    pub enables_new: AxisEnables,
}

impl Default for StandaloneInterface {
    fn default() -> Self {
        Self {
            planner_type: PlannerType::SCurve,
            jerk_limit: 10_000.0,
            cycle_time: 0.001,
            enables_new: AxisEnables::from_mask(0xFF),
        }
    }
}

impl MotionInterface for StandaloneInterface {
    fn planner_type(&self) -> PlannerType {
        self.planner_type
    }

    fn jerk_limit(&self) -> f64 {
        self.jerk_limit
    }

    fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    fn enables_new(&self) -> AxisEnables {
        self.enables_new
    }

    fn set_distance_to_go(&mut self, _distance: f64) {}
    fn set_current_vel(&mut self, _vel: f64) {}
    fn set_current_acc(&mut self, _acc: f64) {}
    fn set_current_jerk(&mut self, _jerk: f64) {}
    fn set_requested_vel(&mut self, _vel: f64) {}
    fn set_dtg_pose(&mut self, _dtg: &Pose) {}
    fn set_enables_queued(&mut self, _enables: AxisEnables) {}
    fn set_spindle_sync(&mut self, _sync: bool) {}
    fn set_current_dir(&mut self, _dir: &Cart) {}
}

// ─── Tests ──────────────────────────────────────────────────────────
