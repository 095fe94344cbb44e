//! # Trajectory Planner Core
//!
//! Bounded, zero-allocation motion-command queue coupled to a
//! jerk-limited ("S-curve") velocity planner and segment-blending
//! engine. Executed once per fixed-duration control cycle to produce
//! commanded position/velocity/acceleration for a multi-axis machine.
//!
//! ## Architecture
//!
//! 1. **[`profile`]** — pure 7-phase jerk-limited kinematics over
//!    scalar path distance.
//! 2. **[`blend`]** — join geometry between consecutive segments.
//! 3. **[`segment`]** — the path-primitive data model (line/arc).
//! 4. **[`queue`]** — fixed-capacity ring buffer of segments.
//! 5. **[`planner`]** — the per-cycle executor and command surface.
//!
//! ## Real-Time Contract
//!
//! All state is pre-allocated when a planner is created. The cycle
//! path ([`planner::Planner::run_cycle`]) performs no allocation, no
//! logging, and no unbounded loops; hardware and status access go
//! through the bound [`tp_common::interface::MotionInterface`] only.

pub mod blend;
pub mod config;
pub mod error;
pub mod planner;
pub mod profile;
pub mod queue;
pub mod segment;
pub mod state;

pub use error::TpError;
pub use planner::Planner;
pub use queue::SegmentQueue;
pub use segment::Segment;
pub use state::PlannerState;
