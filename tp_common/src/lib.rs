//! # TP Common Library
//!
//! Shared machine-facing types for the trajectory planner workspace:
//! path geometry, the 9-coordinate machine pose, per-axis enable masks,
//! and the [`interface::MotionInterface`] capability trait through which
//! the planning core talks to the host motion controller.
//!
//! Everything here is `Copy`-friendly and allocation-free so it can be
//! carried through the hard real-time cycle.

pub mod cart;
pub mod circle;
pub mod enables;
pub mod interface;
pub mod pose;
pub mod types;

pub use cart::Cart;
pub use pose::Pose;
