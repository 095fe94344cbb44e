//! Planner error types.
//!
//! Every error is local and recoverable by the caller: a rejected add
//! or command never corrupts the queue or the execution state.

use thiserror::Error;

/// Errors returned by the planner command surface.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TpError {
    /// Add rejected — queue at capacity, state unchanged.
    #[error("segment queue full")]
    QueueFull,

    /// Zero-length line or zero-radius arc.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// Non-positive velocity, acceleration, or jerk argument.
    #[error("invalid limit: {name} = {value}")]
    InvalidLimit { name: &'static str, value: f64 },

    /// Command not legal in the current run state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Cycle or add invoked before the planner was initialized.
    #[error("planner not initialized")]
    NotInitialized,
}

// ─── Tests ──────────────────────────────────────────────────────────
