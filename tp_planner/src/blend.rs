//! Blend geometry between consecutive path segments.
//!
//! Operates on the unit direction vectors at the join of two segments.
//! The half-angle ("bisector") convention sizes the corner: a
//! straight-through join measures π/2, perpendicular directions π/4,
//! and a full reversal 0. The smaller the angle, the sharper the
//! corner and the lower the velocity that can be carried across it.

use std::f64::consts::FRAC_PI_2;

use tp_common::Cart;

/// Half-angle between the reversed incoming direction and the outgoing
/// direction. Inputs must be unit vectors.
pub fn intersection_angle(incoming: &Cart, outgoing: &Cart) -> f64 {
    let dot = incoming.dot(outgoing).clamp(-1.0, 1.0);
    // Angle between -incoming and outgoing is acos(-dot); halve it.
    (-dot).acos() / 2.0
}

/// Tolerance-based colinearity test (cosine ≈ +1).
pub fn is_parallel(u1: &Cart, u2: &Cart, tolerance: f64) -> bool {
    match (u1.unit(), u2.unit()) {
        (Some(a), Some(b)) => a.dot(&b) >= 1.0 - tolerance,
        _ => false,
    }
}

/// Tolerance-based reversal test (cosine ≈ −1).
pub fn is_anti_parallel(u1: &Cart, u2: &Cart, tolerance: f64) -> bool {
    match (u1.unit(), u2.unit()) {
        (Some(a), Some(b)) => a.dot(&b) <= -1.0 + tolerance,
        _ => false,
    }
}

/// Saturate `value` into `[-limit, limit]`.
pub fn clamp_magnitude(value: f64, limit: f64) -> f64 {
    let limit = limit.abs();
    value.clamp(-limit, limit)
}

/// Corner record at a segment entry.
///
/// Describes the direction discontinuity against the preceding segment
/// and the velocity that may legally be carried across it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kink {
    /// Bisector half-angle at the join [rad].
    pub angle: f64,
    /// Velocity cap imposed by the corner [uu/s].
    pub vel_limit: f64,
    /// Whether a continuous blend is geometrically permitted.
    pub blendable: bool,
}

impl Kink {
    /// Entry from rest: no predecessor, or blending forbidden.
    pub const fn stop() -> Self {
        Self {
            angle: 0.0,
            vel_limit: 0.0,
            blendable: false,
        }
    }

    /// Straight-through join: no corner constraint.
    pub const fn tangent() -> Self {
        Self {
            angle: FRAC_PI_2,
            vel_limit: f64::INFINITY,
            blendable: true,
        }
    }
}

impl Default for Kink {
    fn default() -> Self {
        Self::stop()
    }
}

/// Blend tuning shared by all joins.
#[derive(Debug, Clone, Copy)]
pub struct BlendParams {
    /// Whether blending is enabled at all.
    pub enable: bool,
    /// cosθ at or below which a join counts as fully tangent.
    pub tangent_kink_ratio: f64,
    /// Colinearity tolerance for the (anti)parallel tests.
    pub parallel_tol: f64,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            enable: true,
            tangent_kink_ratio: 0.1,
            parallel_tol: 1e-6,
        }
    }
}

/// Evaluate the join between an incoming and an outgoing unit
/// direction under the per-cycle acceleration budget `max_acc · dt`.
///
/// The velocity discontinuity across a corner with half-angle θ is
/// `2·v·cosθ`, so the carried velocity is capped at
/// `max_acc·dt / (2·cosθ)`. Joins sharper than the parallel tolerance
/// allows (path reversal) forbid blending entirely — the executor
/// falls back to a stop at the join.
pub fn evaluate_kink(
    incoming: &Cart,
    outgoing: &Cart,
    max_acc: f64,
    cycle_time: f64,
    params: &BlendParams,
) -> Kink {
    if !params.enable {
        return Kink::stop();
    }
    if is_anti_parallel(incoming, outgoing, params.parallel_tol) {
        return Kink::stop();
    }
    if is_parallel(incoming, outgoing, params.parallel_tol) {
        return Kink::tangent();
    }

    let angle = intersection_angle(incoming, outgoing);
    let cos_theta = angle.cos();
    if cos_theta <= params.tangent_kink_ratio {
        // Corner shallow enough to treat as tangent.
        return Kink {
            angle,
            vel_limit: f64::INFINITY,
            blendable: true,
        };
    }

    Kink {
        angle,
        vel_limit: max_acc * cycle_time / (2.0 * cos_theta),
        blendable: true,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
