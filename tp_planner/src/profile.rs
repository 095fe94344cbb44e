//! Jerk-limited ("S-curve") kinematic profiler.
//!
//! Pure, stateless functions over scalar path distance. All entry
//! points share one profile model: the symmetric 7-phase velocity
//! profile (jerk-up, constant acceleration, jerk-down — optional
//! cruise — jerk-up, constant deceleration, jerk-down). A jerk-limited
//! velocity ramp between `v1` and `v2` under that model is
//! point-symmetric about its midpoint, so it covers distance
//! `(v1 + v2)/2 · T` with `T` the ramp duration:
//!
//! - `Δv ≥ a²/j` — trapezoidal acceleration: `T = Δv/a + a/j`
//! - `Δv < a²/j` — triangular acceleration: `T = 2·√(Δv/j)`
//!
//! Near-zero distances and velocities clamp to zero; no path returns a
//! negative or NaN result.

use crate::error::TpError;

/// Distances and velocities below this are treated as zero.
pub const PROFILE_EPS: f64 = 1e-9;

/// Fixed iteration count for the end-speed solver. Bounded so the
/// real-time cycle cost is constant.
const BISECT_ITERS: u32 = 64;

/// Doubling steps used to bracket the end-speed solution.
const BRACKET_ITERS: u32 = 32;

#[inline]
fn limits_valid(max_acc: f64, max_jerk: f64) -> bool {
    max_acc > 0.0 && max_jerk > 0.0 && max_acc.is_finite() && max_jerk.is_finite()
}

/// Duration of the fastest jerk-limited velocity change of `dv ≥ 0`.
fn ramp_time(dv: f64, max_acc: f64, max_jerk: f64) -> f64 {
    if dv <= PROFILE_EPS {
        return 0.0;
    }
    // Peak acceleration a triangular ramp would reach is √(dv·j).
    if dv * max_jerk >= max_acc * max_acc {
        dv / max_acc + max_acc / max_jerk
    } else {
        2.0 * (dv / max_jerk).sqrt()
    }
}

/// Distance covered by the fastest jerk-limited ramp between two
/// non-negative velocities (either direction).
fn ramp_distance(v1: f64, v2: f64, max_acc: f64, max_jerk: f64) -> f64 {
    let dv = (v2 - v1).abs();
    0.5 * (v1 + v2) * ramp_time(dv, max_acc, max_jerk)
}

/// Highest speed reachable by a rest-to-rest profile over `distance`.
///
/// Monotonically non-decreasing in `distance`, `max_acc`, and
/// `max_jerk`; zero distance yields zero speed.
pub fn max_reachable_speed(distance: f64, max_acc: f64, max_jerk: f64) -> Result<f64, TpError> {
    if !limits_valid(max_acc, max_jerk) {
        return Err(TpError::InvalidLimit {
            name: "max_acc/max_jerk",
            value: if max_acc <= 0.0 { max_acc } else { max_jerk },
        });
    }
    if distance <= PROFILE_EPS {
        return Ok(0.0);
    }

    // Rest-to-rest: d = ramp(0→v) + ramp(v→0) = v·T(v).
    // Triangular acceleration: d = 2·v^(3/2)/√j.
    let v_tri = (0.5 * distance * max_jerk.sqrt()).powf(2.0 / 3.0);
    let v_threshold = max_acc * max_acc / max_jerk;
    let v = if v_tri <= v_threshold {
        v_tri
    } else {
        // Trapezoidal acceleration: d = v²/a + v·a/j.
        let b = v_threshold;
        0.5 * (-b + (b * b + 4.0 * distance * max_acc).sqrt())
    };
    Ok(v.max(0.0))
}

/// Highest peak speed of a profile over `distance` that starts at rest
/// and ends at `end_speed`. The result is always ≥ `end_speed`.
pub fn max_reachable_speed_to_end_speed(
    distance: f64,
    end_speed: f64,
    max_acc: f64,
    max_jerk: f64,
) -> Result<f64, TpError> {
    if !limits_valid(max_acc, max_jerk) {
        return Err(TpError::InvalidLimit {
            name: "max_acc/max_jerk",
            value: if max_acc <= 0.0 { max_acc } else { max_jerk },
        });
    }
    let end_speed = end_speed.max(0.0);
    if distance <= PROFILE_EPS {
        return Ok(end_speed);
    }

    // Total distance as a function of the peak: accelerate from rest to
    // v, then decelerate to end_speed. Strictly increasing in v.
    let total = |v: f64| {
        ramp_distance(0.0, v, max_acc, max_jerk) + ramp_distance(end_speed, v, max_acc, max_jerk)
    };

    // Not enough room even to reach end_speed from rest — floor at
    // end_speed per the profile contract.
    if total(end_speed) >= distance {
        return Ok(end_speed);
    }

    // Bracket the solution, then bisect a fixed number of iterations.
    let mut lo = end_speed;
    let mut hi = (max_reachable_speed(distance, max_acc, max_jerk)? + end_speed).max(lo + 1.0);
    let mut iters = 0;
    while total(hi) < distance && iters < BRACKET_ITERS {
        hi *= 2.0;
        iters += 1;
    }
    for _ in 0..BISECT_ITERS {
        let mid = 0.5 * (lo + hi);
        if total(mid) < distance {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(lo.max(end_speed))
}

/// Distance consumed by the fastest jerk-limited stop from `velocity`
/// with the given starting acceleration.
///
/// A positive `initial_acc` (still speeding up) first ramps to zero at
/// the jerk limit, charging the distance and velocity gained. A
/// negative `initial_acc` (already braking) is treated as zero, which
/// over-estimates the distance — the executor brakes early, never late.
pub fn stopping_distance(velocity: f64, initial_acc: f64, max_acc: f64, max_jerk: f64) -> f64 {
    if !limits_valid(max_acc, max_jerk) {
        return 0.0;
    }
    let mut v = velocity.max(0.0);
    if v <= PROFILE_EPS {
        return 0.0;
    }

    let mut dist = 0.0;
    if initial_acc > PROFILE_EPS {
        let a0 = initial_acc.min(max_acc);
        let t = a0 / max_jerk;
        // a(τ) = a0 − j·τ over [0, t]: closed-form distance and Δv.
        dist += v * t + 0.5 * a0 * t * t - max_jerk * t * t * t / 6.0;
        v += 0.5 * a0 * t;
    }
    dist + ramp_distance(0.0, v, max_acc, max_jerk)
}

/// Distance consumed transitioning between two velocities (either
/// direction) under the same bounds. Zero when the velocities match.
///
/// `initial_acc` is charged as in [`stopping_distance`] when it drives
/// the velocity away from the target.
pub fn distance_to_change_speed(
    from_vel: f64,
    to_vel: f64,
    initial_acc: f64,
    max_acc: f64,
    max_jerk: f64,
) -> f64 {
    if !limits_valid(max_acc, max_jerk) {
        return 0.0;
    }
    let mut from = from_vel.max(0.0);
    let to = to_vel.max(0.0);
    if (from - to).abs() <= PROFILE_EPS {
        return 0.0;
    }

    let mut dist = 0.0;
    if to < from && initial_acc > PROFILE_EPS {
        // Still speeding up while needing to slow down: ramp out first.
        let a0 = initial_acc.min(max_acc);
        let t = a0 / max_jerk;
        dist += from * t + 0.5 * a0 * t * t - max_jerk * t * t * t / 6.0;
        from += 0.5 * a0 * t;
    } else if to > from && initial_acc < -PROFILE_EPS {
        // Still braking while needing to speed up: ramp out first.
        let a0 = (-initial_acc).min(max_acc);
        let t = a0 / max_jerk;
        dist += (from * t - 0.5 * a0 * t * t + max_jerk * t * t * t / 6.0).max(0.0);
        from = (from - 0.5 * a0 * t).max(0.0);
    }
    dist + ramp_distance(from, to, max_acc, max_jerk)
}

// ─── Tests ──────────────────────────────────────────────────────────
