//! 9-coordinate machine pose.
//!
//! Cartesian translation plus rotary `a,b,c` and auxiliary `u,v,w`
//! coordinates. Linear moves interpolate all nine components together;
//! the planner reports distance-to-go both as a scalar and as a pose.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Commanded machine pose [user units / degrees].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Cartesian translation.
    pub tran: Cart,
    /// Rotary coordinates.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Auxiliary linear coordinates.
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Pose {
    pub const ZERO: Self = Self {
        tran: Cart::ZERO,
        a: 0.0,
        b: 0.0,
        c: 0.0,
        u: 0.0,
        v: 0.0,
        w: 0.0,
    };

    /// Pose with only a translation component.
    #[inline]
    pub const fn from_tran(tran: Cart) -> Self {
        Self {
            tran,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            u: 0.0,
            v: 0.0,
            w: 0.0,
        }
    }

    /// Component-wise difference (`self` − `other`).
    pub fn delta(&self, other: &Self) -> Self {
        Self {
            tran: self.tran - other.tran,
            a: self.a - other.a,
            b: self.b - other.b,
            c: self.c - other.c,
            u: self.u - other.u,
            v: self.v - other.v,
            w: self.w - other.w,
        }
    }

    /// Linear interpolation between two poses, `t` in [0, 1].
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let omt = 1.0 - t;
        Self {
            tran: self.tran.scale(omt) + other.tran.scale(t),
            a: self.a * omt + other.a * t,
            b: self.b * omt + other.b * t,
            c: self.c * omt + other.c * t,
            u: self.u * omt + other.u * t,
            v: self.v * omt + other.v * t,
            w: self.w * omt + other.w * t,
        }
    }

    /// Largest absolute non-translation component of `self − other`.
    ///
    /// Length proxy for rotary-only and auxiliary-only moves, where the
    /// Cartesian displacement is zero.
    pub fn max_aux_delta(&self, other: &Self) -> f64 {
        let d = self.delta(other);
        [d.a, d.b, d.c, d.u, d.v, d.w]
            .into_iter()
            .map(f64::abs)
            .fold(0.0, f64::max)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
