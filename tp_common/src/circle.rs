//! Circular/helical path primitive.
//!
//! Built once from the commanded start/end points, circle center, plane
//! normal, and full-turn count. Parameterized by swept angle; the
//! helical displacement along the normal grows linearly with the angle,
//! so mapping consumed arc length to an angle fraction is exact.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::cart::{CART_FUZZ, Cart};

/// Circle/helix geometry, fully precomputed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Circle center, shifted into the plane of the start point.
    center: Cart,
    /// Unit plane normal.
    normal: Cart,
    /// Unit vector from center toward the start point (in plane).
    r_tan: Cart,
    /// `normal × r_tan` — completes the in-plane frame.
    r_perp: Cart,
    /// Axial displacement over the whole arc.
    helix: Cart,
    /// Circle radius.
    radius: f64,
    /// Total included angle, including full revolutions [rad].
    angle: f64,
}

impl Circle {
    /// Build a circle/helix from commanded geometry.
    ///
    /// The in-plane angle from start to end is normalized into
    /// (0, 2π]; `turn > 0` adds that many extra full revolutions.
    /// Returns `None` for a degenerate normal or a zero radius.
    pub fn from_points(
        start: Cart,
        end: Cart,
        center: Cart,
        normal: Cart,
        turn: i32,
    ) -> Option<Self> {
        let normal = normal.unit()?;

        // Project the center into the plane containing the start point,
        // so the start has no axial offset in the circle frame.
        let v_start = start - center;
        let axial_start = v_start.dot(&normal);
        let center = center + normal.scale(axial_start);

        let r_tan_full = start - center;
        let radius = r_tan_full.magnitude();
        if radius < CART_FUZZ {
            return None;
        }
        let r_tan = r_tan_full.unit()?;
        let r_perp = normal.cross(&r_tan);

        let v_end = end - center;
        let axial_end = v_end.dot(&normal);
        let in_plane_end = v_end - normal.scale(axial_end);

        let mut angle = in_plane_end.dot(&r_perp).atan2(in_plane_end.dot(&r_tan));
        if angle <= CART_FUZZ {
            // Coincident or negative projection wraps to a full/positive sweep.
            angle += 2.0 * PI;
        }
        if turn > 0 {
            angle += f64::from(turn) * 2.0 * PI;
        }

        Some(Self {
            center,
            normal,
            r_tan,
            r_perp,
            helix: normal.scale(axial_end),
            radius,
            angle,
        })
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Total included angle [rad].
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Total path length: planar arc combined with the helical rise.
    pub fn arc_length(&self) -> f64 {
        let planar = self.radius * self.angle;
        (planar * planar + self.helix.mag_sq()).sqrt()
    }

    /// Point on the path at the given swept angle.
    pub fn point_at(&self, angle: f64) -> Cart {
        let angle = angle.clamp(0.0, self.angle);
        let frac = if self.angle > 0.0 {
            angle / self.angle
        } else {
            0.0
        };
        self.center
            + self.r_tan.scale(self.radius * angle.cos())
            + self.r_perp.scale(self.radius * angle.sin())
            + self.helix.scale(frac)
    }

    /// Unit tangent to the path at the given swept angle.
    pub fn tangent_at(&self, angle: f64) -> Cart {
        let angle = angle.clamp(0.0, self.angle);
        // d/dθ of point_at: planar rotation plus the constant axial rate.
        let planar = (self.r_perp.scale(angle.cos()) - self.r_tan.scale(angle.sin()))
            .scale(self.radius);
        let axial = if self.angle > 0.0 {
            self.helix.scale(1.0 / self.angle)
        } else {
            Cart::ZERO
        };
        (planar + axial).unit().unwrap_or(self.r_perp)
    }

    /// Swept angle corresponding to a consumed arc length.
    #[inline]
    pub fn angle_at_length(&self, length: f64) -> f64 {
        let total = self.arc_length();
        if total < CART_FUZZ {
            0.0
        } else {
            (length / total).clamp(0.0, 1.0) * self.angle
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
