//! Cartesian 3-vector math.
//!
//! Fixed-arity vector operations for path geometry. All operations are
//! allocation-free; unitizing a near-zero vector reports `None` rather
//! than producing NaN components.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Magnitude below which a vector cannot be unitized.
pub const CART_FUZZ: f64 = 1e-12;

/// A Cartesian 3-vector [user units].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cart {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product (`self` × `other`).
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Squared magnitude.
    #[inline]
    pub fn mag_sq(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean magnitude.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.mag_sq().sqrt()
    }

    /// Component-wise scale.
    #[inline]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Unit vector in the same direction, or `None` when the magnitude
    /// is below [`CART_FUZZ`].
    pub fn unit(&self) -> Option<Self> {
        let mag = self.magnitude();
        if mag < CART_FUZZ {
            None
        } else {
            Some(self.scale(1.0 / mag))
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (*other - *self).magnitude()
    }

    /// Component by axis index (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn component(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Add for Cart {
    type Output = Cart;

    #[inline]
    fn add(self, rhs: Cart) -> Cart {
        Cart::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Cart {
    type Output = Cart;

    #[inline]
    fn sub(self, rhs: Cart) -> Cart {
        Cart::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Cart {
    type Output = Cart;

    #[inline]
    fn neg(self) -> Cart {
        Cart::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Cart {
    type Output = Cart;

    #[inline]
    fn mul(self, rhs: f64) -> Cart {
        self.scale(rhs)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
