use serde::{Deserialize, Serialize};

/// Plain mutable (x, y) record held inside every pooled vector.
///
/// This is also the value type used for temporaries inside multi-step
/// geometry, so its products never touch the pool.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub x: f64,
    pub y: f64,
}

impl CoordinatePair {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
    #[inline(always)]
    pub fn nan() -> Self { Self::new(f64::NAN, f64::NAN) }

    #[inline(always)]
    pub fn set(&mut self, x: f64, y: f64) { self.x = x; self.y = y; }
    #[inline(always)]
    pub fn add(&mut self, x: f64, y: f64) { self.x += x; self.y += y; }
    #[inline(always)]
    pub fn subtract(&mut self, x: f64, y: f64) { self.x -= x; self.y -= y; }
    #[inline(always)]
    pub fn copy_from(&mut self, other: &Self) { self.x = other.x; self.y = other.y; }

    #[inline(always)]
    pub fn plus(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y) }
    #[inline(always)]
    pub fn minus(self, other: Self) -> Self { Self::new(self.x - other.x, self.y - other.y) }
    #[inline(always)]
    pub fn scaled(self, k: f64) -> Self { Self::new(self.x * k, self.y * k) }

    #[inline(always)]
    pub fn length_squared(self) -> f64 { self.x * self.x + self.y * self.y }
    #[inline(always)]
    pub fn length(self) -> f64 { self.length_squared().sqrt() }

    /// Dot product. Never releases anything; used by algorithms that still need
    /// the operand afterwards.
    #[inline(always)]
    pub fn dot(self, other: Self) -> f64 { self.x * other.x + self.y * other.y }
    /// Scalar magnitude of the 2-D cross product.
    #[inline(always)]
    pub fn cross(self, other: Self) -> f64 { self.x * other.y - self.y * other.x }
    /// Left normal dotted with `other`.
    #[inline(always)]
    pub fn perp(self, other: Self) -> f64 { self.left_normal().dot(other) }

    /// `(y, -x)`
    #[inline(always)]
    pub fn left_normal(self) -> Self { Self::new(self.y, -self.x) }
    /// `(-y, x)`
    #[inline(always)]
    pub fn right_normal(self) -> Self { Self::new(-self.y, self.x) }

    /// Neither component is NaN or infinite.
    #[inline(always)]
    pub fn is_valid(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

impl From<(f64, f64)> for CoordinatePair {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<CoordinatePair> for (f64, f64) {
    fn from(c: CoordinatePair) -> Self {
        (c.x, c.y)
    }
}

/// Converts an angle (in radians) to a unit coordinate pair.
#[inline(always)]
pub fn angle_to_pair(theta: f64) -> CoordinatePair { CoordinatePair::new(theta.cos(), theta.sin()) }
