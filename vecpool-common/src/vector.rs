//! Pooled 2-D vectors.
//!
//! A [`Vector`] owns exactly one coordinate slot taken from the thread's
//! pool. Its lifetime mode is part of its type:
//!
//! * [`Stable`] vectors belong to the caller until released or dropped. They
//!   are only ever passed to operations by reference.
//! * [`Transient`] vectors are meant to be read once. Every operation that
//!   reads one takes it by value and returns its slot to the pool, so a
//!   consumed transient cannot be touched again.
//!
//! Anything that accepts a vector operand takes `impl Operand`.

use crate::coord::{angle_to_pair, CoordinatePair};
use crate::pool;
use std::fmt;
use std::marker::PhantomData;

pub const EPSILON: f64 = 1e-7;
pub const EPSILON_SQUARED: f64 = EPSILON * EPSILON;

/// Runtime view of a vector's lifetime mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifetimeMode {
    Stable,
    Transient,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Stable {}
    impl Sealed for super::Transient {}
}

/// Type-level lifetime mode. Implemented only by [`Stable`] and [`Transient`].
pub trait Lifetime: sealed::Sealed {
    const MODE: LifetimeMode;
}

/// Caller-owned; never released implicitly by an operation.
#[derive(Debug)]
pub enum Stable {}

/// Consumed (and recycled) by the first operation that reads it.
#[derive(Debug)]
pub enum Transient {}

impl Lifetime for Stable {
    const MODE: LifetimeMode = LifetimeMode::Stable;
}

impl Lifetime for Transient {
    const MODE: LifetimeMode = LifetimeMode::Transient;
}

/// The pooled storage behind one vector. Returning it to the pool happens
/// here, so `Vector` itself can be freely re-tagged between modes.
struct Slot {
    // `None` only while `drop` hands the box back.
    pair: Option<Box<CoordinatePair>>,
    // Slots belong to a thread-local pool.
    _not_send: PhantomData<*const ()>,
}

impl Slot {
    fn acquire(x: f64, y: f64) -> Self {
        Self { pair: Some(pool::acquire_pair(x, y)), _not_send: PhantomData }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if let Some(pair) = self.pair.take() {
            pool::release_pair(pair);
        }
    }
}

/// A 2-D vector backed by a pooled coordinate slot.
pub struct Vector<L: Lifetime = Stable> {
    slot: Slot,
    _mode: PhantomData<L>,
}

/// Something a vector operation can read one coordinate pair from.
///
/// Reading a `Vector<Transient>` consumes it and returns its slot to the
/// pool. Reading a `&Vector<Stable>` leaves it untouched.
pub trait Operand {
    fn into_coords(self) -> CoordinatePair;
}

impl Operand for Vector<Transient> {
    fn into_coords(self) -> CoordinatePair {
        let coords = self.coords();
        self.release();
        coords
    }
}

impl Operand for &Vector<Stable> {
    fn into_coords(self) -> CoordinatePair {
        self.coords()
    }
}

impl Operand for CoordinatePair {
    fn into_coords(self) -> CoordinatePair {
        self
    }
}

impl Operand for &CoordinatePair {
    fn into_coords(self) -> CoordinatePair {
        *self
    }
}

impl Vector<Stable> {
    pub fn stable(x: f64, y: f64) -> Self {
        Self::acquire(x, y)
    }
}

impl Vector<Transient> {
    pub fn transient(x: f64, y: f64) -> Self {
        Self::acquire(x, y)
    }
}

impl<L: Lifetime> Vector<L> {
    /// Takes a slot from the pool, set to `(x, y)`.
    pub fn acquire(x: f64, y: f64) -> Self {
        Self { slot: Slot::acquire(x, y), _mode: PhantomData }
    }

    /// Returns this vector's storage to the pool.
    pub fn release(self) {
        drop(self);
    }

    pub fn mode(&self) -> LifetimeMode {
        L::MODE
    }

    #[inline(always)]
    fn pair(&self) -> &CoordinatePair {
        self.slot.pair.as_deref().expect("vector slot is held until drop")
    }

    #[inline(always)]
    fn pair_mut(&mut self) -> &mut CoordinatePair {
        self.slot.pair.as_deref_mut().expect("vector slot is held until drop")
    }

    fn retag<M: Lifetime>(self) -> Vector<M> {
        let Vector { slot, .. } = self;
        Vector { slot, _mode: PhantomData }
    }

    /// Same slot, caller-owned.
    pub fn into_stable(self) -> Vector<Stable> {
        self.retag()
    }

    /// Same slot, consumed by the next operation that reads it.
    pub fn into_transient(self) -> Vector<Transient> {
        self.retag()
    }

    /// Copies the value into a new caller-owned vector.
    pub fn to_stable(&self) -> Vector<Stable> {
        Vector::acquire(self.x(), self.y())
    }

    /// Copies the value into a new transient vector.
    pub fn to_transient(&self) -> Vector<Transient> {
        Vector::acquire(self.x(), self.y())
    }

    #[inline(always)]
    pub fn x(&self) -> f64 {
        self.pair().x
    }

    #[inline(always)]
    pub fn y(&self) -> f64 {
        self.pair().y
    }

    /// The current value as a plain pair.
    #[inline(always)]
    pub fn coords(&self) -> CoordinatePair {
        *self.pair()
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        self.pair_mut().x = x;
        self
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        self.pair_mut().y = y;
        self
    }

    // --- In-place arithmetic ---

    pub fn set_coords(&mut self, x: f64, y: f64) -> &mut Self {
        self.pair_mut().set(x, y);
        self
    }

    pub fn add_coords(&mut self, x: f64, y: f64) -> &mut Self {
        self.pair_mut().add(x, y);
        self
    }

    pub fn subtract_coords(&mut self, x: f64, y: f64) -> &mut Self {
        self.pair_mut().subtract(x, y);
        self
    }

    pub fn add_vector(&mut self, v: impl Operand) -> &mut Self {
        let v = v.into_coords();
        self.add_coords(v.x, v.y)
    }

    pub fn subtract_vector(&mut self, v: impl Operand) -> &mut Self {
        let v = v.into_coords();
        self.subtract_coords(v.x, v.y)
    }

    pub fn copy_from(&mut self, v: impl Operand) -> &mut Self {
        let v = v.into_coords();
        self.pair_mut().copy_from(&v);
        self
    }

    pub fn scale(&mut self, k: f64) -> &mut Self {
        let pair = self.pair_mut();
        pair.x *= k;
        pair.y *= k;
        self
    }

    pub fn negate(&mut self) -> &mut Self {
        self.scale(-1.0)
    }

    pub fn zero(&mut self) -> &mut Self {
        self.set_coords(0.0, 0.0)
    }

    /// Scales to unit length. The zero vector is left as is.
    pub fn normalize(&mut self) -> &mut Self {
        self.set_length(1.0)
    }

    // --- Results in a new Stable vector; `self` is never released ---

    pub fn add_new(&self, v: impl Operand) -> Vector<Stable> {
        let mut out = self.to_stable();
        out.add_vector(v);
        out
    }

    pub fn subtract_new(&self, v: impl Operand) -> Vector<Stable> {
        let mut out = self.to_stable();
        out.subtract_vector(v);
        out
    }

    pub fn scale_new(&self, k: f64) -> Vector<Stable> {
        let mut out = self.to_stable();
        out.scale(k);
        out
    }

    pub fn negate_new(&self) -> Vector<Stable> {
        let mut out = self.to_stable();
        out.negate();
        out
    }

    pub fn normalize_new(&self) -> Vector<Stable> {
        let mut out = self.to_stable();
        out.normalize();
        out
    }

    // --- Products ---

    pub fn dot_product(&self, v: impl Operand) -> f64 {
        self.coords().dot(v.into_coords())
    }

    /// `x * v.y - y * v.x`
    pub fn cross_product_length(&self, v: impl Operand) -> f64 {
        self.coords().cross(v.into_coords())
    }

    /// Dot product of this vector's left normal with `v`.
    pub fn perp_product(&self, v: impl Operand) -> f64 {
        self.coords().perp(v.into_coords())
    }

    pub fn is_perpendicular(&self, v: impl Operand) -> bool {
        self.dot_product(v).abs() < EPSILON_SQUARED
    }

    pub fn is_parallel(&self, v: impl Operand) -> bool {
        self.cross_product_length(v).abs() < EPSILON_SQUARED
    }

    // --- Magnitude and direction ---

    pub fn length(&self) -> f64 {
        self.pair().length()
    }

    pub fn length_squared(&self) -> f64 {
        self.pair().length_squared()
    }

    /// Rescales along the current direction. A zero vector stays zero.
    pub fn set_length(&mut self, length: f64) -> &mut Self {
        let current = self.length();
        if current > 0.0 {
            self.scale(length / current);
        }
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.set_length(length);
        self
    }

    /// Direction angle; 0 for the zero vector.
    pub fn radians(&self) -> f64 {
        let pair = self.pair();
        if pair.x == 0.0 && pair.y == 0.0 {
            0.0
        } else {
            pair.y.atan2(pair.x)
        }
    }

    /// Points the vector at `theta`, keeping its length.
    pub fn set_radians(&mut self, theta: f64) -> &mut Self {
        let length = self.length();
        self.set_polar_radians(length, theta)
    }

    pub fn with_radians(mut self, theta: f64) -> Self {
        self.set_radians(theta);
        self
    }

    pub fn degrees(&self) -> f64 {
        self.radians().to_degrees()
    }

    pub fn set_degrees(&mut self, degrees: f64) -> &mut Self {
        self.set_radians(degrees.to_radians())
    }

    /// X component of the unit vector; 0 for the zero vector.
    pub fn dx(&self) -> f64 {
        let length = self.length();
        if length == 0.0 { 0.0 } else { self.x() / length }
    }

    /// Y component of the unit vector; 0 for the zero vector.
    pub fn dy(&self) -> f64 {
        let length = self.length();
        if length == 0.0 { 0.0 } else { self.y() / length }
    }

    /// `(-y, x)` in a new Stable vector.
    pub fn right_normal(&self) -> Vector<Stable> {
        let n = self.pair().right_normal();
        Vector::stable(n.x, n.y)
    }

    /// Writes `(-y, x)` into `out`.
    pub fn right_normal_into<'a, M: Lifetime>(&self, out: &'a mut Vector<M>) -> &'a mut Vector<M> {
        let n = self.pair().right_normal();
        out.set_coords(n.x, n.y)
    }

    /// `(y, -x)` in a new Stable vector.
    pub fn left_normal(&self) -> Vector<Stable> {
        let n = self.pair().left_normal();
        Vector::stable(n.x, n.y)
    }

    /// Writes `(y, -x)` into `out`.
    pub fn left_normal_into<'a, M: Lifetime>(&self, out: &'a mut Vector<M>) -> &'a mut Vector<M> {
        let n = self.pair().left_normal();
        out.set_coords(n.x, n.y)
    }

    pub fn is_zero(&self) -> bool {
        self.x().abs() < EPSILON && self.y().abs() < EPSILON
    }

    pub fn is_normalized(&self) -> bool {
        (self.length_squared() - 1.0).abs() < EPSILON_SQUARED
    }

    /// False if either component is NaN or infinite.
    pub fn is_valid(&self) -> bool {
        self.pair().is_valid()
    }

    // --- Rotation ---

    pub fn rotate_by_radians(&mut self, theta: f64) -> &mut Self {
        let (sin, cos) = theta.sin_cos();
        self.rotate_with_trig(sin, cos)
    }

    pub fn rotate_by_degrees(&mut self, degrees: f64) -> &mut Self {
        self.rotate_by_radians(degrees.to_radians())
    }

    /// Rotation with precomputed `sin`/`cos`, for rotating many vectors by the
    /// same angle.
    pub fn rotate_with_trig(&mut self, sin: f64, cos: f64) -> &mut Self {
        let CoordinatePair { x, y } = self.coords();
        self.set_coords(x * cos - y * sin, x * sin + y * cos)
    }

    pub fn set_polar_radians(&mut self, length: f64, theta: f64) -> &mut Self {
        let dir = angle_to_pair(theta).scaled(length);
        self.set_coords(dir.x, dir.y)
    }

    pub fn set_polar_degrees(&mut self, length: f64, degrees: f64) -> &mut Self {
        self.set_polar_radians(length, degrees.to_radians())
    }
}

impl<L: Lifetime> Default for Vector<L> {
    fn default() -> Self {
        Self::acquire(0.0, 0.0)
    }
}

impl<L: Lifetime> From<CoordinatePair> for Vector<L> {
    fn from(c: CoordinatePair) -> Self {
        Self::acquire(c.x, c.y)
    }
}

impl Clone for Vector<Stable> {
    fn clone(&self) -> Self {
        self.to_stable()
    }
}

impl<L: Lifetime, M: Lifetime> PartialEq<Vector<M>> for Vector<L> {
    fn eq(&self, other: &Vector<M>) -> bool {
        self.coords() == other.coords()
    }
}

impl<L: Lifetime> fmt::Debug for Vector<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("mode", &L::MODE)
            .field("x", &self.x())
            .field("y", &self.y())
            .finish()
    }
}

impl<L: Lifetime> fmt::Display for Vector<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}
