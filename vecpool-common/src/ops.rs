//! Operator forms of the vector arithmetic.
//!
//! Operators accept `&Vector<Stable>` (borrowed, left alone) and
//! `Vector<Transient>` (consumed, slot recycled) on either side, and every
//! vector-valued operator returns a `Vector<Transient>`. Chains such as
//! `-(&a + &b)` therefore hold at most one slot at a time; keep a result
//! around with `into_stable()`.

use crate::vector::{Lifetime, Operand, Stable, Transient, Vector};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Left-hand side of a vector-valued operator: yields the transient vector
/// the result is written into.
trait IntoResult {
    fn into_result(self) -> Vector<Transient>;
}

impl IntoResult for &Vector<Stable> {
    fn into_result(self) -> Vector<Transient> {
        self.to_transient()
    }
}

impl IntoResult for Vector<Transient> {
    // Reading the operand and handing out a fresh slot nets out to reusing it.
    fn into_result(self) -> Vector<Transient> {
        self
    }
}

macro_rules! impl_vector_ops {
    ($lhs:ty, $rhs:ty) => {
        impl Add<$rhs> for $lhs {
            type Output = Vector<Transient>;

            fn add(self, rhs: $rhs) -> Vector<Transient> {
                let mut out = self.into_result();
                out.add_vector(rhs);
                out
            }
        }

        impl Sub<$rhs> for $lhs {
            type Output = Vector<Transient>;

            fn sub(self, rhs: $rhs) -> Vector<Transient> {
                let mut out = self.into_result();
                out.subtract_vector(rhs);
                out
            }
        }

        /// Dot product.
        impl Mul<$rhs> for $lhs {
            type Output = f64;

            fn mul(self, rhs: $rhs) -> f64 {
                self.into_coords().dot(rhs.into_coords())
            }
        }
    };
}

impl_vector_ops!(&Vector<Stable>, &Vector<Stable>);
impl_vector_ops!(&Vector<Stable>, Vector<Transient>);
impl_vector_ops!(Vector<Transient>, &Vector<Stable>);
impl_vector_ops!(Vector<Transient>, Vector<Transient>);

macro_rules! impl_scalar_ops {
    ($lhs:ty) => {
        impl Mul<f64> for $lhs {
            type Output = Vector<Transient>;

            fn mul(self, k: f64) -> Vector<Transient> {
                let mut out = self.into_result();
                out.scale(k);
                out
            }
        }

        impl Mul<$lhs> for f64 {
            type Output = Vector<Transient>;

            fn mul(self, v: $lhs) -> Vector<Transient> {
                v * self
            }
        }

        impl Neg for $lhs {
            type Output = Vector<Transient>;

            fn neg(self) -> Vector<Transient> {
                let mut out = self.into_result();
                out.negate();
                out
            }
        }
    };
}

impl_scalar_ops!(&Vector<Stable>);
impl_scalar_ops!(Vector<Transient>);

impl<L: Lifetime, O: Operand> AddAssign<O> for Vector<L> {
    fn add_assign(&mut self, rhs: O) {
        self.add_vector(rhs);
    }
}

impl<L: Lifetime, O: Operand> SubAssign<O> for Vector<L> {
    fn sub_assign(&mut self, rhs: O) {
        self.subtract_vector(rhs);
    }
}

impl<L: Lifetime> MulAssign<f64> for Vector<L> {
    fn mul_assign(&mut self, k: f64) {
        self.scale(k);
    }
}
