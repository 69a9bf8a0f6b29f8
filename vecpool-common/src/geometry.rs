//! Projection, line intersection, reflection and distance queries.
//!
//! Every operand is read once up front, so transient operands go back to the
//! pool before any arithmetic happens; intermediate values are plain
//! `CoordinatePair`s on the stack.

use crate::coord::CoordinatePair;
use crate::vector::{Lifetime, Operand, Stable, Vector, EPSILON_SQUARED};

/// Parameter `t` at which `a + t * dir` meets the line `b + s * v`.
/// NaN when the lines are parallel or either direction is degenerate.
fn line_ratio(dir: CoordinatePair, a: CoordinatePair, b: CoordinatePair, v: CoordinatePair) -> f64 {
    if dir.length_squared() < EPSILON_SQUARED || v.length_squared() < EPSILON_SQUARED {
        return f64::NAN;
    }
    let denom = v.perp(dir);
    if denom.abs() < EPSILON_SQUARED {
        return f64::NAN;
    }
    v.perp(b.minus(a)) / denom
}

#[inline(always)]
fn within_segment(t: f64) -> bool {
    t > 0.0 && t <= 1.0
}

fn write_into<M: Lifetime>(out: &mut Vector<M>, c: CoordinatePair) -> &mut Vector<M> {
    out.set_coords(c.x, c.y)
}

impl<L: Lifetime> Vector<L> {
    // --- Projection ---

    /// Projection of this vector onto `v` (any length) as a new Stable vector.
    /// Projecting onto a zero vector gives NaN components.
    pub fn project_to(&self, v: impl Operand) -> Vector<Stable> {
        let mut out = Vector::stable(0.0, 0.0);
        self.project_to_into(v, &mut out);
        out
    }

    pub fn project_to_into<'a, M: Lifetime>(&self, v: impl Operand, out: &'a mut Vector<M>) -> &'a mut Vector<M> {
        let v = v.into_coords();
        let k = self.coords().dot(v) / v.length_squared();
        write_into(out, v.scaled(k))
    }

    /// Projection onto `v`, which must already be unit length. Not checked.
    pub fn project_to_normalized(&self, v: impl Operand) -> Vector<Stable> {
        let mut out = Vector::stable(0.0, 0.0);
        self.project_to_normalized_into(v, &mut out);
        out
    }

    pub fn project_to_normalized_into<'a, M: Lifetime>(
        &self,
        v: impl Operand,
        out: &'a mut Vector<M>,
    ) -> &'a mut Vector<M> {
        let v = v.into_coords();
        write_into(out, v.scaled(self.coords().dot(v)))
    }

    // --- Intersection ---

    /// Treating this vector as the direction of a line through `a`, returns the
    /// `t` at which `a + t * self` crosses the line `b + s * v`.
    ///
    /// NaN if the lines are parallel or either direction has near-zero length.
    pub fn ratio(&self, a: impl Operand, b: impl Operand, v: impl Operand) -> f64 {
        let (a, b, v) = (a.into_coords(), b.into_coords(), v.into_coords());
        line_ratio(self.coords(), a, b, v)
    }

    /// Intersection point of the lines `a + t * self` and `b + s * v`, or
    /// `(NaN, NaN)` if there is none.
    pub fn find_intersection(&self, a: impl Operand, b: impl Operand, v: impl Operand) -> Vector<Stable> {
        let mut out = Vector::stable(0.0, 0.0);
        self.find_intersection_into(a, b, v, &mut out);
        out
    }

    pub fn find_intersection_into<'a, M: Lifetime>(
        &self,
        a: impl Operand,
        b: impl Operand,
        v: impl Operand,
        out: &'a mut Vector<M>,
    ) -> &'a mut Vector<M> {
        let (a, b, v) = (a.into_coords(), b.into_coords(), v.into_coords());
        let dir = self.coords();
        let t = line_ratio(dir, a, b, v);
        if t.is_nan() {
            write_into(out, CoordinatePair::nan())
        } else {
            write_into(out, a.plus(dir.scaled(t)))
        }
    }

    /// Like [`find_intersection`](Self::find_intersection), but only reports a
    /// point when it lies on both segments `a -> a + self` and `b -> b + v`
    /// (both ratios in `(0, 1]`).
    pub fn find_intersection_in_bounds(
        &self,
        a: impl Operand,
        b: impl Operand,
        v: impl Operand,
    ) -> Vector<Stable> {
        let mut out = Vector::stable(0.0, 0.0);
        self.find_intersection_in_bounds_into(a, b, v, &mut out);
        out
    }

    pub fn find_intersection_in_bounds_into<'a, M: Lifetime>(
        &self,
        a: impl Operand,
        b: impl Operand,
        v: impl Operand,
        out: &'a mut Vector<M>,
    ) -> &'a mut Vector<M> {
        let (a, b, v) = (a.into_coords(), b.into_coords(), v.into_coords());
        let dir = self.coords();
        let t1 = line_ratio(dir, a, b, v);
        let t2 = line_ratio(v, b, a, dir);
        if within_segment(t1) && within_segment(t2) {
            write_into(out, a.plus(dir.scaled(t1)))
        } else {
            write_into(out, CoordinatePair::nan())
        }
    }

    /// Side of the directed line `a -> b` this point lies on: -1, 0 or 1.
    pub fn sign(&self, a: impl Operand, b: impl Operand) -> i32 {
        let (a, b) = (a.into_coords(), b.into_coords());
        let p = self.coords();
        let side = (a.x - p.x) * (b.y - p.y) - (a.y - p.y) * (b.x - p.x);
        if side > 0.0 {
            1
        } else if side < 0.0 {
            -1
        } else {
            0
        }
    }

    // --- Reflection ---

    /// Reflects off a surface with unit normal `normal` (not checked).
    /// `bounce_coeff` scales the outgoing normal component; 1 is a perfect
    /// mirror.
    pub fn bounce(&mut self, normal: impl Operand, bounce_coeff: f64) -> &mut Self {
        let n = normal.into_coords();
        let push = n.scaled((1.0 + bounce_coeff) * self.coords().dot(n));
        self.subtract_coords(push.x, push.y)
    }

    /// Perfect mirror reflection, `bounce(normal, 1.0)`.
    pub fn reflect(&mut self, normal: impl Operand) -> &mut Self {
        self.bounce(normal, 1.0)
    }

    /// Splits the vector into its component along `normal` (unit length, not
    /// checked) and along `normal`'s right normal. The normal part is reversed
    /// and scaled by `bounce_coeff`, the tangential part is scaled by
    /// `friction`. With `friction == 1` this matches [`bounce`](Self::bounce);
    /// with `friction == 0` the tangential motion is removed.
    pub fn bounce_with_friction(&mut self, normal: impl Operand, bounce_coeff: f64, friction: f64) -> &mut Self {
        let n = normal.into_coords();
        let tangent = n.right_normal();
        let v = self.coords();
        let normal_part = n.scaled(v.dot(n));
        let tangent_part = tangent.scaled(v.dot(tangent));
        let out = tangent_part.scaled(friction).minus(normal_part.scaled(bounce_coeff));
        self.set_coords(out.x, out.y)
    }

    // --- Distance and angle between ---

    pub fn dist(&self, v: impl Operand) -> f64 {
        self.dist_squared(v).sqrt()
    }

    pub fn dist_squared(&self, v: impl Operand) -> f64 {
        self.coords().minus(v.into_coords()).length_squared()
    }

    /// Unsigned angle to `v`. NaN if either vector has zero length.
    pub fn radians_between(&self, v: impl Operand) -> f64 {
        let (a, b) = (self.coords(), v.into_coords());
        let cos = a.dot(b) / (a.length() * b.length());
        cos.clamp(-1.0, 1.0).acos()
    }

    pub fn degrees_between(&self, v: impl Operand) -> f64 {
        self.radians_between(v).to_degrees()
    }

    /// Caps the length at `max`.
    pub fn truncate(&mut self, max: f64) -> &mut Self {
        let length = self.length().min(max);
        self.set_length(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool;
    use approx::assert_abs_diff_eq;

    #[test]
    fn projection_onto_axis() {
        let v = Vector::stable(3.0, 4.0);
        let p = v.project_to(Vector::transient(10.0, 0.0));
        assert_abs_diff_eq!(p.x(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y(), 0.0, epsilon = 1e-12);

        let mut out = Vector::transient(0.0, 0.0);
        v.project_to_normalized_into(CoordinatePair::new(0.0, 1.0), &mut out);
        assert_eq!((out.x(), out.y()), (0.0, 4.0));
    }

    #[test]
    fn projection_onto_zero_vector_is_nan() {
        let p = Vector::stable(1.0, 1.0).project_to(CoordinatePair::new(0.0, 0.0));
        assert!(!p.is_valid());
    }

    #[test]
    fn horizontal_line_meets_vertical_line() {
        // y = 1 (through a, heading +x) against x = 0 (through b, heading +y)
        let dir = Vector::stable(1.0, 0.0);
        let a = Vector::stable(0.0, 1.0);
        let b = Vector::stable(0.0, -1.0);
        let v = Vector::stable(0.0, 1.0);
        assert_eq!(dir.ratio(&a, &b, &v), 0.0);
        let hit = dir.find_intersection(&a, &b, &v);
        assert_abs_diff_eq!(hit.x(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn crossing_lines_through_origin() {
        let dir = Vector::stable(2.0, 0.0);
        let a = Vector::stable(-1.0, 0.0);
        let b = Vector::stable(0.0, -1.0);
        let v = Vector::stable(0.0, 2.0);
        assert_abs_diff_eq!(dir.ratio(&a, &b, &v), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(v.ratio(&b, &a, &dir), 0.5, epsilon = 1e-12);
        let hit = dir.find_intersection_in_bounds(&a, &b, &v);
        assert_abs_diff_eq!(hit.x(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_or_degenerate_lines_have_no_ratio() {
        let dir = Vector::stable(1.0, 1.0);
        assert!(dir.ratio(CoordinatePair::new(0.0, 0.0), CoordinatePair::new(0.0, 1.0), CoordinatePair::new(2.0, 2.0)).is_nan());
        assert!(dir.ratio(CoordinatePair::new(0.0, 0.0), CoordinatePair::new(0.0, 1.0), CoordinatePair::new(0.0, 0.0)).is_nan());
        let zero = Vector::stable(0.0, 0.0);
        assert!(zero.ratio(CoordinatePair::new(0.0, 0.0), CoordinatePair::new(0.0, 1.0), CoordinatePair::new(1.0, 0.0)).is_nan());
        let miss = dir.find_intersection(CoordinatePair::new(0.0, 0.0), CoordinatePair::new(0.0, 1.0), CoordinatePair::new(2.0, 2.0));
        assert!(miss.x().is_nan() && miss.y().is_nan());
    }

    #[test]
    fn segments_must_overlap_within_their_extents() {
        let dir = Vector::stable(1.0, 0.0);
        let b = CoordinatePair::new(0.5, -1.0);
        let v = CoordinatePair::new(0.0, 2.0);

        // Segment from (0, 0) to (1, 0) crosses the vertical segment at x = 0.5.
        let hit = dir.find_intersection_in_bounds(CoordinatePair::new(0.0, 0.0), b, v);
        assert_abs_diff_eq!(hit.x(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.y(), 0.0, epsilon = 1e-12);

        // Starting at x = 2 the infinite lines still meet, the segments do not.
        let a = CoordinatePair::new(2.0, 0.0);
        let line_hit = dir.find_intersection(a, b, v);
        assert_abs_diff_eq!(line_hit.x(), 0.5, epsilon = 1e-12);
        let miss = dir.find_intersection_in_bounds(a, b, v);
        assert!(miss.x().is_nan() && miss.y().is_nan());

        // Too short to reach the vertical segment.
        let short = Vector::stable(0.25, 0.0);
        let miss = short.find_intersection_in_bounds(CoordinatePair::new(0.0, 0.0), b, v);
        assert!(!miss.is_valid());

        // Touching exactly at the far end counts, touching at the start does not.
        let at_end = dir.find_intersection_in_bounds(CoordinatePair::new(-0.5, 0.0), b, v);
        assert_abs_diff_eq!(at_end.x(), 0.5, epsilon = 1e-12);
        let at_start = dir.find_intersection_in_bounds(CoordinatePair::new(0.5, 0.0), b, v);
        assert!(!at_start.is_valid());
    }

    #[test]
    fn intersection_releases_transient_operands() {
        let dir = Vector::stable(1.0, 0.0);
        let mut out = Vector::stable(0.0, 0.0);
        let live = pool::stats().live;
        dir.find_intersection_in_bounds_into(
            Vector::transient(0.0, 0.0),
            Vector::transient(0.5, -1.0),
            Vector::transient(0.0, 2.0),
            &mut out,
        );
        assert_eq!(pool::stats().live, live);
        assert_abs_diff_eq!(out.x(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn sign_reports_side_of_line() {
        let a = Vector::stable(0.0, 0.0);
        let b = Vector::stable(1.0, 0.0);
        assert_eq!(Vector::stable(0.5, 1.0).sign(&a, &b), 1);
        assert_eq!(Vector::stable(0.5, -1.0).sign(&a, &b), -1);
        assert_eq!(Vector::stable(3.0, 0.0).sign(&a, &b), 0);
    }

    #[test]
    fn bounce_flips_normal_component() {
        let mut v = Vector::stable(1.0, -1.0);
        v.bounce(CoordinatePair::new(0.0, 1.0), 1.0);
        assert_eq!((v.x(), v.y()), (1.0, 1.0));

        let mut damped = Vector::stable(1.0, -2.0);
        damped.bounce(Vector::transient(0.0, 1.0), 0.5);
        assert_eq!((damped.x(), damped.y()), (1.0, 1.0));

        let mut mirrored = Vector::stable(-3.0, 2.0);
        mirrored.reflect(CoordinatePair::new(1.0, 0.0));
        assert_eq!((mirrored.x(), mirrored.y()), (3.0, 2.0));
    }

    #[test]
    fn friction_scales_tangential_component() {
        let n = CoordinatePair::new(0.0, 1.0);
        let mut v = Vector::stable(2.0, -1.0);
        v.bounce_with_friction(n, 0.5, 0.25);
        assert_abs_diff_eq!(v.x(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y(), 0.5, epsilon = 1e-12);

        // Default friction of 0 drops the tangential part entirely.
        let mut stopped = Vector::stable(1.0, -1.0);
        stopped.bounce_with_friction(n, 1.0, 0.0);
        assert_abs_diff_eq!(stopped.x(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stopped.y(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn full_friction_matches_plain_bounce() {
        let mut sliding = Vector::stable(0.3, -0.7);
        let mut plain = sliding.clone();
        let diagonal = CoordinatePair::new(0.6, 0.8);
        sliding.bounce_with_friction(diagonal, 0.8, 1.0);
        plain.bounce(diagonal, 0.8);
        assert_abs_diff_eq!(sliding.x(), plain.x(), epsilon = 1e-12);
        assert_abs_diff_eq!(sliding.y(), plain.y(), epsilon = 1e-12);
    }

    #[test]
    fn distances_and_angles() {
        let p = Vector::stable(1.0, 1.0);
        assert_eq!(p.dist_squared(Vector::transient(4.0, 5.0)), 25.0);
        assert_eq!(p.dist(CoordinatePair::new(4.0, 5.0)), 5.0);

        let x = Vector::stable(2.0, 0.0);
        assert_abs_diff_eq!(x.degrees_between(CoordinatePair::new(0.0, 3.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(x.radians_between(CoordinatePair::new(-1.0, 0.0)), std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(x.radians_between(&x), 0.0);
        assert!(x.radians_between(CoordinatePair::new(0.0, 0.0)).is_nan());
    }

    #[test]
    fn truncate_caps_length_only() {
        let mut long = Vector::stable(30.0, 40.0);
        long.truncate(5.0);
        assert_abs_diff_eq!(long.x(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(long.y(), 4.0, epsilon = 1e-12);
        let mut short = Vector::stable(0.3, 0.4);
        short.truncate(5.0);
        assert_abs_diff_eq!(short.length(), 0.5, epsilon = 1e-12);
    }
}
