// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spanline Geom: perspective-aware segment geometry for scanline span
//! arbitration.
//!
//! This crate is the lower building block of the Spanline workspace. It knows
//! nothing about span trees; it answers one question precisely: given two
//! spans in perspective-correct screen space, where (if anywhere) do they
//! cross in view space, and which one is in front?
//!
//! - [`ScreenPoint`]: an endpoint as the rasterizer sees it, an x pixel
//!   coordinate paired with the reciprocal of its view-space depth.
//! - [`lift_to_view`]: undoes the perspective divide, mapping a screen
//!   endpoint onto the view-space x–z plane.
//! - [`segment_crossing`]: parametric 2-D segment intersection with an
//!   epsilon-open acceptance interval.
//! - [`span_crossing`]: the combined query used by span arbitration; returns
//!   the crossing x back in screen space plus a cross-product sign
//!   ("leftness") for front/back decisions.
//!
//! Depth comparisons stay linear in view space even though the inputs are
//! perspective-divided, because the reciprocal depth `w = 1/z` is linear in
//! screen x.
//!
//! # Example
//!
//! ```
//! use spanline_geom::{span_crossing, ScreenPoint};
//!
//! // Two spans interpenetrating across a 6-pixel scanline: one tilts away,
//! // the other toward the eye. They cross in the middle.
//! let crossing = span_crossing(
//!     ScreenPoint::new(0.0, 2.0),
//!     ScreenPoint::new(6.0, 0.5),
//!     ScreenPoint::new(0.0, 0.5),
//!     ScreenPoint::new(6.0, 2.0),
//!     6.0,
//!     1.0,
//! );
//! let x = crossing.x.expect("spans cross");
//! assert!((x - 3.0).abs() < 1e-9);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::Point;

/// Acceptance epsilon for parametric crossings.
///
/// A crossing is only reported when both parametric coordinates fall inside
/// the open interval `(EPSILON, 1 - EPSILON)`. Coincident endpoints are
/// deliberately not crossings; callers resolve them through the leftness
/// sign instead.
pub const EPSILON: f64 = 1e-6;

/// Linear interpolation of `a` toward `b` at `p` out of `t`.
#[inline]
pub fn lerp(a: f64, b: f64, p: f64, t: f64) -> f64 {
    (b - a) * p / t + a
}

/// Whether two values are within [`EPSILON`] of each other.
#[inline]
pub fn almost_eq(x: f64, y: f64) -> bool {
    libm::fabs(x - y) < EPSILON
}

/// One span endpoint in perspective-correct screen space.
///
/// `w` is the multiplicative inverse of the endpoint's distance from the eye
/// in view space (the reciprocal of the clip-space w-component). Larger `w`
/// means closer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Screen-space x coordinate, in pixels. Not necessarily integral.
    pub x: f64,
    /// Reciprocal view-space depth at `x`. Must be positive.
    pub w: f64,
}

impl ScreenPoint {
    /// Create a screen-space endpoint.
    pub const fn new(x: f64, w: f64) -> Self {
        Self { x, w }
    }
}

/// Lift a screen-space endpoint back onto the view-space x–z plane.
///
/// The returned point carries view x in `x` and view depth `z = 1/w` in `y`.
/// `size` is the scanline width in pixels and `z_near` the distance from the
/// eye to the projection plane.
#[inline]
pub fn lift_to_view(p: ScreenPoint, size: f64, z_near: f64) -> Point {
    let z = 1.0 / p.w;
    Point::new((p.x - size * 0.5) * z * (1.0 / z_near), z)
}

/// Outcome of intersecting two parametric 2-D segments.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Crossing {
    /// The segments properly cross at the carried point.
    At(Point),
    /// Parallel, non-collinear segments.
    Parallel,
    /// Collinear segments, in the same or opposing directions.
    Collinear,
    /// The lines meet outside the open acceptance interval of either
    /// segment. Coincident endpoints land here.
    Separate,
}

/// Intersect segments `a -> b` and `c -> d`.
pub fn segment_crossing(a: Point, b: Point, c: Point, d: Point) -> Crossing {
    let u = b - a;
    let v = d - c;
    let w = c - a;
    let numer_t = w.cross(v);
    let numer_q = w.cross(u);
    let denom = u.cross(v);

    if denom == 0.0 {
        return if numer_t == 0.0 {
            Crossing::Collinear
        } else {
            Crossing::Parallel
        };
    }

    let t = numer_t / denom;
    let q = numer_q / denom;
    if t <= EPSILON || t >= 1.0 - EPSILON || q <= EPSILON || q >= 1.0 - EPSILON {
        return Crossing::Separate;
    }

    Crossing::At(a + u * t)
}

/// A span-level crossing query result.
///
/// `leftness` is the sign carrier for front/back decisions: for a proper
/// crossing, a positive value means the first span is in front past the
/// crossover; for separate spans it is the tiebreak cross product (zero for
/// parallel or collinear spans).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpanCrossing {
    /// Screen-space x of the crossover, when the spans properly cross.
    pub x: Option<f64>,
    /// View-space cross product used for front/back arbitration.
    pub leftness: f64,
}

/// Compute the view-space crossing of spans `u0 -> u1` and `v0 -> v1`.
///
/// All four endpoints are in perspective-correct screen space; `size` and
/// `z_near` describe the projection (see [`lift_to_view`]). A reported
/// crossing x is projected back into screen space.
pub fn span_crossing(
    u0: ScreenPoint,
    u1: ScreenPoint,
    v0: ScreenPoint,
    v1: ScreenPoint,
    size: f64,
    z_near: f64,
) -> SpanCrossing {
    let a = lift_to_view(u0, size, z_near);
    let b = lift_to_view(u1, size, z_near);
    let c = lift_to_view(v0, size, z_near);
    let d = lift_to_view(v1, size, z_near);

    match segment_crossing(a, b, c, d) {
        Crossing::At(p) => {
            let x = p.x * z_near / p.y + size * 0.5;
            SpanCrossing {
                x: Some(x),
                leftness: (a - p).cross(c - p),
            }
        }
        Crossing::Separate => SpanCrossing {
            x: None,
            leftness: (b - c).cross(d - c),
        },
        Crossing::Parallel | Crossing::Collinear => SpanCrossing {
            x: None,
            leftness: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(lerp(1.0, 3.0, 0.0, 4.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 4.0, 4.0), 3.0);
        assert_eq!(lerp(1.0, 3.0, 2.0, 4.0), 2.0);
    }

    #[test]
    fn almost_eq_thresholds() {
        assert!(almost_eq(1.0, 1.0));
        assert!(almost_eq(1.0, 1.0 + 1e-7));
        assert!(!almost_eq(1.0, 1.0 + 1e-5));
        assert!(almost_eq(1.0 + 1e-7, 1.0));
    }

    #[test]
    fn lift_centers_and_scales() {
        // The screen center at unit depth lands on the view axis.
        let p = lift_to_view(ScreenPoint::new(3.0, 1.0), 6.0, 1.0);
        assert_eq!(p, Point::new(0.0, 1.0));

        // Twice the depth doubles the lateral offset.
        let q = lift_to_view(ScreenPoint::new(6.0, 0.5), 6.0, 1.0);
        assert_eq!(q, Point::new(6.0, 2.0));
    }

    #[test]
    fn crossing_at_center() {
        let r = segment_crossing(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        );
        assert_eq!(r, Crossing::At(Point::new(1.0, 1.0)));
    }

    #[test]
    fn parallel_and_collinear() {
        let r = segment_crossing(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(2.0, 1.0),
        );
        assert_eq!(r, Crossing::Parallel);

        let r = segment_crossing(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(3.0, 0.0),
        );
        assert_eq!(r, Crossing::Collinear);
    }

    #[test]
    fn coincident_endpoints_are_separate() {
        // Segments sharing an endpoint must not count as crossing; the
        // parametric coordinate sits on the closed boundary.
        let r = segment_crossing(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        );
        assert_eq!(r, Crossing::Separate);
    }

    #[test]
    fn out_of_range_is_separate() {
        // The infinite lines cross, but beyond the first segment's extent.
        let r = segment_crossing(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 5.0),
        );
        assert_eq!(r, Crossing::Separate);
    }

    #[test]
    fn span_crossing_interpenetration() {
        // One span tilts away, the other toward the eye; symmetric setup
        // crosses at the screen center.
        let r = span_crossing(
            ScreenPoint::new(0.0, 2.0),
            ScreenPoint::new(6.0, 0.5),
            ScreenPoint::new(0.0, 0.5),
            ScreenPoint::new(6.0, 2.0),
            6.0,
            1.0,
        );
        let x = r.x.expect("spans cross");
        assert!((x - 3.0).abs() < 1e-9);
        // The first span tilts away, so it is behind past the crossover.
        assert!(r.leftness < 0.0);
    }

    #[test]
    fn span_crossing_separate_carries_tiebreak() {
        // Same x-extent, first span uniformly closer, second tilting toward
        // it without reaching: their view lines meet beyond the extent, so
        // no crossing is reported but the tiebreak sign is nonzero.
        let r = span_crossing(
            ScreenPoint::new(1.0, 1.0),
            ScreenPoint::new(5.0, 1.0),
            ScreenPoint::new(1.0, 0.5),
            ScreenPoint::new(5.0, 0.6),
            6.0,
            1.0,
        );
        assert_eq!(r.x, None);
        assert!(r.leftness != 0.0);
    }

    #[test]
    fn constant_depth_layers_are_parallel() {
        // Two flat spans at different depths never cross and carry no
        // tiebreak; depth arbitration decides without geometry.
        let r = span_crossing(
            ScreenPoint::new(1.0, 1.0),
            ScreenPoint::new(5.0, 1.0),
            ScreenPoint::new(1.0, 0.5),
            ScreenPoint::new(5.0, 0.5),
            6.0,
            1.0,
        );
        assert_eq!(r.x, None);
        assert_eq!(r.leftness, 0.0);
    }
}
