//! Toroidal arena geometry and convex hulls.
//!
//! The arena is a `width × height` rectangle whose edges are identified with
//! each other. Actors are allowed to drift `margin` units past an edge before
//! they are physically moved to the opposite side, so the wrapped extent is
//! `width + 2·margin` by `height + 2·margin`.
//!
//! Headings follow the arena convention `direction = (sin θ, cos θ)`, i.e.
//! `θ = atan2(vx, vy)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;

// =============================================================================
// Torus
// =============================================================================

/// The toroidal arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    width: f32,
    height: f32,
    margin: f32,
}

impl Torus {
    /// Creates a torus with the given visible size and wrap margin.
    #[must_use]
    pub const fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// Creates the torus described by an arena config.
    #[must_use]
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.width, config.height, config.wrap_margin)
    }

    /// Visible width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Visible height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Wrap margin past each edge.
    #[must_use]
    pub const fn margin(&self) -> f32 {
        self.margin
    }

    /// Horizontal period of the torus.
    #[must_use]
    pub fn full_width(&self) -> f32 {
        self.width + 2.0 * self.margin
    }

    /// Vertical period of the torus.
    #[must_use]
    pub fn full_height(&self) -> f32 {
        self.height + 2.0 * self.margin
    }

    /// Moves a position that is fully past the margin to the opposite side.
    ///
    /// Returns the new position and whether it changed. Positions inside the
    /// margin are left untouched.
    #[must_use]
    pub fn wrap_position(&self, mut position: Vec2) -> (Vec2, bool) {
        let mut wrapped = false;
        if position.x < -self.margin {
            position.x += self.full_width();
            wrapped = true;
        } else if position.x > self.width + self.margin {
            position.x -= self.full_width();
            wrapped = true;
        }
        if position.y < -self.margin {
            position.y += self.full_height();
            wrapped = true;
        } else if position.y > self.height + self.margin {
            position.y -= self.full_height();
            wrapped = true;
        }
        (position, wrapped)
    }

    /// Shortest displacement from `from` to `to` across the wrap.
    #[must_use]
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        let mut d = to - from;
        let (fw, fh) = (self.full_width(), self.full_height());
        let (hw, hh) = (fw / 2.0, fh / 2.0);
        while d.x < -hw {
            d.x += fw;
        }
        while d.x > hw {
            d.x -= fw;
        }
        while d.y < -hh {
            d.y += fh;
        }
        while d.y > hh {
            d.y -= fh;
        }
        d
    }

    /// Toroidal distance between two points.
    #[must_use]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length()
    }

    /// Heading from `a` towards `b` across the wrap.
    #[must_use]
    pub fn angle(&self, a: Vec2, b: Vec2) -> f32 {
        heading_of(self.delta(a, b))
    }

    /// Mirror images of a circle that crosses the wrap margin.
    ///
    /// Yields the horizontal, vertical and diagonal images (in that order)
    /// for the axes the circle actually crosses; an interior circle has none.
    pub fn mirrors(&self, center: Vec2, radius: f32) -> impl Iterator<Item = Vec2> {
        let mut shifted = center;
        if center.x - radius < -self.margin {
            shifted.x += self.full_width();
        } else if center.x + radius > self.width + self.margin {
            shifted.x -= self.full_width();
        }
        if center.y - radius < -self.margin {
            shifted.y += self.full_height();
        } else if center.y + radius > self.height + self.margin {
            shifted.y -= self.full_height();
        }

        #[allow(clippy::float_cmp)]
        let (moved_x, moved_y) = (shifted.x != center.x, shifted.y != center.y);
        let horizontal = moved_x.then(|| Vec2::new(shifted.x, center.y));
        let vertical = moved_y.then(|| Vec2::new(center.x, shifted.y));
        let diagonal = (moved_x && moved_y).then_some(shifted);
        [horizontal, vertical, diagonal].into_iter().flatten()
    }
}

/// Normalizes an angle into `[-π, π]`.
#[must_use]
pub fn wrap_angle(mut r: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while r > PI {
        r -= TAU;
    }
    while r < -PI {
        r += TAU;
    }
    r
}

/// Unit direction for a heading.
#[must_use]
pub fn heading_vector(heading: f32) -> Vec2 {
    let (sin, cos) = heading.sin_cos();
    Vec2::new(sin, cos)
}

/// Heading of a direction vector.
#[must_use]
pub fn heading_of(v: Vec2) -> f32 {
    v.x.atan2(v.y)
}

// =============================================================================
// Convex hulls
// =============================================================================

/// A convex polygon stored as offsets from its owner's center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    points: Vec<Vec2>,
}

impl Hull {
    /// Creates a hull from local-space vertices in winding order.
    ///
    /// The vertices must describe a convex polygon.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// A ship-shaped triangle: nose along `heading`, wings swept back.
    #[must_use]
    pub fn ship(heading: f32, radius: f32) -> Self {
        let wing = 140f32.to_radians();
        Self::new(vec![
            heading_vector(heading) * radius,
            heading_vector(heading + wing) * radius * 0.8,
            heading_vector(heading - wing) * radius * 0.8,
        ])
    }

    /// Local-space vertices.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    fn world(&self, at: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(move |p| *p + at)
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    fn project(&self, at: Vec2, axis: Vec2) -> (f32, f32) {
        self.world(at)
            .map(|p| p.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    /// Separating-axis test between two convex hulls placed at `at` and `other_at`.
    #[must_use]
    pub fn intersects(&self, at: Vec2, other: &Hull, other_at: Vec2) -> bool {
        if self.points.len() < 3 || other.points.len() < 3 {
            return false;
        }
        let axes = self
            .edges()
            .chain(other.edges())
            .map(|(a, b)| (b - a).perp())
            .filter(|axis| axis.length_squared() > f32::EPSILON);
        for axis in axes {
            let (a_lo, a_hi) = self.project(at, axis);
            let (b_lo, b_hi) = other.project(other_at, axis);
            if a_hi < b_lo || b_hi < a_lo {
                return false;
            }
        }
        true
    }

    /// Whether the hull at `at` overlaps a circle.
    #[must_use]
    pub fn intersects_circle(&self, at: Vec2, center: Vec2, radius: f32) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let local = center - at;
        if self.contains_local(local) {
            return true;
        }
        let r2 = radius * radius;
        self.edges()
            .any(|(a, b)| closest_on_segment(a, b, local).distance_squared(local) < r2)
    }

    fn contains_local(&self, p: Vec2) -> bool {
        let mut sign = 0.0f32;
        for (a, b) in self.edges() {
            let cross = (b - a).perp_dot(p - a);
            if cross.abs() <= f32::EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

fn closest_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn arena() -> Torus {
        Torus::new(480.0, 480.0, 16.0)
    }

    mod torus_tests {
        use super::*;

        #[test]
        fn full_extent_includes_both_margins() {
            assert_eq!(arena().full_width(), 512.0);
            assert_eq!(arena().full_height(), 512.0);
        }

        #[test]
        fn wrap_leaves_margin_positions_alone() {
            let (p, wrapped) = arena().wrap_position(Vec2::new(-10.0, 490.0));
            assert_eq!(p, Vec2::new(-10.0, 490.0));
            assert!(!wrapped);
        }

        #[test]
        fn wrap_moves_past_margin() {
            let (p, wrapped) = arena().wrap_position(Vec2::new(-17.0, 497.0));
            assert!(wrapped);
            assert!((p.x - 495.0).abs() < 1e-4);
            assert!((p.y - -15.0).abs() < 1e-4);
        }

        #[test]
        fn delta_takes_short_way_round() {
            let d = arena().delta(Vec2::new(10.0, 240.0), Vec2::new(470.0, 240.0));
            assert!((d.x - -52.0).abs() < 1e-4);
            assert_eq!(d.y, 0.0);
            assert!((arena().distance(Vec2::new(10.0, 240.0), Vec2::new(470.0, 240.0)) - 52.0).abs() < 1e-4);
        }

        #[test]
        fn angle_points_along_axis() {
            let a = arena().angle(Vec2::new(100.0, 100.0), Vec2::new(100.0, 150.0));
            assert!(a.abs() < 1e-5);
            let a = arena().angle(Vec2::new(100.0, 100.0), Vec2::new(150.0, 100.0));
            assert!((a - PI / 2.0).abs() < 1e-5);
        }

        #[test]
        fn interior_circle_has_no_mirrors() {
            assert_eq!(arena().mirrors(Vec2::new(240.0, 240.0), 20.0).count(), 0);
        }

        #[test]
        fn corner_circle_has_three_mirrors() {
            let mirrors: Vec<_> = arena().mirrors(Vec2::new(1.0, 2.0), 20.0).collect();
            assert_eq!(
                mirrors,
                vec![
                    Vec2::new(513.0, 2.0),
                    Vec2::new(1.0, 514.0),
                    Vec2::new(513.0, 514.0),
                ]
            );
        }
    }

    mod angle_tests {
        use super::*;

        #[test]
        fn wrap_angle_normalizes() {
            assert!((wrap_angle(3.0 * PI / 2.0) - -PI / 2.0).abs() < 1e-5);
            assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
            assert_eq!(wrap_angle(1.0), 1.0);
        }

        #[test]
        fn heading_round_trip() {
            let v = heading_vector(0.7);
            assert!((heading_of(v) - 0.7).abs() < 1e-5);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    mod hull_tests {
        use super::*;

        fn square(half: f32) -> Hull {
            Hull::new(vec![
                Vec2::new(-half, -half),
                Vec2::new(half, -half),
                Vec2::new(half, half),
                Vec2::new(-half, half),
            ])
        }

        #[test]
        fn overlapping_squares_intersect() {
            let s = square(5.0);
            assert!(s.intersects(Vec2::ZERO, &s, Vec2::new(8.0, 0.0)));
            assert!(!s.intersects(Vec2::ZERO, &s, Vec2::new(11.0, 0.0)));
        }

        #[test]
        fn separated_diagonally() {
            let tri = Hull::new(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(0.0, 10.0),
            ]);
            // Bounding circles overlap but the hypotenuse separates them.
            assert!(!tri.intersects(Vec2::ZERO, &tri, Vec2::new(6.0, 6.0)));
        }

        #[test]
        fn circle_inside_hull() {
            assert!(square(5.0).intersects_circle(Vec2::ZERO, Vec2::new(1.0, 1.0), 0.5));
        }

        #[test]
        fn circle_touching_edge() {
            let s = square(5.0);
            assert!(s.intersects_circle(Vec2::ZERO, Vec2::new(6.5, 0.0), 2.0));
            assert!(!s.intersects_circle(Vec2::ZERO, Vec2::new(8.0, 0.0), 2.0));
        }

        #[test]
        fn ship_hull_contains_its_center() {
            let hull = Hull::ship(1.2, 19.0);
            assert!(hull.intersects_circle(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 0.1));
        }
    }

    mod wrap_props {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f32> {
            -40.0f32..520.0
        }

        proptest! {
            #[test]
            fn wrapped_position_is_congruent(x in coord(), y in coord()) {
                let torus = arena();
                let p = Vec2::new(x, y);
                let (q, _) = torus.wrap_position(p);
                prop_assert!(q.x >= -16.0 && q.x <= 496.0);
                prop_assert!(q.y >= -16.0 && q.y <= 496.0);
                prop_assert!(torus.distance(p, q) < 1e-3);
            }

            #[test]
            fn delta_is_shortest(ax in coord(), ay in coord(), bx in coord(), by in coord()) {
                let torus = arena();
                let d = torus.delta(Vec2::new(ax, ay), Vec2::new(bx, by));
                prop_assert!(d.x.abs() <= 256.0 + 1e-3);
                prop_assert!(d.y.abs() <= 256.0 + 1e-3);
                let back = torus.delta(Vec2::new(bx, by), Vec2::new(ax, ay));
                prop_assert!((torus.distance(Vec2::new(ax, ay), Vec2::new(bx, by)) - back.length()).abs() < 1e-2);
            }
        }
    }
}
