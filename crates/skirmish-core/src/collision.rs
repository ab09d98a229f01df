//! Collision tests on the torus.
//!
//! Every test starts with a cheap circle pre-check on the bounding radii.
//! In [`Precision::Exact`] mode a pair that passes falls through to a
//! polygon test when either side carries a [`Hull`]: SAT for two hulls,
//! polygon-against-circle otherwise.
//!
//! With [`Wrap::Toroidal`] the probing body (the first argument) is also
//! tested at its mirror images when it crosses the wrap margin, so actors
//! straddling an edge hit actors on the opposite side.

use glam::Vec2;

use crate::geometry::{Hull, Torus};

/// Whether mirror images of the probing body are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// Test the mirror images across the wrap margin as well.
    Toroidal,
    /// Test only the stored position. Used for shield rings and big asteroids.
    None,
}

/// How far past the circle pre-check a test goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Refine with hull geometry when present.
    Exact,
    /// Bounding circles only.
    CircleOnly,
}

/// A collidable shape placed in the arena.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    /// Center position.
    pub center: Vec2,
    /// Bounding radius.
    pub radius: f32,
    /// Optional convex outline, in offsets from `center`.
    pub hull: Option<&'a Hull>,
}

impl<'a> Body<'a> {
    /// A plain circle.
    #[must_use]
    pub const fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            hull: None,
        }
    }

    /// A circle refined by a hull.
    #[must_use]
    pub const fn with_hull(center: Vec2, radius: f32, hull: &'a Hull) -> Self {
        Self {
            center,
            radius,
            hull: Some(hull),
        }
    }

    const fn moved_to(self, center: Vec2) -> Self {
        Self { center, ..self }
    }
}

/// Tests two bodies at their stored positions.
#[must_use]
pub fn overlaps(a: &Body<'_>, b: &Body<'_>, precision: Precision) -> bool {
    let reach = a.radius + b.radius;
    if a.center.distance_squared(b.center) >= reach * reach {
        return false;
    }
    if precision == Precision::CircleOnly {
        return true;
    }
    match (a.hull, b.hull) {
        (Some(ha), Some(hb)) => ha.intersects(a.center, hb, b.center),
        (Some(ha), None) => ha.intersects_circle(a.center, b.center, b.radius),
        (None, Some(hb)) => hb.intersects_circle(b.center, a.center, a.radius),
        (None, None) => true,
    }
}

/// Tests `probe` against `target`, following the probe across the wrap when
/// `wrap` is [`Wrap::Toroidal`].
#[must_use]
pub fn collides(
    torus: &Torus,
    probe: &Body<'_>,
    target: &Body<'_>,
    wrap: Wrap,
    precision: Precision,
) -> bool {
    if overlaps(probe, target, precision) {
        return true;
    }
    if wrap == Wrap::None {
        return false;
    }
    torus
        .mirrors(probe.center, probe.radius)
        .any(|image| overlaps(&probe.moved_to(image), target, precision))
}

/// Whether a circle overlaps any of `others`, ignoring the wrap. Used by
/// rejection sampling when placing new actors.
pub fn overlaps_any<I>(center: Vec2, radius: f32, others: I) -> bool
where
    I: IntoIterator<Item = (Vec2, f32)>,
{
    let probe = Body::circle(center, radius);
    others
        .into_iter()
        .any(|(c, r)| overlaps(&probe, &Body::circle(c, r), Precision::CircleOnly))
}
