// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::Vec3;
use crate::types::transform::Transform;

/// Axis-aligned bounding box.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are millimetres in whatever frame produced the box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from two corners, ordering components so the
    /// invariant always holds.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self::from_points(&[a, b]).unwrap_or(Self { min: a, max: b })
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with half-extents `hx, hy, hz`.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, hx: f64, hy: f64, hz: f64) -> Self {
        let he = Vec3::new(hx.abs(), hy.abs(), hz.abs());
        Self {
            min: center.sub(&he),
            max: center.add(&he),
        }
    }

    /// Returns `true` if the open interiors of the two boxes intersect.
    ///
    /// Boxes sharing only a face, edge or corner do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let a_min = self.min.to_array();
        let a_max = self.max.to_array();
        let b_min = other.min.to_array();
        let b_max = other.max.to_array();
        (0..3).all(|k| a_min[k] < b_max[k] && b_min[k] < a_max[k])
    }

    /// Returns `true` if `other` lies entirely inside (or on the boundary of) `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let a_min = self.min.to_array();
        let a_max = self.max.to_array();
        let b_min = other.min.to_array();
        let b_max = other.max.to_array();
        (0..3).all(|k| a_min[k] <= b_min[k] && b_max[k] <= a_max[k])
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let a = self.min.to_array();
        let b = self.max.to_array();
        let c = other.min.to_array();
        let d = other.max.to_array();
        Self {
            min: Vec3::new(a[0].min(c[0]), a[1].min(c[1]), a[2].min(c[2])),
            max: Vec3::new(b[0].max(d[0]), b[1].max(d[1]), b[2].max(d[2])),
        }
    }

    /// Computes the AABB that bounds this box after placement by `transform`.
    ///
    /// Evaluates the eight corners in the mother frame.
    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        let [minx, miny, minz] = self.min.to_array();
        let [maxx, maxy, maxz] = self.max.to_array();
        let corners = [
            Vec3::new(minx, miny, minz),
            Vec3::new(minx, miny, maxz),
            Vec3::new(minx, maxy, minz),
            Vec3::new(minx, maxy, maxz),
            Vec3::new(maxx, miny, minz),
            Vec3::new(maxx, miny, maxz),
            Vec3::new(maxx, maxy, minz),
            Vec3::new(maxx, maxy, maxz),
        ]
        .map(|c| transform.transform_point(&c));
        Self::from_points(&corners).unwrap_or(*self)
    }

    /// Builds the minimal AABB that contains all `points`; `None` when empty.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            let a = p.to_array();
            let mi = min.to_array();
            let ma = max.to_array();
            min = Vec3::new(mi[0].min(a[0]), mi[1].min(a[1]), mi[2].min(a[2]));
            max = Vec3::new(ma[0].max(a[0]), ma[1].max(a[1]), ma[2].max(a[2]));
        }
        Some(Self { min, max })
    }
}
