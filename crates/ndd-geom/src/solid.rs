// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::Vec3;
use crate::types::aabb::Aabb;
use crate::units::DEG;

/// Shape of a volume, centred on the origin of its own frame.
///
/// Tubes are cylindrical segments around the local Z axis spanning
/// `[-half_length, +half_length]`; boxes span `±half_*` on each axis.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Solid {
    /// Cylindrical tube segment.
    Tube {
        /// Inner radius (0 for a solid disc).
        inner_radius: f64,
        /// Outer radius.
        outer_radius: f64,
        /// Half of the extent along local Z.
        half_length: f64,
        /// Start of the azimuthal segment (radians).
        start_angle: f64,
        /// Azimuthal span (radians); `360°` for a full tube.
        span_angle: f64,
    },
    /// Rectangular box.
    Box {
        /// Half extent along X.
        half_x: f64,
        /// Half extent along Y.
        half_y: f64,
        /// Half extent along Z.
        half_z: f64,
    },
}

impl Solid {
    /// Full (360°) tube of the given thickness along Z.
    pub fn tube(inner_radius: f64, outer_radius: f64, thickness: f64) -> Self {
        Self::Tube {
            inner_radius,
            outer_radius,
            half_length: thickness / 2.0,
            start_angle: 0.0,
            span_angle: 360.0 * DEG,
        }
    }

    /// Full solid disc (zero inner radius).
    pub fn disc(radius: f64, thickness: f64) -> Self {
        Self::tube(0.0, radius, thickness)
    }

    /// Box from half extents.
    pub fn cuboid(half_x: f64, half_y: f64, half_z: f64) -> Self {
        Self::Box {
            half_x,
            half_y,
            half_z,
        }
    }

    /// Full extent along the local Z axis.
    pub fn thickness(&self) -> f64 {
        match *self {
            Self::Tube { half_length, .. } => 2.0 * half_length,
            Self::Box { half_z, .. } => 2.0 * half_z,
        }
    }

    /// Half extent along the local Z axis.
    pub fn half_z(&self) -> f64 {
        match *self {
            Self::Tube { half_length, .. } => half_length,
            Self::Box { half_z, .. } => half_z,
        }
    }

    /// Radial interval `[inner, outer]` covered around the local Z axis.
    ///
    /// Boxes report `[0, half-diagonal in XY]`.
    pub fn radial_extent(&self) -> (f64, f64) {
        match *self {
            Self::Tube {
                inner_radius,
                outer_radius,
                ..
            } => (inner_radius, outer_radius),
            Self::Box { half_x, half_y, .. } => (0.0, half_x.hypot(half_y)),
        }
    }

    /// Bounding box in the solid's own frame.
    ///
    /// Tube segments are bounded by their full circle.
    pub fn local_aabb(&self) -> Aabb {
        match *self {
            Self::Tube {
                outer_radius,
                half_length,
                ..
            } => Aabb::from_center_half_extents(Vec3::ZERO, outer_radius, outer_radius, half_length),
            Self::Box {
                half_x,
                half_y,
                half_z,
            } => Aabb::from_center_half_extents(Vec3::ZERO, half_x, half_y, half_z),
        }
    }

    /// `true` when every dimension is finite and the shape is non-degenerate.
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Tube {
                inner_radius,
                outer_radius,
                half_length,
                start_angle,
                span_angle,
            } => {
                [inner_radius, outer_radius, half_length, start_angle, span_angle]
                    .iter()
                    .all(|v| v.is_finite())
                    && inner_radius >= 0.0
                    && outer_radius > inner_radius
                    && half_length > 0.0
                    && span_angle > 0.0
            }
            Self::Box {
                half_x,
                half_y,
                half_z,
            } => [half_x, half_y, half_z]
                .iter()
                .all(|v| v.is_finite() && *v > 0.0),
        }
    }
}
