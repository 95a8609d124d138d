// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for the NDD detector model.

This crate provides:
- `f64` vectors and rotation quaternions (`math`).
- Placements relative to a mother volume (`Transform`).
- Axis-aligned bounding boxes (`Aabb`) for containment and overlap checks.
- Solid descriptors (`Solid`): cylindrical tube segments and boxes.
- The unit system shared by every crate in the workspace (`units`).

Design notes:
- Deterministic: no ambient RNG, no hidden counters.
- Lengths in millimetres, energies in MeV, times in nanoseconds.
"]
#![forbid(unsafe_code)]

/// Vector and rotation math.
pub mod math;
/// Solid (shape) descriptors.
pub mod solid;
/// Placement and bounding types.
pub mod types;
/// Unit constants (mm / MeV / ns base).
pub mod units;

pub use math::{Quat, Vec3};
pub use solid::Solid;
pub use types::aabb::Aabb;
pub use types::transform::Transform;
