// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Vector and rotation helpers used by volume placement and hit positions.
//!
//! All operations are plain `f64` without fused multiply-add so identical
//! inputs produce identical geometry trees on every platform.

mod quat;
mod vec3;

pub use quat::Quat;
pub use vec3::Vec3;

/// Degeneracy threshold used when normalising axes and quaternions.
pub const EPSILON: f64 = 1e-12;
