// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Placement and bounding types used by the volume tree.
//!
//! Determinism notes:
//! - Overlap is tested on open interiors, so abutting volumes (shared face)
//!   are *not* reported as overlapping.
//! - Transforms compose without fused multiply-add.

#[doc = "Axis-aligned bounding boxes (mother-frame coordinates)."]
pub mod aabb;
#[doc = "Rigid placements (translation + rotation)."]
pub mod transform;
