// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Quat, Vec3};

/// Rigid placement of a daughter volume inside its mother.
///
/// Conventions:
/// - `translation` in millimetres, expressed in the mother frame.
/// - `rotation` is optional; `None` means the daughter axes coincide with the
///   mother axes. When present it rotates the daughter frame relative to the
///   mother frame (active convention).
/// - A point `p` given in the daughter frame maps to `R·p + t` in the mother
///   frame.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    translation: Vec3,
    rotation: Option<Quat>,
}

impl Transform {
    /// Identity placement (no translation, no rotation).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: None,
        }
    }

    /// Pure translation.
    #[must_use]
    pub const fn translation_only(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: None,
        }
    }

    /// Translation plus rotation.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation: Some(rotation),
        }
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component, if any.
    #[must_use]
    pub fn rotation(&self) -> Option<Quat> {
        self.rotation
    }

    /// Maps a point from the daughter frame into the mother frame.
    #[must_use]
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        let rotated = match &self.rotation {
            Some(q) => q.rotate(p),
            None => *p,
        };
        rotated.add(&self.translation)
    }

    /// Composes `self` (mother placement) with `inner` (daughter placement):
    /// the result maps daughter-of-daughter points straight into `self`'s
    /// mother frame.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        let translation = self.transform_point(&inner.translation);
        let rotation = match (self.rotation, inner.rotation) {
            (None, None) => None,
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (Some(a), Some(b)) => Some(a.multiply(&b)),
        };
        Self {
            translation,
            rotation,
        }
    }
}
