// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Volume hierarchy produced by the detector construction.
//!
//! Volumes live in a flat arena indexed by [`VolumeId`]; index 0 is always
//! the world. Every other volume has exactly one parent and its placement is
//! expressed in the parent frame.
//!
//! Digest contract
//! - [`GeometryTree::digest`] is a BLAKE3 hash over a canonical byte stream.
//! - Volumes are visited in arena order, which is placement order.
//! - Numbers are encoded little-endian: `u32` for ids and counts, the raw
//!   IEEE-754 bits of each `f64`. Strings are prefixed by an 8-byte LE length.
//! - Optional fields are prefixed by a one-byte presence tag.

use blake3::Hasher;
use ndd_geom::{Aabb, Solid, Transform};
use thiserror::Error;

use crate::hits::Touchable;
use crate::ident::{short_hex, Hash};
use crate::material::MaterialId;

/// Penetration depth (mm) below which touching solids count as abutting.
pub const OVERLAP_TOLERANCE: f64 = 1e-9;

/// Handle to a volume inside one [`GeometryTree`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VolumeId(u32);

impl VolumeId {
    /// The world volume of every tree.
    pub const WORLD: Self = Self(0);

    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Upper bound on the length of a single step inside a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepLimit {
    /// Maximum step length (mm).
    pub max_step: f64,
}

/// Display attributes attached to a volume. Data only.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisHint {
    /// Not drawn.
    Invisible,
    /// Drawn as a wireframe in the given RGB colour (components in `[0, 1]`).
    Wireframe {
        /// Red, green, blue.
        rgb: [f64; 3],
    },
}

impl VisHint {
    /// Pure green wireframe.
    pub const GREEN: Self = Self::Wireframe {
        rgb: [0.0, 1.0, 0.0],
    };
    /// Pure red wireframe.
    pub const RED: Self = Self::Wireframe {
        rgb: [1.0, 0.0, 0.0],
    };
}

/// One placed solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume name; doubles as the readout-channel name.
    pub name: String,
    /// Shape in the volume's own frame.
    pub solid: Solid,
    /// Filling material.
    pub material: MaterialId,
    /// Placement in the parent frame (identity for the world).
    pub placement: Transform,
    /// Index among same-named siblings, starting at 0.
    pub copy_number: u32,
    /// Parent volume (`None` only for the world).
    pub parent: Option<VolumeId>,
    /// Daughters in placement order.
    pub children: Vec<VolumeId>,
    /// Optional step-size ceiling.
    pub step_limit: Option<StepLimit>,
    /// Optional display attributes.
    pub vis: Option<VisHint>,
}

impl Volume {
    /// Readout identity reported to the hit collector for steps in this volume.
    pub fn touchable(&self) -> Touchable {
        Touchable {
            copy_number: self.copy_number,
            volume_name: self.name.clone(),
        }
    }
}

/// Errors raised while editing a tree.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A volume id that does not belong to this tree.
    #[error("unknown volume {0:?}")]
    UnknownVolume(VolumeId),
    /// Non-finite or degenerate solid dimensions.
    #[error("invalid solid for volume {0}")]
    InvalidSolid(String),
    /// Step ceilings must be positive and finite.
    #[error("invalid step limit {max_step} for volume {name}")]
    InvalidStepLimit {
        /// Volume name.
        name: String,
        /// Rejected ceiling.
        max_step: f64,
    },
}

/// Arena of volumes rooted at the world.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryTree {
    volumes: Vec<Volume>,
}

impl GeometryTree {
    /// Creates a tree holding only the world volume.
    ///
    /// # Errors
    /// [`GeometryError::InvalidSolid`] when the world solid is degenerate.
    pub fn with_world(name: &str, solid: Solid, material: MaterialId) -> Result<Self, GeometryError> {
        if !solid.is_valid() {
            return Err(GeometryError::InvalidSolid(name.to_owned()));
        }
        Ok(Self {
            volumes: vec![Volume {
                name: name.to_owned(),
                solid,
                material,
                placement: Transform::identity(),
                copy_number: 0,
                parent: None,
                children: Vec::new(),
                step_limit: None,
                vis: None,
            }],
        })
    }

    /// Places a daughter volume inside `parent`.
    ///
    /// The copy number is the count of siblings already placed under
    /// `parent` with the same name.
    pub fn place(
        &mut self,
        parent: VolumeId,
        name: &str,
        solid: Solid,
        material: MaterialId,
        placement: Transform,
    ) -> Result<VolumeId, GeometryError> {
        if !solid.is_valid() || !placement.translation().is_finite() {
            return Err(GeometryError::InvalidSolid(name.to_owned()));
        }
        let siblings = &self
            .volumes
            .get(parent.index())
            .ok_or(GeometryError::UnknownVolume(parent))?
            .children;
        let copy_number = siblings
            .iter()
            .filter(|id| self.volumes[id.index()].name == name)
            .count();
        let id = VolumeId(u32::try_from(self.volumes.len()).unwrap_or(u32::MAX));
        self.volumes.push(Volume {
            name: name.to_owned(),
            solid,
            material,
            placement,
            copy_number: u32::try_from(copy_number).unwrap_or(u32::MAX),
            parent: Some(parent),
            children: Vec::new(),
            step_limit: None,
            vis: None,
        });
        self.volumes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Attaches a step ceiling to a volume, replacing any earlier one.
    pub fn set_step_limit(&mut self, id: VolumeId, max_step: f64) -> Result<(), GeometryError> {
        let volume = self.volume_mut(id)?;
        if !(max_step.is_finite() && max_step > 0.0) {
            return Err(GeometryError::InvalidStepLimit {
                name: volume.name.clone(),
                max_step,
            });
        }
        volume.step_limit = Some(StepLimit { max_step });
        Ok(())
    }

    /// Attaches display attributes to a volume.
    pub fn set_vis(&mut self, id: VolumeId, vis: VisHint) -> Result<(), GeometryError> {
        self.volume_mut(id)?.vis = Some(vis);
        Ok(())
    }

    fn volume_mut(&mut self, id: VolumeId) -> Result<&mut Volume, GeometryError> {
        self.volumes
            .get_mut(id.index())
            .ok_or(GeometryError::UnknownVolume(id))
    }

    /// The world volume.
    pub fn world(&self) -> &Volume {
        &self.volumes[0]
    }

    /// Looks up a volume.
    pub fn volume(&self, id: VolumeId) -> Option<&Volume> {
        self.volumes.get(id.index())
    }

    /// Daughters of `id` in placement order (empty for unknown ids).
    pub fn children(&self, id: VolumeId) -> &[VolumeId] {
        self.volumes
            .get(id.index())
            .map_or(&[], |v| v.children.as_slice())
    }

    /// All volumes in placement order.
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, &Volume)> + '_ {
        self.volumes
            .iter()
            .enumerate()
            .map(|(i, v)| (VolumeId(u32::try_from(i).unwrap_or(u32::MAX)), v))
    }

    /// Number of volumes, world included.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Always `false`: a tree holds at least its world.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// First volume with the given name and copy number.
    pub fn find(&self, name: &str, copy_number: u32) -> Option<VolumeId> {
        self.iter()
            .find(|(_, v)| v.name == name && v.copy_number == copy_number)
            .map(|(id, _)| id)
    }

    /// Placement of `id` expressed in the world frame.
    pub fn global_transform(&self, id: VolumeId) -> Option<Transform> {
        let mut volume = self.volume(id)?;
        let mut acc = volume.placement;
        while let Some(parent) = volume.parent {
            volume = self.volume(parent)?;
            acc = volume.placement.compose(&acc);
        }
        Some(acc)
    }

    /// World-frame bounding box of `id`.
    pub fn global_aabb(&self, id: VolumeId) -> Option<Aabb> {
        let transform = self.global_transform(id)?;
        Some(self.volume(id)?.solid.local_aabb().transformed(&transform))
    }

    /// Pairs of sibling volumes whose interiors intersect.
    ///
    /// Coaxial tubes rotated only about their own axis are compared exactly
    /// (Z interval and radial interval); anything else falls back to the
    /// bounding boxes in the parent frame.
    pub fn overlapping_siblings(&self) -> Vec<(VolumeId, VolumeId)> {
        let mut out = Vec::new();
        for (_, parent) in self.iter() {
            for (i, a) in parent.children.iter().enumerate() {
                for b in &parent.children[i + 1..] {
                    if self.siblings_overlap(*a, *b) {
                        out.push((*a, *b));
                    }
                }
            }
        }
        out
    }

    fn siblings_overlap(&self, a: VolumeId, b: VolumeId) -> bool {
        let (va, vb) = (&self.volumes[a.index()], &self.volumes[b.index()]);
        let (ta, tb) = (va.placement.translation(), vb.placement.translation());
        let coaxial = ta.x() == tb.x() && ta.y() == tb.y();
        let axis_preserving = |t: &Transform| {
            t.rotation().map_or(true, |q| {
                let [x, y, _, _] = q.to_array();
                x.abs() < ndd_geom::math::EPSILON && y.abs() < ndd_geom::math::EPSILON
            })
        };
        let tubes = matches!(va.solid, Solid::Tube { .. }) && matches!(vb.solid, Solid::Tube { .. });
        if tubes && coaxial && axis_preserving(&va.placement) && axis_preserving(&vb.placement) {
            let (ha, hb) = (va.solid.half_z(), vb.solid.half_z());
            let z_overlap = ta.z() - ha < tb.z() + hb - OVERLAP_TOLERANCE
                && tb.z() - hb < ta.z() + ha - OVERLAP_TOLERANCE;
            let (ia, oa) = va.solid.radial_extent();
            let (ib, ob) = vb.solid.radial_extent();
            let r_overlap = ia < ob - OVERLAP_TOLERANCE && ib < oa - OVERLAP_TOLERANCE;
            return z_overlap && r_overlap;
        }
        let box_a = va.solid.local_aabb().transformed(&va.placement);
        let box_b = vb.solid.local_aabb().transformed(&vb.placement);
        box_a.overlaps(&box_b)
    }

    /// Daughters that poke out of their mother's bounding box.
    pub fn protruding_daughters(&self) -> Vec<VolumeId> {
        self.iter()
            .filter_map(|(id, v)| {
                let parent = self.volume(v.parent?)?;
                let bounds = v.solid.local_aabb().transformed(&v.placement);
                (!parent.solid.local_aabb().contains(&bounds)).then_some(id)
            })
            .collect()
    }

    /// Canonical BLAKE3 digest of the whole tree (see module docs).
    pub fn digest(&self) -> Hash {
        let mut hasher = Hasher::new();
        hasher.update(&(self.volumes.len() as u64).to_le_bytes());
        for volume in &self.volumes {
            hasher.update(&(volume.name.len() as u64).to_le_bytes());
            hasher.update(volume.name.as_bytes());
            encode_solid(&mut hasher, &volume.solid);
            hasher.update(&volume.material.value().to_le_bytes());
            encode_f64s(&mut hasher, &volume.placement.translation().to_array());
            match volume.placement.rotation() {
                Some(q) => {
                    hasher.update(&[1]);
                    encode_f64s(&mut hasher, &q.to_array());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            hasher.update(&volume.copy_number.to_le_bytes());
            hasher.update(&volume.parent.map_or(u32::MAX, |p| p.0).to_le_bytes());
            match volume.step_limit {
                Some(limit) => {
                    hasher.update(&[1]);
                    encode_f64s(&mut hasher, &[limit.max_step]);
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            match volume.vis {
                None => {
                    hasher.update(&[0]);
                }
                Some(VisHint::Invisible) => {
                    hasher.update(&[1]);
                }
                Some(VisHint::Wireframe { rgb }) => {
                    hasher.update(&[2]);
                    encode_f64s(&mut hasher, &rgb);
                }
            }
        }
        hasher.finalize().into()
    }

    /// First 8 bytes of [`Self::digest`] as hex.
    pub fn short_digest(&self) -> String {
        short_hex(&self.digest())
    }
}

fn encode_f64s(hasher: &mut Hasher, values: &[f64]) {
    for v in values {
        hasher.update(&v.to_bits().to_le_bytes());
    }
}

fn encode_solid(hasher: &mut Hasher, solid: &Solid) {
    match *solid {
        Solid::Tube {
            inner_radius,
            outer_radius,
            half_length,
            start_angle,
            span_angle,
        } => {
            hasher.update(&[0]);
            encode_f64s(
                hasher,
                &[inner_radius, outer_radius, half_length, start_angle, span_angle],
            );
        }
        Solid::Box {
            half_x,
            half_y,
            half_z,
        } => {
            hasher.update(&[1]);
            encode_f64s(hasher, &[half_x, half_y, half_z]);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::material::{Composition, MaterialCatalogBuilder};
    use ndd_geom::{Quat, Vec3};

    fn vacuum() -> MaterialId {
        MaterialCatalogBuilder::new()
            .define_material(
                "Vacuum",
                1e-25,
                Composition::Simple {
                    atomic_number: 1,
                    atomic_mass: 1.0,
                },
            )
            .unwrap()
    }

    fn world() -> GeometryTree {
        GeometryTree::with_world("World", Solid::cuboid(100.0, 100.0, 100.0), vacuum()).unwrap()
    }

    #[test]
    fn copy_numbers_count_same_named_siblings() {
        let mut tree = world();
        let m = vacuum();
        let a = tree.place(VolumeId::WORLD, "Foil", Solid::disc(1.0, 1.0), m, Transform::identity()).unwrap();
        let b = tree
            .place(VolumeId::WORLD, "Carrier", Solid::disc(1.0, 1.0), m, Transform::identity())
            .unwrap();
        let c = tree
            .place(
                VolumeId::WORLD,
                "Foil",
                Solid::disc(1.0, 1.0),
                m,
                Transform::translation_only(Vec3::new(0.0, 0.0, 5.0)),
            )
            .unwrap();
        assert_eq!(tree.volume(a).unwrap().copy_number, 0);
        assert_eq!(tree.volume(b).unwrap().copy_number, 0);
        assert_eq!(tree.volume(c).unwrap().copy_number, 1);
        assert_eq!(tree.find("Foil", 1), Some(c));
        assert_eq!(tree.children(VolumeId::WORLD), &[a, b, c]);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut tree = world();
        let err = tree
            .place(
                VolumeId(7),
                "Orphan",
                Solid::disc(1.0, 1.0),
                vacuum(),
                Transform::identity(),
            )
            .unwrap_err();
        assert_eq!(err, GeometryError::UnknownVolume(VolumeId(7)));
    }

    #[test]
    fn ring_around_disc_is_not_an_overlap() {
        let mut tree = world();
        let m = vacuum();
        tree.place(VolumeId::WORLD, "Carrier", Solid::disc(1.0, 0.01), m, Transform::identity())
            .unwrap();
        tree.place(VolumeId::WORLD, "Ring", Solid::tube(8.0, 15.0, 3.0), m, Transform::identity())
            .unwrap();
        assert!(tree.overlapping_siblings().is_empty());
        tree.place(VolumeId::WORLD, "Plate", Solid::disc(20.0, 1.0), m, Transform::identity())
            .unwrap();
        assert_eq!(tree.overlapping_siblings().len(), 2);
    }

    #[test]
    fn digest_tracks_rotation() {
        let m = vacuum();
        let mut a = world();
        let mut b = world();
        a.place(VolumeId::WORLD, "Si", Solid::disc(5.0, 1.0), m, Transform::identity())
            .unwrap();
        b.place(
            VolumeId::WORLD,
            "Si",
            Solid::disc(5.0, 1.0),
            m,
            Transform::new(Vec3::ZERO, Quat::from_rotation_z(0.5)),
        )
        .unwrap();
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), a.clone().digest());
        assert_eq!(a.short_digest().len(), 16);
    }

    #[test]
    fn non_positive_step_limit_is_rejected() {
        let mut tree = world();
        assert!(tree.set_step_limit(VolumeId::WORLD, 0.0).is_err());
        assert!(tree.set_step_limit(VolumeId::WORLD, f64::NAN).is_err());
        tree.set_step_limit(VolumeId::WORLD, 1e-5).unwrap();
        assert_eq!(tree.world().step_limit, Some(StepLimit { max_step: 1e-5 }));
    }
}
