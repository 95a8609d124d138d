// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Calibration source variants.
//!
//! A source assembly is a thin radioactive carrier disc, an entry foil on the
//! detector-facing side, an optional exit foil on the far side, and a holder
//! ring. Every offset below is measured along Z from the requested source
//! position, which is the center of the carrier.

use ndd_geom::units::{CM, INCH, MM, NM, UM};
use ndd_geom::Vec3;

use crate::geometry::VolumeId;
use crate::material::names;

/// Radius shared by every carrier disc.
pub const CARRIER_RADIUS: f64 = 1.0 * MM;

/// Source identity keyed by the integer id used in run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// Id 0: Ca-45 on a CaCl2 carrier.
    Ca45,
    /// Id 1: Ba-133 in a PMMA holder.
    Ba133,
    /// Id 2: sealed Ba-133. Reserved; builds no geometry.
    Ba133Sealed,
    /// Id 3: Bi-207.
    Bi207,
    /// Id 4: Sn-113 / Ce-139.
    Sn113Ce139,
    /// Any other id; builds no geometry.
    Unrecognized(i32),
}

impl SourceKind {
    /// Maps a configuration id onto a variant.
    pub fn from_id(id: i32) -> Self {
        match id {
            0 => Self::Ca45,
            1 => Self::Ba133,
            2 => Self::Ba133Sealed,
            3 => Self::Bi207,
            4 => Self::Sn113Ce139,
            other => Self::Unrecognized(other),
        }
    }

    /// Configuration id of this variant.
    pub fn id(self) -> i32 {
        match self {
            Self::Ca45 => 0,
            Self::Ba133 => 1,
            Self::Ba133Sealed => 2,
            Self::Bi207 => 3,
            Self::Sn113Ce139 => 4,
            Self::Unrecognized(id) => id,
        }
    }

    /// Geometric recipe, or `None` for variants that build nothing.
    pub fn recipe(self) -> Option<SourceRecipe> {
        match self {
            Self::Ca45 => Some(SourceRecipe::ca45()),
            Self::Ba133 => Some(SourceRecipe::ba133()),
            Self::Bi207 => Some(SourceRecipe::bismuth_carrier(self, 7.0 * UM)),
            Self::Sn113Ce139 => Some(SourceRecipe::bismuth_carrier(self, 1.0 * NM)),
            Self::Ba133Sealed | Self::Unrecognized(_) => None,
        }
    }
}

/// Solid disc layer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiskSpec {
    /// Outer radius.
    pub radius: f64,
    /// Extent along Z.
    pub thickness: f64,
    /// Catalog name of the material.
    pub material: &'static str,
}

/// Annular holder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RingSpec {
    /// Inner radius.
    pub inner_radius: f64,
    /// Outer radius.
    pub outer_radius: f64,
    /// Extent along Z.
    pub thickness: f64,
    /// Catalog name of the material.
    pub material: &'static str,
}

/// Dimensions and materials of one source assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceRecipe {
    /// Variant this recipe belongs to.
    pub kind: SourceKind,
    /// Radioactive carrier disc.
    pub carrier: DiskSpec,
    /// Foil between the carrier and the detector (+Z side).
    pub entry_foil: DiskSpec,
    /// Foil on the far side (-Z). Only placed on request.
    pub exit_foil: Option<DiskSpec>,
    /// Holder ring.
    pub holder: RingSpec,
    /// Z offset of the holder center from the carrier center.
    pub holder_offset: f64,
}

impl SourceRecipe {
    fn ca45() -> Self {
        let ring_inner = 2.3 / 2.0 * CM;
        Self {
            kind: SourceKind::Ca45,
            carrier: DiskSpec {
                radius: CARRIER_RADIUS,
                thickness: 60.0 * NM,
                material: names::CACL2,
            },
            // Clipped to the ring bore; a wider foil would cut through the
            // holder, which is centered on the carrier.
            entry_foil: DiskSpec {
                radius: ring_inner,
                thickness: 500.0 * NM,
                material: names::SIX_F_SIX_F,
            },
            exit_foil: None,
            holder: RingSpec {
                inner_radius: ring_inner,
                outer_radius: INCH / 2.0,
                thickness: 3.0 * MM,
                material: names::ALUMINUM,
            },
            holder_offset: 0.0,
        }
    }

    fn ba133() -> Self {
        let carrier = DiskSpec {
            radius: CARRIER_RADIUS,
            thickness: 10.0 * NM,
            material: names::BARIUM,
        };
        let exit_foil = DiskSpec {
            radius: 11.0 * MM,
            thickness: 12.5 * UM,
            material: names::KAPTON,
        };
        let holder = RingSpec {
            inner_radius: 8.0 * MM,
            outer_radius: 15.0 * MM,
            thickness: 1.0 * MM,
            material: names::PMMA,
        };
        Self {
            kind: SourceKind::Ba133,
            carrier,
            entry_foil: DiskSpec {
                radius: 11.0 * MM,
                thickness: 10.0 * UM,
                material: names::MYLAR,
            },
            exit_foil: Some(exit_foil),
            holder,
            holder_offset: (carrier.thickness + holder.thickness) / 2.0 + exit_foil.thickness,
        }
    }

    fn bismuth_carrier(kind: SourceKind, carrier_thickness: f64) -> Self {
        let bore = 0.87 * INCH / 2.0;
        let foil = DiskSpec {
            radius: bore,
            thickness: 5.0 * UM,
            material: names::MYLAR,
        };
        Self {
            kind,
            carrier: DiskSpec {
                radius: CARRIER_RADIUS,
                thickness: carrier_thickness,
                material: names::BISMUTH,
            },
            entry_foil: foil,
            exit_foil: Some(foil),
            holder: RingSpec {
                inner_radius: bore,
                outer_radius: INCH / 2.0,
                thickness: 0.13 * INCH,
                material: names::ALUMINUM,
            },
            holder_offset: 0.0,
        }
    }

    /// Z offset of the entry foil center: flush against the carrier's +Z face.
    pub fn entry_foil_offset(&self) -> f64 {
        (self.entry_foil.thickness + self.carrier.thickness) / 2.0
    }

    /// Z offset of the exit foil center: flush against the carrier's -Z face.
    pub fn exit_foil_offset(&self) -> Option<f64> {
        self.exit_foil
            .map(|foil| -(foil.thickness + self.carrier.thickness) / 2.0)
    }

    /// Step ceiling for the carrier at the given thickness fraction.
    pub fn carrier_step_limit(&self, fraction: f64) -> f64 {
        fraction * self.carrier.thickness
    }

    /// Step ceiling for the entry foil at the given thickness fraction.
    pub fn foil_step_limit(&self, fraction: f64) -> f64 {
        fraction * self.entry_foil.thickness
    }

    /// Carrier center for a source at `position`.
    pub fn carrier_center(&self, position: Vec3) -> Vec3 {
        position
    }

    /// Entry foil center for a carrier at `position`.
    pub fn entry_foil_center(&self, position: Vec3) -> Vec3 {
        position.offset_z(self.entry_foil_offset())
    }

    /// Exit foil center for a carrier at `position`.
    pub fn exit_foil_center(&self, position: Vec3) -> Option<Vec3> {
        self.exit_foil_offset().map(|dz| position.offset_z(dz))
    }

    /// Holder center for a carrier at `position`.
    pub fn holder_center(&self, position: Vec3) -> Vec3 {
        position.offset_z(self.holder_offset)
    }
}

/// Volumes created for one instantiated source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceAssembly {
    /// Variant that was built.
    pub kind: SourceKind,
    /// Carrier center in the world frame.
    pub position: Vec3,
    /// Carrier volume.
    pub carrier: VolumeId,
    /// Entry foil volume.
    pub entry_foil: VolumeId,
    /// Exit foil volume, when placed.
    pub exit_foil: Option<VolumeId>,
    /// Holder ring volume.
    pub holder: VolumeId,
}

impl SourceAssembly {
    /// All volumes of the assembly in placement order.
    pub fn volumes(&self) -> Vec<VolumeId> {
        let mut out = vec![self.carrier, self.entry_foil];
        out.extend(self.exit_foil);
        out.push(self.holder);
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn ids_round_trip() {
        for id in [-3, 0, 1, 2, 3, 4, 5, 99] {
            assert_eq!(SourceKind::from_id(id).id(), id);
        }
    }

    #[test]
    fn reserved_and_unknown_ids_have_no_recipe() {
        assert!(SourceKind::from_id(2).recipe().is_none());
        assert!(SourceKind::from_id(99).recipe().is_none());
        assert!(SourceKind::from_id(-1).recipe().is_none());
    }

    #[test]
    fn ba133_holder_clears_the_entry_foil() {
        let r = SourceKind::Ba133.recipe().unwrap();
        let foil_top = r.entry_foil_offset() + r.entry_foil.thickness / 2.0;
        let holder_bottom = r.holder_offset - r.holder.thickness / 2.0;
        assert!(holder_bottom >= foil_top);
        assert_eq!(r.exit_foil.unwrap().material, names::KAPTON);
    }

    #[test]
    fn foils_sit_flush_on_the_carrier() {
        let r = SourceKind::Bi207.recipe().unwrap();
        let carrier_top = r.carrier.thickness / 2.0;
        let foil_bottom = r.entry_foil_offset() - r.entry_foil.thickness / 2.0;
        assert!((carrier_top - foil_bottom).abs() < 1e-15);
        let exit = r.exit_foil_offset().unwrap();
        assert!((exit + r.exit_foil.unwrap().thickness / 2.0 + carrier_top).abs() < 1e-15);
    }

    #[test]
    fn variants_three_and_four_differ_only_in_carrier_thickness() {
        let bi = SourceKind::Bi207.recipe().unwrap();
        let sn = SourceKind::Sn113Ce139.recipe().unwrap();
        assert_eq!(bi.holder, sn.holder);
        assert_eq!(bi.entry_foil, sn.entry_foil);
        assert!(bi.carrier.thickness > sn.carrier.thickness);
    }

    #[test]
    fn ca45_has_no_exit_foil() {
        let r = SourceKind::Ca45.recipe().unwrap();
        assert!(r.exit_foil.is_none());
        assert!(r.entry_foil.radius <= r.holder.inner_radius);
    }
}
