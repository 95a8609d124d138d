// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Material catalog: elements and materials defined by elemental composition.
//!
//! The catalog is assembled once through [`MaterialCatalogBuilder`] and then
//! frozen into an immutable [`MaterialCatalog`]. The frozen catalog holds
//! plain data only, so it is `Send + Sync` and can be shared across event
//! workers behind an `Arc` without locking.
//!
//! Mass fractions are stored exactly as given; they are not normalised and
//! are not checked to sum to one.

use std::fmt;

use ndd_geom::units::{ATMOSPHERE, G_PER_CM3, G_PER_MOLE, KG_PER_M3, MG_PER_CM3, PERCENT};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Handle to an element inside one catalog.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ElementId(u32);

/// Handle to a material inside one catalog.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MaterialId(u32);

impl ElementId {
    /// Raw table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MaterialId {
    /// Raw table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw value, used in canonical encodings.
    pub fn value(self) -> u32 {
        self.0
    }
}

/// Chemical element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element name ("Nitrogen").
    pub name: String,
    /// Chemical symbol ("N").
    pub symbol: String,
    /// Atomic number Z.
    pub atomic_number: u32,
    /// Molar mass in g/mole.
    pub atomic_mass: f64,
}

/// Elemental make-up of a material.
///
/// A compound uses either mass fractions or atom counts, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// Single-element material given directly by Z and A.
    Simple {
        /// Atomic number Z.
        atomic_number: u32,
        /// Molar mass in g/mole.
        atomic_mass: f64,
    },
    /// Ordered (element, mass fraction) pairs.
    MassFractions(Vec<(ElementId, f64)>),
    /// Ordered (element, atoms per molecule) pairs.
    AtomCounts(Vec<(ElementId, u32)>),
}

impl Composition {
    /// Number of components (1 for simple materials).
    pub fn len(&self) -> usize {
        match self {
            Self::Simple { .. } => 1,
            Self::MassFractions(parts) => parts.len(),
            Self::AtomCounts(parts) => parts.len(),
        }
    }

    /// `true` for a compound with no components.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element_ids(&self) -> Vec<ElementId> {
        match self {
            Self::Simple { .. } => Vec::new(),
            Self::MassFractions(parts) => parts.iter().map(|(e, _)| *e).collect(),
            Self::AtomCounts(parts) => parts.iter().map(|(e, _)| *e).collect(),
        }
    }
}

/// Named material with density and composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Unique material name.
    pub name: String,
    /// Density in g/cm³.
    pub density: f64,
    /// Elemental composition.
    pub composition: Composition,
}

/// Errors raised while defining elements or materials.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A material or element with this name already exists.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// "material" or "element".
        kind: &'static str,
        /// Offending name.
        name: String,
    },
    /// A composition referenced an element handle not issued by this builder.
    #[error("material {material} references unknown element {element:?}")]
    UnknownElement {
        /// Material being defined.
        material: String,
        /// Offending handle.
        element: ElementId,
    },
    /// Density (or molar mass) was not a positive finite number.
    #[error("invalid {quantity} for {name}: {value}")]
    InvalidQuantity {
        /// Which quantity was invalid.
        quantity: &'static str,
        /// Element or material name.
        name: String,
        /// Rejected value.
        value: f64,
    },
    /// A compound was defined without components.
    #[error("material {0} has an empty composition")]
    EmptyComposition(String),
}

/// Mutable staging area for elements and materials.
#[derive(Debug, Default)]
pub struct MaterialCatalogBuilder {
    elements: Vec<Element>,
    materials: Vec<Material>,
    element_index: FxHashMap<String, ElementId>,
    material_index: FxHashMap<String, MaterialId>,
}

impl MaterialCatalogBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a new element.
    ///
    /// # Errors
    /// [`CatalogError::DuplicateName`] if an element with `name` exists;
    /// [`CatalogError::InvalidQuantity`] for a non-positive molar mass.
    pub fn define_element(
        &mut self,
        name: &str,
        symbol: &str,
        atomic_number: u32,
        atomic_mass: f64,
    ) -> Result<ElementId, CatalogError> {
        if self.element_index.contains_key(name) {
            return Err(CatalogError::DuplicateName {
                kind: "element",
                name: name.to_owned(),
            });
        }
        check_positive("atomic mass", name, atomic_mass)?;
        let id = ElementId(table_index(self.elements.len()));
        self.elements.push(Element {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            atomic_number,
            atomic_mass,
        });
        self.element_index.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Defines a new material.
    ///
    /// # Errors
    /// [`CatalogError::DuplicateName`] if a material with `name` exists (the
    /// catalog never shadows an earlier definition), plus density and
    /// composition checks.
    pub fn define_material(
        &mut self,
        name: &str,
        density: f64,
        composition: Composition,
    ) -> Result<MaterialId, CatalogError> {
        if self.material_index.contains_key(name) {
            return Err(CatalogError::DuplicateName {
                kind: "material",
                name: name.to_owned(),
            });
        }
        check_positive("density", name, density)?;
        if let Composition::Simple { atomic_mass, .. } = composition {
            check_positive("atomic mass", name, atomic_mass)?;
        }
        if composition.is_empty() {
            return Err(CatalogError::EmptyComposition(name.to_owned()));
        }
        if let Some(bad) = composition
            .element_ids()
            .into_iter()
            .find(|e| e.index() >= self.elements.len())
        {
            return Err(CatalogError::UnknownElement {
                material: name.to_owned(),
                element: bad,
            });
        }
        let id = MaterialId(table_index(self.materials.len()));
        self.materials.push(Material {
            name: name.to_owned(),
            density,
            composition,
        });
        self.material_index.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Looks up an already defined element by name.
    pub fn element(&self, name: &str) -> Option<ElementId> {
        self.element_index.get(name).copied()
    }

    /// Freezes the builder into an immutable catalog.
    pub fn build(self) -> MaterialCatalog {
        info!(
            elements = self.elements.len(),
            materials = self.materials.len(),
            "material catalog built"
        );
        let catalog = MaterialCatalog {
            elements: self.elements,
            materials: self.materials,
            element_index: self.element_index,
            material_index: self.material_index,
        };
        debug!("material definitions:\n{catalog}");
        catalog
    }
}

fn check_positive(quantity: &'static str, name: &str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidQuantity {
            quantity,
            name: name.to_owned(),
            value,
        })
    }
}

fn table_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Immutable, shareable table of elements and materials.
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    elements: Vec<Element>,
    materials: Vec<Material>,
    element_index: FxHashMap<String, ElementId>,
    material_index: FxHashMap<String, MaterialId>,
}

impl MaterialCatalog {
    /// Returns the material for `id`, if it belongs to this catalog.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Returns the element for `id`, if it belongs to this catalog.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Looks up a material handle by name.
    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.material_index.get(name).copied()
    }

    /// Looks up an element handle by name.
    pub fn find_element(&self, name: &str) -> Option<ElementId> {
        self.element_index.get(name).copied()
    }

    /// Materials in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> + '_ {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(table_index(i)), m))
    }

    /// Materials in definition order, indexable by [`MaterialId::index`].
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Elements in definition order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// `true` when no material is defined.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl fmt::Display for MaterialCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Material Definitions ({} materials)", self.materials.len())?;
        for material in &self.materials {
            writeln!(
                f,
                " Material: {:>12}  density: {:.6e} g/cm3",
                material.name,
                material.density / G_PER_CM3
            )?;
            match &material.composition {
                Composition::Simple {
                    atomic_number,
                    atomic_mass,
                } => writeln!(f, "   -> Z = {atomic_number:>3}  A = {atomic_mass:>8.4} g/mole")?,
                Composition::MassFractions(parts) => {
                    for (id, fraction) in parts {
                        let symbol = self.element(*id).map_or("?", |e| e.symbol.as_str());
                        writeln!(f, "   -> {symbol:>3}  mass fraction: {:>7.3} %", fraction / PERCENT)?;
                    }
                }
                Composition::AtomCounts(parts) => {
                    for (id, count) in parts {
                        let symbol = self.element(*id).map_or("?", |e| e.symbol.as_str());
                        writeln!(f, "   -> {symbol:>3}  atoms: {count}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Names of the materials defined by [`standard_catalog`].
pub mod names {
    /// Air at STP.
    pub const AIR: &str = "Air";
    /// Low-pressure air filling the world volume.
    pub const VACUUM: &str = "Vacuum";
    /// Detector silicon.
    pub const SILICON: &str = "Silicon";
    /// Copper.
    pub const COPPER: &str = "Copper";
    /// Stainless steel.
    pub const STAINLESS_STEEL: &str = "SS";
    /// Aluminium.
    pub const ALUMINUM: &str = "Aluminum";
    /// Tin.
    pub const TIN: &str = "Tin";
    /// Barium.
    pub const BARIUM: &str = "Barium";
    /// Bismuth.
    pub const BISMUTH: &str = "Bismuth";
    /// Mylar foil.
    pub const MYLAR: &str = "Mylar";
    /// Kapton foil.
    pub const KAPTON: &str = "Kapton";
    /// PMMA (acrylic).
    pub const PMMA: &str = "PMMA";
    /// 6F6F polyimide foil.
    pub const SIX_F_SIX_F: &str = "6F6F";
    /// Alumina detector backing.
    pub const ALUMINA: &str = "Alumina";
    /// Calcium chloride source carrier.
    pub const CACL2: &str = "CaCl2";
    /// Beryllium.
    pub const BERYLLIUM: &str = "Beryllium";
    /// Germanium.
    pub const GERMANIUM: &str = "Germanium";
    /// Water.
    pub const WATER: &str = "Water";
}

/// Density of air at STP.
pub const AIR_DENSITY_STP: f64 = 1.293 * MG_PER_CM3;

/// Builds the stock catalog used by the detector construction.
///
/// The vacuum filling the world is air thinned proportionally to
/// `vacuum_pressure_torr / 760`.
pub fn standard_catalog(vacuum_pressure_torr: f64) -> Result<MaterialCatalog, CatalogError> {
    let mut b = MaterialCatalogBuilder::new();

    let n = b.define_element("Nitrogen", "N", 7, 14.01 * G_PER_MOLE)?;
    let o = b.define_element("Oxygen", "O", 8, 16.00 * G_PER_MOLE)?;
    let air = Composition::MassFractions(vec![(n, 70.0 * PERCENT), (o, 30.0 * PERCENT)]);
    b.define_material(names::AIR, AIR_DENSITY_STP, air.clone())?;
    b.define_material(
        names::VACUUM,
        AIR_DENSITY_STP * vacuum_pressure_torr / ATMOSPHERE,
        air,
    )?;

    b.define_material(names::SILICON, 2.329 * G_PER_CM3, simple(14, 28.086))?;
    b.define_material(names::COPPER, 8.94 * G_PER_CM3, simple(29, 63.546))?;

    let c = b.define_element("Carbon", "C", 6, 12.011 * G_PER_MOLE)?;
    let si = b.define_element("Silicon", "Si", 14, 28.086 * G_PER_MOLE)?;
    let cr = b.define_element("Chromium", "Cr", 24, 51.996 * G_PER_MOLE)?;
    let mn = b.define_element("Manganese", "Mn", 25, 54.938 * G_PER_MOLE)?;
    let fe = b.define_element("Iron", "Fe", 26, 55.845 * G_PER_MOLE)?;
    let ni = b.define_element("Nickel", "Ni", 28, 58.693 * G_PER_MOLE)?;
    b.define_material(
        names::STAINLESS_STEEL,
        8.06 * G_PER_CM3,
        Composition::MassFractions(vec![
            (c, 0.001),
            (si, 0.007),
            (cr, 0.18),
            (mn, 0.01),
            (fe, 0.712),
            (ni, 0.09),
        ]),
    )?;

    b.define_material(names::ALUMINUM, 2.70 * G_PER_CM3, simple(13, 26.9815))?;
    b.define_material(names::TIN, 7.365 * G_PER_CM3, simple(50, 118.710))?;
    b.define_material(names::BARIUM, 3510.0 * KG_PER_M3, simple(56, 137.327))?;
    b.define_material(names::BISMUTH, 9.78 * G_PER_CM3, simple(83, 208.980))?;

    let h = b.define_element("Hydrogen", "H", 1, 1.0008 * G_PER_MOLE)?;
    b.define_material(
        names::MYLAR,
        1.370 * G_PER_CM3,
        Composition::MassFractions(vec![(c, 0.62500), (h, 0.04167), (o, 0.33333)]),
    )?;
    b.define_material(
        names::KAPTON,
        1.42 * G_PER_CM3,
        Composition::MassFractions(vec![(n, 0.074), (c, 0.691), (o, 0.209), (h, 0.026)]),
    )?;
    b.define_material(
        names::PMMA,
        1.18 * G_PER_CM3,
        Composition::MassFractions(vec![(c, 0.6), (h, 0.08), (o, 0.32)]),
    )?;

    let f = b.define_element("Fluorine", "F", 9, 18.9984 * G_PER_MOLE)?;
    b.define_material(
        names::SIX_F_SIX_F,
        1.480 * G_PER_CM3,
        Composition::MassFractions(vec![
            (h, 0.27027),
            (c, 0.48648),
            (n, 0.02703),
            (o, 0.05405),
            (f, 0.16216),
        ]),
    )?;

    let al = b.define_element("Aluminum", "Al", 13, 26.9815 * G_PER_MOLE)?;
    b.define_material(
        names::ALUMINA,
        1.370 * G_PER_CM3,
        Composition::MassFractions(vec![(al, 0.53), (o, 0.47)]),
    )?;

    let ca = b.define_element("Calcium", "Ca", 20, 44.98 * G_PER_MOLE)?;
    let cl = b.define_element("Chlorine", "Cl", 17, 35.5 * G_PER_MOLE)?;
    b.define_material(
        names::CACL2,
        2.15 * G_PER_CM3,
        Composition::MassFractions(vec![(ca, 0.387), (cl, 0.613)]),
    )?;

    b.define_material(names::BERYLLIUM, 1.85 * G_PER_CM3, simple(4, 9.0121))?;
    b.define_material(names::GERMANIUM, 5.323 * G_PER_CM3, simple(32, 72.630))?;
    b.define_material(
        names::WATER,
        1.000 * G_PER_CM3,
        Composition::AtomCounts(vec![(h, 2), (o, 1)]),
    )?;

    Ok(b.build())
}

fn simple(atomic_number: u32, atomic_mass: f64) -> Composition {
    Composition::Simple {
        atomic_number,
        atomic_mass: atomic_mass * G_PER_MOLE,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn duplicate_material_name_fails_fast() {
        let mut b = MaterialCatalogBuilder::new();
        b.define_material("Silicon", 2.329, simple(14, 28.086))
            .unwrap();
        let err = b
            .define_material("Silicon", 2.0, simple(14, 28.086))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateName {
                kind: "material",
                name: "Silicon".into()
            }
        );
    }

    #[test]
    fn element_and_material_tables_are_separate() {
        let mut b = MaterialCatalogBuilder::new();
        b.define_element("Silicon", "Si", 14, 28.086).unwrap();
        assert!(b.define_material("Silicon", 2.329, simple(14, 28.086)).is_ok());
    }

    #[test]
    fn foreign_element_handle_is_rejected() {
        let mut b = MaterialCatalogBuilder::new();
        let err = b
            .define_material(
                "Ghost",
                1.0,
                Composition::MassFractions(vec![(ElementId(3), 1.0)]),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownElement { .. }));
    }

    #[test]
    fn zero_density_is_rejected() {
        let mut b = MaterialCatalogBuilder::new();
        let err = b.define_material("Nothing", 0.0, simple(1, 1.0)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidQuantity { quantity: "density", .. }));
    }

    #[test]
    fn vacuum_scales_with_pressure() {
        let catalog = standard_catalog(1e-8).unwrap();
        let vacuum = catalog.material(catalog.find(names::VACUUM).unwrap()).unwrap();
        let expected = 1.293e-3 * 1e-8 / 760.0;
        assert!((vacuum.density - expected).abs() <= expected * 1e-12);
    }
}
