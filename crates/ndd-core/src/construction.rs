// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Detector construction: world, silicon stack, calibration sources.
//!
//! [`DetectorConstruction::build`] runs the phases in a fixed order:
//! world, detector stack, sources, visualisation, step limits. Each phase is
//! also callable on its own and is idempotent; calling one that depends on
//! an earlier phase builds the earlier phase first.
//!
//! The stack is laid out along +Z from `stack.position`: the dead layer's
//! upstream face sits at the position, and each following layer starts where
//! the previous one ends.

use std::sync::Arc;

use ndd_geom::{Quat, Solid, Transform, Vec3};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigError, DetectorConfig};
use crate::geometry::{GeometryError, GeometryTree, VisHint, VolumeId};
use crate::material::{names, standard_catalog, CatalogError, MaterialCatalog, MaterialId};
use crate::pixel::PixelLayout;
use crate::source::{SourceAssembly, SourceKind, SourceRecipe};

/// Volume names used by the construction.
pub mod volume_names {
    /// World box.
    pub const WORLD: &str = "World";
    /// Dead entrance layer.
    pub const DEAD: &str = "Dead";
    /// Active silicon; hits are attributed to this name.
    pub const SILICON: &str = "Silicon";
    /// Alumina backing.
    pub const BACKING: &str = "Backing";
    /// Source carrier.
    pub const CARRIER: &str = "Carrier";
    /// Source entry foil.
    pub const FOIL: &str = "Foil";
    /// Source exit foil.
    pub const EXIT_FOIL: &str = "ExitFoil";
    /// Source holder ring.
    pub const SOURCE_HOLDER: &str = "SourceHolder";
}

/// Errors that abort a construction.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The stock catalog could not be built.
    #[error("material catalog: {0}")]
    Catalog(#[from] CatalogError),
    /// A recipe named a material the catalog does not define.
    #[error("material {0} is not in the catalog")]
    MissingMaterial(String),
    /// The geometry tree refused an edit.
    #[error("geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Non-fatal problems recorded during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDiagnostic {
    /// Source id and position lists differ in length; no source was built.
    SourceListMismatch {
        /// Number of ids.
        ids: usize,
        /// Number of positions.
        positions: usize,
    },
    /// A source was requested again at the position it already occupies;
    /// the existing assembly was reused.
    DuplicateSource {
        /// Requested source id.
        id: i32,
        /// Carrier of the reused assembly.
        carrier: VolumeId,
    },
}

/// Progress of a construction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    /// Not run yet.
    Pending,
    /// Ran to completion.
    Done,
    /// Deliberately skipped after a diagnostic.
    Skipped,
}

/// The three layers of the silicon stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorStack {
    /// Dead entrance layer.
    pub dead: VolumeId,
    /// Active silicon.
    pub active: VolumeId,
    /// Backing.
    pub backing: VolumeId,
}

/// Builds the detector geometry from a [`DetectorConfig`].
#[derive(Debug)]
pub struct DetectorConstruction {
    config: DetectorConfig,
    catalog: Arc<MaterialCatalog>,
    tree: Option<GeometryTree>,
    stack: Option<DetectorStack>,
    sources: PhaseState,
    assemblies: Vec<SourceAssembly>,
    diagnostics: Vec<BuildDiagnostic>,
}

impl DetectorConstruction {
    /// Validates `config` and binds it to `catalog`.
    pub fn new(config: DetectorConfig, catalog: Arc<MaterialCatalog>) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            tree: None,
            stack: None,
            sources: PhaseState::Pending,
            assemblies: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Like [`Self::new`] with the stock catalog at the configured vacuum
    /// pressure.
    pub fn with_standard_catalog(config: DetectorConfig) -> Result<Self, BuildError> {
        let catalog = standard_catalog(config.world.vacuum_pressure_torr)?;
        Self::new(config, Arc::new(catalog))
    }

    /// Runs every phase and returns the finished tree.
    #[instrument(skip(self), fields(sources = self.config.sources.ids.len()))]
    pub fn build(&mut self) -> Result<GeometryTree, BuildError> {
        self.build_world()?;
        self.build_detector_stack()?;
        self.build_sources()?;
        self.build_visualisation()?;
        self.apply_step_limits()?;
        let tree = self.tree_mut()?.clone();
        info!(
            volumes = tree.len(),
            assemblies = self.assemblies.len(),
            diagnostics = self.diagnostics.len(),
            digest = %tree.short_digest(),
            "detector constructed"
        );
        Ok(tree)
    }

    /// Creates the world box filled with vacuum.
    pub fn build_world(&mut self) -> Result<VolumeId, BuildError> {
        if self.tree.is_none() {
            let world = &self.config.world;
            let vacuum = self.material(names::VACUUM)?;
            let tree = GeometryTree::with_world(
                volume_names::WORLD,
                Solid::cuboid(world.half_x, world.half_y, world.half_z),
                vacuum,
            )?;
            self.tree = Some(tree);
        }
        Ok(VolumeId::WORLD)
    }

    /// Places dead layer, active silicon and backing, exactly abutting.
    pub fn build_detector_stack(&mut self) -> Result<DetectorStack, BuildError> {
        if let Some(stack) = self.stack {
            return Ok(stack);
        }
        let world = self.build_world()?;
        let cfg = self.config.stack.clone();
        let silicon = self.material(names::SILICON)?;
        let alumina = self.material(names::ALUMINA)?;

        let dead_center = cfg.position.offset_z(cfg.dead_layer_thickness / 2.0);
        let active_center = cfg
            .position
            .offset_z(cfg.dead_layer_thickness + cfg.active_thickness / 2.0);
        let backing_center = active_center.offset_z((cfg.active_thickness + cfg.backing_thickness) / 2.0);

        let tree = self.tree_mut()?;
        let dead = tree.place(
            world,
            volume_names::DEAD,
            Solid::disc(cfg.outer_radius, cfg.dead_layer_thickness),
            silicon,
            Transform::translation_only(dead_center),
        )?;
        let active = tree.place(
            world,
            volume_names::SILICON,
            Solid::disc(cfg.outer_radius, cfg.active_thickness),
            silicon,
            Transform::new(active_center, Quat::from_rotation_z(cfg.active_rotation)),
        )?;
        let backing = tree.place(
            world,
            volume_names::BACKING,
            Solid::disc(cfg.outer_radius, cfg.backing_thickness),
            alumina,
            Transform::translation_only(backing_center),
        )?;
        let stack = DetectorStack {
            dead,
            active,
            backing,
        };
        self.stack = Some(stack);
        Ok(stack)
    }

    /// Builds one assembly per configured (id, position) pair.
    ///
    /// Mismatched list lengths skip the whole phase and record a
    /// [`BuildDiagnostic::SourceListMismatch`]; nothing is placed.
    pub fn build_sources(&mut self) -> Result<PhaseState, BuildError> {
        if self.sources != PhaseState::Pending {
            return Ok(self.sources);
        }
        let ids = self.config.sources.ids.clone();
        let positions = self.config.sources.positions.clone();
        if ids.len() != positions.len() {
            warn!(
                ids = ids.len(),
                positions = positions.len(),
                "source ids and positions differ in length; not building sources"
            );
            self.diagnostics.push(BuildDiagnostic::SourceListMismatch {
                ids: ids.len(),
                positions: positions.len(),
            });
            self.sources = PhaseState::Skipped;
            return Ok(self.sources);
        }
        for (id, position) in ids.into_iter().zip(positions) {
            self.build_source_assembly(id, position)?;
        }
        self.sources = PhaseState::Done;
        Ok(self.sources)
    }

    /// Places the assembly for source `id` with its carrier centered at
    /// `position`.
    ///
    /// Returns `Ok(None)` for the reserved and unrecognized ids. Requesting
    /// the same (id, position) twice returns the existing assembly and
    /// records [`BuildDiagnostic::DuplicateSource`].
    pub fn build_source_assembly(
        &mut self,
        id: i32,
        position: Vec3,
    ) -> Result<Option<SourceAssembly>, BuildError> {
        let kind = SourceKind::from_id(id);
        let Some(recipe) = kind.recipe() else {
            debug!(id, ?kind, "source variant builds no geometry");
            return Ok(None);
        };
        if let Some(existing) = self
            .assemblies
            .iter()
            .find(|a| a.kind == kind && same_position(a.position, position))
        {
            let existing = *existing;
            debug!(id, ?position, "source already placed here; reusing its assembly");
            self.diagnostics.push(BuildDiagnostic::DuplicateSource {
                id,
                carrier: existing.carrier,
            });
            return Ok(Some(existing));
        }
        let world = self.build_world()?;
        let place_exit_foil = self.config.sources.place_exit_foil;
        let assembly = self.place_assembly(world, &recipe, position, place_exit_foil)?;
        debug!(id, volumes = assembly.volumes().len(), "source assembly placed");
        self.assemblies.push(assembly);
        Ok(Some(assembly))
    }

    fn place_assembly(
        &mut self,
        mother: VolumeId,
        recipe: &SourceRecipe,
        position: Vec3,
        place_exit_foil: bool,
    ) -> Result<SourceAssembly, BuildError> {
        let carrier_material = self.material(recipe.carrier.material)?;
        let foil_material = self.material(recipe.entry_foil.material)?;
        let holder_material = self.material(recipe.holder.material)?;
        let exit = match (recipe.exit_foil, place_exit_foil) {
            (Some(foil), true) => Some((foil, self.material(foil.material)?)),
            _ => None,
        };

        let tree = self.tree_mut()?;
        let carrier = tree.place(
            mother,
            volume_names::CARRIER,
            Solid::disc(recipe.carrier.radius, recipe.carrier.thickness),
            carrier_material,
            Transform::translation_only(recipe.carrier_center(position)),
        )?;
        let entry_foil = tree.place(
            mother,
            volume_names::FOIL,
            Solid::disc(recipe.entry_foil.radius, recipe.entry_foil.thickness),
            foil_material,
            Transform::translation_only(recipe.entry_foil_center(position)),
        )?;
        let exit_foil = match (exit, recipe.exit_foil_center(position)) {
            (Some((foil, material)), Some(center)) => Some(tree.place(
                mother,
                volume_names::EXIT_FOIL,
                Solid::disc(foil.radius, foil.thickness),
                material,
                Transform::translation_only(center),
            )?),
            _ => None,
        };
        let holder = tree.place(
            mother,
            volume_names::SOURCE_HOLDER,
            Solid::tube(
                recipe.holder.inner_radius,
                recipe.holder.outer_radius,
                recipe.holder.thickness,
            ),
            holder_material,
            Transform::translation_only(recipe.holder_center(position)),
        )?;
        Ok(SourceAssembly {
            kind: recipe.kind,
            position,
            carrier,
            entry_foil,
            exit_foil,
            holder,
        })
    }

    /// Sets step ceilings: always on the dead layer, on carriers and foils
    /// only when the configuration opts in.
    pub fn apply_step_limits(&mut self) -> Result<(), BuildError> {
        let stack = self.build_detector_stack()?;
        let limits = self.config.step_limits.clone();
        let dead_limit = limits.fraction * self.config.stack.dead_layer_thickness;
        let assemblies = self.assemblies.clone();
        let tree = self.tree_mut()?;
        tree.set_step_limit(stack.dead, dead_limit)?;
        for assembly in &assemblies {
            let Some(recipe) = assembly.kind.recipe() else {
                continue;
            };
            if limits.limit_carriers {
                tree.set_step_limit(assembly.carrier, recipe.carrier_step_limit(limits.fraction))?;
            }
            if limits.limit_foils {
                let foil_limit = recipe.foil_step_limit(limits.fraction);
                tree.set_step_limit(assembly.entry_foil, foil_limit)?;
                if let (Some(exit), Some(spec)) = (assembly.exit_foil, recipe.exit_foil) {
                    tree.set_step_limit(exit, limits.fraction * spec.thickness)?;
                }
            }
        }
        Ok(())
    }

    /// Attaches display hints: world hidden, active silicon green, dead layer
    /// red.
    pub fn build_visualisation(&mut self) -> Result<(), BuildError> {
        let stack = self.build_detector_stack()?;
        let tree = self.tree_mut()?;
        tree.set_vis(VolumeId::WORLD, VisHint::Invisible)?;
        tree.set_vis(stack.active, VisHint::GREEN)?;
        tree.set_vis(stack.dead, VisHint::RED)?;
        Ok(())
    }

    /// Hexagonal pixel layout of the active layer.
    ///
    /// Fails with [`ConfigError::PixelsExceedDetector`] when the layout is
    /// wider than the stack. The geometry itself is unaffected.
    pub fn pixel_layout(&self) -> Result<PixelLayout, ConfigError> {
        self.config.fitted_pixel_layout()
    }

    /// Tree built so far, if the world exists.
    pub fn tree(&self) -> Option<&GeometryTree> {
        self.tree.as_ref()
    }

    /// Stack volumes, once placed.
    pub fn stack(&self) -> Option<DetectorStack> {
        self.stack
    }

    /// Source assemblies in placement order.
    pub fn assemblies(&self) -> &[SourceAssembly] {
        &self.assemblies
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[BuildDiagnostic] {
        &self.diagnostics
    }

    /// State of the source phase.
    pub fn sources_phase(&self) -> PhaseState {
        self.sources
    }

    /// Configuration in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Shared material catalog.
    pub fn catalog(&self) -> &Arc<MaterialCatalog> {
        &self.catalog
    }

    fn material(&self, name: &str) -> Result<MaterialId, BuildError> {
        self.catalog
            .find(name)
            .ok_or_else(|| BuildError::MissingMaterial(name.to_owned()))
    }

    fn tree_mut(&mut self) -> Result<&mut GeometryTree, BuildError> {
        self.build_world()?;
        self.tree
            .as_mut()
            .ok_or(BuildError::Geometry(GeometryError::UnknownVolume(VolumeId::WORLD)))
    }
}

fn same_position(a: Vec3, b: Vec3) -> bool {
    a.to_array().map(f64::to_bits) == b.to_array().map(f64::to_bits)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::material::MaterialCatalogBuilder;
    use ndd_geom::units::{MM, NM};

    fn construction(config: DetectorConfig) -> DetectorConstruction {
        DetectorConstruction::with_standard_catalog(config).unwrap()
    }

    #[test]
    fn stack_layers_abut_along_z() {
        let mut dc = construction(DetectorConfig::default());
        let stack = dc.build_detector_stack().unwrap();
        let tree = dc.tree().unwrap();
        let dead = tree.global_aabb(stack.dead).unwrap();
        let active = tree.global_aabb(stack.active).unwrap();
        let backing = tree.global_aabb(stack.backing).unwrap();
        assert!((dead.min().z() - 10.0 * MM).abs() < 1e-12);
        assert!((dead.max().z() - active.min().z()).abs() < 1e-12);
        assert!((active.max().z() - backing.min().z()).abs() < 1e-12);
        assert!((backing.max().z() - (10.0 * MM + 100.0 * NM + 5.0 * MM)).abs() < 1e-12);
    }

    #[test]
    fn phases_are_idempotent() {
        let mut dc = construction(DetectorConfig::default());
        let first = dc.build_detector_stack().unwrap();
        let second = dc.build_detector_stack().unwrap();
        assert_eq!(first, second);
        assert_eq!(dc.tree().unwrap().len(), 4);
        dc.apply_step_limits().unwrap();
        dc.apply_step_limits().unwrap();
        assert_eq!(dc.tree().unwrap().len(), 4);
    }

    #[test]
    fn repeated_source_request_reuses_the_assembly() {
        let mut dc = construction(DetectorConfig::default());
        let p = Vec3::new(0.0, 0.0, -20.0);
        let a = dc.build_source_assembly(3, p).unwrap().unwrap();
        let b = dc.build_source_assembly(3, p).unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(dc.assemblies().len(), 1);
        assert_eq!(
            dc.diagnostics(),
            &[BuildDiagnostic::DuplicateSource {
                id: 3,
                carrier: a.carrier
            }]
        );
    }

    #[test]
    fn exit_foil_is_opt_in() {
        let mut cfg = DetectorConfig::default();
        cfg.add_source(1, Vec3::new(0.0, 0.0, -10.0));
        let mut dc = construction(cfg.clone());
        dc.build().unwrap();
        assert!(dc.assemblies()[0].exit_foil.is_none());

        cfg.sources.place_exit_foil = true;
        let mut dc = construction(cfg);
        let tree = dc.build().unwrap();
        let exit = dc.assemblies()[0].exit_foil.unwrap();
        assert_eq!(tree.volume(exit).unwrap().name, volume_names::EXIT_FOIL);
        assert!(tree.overlapping_siblings().is_empty());
    }

    #[test]
    fn dead_layer_gets_a_fractional_step_limit() {
        let mut cfg = DetectorConfig::default();
        cfg.set_step_fraction(0.5);
        cfg.add_source(4, Vec3::new(0.0, 0.0, -30.0));
        let mut dc = construction(cfg);
        let tree = dc.build().unwrap();
        let stack = dc.stack().unwrap();
        let limit = tree.volume(stack.dead).unwrap().step_limit.unwrap();
        assert!((limit.max_step - 50.0 * NM).abs() < 1e-18);
        let carrier = dc.assemblies()[0].carrier;
        assert!(tree.volume(carrier).unwrap().step_limit.is_none());
    }

    #[test]
    fn carrier_limits_follow_the_flag() {
        let mut cfg = DetectorConfig::default();
        cfg.step_limits.limit_carriers = true;
        cfg.step_limits.limit_foils = true;
        cfg.add_source(3, Vec3::new(0.0, 0.0, -30.0));
        let mut dc = construction(cfg);
        let tree = dc.build().unwrap();
        let assembly = dc.assemblies()[0];
        let carrier = tree.volume(assembly.carrier).unwrap().step_limit.unwrap();
        let foil = tree.volume(assembly.entry_foil).unwrap().step_limit.unwrap();
        assert!((carrier.max_step - 0.1 * 7.0e-3).abs() < 1e-15);
        assert!((foil.max_step - 0.1 * 5.0e-3).abs() < 1e-15);
    }

    #[test]
    fn visual_hints_are_attached() {
        let mut dc = construction(DetectorConfig::default());
        let tree = dc.build().unwrap();
        let stack = dc.stack().unwrap();
        assert_eq!(tree.world().vis, Some(VisHint::Invisible));
        assert_eq!(tree.volume(stack.active).unwrap().vis, Some(VisHint::GREEN));
        assert_eq!(tree.volume(stack.dead).unwrap().vis, Some(VisHint::RED));
        assert!(tree.volume(stack.backing).unwrap().vis.is_none());
    }

    #[test]
    fn missing_material_aborts_the_build() {
        let mut b = MaterialCatalogBuilder::new();
        b.define_material(
            names::VACUUM,
            1e-10,
            crate::material::Composition::Simple {
                atomic_number: 7,
                atomic_mass: 14.0,
            },
        )
        .unwrap();
        let mut dc = DetectorConstruction::new(DetectorConfig::default(), Arc::new(b.build())).unwrap();
        assert_eq!(
            dc.build().unwrap_err(),
            BuildError::MissingMaterial(names::SILICON.to_owned())
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut cfg = DetectorConfig::default();
        cfg.set_outer_radius(-1.0);
        assert!(matches!(
            DetectorConstruction::with_standard_catalog(cfg),
            Err(BuildError::Config(_))
        ));
    }
}
