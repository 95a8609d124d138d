// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Electromagnetic process registration.
//!
//! The transport engine owns particles and processes; this module only
//! decides which process handles each species receives and with which
//! tuning. The host exposes its particle table through [`ParticleCatalog`]
//! and accepts registrations through [`ProcessRegistry`].
//!
//! Two recipes exist:
//! - [`EmPhysicsList::Standard`]: multiple-scattering based, with
//!   per-species ionisation step functions.
//! - [`EmPhysicsList::SingleScattering`]: Coulomb single scattering with
//!   explicit process ordering.

use ndd_geom::units::{EV, MM, TEV, UM};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// One species known to the host engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDefinition {
    /// Engine name ("e-", "GenericIon", ...).
    pub name: String,
    /// PDG code (0 for engine-internal pseudo particles).
    pub pdg_encoding: i32,
    /// Charge in units of e.
    pub pdg_charge: f64,
    /// Short-lived resonance never tracked by the engine.
    pub short_lived: bool,
}

impl ParticleDefinition {
    /// Long-lived species.
    pub fn new(name: impl Into<String>, pdg_encoding: i32, pdg_charge: f64) -> Self {
        Self {
            name: name.into(),
            pdg_encoding,
            pdg_charge,
            short_lived: false,
        }
    }

    /// Short-lived species.
    pub fn short_lived(name: impl Into<String>, pdg_encoding: i32, pdg_charge: f64) -> Self {
        Self {
            short_lived: true,
            ..Self::new(name, pdg_encoding, pdg_charge)
        }
    }
}

/// Host particle table.
pub trait ParticleCatalog {
    /// Every defined species, in the host's iteration order.
    fn particles(&self) -> &[ParticleDefinition];
}

impl ParticleCatalog for [ParticleDefinition] {
    fn particles(&self) -> &[ParticleDefinition] {
        self
    }
}

impl ParticleCatalog for Vec<ParticleDefinition> {
    fn particles(&self) -> &[ParticleDefinition] {
        self
    }
}

/// Host registration sink.
pub trait ProcessRegistry {
    /// Attaches `process` to `particle`.
    fn register(
        &mut self,
        particle: &ParticleDefinition,
        process: ProcessHandle,
    ) -> Result<(), RegistrationError>;

    /// Applies run-wide EM options.
    fn set_em_options(&mut self, options: &EmOptions) -> Result<(), RegistrationError>;
}

/// Interaction processes the recipes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessKind {
    /// Photoelectric absorption.
    PhotoElectric,
    /// Compton scattering.
    Compton,
    /// Pair conversion of photons.
    GammaConversion,
    /// e± multiple scattering.
    ElectronMultipleScattering,
    /// e± ionisation.
    ElectronIonisation,
    /// e± bremsstrahlung.
    ElectronBremsstrahlung,
    /// e+ annihilation.
    PositronAnnihilation,
    /// μ± multiple scattering.
    MuonMultipleScattering,
    /// μ± ionisation.
    MuonIonisation,
    /// μ± bremsstrahlung.
    MuonBremsstrahlung,
    /// μ± pair production.
    MuonPairProduction,
    /// Hadron and ion multiple scattering.
    HadronMultipleScattering,
    /// Hadron ionisation.
    HadronIonisation,
    /// Hadron bremsstrahlung.
    HadronBremsstrahlung,
    /// Hadron pair production.
    HadronPairProduction,
    /// Ion ionisation.
    IonIonisation,
    /// Nuclear stopping of slow ions.
    NuclearStopping,
    /// Single Coulomb scattering.
    CoulombScattering,
}

/// Model overrides applied to a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmModel {
    /// Klein–Nishina Compton model.
    KleinNishina,
    /// Parametrised stopping powers for generic ions.
    IonParametrisedLoss,
    /// Coulomb scattering of ions.
    IonCoulombScattering,
}

/// Continuous-loss step function: steps shrink to `d_range × range` until
/// the range drops below `final_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepFunction {
    /// Fraction of the remaining range.
    pub d_range: f64,
    /// Range below which the fraction no longer applies (mm).
    pub final_range: f64,
}

/// Placement of a process in the engine's at-rest / along-step / post-step
/// loops. `-1` means inactive in that loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessOrdering {
    /// Post-step only, engine-chosen index.
    Discrete,
    /// Explicit indices.
    Indexed {
        /// At-rest index.
        at_rest: i32,
        /// Along-step index.
        along_step: i32,
        /// Post-step index.
        post_step: i32,
    },
}

impl ProcessOrdering {
    const fn indexed(at_rest: i32, along_step: i32, post_step: i32) -> Self {
        Self::Indexed {
            at_rest,
            along_step,
            post_step,
        }
    }
}

/// A process plus its tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessHandle {
    /// Which process.
    pub kind: ProcessKind,
    /// Model override, if any.
    pub model: Option<EmModel>,
    /// Step function override, if any.
    pub step_function: Option<StepFunction>,
    /// Explicit ordering; `None` leaves it to the engine's helper.
    pub ordering: Option<ProcessOrdering>,
    /// Whether the process builds its cross-section tables.
    pub build_tables: bool,
}

impl ProcessHandle {
    /// Untuned handle.
    pub const fn new(kind: ProcessKind) -> Self {
        Self {
            kind,
            model: None,
            step_function: None,
            ordering: None,
            build_tables: true,
        }
    }

    /// Sets the model override.
    pub const fn with_model(mut self, model: EmModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the step function.
    pub const fn with_step_function(mut self, d_range: f64, final_range: f64) -> Self {
        self.step_function = Some(StepFunction {
            d_range,
            final_range,
        });
        self
    }

    /// Sets explicit ordering.
    pub const fn with_ordering(mut self, ordering: ProcessOrdering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    const fn discrete(kind: ProcessKind) -> Self {
        Self::new(kind).with_ordering(ProcessOrdering::Discrete)
    }

    const fn indexed(kind: ProcessKind, at_rest: i32, along_step: i32, post_step: i32) -> Self {
        Self::new(kind).with_ordering(ProcessOrdering::indexed(at_rest, along_step, post_step))
    }

    const fn without_tables(mut self) -> Self {
        self.build_tables = false;
        self
    }
}

/// Recipe bucket a species falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeciesCategory {
    /// "gamma".
    Gamma,
    /// "e-".
    Electron,
    /// "e+".
    Positron,
    /// "mu+" and "mu-".
    Muon,
    /// "proton", "pi+" and "pi-".
    ChargedHadron,
    /// "alpha" and "He3".
    LightIon,
    /// "GenericIon".
    GenericIon,
    /// Any other long-lived charged species except "chargedgeantino".
    OtherCharged,
    /// Everything else: receives nothing.
    Untracked,
}

impl SpeciesCategory {
    /// Buckets one species.
    pub fn classify(particle: &ParticleDefinition) -> Self {
        match particle.name.as_str() {
            "gamma" => Self::Gamma,
            "e-" => Self::Electron,
            "e+" => Self::Positron,
            "mu+" | "mu-" => Self::Muon,
            "proton" | "pi+" | "pi-" => Self::ChargedHadron,
            "alpha" | "He3" => Self::LightIon,
            "GenericIon" => Self::GenericIon,
            "chargedgeantino" => Self::Untracked,
            _ if !particle.short_lived && particle.pdg_charge != 0.0 => Self::OtherCharged,
            _ => Self::Untracked,
        }
    }
}

/// Shape of the multiple-scattering step limitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MscStepLimit {
    /// Cheapest, least accurate.
    Minimal,
    /// Limit by safety distance.
    UseSafety,
    /// Limit by distance to the next boundary.
    UseDistanceToBoundary,
}

/// Atomic relaxation after ionisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomDeexcitation {
    /// Fluorescence photons.
    pub fluorescence: bool,
    /// Auger electrons.
    pub auger: bool,
    /// Particle-induced X-ray emission.
    pub pixe: bool,
}

/// Run-wide EM options. `None` keeps the engine default.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmOptions {
    /// Lower edge of the physics tables.
    pub min_energy: f64,
    /// Upper edge of the physics tables.
    pub max_energy: f64,
    /// Bins of the dE/dx tables.
    pub dedx_bins: u32,
    /// Bins of the mean-free-path tables.
    pub lambda_bins: u32,
    /// Multiple-scattering step limitation.
    pub msc_step_limit: Option<MscStepLimit>,
    /// Spline interpolation of tables.
    pub spline: Option<bool>,
    /// Default step function for charged particles.
    pub step_function: Option<StepFunction>,
    /// Linear energy-loss limit.
    pub linear_loss_limit: Option<f64>,
    /// Sub-cutoff secondary production.
    pub sub_cutoff: Option<bool>,
    /// Polar angle limit of single scattering (rad).
    pub polar_angle_limit: Option<f64>,
    /// Atomic de-excitation.
    pub deexcitation: Option<AtomDeexcitation>,
}

/// Errors surfaced by the host during registration.
#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    /// The host refused a process.
    #[error("registry rejected {process:?} for {particle}: {reason}")]
    Rejected {
        /// Species name.
        particle: String,
        /// Refused process.
        process: ProcessKind,
        /// Host explanation.
        reason: String,
    },
    /// The host refused the EM options.
    #[error("registry rejected EM options: {0}")]
    OptionsRejected(String),
    /// Registration was already performed by this constructor.
    #[error("processes already registered")]
    AlreadyRegistered,
}

/// Which recipe set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmPhysicsList {
    /// Multiple-scattering based standard recipe.
    #[default]
    Standard,
    /// Single Coulomb scattering recipe.
    SingleScattering,
}

impl EmPhysicsList {
    /// Ordered process handles for `category`.
    pub fn recipe(self, category: SpeciesCategory) -> Vec<ProcessHandle> {
        use ProcessKind as P;
        use SpeciesCategory as S;
        match self {
            Self::Standard => match category {
                S::Gamma => vec![
                    ProcessHandle::new(P::PhotoElectric),
                    ProcessHandle::new(P::Compton).with_model(EmModel::KleinNishina),
                    ProcessHandle::new(P::GammaConversion),
                ],
                S::Electron => vec![
                    ProcessHandle::new(P::ElectronMultipleScattering),
                    ProcessHandle::new(P::ElectronIonisation).with_step_function(0.1, 100.0 * UM),
                    ProcessHandle::new(P::ElectronBremsstrahlung),
                ],
                S::Positron => vec![
                    ProcessHandle::new(P::ElectronMultipleScattering),
                    ProcessHandle::new(P::ElectronIonisation).with_step_function(0.1, 100.0 * UM),
                    ProcessHandle::new(P::ElectronBremsstrahlung),
                    ProcessHandle::new(P::PositronAnnihilation),
                ],
                S::Muon => vec![
                    ProcessHandle::new(P::MuonMultipleScattering),
                    ProcessHandle::new(P::MuonIonisation).with_step_function(0.1, 50.0 * UM),
                    ProcessHandle::new(P::MuonBremsstrahlung),
                    ProcessHandle::new(P::MuonPairProduction),
                ],
                S::ChargedHadron => vec![
                    ProcessHandle::new(P::HadronMultipleScattering),
                    ProcessHandle::new(P::HadronIonisation).with_step_function(0.1, 20.0 * UM),
                    ProcessHandle::new(P::HadronBremsstrahlung),
                    ProcessHandle::new(P::HadronPairProduction),
                ],
                S::LightIon => vec![
                    ProcessHandle::new(P::HadronMultipleScattering),
                    ProcessHandle::new(P::IonIonisation).with_step_function(0.1, 1.0 * UM),
                    ProcessHandle::new(P::NuclearStopping),
                ],
                S::GenericIon => vec![
                    ProcessHandle::new(P::HadronMultipleScattering),
                    ProcessHandle::new(P::IonIonisation)
                        .with_model(EmModel::IonParametrisedLoss)
                        .with_step_function(0.1, 1.0 * UM),
                    ProcessHandle::new(P::NuclearStopping),
                ],
                S::OtherCharged => vec![
                    ProcessHandle::new(P::HadronMultipleScattering),
                    ProcessHandle::new(P::HadronIonisation),
                ],
                S::Untracked => Vec::new(),
            },
            Self::SingleScattering => match category {
                S::Gamma => vec![
                    ProcessHandle::discrete(P::PhotoElectric),
                    ProcessHandle::discrete(P::Compton),
                    ProcessHandle::discrete(P::GammaConversion),
                ],
                S::Electron => vec![
                    ProcessHandle::discrete(P::CoulombScattering),
                    ProcessHandle::indexed(P::ElectronIonisation, -1, 1, 1),
                    ProcessHandle::indexed(P::ElectronBremsstrahlung, -1, 2, 2),
                ],
                S::Positron => vec![
                    ProcessHandle::discrete(P::CoulombScattering),
                    ProcessHandle::indexed(P::ElectronIonisation, -1, 1, 1),
                    ProcessHandle::indexed(P::ElectronBremsstrahlung, -1, 2, 2),
                    ProcessHandle::indexed(P::PositronAnnihilation, 0, -1, 3),
                ],
                S::Muon => vec![
                    ProcessHandle::discrete(P::CoulombScattering),
                    ProcessHandle::indexed(P::MuonIonisation, -1, 1, 1),
                    ProcessHandle::indexed(P::MuonBremsstrahlung, -1, 2, 2),
                    ProcessHandle::indexed(P::MuonPairProduction, -1, 3, 3),
                ],
                S::LightIon | S::GenericIon => vec![
                    ProcessHandle::indexed(P::IonIonisation, -1, 1, 1),
                    ProcessHandle::discrete(P::CoulombScattering)
                        .with_model(EmModel::IonCoulombScattering)
                        .without_tables(),
                ],
                // No dedicated hadron branch: protons and pions take the
                // generic charged recipe.
                S::ChargedHadron | S::OtherCharged => vec![
                    ProcessHandle::discrete(P::CoulombScattering),
                    ProcessHandle::indexed(P::HadronIonisation, -1, 1, 1),
                ],
                S::Untracked => Vec::new(),
            },
        }
    }

    /// Run-wide options pushed after the per-species registrations.
    pub fn em_options(self) -> EmOptions {
        match self {
            Self::Standard => EmOptions {
                min_energy: 10.0 * EV,
                max_energy: 10.0 * TEV,
                dedx_bins: 12 * 10,
                lambda_bins: 12 * 10,
                msc_step_limit: Some(MscStepLimit::UseSafety),
                spline: None,
                step_function: None,
                linear_loss_limit: None,
                sub_cutoff: None,
                polar_angle_limit: None,
                deexcitation: Some(AtomDeexcitation {
                    fluorescence: true,
                    auger: true,
                    pixe: true,
                }),
            },
            Self::SingleScattering => EmOptions {
                min_energy: 100.0 * EV,
                max_energy: 100.0 * TEV,
                dedx_bins: 12 * 20,
                lambda_bins: 12 * 20,
                msc_step_limit: None,
                spline: Some(true),
                step_function: Some(StepFunction {
                    d_range: 0.2,
                    final_range: 0.1 * MM,
                }),
                linear_loss_limit: Some(1.0e-2),
                sub_cutoff: Some(false),
                polar_angle_limit: Some(0.0),
                deexcitation: None,
            },
        }
    }
}

/// What one registration pass did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrationSummary {
    /// `(species, category, processes attached)` in catalog order.
    pub particles: Vec<(String, SpeciesCategory, usize)>,
    /// Total handles registered.
    pub processes: usize,
    /// Species that received nothing.
    pub untracked: usize,
}

impl RegistrationSummary {
    /// Category assigned to `name`, if the catalog listed it.
    pub fn category_of(&self, name: &str) -> Option<SpeciesCategory> {
        self.particles
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, c, _)| *c)
    }
}

/// Attaches the `list` recipes to every species in `catalog`, then pushes
/// the list's EM options.
#[instrument(skip(catalog, registry))]
pub fn register_processes<C, R>(
    catalog: &C,
    registry: &mut R,
    list: EmPhysicsList,
) -> Result<RegistrationSummary, RegistrationError>
where
    C: ParticleCatalog + ?Sized,
    R: ProcessRegistry + ?Sized,
{
    let mut summary = RegistrationSummary::default();
    for particle in catalog.particles() {
        let category = SpeciesCategory::classify(particle);
        let recipe = list.recipe(category);
        debug!(particle = %particle.name, ?category, processes = recipe.len(), "registering");
        let count = recipe.len();
        for process in recipe {
            registry.register(particle, process)?;
        }
        if category == SpeciesCategory::Untracked {
            summary.untracked += 1;
        }
        summary.processes += count;
        summary
            .particles
            .push((particle.name.clone(), category, count));
    }
    registry.set_em_options(&list.em_options())?;
    info!(
        species = summary.particles.len(),
        processes = summary.processes,
        untracked = summary.untracked,
        "EM processes registered"
    );
    Ok(summary)
}

/// Guards [`register_processes`] so it runs once per run.
#[derive(Debug, Default)]
pub struct EmPhysicsConstructor {
    list: EmPhysicsList,
    registered: bool,
}

impl EmPhysicsConstructor {
    /// Constructor for `list`.
    pub fn new(list: EmPhysicsList) -> Self {
        Self {
            list,
            registered: false,
        }
    }

    /// Selected recipe set.
    pub fn list(&self) -> EmPhysicsList {
        self.list
    }

    /// Registers processes; a second call fails with
    /// [`RegistrationError::AlreadyRegistered`].
    pub fn construct_process<C, R>(
        &mut self,
        catalog: &C,
        registry: &mut R,
    ) -> Result<RegistrationSummary, RegistrationError>
    where
        C: ParticleCatalog + ?Sized,
        R: ProcessRegistry + ?Sized,
    {
        if self.registered {
            return Err(RegistrationError::AlreadyRegistered);
        }
        let summary = register_processes(catalog, registry, self.list)?;
        self.registered = true;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_names_then_charge() {
        let cases = [
            (ParticleDefinition::new("gamma", 22, 0.0), SpeciesCategory::Gamma),
            (ParticleDefinition::new("pi-", -211, -1.0), SpeciesCategory::ChargedHadron),
            (ParticleDefinition::new("He3", 1000020030, 2.0), SpeciesCategory::LightIon),
            (ParticleDefinition::new("kaon+", 321, 1.0), SpeciesCategory::OtherCharged),
            (ParticleDefinition::new("chargedgeantino", 0, 1.0), SpeciesCategory::Untracked),
            (ParticleDefinition::new("neutron", 2112, 0.0), SpeciesCategory::Untracked),
            (ParticleDefinition::short_lived("rho+", 213, 1.0), SpeciesCategory::Untracked),
        ];
        for (particle, expected) in cases {
            assert_eq!(SpeciesCategory::classify(&particle), expected, "{}", particle.name);
        }
    }

    #[test]
    fn standard_compton_uses_klein_nishina() {
        let gamma = EmPhysicsList::Standard.recipe(SpeciesCategory::Gamma);
        assert_eq!(gamma[1].kind, ProcessKind::Compton);
        assert_eq!(gamma[1].model, Some(EmModel::KleinNishina));
        assert!(EmPhysicsList::SingleScattering
            .recipe(SpeciesCategory::Gamma)
            .iter()
            .all(|h| h.model.is_none()));
    }

    #[test]
    fn step_functions_tighten_with_mass() {
        let final_range = |cat| {
            EmPhysicsList::Standard
                .recipe(cat)
                .iter()
                .find_map(|h| h.step_function)
                .map(|s| s.final_range)
        };
        assert_eq!(final_range(SpeciesCategory::Electron), Some(100.0 * UM));
        assert_eq!(final_range(SpeciesCategory::Muon), Some(50.0 * UM));
        assert_eq!(final_range(SpeciesCategory::ChargedHadron), Some(20.0 * UM));
        assert_eq!(final_range(SpeciesCategory::LightIon), Some(1.0 * UM));
        assert_eq!(final_range(SpeciesCategory::OtherCharged), None);
    }

    #[test]
    fn single_scattering_hadrons_share_the_generic_recipe() {
        let ss = EmPhysicsList::SingleScattering;
        assert_eq!(
            ss.recipe(SpeciesCategory::ChargedHadron),
            ss.recipe(SpeciesCategory::OtherCharged)
        );
        let ion = ss.recipe(SpeciesCategory::GenericIon);
        assert_eq!(ion[1].model, Some(EmModel::IonCoulombScattering));
        assert!(!ion[1].build_tables);
    }

    #[test]
    fn options_differ_per_list() {
        let standard = EmPhysicsList::Standard.em_options();
        let ss = EmPhysicsList::SingleScattering.em_options();
        assert_eq!(standard.dedx_bins, 120);
        assert_eq!(ss.dedx_bins, 240);
        assert!(standard.deexcitation.is_some_and(|d| d.pixe));
        assert!(ss.deexcitation.is_none());
        assert_eq!(ss.polar_angle_limit, Some(0.0));
    }
}
