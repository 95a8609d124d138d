// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! ndd-core: silicon detector stack, calibration sources and hit collection.
//!
//! The crate builds the volume tree of the apparatus once per run
//! ([`DetectorConstruction`]), collects per-event energy deposits in the
//! active silicon ([`HitCollector`], [`SensitiveDetector`]) and tells a host
//! transport engine which EM processes to attach to each species
//! ([`register_processes`]). Transport itself stays in the host.
//!
//! Catalog and tree are immutable once built and `Send + Sync`; share them
//! across event workers with `Arc`. Collectors are per event and per worker.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

/// Construction parameters.
pub mod config;
/// Detector construction phases.
pub mod construction;
/// Volume tree.
pub mod geometry;
/// Per-event hit collection.
pub mod hits;
/// Digest helpers.
pub mod ident;
/// Material catalog.
pub mod material;
/// EM process registration.
pub mod physics;
/// Hexagonal pixel layout.
pub mod pixel;
/// Calibration source variants.
pub mod source;

pub use config::{
    ConfigError, DetectorConfig, PixelConfig, SourceConfig, StackConfig, StepLimitConfig,
    WorldConfig,
};
pub use construction::{
    volume_names, BuildDiagnostic, BuildError, DetectorConstruction, DetectorStack, PhaseState,
};
pub use geometry::{GeometryError, GeometryTree, StepLimit, VisHint, Volume, VolumeId};
pub use hits::{
    CollectorState, Hit, HitCollector, HitsCollection, InvalidStepError, SensitiveDetector,
    StepData, StepOutcome, StepPoint, Touchable,
};
pub use ident::{short_hex, Hash};
pub use material::{
    standard_catalog, CatalogError, Composition, Element, ElementId, Material, MaterialCatalog,
    MaterialCatalogBuilder, MaterialId,
};
pub use physics::{
    register_processes, AtomDeexcitation, EmModel, EmOptions, EmPhysicsConstructor,
    EmPhysicsList, MscStepLimit, ParticleCatalog, ParticleDefinition, ProcessHandle, ProcessKind,
    ProcessOrdering, ProcessRegistry, RegistrationError, RegistrationSummary, SpeciesCategory,
    StepFunction,
};
pub use pixel::{PixelError, PixelLayout};
pub use source::{DiskSpec, RingSpec, SourceAssembly, SourceKind, SourceRecipe};
