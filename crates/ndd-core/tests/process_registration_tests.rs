// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use ndd_core::{
    register_processes, EmPhysicsConstructor, EmPhysicsList, ParticleDefinition, ProcessKind,
    RegistrationError, SpeciesCategory,
};
use ndd_dry_tests::{InMemoryParticleCatalog, RecordingProcessRegistry};

const LISTS: [EmPhysicsList; 2] = [EmPhysicsList::Standard, EmPhysicsList::SingleScattering];

#[test]
fn charged_leptons_get_their_own_processes() {
    for list in LISTS {
        let mut registry = RecordingProcessRegistry::new();
        register_processes(&InMemoryParticleCatalog::standard(), &mut registry, list).unwrap();
        let gamma = registry.kinds_for("gamma");
        assert_eq!(gamma.len(), 3, "{list:?}");
        for name in ["e-", "mu-"] {
            let kinds = registry.kinds_for(name);
            assert!(!kinds.is_empty(), "{list:?} {name}");
            assert!(kinds.iter().all(|k| !gamma.contains(k)), "{list:?} {name}");
        }
    }
}

#[test]
fn untracked_species_receive_nothing() {
    let mut registry = RecordingProcessRegistry::new();
    let summary = register_processes(
        &InMemoryParticleCatalog::standard(),
        &mut registry,
        EmPhysicsList::Standard,
    )
    .unwrap();
    for name in ["chargedgeantino", "geantino", "neutron", "rho+"] {
        assert!(registry.processes_for(name).is_empty(), "{name}");
        assert_eq!(summary.category_of(name), Some(SpeciesCategory::Untracked));
    }
    assert_eq!(summary.untracked, 4);
    assert_eq!(summary.processes, registry.registrations().len());
    assert_eq!(
        summary.category_of("kaon+"),
        Some(SpeciesCategory::OtherCharged)
    );
    assert_eq!(
        registry.kinds_for("kaon+"),
        vec![ProcessKind::HadronMultipleScattering, ProcessKind::HadronIonisation]
    );
}

#[test]
fn options_are_pushed_once_after_the_species() {
    for list in LISTS {
        let mut registry = RecordingProcessRegistry::new();
        register_processes(&InMemoryParticleCatalog::standard(), &mut registry, list).unwrap();
        assert_eq!(registry.options(), &[list.em_options()]);
    }
}

#[test]
fn positron_adds_annihilation_last() {
    for list in LISTS {
        let mut registry = RecordingProcessRegistry::new();
        register_processes(&InMemoryParticleCatalog::standard(), &mut registry, list).unwrap();
        let electron = registry.kinds_for("e-");
        let positron = registry.kinds_for("e+");
        assert_eq!(&positron[..electron.len()], electron.as_slice());
        assert_eq!(positron.last(), Some(&ProcessKind::PositronAnnihilation));
    }
}

#[test]
fn single_scattering_replaces_multiple_scattering() {
    let mut registry = RecordingProcessRegistry::new();
    register_processes(
        &InMemoryParticleCatalog::standard(),
        &mut registry,
        EmPhysicsList::SingleScattering,
    )
    .unwrap();
    let msc = [
        ProcessKind::ElectronMultipleScattering,
        ProcessKind::MuonMultipleScattering,
        ProcessKind::HadronMultipleScattering,
    ];
    assert!(registry
        .registrations()
        .iter()
        .all(|(_, h)| !msc.contains(&h.kind)));
    assert!(registry
        .kinds_for("proton")
        .contains(&ProcessKind::CoulombScattering));
}

#[test]
fn host_rejection_aborts_registration() {
    let mut registry = RecordingProcessRegistry::rejecting(ProcessKind::MuonIonisation);
    let err = register_processes(
        &InMemoryParticleCatalog::standard(),
        &mut registry,
        EmPhysicsList::Standard,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Rejected { ref particle, process: ProcessKind::MuonIonisation, .. }
            if particle == "mu-"
    ));
    // Options are never pushed after a failure.
    assert!(registry.options().is_empty());
}

#[test]
fn constructor_registers_once_per_run() {
    let catalog = InMemoryParticleCatalog::new()
        .with(ParticleDefinition::new("gamma", 22, 0.0))
        .with(ParticleDefinition::new("e-", 11, -1.0));
    let mut registry = RecordingProcessRegistry::new();
    let mut constructor = EmPhysicsConstructor::new(EmPhysicsList::Standard);
    let summary = constructor
        .construct_process(&catalog, &mut registry)
        .unwrap();
    assert_eq!(summary.processes, 6);
    assert_eq!(
        constructor.construct_process(&catalog, &mut registry),
        Err(RegistrationError::AlreadyRegistered)
    );
    assert_eq!(registry.registrations().len(), 6);
}

#[test]
fn plain_vectors_serve_as_catalogs() {
    let particles = vec![ParticleDefinition::new("alpha", 1000020040, 2.0)];
    let mut registry = RecordingProcessRegistry::new();
    let summary = register_processes(&particles, &mut registry, EmPhysicsList::Standard).unwrap();
    assert_eq!(summary.category_of("alpha"), Some(SpeciesCategory::LightIon));
    assert_eq!(
        registry.kinds_for("alpha"),
        vec![
            ProcessKind::HadronMultipleScattering,
            ProcessKind::IonIonisation,
            ProcessKind::NuclearStopping
        ]
    );
}
