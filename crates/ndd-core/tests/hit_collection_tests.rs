// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use ndd_core::{
    volume_names, CollectorState, HitCollector, InvalidStepError, SensitiveDetector, StepOutcome,
};
use ndd_dry_tests::StepBuilder;
use ndd_geom::units::{KEV, MM};
use ndd_geom::Vec3;
use proptest::prelude::*;

#[test]
fn first_hit_defines_the_origin() {
    let mut collector = HitCollector::new();
    let dz = 0.25 * MM;
    collector
        .on_step(&StepBuilder::new().energy(10.0 * KEV).at(0.0, 0.0, 10.0).build())
        .unwrap();
    collector
        .on_step(
            &StepBuilder::new()
                .energy(5.0 * KEV)
                .at(0.0, 0.0, 10.0 + dz)
                .build(),
        )
        .unwrap();
    let hits = collector.on_event_end().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits.get(0).unwrap().position, Vec3::ZERO);
    assert_eq!(hits.get(1).unwrap().position, Vec3::new(0.0, 0.0, dz));
    assert!((hits.total_energy() - 15.0 * KEV).abs() < 1e-15);
}

#[test]
fn zero_deposits_leave_no_trace() {
    let mut collector = HitCollector::new();
    let outcome = collector
        .on_step(&StepBuilder::new().at(3.0, 4.0, 5.0).build())
        .unwrap();
    assert_eq!(outcome, StepOutcome::NotRecorded);
    assert_eq!(collector.state(), CollectorState::Idle);
    assert!(collector.origin().is_none());

    // The origin comes from the first recorded step, not the skipped one.
    collector
        .on_step(&StepBuilder::new().energy(1.0).at(1.0, 1.0, 1.0).build())
        .unwrap();
    assert_eq!(collector.origin(), Some(Vec3::new(1.0, 1.0, 1.0)));
    assert_eq!(collector.len(), 1);
}

#[test]
fn hit_copies_step_identity() {
    let mut collector = HitCollector::new();
    let step = StepBuilder::new()
        .energy(0.5)
        .at(0.0, 0.0, 0.0)
        .time(12.5)
        .momentum(Vec3::new(0.0, 0.1, 0.9))
        .track(7, -11)
        .in_volume(volume_names::SILICON, 3)
        .build();
    collector.on_step(&step).unwrap();
    let hits = collector.on_event_end().unwrap();
    let hit = hits.get(0).unwrap();
    assert_eq!(hit.track_id, 7);
    assert_eq!(hit.particle_code, -11);
    assert_eq!(hit.global_time, 12.5);
    assert_eq!(hit.momentum, Vec3::new(0.0, 0.1, 0.9));
    assert_eq!(hit.channel, 3);
    assert_eq!(hit.channel_name, volume_names::SILICON);
}

#[test]
fn malformed_steps_are_rejected() {
    let mut collector = HitCollector::new();
    assert_eq!(
        collector.on_step(&StepBuilder::new().energy(1.0).without_touchable().build()),
        Err(InvalidStepError::MissingTouchable)
    );
    assert_eq!(
        collector.on_step(&StepBuilder::new().energy(-1.0).build()),
        Err(InvalidStepError::InvalidEnergy(-1.0))
    );
    assert_eq!(
        collector.on_step(&StepBuilder::new().energy(1.0).at(f64::NAN, 0.0, 0.0).build()),
        Err(InvalidStepError::NonFinitePosition)
    );
    // Rejected steps do not open the event.
    assert_eq!(collector.state(), CollectorState::Idle);
}

#[test]
fn finalized_collector_refuses_more_steps() {
    let mut collector = HitCollector::new();
    collector
        .on_step(&StepBuilder::new().energy(1.0).build())
        .unwrap();
    assert_eq!(collector.on_event_end().unwrap().len(), 1);
    assert_eq!(collector.state(), CollectorState::Finalized);
    assert_eq!(
        collector.on_step(&StepBuilder::new().energy(1.0).build()),
        Err(InvalidStepError::EventFinalized)
    );
    assert_eq!(collector.on_event_end(), Err(InvalidStepError::EventFinalized));
}

#[test]
fn sensitive_detector_resets_per_event() {
    let mut sd = SensitiveDetector::new("SiliconSD", "SiliconHits");
    assert_eq!(
        sd.process_hits(&StepBuilder::new().energy(1.0).build()),
        Err(InvalidStepError::NoActiveEvent)
    );

    assert!(sd.initialize(0).is_none());
    sd.process_hits(&StepBuilder::new().energy(1.0).at(5.0, 0.0, 0.0).build())
        .unwrap();
    let first = sd.end_of_event().unwrap();
    assert_eq!(first.len(), 1);

    assert!(sd.initialize(1).is_none());
    sd.process_hits(&StepBuilder::new().energy(2.0).at(-5.0, 0.0, 0.0).build())
        .unwrap();
    let second = sd.end_of_event().unwrap();
    // A fresh event gets a fresh origin.
    assert_eq!(second.get(0).unwrap().position, Vec3::ZERO);
    assert_eq!(sd.end_of_event(), Err(InvalidStepError::NoActiveEvent));
    assert_eq!(sd.collection_name(), "SiliconHits");
}

#[test]
fn reopening_an_event_hands_back_its_hits() {
    let mut sd = SensitiveDetector::new("SiliconSD", "SiliconHits");
    assert!(sd.initialize(4).is_none());
    sd.process_hits(&StepBuilder::new().energy(1.0).at(2.0, 0.0, 0.0).build())
        .unwrap();
    sd.process_hits(&StepBuilder::new().energy(0.5).at(2.0, 1.0, 0.0).build())
        .unwrap();

    let abandoned = sd.initialize(5).unwrap();
    assert_eq!(abandoned.len(), 2);
    assert_eq!(abandoned.get(1).unwrap().position, Vec3::new(0.0, 1.0, 0.0));

    // An event without deposits has nothing to hand back.
    assert!(sd.initialize(6).is_none());
    assert!(sd.end_of_event().unwrap().is_empty());
}

proptest! {
    #[test]
    fn positions_are_relative_to_the_first_hit(
        points in proptest::collection::vec(
            (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0, 1.0e-6f64..10.0),
            1..32,
        )
    ) {
        let mut collector = HitCollector::new();
        for &(x, y, z, e) in &points {
            let outcome = collector.on_step(&StepBuilder::new().energy(e).at(x, y, z).build());
            prop_assert_eq!(outcome, Ok(StepOutcome::Recorded));
        }
        let hits = collector.on_event_end().unwrap();
        prop_assert_eq!(hits.len(), points.len());
        prop_assert_eq!(hits.get(0).unwrap().position, Vec3::ZERO);
        let (x0, y0, z0, _) = points[0];
        for (hit, &(x, y, z, e)) in hits.iter().zip(&points) {
            prop_assert_eq!(hit.position, Vec3::new(x - x0, y - y0, z - z0));
            prop_assert_eq!(hit.energy_deposit, e);
        }
    }
}
