// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Step construction for hit-collector tests.
//!
//! # Example
//!
//! ```
//! use ndd_dry_tests::StepBuilder;
//! use ndd_core::{HitCollector, StepOutcome};
//!
//! let mut collector = HitCollector::new();
//! let step = StepBuilder::new().energy(0.02).at(1.0, 2.0, 3.0).build();
//! assert_eq!(collector.on_step(&step), Ok(StepOutcome::Recorded));
//! ```

use ndd_core::construction::volume_names;
use ndd_core::{StepData, StepPoint, Touchable};
use ndd_geom::Vec3;

/// Builder for [`StepData`].
///
/// Defaults: an electron (track 1, PDG 11) depositing nothing at the origin
/// of copy 0 of the active silicon.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: StepData,
}

impl Default for StepBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StepBuilder {
    /// Builder with the defaults above.
    pub fn new() -> Self {
        Self {
            step: StepData {
                energy_deposit: 0.0,
                pre_step: StepPoint::default(),
                post_step: StepPoint::default(),
                track_id: 1,
                particle_code: 11,
                touchable: Some(Touchable {
                    copy_number: 0,
                    volume_name: volume_names::SILICON.to_owned(),
                }),
            },
        }
    }

    /// Energy deposit (MeV).
    pub fn energy(mut self, energy: f64) -> Self {
        self.step.energy_deposit = energy;
        self
    }

    /// Pre-step position; the post-step point trails it by 1 µm along Z.
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.step.pre_step.position = Vec3::new(x, y, z);
        self.step.post_step.position = Vec3::new(x, y, z + 1.0e-3);
        self
    }

    /// Pre-step global time (ns).
    pub fn time(mut self, t: f64) -> Self {
        self.step.pre_step.global_time = t;
        self.step.post_step.global_time = t;
        self
    }

    /// Pre-step momentum.
    pub fn momentum(mut self, p: Vec3) -> Self {
        self.step.pre_step.momentum = p;
        self.step.post_step.momentum = p;
        self
    }

    /// Track id and PDG code.
    pub fn track(mut self, track_id: i32, particle_code: i32) -> Self {
        self.step.track_id = track_id;
        self.step.particle_code = particle_code;
        self
    }

    /// Touched volume.
    pub fn in_volume(mut self, name: &str, copy_number: u32) -> Self {
        self.step.touchable = Some(Touchable {
            copy_number,
            volume_name: name.to_owned(),
        });
        self
    }

    /// Drops the touchable (malformed step).
    pub fn without_touchable(mut self) -> Self {
        self.step.touchable = None;
        self
    }

    /// Finishes the step.
    pub fn build(self) -> StepData {
        self.step
    }
}
