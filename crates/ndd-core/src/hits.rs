// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-event hit collection inside the active silicon.
//!
//! A [`HitCollector`] lives for exactly one event. The first step with a
//! nonzero energy deposit fixes the event's reference origin; every hit
//! stores its pre-step position relative to that origin. Hits are
//! append-only and iterate in step order.

use ndd_geom::Vec3;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Kinematic snapshot at one end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepPoint {
    /// Global position (mm).
    pub position: Vec3,
    /// Global time (ns).
    pub global_time: f64,
    /// Momentum (MeV/c).
    pub momentum: Vec3,
}

/// Readout identity of the volume a step was taken in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Touchable {
    /// Copy number of the touched volume.
    pub copy_number: u32,
    /// Name of the touched volume.
    pub volume_name: String,
}

/// What the transport engine reports for one step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepData {
    /// Total energy deposited along the step (MeV).
    pub energy_deposit: f64,
    /// Start of the step.
    pub pre_step: StepPoint,
    /// End of the step.
    pub post_step: StepPoint,
    /// Host-assigned track id.
    pub track_id: i32,
    /// PDG code of the stepping particle.
    pub particle_code: i32,
    /// Volume at the pre-step point.
    pub touchable: Option<Touchable>,
}

/// One recorded energy deposit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit {
    /// Track that deposited the energy.
    pub track_id: i32,
    /// Deposited energy (MeV), strictly positive.
    pub energy_deposit: f64,
    /// Pre-step position relative to the event's first hit.
    pub position: Vec3,
    /// Pre-step global time (ns).
    pub global_time: f64,
    /// Pre-step momentum.
    pub momentum: Vec3,
    /// PDG code.
    pub particle_code: i32,
    /// Readout channel index (copy number).
    pub channel: u32,
    /// Readout channel name (volume name).
    pub channel_name: String,
}

/// Ordered hits of one event.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitsCollection {
    hits: Vec<Hit>,
}

impl HitsCollection {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// `true` when the event deposited nothing.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits in step order.
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Hit by insertion index.
    pub fn get(&self, index: usize) -> Option<&Hit> {
        self.hits.get(index)
    }

    /// Sum of deposited energy.
    pub fn total_energy(&self) -> f64 {
        self.hits.iter().map(|h| h.energy_deposit).sum()
    }

    /// Consumes the collection.
    pub fn into_vec(self) -> Vec<Hit> {
        self.hits
    }
}

impl<'a> IntoIterator for &'a HitsCollection {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Result of handing one step to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step produced a hit.
    Recorded,
    /// Zero deposit; nothing stored.
    NotRecorded,
}

/// Malformed step or misuse of the collector lifecycle.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidStepError {
    /// The step carries no volume identity.
    #[error("step has no touchable volume")]
    MissingTouchable,
    /// Negative or non-finite energy deposit.
    #[error("invalid energy deposit {0}")]
    InvalidEnergy(f64),
    /// Pre-step position with NaN or infinite components.
    #[error("step position is not finite")]
    NonFinitePosition,
    /// The event was already closed.
    #[error("event already finalized")]
    EventFinalized,
    /// No event is open on this detector.
    #[error("no event in progress")]
    NoActiveEvent,
}

/// Lifecycle of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// No hit yet.
    Idle,
    /// Reference origin fixed, hits accumulating.
    Active,
    /// Handed back to the host.
    Finalized,
}

/// Builds the hit collection of a single event.
#[derive(Debug, Clone)]
pub struct HitCollector {
    state: CollectorState,
    origin: Vec3,
    hits: HitsCollection,
}

impl Default for HitCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl HitCollector {
    /// Fresh collector in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: CollectorState::Idle,
            origin: Vec3::ZERO,
            hits: HitsCollection::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CollectorState {
        self.state
    }

    /// Reference origin, once the first hit fixed it.
    pub fn origin(&self) -> Option<Vec3> {
        (self.state == CollectorState::Active).then_some(self.origin)
    }

    /// Hits recorded so far.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// `true` before the first recorded hit.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Handles one step.
    ///
    /// Zero deposits are skipped without touching the state. The first
    /// recorded step fixes the origin, so its hit sits at `(0, 0, 0)`.
    pub fn on_step(&mut self, step: &StepData) -> Result<StepOutcome, InvalidStepError> {
        if self.state == CollectorState::Finalized {
            return Err(InvalidStepError::EventFinalized);
        }
        let energy = step.energy_deposit;
        if !energy.is_finite() || energy < 0.0 {
            return Err(InvalidStepError::InvalidEnergy(energy));
        }
        if energy == 0.0 {
            return Ok(StepOutcome::NotRecorded);
        }
        let touchable = step
            .touchable
            .as_ref()
            .ok_or(InvalidStepError::MissingTouchable)?;
        let pre = &step.pre_step;
        if !pre.position.is_finite() {
            return Err(InvalidStepError::NonFinitePosition);
        }
        if self.state == CollectorState::Idle {
            self.origin = pre.position;
            self.state = CollectorState::Active;
        }
        let hit = Hit {
            track_id: step.track_id,
            energy_deposit: energy,
            position: pre.position.sub(&self.origin),
            global_time: pre.global_time,
            momentum: pre.momentum,
            particle_code: step.particle_code,
            channel: touchable.copy_number,
            channel_name: touchable.volume_name.clone(),
        };
        trace!(
            track = hit.track_id,
            edep = hit.energy_deposit,
            channel = hit.channel,
            "hit"
        );
        self.hits.hits.push(hit);
        Ok(StepOutcome::Recorded)
    }

    /// Closes the event and hands back its hits.
    pub fn on_event_end(&mut self) -> Result<HitsCollection, InvalidStepError> {
        if self.state == CollectorState::Finalized {
            return Err(InvalidStepError::EventFinalized);
        }
        self.state = CollectorState::Finalized;
        Ok(std::mem::take(&mut self.hits))
    }
}

/// Host-facing wrapper that opens one collector per event.
#[derive(Debug)]
pub struct SensitiveDetector {
    name: String,
    collection_name: String,
    event: Option<(u64, HitCollector)>,
}

impl SensitiveDetector {
    /// Detector `name` filling the hits collection `collection_name`.
    pub fn new(name: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection_name: collection_name.into(),
            event: None,
        }
    }

    /// Detector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the hits collection this detector fills.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Opens `event_id`.
    ///
    /// An event still open from an earlier call is abandoned; its hits, if
    /// any, are logged at `warn` and handed back.
    pub fn initialize(&mut self, event_id: u64) -> Option<HitsCollection> {
        let abandoned = self.event.replace((event_id, HitCollector::new()));
        let (dropped, mut collector) = abandoned?;
        if collector.is_empty() {
            return None;
        }
        warn!(
            detector = %self.name,
            dropped_event = dropped,
            hits = collector.len(),
            event = event_id,
            "event opened before the previous one ended"
        );
        collector.on_event_end().ok()
    }

    /// Forwards one step to the open event.
    pub fn process_hits(&mut self, step: &StepData) -> Result<StepOutcome, InvalidStepError> {
        match self.event.as_mut() {
            Some((_, collector)) => collector.on_step(step),
            None => Err(InvalidStepError::NoActiveEvent),
        }
    }

    /// Closes the open event and returns its hits.
    pub fn end_of_event(&mut self) -> Result<HitsCollection, InvalidStepError> {
        let (event_id, mut collector) = self.event.take().ok_or(InvalidStepError::NoActiveEvent)?;
        let hits = collector.on_event_end()?;
        debug!(
            detector = %self.name,
            collection = %self.collection_name,
            event = event_id,
            hits = hits.len(),
            "end of event"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn step(edep: f64, z: f64) -> StepData {
        StepData {
            energy_deposit: edep,
            pre_step: StepPoint {
                position: Vec3::new(1.0, 2.0, z),
                global_time: 3.0,
                momentum: Vec3::new(0.0, 0.0, 0.5),
            },
            post_step: StepPoint::default(),
            track_id: 1,
            particle_code: 11,
            touchable: Some(Touchable {
                copy_number: 0,
                volume_name: "physicalSilicon".into(),
            }),
        }
    }

    #[test]
    fn zero_deposit_keeps_collector_idle() {
        let mut c = HitCollector::new();
        assert_eq!(c.on_step(&step(0.0, 5.0)), Ok(StepOutcome::NotRecorded));
        assert_eq!(c.state(), CollectorState::Idle);
        assert_eq!(c.origin(), None);
        c.on_step(&step(0.1, 7.0)).unwrap();
        assert_eq!(c.origin(), Some(Vec3::new(1.0, 2.0, 7.0)));
    }

    #[test]
    fn negative_or_nan_energy_is_invalid() {
        let mut c = HitCollector::new();
        assert_eq!(c.on_step(&step(-1.0, 0.0)), Err(InvalidStepError::InvalidEnergy(-1.0)));
        assert!(matches!(
            c.on_step(&step(f64::NAN, 0.0)),
            Err(InvalidStepError::InvalidEnergy(_))
        ));
        assert!(c.is_empty());
    }

    #[test]
    fn missing_touchable_is_invalid_but_zero_deposit_is_not() {
        let mut c = HitCollector::new();
        let mut s = step(0.2, 0.0);
        s.touchable = None;
        assert_eq!(c.on_step(&s), Err(InvalidStepError::MissingTouchable));
        s.energy_deposit = 0.0;
        assert_eq!(c.on_step(&s), Ok(StepOutcome::NotRecorded));
    }

    #[test]
    fn finalized_collector_rejects_steps() {
        let mut c = HitCollector::new();
        c.on_step(&step(0.2, 0.0)).unwrap();
        let hits = c.on_event_end().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(c.on_step(&step(0.2, 0.0)), Err(InvalidStepError::EventFinalized));
        assert_eq!(c.on_event_end(), Err(InvalidStepError::EventFinalized));
    }

    #[test]
    fn sensitive_detector_requires_an_open_event() {
        let mut sd = SensitiveDetector::new("SiPixelSD", "SiPixelHitsCollection");
        assert_eq!(sd.process_hits(&step(0.1, 0.0)), Err(InvalidStepError::NoActiveEvent));
        sd.initialize(0);
        sd.process_hits(&step(0.1, 0.0)).unwrap();
        sd.process_hits(&step(0.2, 0.5)).unwrap();
        let hits = sd.end_of_event().unwrap();
        assert_eq!(hits.len(), 2);
        assert!((hits.total_energy() - 0.3).abs() < 1e-12);
        assert!(sd.end_of_event().is_err());
    }
}
