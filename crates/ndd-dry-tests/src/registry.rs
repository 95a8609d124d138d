// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process registry fake that records every call.

use ndd_core::{
    EmOptions, ParticleDefinition, ProcessHandle, ProcessKind, ProcessRegistry, RegistrationError,
};

/// Records registrations in call order.
///
/// Optionally refuses one process kind so error propagation can be tested.
#[derive(Debug, Clone, Default)]
pub struct RecordingProcessRegistry {
    registrations: Vec<(String, ProcessHandle)>,
    options: Vec<EmOptions>,
    reject: Option<ProcessKind>,
}

impl RecordingProcessRegistry {
    /// Registry that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that refuses `kind` for every species.
    pub fn rejecting(kind: ProcessKind) -> Self {
        Self {
            reject: Some(kind),
            ..Self::default()
        }
    }

    /// Every `(species, handle)` pair, in call order.
    pub fn registrations(&self) -> &[(String, ProcessHandle)] {
        &self.registrations
    }

    /// Handles attached to `particle`, in call order.
    pub fn processes_for(&self, particle: &str) -> Vec<ProcessHandle> {
        self.registrations
            .iter()
            .filter(|(name, _)| name == particle)
            .map(|(_, h)| *h)
            .collect()
    }

    /// Process kinds attached to `particle`, in call order.
    pub fn kinds_for(&self, particle: &str) -> Vec<ProcessKind> {
        self.processes_for(particle).iter().map(|h| h.kind).collect()
    }

    /// EM options received, one entry per call.
    pub fn options(&self) -> &[EmOptions] {
        &self.options
    }
}

impl ProcessRegistry for RecordingProcessRegistry {
    fn register(
        &mut self,
        particle: &ParticleDefinition,
        process: ProcessHandle,
    ) -> Result<(), RegistrationError> {
        if self.reject == Some(process.kind) {
            return Err(RegistrationError::Rejected {
                particle: particle.name.clone(),
                process: process.kind,
                reason: "rejected by test registry".into(),
            });
        }
        self.registrations.push((particle.name.clone(), process));
        Ok(())
    }

    fn set_em_options(&mut self, options: &EmOptions) -> Result<(), RegistrationError> {
        self.options.push(*options);
        Ok(())
    }
}
