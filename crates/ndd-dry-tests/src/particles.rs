// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory particle table.

use ndd_core::{ParticleCatalog, ParticleDefinition};

/// Species a typical EM physics run defines, in a fixed order.
///
/// Covers every recipe bucket: named species, a generic charged hadron
/// (`kaon+`), the `chargedgeantino` exclusion, neutrals and a short-lived
/// resonance.
pub fn standard_particles() -> Vec<ParticleDefinition> {
    vec![
        ParticleDefinition::new("gamma", 22, 0.0),
        ParticleDefinition::new("e-", 11, -1.0),
        ParticleDefinition::new("e+", -11, 1.0),
        ParticleDefinition::new("mu-", 13, -1.0),
        ParticleDefinition::new("mu+", -13, 1.0),
        ParticleDefinition::new("proton", 2212, 1.0),
        ParticleDefinition::new("pi+", 211, 1.0),
        ParticleDefinition::new("pi-", -211, -1.0),
        ParticleDefinition::new("alpha", 1000020040, 2.0),
        ParticleDefinition::new("He3", 1000020030, 2.0),
        ParticleDefinition::new("GenericIon", 0, 1.0),
        ParticleDefinition::new("kaon+", 321, 1.0),
        ParticleDefinition::new("chargedgeantino", 0, 1.0),
        ParticleDefinition::new("geantino", 0, 0.0),
        ParticleDefinition::new("neutron", 2112, 0.0),
        ParticleDefinition::short_lived("rho+", 213, 1.0),
    ]
}

/// [`ParticleCatalog`] backed by a vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParticleCatalog {
    particles: Vec<ParticleDefinition>,
}

impl InMemoryParticleCatalog {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding [`standard_particles`].
    pub fn standard() -> Self {
        Self {
            particles: standard_particles(),
        }
    }

    /// Appends one species.
    pub fn with(mut self, particle: ParticleDefinition) -> Self {
        self.particles.push(particle);
        self
    }
}

impl ParticleCatalog for InMemoryParticleCatalog {
    fn particles(&self) -> &[ParticleDefinition] {
        &self.particles
    }
}
