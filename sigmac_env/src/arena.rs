//! Per-event store of simulated particles.
//!
//! The generator record is a forest: every particle knows its mothers and
//! daughters by index. The arena is immutable once built, which keeps the
//! decay-tree walks pure.

use crate::error::DataError;
use crate::types::ParticleId;
use serde::{Deserialize, Serialize};

/// One entry of the generator record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedParticle {
    /// PDG species code (negative for antiparticles)
    pub pdg: i32,

    /// Mother indices, first one is the primary mother
    pub mothers: Vec<ParticleId>,

    /// Daughter indices in production order
    pub daughters: Vec<ParticleId>,
}

impl SimulatedParticle {
    /// A particle with no links yet.
    pub fn new(pdg: i32) -> Self {
        Self {
            pdg,
            mothers: Vec::new(),
            daughters: Vec::new(),
        }
    }

    #[inline]
    pub fn has_daughters(&self) -> bool {
        !self.daughters.is_empty()
    }

    #[inline]
    pub fn has_mothers(&self) -> bool {
        !self.mothers.is_empty()
    }
}

/// Validated, index-addressed collection of simulated particles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleArena {
    particles: Vec<SimulatedParticle>,
}

impl ParticleArena {
    /// Wraps a particle list after checking every link stays inside it.
    pub fn new(particles: Vec<SimulatedParticle>) -> Result<Self, DataError> {
        let len = particles.len();
        for (index, particle) in particles.iter().enumerate() {
            for link in particle.mothers.iter().chain(particle.daughters.iter()) {
                if link.0 >= len {
                    return Err(DataError::dangling(index, link.0));
                }
                if link.0 == index {
                    return Err(DataError::SelfReference(index));
                }
            }
        }
        Ok(Self { particles })
    }

    /// Looks up a particle. Labels coming from tracks are not trusted, hence `Option`.
    #[inline]
    pub fn get(&self, id: ParticleId) -> Option<&SimulatedParticle> {
        self.particles.get(id.0)
    }

    /// PDG code of a particle, if it exists.
    #[inline]
    pub fn pdg(&self, id: ParticleId) -> Option<i32> {
        self.get(id).map(|p| p.pdg)
    }

    /// The primary (first) mother of a particle.
    pub fn first_mother(&self, id: ParticleId) -> Option<ParticleId> {
        self.get(id)?.mothers.first().copied()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Iterates over all particles in generator order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &SimulatedParticle)> {
        self.particles
            .iter()
            .enumerate()
            .map(|(index, particle)| (ParticleId(index), particle))
    }
}

/// Incrementally builds a decay forest, keeping mother/daughter links symmetric.
#[derive(Debug, Default)]
pub struct ArenaBuilder {
    particles: Vec<SimulatedParticle>,
}

impl ArenaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle without a mother (beam remnant, primary hadron, ...).
    pub fn add_primary(&mut self, pdg: i32) -> ParticleId {
        let id = ParticleId(self.particles.len());
        self.particles.push(SimulatedParticle::new(pdg));
        id
    }

    /// Adds a daughter of `mother` and links both directions.
    ///
    /// An unknown mother leaves the daughter unlinked; `finish` still succeeds.
    pub fn add_daughter(&mut self, mother: ParticleId, pdg: i32) -> ParticleId {
        let id = self.add_primary(pdg);
        if let Some(parent) = self.particles.get_mut(mother.0) {
            parent.daughters.push(id);
            self.particles[id.0].mothers.push(mother);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Validates and freezes the record.
    pub fn finish(self) -> Result<ParticleArena, DataError> {
        ParticleArena::new(self.particles)
    }
}
