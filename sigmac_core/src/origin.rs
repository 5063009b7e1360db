//! Production-origin classification (prompt vs. beauty feed-down).

use crate::pdg::is_beauty_hadron;
use sigmac_env::{Origin, ParticleArena, ParticleId};
use std::collections::HashSet;

/// Decides where a matched charm hadron came from.
///
/// # Implementations
///
/// - [`CharmHadronOrigin`]: non-prompt iff any ancestor is a beauty hadron
///
/// Implementations must be pure functions of the arena.
pub trait OriginClassifier {
    fn classify(&self, arena: &ParticleArena, particle: ParticleId) -> Origin;
}

/// Ancestor scan for beauty hadrons.
///
/// Visits all mothers (not only the first one), one generation at a time,
/// each ancestor at most once.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharmHadronOrigin;

impl OriginClassifier for CharmHadronOrigin {
    fn classify(&self, arena: &ParticleArena, particle: ParticleId) -> Origin {
        let Some(start) = arena.get(particle) else {
            return Origin::None;
        };

        let mut visited: HashSet<ParticleId> = HashSet::new();
        let mut generation: Vec<ParticleId> = start.mothers.clone();

        while !generation.is_empty() {
            let mut next = Vec::new();
            for id in generation {
                if !visited.insert(id) {
                    continue;
                }
                let Some(ancestor) = arena.get(id) else {
                    continue;
                };
                if is_beauty_hadron(ancestor.pdg) {
                    return Origin::NonPrompt;
                }
                next.extend(ancestor.mothers.iter().copied());
            }
            generation = next;
        }
        Origin::Prompt
    }
}

impl<F> OriginClassifier for F
where
    F: Fn(&ParticleArena, ParticleId) -> Origin,
{
    fn classify(&self, arena: &ParticleArena, particle: ParticleId) -> Origin {
        self(arena, particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdg::code;
    use sigmac_env::{ArenaBuilder, SimulatedParticle};

    #[test]
    fn test_prompt_without_ancestors() {
        let mut b = ArenaBuilder::new();
        let sc = b.add_primary(code::SIGMA_C_0);
        let arena = b.finish().unwrap();
        assert_eq!(CharmHadronOrigin.classify(&arena, sc), Origin::Prompt);
    }

    #[test]
    fn test_nonprompt_through_intermediate() {
        let mut b = ArenaBuilder::new();
        let lb = b.add_primary(-code::LAMBDA_B_0);
        let sc = b.add_daughter(lb, -code::SIGMA_C_PLUS_PLUS);
        let lc = b.add_daughter(sc, -code::LAMBDA_C_PLUS);
        let arena = b.finish().unwrap();

        assert_eq!(CharmHadronOrigin.classify(&arena, sc), Origin::NonPrompt);
        assert_eq!(CharmHadronOrigin.classify(&arena, lc), Origin::NonPrompt);
        assert_eq!(CharmHadronOrigin.classify(&arena, lb), Origin::Prompt);
    }

    #[test]
    fn test_beauty_on_second_mother() {
        // string fragment with two mothers: a light quark and a B meson
        let mut quark = SimulatedParticle::new(2);
        quark.daughters.push(ParticleId(2));
        let mut b_meson = SimulatedParticle::new(code::B_PLUS);
        b_meson.daughters.push(ParticleId(2));
        let mut sc = SimulatedParticle::new(code::SIGMA_C_0);
        sc.mothers = vec![ParticleId(0), ParticleId(1)];
        let arena = ParticleArena::new(vec![quark, b_meson, sc]).unwrap();

        assert_eq!(CharmHadronOrigin.classify(&arena, ParticleId(2)), Origin::NonPrompt);
    }

    #[test]
    fn test_missing_particle() {
        let arena = ParticleArena::default();
        assert_eq!(CharmHadronOrigin.classify(&arena, ParticleId(0)), Origin::None);
    }

    #[test]
    fn test_closure_classifier() {
        let arena = ParticleArena::default();
        let always = |_: &ParticleArena, _: ParticleId| Origin::NonPrompt;
        assert_eq!(always.classify(&arena, ParticleId(0)), Origin::NonPrompt);
    }
}
