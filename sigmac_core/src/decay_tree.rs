//! Decay-tree walking primitives over a [`ParticleArena`].
//!
//! All functions are pure: they read the arena and return indices. Depth
//! limits count generations below (or above) the starting particle; `None`
//! means unlimited. The arena is a forest, but walks are additionally
//! bounded by its size so a corrupt record cannot loop.

use sigmac_env::{ParticleArena, ParticleId};

/// A reconstructed decay matched to a generated mother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayMatch {
    /// The generated mother particle
    pub mother: ParticleId,

    /// +1 when the mother is the particle, -1 when it is the antiparticle
    pub sign: i8,
}

/// Collects the final-state descendants of `root`.
///
/// A descendant is final when it has no daughters, when it sits `max_depth`
/// generations below `root`, or when its |PDG| appears in `final_pdgs`
/// (compared by absolute value). `root` itself is never returned.
pub fn final_daughters(
    arena: &ParticleArena,
    root: ParticleId,
    final_pdgs: &[i32],
    max_depth: Option<u32>,
) -> Vec<ParticleId> {
    let mut finals = Vec::new();
    collect_finals(arena, root, final_pdgs, max_depth, 0, &mut finals);
    finals
}

fn collect_finals(
    arena: &ParticleArena,
    id: ParticleId,
    final_pdgs: &[i32],
    max_depth: Option<u32>,
    stage: u32,
    finals: &mut Vec<ParticleId>,
) {
    let Some(particle) = arena.get(id) else {
        return;
    };
    if stage as usize > arena.len() {
        return;
    }

    let is_final = !particle.has_daughters()
        || max_depth.is_some_and(|depth| stage >= depth)
        || (stage > 0 && final_pdgs.iter().any(|pdg| pdg.abs() == particle.pdg.abs()));

    if is_final {
        if stage > 0 {
            finals.push(id);
        }
        return;
    }

    for &daughter in &particle.daughters {
        collect_finals(arena, daughter, final_pdgs, max_depth, stage + 1, finals);
    }
}

/// Walks up the first-mother chain of `particle` looking for `mother_pdg`.
///
/// With `accept_anti`, the charge conjugate `-mother_pdg` also matches and
/// yields sign -1. At most `max_depth` ancestors are inspected.
pub fn find_mother(
    arena: &ParticleArena,
    particle: ParticleId,
    mother_pdg: i32,
    accept_anti: bool,
    max_depth: Option<u32>,
) -> Option<DecayMatch> {
    let mut current = particle;
    let mut stage = 0u32;

    while let Some(mother) = arena.first_mother(current) {
        if max_depth.is_some_and(|depth| stage >= depth) || stage as usize >= arena.len() {
            break;
        }
        let pdg = arena.pdg(mother)?;
        if pdg == mother_pdg {
            return Some(DecayMatch { mother, sign: 1 });
        }
        if accept_anti && pdg == -mother_pdg {
            return Some(DecayMatch { mother, sign: -1 });
        }
        current = mother;
        stage += 1;
    }
    None
}

/// Checks that the final descendants of `root` carry exactly the codes
/// `expected`, each multiplied by `sign`, in any order.
///
/// Returns the matched descendants on success.
pub fn match_descendants(
    arena: &ParticleArena,
    root: ParticleId,
    expected: &[i32],
    sign: i8,
    max_depth: Option<u32>,
) -> Option<Vec<ParticleId>> {
    let finals = final_daughters(arena, root, expected, max_depth);
    if finals.len() != expected.len() {
        return None;
    }

    let mut remaining: Vec<i32> = expected.to_vec();
    for &daughter in &finals {
        let pdg = arena.pdg(daughter)? * i32::from(sign);
        let pos = remaining.iter().position(|&code| code == pdg)?;
        remaining.swap_remove(pos);
    }
    Some(finals)
}

/// Reconstruction-level matching.
///
/// `daughters` are the truth labels of the reconstructed prongs, in prong
/// order. The mother is searched from the first prong; then every prong must
/// be one of the mother's final descendants, with the expected species up to
/// an overall charge conjugation.
pub fn match_reconstructed(
    arena: &ParticleArena,
    daughters: &[Option<ParticleId>],
    mother_pdg: i32,
    expected: &[i32],
    accept_anti: bool,
    max_depth: Option<u32>,
) -> Option<DecayMatch> {
    if daughters.len() != expected.len() {
        return None;
    }
    let labels: Vec<ParticleId> = daughters.iter().copied().collect::<Option<_>>()?;
    let first = *labels.first()?;

    let found = find_mother(arena, first, mother_pdg, accept_anti, max_depth)?;
    let mut finals = match_descendants(arena, found.mother, expected, found.sign, max_depth)?;

    for label in labels {
        let pos = finals.iter().position(|&f| f == label)?;
        finals.swap_remove(pos);
    }
    Some(found)
}

/// Generation-level matching: `particle` must be `pdg` (or its antiparticle
/// with `accept_anti`) and decay into `expected`. Returns the sign.
///
/// An empty `expected` checks the species only.
pub fn match_generated(
    arena: &ParticleArena,
    particle: ParticleId,
    pdg: i32,
    expected: &[i32],
    accept_anti: bool,
    max_depth: Option<u32>,
) -> Option<i8> {
    let code = arena.pdg(particle)?;
    let sign = if code == pdg {
        1
    } else if accept_anti && code == -pdg {
        -1
    } else {
        return None;
    };

    if !expected.is_empty() {
        match_descendants(arena, particle, expected, sign, max_depth)?;
    }
    Some(sign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmac_env::ArenaBuilder;

    const SC0: i32 = 4112;
    const LC: i32 = 4122;
    const P: i32 = 2212;
    const K: i32 = 321;
    const PI: i32 = 211;
    const KSTAR: i32 = 313;

    /// Σc0 → Λc+ π-, Λc+ → p K*0, K*0 → K- π+ (sign flips everything)
    fn resonant_chain(sign: i32) -> (ParticleArena, Vec<ParticleId>) {
        let mut b = ArenaBuilder::new();
        let sc = b.add_primary(sign * SC0);
        let lc = b.add_daughter(sc, sign * LC);
        let soft = b.add_daughter(sc, -sign * PI);
        let p = b.add_daughter(lc, sign * P);
        let kstar = b.add_daughter(lc, sign * KSTAR);
        let k = b.add_daughter(kstar, -sign * K);
        let pi = b.add_daughter(kstar, sign * PI);
        (b.finish().unwrap(), vec![sc, lc, soft, p, kstar, k, pi])
    }

    #[test]
    fn test_final_daughters_respects_depth() {
        let (arena, ids) = resonant_chain(1);
        let sc = ids[0];

        assert_eq!(final_daughters(&arena, sc, &[], Some(1)), vec![ids[1], ids[2]]);
        assert_eq!(
            final_daughters(&arena, sc, &[P, K, PI], Some(3)),
            vec![ids[3], ids[5], ids[6], ids[2]]
        );
        // depth 2 stops at the K*0
        assert_eq!(
            final_daughters(&arena, sc, &[P, K, PI], Some(2)),
            vec![ids[3], ids[4], ids[2]]
        );
        assert!(final_daughters(&arena, ids[6], &[], None).is_empty());
    }

    #[test]
    fn test_final_pdgs_stop_descent() {
        let (arena, ids) = resonant_chain(1);
        // Λc listed as final: the walk does not enter it
        assert_eq!(final_daughters(&arena, ids[0], &[LC, PI], None), vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_find_mother_with_depth_limit() {
        let (arena, ids) = resonant_chain(1);
        let kaon = ids[5];

        let found = find_mother(&arena, kaon, SC0, false, Some(3)).unwrap();
        assert_eq!(found, DecayMatch { mother: ids[0], sign: 1 });
        assert!(find_mother(&arena, kaon, SC0, false, Some(2)).is_none());
        assert!(find_mother(&arena, kaon, 4222, true, None).is_none());
    }

    #[test]
    fn test_find_mother_antiparticle() {
        let (arena, ids) = resonant_chain(-1);
        assert!(find_mother(&arena, ids[3], SC0, false, Some(3)).is_none());
        let found = find_mother(&arena, ids[3], SC0, true, Some(3)).unwrap();
        assert_eq!(found.sign, -1);
    }

    #[test]
    fn test_match_reconstructed_particle_and_antiparticle() {
        let expected = [P, -K, PI, -PI];
        for sign in [1, -1] {
            let (arena, ids) = resonant_chain(sign);
            let prongs = [Some(ids[3]), Some(ids[5]), Some(ids[6]), Some(ids[2])];
            let found = match_reconstructed(&arena, &prongs, SC0, &expected, true, Some(3)).unwrap();
            assert_eq!(found.mother, ids[0]);
            assert_eq!(i32::from(found.sign), sign);
        }
    }

    #[test]
    fn test_match_reconstructed_failures() {
        let (arena, ids) = resonant_chain(1);
        let expected = [P, -K, PI, -PI];

        // unlabelled prong
        let prongs = [Some(ids[3]), None, Some(ids[6]), Some(ids[2])];
        assert!(match_reconstructed(&arena, &prongs, SC0, &expected, true, Some(3)).is_none());

        // same particle used twice
        let prongs = [Some(ids[3]), Some(ids[5]), Some(ids[6]), Some(ids[6])];
        assert!(match_reconstructed(&arena, &prongs, SC0, &expected, true, Some(3)).is_none());

        // wrong species hypothesis for the soft pion
        let wrong = [P, -K, PI, PI];
        let prongs = [Some(ids[3]), Some(ids[5]), Some(ids[6]), Some(ids[2])];
        assert!(match_reconstructed(&arena, &prongs, SC0, &wrong, true, Some(3)).is_none());

        // depth too shallow to reach through the K*0
        assert!(match_reconstructed(&arena, &prongs, SC0, &expected, true, Some(2)).is_none());
    }

    #[test]
    fn test_match_generated() {
        let (arena, ids) = resonant_chain(-1);
        assert_eq!(match_generated(&arena, ids[0], SC0, &[LC, -PI], true, Some(1)), Some(-1));
        assert_eq!(match_generated(&arena, ids[0], SC0, &[LC, -PI], false, Some(1)), None);
        assert_eq!(match_generated(&arena, ids[1], LC, &[P, -K, PI], true, Some(2)), Some(-1));
        assert_eq!(match_generated(&arena, ids[1], LC, &[P, -K, PI], true, Some(1)), None);
        assert_eq!(match_generated(&arena, ids[1], LC, &[], true, None), Some(-1));
        assert_eq!(match_generated(&arena, ParticleId(99), LC, &[], true, None), None);
    }
}
