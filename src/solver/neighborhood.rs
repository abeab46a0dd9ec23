//! Random placements and single-session perturbation.
//!
//! A neighbour differs from its source in exactly one session, in one of
//! three ways chosen uniformly: a new time slot, a new venue of the same
//! mode, or the other delivery mode (with a venue usable in it).

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::{DeliveryMode, Placement, ScheduleSolution};

use super::SearchSpace;

/// What a single-session mutation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Move to another slot of the same length.
    Slot,
    /// Move to another venue usable in the current mode.
    Venue,
    /// Switch delivery mode.
    Mode,
}

const MUTATION_KINDS: [MutationKind; 3] = [MutationKind::Slot, MutationKind::Venue, MutationKind::Mode];

/// Mode a fresh placement starts from: the requested one when usable.
fn initial_mode(space: &SearchSpace, i: usize) -> DeliveryMode {
    let requested = space.sessions()[i].mode;
    if space.domain(i).allows(requested) {
        requested
    } else {
        requested.flipped()
    }
}

/// A uniformly random placement of session `i` in its requested mode.
pub fn random_placement<R: Rng>(space: &SearchSpace, i: usize, rng: &mut R) -> Placement {
    let domain = space.domain(i);
    let mode = initial_mode(space, i);
    let slot = domain.slots.choose(rng).copied().unwrap_or_default();
    let venue = domain.venues_for(mode).choose(rng).copied().unwrap_or_default();
    Placement::new(slot, venue, mode)
}

/// A complete random solution (not yet evaluated).
pub fn random_solution<R: Rng>(space: &SearchSpace, rng: &mut R) -> ScheduleSolution {
    let placements = (0..space.len())
        .map(|i| random_placement(space, i, rng))
        .collect();
    ScheduleSolution::new(placements)
}

/// Applies one `kind` change to session `i`.
///
/// A mode switch to a mode without usable venues leaves the placement
/// unchanged.
pub fn apply<R: Rng>(
    space: &SearchSpace,
    placements: &mut [Placement],
    i: usize,
    kind: MutationKind,
    rng: &mut R,
) {
    let domain = space.domain(i);
    let current = placements[i];
    let next = match kind {
        MutationKind::Slot => domain
            .slots
            .choose(rng)
            .map(|&slot| Placement { slot, ..current }),
        MutationKind::Venue => domain
            .venues_for(current.mode)
            .choose(rng)
            .map(|&venue| Placement { venue, ..current }),
        MutationKind::Mode => {
            let mode = current.mode.flipped();
            domain
                .venues_for(mode)
                .choose(rng)
                .map(|&venue| Placement { venue, mode, ..current })
        }
    };
    if let Some(p) = next {
        placements[i] = p;
    }
}

/// Mutates one random session in one random way. Returns what changed.
pub fn mutate<R: Rng>(
    space: &SearchSpace,
    placements: &mut [Placement],
    rng: &mut R,
) -> Option<(usize, MutationKind)> {
    if placements.is_empty() {
        return None;
    }
    let i = rng.random_range(0..placements.len());
    let kind = *MUTATION_KINDS.choose(rng)?;
    apply(space, placements, i, kind, rng);
    Some((i, kind))
}
