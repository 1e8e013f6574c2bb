//! Mutation operators on assignments.
//!
//! Each operator edits a copy of the parent and never duplicates a customer:
//! swaps and reversals permute within one route, relocation moves a single
//! customer to a random slot of any vehicle in the fleet, idle ones included.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Route};

/// The available mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    /// Exchange two stops of one route.
    Swap,
    /// Move one customer to a random slot of a random vehicle's route.
    Relocate,
    /// Reverse a contiguous stretch of one route.
    SegmentReversal,
}

type MutationFn = fn(&mut Assignment, usize, &mut StdRng) -> bool;

const MUTATIONS: [(Mutation, MutationFn); 3] = [
    (Mutation::Swap, swap::<StdRng>),
    (Mutation::Relocate, relocate::<StdRng>),
    (Mutation::SegmentReversal, reverse_segment::<StdRng>),
];

impl Mutation {
    /// All mutation kinds.
    pub const ALL: [Mutation; 3] = [Mutation::Swap, Mutation::Relocate, Mutation::SegmentReversal];

    /// Picks a kind uniformly at random.
    pub fn random(rng: &mut StdRng) -> Self {
        MUTATIONS[rng.random_range(0..MUTATIONS.len())].0
    }

    fn operator(self) -> MutationFn {
        MUTATIONS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(swap::<StdRng>, |(_, op)| *op)
    }

    /// Applies this mutation to a copy of `assignment` for a fleet of
    /// `num_vehicles` vehicles.
    ///
    /// The copy is returned unchanged when no route qualifies (for example a
    /// swap when every route has fewer than two stops). Forced-placement tags
    /// are dropped from a changed copy, since its routes are re-scored from
    /// scratch.
    ///
    /// # Examples
    ///
    /// ```
    /// use ev_routing::ga::Mutation;
    /// use ev_routing::models::{Assignment, Route};
    /// use rand::SeedableRng;
    ///
    /// let parent = Assignment::new(vec![Route::new(0, vec![1, 2, 3])], 3, 1).unwrap();
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let child = Mutation::Swap.apply(&parent, 1, &mut rng);
    /// assert_ne!(child.routes()[0].customers(), parent.routes()[0].customers());
    /// assert!(child.validate(3, 1).is_ok());
    /// ```
    pub fn apply(self, assignment: &Assignment, num_vehicles: usize, rng: &mut StdRng) -> Assignment {
        let mut child = assignment.clone();
        if (self.operator())(&mut child, num_vehicles, rng) {
            child.clear_forced();
            child.normalize();
        }
        child
    }
}

/// Applies one uniformly chosen mutation. Returns the kind and the child.
pub fn mutate(
    assignment: &Assignment,
    num_vehicles: usize,
    rng: &mut StdRng,
) -> (Mutation, Assignment) {
    let kind = Mutation::random(rng);
    (kind, kind.apply(assignment, num_vehicles, rng))
}

/// Indices of routes with more than `min_exclusive` stops.
fn routes_longer_than(assignment: &Assignment, min_exclusive: usize) -> Vec<usize> {
    assignment
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.len() > min_exclusive)
        .map(|(i, _)| i)
        .collect()
}

fn swap<R: Rng>(assignment: &mut Assignment, _num_vehicles: usize, rng: &mut R) -> bool {
    let eligible = routes_longer_than(assignment, 1);
    if eligible.is_empty() {
        return false;
    }
    let ri = eligible[rng.random_range(0..eligible.len())];
    let route = assignment.routes_mut()[ri].customers_mut();
    let len = route.len();
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    route.swap(i, j);
    true
}

/// The target is drawn from the whole fleet; an idle vehicle gets a new
/// route holding just the moved customer.
fn relocate<R: Rng>(assignment: &mut Assignment, num_vehicles: usize, rng: &mut R) -> bool {
    let eligible = routes_longer_than(assignment, 0);
    if eligible.is_empty() {
        return false;
    }
    let from = eligible[rng.random_range(0..eligible.len())];
    let source = assignment.routes_mut()[from].customers_mut();
    let customer = source.remove(rng.random_range(0..source.len()));

    let fleet = assignment
        .routes()
        .iter()
        .map(|r| r.vehicle() + 1)
        .fold(num_vehicles, usize::max);
    let vehicle = rng.random_range(0..fleet);
    let routes = assignment.routes_mut();
    match routes.iter_mut().find(|r| r.vehicle() == vehicle) {
        Some(target) => {
            let target = target.customers_mut();
            let position = rng.random_range(0..=target.len());
            target.insert(position, customer);
        }
        None => routes.push(Route::new(vehicle, vec![customer])),
    }
    true
}

fn reverse_segment<R: Rng>(assignment: &mut Assignment, _num_vehicles: usize, rng: &mut R) -> bool {
    let eligible = routes_longer_than(assignment, 3);
    if eligible.is_empty() {
        return false;
    }
    let ri = eligible[rng.random_range(0..eligible.len())];
    let route = assignment.routes_mut()[ri].customers_mut();
    let len = route.len();
    let start = rng.random_range(0..len - 1);
    let end = rng.random_range(start + 1..len);
    route[start..=end].reverse();
    true
}
