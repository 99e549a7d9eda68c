//! Strong and weak simulation and bisimulation.
//!
//! Both relations are greatest fixpoints computed by refinement: start from
//! a seed relation and repeatedly drop every pair that violates the transfer
//! condition against the *current* relation, until a pass removes nothing.
//!
//! Moves are matched by symbol value, so the two systems may use different
//! alphabets. Symbols listed in `tau` are internal: a weak `a`-move from `s`
//! to `u` is a path of `tau` steps followed by exactly one `a` step that
//! arrives at `u` for the first time. The internal prefix may not pass
//! through `u`, so `s -tau-> u -a-> u` is not a weak `a`-move from `s`.
//!
//! # Example
//!
//! ```
//! use lts_rs::lts::Lts;
//!
//! let spec = Lts::new([1, 2], [1], ["p", "d"], [(1, "p", 2), (2, "d", 1)]).unwrap();
//! let imp = Lts::new([3, 4], [3], ["p", "d"], [(3, "p", 4)]).unwrap();
//!
//! assert!(spec.simulates(&imp, &[]));
//! assert!(!imp.simulates(&spec, &[]));
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use log::debug;

use crate::bitset::BitSet;
use crate::lts::Lts;
use crate::search::GraphSearch;
use crate::types::{State, StateId, Symbol};

/// A binary relation between the states of two systems.
pub type Relation<S, T> = HashSet<(S, T)>;

/// Swaps every pair of a relation.
pub fn invert<S, T>(relation: &Relation<S, T>) -> Relation<T, S>
where
    S: Clone + Eq + Hash,
    T: Clone + Eq + Hash,
{
    relation.iter().map(|(s, t)| (t.clone(), s.clone())).collect()
}

/// The full relation `S_A × S_B`.
pub fn full_relation<S: State, T: State, A>(a: &Lts<S, A>, b: &Lts<T, A>) -> Relation<S, T> {
    a.states()
        .iter()
        .flat_map(|s| b.states().iter().map(move |t| (s.clone(), t.clone())))
        .collect()
}

/// Greatest simulation of `a` by `b` contained in `seed`.
///
/// A pair `(s, t)` survives iff every visible move `s =x=> s'` of `a` is
/// matched by some move `t =x=> t'` of `b` with `(s', t')` in the relation.
/// Pairs of `seed` naming unknown states are ignored.
pub fn maximum_simulation<S, T, A>(a: &Lts<S, A>, b: &Lts<T, A>, seed: &Relation<S, T>, tau: &[A]) -> Relation<S, T>
where
    S: State,
    T: State,
    A: Symbol,
{
    debug!(
        "maximum_simulation(|S1| = {}, |S2| = {}, |R0| = {}, |tau| = {})",
        a.num_states(),
        b.num_states(),
        seed.len(),
        tau.len()
    );
    let matrix = PairMatrix::from_relation(a, b, seed);
    let result = Solver::new(a, b, tau).simulation(matrix);
    result.to_relation(a, b)
}

/// Greatest bisimulation between `a` and `b` contained in `seed`.
///
/// Pairs are oriented as in `seed`: `(s, t)` with `s` in `a` and `t` in `b`.
/// A pair survives iff `b` simulates `s` from `t` *and* `a` simulates `t`
/// from `s`, both against the current relation.
pub fn maximum_bisimulation<S, T, A>(a: &Lts<S, A>, b: &Lts<T, A>, seed: &Relation<S, T>, tau: &[A]) -> Relation<S, T>
where
    S: State,
    T: State,
    A: Symbol,
{
    debug!(
        "maximum_bisimulation(|S1| = {}, |S2| = {}, |R0| = {}, |tau| = {})",
        a.num_states(),
        b.num_states(),
        seed.len(),
        tau.len()
    );
    let matrix = PairMatrix::from_relation(a, b, seed);
    let result = Solver::new(a, b, tau).bisimulation(matrix);
    result.to_relation(a, b)
}

impl<S: State, A: Symbol> Lts<S, A> {
    /// Returns true if `self` simulates `other`.
    ///
    /// Every initial state of `other` must be simulated by some initial state
    /// of `self`, under the maximum simulation of `other` by `self`.
    pub fn simulates<T: State>(&self, other: &Lts<T, A>, tau: &[A]) -> bool {
        let relation = Solver::new(other, self, tau).simulation(PairMatrix::full(other.num_states(), self.num_states()));
        covers_initial(&relation, other, self)
    }

    /// Returns true if `self` and `other` are bisimilar from their initial states.
    pub fn bisimulates<T: State>(&self, other: &Lts<T, A>, tau: &[A]) -> bool {
        let relation = Solver::new(other, self, tau).bisimulation(PairMatrix::full(other.num_states(), self.num_states()));
        covers_initial(&relation, other, self)
    }
}

fn covers_initial<S, T, A>(relation: &PairMatrix, simulated: &Lts<S, A>, simulator: &Lts<T, A>) -> bool {
    simulated
        .initial_ids()
        .iter()
        .all(|&s| simulator.initial_ids().iter().any(|&t| relation.contains(s, t)))
}

/// A relation over handles, as a dense `rows × cols` bit matrix.
#[derive(Clone)]
pub(crate) struct PairMatrix {
    cols: usize,
    bits: BitSet,
}

impl PairMatrix {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            bits: BitSet::new(rows * cols),
        }
    }

    pub(crate) fn full(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            bits: BitSet::full(rows * cols),
        }
    }

    fn from_relation<S: State, T: State, A>(a: &Lts<S, A>, b: &Lts<T, A>, relation: &Relation<S, T>) -> Self {
        let mut matrix = Self::new(a.num_states(), b.num_states());
        for (s, t) in relation {
            if let (Some(s), Some(t)) = (a.state_table().lookup(s), b.state_table().lookup(t)) {
                matrix.insert(s, t);
            }
        }
        matrix
    }

    fn to_relation<S: State, T: State, A>(&self, a: &Lts<S, A>, b: &Lts<T, A>) -> Relation<S, T> {
        self.pairs()
            .map(|(s, t)| (a.state(s).clone(), b.state(t).clone()))
            .collect()
    }

    pub(crate) fn contains(&self, s: StateId, t: StateId) -> bool {
        self.bits.contains(s.index() * self.cols + t.index())
    }

    pub(crate) fn insert(&mut self, s: StateId, t: StateId) -> bool {
        self.bits.insert(s.index() * self.cols + t.index())
    }

    fn remove(&mut self, s: StateId, t: StateId) -> bool {
        self.bits.remove(s.index() * self.cols + t.index())
    }

    pub(crate) fn len(&self) -> usize {
        self.bits.len()
    }

    /// All pairs, in row-major order.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.bits
            .iter()
            .map(|i| (StateId::new(i / self.cols), StateId::new(i % self.cols)))
    }
}

/// Visible moves of every state, with symbols renumbered into an alphabet
/// shared by both systems.
type Moves = Vec<Vec<(usize, StateId)>>;

/// Refinement engine for one ordered pair of systems.
pub(crate) struct Solver {
    left: Moves,
    right: Moves,
}

impl Solver {
    pub(crate) fn new<S, T, A: Symbol>(a: &Lts<S, A>, b: &Lts<T, A>, tau: &[A]) -> Self {
        let mut merged: Vec<A> = a.alphabet().iter().chain(b.alphabet()).cloned().collect();
        merged.sort();
        merged.dedup();
        Self {
            left: weak_moves(a, &merged, tau),
            right: weak_moves(b, &merged, tau),
        }
    }

    /// Refines `relation` into the greatest simulation of left by right it contains.
    pub(crate) fn simulation(&self, relation: PairMatrix) -> PairMatrix {
        self.refine("simulation", relation, |r, s, t| {
            matches(&self.left[s.index()], &self.right[t.index()], |s2, t2| r.contains(s2, t2))
        })
    }

    /// Refines `relation` into the greatest bisimulation it contains.
    pub(crate) fn bisimulation(&self, relation: PairMatrix) -> PairMatrix {
        self.refine("bisimulation", relation, |r, s, t| {
            matches(&self.left[s.index()], &self.right[t.index()], |s2, t2| r.contains(s2, t2))
                && matches(&self.right[t.index()], &self.left[s.index()], |t2, s2| r.contains(s2, t2))
        })
    }

    fn refine<F>(&self, name: &str, mut relation: PairMatrix, keep: F) -> PairMatrix
    where
        F: Fn(&PairMatrix, StateId, StateId) -> bool,
    {
        let mut pass = 0;
        loop {
            pass += 1;
            let violating: Vec<(StateId, StateId)> = relation.pairs().filter(|&(s, t)| !keep(&relation, s, t)).collect();
            debug!("{}: pass {} removed {} of {} pairs", name, pass, violating.len(), relation.len());
            if violating.is_empty() {
                return relation;
            }
            for (s, t) in violating {
                relation.remove(s, t);
            }
        }
    }
}

/// Returns true if every move of `moves` is matched by a move of `by` on the
/// same symbol whose targets are related.
fn matches<F>(moves: &[(usize, StateId)], by: &[(usize, StateId)], related: F) -> bool
where
    F: Fn(StateId, StateId) -> bool,
{
    moves
        .iter()
        .all(|&(x, s2)| by.iter().any(|&(y, t2)| x == y && related(s2, t2)))
}

/// For every state: its weak moves, as `(merged symbol, target)` pairs.
///
/// With an empty `tau` these are exactly the direct transitions.
fn weak_moves<S, A: Symbol>(lts: &Lts<S, A>, merged: &[A], tau: &[A]) -> Moves {
    let internal: Vec<bool> = lts.alphabet().iter().map(|a| tau.contains(a)).collect();
    // Symbol of `lts` -> index in the merged alphabet.
    let global: Vec<usize> = lts.alphabet().iter().map(|a| merged.partition_point(|m| m < a)).collect();

    (0..lts.num_states())
        .map(|s| {
            let s = StateId::new(s);
            let closure = silent_reach(lts, &internal, s, None);

            // (target, symbol, last internal state), grouped by target.
            let mut candidates: Vec<(StateId, usize, StateId)> = Vec::new();
            for x in closure.states() {
                for t in lts.outgoing(x) {
                    if !internal[t.symbol.index()] {
                        candidates.push((t.target, global[t.symbol.index()], x));
                    }
                }
            }
            candidates.sort();

            // A target that the internal prefix could pass through needs the
            // prefix recomputed with the target excluded.
            let mut restricted: Option<(StateId, BitSet)> = None;
            let mut moves = Vec::new();
            for (u, a, x) in candidates {
                let valid = if u != s && !closure.contains_state(u) {
                    true
                } else {
                    if restricted.as_ref().map(|(v, _)| *v) != Some(u) {
                        restricted = Some((u, silent_reach(lts, &internal, s, Some(u))));
                    }
                    restricted.as_ref().is_some_and(|(_, reach)| reach.contains_state(x))
                };
                if valid {
                    moves.push((a, u));
                }
            }
            moves.sort();
            moves.dedup();
            moves
        })
        .collect()
}

/// States reachable from `s` by internal steps that never enter `avoid`.
fn silent_reach<S, A>(lts: &Lts<S, A>, internal: &[bool], s: StateId, avoid: Option<StateId>) -> BitSet {
    let mut silent = |u: &StateId| {
        lts.outgoing(*u)
            .iter()
            .filter(|t| internal[t.symbol.index()] && Some(t.target) != avoid)
            .map(|t| t.target)
            .collect::<Vec<_>>()
    };
    let mut search = GraphSearch::dfs([s]);
    search.run(&mut silent);
    search.into_deduper().into_seen().into_iter().collect()
}
