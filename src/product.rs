//! Synchronous product and subset construction.
//!
//! Both constructions are on-the-fly explorations over *handle keys* of the
//! operands: `(StateId, StateId)` for a product state, a sorted
//! `Vec<StateId>` for a power-set state. Keys are interned in discovery
//! order, renumbered into canonical order when the search is done, and only
//! then mapped to structural states.

use std::hash::Hash;

use log::debug;

use crate::lts::Lts;
use crate::search::GraphSearch;
use crate::table::{Interner, StateTable};
use crate::types::{State, StateId, Symbol, SymbolId, Transition};

/// Which part of a derived state space to build.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Construction {
    /// Only the states reachable from the initial states.
    #[default]
    Reachable,
    /// Every state of the construction, reachable or not.
    Full,
}

/// A state space explored over handle keys, in canonical order.
pub(crate) struct Explored<K> {
    /// Keys in canonical order; `keys[i]` is the key of `StateId(i)`.
    pub(crate) keys: Vec<K>,
    pub(crate) initial: Vec<StateId>,
    pub(crate) transitions: Vec<Transition>,
}

impl<K: Clone + Eq + Hash + Ord> Explored<K> {
    /// Renumbers a discovery-order exploration into canonical order.
    pub(crate) fn from_interner(interner: Interner<K>, initial: Vec<StateId>, edges: Vec<Transition>) -> Self {
        let (keys, remap) = interner.into_canonical();
        let initial = initial.into_iter().map(|s| remap[s.index()]).collect();
        let transitions = edges
            .into_iter()
            .map(|t| Transition::new(remap[t.source.index()], t.symbol, remap[t.target.index()]))
            .collect();
        Self {
            keys,
            initial,
            transitions,
        }
    }

    /// Explores from `initial` keys, or every key of `universe` when one is given.
    ///
    /// `step` yields the labelled successors of a key.
    pub(crate) fn explore<F>(initial: Vec<K>, universe: Option<Vec<K>>, mut step: F) -> Self
    where
        F: FnMut(&K) -> Vec<(SymbolId, K)>,
    {
        let mut interner = Interner::new();
        let mut edges = Vec::new();

        let initial_ids: Vec<StateId> = initial.iter().map(|k| interner.intern(k.clone()).0).collect();

        match universe {
            Some(universe) => {
                for key in &universe {
                    interner.intern(key.clone());
                }
                for key in &universe {
                    let (source, _) = interner.intern(key.clone());
                    for (symbol, target) in step(key) {
                        let (target, _) = interner.intern(target);
                        edges.push(Transition::new(source, symbol, target));
                    }
                }
            }
            None => {
                let mut successors = |key: &K| {
                    let (source, _) = interner.intern(key.clone());
                    let mut next = Vec::new();
                    for (symbol, target) in step(key) {
                        let (target_id, _) = interner.intern(target.clone());
                        edges.push(Transition::new(source, symbol, target_id));
                        next.push(target);
                    }
                    next
                };
                let mut search = GraphSearch::bfs(initial);
                search.run(&mut successors);
            }
        }

        Self::from_interner(interner, initial_ids, edges)
    }

    /// Materialises structural states and assembles the LTS.
    ///
    /// `value` must be monotone: key order has to match the order of the
    /// structural states it produces.
    pub(crate) fn to_lts<S2: State, A: Symbol>(&self, alphabet: Vec<A>, value: impl FnMut(&K) -> S2) -> Lts<S2, A> {
        let states = StateTable::from_sorted(self.keys.iter().map(value).collect());
        Lts::from_parts(states, self.initial.clone(), alphabet, self.transitions.clone())
    }
}

impl<S: State, A: Symbol> Lts<S, A> {
    /// Synchronous product.
    ///
    /// Transitions synchronise on shared symbols: `(s, a, s')` in `self` and
    /// `(t, a, t')` in `other` give `((s, t), a, (s', t'))`. The result keeps
    /// the alphabet of `self`; symbols absent from `other` never fire.
    pub fn product<T: State>(&self, other: &Lts<T, A>, construction: Construction) -> Lts<(S, T), A> {
        let explored = self.product_keys(other, construction);
        explored.to_lts(self.alphabet().to_vec(), |&(s, t)| (self.state(s).clone(), other.state(t).clone()))
    }

    pub(crate) fn product_keys<T: State>(
        &self,
        other: &Lts<T, A>,
        construction: Construction,
    ) -> Explored<(StateId, StateId)> {
        debug!(
            "product(|S1| = {}, |S2| = {}, {:?})",
            self.num_states(),
            other.num_states(),
            construction
        );

        // Symbol of `self` -> symbol of `other`.
        let shared: Vec<Option<SymbolId>> = self.alphabet().iter().map(|a| other.symbol_id(a)).collect();

        let initial: Vec<(StateId, StateId)> = self
            .initial_ids()
            .iter()
            .flat_map(|&s| other.initial_ids().iter().map(move |&t| (s, t)))
            .collect();

        let universe = match construction {
            Construction::Reachable => None,
            Construction::Full => Some(
                self.state_table()
                    .ids()
                    .flat_map(|s| other.state_table().ids().map(move |t| (s, t)))
                    .collect(),
            ),
        };

        let explored = Explored::explore(initial, universe, |&(s, t)| {
            let mut next = Vec::new();
            for ta in self.outgoing(s) {
                let Some(b) = shared[ta.symbol.index()] else {
                    continue;
                };
                for target in other.successors(t, b) {
                    next.push((ta.symbol, (ta.target, target)));
                }
            }
            next
        });

        debug!(
            "product: {} states, {} transitions",
            explored.keys.len(),
            explored.transitions.len()
        );
        explored
    }

    /// Subset construction.
    ///
    /// Power-set states are sorted `Vec<S>` (the empty set included). The
    /// result is complete and deterministic, with the single initial state
    /// `I` viewed as a set.
    ///
    /// [`Construction::Full`] enumerates all `2^|S|` subsets.
    ///
    /// # Panics
    ///
    /// Panics with [`Construction::Full`] if `|S|` is at least the bit width
    /// of `usize` (64 on most targets).
    pub fn power(&self, construction: Construction) -> Lts<Vec<S>, A> {
        let explored = self.power_keys(construction);
        explored.to_lts(self.alphabet().to_vec(), |set| {
            set.iter().map(|&s| self.state(s).clone()).collect()
        })
    }

    pub(crate) fn power_keys(&self, construction: Construction) -> Explored<Vec<StateId>> {
        debug!("power(|S| = {}, {:?})", self.num_states(), construction);

        let universe = match construction {
            Construction::Reachable => None,
            Construction::Full => Some(subsets(self.num_states())),
        };

        let num_symbols = self.alphabet().len();
        let explored = Explored::explore(vec![self.initial_ids().to_vec()], universe, |set| {
            (0..num_symbols)
                .map(|a| {
                    let a = SymbolId::new(a);
                    let mut target: Vec<StateId> = set.iter().flat_map(|&s| self.successors(s, a)).collect();
                    target.sort();
                    target.dedup();
                    (a, target)
                })
                .collect()
        });

        debug!(
            "power: {} states, {} transitions",
            explored.keys.len(),
            explored.transitions.len()
        );
        explored
    }
}

/// All subsets of `0..n` as sorted handle vectors.
fn subsets(n: usize) -> Vec<Vec<StateId>> {
    assert!(n < usize::BITS as usize, "too many states for a full power construction");
    (0..1usize << n)
        .map(|mask| (0..n).filter(|&i| mask & (1 << i) != 0).map(StateId::new).collect())
        .collect()
}
