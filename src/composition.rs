//! Asynchronous composition of labelled transition systems.
//!
//! Components run interleaved and synchronise on shared symbols: a symbol
//! fires globally only when every component whose alphabet contains it can
//! take it together. The reachable global state space is explored on the
//! fly, depth-first, optionally with partial-order reduction.
//!
//! # Partial-order reduction
//!
//! At a global state, a component is *local* if it can move and all of its
//! moves use symbols private to it. A [`Reduction`] picks which local
//! components to expand; the moves of the others are deferred. If a partial
//! expansion would reach a state that was already discovered, the state is
//! expanded fully instead. Every cycle of the result is closed by such an
//! edge, so each cycle contains a fully expanded state and no move is
//! postponed forever.
//!
//! ```
//! use lts_rs::composition::{interleave, interleave_reduced};
//! use lts_rs::lts::Lts;
//!
//! let a = Lts::new([1, 2], [1], ['a', 's'], [(1, 'a', 2), (2, 's', 1)]).unwrap();
//! let b = Lts::new([3, 4], [3], ['b', 's'], [(3, 'b', 4), (4, 's', 3)]).unwrap();
//!
//! let full = interleave(&[&a, &b]).unwrap();
//! assert_eq!(full.num_states(), 4);
//!
//! let reduced = interleave_reduced(&[&a, &b], &|local: &[usize]| vec![local[local.len() - 1]]).unwrap();
//! assert_eq!(reduced.num_states(), 3);
//! ```

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::lts::Lts;
use crate::product::Explored;
use crate::search::GraphSearch;
use crate::table::Interner;
use crate::types::{State, StateId, Symbol, SymbolId, Transition};

/// Chooses which local components to expand at a global state.
///
/// `local` lists the indices of the components whose moves are all private,
/// in increasing order. Indices outside `local` are ignored; an empty choice
/// expands the state fully.
pub trait Reduction {
    fn select(&self, local: &[usize]) -> Vec<usize>;
}

impl<F> Reduction for F
where
    F: Fn(&[usize]) -> Vec<usize>,
{
    fn select(&self, local: &[usize]) -> Vec<usize> {
        self(local)
    }
}

/// Full interleaving of `components`.
pub fn interleave<S: State, A: Symbol>(components: &[&Lts<S, A>]) -> Result<Lts<Vec<S>, A>> {
    Composition::new(components)?.explore(None)
}

/// Interleaving of `components` with partial-order reduction.
pub fn interleave_reduced<S, A, R>(components: &[&Lts<S, A>], reduction: &R) -> Result<Lts<Vec<S>, A>>
where
    S: State,
    A: Symbol,
    R: Reduction,
{
    Composition::new(components)?.explore(Some(reduction as &dyn Reduction))
}

struct Composition<'a, S, A> {
    components: &'a [&'a Lts<S, A>],
    /// Union of the component alphabets, sorted.
    alphabet: Vec<A>,
    /// `local_symbol[i][a]`: the symbol of component `i` for global symbol `a`.
    local_symbol: Vec<Vec<Option<SymbolId>>>,
    /// `psi[a]`: the components whose alphabet contains `a`.
    psi: Vec<Vec<usize>>,
}

impl<'a, S: State, A: Symbol> Composition<'a, S, A> {
    fn new(components: &'a [&'a Lts<S, A>]) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::NoComponents);
        }

        let mut alphabet: Vec<A> = components.iter().flat_map(|c| c.alphabet().iter().cloned()).collect();
        alphabet.sort();
        alphabet.dedup();

        let local_symbol: Vec<Vec<Option<SymbolId>>> = components
            .iter()
            .map(|c| alphabet.iter().map(|a| c.symbol_id(a)).collect())
            .collect();

        let psi = (0..alphabet.len())
            .map(|a| (0..components.len()).filter(|&i| local_symbol[i][a].is_some()).collect())
            .collect();

        Ok(Self {
            components,
            alphabet,
            local_symbol,
            psi,
        })
    }

    fn global_symbol(&self, component: usize, symbol: SymbolId) -> usize {
        let a = self.components[component].symbol(symbol);
        self.alphabet.partition_point(|b| b < a)
    }

    fn is_private(&self, component: usize, symbol: SymbolId) -> bool {
        self.psi[self.global_symbol(component, symbol)].len() == 1
    }

    /// Components that can move from `key` using private symbols only.
    fn local_components(&self, key: &[StateId]) -> Vec<usize> {
        (0..self.components.len())
            .filter(|&i| {
                let out = self.components[i].outgoing(key[i]);
                !out.is_empty() && out.iter().all(|t| self.is_private(i, t.symbol))
            })
            .collect()
    }

    /// All moves of the chosen components, which are private by construction.
    fn partial_expansion(&self, key: &[StateId], chosen: &[usize]) -> Vec<(usize, Vec<StateId>)> {
        let mut moves = Vec::new();
        for &i in chosen {
            for t in self.components[i].outgoing(key[i]) {
                let mut target = key.to_vec();
                target[i] = t.target;
                moves.push((self.global_symbol(i, t.symbol), target));
            }
        }
        moves
    }

    fn full_expansion(&self, key: &[StateId]) -> Vec<(usize, Vec<StateId>)> {
        let mut moves = Vec::new();
        for (a, participants) in self.psi.iter().enumerate() {
            // Cartesian product over the participants' a-successors.
            let mut targets = vec![key.to_vec()];
            for &i in participants {
                let Some(local) = self.local_symbol[i][a] else {
                    continue;
                };
                let next: Vec<StateId> = self.components[i].successors(key[i], local).collect();
                targets = targets
                    .iter()
                    .flat_map(|partial| {
                        next.iter().map(move |&s| {
                            let mut target = partial.clone();
                            target[i] = s;
                            target
                        })
                    })
                    .collect();
            }
            moves.extend(targets.into_iter().map(|target| (a, target)));
        }
        moves
    }

    fn explore(&self, reduction: Option<&dyn Reduction>) -> Result<Lts<Vec<S>, A>> {
        debug!(
            "interleave({} components, |Σ| = {}, reduction = {})",
            self.components.len(),
            self.alphabet.len(),
            reduction.is_some()
        );

        let mut interner: Interner<Vec<StateId>> = Interner::new();
        let mut edges: Vec<Transition> = Vec::new();

        let initial = self.initial_keys();
        let initial_ids: Vec<StateId> = initial.iter().map(|key| interner.intern(key.clone()).0).collect();

        let mut successors = |key: &Vec<StateId>| {
            let (source, _) = interner.intern(key.clone());

            let mut expansion = match reduction {
                Some(reduction) => {
                    self.reduced_expansion(key, reduction, |target| interner.lookup(target).is_some())
                }
                None => self.full_expansion(key),
            };
            expansion.sort();

            let mut next = Vec::with_capacity(expansion.len());
            for (a, target) in expansion {
                let (target_id, _) = interner.intern(target.clone());
                edges.push(Transition::new(source, SymbolId::new(a), target_id));
                next.push(target);
            }
            next
        };

        let mut search = GraphSearch::dfs(initial);
        search.run(&mut successors);

        let explored = Explored::from_interner(interner, initial_ids, edges);
        debug!(
            "interleave: {} states, {} transitions",
            explored.keys.len(),
            explored.transitions.len()
        );

        Ok(explored.to_lts(self.alphabet.clone(), |key| {
            key.iter()
                .enumerate()
                .map(|(i, &s)| self.components[i].state(s).clone())
                .collect()
        }))
    }

    /// Partial expansion when some local component is chosen and none of its
    /// targets is `visited` yet; full expansion otherwise.
    fn reduced_expansion<P>(&self, key: &[StateId], reduction: &dyn Reduction, visited: P) -> Vec<(usize, Vec<StateId>)>
    where
        P: Fn(&Vec<StateId>) -> bool,
    {
        let local = self.local_components(key);
        if local.is_empty() {
            return self.full_expansion(key);
        }

        let mut chosen: Vec<usize> = reduction.select(&local).into_iter().filter(|i| local.contains(i)).collect();
        chosen.sort();
        chosen.dedup();
        if chosen.is_empty() {
            trace!("reduction chose nothing among {:?}, expanding fully", local);
            return self.full_expansion(key);
        }

        let partial = self.partial_expansion(key, &chosen);
        if partial.iter().any(|(_, target)| visited(target)) {
            trace!("partial expansion of {:?} reaches a visited state, expanding fully", chosen);
            return self.full_expansion(key);
        }
        trace!("expanding {:?} of local {:?}", chosen, local);
        partial
    }

    /// Cross product of the component initial states, in canonical order.
    fn initial_keys(&self) -> Vec<Vec<StateId>> {
        let mut keys = vec![Vec::new()];
        for c in self.components {
            keys = keys
                .iter()
                .flat_map(|prefix: &Vec<StateId>| {
                    c.initial_ids().iter().map(move |&s| {
                        let mut key = prefix.clone();
                        key.push(s);
                        key
                    })
                })
                .collect();
        }
        keys
    }
}
