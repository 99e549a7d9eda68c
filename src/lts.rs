//! Labelled transition systems.
//!
//! An [`Lts`] is an immutable value `(S, I, Σ, T)`: a sorted sequence of
//! states, a set of initial states, a sorted alphabet and a sorted set of
//! transitions. Structural states and symbols are interned once at
//! construction; every algorithm then works on [`StateId`] / [`SymbolId`]
//! handles.
//!
//! # Example
//!
//! ```
//! use lts_rs::lts::Lts;
//!
//! let lts = Lts::new(
//!     [1, 2, 3],
//!     [1],
//!     ['a', 'b'],
//!     [(1, 'a', 2), (1, 'b', 2), (2, 'a', 2), (2, 'b', 3)],
//! )
//! .unwrap();
//!
//! assert_eq!(lts.num_states(), 3);
//! assert!(!lts.is_deterministic());
//! assert_eq!(lts.trace(&3).len(), 2);
//! ```

use std::fmt;

use log::debug;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::search::{Explorable, GraphSearch, NoDedup, Order};
use crate::table::StateTable;
use crate::types::{State, StateId, Symbol, SymbolId, Transition};

/// A path of transitions, given by structural values.
pub type Trace<S, A> = Vec<(S, A, S)>;

/// Labelled transition system `(S, I, Σ, T)`.
#[derive(Debug, Clone)]
pub struct Lts<S, A> {
    states: StateTable<S>,
    initial: Vec<StateId>,
    alphabet: Vec<A>,
    transitions: Vec<Transition>,
    /// `offsets[s]..offsets[s + 1]` is the outgoing slice of state `s` in `transitions`.
    offsets: Vec<usize>,
}

impl<S: State, A: Symbol> Lts<S, A> {
    /// Builds an LTS from explicit sequences.
    ///
    /// States, initial states, symbols and transitions are de-duplicated and
    /// sorted. Fails if an initial state or transition endpoint is not in
    /// `states`, or a transition label is not in `alphabet`.
    pub fn new(
        states: impl IntoIterator<Item = S>,
        initial: impl IntoIterator<Item = S>,
        alphabet: impl IntoIterator<Item = A>,
        transitions: impl IntoIterator<Item = (S, A, S)>,
    ) -> Result<Self> {
        let states = StateTable::from_values(states);

        let mut alphabet: Vec<A> = alphabet.into_iter().collect();
        alphabet.sort();
        alphabet.dedup();

        let initial = initial
            .into_iter()
            .map(|s| lookup_state(&states, &s))
            .collect::<Result<Vec<_>>>()?;

        let transitions = transitions
            .into_iter()
            .map(|(s, a, t)| {
                Ok(Transition::new(
                    lookup_state(&states, &s)?,
                    lookup_symbol(&alphabet, &a)?,
                    lookup_state(&states, &t)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_parts(states, initial, alphabet, transitions))
    }
}

impl<S, A> Lts<S, A> {
    /// Assembles an LTS from already-interned parts.
    ///
    /// `alphabet` must be sorted and unique, and every handle must be valid
    /// for `states`. Initial states and transitions are sorted here.
    pub(crate) fn from_parts(
        states: StateTable<S>,
        mut initial: Vec<StateId>,
        alphabet: Vec<A>,
        mut transitions: Vec<Transition>,
    ) -> Self {
        initial.sort();
        initial.dedup();
        transitions.sort();
        transitions.dedup();

        let mut offsets = vec![0; states.len() + 1];
        for t in &transitions {
            offsets[t.source.index() + 1] += 1;
        }
        for i in 0..states.len() {
            offsets[i + 1] += offsets[i];
        }

        Self {
            states,
            initial,
            alphabet,
            transitions,
            offsets,
        }
    }

    /// All states in canonical (sorted) order.
    pub fn states(&self) -> &[S] {
        self.states.values()
    }

    /// Returns the structural state behind a handle.
    pub fn state(&self, id: StateId) -> &S {
        self.states.get(id)
    }

    pub(crate) fn state_table(&self) -> &StateTable<S> {
        &self.states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Initial states in canonical order.
    pub fn initial(&self) -> impl Iterator<Item = &S> + '_ {
        self.initial.iter().map(|&id| self.states.get(id))
    }

    pub fn initial_ids(&self) -> &[StateId] {
        &self.initial
    }

    /// The sorted alphabet.
    pub fn alphabet(&self) -> &[A] {
        &self.alphabet
    }

    pub fn symbol(&self, id: SymbolId) -> &A {
        &self.alphabet[id.index()]
    }

    /// Transitions in canonical `(source, symbol, target)` order.
    pub fn transitions(&self) -> impl Iterator<Item = (&S, &A, &S)> + '_ {
        self.transitions
            .iter()
            .map(|t| (self.states.get(t.source), &self.alphabet[t.symbol.index()], self.states.get(t.target)))
    }

    pub fn transition_ids(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Outgoing transitions of a state, sorted by symbol then target.
    pub fn outgoing(&self, source: StateId) -> &[Transition] {
        let i = source.index();
        &self.transitions[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Targets of `source --symbol-->`.
    pub fn successors(&self, source: StateId, symbol: SymbolId) -> impl Iterator<Item = StateId> + '_ {
        self.outgoing(source).iter().filter(move |t| t.symbol == symbol).map(|t| t.target)
    }

    /// Completeness: at least one initial state, and every state has at
    /// least one successor on every symbol.
    pub fn is_complete(&self) -> bool {
        !self.initial.is_empty()
            && self.states.ids().all(|s| {
                let out = self.outgoing(s);
                (0..self.alphabet.len()).all(|a| out.iter().any(|t| t.symbol.index() == a))
            })
    }

    /// Determinism: at most one initial state, and no state has two
    /// successors on the same symbol.
    pub fn is_deterministic(&self) -> bool {
        self.initial.len() <= 1
            && self
                .transitions
                .windows(2)
                .all(|w| w[0].source != w[1].source || w[0].symbol != w[1].symbol)
    }

    /// States reachable from the initial states (including them).
    pub(crate) fn reachable_ids(&self) -> BitSet {
        let mut successors = |s: &StateId| self.outgoing(*s).iter().map(|t| t.target).collect::<Vec<_>>();
        let mut search = GraphSearch::bfs(self.initial.iter().copied());
        search.run(&mut successors);
        search.into_deduper().into_seen().into_iter().collect()
    }

    /// States reachable from the initial states, in canonical order.
    pub fn reachable(&self) -> Vec<&S> {
        self.reachable_ids().states().map(|id| self.states.get(id)).collect()
    }
}

impl<S: State, A: Symbol> Lts<S, A> {
    /// Looks up the handle of a structural state.
    pub fn state_id(&self, state: &S) -> Option<StateId> {
        self.states.lookup(state)
    }

    /// Looks up the handle of a symbol.
    pub fn symbol_id(&self, symbol: &A) -> Option<SymbolId> {
        self.alphabet.binary_search(symbol).ok().map(SymbolId::new)
    }

    /// Resolves a transition handle to structural values.
    pub fn resolve(&self, t: &Transition) -> (S, A, S) {
        (
            self.states.get(t.source).clone(),
            self.alphabet[t.symbol.index()].clone(),
            self.states.get(t.target).clone(),
        )
    }

    /// All traces from the initial states to `target`.
    ///
    /// Returns an empty list if `target` is unknown or unreachable.
    pub fn trace(&self, target: &S) -> Vec<Trace<S, A>> {
        self.trace_ids(target, &self.initial)
    }

    /// All traces from the given `sources` to `target`.
    ///
    /// Sources that are not states of this LTS are ignored.
    pub fn trace_from(&self, target: &S, sources: &[S]) -> Vec<Trace<S, A>> {
        let sources: Vec<StateId> = sources.iter().filter_map(|s| self.states.lookup(s)).collect();
        self.trace_ids(target, &sources)
    }

    fn trace_ids(&self, target: &S, sources: &[StateId]) -> Vec<Trace<S, A>> {
        let Some(target) = self.states.lookup(target) else {
            return Vec::new();
        };
        self.traces(target, sources)
            .into_iter()
            .map(|trace| trace.iter().map(|t| self.resolve(t)).collect())
            .collect()
    }
}

impl<S, A> Lts<S, A> {
    /// Enumerates all traces from `sources` to `target` on handles.
    ///
    /// Depth-first over items carrying `(node, path, trace)`. A transition
    /// may not revisit a node already on the current path (the source node
    /// excepted), and a trace ends at its first arrival at `target`.
    pub(crate) fn traces(&self, target: StateId, sources: &[StateId]) -> Vec<Vec<Transition>> {
        let mut explorer = TraceSearch {
            lts: self,
            target,
            found: Vec::new(),
        };
        let frontier = sources.iter().map(|&s| TraceItem {
            node: s,
            path: vec![s],
            trace: Vec::new(),
        });
        let mut search = GraphSearch::with_deduper(Order::DepthFirst, frontier, NoDedup);
        search.run(&mut explorer);

        debug!("traces(target = {}): {} found", target, explorer.found.len());
        explorer.found
    }
}

struct TraceItem {
    node: StateId,
    path: Vec<StateId>,
    trace: Vec<Transition>,
}

struct TraceSearch<'a, S, A> {
    lts: &'a Lts<S, A>,
    target: StateId,
    found: Vec<Vec<Transition>>,
}

impl<S, A> Explorable<TraceItem> for TraceSearch<'_, S, A> {
    fn successors(&mut self, item: &TraceItem) -> Vec<TraceItem> {
        let mut next = Vec::new();
        for &t in self.lts.outgoing(item.node) {
            if item.path[1..].contains(&t.target) {
                continue;
            }
            let mut trace = item.trace.clone();
            trace.push(t);
            if t.target == self.target {
                self.found.push(trace);
            } else {
                let mut path = item.path.clone();
                path.push(t.target);
                next.push(TraceItem {
                    node: t.target,
                    path,
                    trace,
                });
            }
        }
        next
    }
}

fn lookup_state<S: State>(states: &StateTable<S>, state: &S) -> Result<StateId> {
    states.lookup(state).ok_or_else(|| Error::UnknownState(format!("{:?}", state)))
}

fn lookup_symbol<A: Symbol>(alphabet: &[A], symbol: &A) -> Result<SymbolId> {
    alphabet
        .binary_search(symbol)
        .map(SymbolId::new)
        .map_err(|_| Error::UnknownSymbol(format!("{:?}", symbol)))
}

/// Writes `S, I, Σ, T` as comma-separated debug lists.
pub(crate) fn fmt_parts<S: fmt::Debug, A: fmt::Debug>(lts: &Lts<S, A>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}, ", lts.states())?;
    f.debug_list().entries(lts.initial()).finish()?;
    write!(f, ", {:?}, ", lts.alphabet())?;
    f.debug_list().entries(lts.transitions()).finish()
}

impl<S: fmt::Debug, A: fmt::Debug> fmt::Display for Lts<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LTS(")?;
        fmt_parts(self, f)?;
        write!(f, ")")
    }
}
