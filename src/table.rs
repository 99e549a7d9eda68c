//! Interning tables mapping structural states to [`StateId`] handles.
//!
//! [`StateTable`] is the canonical, immutable table owned by every automaton:
//! states are stored sorted, so handle order equals structural order.
//!
//! [`Interner`] is the growable table used while exploring a state space on
//! the fly. Keys are interned in discovery order and renumbered into
//! canonical order once exploration is complete.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{State, StateId};

/// Canonical table of the states of one automaton.
#[derive(Debug, Clone)]
pub struct StateTable<S> {
    values: Vec<S>,
    index: HashMap<S, StateId>,
}

impl<S: State> StateTable<S> {
    /// Builds a table from arbitrary values, sorting and de-duplicating them.
    pub fn from_values(values: impl IntoIterator<Item = S>) -> Self {
        let mut values: Vec<S> = values.into_iter().collect();
        values.sort();
        values.dedup();
        Self::from_sorted(values)
    }

    /// Builds a table from values that are already sorted and unique.
    pub(crate) fn from_sorted(values: Vec<S>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]), "values must be strictly sorted");
        let index = values.iter().enumerate().map(|(i, v)| (v.clone(), StateId::new(i))).collect();
        Self { values, index }
    }

    /// Looks up the handle of a structural state.
    pub fn lookup(&self, value: &S) -> Option<StateId> {
        self.index.get(value).copied()
    }
}

impl<S> StateTable<S> {
    /// Number of states in the table.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the table holds no states.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the structural value behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not issued by this table.
    pub fn get(&self, id: StateId) -> &S {
        &self.values[id.index()]
    }

    /// All states in canonical order.
    pub fn values(&self) -> &[S] {
        &self.values
    }

    /// All handles in canonical order.
    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.values.len()).map(StateId::new)
    }
}

/// Discovery-order interning of exploration keys.
///
/// Keys are typically tuples of handles of the operand automata (for
/// example `(StateId, StateId)` for a product state), which are cheap to
/// hash regardless of how deeply nested the structural states are.
#[derive(Debug)]
pub struct Interner<K> {
    keys: Vec<K>,
    index: HashMap<K, StateId>,
}

impl<K> Default for Interner<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K> Interner<K>
where
    K: Clone + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a key, returning its handle and whether it was newly added.
    pub fn intern(&mut self, key: K) -> (StateId, bool) {
        if let Some(&id) = self.index.get(&key) {
            return (id, false);
        }
        let id = StateId::new(self.keys.len());
        self.index.insert(key.clone(), id);
        self.keys.push(key);
        (id, true)
    }

    /// Looks up a key without interning it.
    pub fn lookup(&self, key: &K) -> Option<StateId> {
        self.index.get(key).copied()
    }

    /// Returns the key behind a discovery-order handle.
    pub fn get(&self, id: StateId) -> &K {
        &self.keys[id.index()]
    }

    /// Number of interned keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing was interned yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sorts the keys into canonical order.
    ///
    /// Returns the sorted keys together with a remapping table: the handle
    /// issued for key `k` during discovery becomes `remap[old.index()]`.
    pub fn into_canonical(self) -> (Vec<K>, Vec<StateId>) {
        let mut order: Vec<usize> = (0..self.keys.len()).collect();
        order.sort_by(|&a, &b| self.keys[a].cmp(&self.keys[b]));

        let mut remap = vec![StateId::new(0); self.keys.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = StateId::new(new);
        }

        let mut keys: Vec<Option<K>> = self.keys.into_iter().map(Some).collect();
        let sorted = order.iter().filter_map(|&old| keys[old].take()).collect();

        (sorted, remap)
    }
}
