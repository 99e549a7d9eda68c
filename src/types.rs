//! Type-safe handles for states, symbols and transitions.
//!
//! Every automaton interns its structural states and symbols, and all
//! algorithms work on these small `Copy` handles instead. Structural values
//! are only recovered at the boundary (accessors, traces, relations).
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Bounds required of a structural state value.
///
/// States are frequently composite (pairs from products, sorted vectors from
/// the power construction), so anything ordered and hashable qualifies.
pub trait State: Clone + Eq + Hash + Ord + Debug {}

impl<T> State for T where T: Clone + Eq + Hash + Ord + Debug {}

/// Bounds required of an alphabet letter.
pub trait Symbol: Clone + Eq + Hash + Ord + Debug {}

impl<T> Symbol for T where T: Clone + Eq + Hash + Ord + Debug {}

/// A state handle (0-indexed) into the state table of one automaton.
///
/// # Invariants
///
/// - Handles are only meaningful for the automaton that issued them
/// - Handle order equals the structural order of the underlying states
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Creates a handle from a raw table index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit into `u32`.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "State index out of range");
        StateId(index as u32)
    }

    /// Returns the raw table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.index()
    }
}

/// A symbol handle (0-indexed) into the sorted alphabet of one automaton.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Creates a handle from a raw alphabet index.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Symbol index out of range");
        SymbolId(index as u32)
    }

    /// Returns the raw alphabet index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A labelled edge `source --symbol--> target`.
///
/// The derived ordering is `(source, symbol, target)`, which is the canonical
/// order of transition lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Transition {
    pub source: StateId,
    pub symbol: SymbolId,
    pub target: StateId,
}

impl Transition {
    pub fn new(source: StateId, symbol: SymbolId, target: StateId) -> Self {
        Self { source, symbol, target }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.symbol, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id() {
        let s0 = StateId::new(0);
        let s1 = StateId::new(1);
        assert_eq!(s0.index(), 0);
        assert_eq!(s1.index(), 1);
        assert!(s0 < s1);
        assert_eq!(s1.to_string(), "s1");
    }

    #[test]
    fn test_transition_order() {
        let t1 = Transition::new(StateId::new(0), SymbolId::new(1), StateId::new(0));
        let t2 = Transition::new(StateId::new(0), SymbolId::new(0), StateId::new(3));
        let t3 = Transition::new(StateId::new(1), SymbolId::new(0), StateId::new(0));

        let mut ts = vec![t3, t1, t2];
        ts.sort();
        assert_eq!(ts, vec![t2, t1, t3]);
        assert_eq!(t2.to_string(), "(s0, a0, s3)");
    }
}
