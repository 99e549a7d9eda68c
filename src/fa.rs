//! Finite automata.
//!
//! An [`Fa`] is an [`Lts`] with a set of final states. It dereferences to
//! its underlying LTS, so every LTS query (and simulation) applies to it
//! directly; the language operations here additionally carry `F` through.

use std::fmt;
use std::ops::Deref;

use log::debug;
use num_bigint::BigUint;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::lts::{fmt_parts, Lts, Trace};
use crate::product::Construction;
use crate::search::GraphSearch;
use crate::simulation::{PairMatrix, Solver};
use crate::table::StateTable;
use crate::types::{State, StateId, Symbol, SymbolId, Transition};

/// Finite automaton `(S, I, Σ, T, F)`.
#[derive(Debug, Clone)]
pub struct Fa<S, A> {
    lts: Lts<S, A>,
    finals: BitSet,
}

/// Outcome of a conformance check `L(impl) ⊆ L(spec)`.
#[derive(Debug, Clone)]
pub struct ConformanceResult<S, A> {
    /// True iff no counterexample exists.
    pub holds: bool,
    /// The automaton `impl × complement(power(spec))`.
    pub checker: Fa<S, A>,
    /// Traces of the checker from its initial state to each reachable final
    /// state. Each spells a word accepted by `impl` and rejected by `spec`.
    pub counterexamples: Vec<Trace<S, A>>,
}

impl<S: State, A: Symbol> Fa<S, A> {
    pub fn new(
        states: impl IntoIterator<Item = S>,
        initial: impl IntoIterator<Item = S>,
        alphabet: impl IntoIterator<Item = A>,
        transitions: impl IntoIterator<Item = (S, A, S)>,
        finals: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self::from_lts(Lts::new(states, initial, alphabet, transitions)?, finals)
    }

    /// Adds final states to an LTS.
    pub fn from_lts(lts: Lts<S, A>, finals: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut bits = BitSet::new(lts.num_states());
        for f in finals {
            let id = lts.state_id(&f).ok_or_else(|| Error::UnknownState(format!("{:?}", f)))?;
            bits.insert_state(id);
        }
        Ok(Self { lts, finals: bits })
    }

    pub fn is_final(&self, state: &S) -> bool {
        self.lts.state_id(state).is_some_and(|id| self.finals.contains_state(id))
    }

    /// Synchronous product; final states are the pairs in `F_A × F_B`.
    pub fn product<T: State>(&self, other: &Fa<T, A>, construction: Construction) -> Fa<(S, T), A> {
        let explored = self.lts.product_keys(&other.lts, construction);
        let finals = explored
            .keys
            .iter()
            .enumerate()
            .filter(|(_, key)| self.finals.contains_state(key.0) && other.finals.contains_state(key.1))
            .map(|(i, _)| StateId::new(i))
            .collect();
        let lts = explored.to_lts(self.alphabet().to_vec(), |&(s, t)| {
            (self.state(s).clone(), other.state(t).clone())
        });
        Fa { lts, finals }
    }

    /// Subset construction; final state-sets are those intersecting `F`.
    ///
    /// # Panics
    ///
    /// Panics with [`Construction::Full`] if `|S|` is at least the bit width
    /// of `usize`.
    pub fn power(&self, construction: Construction) -> Fa<Vec<S>, A> {
        let explored = self.lts.power_keys(construction);
        let finals = explored
            .keys
            .iter()
            .enumerate()
            .filter(|(_, set)| set.iter().any(|&s| self.finals.contains_state(s)))
            .map(|(i, _)| StateId::new(i))
            .collect();
        let lts = explored.to_lts(self.alphabet().to_vec(), |set| {
            set.iter().map(|&s| self.state(s).clone()).collect()
        });
        Fa { lts, finals }
    }

    /// Swaps final and non-final states.
    ///
    /// Only meaningful on a complete and deterministic automaton, which is
    /// not checked: apply it to [`Fa::power`] to get the complement language.
    pub fn complement(&self) -> Self {
        let finals = self
            .lts
            .state_table()
            .ids()
            .filter(|&s| !self.finals.contains_state(s))
            .collect();
        Self {
            lts: self.lts.clone(),
            finals,
        }
    }

    /// Returns true if some run from some initial state consumes `word` and
    /// ends in a final state.
    pub fn accepts(&self, word: &[A]) -> bool {
        let symbols: Vec<Option<SymbolId>> = word.iter().map(|a| self.lts.symbol_id(a)).collect();

        let mut step = |&(s, pos): &(StateId, usize)| -> Vec<(StateId, usize)> {
            match symbols.get(pos) {
                Some(&Some(a)) => self.lts.successors(s, a).map(|t| (t, pos + 1)).collect(),
                _ => Vec::new(),
            }
        };
        let frontier = self.initial_ids().iter().map(|&s| (s, 0));
        let mut search = GraphSearch::dfs(frontier);
        let accepted = search.run_until(&mut step, |&(s, pos)| pos == word.len() && self.finals.contains_state(s));

        debug!("accepts(|w| = {}) = {}", word.len(), accepted.is_some());
        accepted.is_some()
    }

    /// Decides `L(self) ⊆ L(spec)` by searching `self × complement(power(spec))`
    /// for a reachable final state.
    ///
    /// Both automata must share the same alphabet.
    ///
    /// # Panics
    ///
    /// Panics with [`Construction::Full`] if `spec` has at least as many
    /// states as `usize` has bits, like [`Fa::power`].
    pub fn conforms<T: State>(
        &self,
        spec: &Fa<T, A>,
        construction: Construction,
    ) -> Result<ConformanceResult<(S, Vec<T>), A>> {
        if self.alphabet() != spec.alphabet() {
            return Err(Error::AlphabetMismatch {
                left: format!("{:?}", self.alphabet()),
                right: format!("{:?}", spec.alphabet()),
            });
        }

        let checker = self.product(&spec.power(construction).complement(), construction);

        let mut counterexamples = Vec::new();
        for f in checker.finals.states() {
            if checker.initial_ids().contains(&f) {
                counterexamples.push(Vec::new());
            }
            for trace in checker.traces(f, checker.initial_ids()) {
                counterexamples.push(trace.iter().map(|t| checker.resolve(t)).collect());
            }
        }

        debug!(
            "conforms: checker has {} states, {} counterexamples",
            checker.num_states(),
            counterexamples.len()
        );

        Ok(ConformanceResult {
            holds: counterexamples.is_empty(),
            checker,
            counterexamples,
        })
    }

    /// Quotients a deterministic automaton by its coarsest bisimulation that
    /// respects acceptance.
    ///
    /// States of the result are the sorted equivalence classes. Each class
    /// takes the outgoing transitions of its lowest member.
    pub fn minimize(&self) -> Result<Fa<Vec<S>, A>> {
        if !self.is_deterministic() {
            return Err(Error::NotDeterministic);
        }

        let n = self.num_states();
        let mut seed = PairMatrix::new(n, n);
        for s in self.lts.state_table().ids() {
            for t in self.lts.state_table().ids() {
                if self.finals.contains_state(s) == self.finals.contains_state(t) {
                    seed.insert(s, t);
                }
            }
        }
        let equivalence = Solver::new(&self.lts, &self.lts, &[]).bisimulation(seed);

        // Classes in order of their lowest member, which is also their
        // lexicographic order since classes are disjoint.
        let mut class_of: Vec<Option<StateId>> = vec![None; n];
        let mut classes: Vec<Vec<StateId>> = Vec::new();
        for s in self.lts.state_table().ids() {
            if class_of[s.index()].is_some() {
                continue;
            }
            let id = StateId::new(classes.len());
            let members: Vec<StateId> = self
                .lts
                .state_table()
                .ids()
                .filter(|&t| class_of[t.index()].is_none() && equivalence.contains(s, t))
                .collect();
            for &t in &members {
                class_of[t.index()] = Some(id);
            }
            classes.push(members);
        }
        let class = |s: StateId| class_of[s.index()].unwrap_or(s);

        let initial = self.initial_ids().iter().map(|&s| class(s)).collect();
        let transitions = classes
            .iter()
            .enumerate()
            .flat_map(|(i, members)| {
                self.outgoing(members[0])
                    .iter()
                    .map(move |t| (StateId::new(i), t.symbol, t.target))
            })
            .map(|(source, symbol, target)| Transition::new(source, symbol, class(target)))
            .collect();
        let finals = classes
            .iter()
            .enumerate()
            .filter(|(_, members)| members.iter().any(|&s| self.finals.contains_state(s)))
            .map(|(i, _)| StateId::new(i))
            .collect();

        debug!("minimize: {} states -> {} classes", n, classes.len());

        let states = StateTable::from_sorted(
            classes
                .iter()
                .map(|members| members.iter().map(|&s| self.state(s).clone()).collect())
                .collect(),
        );
        let lts = Lts::from_parts(states, initial, self.alphabet().to_vec(), transitions);
        Ok(Fa { lts, finals })
    }

    /// Number of distinct words of the given length in the language.
    ///
    /// Counts paths in the reachable subset construction, where words and
    /// paths are in bijection.
    pub fn count_words(&self, length: usize) -> BigUint {
        let power = self.power(Construction::Reachable);

        let mut counts = vec![BigUint::from(0u32); power.num_states()];
        for &s in power.initial_ids() {
            counts[s.index()] = BigUint::from(1u32);
        }
        for _ in 0..length {
            let mut next = vec![BigUint::from(0u32); power.num_states()];
            for t in power.transition_ids() {
                next[t.target.index()] += &counts[t.source.index()];
            }
            counts = next;
        }

        power.finals.states().map(|s| &counts[s.index()]).sum()
    }
}

impl<S, A> Fa<S, A> {
    pub fn lts(&self) -> &Lts<S, A> {
        &self.lts
    }

    pub fn into_lts(self) -> Lts<S, A> {
        self.lts
    }

    /// Final states in canonical order.
    pub fn finals(&self) -> impl Iterator<Item = &S> + '_ {
        self.finals.states().map(|id| self.lts.state(id))
    }

    pub fn final_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals.states()
    }

    pub fn is_final_id(&self, id: StateId) -> bool {
        self.finals.contains_state(id)
    }
}

impl<S, A> Deref for Fa<S, A> {
    type Target = Lts<S, A>;

    fn deref(&self) -> &Self::Target {
        &self.lts
    }
}

impl<S: fmt::Debug, A: fmt::Debug> fmt::Display for Fa<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FA(")?;
        fmt_parts(&self.lts, f)?;
        write!(f, ", ")?;
        f.debug_list().entries(self.finals()).finish()?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    // (a|b)*abb
    fn abb() -> Fa<u32, char> {
        Fa::new(
            [1, 2, 3, 4],
            [1],
            ['a', 'b'],
            [(1, 'a', 1), (1, 'b', 1), (1, 'a', 2), (2, 'b', 3), (3, 'b', 4)],
            [4],
        )
        .unwrap()
    }

    fn word(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_new_rejects_unknown_final() {
        let err = Fa::new([1, 2], [1], ['a'], [], [3]).unwrap_err();
        assert_eq!(err, Error::UnknownState("3".to_string()));
    }

    #[test]
    fn test_accepts() {
        let fa = abb();
        assert!(fa.accepts(&word("abb")));
        assert!(fa.accepts(&word("aabb")));
        assert!(fa.accepts(&word("babb")));
        assert!(!fa.accepts(&word("ab")));
        assert!(!fa.accepts(&word("")));
        assert!(!fa.accepts(&word("abc")));
    }

    #[test]
    fn test_accepts_empty_word() {
        let fa = Fa::new([1], [1], ['a'], [], [1]).unwrap();
        assert!(fa.accepts(&[]));
        assert!(!fa.accepts(&['a']));
    }

    #[test]
    fn test_complement() {
        let fa = abb();
        let c = fa.complement();
        assert_eq!(c.finals().collect::<Vec<_>>(), vec![&1, &2, &3]);
        assert_eq!(c.num_transitions(), fa.num_transitions());
        assert_eq!(c.complement().finals().collect::<Vec<_>>(), vec![&4]);
    }

    #[test]
    fn test_power_finals() {
        let p = abb().power(Construction::Reachable);
        assert!(p.is_complete());
        assert!(p.is_deterministic());
        assert_eq!(p.finals().collect::<Vec<_>>(), vec![&vec![1, 4]]);
    }

    #[test]
    fn test_minimize_requires_determinism() {
        assert_eq!(abb().minimize().unwrap_err(), Error::NotDeterministic);
    }

    #[test]
    fn test_minimize_partial_dfa() {
        // Two accepting sinks that cannot be told apart.
        let fa = Fa::new([1, 2, 3], [1], ['a', 'b'], [(1, 'a', 2), (1, 'b', 3)], [2, 3]).unwrap();
        let m = fa.minimize().unwrap();
        assert_eq!(m.states(), &[vec![1], vec![2, 3]]);
        assert_eq!(m.num_transitions(), 2);
        assert_eq!(m.finals().collect::<Vec<_>>(), vec![&vec![2, 3]]);
    }

    #[test]
    fn test_count_words() {
        let fa = abb();
        assert_eq!(fa.count_words(2), BigUint::from(0u32));
        assert_eq!(fa.count_words(3), BigUint::from(1u32));
        assert_eq!(fa.count_words(4), BigUint::from(2u32));
        assert_eq!(fa.count_words(5), BigUint::from(4u32));
    }

    #[test]
    fn test_count_words_large() {
        // Every word over {a, b}.
        let fa = Fa::new([1], [1], ['a', 'b'], [(1, 'a', 1), (1, 'b', 1)], [1]).unwrap();
        assert_eq!(fa.count_words(100), BigUint::from(2u32).pow(100));
    }

    #[test]
    fn test_conforms_alphabet_mismatch() {
        let other = Fa::new([1], [1], ['a'], [], [1]).unwrap();
        let err = abb().conforms(&other, Construction::Reachable).unwrap_err();
        assert!(matches!(err, Error::AlphabetMismatch { .. }));
    }

    #[test]
    fn test_conforms_empty_word() {
        // `imp` accepts the empty word, `spec` accepts nothing.
        let imp = Fa::new([1], [1], ['a'], [], [1]).unwrap();
        let spec = Fa::new([2], [2], ['a'], [], Vec::<u32>::new()).unwrap();
        let result = imp.conforms(&spec, Construction::Reachable).unwrap();
        assert!(!result.holds);
        assert_eq!(result.counterexamples, vec![Vec::new()]);
    }

    #[test]
    fn test_display() {
        let fa = Fa::new([1, 2], [1], ['a'], [(1, 'a', 2)], [2]).unwrap();
        assert_eq!(fa.to_string(), "FA([1, 2], [1], ['a'], [(1, 'a', 2)], [2])");
    }
}
