//! Property-based tests for the automaton algebra and the relation solver.
//!
//! These tests use proptest to check algebraic laws over many small,
//! randomly generated automata.

use std::collections::HashSet;

use lts_rs::simulation::{full_relation, maximum_bisimulation, maximum_simulation};
use lts_rs::{Construction, Fa};
use num_bigint::BigUint;
use proptest::prelude::*;

prop_compose! {
    fn arbitrary_fa()(n in 1u8..5)(
        n in Just(n),
        transitions in prop::collection::vec((0..n, prop::sample::select(vec!['a', 'b']), 0..n), 0..12),
        initial in prop::collection::vec(0..n, 0..3),
        finals in prop::collection::vec(0..n, 0..3),
    ) -> Fa<u8, char> {
        Fa::new(0..n, initial, ['a', 'b'], transitions, finals).unwrap()
    }
}

fn arbitrary_construction() -> impl Strategy<Value = Construction> {
    prop_oneof![Just(Construction::Reachable), Just(Construction::Full)]
}

fn arbitrary_tau() -> impl Strategy<Value = Vec<char>> {
    prop_oneof![Just(vec![]), Just(vec!['a']), Just(vec!['b'])]
}

proptest! {
    #[test]
    fn power_is_complete_and_deterministic(fa in arbitrary_fa(), construction in arbitrary_construction()) {
        let power = fa.power(construction);
        prop_assert!(power.is_complete());
        prop_assert!(power.is_deterministic());
    }

    #[test]
    fn double_complement_restores_finals(fa in arbitrary_fa()) {
        let twice = fa.complement().complement();
        prop_assert_eq!(twice.states(), fa.states());
        prop_assert_eq!(twice.transition_ids(), fa.transition_ids());
        prop_assert_eq!(twice.finals().collect::<Vec<_>>(), fa.finals().collect::<Vec<_>>());
    }

    #[test]
    fn full_product_has_all_pairs(a in arbitrary_fa(), b in arbitrary_fa()) {
        let full = a.product(&b, Construction::Full);
        prop_assert_eq!(full.num_states(), a.num_states() * b.num_states());
    }

    #[test]
    fn reachable_product_is_reachable_part_of_full(a in arbitrary_fa(), b in arbitrary_fa()) {
        let full = a.product(&b, Construction::Full);
        let reachable = a.product(&b, Construction::Reachable);
        prop_assert_eq!(reachable.states().iter().collect::<Vec<_>>(), full.reachable());
        prop_assert_eq!(
            reachable.finals().collect::<Vec<_>>(),
            full.finals().filter(|f| reachable.state_id(f).is_some()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn bisimulation_contains_identity(fa in arbitrary_fa(), tau in arbitrary_tau()) {
        let bisim = maximum_bisimulation(fa.lts(), fa.lts(), &full_relation(fa.lts(), fa.lts()), &tau);
        for s in fa.states() {
            prop_assert!(bisim.contains(&(*s, *s)));
        }
    }

    #[test]
    fn simulation_is_a_fixpoint(a in arbitrary_fa(), b in arbitrary_fa(), tau in arbitrary_tau()) {
        let (a, b) = (a.lts(), b.lts());
        let once = maximum_simulation(a, b, &full_relation(a, b), &tau);
        let twice = maximum_simulation(a, b, &once, &tau);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn bisimulation_is_within_both_simulations(a in arbitrary_fa(), b in arbitrary_fa()) {
        let (a, b) = (a.lts(), b.lts());
        let bisim = maximum_bisimulation(a, b, &full_relation(a, b), &[]);
        let forward = maximum_simulation(a, b, &full_relation(a, b), &[]);
        let backward: HashSet<(u8, u8)> = maximum_simulation(b, a, &full_relation(b, a), &[])
            .into_iter()
            .map(|(t, s)| (s, t))
            .collect();
        prop_assert!(bisim.is_subset(&forward));
        prop_assert!(bisim.is_subset(&backward));
    }

    #[test]
    fn automaton_conforms_to_itself(fa in arbitrary_fa()) {
        let result = fa.conforms(&fa, Construction::Reachable).unwrap();
        prop_assert!(result.holds);
        prop_assert!(result.counterexamples.is_empty());
    }

    #[test]
    fn minimization_preserves_language(fa in arbitrary_fa()) {
        let dfa = fa.power(Construction::Reachable);
        let min = dfa.minimize().unwrap();
        prop_assert!(min.num_states() <= dfa.num_states());
        for length in 0..5 {
            prop_assert_eq!(min.count_words(length), fa.count_words(length));
        }
    }

    #[test]
    fn accepts_agrees_with_count_words(fa in arbitrary_fa()) {
        let words: [[char; 2]; 4] = [['a', 'a'], ['a', 'b'], ['b', 'a'], ['b', 'b']];
        let accepted = words.iter().filter(|w| fa.accepts(&w[..])).count();
        prop_assert_eq!(fa.count_words(2), BigUint::from(accepted));
    }
}
