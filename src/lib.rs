//! # lts-rs: Labelled Transition Systems in Rust
//!
//! **`lts-rs`** is a small behavioural model-checking toolkit. It represents
//! finite labelled transition systems (LTS) and finite automata (FA), builds
//! derived automata from them, and decides behavioural relations between
//! systems.
//!
//! ## Key Features
//!
//! - **Handle-based automata**: states are interned once into a sorted
//!   [`StateTable`][crate::table::StateTable]; algorithms work on small
//!   [`StateId`][crate::types::StateId] handles, no matter how deeply nested
//!   the structural states of products and power sets become.
//! - **Automaton algebra**: synchronous [`product`][crate::lts::Lts::product],
//!   subset construction ([`power`][crate::lts::Lts::power]),
//!   [`complement`][crate::fa::Fa::complement], word acceptance, language
//!   conformance with counterexample traces, and minimisation.
//! - **Relation solver**: strong and weak (with internal `tau` symbols)
//!   [simulation][crate::simulation::maximum_simulation] and
//!   [bisimulation][crate::simulation::maximum_bisimulation] as greatest
//!   fixpoints.
//! - **Asynchronous composition**: on-the-fly
//!   [interleaving][crate::composition::interleave] of several components
//!   with optional partial-order reduction.
//! - **Tarjan**: strongly connected components of any finite graph.
//!
//! ## Basic Usage
//!
//! ```rust
//! use lts_rs::fa::Fa;
//! use lts_rs::product::Construction;
//!
//! // (a|b)*abb
//! let fa = Fa::new(
//!     [1, 2, 3, 4],
//!     [1],
//!     ['a', 'b'],
//!     [(1, 'a', 1), (1, 'b', 1), (1, 'a', 2), (2, 'b', 3), (3, 'b', 4)],
//!     [4],
//! )
//! .unwrap();
//!
//! assert!(fa.accepts(&['a', 'b', 'b']));
//! assert!(!fa.accepts(&['a', 'b']));
//!
//! // Determinise and minimise.
//! let dfa = fa.power(Construction::Reachable);
//! assert!(dfa.is_deterministic());
//! let min = dfa.minimize().unwrap();
//! assert_eq!(min.num_states(), 4);
//! ```
//!
//! ## Core Components
//!
//! - **[`search`]**: the generic breadth-/depth-first search every
//!   on-the-fly construction is built on.
//! - **[`lts`]** and **[`fa`]**: the automaton value types.
//! - **[`product`]**: product and subset constructions.
//! - **[`simulation`]**: simulation and bisimulation.
//! - **[`composition`]**: interleaving with partial-order reduction.
//! - **[`scc`]**: Tarjan's algorithm.

pub mod bitset;
pub mod composition;
pub mod error;
pub mod fa;
pub mod lts;
pub mod product;
pub mod scc;
pub mod search;
pub mod simulation;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use fa::{ConformanceResult, Fa};
pub use lts::{Lts, Trace};
pub use product::Construction;
pub use simulation::Relation;
