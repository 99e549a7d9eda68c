//! Errors raised when constructing automata or when an operation's
//! precondition does not hold.

use thiserror::Error;

/// Errors produced by automaton construction and checked operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A transition endpoint, initial or final state is not in `S`.
    #[error("state {0} is not in the state set")]
    UnknownState(String),

    /// A transition label is not in `Σ`.
    #[error("symbol {0} is not in the alphabet")]
    UnknownSymbol(String),

    /// The operation requires a deterministic automaton.
    #[error("automaton is not deterministic")]
    NotDeterministic,

    /// The operands of a language comparison use different alphabets.
    #[error("alphabets differ: {left} vs {right}")]
    AlphabetMismatch { left: String, right: String },

    /// Asynchronous composition needs at least one component.
    #[error("asynchronous composition requires at least one component")]
    NoComponents,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
