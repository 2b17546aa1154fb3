//! Error types (spec §7).
//!
//! Validation errors surface synchronously at the offending call
//! (`GrammarError`). Table-build conflicts never abort construction — they
//! accumulate on the [`crate::parser::Parser`] as [`TableConflict`] values
//! and are queryable by the caller. Parse-time errors ([`ParseError`])
//! terminate the parse and are returned alongside the configuration log.
//!
//! Upgraded from teacher's `rustemo-tools::error::{Error, Result}` (a single
//! stringly-typed `Error::Error(String)` variant) to structured `thiserror`
//! variants, following this corpus's dominant idiom for library error types.

use thiserror::Error;

use crate::index::{ProductionIndex, StateIndex};

/// Errors raised while building or augmenting a grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A symbol appears in a production but was never declared.
    #[error("undeclared symbol: {0}")]
    UndeclaredSymbol(String),

    /// `$` or `ε` was used as a declared terminal/non-terminal name, or a
    /// name collides with one already declared in the other namespace.
    #[error("reserved or already-declared name: {0}")]
    ReservedName(String),

    /// The grammar's start symbol was never declared as a non-terminal.
    #[error("undeclared start symbol: {0}")]
    UndeclaredStartSymbol(String),

    /// `augment()` was called a second time on the same grammar.
    #[error("grammar is already augmented")]
    AlreadyAugmented,
}

/// A conflict discovered while assembling ACTION/GOTO tables (spec §4.7/§7).
/// The first-recorded action always wins; every conflict is still appended
/// here so a caller (or UI layer) can inspect all of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} conflict in state {state:?} on symbol {symbol}: kept {existing}, discarded {incoming}")]
pub struct TableConflict {
    pub state: StateIndex,
    pub symbol: String,
    pub kind: ConflictKind,
    pub existing: String,
    pub incoming: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}

/// Fatal table-construction errors (distinct from the non-fatal conflicts
/// recorded in [`TableConflict`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The LALR(1) core-merge found two LR(1) states with the same LR(0)
    /// kernel but inconsistent outgoing transitions — a bug in the canonical
    /// collection, not a grammar issue (spec §9).
    #[error("inconsistent LALR(1) merge for state group containing state {0:?}")]
    InconsistentMerge(Vec<StateIndex>),
}

/// Errors raised by the parse driver (spec §4.8/§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No ACTION entry for `(state, token)`. The parse terminates; the
    /// configuration log up to and including the failing step is still
    /// returned to the caller.
    #[error("no action defined for state {state:?} on token {token:?}")]
    NoAction { state: StateIndex, token: String },

    /// A reduce popped the stack but found no GOTO entry for the resulting
    /// `(state, non_terminal)` pair. Fatal to the current parse.
    #[error("no goto entry for state {state:?} on non-terminal {non_terminal:?} (reducing production {production:?})")]
    MissingGoto {
        state: StateIndex,
        non_terminal: String,
        production: ProductionIndex,
    },
}

/// Errors raised by [`crate::parser::Parser::build`] (spec §6 `build_parser`):
/// either the grammar failed to augment, or the LALR(1) merge found an
/// inconsistency.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Table(#[from] TableError),
}
