//! ACTION/GOTO table construction, one shared loop per discipline (spec
//! §4.7).
//!
//! Transcribed in meaning from
//! `examples/original_source/src/parsers/{lr0,slr1,lr1,lalr1}_parser.py::construct_parsing_table`,
//! collapsed into the single table-builder spec §9 calls for ("Dynamic
//! dispatch across parser variants"): [`Discipline`] tags which lookahead
//! rule reduces use, and whether the item sets carry their own lookaheads
//! (LR(1)/LALR(1)) or need FOLLOW/"every terminal" (SLR(1)/LR(0)).
//! Conflicts never overwrite — the first-recorded action wins and every
//! conflict is appended to a queryable list (spec §9 "Conflict reporting",
//! replacing the Python original's print-and-overwrite).

use indexmap::IndexMap;

use crate::canonical::CanonicalCollection;
use crate::closure::{Lr0ItemSet, Lr1ItemSet};
use crate::error::{ConflictKind, TableConflict};
use crate::first_follow::FollowSets;
use crate::grammar::Grammar;
use crate::index::{ProductionIndex, StateIndex};
use crate::symbol::Symbol;

/// Which of the four parsing disciplines to build (spec §6 `build_parser`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    Lr0,
    Slr1,
    Lalr1,
    Lr1,
}

impl Discipline {
    pub fn name(self) -> &'static str {
        match self {
            Discipline::Lr0 => "LR(0)",
            Discipline::Slr1 => "SLR(1)",
            Discipline::Lalr1 => "LALR(1)",
            Discipline::Lr1 => "LR(1)",
        }
    }
}

/// A single ACTION table entry (spec §3 "ACTION table").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateIndex),
    Reduce(ProductionIndex),
    Accept,
}

impl Action {
    fn describe(self, grammar: &Grammar) -> String {
        match self {
            Action::Shift(s) => format!("shift to state {}", s.index()),
            Action::Reduce(p) => format!(
                "reduce by production {} ({})",
                p.index(),
                grammar.display_symbol(grammar.productions[p].lhs)
            ),
            Action::Accept => "accept".to_string(),
        }
    }
}

/// ACTION/GOTO tables plus the non-fatal conflicts recorded while building
/// them (spec §4.7/§7: conflicts never abort construction).
#[derive(Debug, Clone, Default)]
pub struct ParseTable {
    pub action: IndexMap<(StateIndex, Symbol), Action>,
    pub goto: IndexMap<(StateIndex, Symbol), StateIndex>,
    pub conflicts: Vec<TableConflict>,
}

impl ParseTable {
    fn new() -> Self {
        Self::default()
    }

    /// Records `action` at `(state, terminal)`. If an entry already exists
    /// and disagrees, the existing entry is kept and a [`TableConflict`] is
    /// appended; agreeing entries (identical action re-derived from a
    /// different item) are not conflicts.
    fn record_action(
        &mut self,
        grammar: &Grammar,
        state: StateIndex,
        terminal: Symbol,
        action: Action,
    ) {
        match self.action.get(&(state, terminal)) {
            None => {
                self.action.insert((state, terminal), action);
            }
            Some(&existing) if existing == action => {}
            Some(&existing) => {
                let kind = match (existing, action) {
                    (Action::Shift(_), Action::Reduce(_)) | (Action::Reduce(_), Action::Shift(_)) => {
                        ConflictKind::ShiftReduce
                    }
                    _ => ConflictKind::ReduceReduce,
                };
                log::debug!(
                    "table conflict in state {}: kept {}, discarded {}",
                    state.index(),
                    existing.describe(grammar),
                    action.describe(grammar)
                );
                self.conflicts.push(TableConflict {
                    state,
                    symbol: grammar.display_symbol(terminal).to_string(),
                    kind,
                    existing: existing.describe(grammar),
                    incoming: action.describe(grammar),
                });
            }
        }
    }

    fn record_goto(&mut self, state: StateIndex, non_terminal: Symbol, target: StateIndex) {
        self.goto.insert((state, non_terminal), target);
    }
}

/// Builds the ACTION/GOTO tables for LR(0) or SLR(1), whose item sets carry
/// no per-item lookahead. `follow` is `Some` for SLR(1) (reduce keyed by
/// `FOLLOW(lhs)`) and `None` for LR(0) (reduce keyed by every terminal, but
/// never `$` — spec §9's "Open question", resolved by following the
/// original literally).
pub fn construct_table_from_kernel_sets(
    grammar: &Grammar,
    collection: &CanonicalCollection<Lr0ItemSet>,
    follow: Option<&FollowSets>,
) -> ParseTable {
    let mut table = ParseTable::new();
    let augmented_start = grammar
        .augmented_start_symbol
        .expect("grammar must be augmented before table construction");

    for state_id in 0..collection.states.len() {
        let state_id = StateIndex(state_id);
        let items = &collection.states[state_id];

        for item in items {
            match item.symbol_after_dot(grammar) {
                Some(symbol @ (Symbol::Terminal(_) | Symbol::End)) => {
                    if let Some(&target) = collection.transitions.get(&(state_id, symbol)) {
                        table.record_action(grammar, state_id, symbol, Action::Shift(target));
                    }
                }
                Some(Symbol::NonTerminal(_)) => {}
                Some(Symbol::Empty) | None => {}
            }

            if item.is_reduce_position(grammar) {
                let production = &grammar.productions[item.production];
                if production.lhs == augmented_start {
                    table.record_action(grammar, state_id, Symbol::End, Action::Accept);
                } else {
                    let lookaheads: Vec<Symbol> = match follow {
                        Some(follow_sets) => follow_sets[&production.lhs].iter().copied().collect(),
                        None => grammar.symbols.terminals().collect(),
                    };
                    for terminal in lookaheads {
                        table.record_action(
                            grammar,
                            state_id,
                            terminal,
                            Action::Reduce(item.production),
                        );
                    }
                }
            }
        }

        for non_terminal in grammar.symbols.non_terminals() {
            if let Some(&target) = collection.transitions.get(&(state_id, non_terminal)) {
                table.record_goto(state_id, non_terminal, target);
            }
        }
    }

    table
}

/// Builds the ACTION/GOTO tables for LALR(1) or LR(1): both shapes are a
/// `CanonicalCollection<Lr1ItemSet>` (LALR(1) is simply the post-merge
/// collection) so one function serves both — reduce lookaheads always come
/// from the item's own lookahead set.
pub fn construct_table_from_lr1_sets(
    grammar: &Grammar,
    collection: &CanonicalCollection<Lr1ItemSet>,
) -> ParseTable {
    let mut table = ParseTable::new();
    let augmented_start = grammar
        .augmented_start_symbol
        .expect("grammar must be augmented before table construction");

    for state_id in 0..collection.states.len() {
        let state_id = StateIndex(state_id);
        let items = &collection.states[state_id];

        for (kernel, lookahead) in items {
            match kernel.symbol_after_dot(grammar) {
                Some(symbol @ (Symbol::Terminal(_) | Symbol::End)) => {
                    if let Some(&target) = collection.transitions.get(&(state_id, symbol)) {
                        table.record_action(grammar, state_id, symbol, Action::Shift(target));
                    }
                }
                Some(Symbol::NonTerminal(_)) => {}
                Some(Symbol::Empty) | None => {}
            }

            if kernel.is_reduce_position(grammar) {
                let production = &grammar.productions[kernel.production];
                if production.lhs == augmented_start {
                    table.record_action(grammar, state_id, Symbol::End, Action::Accept);
                } else {
                    for &terminal in lookahead {
                        table.record_action(
                            grammar,
                            state_id,
                            terminal,
                            Action::Reduce(kernel.production),
                        );
                    }
                }
            }
        }

        for non_terminal in grammar.symbols.non_terminals() {
            if let Some(&target) = collection.transitions.get(&(state_id, non_terminal)) {
                table.record_goto(state_id, non_terminal, target);
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{build_lr0_collection, build_lr1_collection};
    use crate::first_follow::{compute_first, compute_follow};
    use crate::grammar::Grammar;
    use crate::lalr::merge_to_lalr;

    fn expr_grammar() -> Grammar {
        let mut g = Grammar::build(
            &["+", "*", "(", ")", "id"],
            &["E", "T", "F"],
            &[
                ("E", vec!["E", "+", "T"]),
                ("E", vec!["T"]),
                ("T", vec!["T", "*", "F"]),
                ("T", vec!["F"]),
                ("F", vec!["(", "E", ")"]),
                ("F", vec!["id"]),
            ],
            "E",
        )
        .unwrap();
        g.augment().unwrap();
        g
    }

    #[test]
    fn slr1_table_has_no_conflicts_on_expr_grammar() {
        let g = expr_grammar();
        let first = compute_first(&g);
        let follow = compute_follow(&g, &first);
        let collection = build_lr0_collection(&g);
        let table = construct_table_from_kernel_sets(&g, &collection, Some(&follow));
        assert!(table.conflicts.is_empty());
    }

    #[test]
    fn lr0_accept_action_present_at_dollar() {
        let g = expr_grammar();
        let collection = build_lr0_collection(&g);
        let table = construct_table_from_kernel_sets(&g, &collection, None);
        assert!(table
            .action
            .values()
            .any(|a| matches!(a, Action::Accept)));
    }

    #[test]
    fn lalr1_table_matches_shape_of_lr1_for_unambiguous_grammar() {
        let g = expr_grammar();
        let first = compute_first(&g);
        let lr1 = build_lr1_collection(&g, &first);
        let lr1_table = construct_table_from_lr1_sets(&g, &lr1);
        let lalr = merge_to_lalr(&lr1).unwrap();
        let lalr_table = construct_table_from_lr1_sets(&g, &lalr);
        assert!(lr1_table.conflicts.is_empty());
        assert!(lalr_table.conflicts.is_empty());
    }
}
