//! FIRST/FOLLOW fixed-point engines (spec §4.2/§4.3).
//!
//! Transcribed in meaning from
//! `examples/original_source/src/grammars/context_free_grammar.py`
//! (`compute_first`/`compute_follow`), with `Symbol` keys (via
//! [`crate::index::SymbolIndex`]-backed maps) instead of string keys.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// FIRST(t) = {t} for terminals; FIRST(ε) = {ε}; FIRST(A) is the fixed point
/// over non-terminals. Represented as a set of terminals, possibly
/// containing [`Symbol::Empty`] to mean "derives ε".
pub type FirstSets = IndexMap<Symbol, BTreeSet<Symbol>>;

/// FOLLOW(A) for every non-terminal A; possibly contains [`Symbol::End`],
/// never [`Symbol::Empty`].
pub type FollowSets = IndexMap<Symbol, BTreeSet<Symbol>>;

/// Computes FIRST sets for every terminal and non-terminal in `grammar`.
///
/// Seeds FIRST(t) = {t} for terminals, FIRST(A) = ∅ for non-terminals, then
/// iterates the worklist until no set grows — termination is guaranteed
/// because every FIRST set is bounded by `terminals ∪ {ε}` (spec §4.2).
pub fn compute_first(grammar: &Grammar) -> FirstSets {
    let mut first: FirstSets = IndexMap::new();

    for t in grammar.symbols.terminals() {
        first.insert(t, BTreeSet::from([t]));
    }
    for n in grammar.symbols.non_terminals() {
        first.insert(n, BTreeSet::new());
    }

    let mut changed = true;
    let mut pass = 0usize;
    while changed {
        changed = false;
        pass += 1;
        for production in grammar.productions.iter() {
            let lhs = production.lhs;
            let mut updated = first[&lhs].clone();
            let before_len = updated.len();

            if production.is_epsilon() {
                updated.insert(Symbol::Empty);
            } else {
                let mut all_nullable = true;
                for &symbol in &production.rhs {
                    let symbol_first = first[&symbol].clone();
                    updated.extend(symbol_first.iter().filter(|&&s| s != Symbol::Empty));
                    if !symbol_first.contains(&Symbol::Empty) {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable {
                    updated.insert(Symbol::Empty);
                }
            }

            if updated.len() > before_len {
                changed = true;
                first.insert(lhs, updated);
            }
        }
        log::trace!("compute_first: pass {pass}, changed={changed}");
    }

    first
}

/// FIRST(β) for a symbol sequence: ∅ accumulated left-to-right, breaking at
/// the first non-nullable symbol; {ε} if `symbols` is empty or every symbol
/// in it is nullable (spec §4.2 `first_of_sequence`).
pub fn first_of_sequence(first: &FirstSets, symbols: &[Symbol]) -> BTreeSet<Symbol> {
    let mut result = BTreeSet::new();
    if symbols.is_empty() {
        result.insert(Symbol::Empty);
        return result;
    }

    let mut all_nullable = true;
    for &symbol in symbols {
        let symbol_first = &first[&symbol];
        result.extend(symbol_first.iter().filter(|&&s| s != Symbol::Empty));
        if !symbol_first.contains(&Symbol::Empty) {
            all_nullable = false;
            break;
        }
    }
    if all_nullable {
        result.insert(Symbol::Empty);
    }
    result
}

/// Computes FOLLOW sets for every non-terminal in `grammar`, requires FIRST
/// to already be computed. Seeds FOLLOW(start_symbol) with `$`, then walks
/// every production right-to-left maintaining a trailer set, exactly as
/// `context_free_grammar.py::compute_follow` (spec §4.3).
///
/// An epsilon-body production contributes nothing (the loop body never
/// executes, matching the Python original and spec §4.3's edge case).
pub fn compute_follow(grammar: &Grammar, first: &FirstSets) -> FollowSets {
    let mut follow: FollowSets = IndexMap::new();
    for n in grammar.symbols.non_terminals() {
        follow.insert(n, BTreeSet::new());
    }
    follow
        .get_mut(&grammar.start_symbol)
        .expect("start symbol must be a declared non-terminal")
        .insert(Symbol::End);

    let mut changed = true;
    let mut pass = 0usize;
    while changed {
        changed = false;
        pass += 1;
        for production in grammar.productions.iter() {
            if production.is_epsilon() {
                continue;
            }
            let mut trailer = follow[&production.lhs].clone();
            for &symbol in production.rhs.iter().rev() {
                if symbol.is_non_terminal() {
                    let before_len = follow[&symbol].len();
                    let mut updated = follow[&symbol].clone();
                    updated.extend(trailer.iter().copied());
                    if updated.len() > before_len {
                        changed = true;
                    }
                    follow.insert(symbol, updated);

                    let symbol_first = &first[&symbol];
                    if symbol_first.contains(&Symbol::Empty) {
                        trailer.extend(symbol_first.iter().filter(|&&s| s != Symbol::Empty));
                    } else {
                        trailer = symbol_first.clone();
                    }
                } else {
                    trailer = first[&symbol].clone();
                }
            }
        }
        log::trace!("compute_follow: pass {pass}, changed={changed}");
    }

    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn nullable_chain_grammar() -> Grammar {
        // A -> a A | ε; S -> A b
        Grammar::build(
            &["a", "b"],
            &["S", "A"],
            &[("A", vec!["a", "A"]), ("A", vec!["ε"]), ("S", vec!["A", "b"])],
            "S",
        )
        .unwrap()
    }

    #[test]
    fn first_of_nullable_nonterminal_contains_empty() {
        let g = nullable_chain_grammar();
        let first = compute_first(&g);
        let a = g.symbols.non_terminal_index("A").unwrap();
        assert!(first[&a].contains(&Symbol::Empty));
        let ta = g.symbols.terminal_index("a").unwrap();
        assert!(first[&a].contains(&ta));
    }

    #[test]
    fn first_of_sequence_empty_is_epsilon() {
        let first: FirstSets = IndexMap::new();
        let result = first_of_sequence(&first, &[]);
        assert_eq!(result, BTreeSet::from([Symbol::Empty]));
    }

    #[test]
    fn running_fixpoint_again_adds_nothing() {
        let g = nullable_chain_grammar();
        let first = compute_first(&g);
        let first_again = compute_first(&g);
        assert_eq!(first, first_again);
    }

    #[test]
    fn follow_of_start_symbol_contains_end_marker() {
        let g = nullable_chain_grammar();
        let first = compute_first(&g);
        let follow = compute_follow(&g, &first);
        let s = g.symbols.non_terminal_index("S").unwrap();
        assert!(follow[&s].contains(&Symbol::End));
    }

    #[test]
    fn epsilon_production_contributes_no_follow_updates() {
        let g = nullable_chain_grammar();
        let first = compute_first(&g);
        let follow = compute_follow(&g, &first);
        let a = g.symbols.non_terminal_index("A").unwrap();
        let tb = g.symbols.terminal_index("b").unwrap();
        // FOLLOW(A) must contain b from S -> A b, regardless of A's own
        // epsilon production contributing nothing to the computation.
        assert!(follow[&a].contains(&tb));
    }

    #[test]
    fn repeated_trailing_symbol_does_not_spuriously_add_epsilon() {
        // X -> ε; S -> X t X. Only the first X is nullable-relevant; t is
        // not, so FIRST(S) must be {t}, never {t, ε}, even though X recurs
        // as the rhs's last element.
        let g = Grammar::build(
            &["t"],
            &["S", "X"],
            &[("X", vec!["ε"]), ("S", vec!["X", "t", "X"])],
            "S",
        )
        .unwrap();
        let first = compute_first(&g);
        let s = g.symbols.non_terminal_index("S").unwrap();
        let t = g.symbols.terminal_index("t").unwrap();
        assert_eq!(first[&s], BTreeSet::from([t]));
    }
}
