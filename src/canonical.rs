//! Canonical-collection builder (spec §4.5).
//!
//! Breadth-first expansion from the initial state, interning each closed
//! item set to a dense [`StateIndex`] by content equality (not reference
//! identity) so the same item set is never assigned two states. Transcribed
//! in meaning from `examples/original_source/src/parsers/lr0_parser.py::items`
//! and `lr1_parser.py::items` (`deque`-based BFS, `frozenset` interning key),
//! generalized over the two item-set shapes in [`crate::closure`] via plain
//! closures rather than a trait object, since LR(1)'s `goto` additionally
//! needs the FIRST table that LR(0)'s does not.

use std::collections::{BTreeMap, VecDeque};

use indexmap::IndexMap;

use crate::closure::{closure_lr0, closure_lr1, goto_lr0, goto_lr1, Lr0ItemSet, Lr1ItemSet};
use crate::first_follow::FirstSets;
use crate::grammar::Grammar;
use crate::index::{ProductionIndex, StateIndex, StateVec};
use crate::item::KernelItem;
use crate::symbol::Symbol;

/// A canonical collection: dense states plus the transition function between
/// them (spec §3 "Transition table": a partial mapping `(state, symbol) ->
/// state`).
#[derive(Debug, Clone)]
pub struct CanonicalCollection<S> {
    pub states: StateVec<S>,
    pub transitions: IndexMap<(StateIndex, Symbol), StateIndex>,
}

/// Every non-terminal/terminal symbol that appears immediately after a dot
/// in some item of a kernel-only item set.
fn symbols_after_dot_lr0(items: &Lr0ItemSet, grammar: &Grammar) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = items
        .iter()
        .filter_map(|item| item.symbol_after_dot(grammar))
        .collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

fn symbols_after_dot_lr1(items: &Lr1ItemSet, grammar: &Grammar) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = items
        .keys()
        .filter_map(|kernel| kernel.symbol_after_dot(grammar))
        .collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

/// Shared BFS: seed state 0 with `seed`, then repeatedly pop a frontier
/// state, ask it for the symbols that appear after a dot, compute `goto`
/// for each, and intern the result if non-empty and not already present
/// (spec §4.5: "Interning key: the canonicalized set... Set equality is by
/// element membership, not insertion order" — `S: Ord` item sets used as
/// `BTreeMap` keys give us exactly that).
fn build_collection<S, FSym, FGoto>(
    seed: S,
    symbols_after_dot: FSym,
    goto: FGoto,
    grammar: &Grammar,
) -> CanonicalCollection<S>
where
    S: Ord + Clone,
    FSym: Fn(&S, &Grammar) -> Vec<Symbol>,
    FGoto: Fn(&S, Symbol, &Grammar) -> S,
{
    let mut states: StateVec<S> = StateVec::new();
    let mut interned: BTreeMap<S, StateIndex> = BTreeMap::new();
    let mut transitions: IndexMap<(StateIndex, Symbol), StateIndex> = IndexMap::new();
    let mut queue: VecDeque<StateIndex> = VecDeque::new();

    let state0 = states.push(seed.clone());
    interned.insert(seed, state0);
    queue.push_back(state0);

    while let Some(state_id) = queue.pop_front() {
        let items = states[state_id].clone();
        for symbol in symbols_after_dot(&items, grammar) {
            let target_items = goto(&items, symbol, grammar);
            if target_items.is_empty() {
                continue;
            }
            let target_id = match interned.get(&target_items) {
                Some(&existing) => existing,
                None => {
                    let new_id = states.push(target_items.clone());
                    interned.insert(target_items, new_id);
                    queue.push_back(new_id);
                    log::debug!("canonical collection: interned new state {new_id:?}");
                    new_id
                }
            };
            transitions.insert((state_id, symbol), target_id);
        }
    }

    CanonicalCollection {
        states,
        transitions,
    }
}

/// Builds the LR(0) canonical collection: state 0 is `closure({S' -> •S})`
/// with no lookaheads tracked.
pub fn build_lr0_collection(grammar: &Grammar) -> CanonicalCollection<Lr0ItemSet> {
    let augmented_production = ProductionIndex(0);
    let seed = closure_lr0(
        Lr0ItemSet::from([KernelItem::start(augmented_production)]),
        grammar,
    );
    build_collection(
        seed,
        symbols_after_dot_lr0,
        |items, symbol, grammar| goto_lr0(items, symbol, grammar),
        grammar,
    )
}

/// Builds the LR(1) canonical collection: state 0 is `closure({(S' -> •S,
/// {$})})`.
pub fn build_lr1_collection(
    grammar: &Grammar,
    first: &FirstSets,
) -> CanonicalCollection<Lr1ItemSet> {
    let augmented_production = ProductionIndex(0);
    let mut seed_map = Lr1ItemSet::new();
    seed_map.insert(
        KernelItem::start(augmented_production),
        std::collections::BTreeSet::from([Symbol::End]),
    );
    let seed = closure_lr1(seed_map, grammar, first);
    build_collection(
        seed,
        symbols_after_dot_lr1,
        |items, symbol, grammar| goto_lr1(items, symbol, grammar, first),
        grammar,
    )
}
