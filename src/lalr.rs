//! LALR(1) core-merge (spec §4.6).
//!
//! Collapses a full LR(1) canonical collection into LALR(1) states by
//! grouping states that share an LR(0) kernel and unioning their lookaheads.
//! Transcribed in meaning from
//! `examples/original_source/src/parsers/lalr1_parser.py::merge_states`, with
//! the consistency assertion from spec §9 ("LALR merge correctness") made
//! explicit as [`crate::error::TableError::InconsistentMerge`].

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::canonical::CanonicalCollection;
use crate::closure::Lr1ItemSet;
use crate::error::TableError;
use crate::index::{StateIndex, StateVec};
use crate::item::KernelItem;
use crate::symbol::Symbol;

/// The LR(0) kernel of an LR(1) item set: its set of `(production, dot)`
/// pairs, ignoring lookaheads — the grouping key for the merge (spec §4.6
/// step 1).
fn lr0_kernel(items: &Lr1ItemSet) -> BTreeSet<KernelItem> {
    items.keys().copied().collect()
}

/// Merges `collection` into its LALR(1) counterpart.
///
/// 1. Groups states by LR(0) kernel, assigning new dense ids in the order
///    groups are first encountered while scanning old states `0..N`.
/// 2. Each merged state's items are, per kernel, the union of lookaheads
///    across every contributing state.
/// 3. Transitions are rewritten through the old->new state map; if two old
///    states merged into the same new state disagree on where a symbol
///    transitions (post-rewrite), that is a bug in the canonical collection
///    (same LR(0) kernel must mean same outgoing transitions), reported as
///    [`TableError::InconsistentMerge`] rather than silently picking one.
pub fn merge_to_lalr(
    collection: &CanonicalCollection<Lr1ItemSet>,
) -> Result<CanonicalCollection<Lr1ItemSet>, TableError> {
    let mut group_of_kernel: BTreeMap<BTreeSet<KernelItem>, StateIndex> = BTreeMap::new();
    let mut old_to_new: StateVec<StateIndex> = StateVec::new();
    let mut merged_items: StateVec<Lr1ItemSet> = StateVec::new();

    for old_id in 0..collection.states.len() {
        let old_id = StateIndex(old_id);
        let kernel = lr0_kernel(&collection.states[old_id]);
        let new_id = *group_of_kernel.entry(kernel).or_insert_with(|| {
            let id = merged_items.push(Lr1ItemSet::new());
            id
        });
        old_to_new.push(new_id);

        let contributing = collection.states[old_id].clone();
        let target = &mut merged_items[new_id];
        for (kernel_item, lookahead) in contributing {
            target
                .entry(kernel_item)
                .or_insert_with(BTreeSet::new)
                .extend(lookahead);
        }
    }

    let mut merged_transitions: IndexMap<(StateIndex, Symbol), StateIndex> = IndexMap::new();
    for (&(old_from, symbol), &old_to) in &collection.transitions {
        let new_from = old_to_new[old_from];
        let new_to = old_to_new[old_to];
        match merged_transitions.get(&(new_from, symbol)) {
            Some(&existing) if existing != new_to => {
                let offending: Vec<StateIndex> = old_to_new
                    .iter_indexed()
                    .filter(|&(_, &new_id)| new_id == new_from)
                    .map(|(old_id, _)| old_id)
                    .collect();
                return Err(TableError::InconsistentMerge(offending));
            }
            _ => {
                merged_transitions.insert((new_from, symbol), new_to);
            }
        }
    }

    log::debug!(
        "LALR(1) merge: {} LR(1) states collapsed to {} states",
        collection.states.len(),
        merged_items.len()
    );

    Ok(CanonicalCollection {
        states: merged_items,
        transitions: merged_transitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::build_lr1_collection;
    use crate::first_follow::compute_first;
    use crate::grammar::Grammar;

    fn sc_asc_b_grammar() -> Grammar {
        let mut g = Grammar::build(
            &["a", "b", "c"],
            &["S", "A"],
            &[
                ("S", vec!["S", "c"]),
                ("S", vec!["A", "S", "c"]),
                ("S", vec!["b"]),
                ("A", vec!["a", "A"]),
                ("A", vec!["a"]),
            ],
            "S",
        )
        .unwrap();
        g.augment().unwrap();
        g
    }

    #[test]
    fn lalr_has_fewer_or_equal_states_than_lr1() {
        let g = sc_asc_b_grammar();
        let first = compute_first(&g);
        let lr1 = build_lr1_collection(&g, &first);
        let lalr = merge_to_lalr(&lr1).unwrap();
        assert!(lalr.states.len() <= lr1.states.len());
    }

    #[test]
    fn lalr_strictly_fewer_when_lr1_has_duplicate_kernels() {
        let g = sc_asc_b_grammar();
        let first = compute_first(&g);
        let lr1 = build_lr1_collection(&g, &first);

        let mut seen_kernels = std::collections::HashSet::new();
        let has_duplicate_kernel = lr1
            .states
            .iter()
            .map(lr0_kernel)
            .any(|k| !seen_kernels.insert(k));
        assert!(has_duplicate_kernel, "expected this grammar to split states in LR(1)");

        let lalr = merge_to_lalr(&lr1).unwrap();
        assert!(lalr.states.len() < lr1.states.len());
    }
}
