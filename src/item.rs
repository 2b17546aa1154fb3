//! The item model (spec §3 Item, §4.4 edge cases).
//!
//! Transcribed in meaning from `examples/original_source/src/items/lr0_item.py`
//! and `lr1_item.py`: a kernel item is a production plus a dot position; an
//! LR(1) item additionally carries a non-empty lookahead set. Lookaheads are
//! kept in a [`BTreeSet`] so equality/hash of an [`Lr1Item`] is structural on
//! the set, never on insertion order (spec §3: "Lookaheads must be compared
//! as sets, not sequences").

use std::collections::BTreeSet;
use std::fmt;

use crate::grammar::Grammar;
use crate::index::ProductionIndex;
use crate::symbol::Symbol;

/// A production with a dot position: `(production_ref, dot_position)`,
/// `0 <= dot_position <= production.len()`. A production whose rhs is `[ε]`
/// has `len() == 0` (see [`crate::grammar::Production::len`]), so the only
/// valid dot position for it is 0, which is already a reduce position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelItem {
    pub production: ProductionIndex,
    pub dot: usize,
}

impl KernelItem {
    pub fn start(production: ProductionIndex) -> Self {
        Self { production, dot: 0 }
    }

    /// The symbol immediately after the dot, or `None` if the dot is at the
    /// end of the body (a reduce position).
    pub fn symbol_after_dot(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.productions[self.production].symbol_at(self.dot)
    }

    /// `true` iff the dot is at the end of the body — a reduce (or accept)
    /// position. An epsilon-body item is immediately at a reduce position.
    pub fn is_reduce_position(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.productions[self.production].len()
    }

    /// Advances the dot past the symbol currently after it, or `None` if
    /// already at a reduce position.
    pub fn advance(&self, grammar: &Grammar) -> Option<Self> {
        if self.is_reduce_position(grammar) {
            None
        } else {
            Some(Self {
                production: self.production,
                dot: self.dot + 1,
            })
        }
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> DisplayKernelItem<'g> {
        DisplayKernelItem {
            item: *self,
            grammar,
        }
    }
}

pub struct DisplayKernelItem<'g> {
    item: KernelItem,
    grammar: &'g Grammar,
}

impl fmt::Display for DisplayKernelItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let production = &self.grammar.productions[self.item.production];
        write!(f, "{} ->", self.grammar.display_symbol(production.lhs))?;
        if production.is_epsilon() {
            write!(f, " •")?;
            return Ok(());
        }
        for (i, &symbol) in production.rhs.iter().enumerate() {
            if i == self.item.dot {
                write!(f, " •")?;
            }
            write!(f, " {}", self.grammar.display_symbol(symbol))?;
        }
        if self.item.dot == production.rhs.len() {
            write!(f, " •")?;
        }
        Ok(())
    }
}

/// A kernel item annotated with a non-empty lookahead set (spec §3: "a
/// non-empty lookahead set ⊆ terminals ∪ {$}"). Equality/hash are structural
/// on `(kernel, lookahead-as-set)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr1Item {
    pub kernel: KernelItem,
    pub lookahead: BTreeSet<Symbol>,
}

impl Lr1Item {
    pub fn new(kernel: KernelItem, lookahead: BTreeSet<Symbol>) -> Self {
        debug_assert!(
            !lookahead.is_empty(),
            "LR(1) item lookahead set must be non-empty"
        );
        Self { kernel, lookahead }
    }

    /// Unions `other` into this item's lookahead set; returns `true` if the
    /// set grew (used by closure/LALR-merge fixpoint loops to detect change).
    pub fn union_lookahead(&mut self, other: &BTreeSet<Symbol>) -> bool {
        let before = self.lookahead.len();
        self.lookahead.extend(other.iter().copied());
        self.lookahead.len() > before
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> DisplayLr1Item<'_, 'g> {
        DisplayLr1Item { item: self, grammar }
    }
}

pub struct DisplayLr1Item<'a, 'g> {
    item: &'a Lr1Item,
    grammar: &'g Grammar,
}

impl fmt::Display for DisplayLr1Item<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {{", self.item.kernel.display(self.grammar))?;
        for (i, &symbol) in self.item.lookahead.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.grammar.display_symbol(symbol))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn toy_grammar() -> Grammar {
        Grammar::build(
            &["a"],
            &["S", "A"],
            &[("S", vec!["A"]), ("A", vec!["a"]), ("A", vec!["ε"])],
            "S",
        )
        .unwrap()
    }

    #[test]
    fn kernel_item_advance_and_reduce_position() {
        let g = toy_grammar();
        let item = KernelItem::start(crate::index::ProductionIndex(0));
        assert!(!item.is_reduce_position(&g));
        let advanced = item.advance(&g).unwrap();
        assert!(advanced.is_reduce_position(&g));
        assert!(advanced.advance(&g).is_none());
    }

    #[test]
    fn epsilon_production_is_immediately_reduce_position() {
        let g = toy_grammar();
        let item = KernelItem::start(crate::index::ProductionIndex(2));
        assert!(item.is_reduce_position(&g));
        assert!(item.advance(&g).is_none());
    }

    #[test]
    fn lr1_item_equality_ignores_lookahead_order() {
        let g = toy_grammar();
        let kernel = KernelItem::start(crate::index::ProductionIndex(0));
        let a = Lr1Item::new(
            kernel,
            BTreeSet::from([Symbol::End, g.symbols.terminal_index("a").unwrap()]),
        );
        let b = Lr1Item::new(
            kernel,
            BTreeSet::from([g.symbols.terminal_index("a").unwrap(), Symbol::End]),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn union_lookahead_reports_growth() {
        let g = toy_grammar();
        let kernel = KernelItem::start(crate::index::ProductionIndex(0));
        let mut item = Lr1Item::new(kernel, BTreeSet::from([Symbol::End]));
        assert!(!item.union_lookahead(&BTreeSet::from([Symbol::End])));
        let a = g.symbols.terminal_index("a").unwrap();
        assert!(item.union_lookahead(&BTreeSet::from([a])));
    }
}
