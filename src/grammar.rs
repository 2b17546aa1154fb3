//! Grammar definition: productions, start symbol, augmentation (spec §3
//! Grammar/Production, §4.1).
//!
//! Semantics transcribed from
//! `examples/original_source/src/grammars/grammar.py` (`augment_grammar`,
//! `number_productions`, `get_production_number`); the Rust struct shape
//! (dense `ProductionIndex` ids, an interned [`SymbolTable`]) generalizes
//! PunGy's `src/grammar.rs::Production` from one fixed grammar to grammars
//! built at runtime from an external ingestion layer (spec §6).

use indexmap::IndexMap;
use std::fmt;

use crate::error::GrammarError;
use crate::index::{ProductionIndex, ProductionVec};
use crate::symbol::{Symbol, SymbolTable};

/// A single production `lhs -> rhs`. An epsilon body is represented as the
/// one-element sequence `[Symbol::Empty]`; spec §3/§9 require this to behave
/// as length-0 everywhere dot positions and reduce pop-counts are computed,
/// which [`Production::len`] centralizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: ProductionIndex,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        matches!(self.rhs.as_slice(), [Symbol::Empty])
    }

    /// Length of the body for item/dot purposes: 0 for an epsilon body,
    /// `rhs.len()` otherwise.
    pub fn len(&self) -> usize {
        if self.is_epsilon() {
            0
        } else {
            self.rhs.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The symbol at body position `i`, or `None` at/after the end. Correctly
    /// yields `None` at position 0 for an epsilon body (there is no symbol to
    /// advance the dot past).
    pub fn symbol_at(&self, i: usize) -> Option<Symbol> {
        if self.is_epsilon() {
            None
        } else {
            self.rhs.get(i).copied()
        }
    }
}

/// A context-free grammar: terminals, non-terminals (via [`SymbolTable`]),
/// productions, and a start symbol. Invariants (spec §3): every symbol in
/// any rhs is declared; `start_symbol` is a declared non-terminal; after
/// [`Grammar::augment`], `augmented_start_symbol` occurs on exactly one lhs
/// (production 0) and nowhere else; `production_id` is a bijection between
/// `(lhs, rhs)` pairs and `0..P-1`.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: SymbolTable,
    pub productions: ProductionVec<Production>,
    pub start_symbol: Symbol,
    pub augmented_start_symbol: Option<Symbol>,
    production_lookup: IndexMap<(Symbol, Vec<Symbol>), ProductionIndex>,
}

impl Grammar {
    /// Builds a grammar from already-tokenized productions (spec §6:
    /// `build_grammar`). `productions` is `(lhs_name, rhs_names)`; an
    /// `rhs_names` of `["ε"]` encodes an empty body.
    pub fn build(
        terminal_names: &[&str],
        non_terminal_names: &[&str],
        productions: &[(&str, Vec<&str>)],
        start_symbol_name: &str,
    ) -> Result<Self, GrammarError> {
        let mut symbols = SymbolTable::new();
        for name in terminal_names {
            symbols.declare_terminal(name)?;
        }
        for name in non_terminal_names {
            symbols.declare_non_terminal(name)?;
        }

        let start_symbol = match symbols.non_terminal_index(start_symbol_name) {
            Some(sym) => sym,
            None => {
                return Err(GrammarError::UndeclaredStartSymbol(
                    start_symbol_name.to_string(),
                ))
            }
        };

        let mut built = ProductionVec::new();
        let mut production_lookup = IndexMap::new();
        for (lhs_name, rhs_names) in productions {
            let lhs = symbols
                .non_terminal_index(lhs_name)
                .ok_or_else(|| GrammarError::UndeclaredSymbol(lhs_name.to_string()))?;

            let rhs = Self::resolve_rhs(&symbols, rhs_names)?;

            let id = built.push(Production {
                id: ProductionIndex(0), // fixed up below
                lhs,
                rhs: rhs.clone(),
            });
            built[id].id = id;
            production_lookup.insert((lhs, rhs), id);
        }

        Ok(Self {
            symbols,
            productions: built,
            start_symbol,
            augmented_start_symbol: None,
            production_lookup,
        })
    }

    fn resolve_rhs(symbols: &SymbolTable, rhs_names: &[&str]) -> Result<Vec<Symbol>, GrammarError> {
        if rhs_names == ["ε"] {
            return Ok(vec![Symbol::Empty]);
        }
        rhs_names
            .iter()
            .map(|name| match symbols.resolve(name) {
                Some(Symbol::Terminal(i)) => Ok(Symbol::Terminal(i)),
                Some(Symbol::NonTerminal(i)) => Ok(Symbol::NonTerminal(i)),
                // `$` and `ε` are not valid mid-body symbols outside the
                // single-element epsilon-body case handled above.
                _ => Err(GrammarError::UndeclaredSymbol(name.to_string())),
            })
            .collect()
    }

    /// Adds the augmented start production `S' -> S` at production index 0
    /// and renumbers every production. Idempotent-guarded: a second call
    /// fails with [`GrammarError::AlreadyAugmented`].
    ///
    /// `S'` is `start_symbol ++ "'"`; if that collides with an already
    /// declared name, additional primes are appended until unique (spec
    /// §4.1).
    pub fn augment(&mut self) -> Result<(), GrammarError> {
        if self.augmented_start_symbol.is_some() {
            return Err(GrammarError::AlreadyAugmented);
        }

        let start_name = self.symbols.name(self.start_symbol).to_string();
        let mut candidate = format!("{start_name}'");
        while self.symbols.resolve(&candidate).is_some() {
            candidate.push('\'');
        }
        let augmented_symbol = self.symbols.force_declare_non_terminal(&candidate);

        let mut productions: Vec<Production> = self.productions.iter().cloned().collect();
        productions.insert(
            0,
            Production {
                id: ProductionIndex(0),
                lhs: augmented_symbol,
                rhs: vec![self.start_symbol],
            },
        );

        self.productions = ProductionVec::new();
        self.production_lookup.clear();
        for p in productions {
            let lhs = p.lhs;
            let rhs = p.rhs.clone();
            let id = self.productions.push(p);
            self.productions[id].id = id;
            self.production_lookup.insert((lhs, rhs), id);
        }

        self.augmented_start_symbol = Some(augmented_symbol);
        log::debug!(
            "augmented grammar with {} -> {}",
            candidate,
            start_name
        );
        Ok(())
    }

    pub fn production_id(&self, lhs: Symbol, rhs: &[Symbol]) -> Option<ProductionIndex> {
        self.production_lookup.get(&(lhs, rhs.to_vec())).copied()
    }

    pub fn productions_for(&self, lhs: Symbol) -> impl Iterator<Item = &Production> {
        self.productions.iter().filter(move |p| p.lhs == lhs)
    }

    pub fn display_symbol(&self, symbol: Symbol) -> &str {
        self.symbols.name(symbol)
    }

    /// `true` once [`Grammar::augment`] has run.
    pub fn is_augmented(&self) -> bool {
        self.augmented_start_symbol.is_some()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Symbol names aren't available without the owning table; callers
        // that need readable output should use `Grammar::display_symbol`
        // alongside this, or `Parser`'s item `Display` impls which do have
        // table access.
        write!(f, "production #{}", self.id.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ProductionIndex;

    fn toy_grammar() -> Grammar {
        Grammar::build(
            &["a", "b"],
            &["S", "A"],
            &[("A", vec!["a"]), ("S", vec!["A", "b"]), ("A", vec!["ε"])],
            "S",
        )
        .unwrap()
    }

    #[test]
    fn augment_inserts_production_zero_and_renumbers() {
        let mut g = toy_grammar();
        assert!(!g.is_augmented());
        g.augment().unwrap();
        assert!(g.is_augmented());

        let p0 = &g.productions[ProductionIndex(0)];
        assert_eq!(p0.lhs, g.augmented_start_symbol.unwrap());
        assert_eq!(p0.rhs, vec![g.start_symbol]);

        for (i, p) in g.productions.iter().enumerate() {
            assert_eq!(p.id.index(), i);
        }
    }

    #[test]
    fn augment_twice_fails() {
        let mut g = toy_grammar();
        g.augment().unwrap();
        assert_eq!(g.augment().unwrap_err(), GrammarError::AlreadyAugmented);
    }

    #[test]
    fn augmented_name_avoids_collision() {
        // Start symbol "S" collides with an already-declared "S'".
        let mut g = Grammar::build(&["a"], &["S", "S'"], &[("S", vec!["a"])], "S").unwrap();
        g.augment().unwrap();
        let augmented_name = g.display_symbol(g.augmented_start_symbol.unwrap());
        assert_eq!(augmented_name, "S''");
    }

    #[test]
    fn epsilon_production_has_zero_length() {
        let g = toy_grammar();
        let epsilon_prod = g
            .productions
            .iter()
            .find(|p| p.is_epsilon())
            .expect("grammar has an epsilon production");
        assert_eq!(epsilon_prod.len(), 0);
        assert!(epsilon_prod.is_empty());
        assert_eq!(epsilon_prod.symbol_at(0), None);
    }

    #[test]
    fn undeclared_symbol_in_rhs_is_rejected() {
        let err = Grammar::build(&["a"], &["S"], &[("S", vec!["a", "z"])], "S").unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredSymbol("z".to_string()));
    }

    #[test]
    fn undeclared_start_symbol_is_rejected() {
        let err = Grammar::build(&["a"], &["S"], &[("S", vec!["a"])], "Q").unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredStartSymbol("Q".to_string()));
    }
}
