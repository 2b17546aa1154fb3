//! The symbol model (spec §3: Symbol).
//!
//! A grammar symbol is either a terminal, a non-terminal, the reserved
//! end-of-input marker `$`, or the reserved empty-string marker `ε`. `ε` may
//! only appear on the right-hand side of a production (as the sole element
//! of an epsilon body); `$` may only appear in lookaheads and as the input
//! sentinel. Terminal and non-terminal names are interned once into a
//! [`SymbolTable`] so every later comparison is by [`SymbolIndex`], not by
//! string.
//!
//! Generalizes PunGy's compile-time `enum Symbol { Terminal(TokenType),
//! NonTerminal(NonTerminal) }` (one fixed calculator grammar) into a
//! runtime-built table, since grammars here are constructed from whatever
//! textual input the ingestion layer outside this core hands us (spec §6).

use indexmap::IndexSet;

use crate::error::GrammarError;
use crate::index::SymbolIndex;

/// Reserved end-of-input marker name.
pub const END_MARKER: &str = "$";
/// Reserved empty-string marker name.
pub const EMPTY_MARKER: &str = "ε";

/// A grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(SymbolIndex),
    NonTerminal(SymbolIndex),
    /// `$`, the end-of-input sentinel.
    End,
    /// `ε`, the empty production body marker.
    Empty,
}

impl Symbol {
    pub fn is_non_terminal(self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

/// Interns terminal and non-terminal names into dense [`SymbolIndex`]
/// namespaces, one per kind, and rejects the reserved names `$`/`ε` and
/// cross-kind duplicates (spec §3: "duplicates between terminals and
/// non-terminals are disallowed").
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    terminals: IndexSet<String>,
    non_terminals: IndexSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        self.check_name(name)?;
        let (idx, _) = self.terminals.insert_full(name.to_string());
        Ok(Symbol::Terminal(SymbolIndex(idx)))
    }

    pub fn declare_non_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        self.check_name(name)?;
        let (idx, _) = self.non_terminals.insert_full(name.to_string());
        Ok(Symbol::NonTerminal(SymbolIndex(idx)))
    }

    /// Inserts a non-terminal name without re-validating reservation/collision
    /// rules against the *other* namespace — used only by [`augment`] to add
    /// the generated `S'` name, which is synthesized to already avoid clashes.
    ///
    /// [`augment`]: crate::grammar::Grammar::augment
    pub(crate) fn force_declare_non_terminal(&mut self, name: &str) -> Symbol {
        let (idx, _) = self.non_terminals.insert_full(name.to_string());
        Symbol::NonTerminal(SymbolIndex(idx))
    }

    fn check_name(&self, name: &str) -> Result<(), GrammarError> {
        if name == END_MARKER || name == EMPTY_MARKER {
            return Err(GrammarError::ReservedName(name.to_string()));
        }
        if self.terminals.contains(name) || self.non_terminals.contains(name) {
            return Err(GrammarError::ReservedName(name.to_string()));
        }
        Ok(())
    }

    pub fn terminal_index(&self, name: &str) -> Option<Symbol> {
        self.terminals
            .get_index_of(name)
            .map(|i| Symbol::Terminal(SymbolIndex(i)))
    }

    pub fn non_terminal_index(&self, name: &str) -> Option<Symbol> {
        self.non_terminals
            .get_index_of(name)
            .map(|i| Symbol::NonTerminal(SymbolIndex(i)))
    }

    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        if name == END_MARKER {
            return Some(Symbol::End);
        }
        if name == EMPTY_MARKER {
            return Some(Symbol::Empty);
        }
        self.terminal_index(name)
            .or_else(|| self.non_terminal_index(name))
    }

    pub fn name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(i) => self
                .terminals
                .get_index(i.index())
                .expect("terminal index out of range"),
            Symbol::NonTerminal(i) => self
                .non_terminals
                .get_index(i.index())
                .expect("non-terminal index out of range"),
            Symbol::End => END_MARKER,
            Symbol::Empty => EMPTY_MARKER,
        }
    }

    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.terminals.len()).map(|i| Symbol::Terminal(SymbolIndex(i)))
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.non_terminals.len()).map(|i| Symbol::NonTerminal(SymbolIndex(i)))
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }
}
