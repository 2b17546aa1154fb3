//! Core symbolic engine for an LR-family parser generator.
//!
//! Given a context-free grammar, computes FIRST/FOLLOW sets, constructs the
//! canonical collection of items for one of four parsing disciplines
//! (LR(0), SLR(1), LALR(1), LR(1)), builds the resulting ACTION/GOTO
//! tables, and drives a bottom-up shift/reduce parse of a token sequence
//! against those tables.
//!
//! The interactive UI layer, tabular rendering, free-form grammar-text
//! parsing, and persistence are external collaborators — this crate exposes
//! the programmatic surface they sit on top of ([`Grammar::build`],
//! [`Parser::build`], and the accessors on [`Parser`]).
//!
//! ```
//! use lr_core::grammar::Grammar;
//! use lr_core::parser::Parser;
//! use lr_core::table::Discipline;
//!
//! let grammar = Grammar::build(
//!     &["+", "*", "(", ")", "id"],
//!     &["E", "T", "F"],
//!     &[
//!         ("E", vec!["E", "+", "T"]),
//!         ("E", vec!["T"]),
//!         ("T", vec!["T", "*", "F"]),
//!         ("T", vec!["F"]),
//!         ("F", vec!["(", "E", ")"]),
//!         ("F", vec!["id"]),
//!     ],
//!     "E",
//! ).unwrap();
//!
//! let parser = Parser::build(grammar, Discipline::Slr1).unwrap();
//! assert!(parser.conflicts().is_empty());
//! ```

pub mod canonical;
pub mod closure;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod index;
pub mod item;
pub mod lalr;
pub mod parser;
pub mod symbol;
pub mod table;
