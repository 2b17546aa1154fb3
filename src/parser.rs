//! The `Parser` facade (spec §6) and the parse driver / stack machine
//! (spec §4.8).
//!
//! `Parser::build` is `build_parser` from spec §6: it augments the grammar,
//! computes FIRST (and FOLLOW for SLR(1)), builds the canonical collection
//! for the requested [`Discipline`] (merging to LALR(1) when asked), and
//! constructs the ACTION/GOTO tables. The driver in [`Parser::parse`]
//! mirrors `examples/original_source/src/parsers/lr_parser.py::parse`'s
//! configuration-log loop, but returns a [`ParseOutcome`] instead of
//! printing and returning `None`.

use crate::canonical::{build_lr0_collection, build_lr1_collection, CanonicalCollection};
use crate::closure::{Lr0ItemSet, Lr1ItemSet};
use crate::error::{BuildError, ParseError, TableConflict};
use crate::first_follow::{compute_first, compute_follow, FirstSets, FollowSets};
use crate::grammar::Grammar;
use crate::index::{ProductionIndex, StateIndex};
use crate::lalr::merge_to_lalr;
use crate::symbol::Symbol;
use crate::table::{
    construct_table_from_kernel_sets, construct_table_from_lr1_sets, Action, Discipline,
    ParseTable,
};

/// The canonical collection backing a built parser, in whichever shape its
/// discipline produces (spec §3 "Item set"; spec §6 `item_sets()`).
#[derive(Debug, Clone)]
pub enum ItemSets {
    /// LR(0)/SLR(1): kernel-only item sets, no per-item lookahead.
    KernelOnly(CanonicalCollection<Lr0ItemSet>),
    /// LALR(1)/LR(1): item sets annotated with lookahead sets.
    WithLookahead(CanonicalCollection<Lr1ItemSet>),
}

impl ItemSets {
    pub fn state_count(&self) -> usize {
        match self {
            ItemSets::KernelOnly(c) => c.states.len(),
            ItemSets::WithLookahead(c) => c.states.len(),
        }
    }
}

/// A built parser: grammar, FIRST/FOLLOW, canonical collection, and
/// ACTION/GOTO tables for one [`Discipline`] (spec §6).
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    discipline: Discipline,
    first: FirstSets,
    follow: Option<FollowSets>,
    item_sets: ItemSets,
    table: ParseTable,
}

impl Parser {
    /// `build_parser(grammar, discipline)` (spec §6): augments `grammar`,
    /// computes FIRST (and FOLLOW when `discipline` is [`Discipline::Slr1`]),
    /// builds the canonical collection, and constructs ACTION/GOTO. Table
    /// conflicts do not fail this call — they accumulate on the returned
    /// parser, queryable via [`Parser::conflicts`]. Fails only on grammar
    /// augmentation failure or an LALR(1) merge inconsistency.
    pub fn build(mut grammar: Grammar, discipline: Discipline) -> Result<Self, BuildError> {
        if !grammar.is_augmented() {
            grammar.augment()?;
        }

        let first = compute_first(&grammar);
        let follow = if discipline == Discipline::Slr1 {
            Some(compute_follow(&grammar, &first))
        } else {
            None
        };

        let (item_sets, table) = match discipline {
            Discipline::Lr0 => {
                let collection = build_lr0_collection(&grammar);
                let table = construct_table_from_kernel_sets(&grammar, &collection, None);
                (ItemSets::KernelOnly(collection), table)
            }
            Discipline::Slr1 => {
                let collection = build_lr0_collection(&grammar);
                let table =
                    construct_table_from_kernel_sets(&grammar, &collection, follow.as_ref());
                (ItemSets::KernelOnly(collection), table)
            }
            Discipline::Lr1 => {
                let collection = build_lr1_collection(&grammar, &first);
                let table = construct_table_from_lr1_sets(&grammar, &collection);
                (ItemSets::WithLookahead(collection), table)
            }
            Discipline::Lalr1 => {
                let lr1_collection = build_lr1_collection(&grammar, &first);
                let collection = merge_to_lalr(&lr1_collection)?;
                let table = construct_table_from_lr1_sets(&grammar, &collection);
                (ItemSets::WithLookahead(collection), table)
            }
        };

        log::debug!(
            "built {} parser: {} states, {} conflicts",
            discipline.name(),
            item_sets.state_count(),
            table.conflicts.len()
        );

        Ok(Self {
            grammar,
            discipline,
            first,
            follow,
            item_sets,
            table,
        })
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// `parser.augmented_productions()` (spec §6): `(id, lhs, rhs)` for
    /// every production after augmentation, production 0 first.
    pub fn augmented_productions(&self) -> Vec<(ProductionIndex, Symbol, Vec<Symbol>)> {
        self.grammar
            .productions
            .iter()
            .map(|p| (p.id, p.lhs, p.rhs.clone()))
            .collect()
    }

    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    /// `parser.follow()` (spec §6). Populated only for SLR(1)-built parsers;
    /// other disciplines don't require it (spec §3 lifecycle: "FOLLOW
    /// additionally before SLR(1) table construction").
    pub fn follow(&self) -> Option<&FollowSets> {
        self.follow.as_ref()
    }

    pub fn item_sets(&self) -> &ItemSets {
        &self.item_sets
    }

    pub fn action_table(&self) -> &indexmap::IndexMap<(StateIndex, Symbol), Action> {
        &self.table.action
    }

    pub fn goto_table(&self) -> &indexmap::IndexMap<(StateIndex, Symbol), StateIndex> {
        &self.table.goto
    }

    pub fn conflicts(&self) -> &[TableConflict] {
        &self.table.conflicts
    }

    /// `parser.parse(tokens)` (spec §4.8/§6): runs the shift/reduce stack
    /// machine over `tokens` (terminal symbols, `$` appended internally),
    /// returning the full configuration log with a success flag on the
    /// final entry. Deterministic: identical `tokens` always produce an
    /// identical [`ParseOutcome`] (spec §8).
    pub fn parse(&self, tokens: &[Symbol]) -> ParseOutcome {
        let mut stack: Vec<StateIndex> = vec![StateIndex(0)];
        let mut input: Vec<Symbol> = tokens.to_vec();
        input.push(Symbol::End);
        let mut position = 0usize;
        let mut configurations = Vec::new();

        loop {
            let state = *stack.last().expect("parse stack is never empty");
            let lookahead = input[position];
            let remaining = input[position..].to_vec();

            let looked_up = self.table.action.get(&(state, lookahead)).copied();
            log::trace!(
                "parse: state {}, lookahead {}, action {:?}",
                state.index(),
                self.grammar.display_symbol(lookahead),
                looked_up
            );

            let Some(action) = looked_up else {
                let error = ParseError::NoAction {
                    state,
                    token: self.grammar.display_symbol(lookahead).to_string(),
                };
                configurations.push(Configuration {
                    stack: stack.clone(),
                    remaining_tokens: remaining,
                    step: Step::Failed(error),
                });
                return ParseOutcome {
                    configurations,
                    success: false,
                };
            };

            match action {
                Action::Shift(target) => {
                    configurations.push(Configuration {
                        stack: stack.clone(),
                        remaining_tokens: remaining,
                        step: Step::Shift(target),
                    });
                    stack.push(target);
                    position += 1;
                }
                Action::Reduce(production_id) => {
                    let production = &self.grammar.productions[production_id];
                    let lhs = production.lhs;
                    let pop_count = production.len();

                    configurations.push(Configuration {
                        stack: stack.clone(),
                        remaining_tokens: remaining,
                        step: Step::Reduce {
                            production: production_id,
                            lhs,
                            pop_count,
                        },
                    });

                    let new_len = stack.len() - pop_count;
                    stack.truncate(new_len);
                    let top = *stack.last().expect("parse stack is never empty");

                    match self.table.goto.get(&(top, lhs)).copied() {
                        Some(next) => stack.push(next),
                        None => {
                            let error = ParseError::MissingGoto {
                                state: top,
                                non_terminal: self.grammar.display_symbol(lhs).to_string(),
                                production: production_id,
                            };
                            configurations.push(Configuration {
                                stack: stack.clone(),
                                remaining_tokens: input[position..].to_vec(),
                                step: Step::Failed(error),
                            });
                            return ParseOutcome {
                                configurations,
                                success: false,
                            };
                        }
                    }
                }
                Action::Accept => {
                    configurations.push(Configuration {
                        stack: stack.clone(),
                        remaining_tokens: remaining,
                        step: Step::Accept,
                    });
                    return ParseOutcome {
                        configurations,
                        success: true,
                    };
                }
            }
        }
    }
}

/// One recorded step of the parse driver (spec §4.8 step 2: "Record a
/// configuration `(stack_snapshot, remaining_tokens, action)`").
#[derive(Debug, Clone)]
pub struct Configuration {
    pub stack: Vec<StateIndex>,
    pub remaining_tokens: Vec<Symbol>,
    pub step: Step,
}

/// The action dispatched (or failure encountered) for a [`Configuration`].
#[derive(Debug, Clone)]
pub enum Step {
    Shift(StateIndex),
    Reduce {
        production: ProductionIndex,
        lhs: Symbol,
        pop_count: usize,
    },
    Accept,
    Failed(ParseError),
}

/// The full result of [`Parser::parse`]: every configuration visited, plus
/// whether the final one was `accept`.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub configurations: Vec<Configuration>,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_grammar() -> Grammar {
        Grammar::build(
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
        .unwrap()
    }

    fn tok(grammar: &Grammar, name: &str) -> Symbol {
        grammar.symbols.terminal_index(name).unwrap()
    }

    #[test]
    fn slr1_parses_id_plus_id() {
        let g = expr_grammar();
        let parser = Parser::build(g, Discipline::Slr1).unwrap();
        let grammar = parser.grammar();
        let tokens = [
            tok(grammar, "id"),
            tok(grammar, "+"),
            tok(grammar, "id"),
        ];
        let outcome = parser.parse(&tokens);
        assert!(outcome.success);
        assert!(outcome.configurations.len() > 5);
        assert!(matches!(
            outcome.configurations.last().unwrap().step,
            Step::Accept
        ));
    }

    #[test]
    fn lr0_reduces_a_before_s_on_ab_grammar() {
        // A -> a; S -> Ab
        let g = Grammar::build(
            &["a", "b"],
            &["S", "A"],
            &[("A", vec!["a"]), ("S", vec!["A", "b"])],
            "S",
        )
        .unwrap();
        let parser = Parser::build(g, Discipline::Lr0).unwrap();
        let grammar = parser.grammar();
        let tokens = [tok(grammar, "a"), tok(grammar, "b")];
        let outcome = parser.parse(&tokens);
        assert!(outcome.success);

        let reduce_positions: Vec<usize> = outcome
            .configurations
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c.step, Step::Reduce { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(reduce_positions.len(), 2);
        assert!(reduce_positions[0] < reduce_positions[1]);
    }

    #[test]
    fn lalr1_rejects_abb_on_sc_asc_b_grammar() {
        // S -> Sc | ASc | b; A -> aA | a (spec §8 scenario 5).
        let g = Grammar::build(
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
        let parser = Parser::build(g, Discipline::Lalr1).unwrap();
        let grammar = parser.grammar();
        let tokens = [tok(grammar, "a"), tok(grammar, "b"), tok(grammar, "b")];
        let outcome = parser.parse(&tokens);
        assert!(!outcome.success);
        assert!(!matches!(
            outcome.configurations.last().unwrap().step,
            Step::Accept
        ));
    }

    #[test]
    fn parse_is_deterministic() {
        let g = expr_grammar();
        let parser = Parser::build(g, Discipline::Lr1).unwrap();
        let grammar = parser.grammar();
        let tokens = [
            tok(grammar, "id"),
            tok(grammar, "*"),
            tok(grammar, "id"),
        ];
        let first_run = parser.parse(&tokens);
        let second_run = parser.parse(&tokens);
        assert_eq!(first_run.success, second_run.success);
        assert_eq!(
            first_run.configurations.len(),
            second_run.configurations.len()
        );
    }

    #[test]
    fn empty_input_accepted_iff_start_derives_epsilon() {
        // S -> ε
        let g = Grammar::build(&[], &["S"], &[("S", vec!["ε"])], "S").unwrap();
        let parser = Parser::build(g, Discipline::Lr1).unwrap();
        let outcome = parser.parse(&[]);
        assert!(outcome.success);
    }
}
