use std::collections::BTreeMap;

use crate::error::GrammarConflictError;
use crate::Grammar;

use super::first_follow::{FirstSets, FollowSets};
use super::grammar::{Production, Symbol};

/// A cell of the LL(1) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
    /// Expand the nonterminal with this production.
    Production(Production),
    /// Panic-mode anchor: drop the lookahead and keep the stack.
    Sync,
}

/// The LL(1) parsing table `M[nonterminal, lookahead]`. Lookaheads are
/// terminals or `$`. A missing cell is a hard parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTable {
    start_symbol: String,
    non_terminals: Vec<String>,
    terminals: Vec<Symbol>,
    rows: BTreeMap<String, BTreeMap<Symbol, TableEntry>>,
}

impl ParsingTable {
    /// Fills the table from the predict set of every production, then marks
    /// the remaining FOLLOW cells as [`TableEntry::Sync`].
    ///
    /// The predict set of `N -> α` is FIRST(α) without `ε`, plus FOLLOW(N)
    /// when α can vanish. A cell claimed by two productions is an error.
    pub fn build(
        grammar: &Grammar,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<Self, GrammarConflictError> {
        let mut rows: BTreeMap<String, BTreeMap<Symbol, TableEntry>> = BTreeMap::new();

        for nt in grammar.non_terminal_iter() {
            let empty = Default::default();
            let nt_follow = follow.get(&nt.name).unwrap_or(&empty);
            let mut claimed: BTreeMap<Symbol, usize> = BTreeMap::new();

            for (idx, production) in nt.productions.iter().enumerate() {
                let mut predict = first.first_of_body(&production.right);
                if predict.remove(&Symbol::Epsilon) {
                    predict.extend(nt_follow.iter().cloned());
                }

                for lookahead in predict {
                    match claimed.get(&lookahead) {
                        Some(&other) if other != idx => {
                            return Err(GrammarConflictError {
                                non_terminal: nt.name.clone(),
                                lookahead,
                                existing: nt.productions[other].clone(),
                                conflicting: production.clone(),
                            });
                        }
                        Some(_) => {}
                        None => {
                            claimed.insert(lookahead, idx);
                        }
                    }
                }
            }

            let mut row: BTreeMap<Symbol, TableEntry> = claimed
                .into_iter()
                .map(|(lookahead, idx)| {
                    (lookahead, TableEntry::Production(nt.productions[idx].clone()))
                })
                .collect();
            for lookahead in nt_follow {
                row.entry(lookahead.clone()).or_insert(TableEntry::Sync);
            }
            rows.insert(nt.name.clone(), row);
        }

        let table = Self {
            start_symbol: grammar.start_symbol().to_string(),
            non_terminals: grammar.non_terminal_iter().map(|nt| nt.name.clone()).collect(),
            terminals: grammar
                .terminal_iter()
                .map(|t| Symbol::Terminal(t.clone()))
                .chain(std::iter::once(Symbol::EndOfInput))
                .collect(),
            rows,
        };
        log::debug!(
            "LL(1) table built: {} productions, {} sync cells",
            table.iter().filter(|(_, _, e)| matches!(e, TableEntry::Production(_))).count(),
            table.iter().filter(|(_, _, e)| **e == TableEntry::Sync).count()
        );
        Ok(table)
    }

    pub fn get(&self, non_terminal: &str, lookahead: &Symbol) -> Option<&TableEntry> {
        self.rows.get(non_terminal)?.get(lookahead)
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    /// Row labels, in grammar order.
    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    /// Column labels: the grammar's terminals followed by `$`.
    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    pub fn row(&self, non_terminal: &str) -> Option<&BTreeMap<Symbol, TableEntry>> {
        self.rows.get(non_terminal)
    }

    /// All filled cells, row by row in grammar order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol, &TableEntry)> {
        self.non_terminals.iter().flat_map(move |nt| {
            self.rows
                .get(nt)
                .into_iter()
                .flat_map(move |row| row.iter().map(move |(t, e)| (nt.as_str(), t, e)))
        })
    }
}

impl Grammar {
    /// FIRST/FOLLOW and the LL(1) table of this grammar as it stands (no left
    /// factoring is applied here).
    pub fn generate_ll1_parsing_table(&self) -> Result<ParsingTable, GrammarConflictError> {
        let (first, follow) = self.calculate_first_follow();
        ParsingTable::build(self, &first, &follow)
    }
}
