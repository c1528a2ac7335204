use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::MalformedGrammarError;

use super::{is_epsilon_token, END_MARK, EPSILON};

/// A grammar symbol.
///
/// Ordering is derived so that sets of symbols iterate deterministically:
/// terminals first, then nonterminals, then `ε`, then `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    Epsilon,
    EndOfInput,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndOfInput => END_MARK,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One alternative of a nonterminal. An empty body is the ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub left: String,
    pub right: Vec<Symbol>,
}

impl Production {
    /// `Symbol::Epsilon` entries are dropped from the body: ε is the empty
    /// string wherever it appears.
    pub fn new(left: impl Into<String>, right: Vec<Symbol>) -> Self {
        Self {
            left: left.into(),
            right: right.into_iter().filter(|s| *s != Symbol::Epsilon).collect(),
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }

    /// Body symbol names, with `ε` standing in for the empty body.
    pub fn right_names(&self) -> Vec<&str> {
        if self.right.is_empty() {
            vec![EPSILON]
        } else {
            self.right.iter().map(|s| s.name()).collect()
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right_names().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Production>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

/// A context-free grammar. Immutable once built: transformations such as
/// left factoring return a new `Grammar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    non_terminals: Vec<NonTerminal>,
    symbol_table: HashMap<String, usize>,
    terminals: Vec<String>,
    start_symbol: usize,
}

impl Grammar {
    /// Builds a grammar from `(left-hand side, body)` pairs with explicitly
    /// tagged symbols. Productions keep their declared order per nonterminal.
    pub fn new<L, I>(start_symbol: &str, rules: I) -> Result<Self, MalformedGrammarError>
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, Vec<Symbol>)>,
    {
        let mut non_terminals: Vec<NonTerminal> = Vec::new();
        let mut symbol_table: HashMap<String, usize> = HashMap::new();

        for (left, right) in rules {
            let left: String = left.into();
            if left == END_MARK || is_epsilon_token(&left) {
                return Err(MalformedGrammarError::ReservedSymbol {
                    name: left.clone(),
                    left,
                });
            }
            let idx = match symbol_table.get(&left) {
                Some(&idx) => idx,
                None => {
                    let idx = non_terminals.len();
                    non_terminals.push(NonTerminal::new(idx, left.clone()));
                    symbol_table.insert(left.clone(), idx);
                    idx
                }
            };
            non_terminals[idx]
                .productions
                .push(Production::new(left, right));
        }

        let start_symbol = symbol_table
            .get(start_symbol)
            .copied()
            .ok_or_else(|| MalformedGrammarError::UndefinedStartSymbol(start_symbol.to_string()))?;

        let mut terminals: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for production in non_terminals.iter().flat_map(|nt| nt.productions.iter()) {
            for symbol in &production.right {
                match symbol {
                    Symbol::NonTerminal(name) if !symbol_table.contains_key(name) => {
                        return Err(MalformedGrammarError::UndefinedNonTerminal {
                            name: name.clone(),
                            left: production.left.clone(),
                        });
                    }
                    Symbol::Terminal(name) if symbol_table.contains_key(name) => {
                        return Err(MalformedGrammarError::SymbolKindClash { name: name.clone() });
                    }
                    Symbol::Terminal(name) if name == END_MARK || is_epsilon_token(name) => {
                        return Err(MalformedGrammarError::ReservedSymbol {
                            name: name.clone(),
                            left: production.left.clone(),
                        });
                    }
                    Symbol::EndOfInput => {
                        return Err(MalformedGrammarError::ReservedSymbol {
                            name: END_MARK.to_string(),
                            left: production.left.clone(),
                        });
                    }
                    Symbol::Terminal(name) => {
                        if seen.insert(name.as_str()) {
                            terminals.push(name.clone());
                        }
                    }
                    Symbol::NonTerminal(_) | Symbol::Epsilon => {}
                }
            }
        }

        Ok(Self {
            non_terminals,
            symbol_table,
            terminals,
            start_symbol,
        })
    }

    /// Builds a grammar from `(left-hand side, body tokens)` pairs.
    ///
    /// A token naming any left-hand side is a nonterminal, `ε`/`ϵ`/`epsilon`
    /// is the empty body and `$` is the end marker (rejected). Every other
    /// token is a terminal.
    pub fn from_rules<L, B, T, I>(start_symbol: &str, rules: I) -> Result<Self, MalformedGrammarError>
    where
        L: Into<String>,
        B: IntoIterator<Item = T>,
        T: AsRef<str>,
        I: IntoIterator<Item = (L, B)>,
    {
        let raw: Vec<(String, Vec<String>)> = rules
            .into_iter()
            .map(|(left, body)| {
                (
                    left.into(),
                    body.into_iter().map(|t| t.as_ref().to_string()).collect(),
                )
            })
            .collect();
        let lefts: HashSet<&str> = raw.iter().map(|(left, _)| left.as_str()).collect();

        let classified: Vec<(String, Vec<Symbol>)> = raw
            .iter()
            .map(|(left, body)| {
                let symbols = body
                    .iter()
                    .map(|token| {
                        if is_epsilon_token(token) {
                            Symbol::Epsilon
                        } else if token == END_MARK {
                            Symbol::EndOfInput
                        } else if lefts.contains(token.as_str()) {
                            Symbol::NonTerminal(token.clone())
                        } else {
                            Symbol::Terminal(token.clone())
                        }
                    })
                    .collect();
                (left.clone(), symbols)
            })
            .collect();

        Self::new(start_symbol, classified)
    }

    /// Reassembles a grammar from already validated parts. Used by grammar
    /// transformations, which only introduce nonterminals they also define.
    pub(crate) fn from_parts(
        non_terminals: Vec<(String, Vec<Production>)>,
        start_symbol: &str,
        terminals: Vec<String>,
    ) -> Self {
        let non_terminals: Vec<NonTerminal> = non_terminals
            .into_iter()
            .enumerate()
            .map(|(index, (name, productions))| NonTerminal {
                index,
                name,
                productions,
            })
            .collect();
        let symbol_table: HashMap<String, usize> = non_terminals
            .iter()
            .map(|nt| (nt.name.clone(), nt.index))
            .collect();
        let start_symbol = symbol_table.get(start_symbol).copied().unwrap_or(0);
        Self {
            non_terminals,
            symbol_table,
            terminals,
            start_symbol,
        }
    }

    pub fn start_symbol(&self) -> &str {
        self.non_terminals[self.start_symbol].name.as_str()
    }

    /// Terminals in order of first appearance. `$` is not included.
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.terminals.iter()
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.iter().any(|t| t == name)
    }

    /// Nonterminals in declaration order.
    pub fn non_terminals(&self) -> &[NonTerminal] {
        &self.non_terminals
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals.iter()
    }

    pub fn non_terminal(&self, name: &str) -> Option<&NonTerminal> {
        self.symbol_table.get(name).map(|&idx| &self.non_terminals[idx])
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.symbol_table.contains_key(name)
    }

    /// Productions of `name` in declared order; empty for unknown names.
    pub fn productions(&self, name: &str) -> &[Production] {
        self.non_terminal(name)
            .map(|nt| nt.productions.as_slice())
            .unwrap_or(&[])
    }

    pub fn production_iter(&self) -> impl Iterator<Item = &Production> {
        self.non_terminals.iter().flat_map(|nt| nt.productions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> Symbol {
        Symbol::terminal(name)
    }

    fn n(name: &str) -> Symbol {
        Symbol::non_terminal(name)
    }

    #[test]
    fn keeps_declared_order() {
        let g = Grammar::new(
            "S",
            vec![
                ("S", vec![n("A"), t("b")]),
                ("A", vec![t("a")]),
                ("S", vec![t("c")]),
                ("A", vec![]),
            ],
        )
        .unwrap();

        assert_eq!(g.start_symbol(), "S");
        assert_eq!(
            g.non_terminal_iter().map(|nt| nt.name.as_str()).collect::<Vec<_>>(),
            vec!["S", "A"]
        );
        assert_eq!(g.terminals(), &["b", "c", "a"]);
        assert_eq!(g.productions("S")[1].right, vec![t("c")]);
        assert!(g.productions("A")[1].is_epsilon());
        assert!(g.is_non_terminal("A"));
        assert!(!g.is_non_terminal("a"));
        assert!(g.productions("X").is_empty());
    }

    #[test]
    fn epsilon_symbols_are_dropped_from_bodies() {
        let g = Grammar::new("S", vec![("S", vec![Symbol::Epsilon])]).unwrap();
        assert!(g.productions("S")[0].is_epsilon());
        assert_eq!(g.productions("S")[0].to_string(), "S -> ε");
    }

    #[test]
    fn undefined_non_terminal() {
        let err = Grammar::new("S", vec![("S", vec![n("A")])]).unwrap_err();
        assert_eq!(
            err,
            MalformedGrammarError::UndefinedNonTerminal {
                name: "A".to_string(),
                left: "S".to_string()
            }
        );
    }

    #[test]
    fn undefined_start_symbol() {
        let err = Grammar::new("E", vec![("S", vec![t("a")])]).unwrap_err();
        assert_eq!(err, MalformedGrammarError::UndefinedStartSymbol("E".to_string()));

        let empty: Vec<(String, Vec<Symbol>)> = Vec::new();
        assert!(matches!(
            Grammar::new("S", empty),
            Err(MalformedGrammarError::UndefinedStartSymbol(_))
        ));
    }

    #[test]
    fn end_marker_in_body() {
        let err = Grammar::new("S", vec![("S", vec![t("a"), Symbol::EndOfInput])]).unwrap_err();
        assert!(matches!(err, MalformedGrammarError::ReservedSymbol { .. }));
    }

    #[test]
    fn terminal_shadowing_non_terminal() {
        let err = Grammar::new("S", vec![("S", vec![t("S")])]).unwrap_err();
        assert_eq!(
            err,
            MalformedGrammarError::SymbolKindClash {
                name: "S".to_string()
            }
        );
    }

    #[test]
    fn from_rules_classifies_tokens() {
        let g = Grammar::from_rules(
            "E",
            vec![
                ("E", vec!["T", "E'"]),
                ("E'", vec!["+", "T", "E'"]),
                ("E'", vec!["ε"]),
                ("T", vec!["i"]),
            ],
        )
        .unwrap();

        assert_eq!(g.productions("E")[0].right, vec![n("T"), n("E'")]);
        assert_eq!(g.productions("E'")[0].right, vec![t("+"), n("T"), n("E'")]);
        assert!(g.productions("E'")[1].is_epsilon());
        assert_eq!(g.terminals(), &["+", "i"]);
    }

    #[test]
    fn from_rules_rejects_end_marker() {
        let err = Grammar::from_rules("S", vec![("S", vec!["a", "$"])]).unwrap_err();
        assert!(matches!(err, MalformedGrammarError::ReservedSymbol { .. }));
    }
}
