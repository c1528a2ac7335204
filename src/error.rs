//! Error types for grammar construction, table construction and parsing.
//!
//! Construction errors ([`MalformedGrammarError`], [`GrammarConflictError`])
//! abort before any parse can run. [`ParseError`] only ends the current
//! parse call; the grammar and table stay usable.

use thiserror::Error;

use crate::grammar::{Production, Symbol};

/// The grammar could not be built from the rules it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGrammarError {
    /// A line of the textual grammar format could not be read.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A production body names a nonterminal that has no productions.
    #[error("nonterminal `{name}` is used by `{left}` but never defined")]
    UndefinedNonTerminal { name: String, left: String },

    /// The start symbol has no productions.
    #[error("start symbol `{0}` has no productions")]
    UndefinedStartSymbol(String),

    /// `ε` or `$` used where only a grammar symbol may appear.
    #[error("reserved symbol `{name}` cannot be used in a rule for `{left}`")]
    ReservedSymbol { name: String, left: String },

    /// The same identifier is used both as a terminal and as a nonterminal.
    #[error("`{name}` is used both as a terminal and as a nonterminal")]
    SymbolKindClash { name: String },
}

/// Two different productions claim the same parsing-table cell, so the
/// grammar is not LL(1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "grammar is not LL(1): M[{non_terminal}, {lookahead}] is claimed by `{existing}` and `{conflicting}`"
)]
pub struct GrammarConflictError {
    pub non_terminal: String,
    pub lookahead: Symbol,
    /// The production that was written to the cell first.
    pub existing: Production,
    pub conflicting: Production,
}

/// Hard parse errors. Each one ends the current parse with a rejection.
///
/// `position` is the index of the offending symbol in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected `{expected}`, found `{found}` at position {position}")]
    TerminalMismatch {
        expected: String,
        found: Symbol,
        position: usize,
    },

    #[error("unexpected input `{found}` at position {position} after the start symbol was recognized")]
    UnexpectedTrailingInput { found: Symbol, position: usize },

    #[error("no rule for `{non_terminal}` with lookahead `{lookahead}` at position {position}")]
    NoApplicableRule {
        non_terminal: String,
        lookahead: Symbol,
        position: usize,
    },
}

impl ParseError {
    /// Index of the input symbol the error was raised on.
    pub fn position(&self) -> usize {
        match self {
            ParseError::TerminalMismatch { position, .. }
            | ParseError::UnexpectedTrailingInput { position, .. }
            | ParseError::NoApplicableRule { position, .. } => *position,
        }
    }
}

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed grammar: {0}")]
    MalformedGrammar(#[from] MalformedGrammarError),

    #[error("{0}")]
    GrammarConflict(#[from] GrammarConflictError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_productions() {
        let err = GrammarConflictError {
            non_terminal: "S".to_string(),
            lookahead: Symbol::terminal("a"),
            existing: Production::new("S", vec![Symbol::terminal("a")]),
            conflicting: Production::new("S", vec![Symbol::terminal("a"), Symbol::terminal("b")]),
        };
        let msg = err.to_string();
        assert!(msg.contains("M[S, a]"));
        assert!(msg.contains("`S -> a`"));
        assert!(msg.contains("`S -> a b`"));
    }

    #[test]
    fn parse_error_reports_position() {
        let err = ParseError::NoApplicableRule {
            non_terminal: "E".to_string(),
            lookahead: Symbol::terminal(")"),
            position: 0,
        };
        assert_eq!(err.position(), 0);
        assert!(err.to_string().contains("no rule for `E` with lookahead `)`"));
    }

    #[test]
    fn umbrella_error_wraps_sources() {
        let err: Error = MalformedGrammarError::UndefinedStartSymbol("S".to_string()).into();
        assert!(matches!(err, Error::MalformedGrammar(_)));
        assert!(err.to_string().contains("start symbol `S`"));
    }

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn errors_are_send_sync_static() {
        _assert_send_sync_static::<Error>();
    }
}
