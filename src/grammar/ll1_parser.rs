use crate::error::GrammarConflictError;
use crate::Grammar;

use super::first_follow::{FirstSets, FollowSets};
use super::grammar::Symbol;
use super::ll1_parsing_table::ParsingTable;
use super::predictive_parser::{tokens_to_input, ParseOutput};

/// A grammar prepared for predictive parsing.
///
/// Construction runs left factoring, FIRST, FOLLOW and table building once.
/// Everything is read-only afterwards, so one `LL1Parser` can serve any
/// number of parse calls, including from several threads.
#[derive(Debug, Clone)]
pub struct LL1Parser {
    grammar: Grammar,
    first: FirstSets,
    follow: FollowSets,
    table: ParsingTable,
}

impl LL1Parser {
    pub fn new(grammar: &Grammar) -> Result<Self, GrammarConflictError> {
        let grammar = grammar.eliminate_left_factoring();
        let (first, follow) = grammar.calculate_first_follow();
        let table = ParsingTable::build(&grammar, &first, &follow)?;
        Ok(Self {
            grammar,
            first,
            follow,
            table,
        })
    }

    /// The left-factored grammar the table was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    pub fn follow_sets(&self) -> &FollowSets {
        &self.follow
    }

    pub fn table(&self) -> &ParsingTable {
        &self.table
    }

    /// Parses a token stream; see [`tokens_to_input`] for the end marker.
    pub fn parse<I, S>(&self, tokens: I) -> ParseOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.table.parse(&tokens_to_input(tokens))
    }

    /// Parses input that is already classified, for callers with their own
    /// lexer. The input should end with [`Symbol::EndOfInput`]; nothing is
    /// appended here.
    pub fn parse_symbols(&self, input: &[Symbol]) -> ParseOutput {
        self.table.parse(input)
    }
}
