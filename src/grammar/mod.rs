pub mod first_follow;
pub mod grammar;
pub mod left_factoring;
pub mod ll1_parser;
pub mod ll1_parsing_table;
pub mod parse;
pub mod predictive_parser;
pub mod pretty_print;

pub use first_follow::{FirstSets, FollowSets};
pub use grammar::{Grammar, NonTerminal, Production, Symbol};
pub use ll1_parser::LL1Parser;
pub use ll1_parsing_table::{ParsingTable, TableEntry};
pub use predictive_parser::{Action, ParseOutput, Step, Verdict};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Other spellings of the empty body accepted in grammar input.
pub(crate) const EPSILON_ALIASES: [&str; 3] = [EPSILON, "ϵ", "epsilon"];

pub(crate) fn is_epsilon_token(token: &str) -> bool {
    EPSILON_ALIASES.contains(&token)
}
