extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;

pub use error::{Error, GrammarConflictError, MalformedGrammarError, ParseError};
pub use grammar::{
    Action, FirstSets, FollowSets, Grammar, LL1Parser, ParseOutput, ParsingTable, Production,
    Step, Symbol, TableEntry, Verdict,
};

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn build_parser(grammar: &str) -> Result<LL1Parser, Error> {
    let g = Grammar::parse(grammar)?;
    Ok(LL1Parser::new(&g)?)
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match build_parser(grammar) {
        Ok(parser) => parser.to_first_follow_output().to_json(),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_parsing_table_to_json(grammar: &str) -> String {
    match build_parser(grammar) {
        Ok(parser) => parser.table().to_output().to_json(),
        Err(e) => error_json(e),
    }
}

/// `input` is a whitespace-separated token string.
#[wasm_bindgen]
pub fn ll1_parse_to_json(grammar: &str, input: &str) -> String {
    match build_parser(grammar) {
        Ok(parser) => parser
            .parse(input.split_whitespace())
            .to_output()
            .to_json(),
        Err(e) => error_json(e),
    }
}
