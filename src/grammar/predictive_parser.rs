//! Stack machine driving a parse against a [`ParsingTable`].
//!
//! Every transition is recorded as a [`Step`]. The trace is observational:
//! it is built after the transition is decided and never read back.

use crate::error::ParseError;

use super::grammar::{Production, Symbol};
use super::ll1_parsing_table::{ParsingTable, TableEntry};
use super::END_MARK;

/// What the driver did in one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The terminal on top of the stack matched the lookahead.
    Match(String),
    /// The nonterminal on top of the stack was replaced by this production.
    Expand(Production),
    /// Recoverable error: the lookahead was discarded through a sync cell.
    Sync(Symbol),
    Accept,
    Error(ParseError),
}

/// One trace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based.
    pub step: usize,
    /// Stack before the transition, bottom first (`$` is `stack[0]`).
    pub stack: Vec<Symbol>,
    /// Unconsumed input before the transition, lookahead first.
    pub input: Vec<Symbol>,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub verdict: Verdict,
    pub trace: Vec<Step>,
}

impl ParseOutput {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// Productions used, in order.
    pub fn expansions(&self) -> impl Iterator<Item = &Production> {
        self.trace.iter().filter_map(|step| match &step.action {
            Action::Expand(p) => Some(p),
            _ => None,
        })
    }

    /// Input symbols discarded by sync recovery, in order.
    pub fn recoveries(&self) -> impl Iterator<Item = &Symbol> {
        self.trace.iter().filter_map(|step| match &step.action {
            Action::Sync(s) => Some(s),
            _ => None,
        })
    }

    /// Accepted without any sync recovery.
    pub fn is_clean(&self) -> bool {
        self.is_accepted() && self.recoveries().next().is_none()
    }
}

/// Turns a token stream into driver input: `$` becomes
/// [`Symbol::EndOfInput`], every other token a terminal, and `$` is appended
/// unless the stream already ends with it.
pub fn tokens_to_input<I, S>(tokens: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut input: Vec<Symbol> = tokens
        .into_iter()
        .map(|token| match token.as_ref() {
            END_MARK => Symbol::EndOfInput,
            other => Symbol::terminal(other),
        })
        .collect();
    if input.last() != Some(&Symbol::EndOfInput) {
        input.push(Symbol::EndOfInput);
    }
    input
}

struct ParserState<'i> {
    stack: Vec<Symbol>,
    input: &'i [Symbol],
    position: usize,
    step: usize,
}

impl<'i> ParserState<'i> {
    fn new(start_symbol: &str, input: &'i [Symbol]) -> Self {
        Self {
            stack: vec![Symbol::EndOfInput, Symbol::non_terminal(start_symbol)],
            input,
            position: 0,
            step: 0,
        }
    }

    /// Reading past the end yields `$`.
    fn lookahead(&self) -> Symbol {
        self.input
            .get(self.position)
            .cloned()
            .unwrap_or(Symbol::EndOfInput)
    }

    fn at_end(&self) -> bool {
        self.position + 1 >= self.input.len()
    }

    fn record(&mut self, action: Action) -> Step {
        self.step += 1;
        let step = Step {
            step: self.step,
            stack: self.stack.clone(),
            input: self.input.get(self.position..).unwrap_or(&[]).to_vec(),
            action,
        };
        log::trace!(
            "{:>3} | {} | {} | {:?}",
            step.step,
            join(&step.stack),
            join(&step.input),
            step.action
        );
        step
    }
}

fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ParsingTable {
    /// Parses `input` (see [`tokens_to_input`]) starting from the table's
    /// start symbol.
    pub fn parse(&self, input: &[Symbol]) -> ParseOutput {
        let mut state = ParserState::new(self.start_symbol(), input);
        let mut trace: Vec<Step> = Vec::new();

        let verdict = loop {
            let top = state.stack.last().cloned().unwrap_or(Symbol::EndOfInput);
            let lookahead = state.lookahead();

            match top {
                Symbol::EndOfInput | Symbol::Epsilon => {
                    if lookahead == Symbol::EndOfInput && state.at_end() {
                        trace.push(state.record(Action::Accept));
                        break Verdict::Accepted;
                    }
                    let err = ParseError::UnexpectedTrailingInput {
                        found: lookahead,
                        position: state.position,
                    };
                    trace.push(state.record(Action::Error(err.clone())));
                    break Verdict::Rejected(err);
                }
                Symbol::Terminal(t) => {
                    if lookahead.is_terminal() && lookahead.name() == t {
                        trace.push(state.record(Action::Match(t)));
                        state.stack.pop();
                        state.position += 1;
                    } else {
                        let err = ParseError::TerminalMismatch {
                            expected: t,
                            found: lookahead,
                            position: state.position,
                        };
                        trace.push(state.record(Action::Error(err.clone())));
                        break Verdict::Rejected(err);
                    }
                }
                Symbol::NonTerminal(nt) => match self.get(&nt, &lookahead) {
                    Some(TableEntry::Production(production)) => {
                        trace.push(state.record(Action::Expand(production.clone())));
                        state.stack.pop();
                        state.stack.extend(production.right.iter().rev().cloned());
                    }
                    // `$` cannot be discarded, so a sync cell on it is a dead end.
                    Some(TableEntry::Sync) if lookahead != Symbol::EndOfInput => {
                        log::debug!(
                            "sync: skipping `{}` at position {} while expecting {}",
                            lookahead,
                            state.position,
                            nt
                        );
                        trace.push(state.record(Action::Sync(lookahead)));
                        state.position += 1;
                    }
                    _ => {
                        let err = ParseError::NoApplicableRule {
                            non_terminal: nt,
                            lookahead,
                            position: state.position,
                        };
                        trace.push(state.record(Action::Error(err.clone())));
                        break Verdict::Rejected(err);
                    }
                },
            }
        };

        log::debug!("parse finished after {} steps: {:?}", trace.len(), verdict);
        ParseOutput { verdict, trace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::first_follow::tests::ARITHMETIC;
    use crate::Grammar;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn arithmetic_table() -> ParsingTable {
        Grammar::parse(ARITHMETIC)
            .unwrap()
            .generate_ll1_parsing_table()
            .unwrap()
    }

    fn chars(input: &str) -> Vec<Symbol> {
        tokens_to_input(input.chars().map(|c| c.to_string()))
    }

    #[test]
    fn input_gets_end_marker() {
        assert_eq!(
            tokens_to_input(["i", "+"]),
            vec![Symbol::terminal("i"), Symbol::terminal("+"), Symbol::EndOfInput]
        );
        assert_eq!(
            tokens_to_input(["i", "$"]),
            vec![Symbol::terminal("i"), Symbol::EndOfInput]
        );
        assert_eq!(tokens_to_input(Vec::<String>::new()), vec![Symbol::EndOfInput]);
    }

    #[test]
    fn accepts_arithmetic_expression() {
        init_logger();
        let table = arithmetic_table();
        let output = table.parse(&chars("i+i*i$"));

        assert_eq!(output.verdict, Verdict::Accepted);
        assert!(output.is_clean());

        let expansions: Vec<String> = output.expansions().map(|p| p.to_string()).collect();
        assert_eq!(
            expansions,
            vec![
                "E -> T E'",
                "T -> F T'",
                "F -> i",
                "T' -> ε",
                "E' -> + T E'",
                "T -> F T'",
                "F -> i",
                "T' -> * F T'",
                "F -> i",
                "T' -> ε",
                "E' -> ε",
            ]
        );
        assert_eq!(output.trace.last().unwrap().action, Action::Accept);
    }

    #[test]
    fn trace_snapshots_state_before_each_transition() {
        let table = arithmetic_table();
        let output = table.parse(&chars("i"));

        let first = &output.trace[0];
        assert_eq!(first.step, 1);
        assert_eq!(first.stack, vec![Symbol::EndOfInput, Symbol::non_terminal("E")]);
        assert_eq!(first.input, vec![Symbol::terminal("i"), Symbol::EndOfInput]);

        let second = &output.trace[1];
        assert_eq!(
            second.stack,
            vec![
                Symbol::EndOfInput,
                Symbol::non_terminal("E'"),
                Symbol::non_terminal("T"),
            ]
        );

        let matched = output
            .trace
            .iter()
            .find(|s| s.action == Action::Match("i".to_string()))
            .unwrap();
        assert_eq!(matched.input[0], Symbol::terminal("i"));
        let after = &output.trace[matched.step];
        assert_eq!(after.input, vec![Symbol::EndOfInput]);

        assert!(output
            .trace
            .iter()
            .enumerate()
            .all(|(i, s)| s.step == i + 1));
    }

    #[test]
    fn recovers_through_sync_cells() {
        init_logger();
        let table = arithmetic_table();
        let output = table.parse(&chars(")i*+i$"));

        // `)` is in FOLLOW(E) and `+` in FOLLOW(F): both are skipped
        assert_eq!(output.verdict, Verdict::Accepted);
        assert_eq!(
            output.recoveries().cloned().collect::<Vec<_>>(),
            vec![Symbol::terminal(")"), Symbol::terminal("+")]
        );
        assert!(!output.is_clean());

        let first = &output.trace[0];
        assert_eq!(first.action, Action::Sync(Symbol::terminal(")")));
        assert_eq!(first.stack, output.trace[1].stack);
    }

    #[test]
    fn no_rule_for_lookahead() {
        let table = arithmetic_table();
        let output = table.parse(&chars("+i"));

        assert_eq!(
            output.verdict,
            Verdict::Rejected(ParseError::NoApplicableRule {
                non_terminal: "E".to_string(),
                lookahead: Symbol::terminal("+"),
                position: 0,
            })
        );
        assert_eq!(output.trace.len(), 1);
    }

    #[test]
    fn sync_on_end_marker_rejects() {
        let table = arithmetic_table();
        let output = table.parse(&chars("i+"));

        assert_eq!(
            output.verdict,
            Verdict::Rejected(ParseError::NoApplicableRule {
                non_terminal: "T".to_string(),
                lookahead: Symbol::EndOfInput,
                position: 2,
            })
        );
    }

    #[test]
    fn terminal_mismatch() {
        let table = arithmetic_table();
        let output = table.parse(&chars("(i"));

        assert_eq!(
            output.verdict,
            Verdict::Rejected(ParseError::TerminalMismatch {
                expected: ")".to_string(),
                found: Symbol::EndOfInput,
                position: 2,
            })
        );
        assert!(matches!(
            output.trace.last().unwrap().action,
            Action::Error(ParseError::TerminalMismatch { .. })
        ));
    }

    #[test]
    fn trailing_input_after_end_marker() {
        let table = arithmetic_table();
        let output = table.parse(&tokens_to_input(["i", "$", "i"]));

        assert_eq!(
            output.verdict,
            Verdict::Rejected(ParseError::UnexpectedTrailingInput {
                found: Symbol::EndOfInput,
                position: 1,
            })
        );
    }

    #[test]
    fn table_is_reusable_after_rejection() {
        let table = arithmetic_table();

        assert!(!table.parse(&chars("i)")).is_accepted());
        assert!(table.parse(&chars("(i-i)/i")).is_accepted());
    }
}
