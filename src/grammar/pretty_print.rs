use std::collections::BTreeSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use crate::error::ParseError;

use super::{
    grammar::{Production, Symbol},
    ll1_parsing_table::{ParsingTable, TableEntry},
    predictive_parser::{Action, ParseOutput, Verdict},
    Grammar, LL1Parser, EPSILON,
};

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

fn align_columns(output: &[Vec<String>]) -> String {
    let columns = output.first().map_or(0, |row| row.len());
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .map(|row| row[j].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Symbol names in LaTeX math mode, `ε` as `\epsilon`.
fn tex_symbols(names: &[&str], separator: &str) -> String {
    names
        .iter()
        .map(|&name| match name {
            EPSILON => r"\epsilon".to_string(),
            name => escape::tex(name).into_owned(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Serialize)]
struct RuleOutput<'a> {
    left: &'a str,
    alternatives: Vec<Vec<&'a str>>,
}

/// Every nonterminal with its alternatives, in grammar order.
#[derive(Serialize)]
pub struct ProductionsOutput<'a> {
    rules: Vec<RuleOutput<'a>>,
}

impl ProductionsOutput<'_> {
    /// One alternative per line; later alternatives start with `|` under
    /// the arrow.
    pub fn to_plaintext(&self) -> String {
        let width = self
            .rules
            .iter()
            .map(|rule| rule.left.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines: Vec<String> = Vec::new();
        for rule in &self.rules {
            for (i, alternative) in rule.alternatives.iter().enumerate() {
                let (head, arrow) = if i == 0 { (rule.left, "->") } else { ("", " |") };
                lines.push(format!(
                    "{:>width$} {} {}",
                    head,
                    arrow,
                    alternative.join(" "),
                    width = width
                ));
            }
        }
        lines.join("\n")
    }

    pub fn to_latex(&self) -> String {
        let rows: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| !rule.alternatives.is_empty())
            .map(|rule| {
                let right: Vec<String> = rule
                    .alternatives
                    .iter()
                    .map(|alternative| tex_symbols(alternative, r"\ "))
                    .collect();
                format!(
                    r"{} & \rightarrow & {}",
                    escape::tex(rule.left),
                    right.join(r" \mid ")
                )
            })
            .collect();

        format!(
            "\\[\\begin{{array}}{{cll}}\n{}\n\\end{{array}}\\]",
            rows.join("\\\\\n")
        )
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl Grammar {
    pub fn to_productions_output(&self) -> ProductionsOutput {
        let rules = self
            .non_terminal_iter()
            .map(|nt| RuleOutput {
                left: nt.name.as_str(),
                alternatives: nt.productions.iter().map(Production::right_names).collect(),
            })
            .collect();
        ProductionsOutput { rules }
    }
}

#[derive(Serialize)]
struct FirstFollowRow<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

/// Nullable, FIRST and FOLLOW of every nonterminal.
#[derive(Serialize)]
pub struct FirstFollowOutput<'a> {
    data: Vec<FirstFollowRow<'a>>,
}

impl FirstFollowOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|row| {
                [
                    row.name.to_string(),
                    row.nullable.to_string(),
                    row.first.join(", "),
                    row.follow.join(", "),
                ]
                .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let rows: Vec<String> = self
            .data
            .iter()
            .map(|row| {
                format!(
                    "{} & {} & ${}$ & ${}$",
                    escape::tex(row.name),
                    row.nullable,
                    tex_symbols(&row.first, r",\ "),
                    tex_symbols(&row.follow, r",\ ")
                )
            })
            .collect();

        format!(
            "\\begin{{tabular}}{{c|c|c|c}}\nSymbol & Nullable & First & Follow\\\\\\hline\n{}\\\\\n\\end{{tabular}}",
            rows.join("\\\\\n")
        )
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl LL1Parser {
    /// Rows follow grammar order. Symbols come in set order: terminals
    /// sorted by name, then `ε` in FIRST and `$` in FOLLOW.
    pub fn to_first_follow_output(&self) -> FirstFollowOutput {
        fn listed(set: Option<&BTreeSet<Symbol>>) -> Vec<&str> {
            set.into_iter().flatten().map(Symbol::name).collect()
        }

        let data = self
            .grammar()
            .non_terminal_iter()
            .map(|nt| FirstFollowRow {
                name: nt.name.as_str(),
                nullable: self.first_sets().is_nullable(&nt.name),
                first: listed(self.first_sets().get(&nt.name)),
                follow: listed(self.follow_sets().get(&nt.name)),
            })
            .collect();
        FirstFollowOutput { data }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "production")]
pub enum CellOutput<'a> {
    #[serde(rename = "production")]
    Production { left: &'a str, right: Vec<&'a str> },
    #[serde(rename = "sync")]
    Sync,
    #[serde(rename = "empty")]
    Empty,
}

impl CellOutput<'_> {
    fn to_plaintext(&self) -> String {
        match self {
            CellOutput::Production { left, right } => format!("{} -> {}", left, right.join(" ")),
            CellOutput::Sync => "sync".to_string(),
            CellOutput::Empty => String::new(),
        }
    }

    fn to_latex(&self) -> String {
        match self {
            CellOutput::Production { left, right } => format!(
                r"${} \rightarrow {}$",
                escape::tex(*left),
                tex_symbols(right, r"\ ")
            ),
            CellOutput::Sync => "\\text{sync}".to_string(),
            CellOutput::Empty => String::new(),
        }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<CellOutput<'a>>)>,
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|cell| cell.to_plaintext()));
            output.push(line);
        }
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(*left).to_string()];
            line.extend(row.iter().map(|cell| cell.to_latex()));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl ParsingTable {
    pub fn to_output(&self) -> LL1ParsingTableOutput {
        let terminals: Vec<&str> = self.terminals().iter().map(|t| t.name()).collect();
        let rows = self
            .non_terminals()
            .iter()
            .map(|nt| {
                let row = self
                    .terminals()
                    .iter()
                    .map(|t| match self.get(nt, t) {
                        Some(TableEntry::Production(p)) => CellOutput::Production {
                            left: p.left.as_str(),
                            right: p.right_names(),
                        },
                        Some(TableEntry::Sync) => CellOutput::Sync,
                        None => CellOutput::Empty,
                    })
                    .collect();
                (nt.as_str(), row)
            })
            .collect();

        LL1ParsingTableOutput { terminals, rows }
    }
}

#[derive(Serialize)]
struct StepOutput {
    step: usize,
    stack: String,
    input: String,
    action: String,
}

#[derive(Serialize)]
pub struct TraceOutput {
    steps: Vec<StepOutput>,
    accepted: bool,
    error: Option<String>,
    /// Token index the error was reported at.
    position: Option<usize>,
}

fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.name()).collect::<Vec<_>>().join(" ")
}

impl Action {
    pub fn to_plaintext(&self) -> String {
        match self {
            Action::Match(t) => format!("match {}", t),
            Action::Expand(p) => p.to_string(),
            Action::Sync(s) => format!("error: sync, skip {}", s),
            Action::Accept => "accept".to_string(),
            Action::Error(e) => format!("error: {}", e),
        }
    }
}

impl TraceOutput {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![vec![
            "Step".to_string(),
            "Stack".to_string(),
            "Input".to_string(),
            "Action".to_string(),
        ]];
        output.extend(self.steps.iter().map(|s| {
            vec![
                s.step.to_string(),
                s.stack.clone(),
                s.input.clone(),
                s.action.clone(),
            ]
        }));
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .steps
            .iter()
            .map(|s| {
                format!(
                    "{} & {} & {} & {}",
                    s.step,
                    escape::tex(s.stack.as_str()),
                    escape::tex(s.input.as_str()),
                    escape::tex(s.action.as_str())
                )
                .replace(EPSILON, "$\\epsilon$")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{r|l|r|l}\n".to_string()
            + "Step & Stack & Input & Action\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

impl ParseOutput {
    fn error(&self) -> Option<&ParseError> {
        match &self.verdict {
            Verdict::Accepted => None,
            Verdict::Rejected(e) => Some(e),
        }
    }

    pub fn to_output(&self) -> TraceOutput {
        TraceOutput {
            steps: self
                .trace
                .iter()
                .map(|s| StepOutput {
                    step: s.step,
                    stack: symbols_to_string(&s.stack),
                    input: symbols_to_string(&s.input),
                    action: s.action.to_plaintext(),
                })
                .collect(),
            accepted: self.is_accepted(),
            error: self.error().map(|e| e.to_string()),
            position: self.error().map(ParseError::position),
        }
    }
}
