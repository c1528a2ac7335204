use crate::error::MalformedGrammarError;
use crate::Grammar;

impl Grammar {
    /// Reads a grammar written one rule per line:
    ///
    /// ```text
    /// E  -> T E'
    /// E' -> + T E' | ε
    ///     | - T E'
    /// ```
    ///
    /// The first left-hand side is the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, MalformedGrammarError> {
        let syntax = |line: usize, message: &str| MalformedGrammarError::Syntax {
            line,
            message: message.to_string(),
        };

        let mut raw_productions: Vec<(&str, &str)> = Vec::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(syntax(i + 1, "too many \"->\""));
            }
            let (left, rights): (&str, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(syntax(i + 1, "empty left side"));
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(syntax(i + 1, "left side contains whitespace"));
                }
                (left_str, parts[1].trim())
            } else {
                let continuation = parts[0].trim();
                match (previous_left, continuation.strip_prefix('|')) {
                    (Some(left), Some(rest)) => (left, rest.trim()),
                    (None, _) => return Err(syntax(i + 1, "cannot find left side")),
                    (Some(_), None) => return Err(syntax(i + 1, "expected \"->\" or \"|\"")),
                }
            };

            previous_left = Some(left);
            raw_productions.push((left, rights));
        }

        let start_symbol = match raw_productions.first() {
            Some((left, _)) => *left,
            None => return Err(syntax(1, "grammar has no productions")),
        };

        let rules = raw_productions.into_iter().flat_map(|(left, rights)| {
            rights
                .split('|')
                .map(move |right| (left, right.split_whitespace().collect::<Vec<_>>()))
        });

        Self::from_rules(start_symbol, rules)
    }
}
