use std::collections::HashSet;

use super::grammar::{Production, Symbol};
use crate::Grammar;

impl Grammar {
    /// Returns a copy of the grammar in which no nonterminal has two
    /// productions starting with the same symbol.
    ///
    /// Productions of `N` are grouped by their first symbol. A group with
    /// more than one member becomes `N -> x N_k`, where `x` is the shared
    /// first symbol, and the new nonterminal `N_k` gets what follows `x` in
    /// each member (an empty suffix is the ε-production). `k` counts up
    /// across the whole transformation. The new nonterminals are not factored
    /// again, so suffixes of `N_k` may still share a first symbol.
    pub fn eliminate_left_factoring(&self) -> Grammar {
        let mut taken: HashSet<String> = self
            .non_terminal_iter()
            .map(|nt| nt.name.clone())
            .chain(self.terminal_iter().cloned())
            .collect();
        let mut counter: usize = 0;

        let mut non_terminals: Vec<(String, Vec<Production>)> = Vec::new();
        for nt in self.non_terminal_iter() {
            let mut groups: Vec<(Option<&Symbol>, Vec<&Production>)> = Vec::new();
            for production in &nt.productions {
                let key = production.right.first();
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, group)) => group.push(production),
                    None => groups.push((key, vec![production])),
                }
            }

            let mut productions: Vec<Production> = Vec::new();
            let mut factored: Vec<(String, Vec<Production>)> = Vec::new();
            for (key, group) in groups {
                let prefix = match key {
                    Some(prefix) if group.len() > 1 => prefix,
                    _ => {
                        productions.extend(group.into_iter().cloned());
                        continue;
                    }
                };

                counter += 1;
                let mut name = format!("{}_{}", nt.name, counter);
                while taken.contains(&name) {
                    name.push('\'');
                }
                taken.insert(name.clone());

                productions.push(Production::new(
                    nt.name.clone(),
                    vec![prefix.clone(), Symbol::NonTerminal(name.clone())],
                ));

                let suffixes: Vec<Production> = group
                    .iter()
                    .map(|p| Production::new(name.clone(), p.right[1..].to_vec()))
                    .collect();
                log::debug!(
                    "left factoring {}: {} alternatives start with {}, moved to {}",
                    nt.name,
                    suffixes.len(),
                    prefix,
                    name
                );
                factored.push((name, suffixes));
            }

            non_terminals.push((nt.name.clone(), productions));
            non_terminals.extend(factored);
        }

        Grammar::from_parts(non_terminals, self.start_symbol(), self.terminals().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Production, Symbol};
    use crate::Grammar;

    fn names(g: &Grammar) -> Vec<&str> {
        g.non_terminal_iter().map(|nt| nt.name.as_str()).collect()
    }

    fn bodies(g: &Grammar, nt: &str) -> Vec<String> {
        g.productions(nt).iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn factors_shared_first_symbol() {
        let g = Grammar::parse("S -> a | a b").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(names(&f), vec!["S", "S_1"]);
        assert_eq!(bodies(&f, "S"), vec!["S -> a S_1"]);
        assert_eq!(bodies(&f, "S_1"), vec!["S_1 -> ε", "S_1 -> b"]);
    }

    #[test]
    fn factors_on_first_symbol_only() {
        let g = Grammar::parse(
            "A -> if E then S | if E then S else S\nE -> cond\nS -> stmt",
        )
        .unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(bodies(&f, "A"), vec!["A -> if A_1"]);
        assert_eq!(
            bodies(&f, "A_1"),
            vec!["A_1 -> E then S", "A_1 -> E then S else S"]
        );
        assert_eq!(bodies(&f, "E"), vec!["E -> cond"]);
    }

    #[test]
    fn longer_shared_prefix_stays_in_suffixes() {
        let g = Grammar::parse("S -> a b c | a b d").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(bodies(&f, "S"), vec!["S -> a S_1"]);
        assert_eq!(bodies(&f, "S_1"), vec!["S_1 -> b c", "S_1 -> b d"]);
    }

    #[test]
    fn keeps_other_groups_in_place() {
        let g = Grammar::parse("S -> x a | b | x c | | d").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(
            bodies(&f, "S"),
            vec!["S -> x S_1", "S -> b", "S -> ε", "S -> d"]
        );
        assert_eq!(bodies(&f, "S_1"), vec!["S_1 -> a", "S_1 -> c"]);
    }

    #[test]
    fn counter_runs_across_non_terminals() {
        let g = Grammar::parse("S -> a S | a | T\nT -> b | b c").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(names(&f), vec!["S", "S_1", "T", "T_2"]);
        assert_eq!(bodies(&f, "S"), vec!["S -> a S_1", "S -> T"]);
        assert_eq!(bodies(&f, "S_1"), vec!["S_1 -> S", "S_1 -> ε"]);
        assert_eq!(bodies(&f, "T_2"), vec!["T_2 -> ε", "T_2 -> c"]);
    }

    #[test]
    fn synthetic_name_avoids_existing_symbols() {
        let g = Grammar::parse("S -> a | a S_1\nS_1 -> b").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(names(&f), vec!["S", "S_1'", "S_1"]);
        assert_eq!(bodies(&f, "S"), vec!["S -> a S_1'"]);
    }

    #[test]
    fn suffix_groups_are_not_refactored() {
        let g = Grammar::parse("S -> a b c | a b d | a e").unwrap();
        let f = g.eliminate_left_factoring();

        assert_eq!(bodies(&f, "S"), vec!["S -> a S_1"]);
        assert_eq!(
            bodies(&f, "S_1"),
            vec!["S_1 -> b c", "S_1 -> b d", "S_1 -> e"]
        );
        assert_eq!(names(&f).len(), 2);
    }

    #[test]
    fn idempotent_on_factored_grammar() {
        let g = Grammar::parse("S -> a | a b\nT -> c d | c").unwrap();
        let once = g.eliminate_left_factoring();
        let twice = once.eliminate_left_factoring();

        assert_eq!(once, twice);
        assert_eq!(names(&twice), vec!["S", "S_1", "T", "T_2"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let g = Grammar::parse("S -> a | a b").unwrap();
        let before = g.clone();
        let _ = g.eliminate_left_factoring();

        assert_eq!(g, before);
        assert_eq!(
            g.productions("S")[1],
            Production::new("S", vec![Symbol::terminal("a"), Symbol::terminal("b")])
        );
    }
}
