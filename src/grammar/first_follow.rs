use std::collections::{BTreeMap, BTreeSet};

use super::grammar::Symbol;
use crate::Grammar;

/// FIRST set of every nonterminal. Members are terminals and possibly
/// [`Symbol::Epsilon`] for nullable nonterminals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstSets {
    sets: BTreeMap<String, BTreeSet<Symbol>>,
}

/// FOLLOW set of every nonterminal. Members are terminals and possibly
/// [`Symbol::EndOfInput`], never [`Symbol::Epsilon`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowSets {
    sets: BTreeMap<String, BTreeSet<Symbol>>,
}

impl FirstSets {
    pub fn get(&self, non_terminal: &str) -> Option<&BTreeSet<Symbol>> {
        self.sets.get(non_terminal)
    }

    pub fn is_nullable(&self, non_terminal: &str) -> bool {
        self.sets
            .get(non_terminal)
            .map_or(false, |set| set.contains(&Symbol::Epsilon))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Symbol>)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// FIRST of a symbol string. Contains `ε` iff every symbol of `body`
    /// can vanish (in particular when `body` is empty).
    pub fn first_of_body(&self, body: &[Symbol]) -> BTreeSet<Symbol> {
        first_of_sequence(&self.sets, body)
    }
}

impl FollowSets {
    pub fn get(&self, non_terminal: &str) -> Option<&BTreeSet<Symbol>> {
        self.sets.get(non_terminal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Symbol>)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn first_of_sequence(sets: &BTreeMap<String, BTreeSet<Symbol>>, body: &[Symbol]) -> BTreeSet<Symbol> {
    let mut first: BTreeSet<Symbol> = BTreeSet::new();
    for symbol in body {
        match symbol {
            Symbol::Terminal(_) | Symbol::EndOfInput => {
                first.insert(symbol.clone());
                return first;
            }
            Symbol::NonTerminal(name) => {
                let nt_first = match sets.get(name) {
                    Some(set) => set,
                    None => return first,
                };
                first.extend(nt_first.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                if !nt_first.contains(&Symbol::Epsilon) {
                    return first;
                }
            }
            Symbol::Epsilon => {}
        }
    }
    first.insert(Symbol::Epsilon);
    first
}

fn extend_counting(target: &mut BTreeSet<Symbol>, source: BTreeSet<Symbol>) -> bool {
    let before = target.len();
    target.extend(source);
    target.len() != before
}

impl Grammar {
    /// Computes FIRST and FOLLOW sets in one go.
    pub fn calculate_first_follow(&self) -> (FirstSets, FollowSets) {
        let first = self.calculate_first();
        let follow = self.calculate_follow(&first);
        (first, follow)
    }

    /// FIRST sets by fixpoint iteration: full passes over all productions
    /// until no set grows.
    pub fn calculate_first(&self) -> FirstSets {
        let mut sets: BTreeMap<String, BTreeSet<Symbol>> = self
            .non_terminal_iter()
            .map(|nt| (nt.name.clone(), BTreeSet::new()))
            .collect();

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for nt in self.non_terminal_iter() {
                for production in &nt.productions {
                    let first = first_of_sequence(&sets, &production.right);
                    if let Some(target) = sets.get_mut(&nt.name) {
                        changed |= extend_counting(target, first);
                    }
                }
            }
        }
        log::debug!("FIRST sets converged after {} passes", passes);

        FirstSets { sets }
    }

    /// FOLLOW sets by fixpoint iteration, seeded with `$` in FOLLOW of the
    /// start symbol. `first` must be the converged FIRST sets of `self`.
    ///
    /// For `A -> α B β`, FOLLOW(B) receives FIRST(β) without `ε`, and
    /// FOLLOW(A) as well when β can vanish.
    pub fn calculate_follow(&self, first: &FirstSets) -> FollowSets {
        let mut sets: BTreeMap<String, BTreeSet<Symbol>> = self
            .non_terminal_iter()
            .map(|nt| (nt.name.clone(), BTreeSet::new()))
            .collect();
        if let Some(start) = sets.get_mut(self.start_symbol()) {
            start.insert(Symbol::EndOfInput);
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for nt in self.non_terminal_iter() {
                for production in &nt.productions {
                    for (i, symbol) in production.right.iter().enumerate() {
                        let b = match symbol {
                            Symbol::NonTerminal(b) => b,
                            _ => continue,
                        };
                        let mut trailer = first.first_of_body(&production.right[i + 1..]);
                        if trailer.remove(&Symbol::Epsilon) {
                            if let Some(left_follow) = sets.get(&nt.name) {
                                trailer.extend(left_follow.iter().cloned());
                            }
                        }
                        if let Some(target) = sets.get_mut(b) {
                            changed |= extend_counting(target, trailer);
                        }
                    }
                }
            }
        }
        log::debug!("FOLLOW sets converged after {} passes", passes);

        FollowSets { sets }
    }
}
