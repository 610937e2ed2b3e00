use std::collections::HashSet;

use super::MalformedGrammar::{self, EmptyRightHandSide, NoProductions, UndefinedNonterminal, UndefinedStart};
use super::{Production, Symbol};

// A problem, along with the index of the production that caused it (if any)
pub type Problem = (Option<usize>, MalformedGrammar);

fn get_production_problems(index: usize, production: &Production, defined: &HashSet<&str>) -> Vec<Problem> {
    if production.rhs.is_empty() {
        return vec![(Some(index), EmptyRightHandSide(production.lhs.clone()))];
    }

    // Filter out everything but nonterminals, then keep the undefined ones
    production.rhs.iter()
        .filter_map(|symbol| match symbol {
            Symbol::Nonterminal(symbol) => Some(symbol),
            _ => None
        })
        .filter(|symbol| !defined.contains(symbol.as_str()))
        .map(|symbol| (Some(index), UndefinedNonterminal {
            symbol: symbol.to_owned(),
            used_by: production.lhs.clone()
        }))
        .collect()
}

/// Lists everything that keeps `productions` from forming a grammar rooted
/// at `start_symbol`, in production order.
pub fn find_problems(start_symbol: &str, productions: &[Production]) -> Vec<Problem> {
    if productions.is_empty() {
        return vec![(None, NoProductions)];
    }

    let defined: HashSet<&str> = productions.iter().map(|p| p.lhs.as_str()).collect();

    let mut problems = Vec::new();
    if !defined.contains(start_symbol) {
        problems.push((None, UndefinedStart(start_symbol.to_owned())));
    }

    problems.extend(productions.iter()
        .enumerate()
        .flat_map(|(index, production)| get_production_problems(index, production, &defined)));

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::{nt, rule, t};

    #[test]
    fn accept_closed_rules() {
        let rules = vec![
            rule("S", &[nt("NP"), nt("VP")]),
            rule("NP", &[t("holmes")]),
            rule("VP", &[t("sat")]),
            // Unreachable rules are allowed
            rule("Adv", &[t("never")]),
        ];

        assert_eq!(find_problems("S", &rules), vec![]);
    }

    #[test]
    fn report_every_problem() {
        let rules = vec![
            rule("S", &[nt("NP"), nt("VP")]),
            rule("NP", &[nt("Det"), nt("N")]),
            rule("VP", &[]),
        ];

        assert_eq!(find_problems("Sentence", &rules), vec![
            (None, UndefinedStart("Sentence".to_string())),
            (Some(1), UndefinedNonterminal {
                symbol: "Det".to_string(),
                used_by: "NP".to_string()
            }),
            (Some(1), UndefinedNonterminal {
                symbol: "N".to_string(),
                used_by: "NP".to_string()
            }),
            (Some(2), EmptyRightHandSide("VP".to_string())),
        ]);
    }

    #[test]
    fn report_no_productions() {
        assert_eq!(find_problems("S", &[]), vec![(None, NoProductions)]);
    }
}
