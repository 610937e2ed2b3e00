/*
    This module is for storing and querying grammars
*/

mod verifier;

use std::collections::HashMap;
use std::fmt::Display;

use thiserror::Error;

use crate::error_handling::ErrorType;
use crate::tree::ParseTree;

pub use verifier::find_problems;

// The base unit in a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(s) | Symbol::Nonterminal(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(s) => write!(f, "\"{}\"", s),
            Symbol::Nonterminal(s) => write!(f, "{}", s),
        }
    }
}

// The symbols in a single alternative
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: String,
    pub rhs: Alternative,
}

impl Production {
    pub fn new(lhs: impl Into<String>, rhs: Alternative) -> Self {
        Production { lhs: lhs.into(), rhs }
    }

    /// A rule of the form `A -> "word"`.
    pub fn is_lexical(&self) -> bool {
        matches!(self.rhs.as_slice(), [Symbol::Terminal(_)])
    }

    /// A rule of the form `A -> B`, which rewrites within a single span.
    pub fn unary_child(&self) -> Option<&str> {
        match self.rhs.as_slice() {
            [Symbol::Nonterminal(child)] => Some(child),
            _ => None,
        }
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedGrammar {
    #[error("Grammar has no productions")]
    NoProductions,
    #[error("Rule for `{0}` has an empty right-hand side")]
    EmptyRightHandSide(String),
    #[error("Could not find definition for `{symbol}` (used by `{used_by}`)")]
    UndefinedNonterminal { symbol: String, used_by: String },
    #[error("Start symbol `{0}` has no rules")]
    UndefinedStart(String),
}

impl ErrorType for MalformedGrammar {}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    start_symbol: String,
    // Left-hand sides in order of first definition
    order: Vec<String>,
    rules: HashMap<String, Vec<Production>>,
}

impl Grammar {
    /// Builds a grammar, reporting every problem found in `productions`.
    ///
    /// Productions keep the order they are given in. A production that
    /// repeats an earlier one is dropped.
    pub fn new(
        start_symbol: impl Into<String>,
        productions: Vec<Production>,
    ) -> Result<Grammar, Vec<MalformedGrammar>> {
        let start_symbol = start_symbol.into();

        let problems = find_problems(&start_symbol, &productions);
        if !problems.is_empty() {
            return Err(problems.into_iter().map(|(_, problem)| problem).collect());
        }

        let mut order = Vec::new();
        let mut rules: HashMap<String, Vec<Production>> = HashMap::new();
        for production in productions {
            let alternatives = rules.entry(production.lhs.clone()).or_insert_with(|| {
                order.push(production.lhs.clone());
                Vec::new()
            });
            if !alternatives.contains(&production) {
                alternatives.push(production);
            }
        }

        Ok(Grammar {
            start_symbol,
            order,
            rules,
        })
    }

    /// Builds a grammar whose start symbol is the left-hand side of the
    /// first production.
    pub fn from_productions(productions: Vec<Production>) -> Result<Grammar, Vec<MalformedGrammar>> {
        let start_symbol = match productions.first() {
            Some(production) => production.lhs.clone(),
            None => return Err(vec![MalformedGrammar::NoProductions]),
        };
        Grammar::new(start_symbol, productions)
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn rules_for(&self, nonterminal: &str) -> &[Production] {
        self.rules.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Every production, grouped by left-hand side in definition order.
    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.order.iter().flat_map(|lhs| self.rules_for(lhs))
    }

    pub fn production_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// The unary rules `A -> child`.
    pub fn unary_parents<'a>(&'a self, child: &'a str) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions()
            .filter(move |production| production.unary_child() == Some(child))
    }

    /// Checks that every internal node of `tree` is the left-hand side of a
    /// rule whose right-hand side matches the node's children.
    pub fn licenses(&self, tree: &ParseTree) -> bool {
        let Symbol::Nonterminal(lhs) = &tree.label else {
            return tree.is_leaf();
        };
        let matched = self.rules_for(lhs).iter().any(|production| {
            production.rhs.len() == tree.children.len()
                && production.rhs.iter().zip(&tree.children).all(|(symbol, child)| *symbol == child.label)
        });
        matched && tree.children.iter().all(|child| self.licenses(child))
    }
}
