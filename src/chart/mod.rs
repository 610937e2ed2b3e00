/*
    This module finds every parse of a token sequence
*/

use std::collections::{HashMap, VecDeque};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::error_handling::ErrorType;
use crate::grammar::{Grammar, Production, Symbol};
use crate::tree::ParseTree;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    // Every rule consumes at least one word, so no tree spans nothing
    #[error("Nothing to parse: the sentence contains no words")]
    EmptyInput,
}

impl ErrorType for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Where one right-hand-side element of a derivation was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForestRef<'g> {
    /// The token at this position
    Leaf(usize),
    /// The entry for `symbol` in the cell for `start..end`
    Node { start: usize, end: usize, symbol: &'g str },
}

/// One way of building a symbol over a span: the rule applied, and where
/// each of its right-hand-side elements was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation<'g> {
    pub production: &'g Production,
    pub children: Vec<ForestRef<'g>>,
}

// Symbol -> its derivations over one span. Never iterated, so the hash
// order cannot leak into the order of the trees.
type Cell<'g> = HashMap<&'g str, Vec<Derivation<'g>>>;

/// The packed forest of every derivation over every span of a sentence.
pub struct Chart<'g, 't> {
    grammar: &'g Grammar,
    tokens: &'t [String],
    // cells[start][end]
    cells: Vec<Vec<Cell<'g>>>,
}

// Adds `derivation` to `cell`, returning whether its symbol is new there
fn record<'g>(cell: &mut Cell<'g>, derivation: Derivation<'g>) -> bool {
    let production: &'g Production = derivation.production;
    let alternatives = cell.entry(production.lhs.as_str()).or_default();
    let is_new = alternatives.is_empty();
    if !alternatives.contains(&derivation) {
        alternatives.push(derivation);
    }
    is_new
}

// Every way of cutting `start..end` into `parts` contiguous, non-empty spans
fn splits(start: usize, end: usize, parts: usize) -> impl Iterator<Item = Vec<(usize, usize)>> {
    (start + 1..end).combinations(parts - 1).map(move |cuts| {
        std::iter::once(start)
            .chain(cuts)
            .chain(std::iter::once(end))
            .tuple_windows()
            .collect()
    })
}

impl<'g, 't> Chart<'g, 't> {
    fn new(grammar: &'g Grammar, tokens: &'t [String]) -> Self {
        let length = tokens.len();
        Chart {
            grammar,
            tokens,
            cells: vec![vec![Cell::new(); length + 1]; length + 1],
        }
    }

    fn fill(&mut self) {
        let length = self.tokens.len();
        for span in 1..=length {
            for start in 0..=length - span {
                let end = start + span;
                let cell = self.fill_cell(start, end);
                trace!(start, end, symbols = cell.len(), "filled cell");
                self.cells[start][end] = cell;
            }
        }
    }

    // Relies on every shorter span already being filled
    fn fill_cell(&self, start: usize, end: usize) -> Cell<'g> {
        let grammar: &'g Grammar = self.grammar;
        let span = end - start;

        let mut cell = Cell::new();
        let mut found = VecDeque::new();

        for production in grammar.productions() {
            let arity = production.rhs.len();

            if production.is_lexical() {
                if span == 1 {
                    if let Some(children) = self.match_children(&production.rhs, &[(start, end)]) {
                        if record(&mut cell, Derivation { production, children }) {
                            found.push_back(production.lhs.as_str());
                        }
                    }
                }
                continue;
            }

            // Unary rules are applied once everything else is in the cell
            if production.unary_child().is_some() || arity > span {
                continue;
            }

            for spans in splits(start, end, arity) {
                if let Some(children) = self.match_children(&production.rhs, &spans) {
                    if record(&mut cell, Derivation { production, children }) {
                        found.push_back(production.lhs.as_str());
                    }
                }
            }
        }

        self.close_unary(start, end, &mut cell, found);
        cell
    }

    fn match_children(&self, rhs: &'g [Symbol], spans: &[(usize, usize)]) -> Option<Vec<ForestRef<'g>>> {
        rhs.iter()
            .zip(spans)
            .map(|(symbol, &(start, end))| match symbol {
                Symbol::Terminal(word) => {
                    (end - start == 1 && self.tokens[start] == *word).then_some(ForestRef::Leaf(start))
                }
                Symbol::Nonterminal(name) => self.cells[start][end]
                    .contains_key(name.as_str())
                    .then_some(ForestRef::Node { start, end, symbol: name.as_str() }),
            })
            .collect()
    }

    // Applies `A -> B` rules until no symbol is added to the cell
    fn close_unary(&self, start: usize, end: usize, cell: &mut Cell<'g>, mut pending: VecDeque<&'g str>) {
        let grammar: &'g Grammar = self.grammar;

        while let Some(child) = pending.pop_front() {
            for production in grammar.unary_parents(child) {
                let derivation = Derivation {
                    production,
                    children: vec![ForestRef::Node { start, end, symbol: child }],
                };
                if record(cell, derivation) {
                    pending.push_back(production.lhs.as_str());
                }
            }
        }
    }

    pub fn tokens(&self) -> &'t [String] {
        self.tokens
    }

    /// The ways `symbol` derives exactly the tokens in `start..end`.
    pub fn derivations(&self, start: usize, end: usize, symbol: &str) -> &[Derivation<'g>] {
        self.cells
            .get(start)
            .and_then(|row| row.get(end))
            .and_then(|cell| cell.get(symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Derivations of the start symbol over the whole sentence.
    pub fn roots(&self) -> &[Derivation<'g>] {
        self.derivations(0, self.tokens.len(), self.grammar.start_symbol())
    }

    pub fn is_accepted(&self) -> bool {
        !self.roots().is_empty()
    }

    /// Lazily materializes the parse trees, one top-level derivation at a
    /// time. Each call starts over from the first tree.
    pub fn trees(&self) -> Trees<'_, 'g, 't> {
        Trees {
            chart: self,
            roots: self.roots().iter(),
            pending: Vec::new().into_iter(),
        }
    }

    // `chain` holds the symbols already being expanded over this same span.
    // A unary derivation that would repeat one of them is dropped, which keeps
    // cyclic unary rules from producing infinite trees.
    fn expand(&self, start: usize, end: usize, symbol: &'g str, chain: &mut Vec<&'g str>) -> Vec<ParseTree> {
        chain.push(symbol);
        let trees = self
            .derivations(start, end, symbol)
            .iter()
            .flat_map(|derivation| self.expand_derivation(start, end, derivation, chain))
            .collect();
        chain.pop();
        trees
    }

    fn expand_derivation(
        &self,
        start: usize,
        end: usize,
        derivation: &Derivation<'g>,
        chain: &mut Vec<&'g str>,
    ) -> Vec<ParseTree> {
        let mut choices = Vec::with_capacity(derivation.children.len());

        for child in &derivation.children {
            let options = match *child {
                ForestRef::Leaf(position) => vec![ParseTree::leaf(&self.tokens[position])],
                ForestRef::Node { start: s, end: e, symbol } if (s, e) == (start, end) => {
                    if chain.contains(&symbol) {
                        return Vec::new();
                    }
                    self.expand(s, e, symbol, chain)
                }
                ForestRef::Node { start: s, end: e, symbol } => self.expand(s, e, symbol, &mut Vec::new()),
            };

            if options.is_empty() {
                return Vec::new();
            }
            choices.push(options);
        }

        let lhs = derivation.production.lhs.as_str();
        choices
            .into_iter()
            .multi_cartesian_product()
            .map(|children| ParseTree::node(lhs, children))
            .collect()
    }
}

pub struct Trees<'c, 'g, 't> {
    chart: &'c Chart<'g, 't>,
    roots: std::slice::Iter<'c, Derivation<'g>>,
    pending: std::vec::IntoIter<ParseTree>,
}

impl<'c, 'g, 't> Iterator for Trees<'c, 'g, 't> {
    type Item = ParseTree;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tree) = self.pending.next() {
                return Some(tree);
            }

            let derivation = self.roots.next()?;
            let grammar: &'g Grammar = self.chart.grammar;
            let length = self.chart.tokens.len();
            self.pending = self
                .chart
                .expand_derivation(0, length, derivation, &mut vec![grammar.start_symbol()])
                .into_iter();
        }
    }
}

pub struct ChartParser<'g> {
    grammar: &'g Grammar,
}

impl<'g> ChartParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        ChartParser { grammar }
    }

    /// Fills the chart for `tokens` without materializing any trees.
    pub fn chart<'t>(&self, tokens: &'t [String]) -> ParseResult<Chart<'g, 't>> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut chart = Chart::new(self.grammar, tokens);
        chart.fill();

        debug!(
            tokens = tokens.len(),
            start = self.grammar.start_symbol(),
            roots = chart.roots().len(),
            "filled chart"
        );
        Ok(chart)
    }

    /// Every distinct parse tree of `tokens`, in derivation order. An empty
    /// result means the grammar cannot generate the sentence.
    pub fn parse(&self, tokens: &[String]) -> ParseResult<Vec<ParseTree>> {
        let chart = self.chart(tokens)?;
        let trees: Vec<ParseTree> = chart.trees().unique().collect();

        debug!(trees = trees.len(), "parsed sentence");
        Ok(trees)
    }
}

pub fn parse(grammar: &Grammar, tokens: &[String]) -> ParseResult<Vec<ParseTree>> {
    ChartParser::new(grammar).parse(tokens)
}
