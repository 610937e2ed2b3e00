/*
    Parse trees produced by the chart parser
*/

use std::fmt::Display;

use crate::grammar::Symbol;

/// A node labeled with the symbol it matched. Nonterminal nodes own one
/// child per right-hand-side element of the rule that built them; terminal
/// nodes are leaves holding the matched word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseTree {
    pub label: Symbol,
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn node(label: &str, children: Vec<ParseTree>) -> Self {
        ParseTree {
            label: Symbol::Nonterminal(label.to_string()),
            children,
        }
    }

    pub fn leaf(word: &str) -> Self {
        ParseTree {
            label: Symbol::Terminal(word.to_string()),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        matches!(&self.label, Symbol::Nonterminal(name) if name == label)
    }

    /// The matched words, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        self.subtrees()
            .filter(|tree| tree.label.is_terminal())
            .map(|tree| tree.label.name())
            .collect()
    }

    /// Pre-order walk over this tree and all of its descendants.
    pub fn subtrees(&self) -> Subtrees<'_> {
        Subtrees { stack: vec![self] }
    }

    /// Draws the tree with box-drawing connectors:
    ///
    /// ```text
    /// S
    /// ├─ NP
    /// │   └─ N
    /// │       └─ holmes
    /// └─ VP
    ///     └─ V
    ///         └─ arrived
    /// ```
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        self.build_display(&mut lines, String::new(), true, true);
        lines.join("\n")
    }

    fn build_display(&self, lines: &mut Vec<String>, prefix: String, is_last: bool, is_root: bool) {
        if is_root {
            lines.push(self.label.name().to_string());
        } else {
            let connector = if is_last { "└─ " } else { "├─ " };
            lines.push(format!("{}{}{}", prefix, connector, self.label.name()));
        }

        let child_prefix = if is_root {
            String::new()
        } else if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };

        let num_children = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.build_display(lines, child_prefix.clone(), i + 1 == num_children, false);
        }
    }
}

/// Bracketed form, e.g. `(S (NP (N holmes)) (VP (V arrived)))`.
impl Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.label.name());
        }
        write!(f, "({}", self.label.name())?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}

pub struct Subtrees<'a> {
    stack: Vec<&'a ParseTree>,
}

impl<'a> Iterator for Subtrees<'a> {
    type Item = &'a ParseTree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        self.stack.extend(tree.children.iter().rev());
        Some(tree)
    }
}

/// Builds trees tersely: `tree!("S", [tree!("NP", [tree!("holmes")])])`.
/// A bare string is a leaf.
#[macro_export]
macro_rules! tree {
    ($word:expr) => {
        $crate::tree::ParseTree::leaf($word)
    };
    ($label:expr, [$($child:expr),* $(,)?]) => {
        $crate::tree::ParseTree::node($label, vec![$($child),*])
    };
}
