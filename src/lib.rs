pub mod chart;
pub mod chunk;
pub mod error_handling;
pub mod grammar;
pub mod loader;
pub mod preprocess;
pub mod tree;

pub use chart::{parse, ChartParser, ParseError};
pub use chunk::{extract_constituents, phrase};
pub use grammar::{Grammar, MalformedGrammar, Production, Symbol};
pub use tree::ParseTree;
