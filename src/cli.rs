use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// File containing the sentence (default: prompt for one)
    pub file: Option<PathBuf>,

    /// File containing the grammar (default: the built-in English grammar)
    #[arg(short, long, value_name = "FILE")]
    pub grammar: Option<PathBuf>,

    /// Start symbol (default: first in the grammar)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Label of the constituents to chunk
    #[arg(short, long, value_name = "SYMBOL", default_value = "NP")]
    pub label: String,

    /// Log more (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
