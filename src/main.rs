mod cli;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chunker::chart::ChartParser;
use chunker::chunk::{extract_constituents, phrase};
use chunker::grammar::Grammar;
use chunker::loader::{self, LoadErrors};
use chunker::preprocess::preprocess;
use cli::Cli;

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_grammar(cli: &Cli) -> Result<Grammar, LoadErrors> {
    match &cli.grammar {
        Some(path) => loader::load_file(path, cli.start.as_deref()),
        None => loader::load_str(loader::ENGLISH, Path::new("<builtin>"), cli.start.as_deref()),
    }
}

fn read_sentence(cli: &Cli) -> std::io::Result<String> {
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path);
    }

    print!("Sentence: ");
    std::io::stdout().flush()?;

    let mut sentence = String::new();
    std::io::stdin().read_line(&mut sentence)?;
    Ok(sentence)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let grammar = match load_grammar(&cli) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };

    let sentence = match read_sentence(&cli) {
        Ok(sentence) => sentence,
        Err(e) => {
            eprintln!("Could not read sentence: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tokens = preprocess(&sentence);
    debug!(?tokens, "preprocessed sentence");

    let trees = match ChartParser::new(&grammar).parse(&tokens) {
        Ok(trees) => trees,
        Err(e) => {
            println!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if trees.is_empty() {
        println!("Could not parse sentence.");
        return ExitCode::SUCCESS;
    }

    for tree in &trees {
        println!("{}", tree.display());
        println!();

        println!("{} Chunks", cli.label);
        for chunk in extract_constituents(tree, &cli.label) {
            println!("{}", phrase(chunk));
        }
        println!();
    }

    ExitCode::SUCCESS
}
