/*
    This module loads grammars written as lines of `LHS -> alt | alt`
*/

mod lexer;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::debug;

use crate::error_handling::*;
use crate::grammar::*;
use lexer::Token;

/// The English grammar the chunker uses unless told otherwise.
pub const ENGLISH: &str = include_str!("../../example_data/english.cfg");

#[derive(Debug)]
pub enum LoadErrorType {
    // A line which should contain a rule does not
    MissingArrow,
    // A rule has multiple arrows
    UnexpectedArrow,
    // A `-` that does not start an arrow
    StrayDash,
    // The user starts a rule line with something other than a nonterminal
    MissingNonterminal,
    // There is an unclosed quote
    UnmatchedQuote,
    // The rules parse, but do not form a usable grammar
    Malformed(MalformedGrammar),
    // Somehow a full rewrite was parsed as a single alternative
    // This is a problem with the loader, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the loader
    // This is a problem with the loader, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for LoadErrorType {}

impl PartialEq for LoadErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoadErrorType::FileError(a), LoadErrorType::FileError(b)) => a.kind() == b.kind(),
            (LoadErrorType::Malformed(a), LoadErrorType::Malformed(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for LoadErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErrorType::MissingArrow => write!(f, "Expected `->` after nonterminal"),
            LoadErrorType::UnexpectedArrow => write!(f, "Unexpected `->` encountered"),
            LoadErrorType::StrayDash => write!(f, "Expected `>` after `-`"),
            LoadErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            LoadErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            LoadErrorType::Malformed(error) => write!(f, "{}", error),
            LoadErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with the loader, not the grammar)"),
            LoadErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule loader (this is a problem with the loader, not the grammar)"),
            LoadErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type LoadError = Error<LoadErrorType>;
pub type LoadErrors = Errors<LoadErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> LoadError {
    LoadError {
        location: Location::file(file.to_path_buf()),
        error: LoadErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, LoadErrorType>;
pub type LineResult<T> = std::result::Result<T, LoadError>;
pub type FileResult<T> = std::result::Result<T, LoadErrors>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    tokens.iter().map(|t| match t {
        Token::Arrow => Err(LoadErrorType::UnexpectedArrow),
        Token::Or => Err(LoadErrorType::UnsplitRewrite),
        Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
        Token::Terminal(s) => Ok(Symbol::Terminal(s.clone()))
    }).collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let symbol = match tokens.first() {
        Some(Token::Nonterminal(s)) => Ok(s.clone()),
        Some(_) => Err(LoadErrorType::MissingNonterminal),
        None => Err(LoadErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&Token::Arrow) {
        return Err(LoadErrorType::MissingArrow)
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    Ok(Rule {
        symbol,
        rewrite,
        location
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| LoadError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with('#')
}

// Returns an iterator over the rule lines of a source, with the io errors
// wrapped in LoadError and the lines numbered from 1
fn source_line_nums(source: impl BufRead, path: PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> {
    source
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, &path)))
        .enumerate()
        .map(|(num, line)| (num + 1, line))
        .filter(|(_, line)| line.as_ref().map_or(true, is_rule_line))
}

// Splits every rule into one production per alternative, checks them as a
// whole and points each problem back at the line that caused it
fn grammar_from_rules(rules: Vec<Rule>, file: &Path, start: Option<&str>) -> FileResult<Grammar> {
    let (productions, locations): (Vec<Production>, Vec<Location>) = rules
        .into_iter()
        .flat_map(|rule| {
            let Rule { symbol, rewrite, location } = rule;
            rewrite
                .into_iter()
                .map(move |alternative| (Production::new(symbol.clone(), alternative), location.clone()))
        })
        .unzip();

    let start_symbol = match start {
        Some(start) => start.to_string(),
        None => productions.first().map(|p| p.lhs.clone()).unwrap_or_default(),
    };

    let problems = find_problems(&start_symbol, &productions);
    if !problems.is_empty() {
        return Err(problems
            .into_iter()
            .map(|(index, problem)| LoadError {
                location: index
                    .and_then(|index| locations.get(index).cloned())
                    .unwrap_or_else(|| Location::file(file.to_path_buf())),
                error: LoadErrorType::Malformed(problem)
            })
            .collect());
    }

    Grammar::new(start_symbol, productions).map_err(|problems| {
        problems
            .into_iter()
            .map(|problem| LoadError {
                location: Location::file(file.to_path_buf()),
                error: LoadErrorType::Malformed(problem)
            })
            .collect()
    })
}

/// Loads a grammar from `source`, naming `file` in any errors. The start
/// symbol is `start` if given, otherwise the first rule's left-hand side.
pub fn load_reader(source: impl BufRead, file: &Path, start: Option<&str>) -> FileResult<Grammar> {
    let parsed_lines = source_line_nums(source, file.to_path_buf()).map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: file.to_path_buf(),
            line: num
        }))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    let grammar = grammar_from_rules(rules, file, start)?;
    debug!(
        file = %file.display(),
        productions = grammar.production_count(),
        start = grammar.start_symbol(),
        "loaded grammar"
    );
    Ok(grammar)
}

pub fn load_str(text: &str, file: &Path, start: Option<&str>) -> FileResult<Grammar> {
    load_reader(text.as_bytes(), file, start)
}

pub fn load_file(path: &PathBuf, start: Option<&str>) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    load_reader(std::io::BufReader::new(file), path, start)
}

/// The built-in English grammar.
pub fn english() -> FileResult<Grammar> {
    load_str(ENGLISH, Path::new("<builtin>"), None)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::grammar::tests::{nt, rule, t};

    fn location(line: usize) -> Location {
        Location {
            file: PathBuf::from("test.cfg"),
            line
        }
    }

    fn load_test(text: &str) -> FileResult<Grammar> {
        load_str(text, Path::new("test.cfg"), None)
    }

    #[test]
    fn parse_normal_alternative() {
        let lines = vec![
            vec![
                Token::Nonterminal("Det".to_string()),
                Token::Nonterminal("AP".to_string()),
                Token::Nonterminal("N".to_string()),
            ],
            vec![
                Token::Terminal("to".to_string()),
                Token::Nonterminal("NP".to_string())
            ]
        ];
        let answers = vec![
            vec![nt("Det"), nt("AP"), nt("N")],
            vec![t("to"), nt("NP")]
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_alternative(&line[..]).unwrap(), answer);
        }
    }

    #[test]
    fn parse_malformed_alternative() {
        assert_eq!(parse_alternative(&[Token::Arrow]), Err(LoadErrorType::UnexpectedArrow));
        assert_eq!(parse_alternative(&[Token::Or]), Err(LoadErrorType::UnsplitRewrite));
    }

    #[test]
    fn parse_normal_line() {
        let lexed = lexer::lex_line("NP -> N | Det AP N").unwrap();

        let answer = Rule {
            symbol: "NP".to_string(),
            rewrite: vec![
                vec![nt("N")],
                vec![nt("Det"), nt("AP"), nt("N")]
            ],
            location: location(3)
        };

        assert_eq!(parse_line(&lexed[..], location(3)), Ok(answer));
    }

    #[test]
    fn parse_malformed_line() {
        // Blank
        assert_eq!(parse_line(&[], location(1)), Err(LoadErrorType::UnexpectedBlankLine));

        // Missing arrow
        assert_eq!(parse_line(
            &lexer::lex_line("NP Det N").unwrap()[..],
            location(1)
        ), Err(LoadErrorType::MissingArrow));

        // Improper definition
        assert_eq!(parse_line(
            &lexer::lex_line("\"holmes\" -> N").unwrap()[..],
            location(1)
        ), Err(LoadErrorType::MissingNonterminal));
        assert_eq!(parse_line(
            &lexer::lex_line("| -> NP VP").unwrap()[..],
            location(1)
        ), Err(LoadErrorType::MissingNonterminal));
        assert_eq!(parse_line(
            &lexer::lex_line("-> NP VP").unwrap()[..],
            location(1)
        ), Err(LoadErrorType::MissingNonterminal));

        // Two arrows
        assert_eq!(parse_line(
            &lexer::lex_line("S -> NP -> VP").unwrap()[..],
            location(1)
        ), Err(LoadErrorType::UnexpectedArrow));
    }

    #[test]
    fn load_merges_repeated_left_hand_sides() {
        let grammar = load_test("
            # nouns come in two lines
            S -> N
            N -> \"holmes\" | \"pipe\"

            N -> 'smile'
        ").unwrap();

        assert_eq!(grammar.start_symbol(), "S");
        assert_eq!(grammar.rules_for("N"), &[
            rule("N", &[t("holmes")]),
            rule("N", &[t("pipe")]),
            rule("N", &[t("smile")]),
        ]);
    }

    #[test]
    fn load_with_start_override() {
        let grammar = load_str("S -> NP\nNP -> N\nN -> 'holmes'", Path::new("test.cfg"), Some("NP")).unwrap();
        assert_eq!(grammar.start_symbol(), "NP");

        let errors = load_str("S -> NP\nNP -> 'holmes'", Path::new("test.cfg"), Some("VP")).unwrap_err();
        assert_eq!(errors, vec![LoadError {
            location: Location::file(PathBuf::from("test.cfg")),
            error: LoadErrorType::Malformed(MalformedGrammar::UndefinedStart("VP".to_string()))
        }]);
    }

    #[test]
    fn load_reports_grammar_problems_by_line() {
        let errors = load_test("
            S -> NP VP
            NP -> Det N | N
            VP -> V |
            N -> 'holmes'
        ").unwrap_err();

        assert_eq!(errors, vec![
            LoadError {
                location: location(3),
                error: LoadErrorType::Malformed(MalformedGrammar::UndefinedNonterminal {
                    symbol: "Det".to_string(),
                    used_by: "NP".to_string()
                })
            },
            LoadError {
                location: location(4),
                error: LoadErrorType::Malformed(MalformedGrammar::UndefinedNonterminal {
                    symbol: "V".to_string(),
                    used_by: "VP".to_string()
                })
            },
            LoadError {
                location: location(4),
                error: LoadErrorType::Malformed(MalformedGrammar::EmptyRightHandSide("VP".to_string()))
            },
        ]);
    }

    #[test]
    fn load_empty_source() {
        assert_eq!(load_test("# nothing here\n\n").unwrap_err(), vec![LoadError {
            location: Location::file(PathBuf::from("test.cfg")),
            error: LoadErrorType::Malformed(MalformedGrammar::NoProductions)
        }]);
    }

    #[test]
    fn load_english_file() {
        let path = PathBuf::from("example_data/english.cfg");
        let from_file = load_file(&path, None).unwrap();
        let builtin = english().unwrap();

        assert_eq!(from_file, builtin);
        assert_eq!(builtin.start_symbol(), "S");
        assert_eq!(builtin.rules_for("S"), &[
            rule("S", &[nt("NP"), nt("VP")]),
            rule("S", &[nt("VP"), nt("NP")]),
            rule("S", &[nt("S"), nt("Conj"), nt("S")]),
        ]);
        let counts: Vec<(&str, usize)> = builtin
            .nonterminals()
            .map(|symbol| (symbol, builtin.rules_for(symbol).len()))
            .collect();
        assert_eq!(counts, vec![
            ("S", 3), ("NP", 4), ("VP", 5), ("AP", 2), ("PP", 1),
            ("Adj", 6), ("Adv", 3), ("Conj", 2), ("Det", 5), ("N", 20), ("P", 6), ("V", 10),
        ]);
    }

    #[test]
    fn load_ambiguous_file() {
        let grammar = load_file(&PathBuf::from("example_data/ambiguous.cfg"), None).unwrap();

        assert_eq!(grammar.rules_for("N"), &[rule("N", &[t("dog")]), rule("N", &[t("cat")])]);
        assert_eq!(grammar.production_count(), 9);
    }

    #[test]
    fn load_malformed_file() {
        let path = PathBuf::from("example_data/malformed.cfg");
        let errors = load_file(&path, None).unwrap_err();

        assert_eq!(errors, vec![
            LoadError {
                location: Location {
                    file: path.clone(),
                    line: 4
                },
                error: LoadErrorType::MissingArrow
            },
            LoadError {
                location: Location {
                    file: path,
                    line: 6
                },
                error: LoadErrorType::UnmatchedQuote
            }
        ]);
    }

    #[test]
    fn load_missing_file() {
        let path = PathBuf::from("example_data/nonexistent.cfg");
        let errors = load_file(&path, None).unwrap_err();

        assert_eq!(errors, vec![LoadError {
            location: Location::file(path),
            error: LoadErrorType::FileError(std::io::Error::from(std::io::ErrorKind::NotFound))
        }]);
    }
}
