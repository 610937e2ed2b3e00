use itertools::{Itertools, PeekingNext};

use super::{LoadErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    Nonterminal(String),
    Terminal(String)
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

// Terminals may be quoted with either kind of quote, but must close with the
// one they opened with
pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let quote = match line.next() {
        Some(c) if is_quote(c) => c,
        _ => return Err(LoadErrorType::UnmatchedQuote),
    };
    let token_text = line.peeking_take_while(|&c| c != quote).collect();

    // Check if there is a close quote and consume it if there is
    if line.next() != Some(quote) {
        return Err(LoadErrorType::UnmatchedQuote);
    }

    Ok(Token::Terminal(token_text))
}

pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    Ok(Token::Nonterminal(line
        .peeking_take_while(|&c| !c.is_whitespace() && c != '|' && c != '-' && !is_quote(c))
        .collect()))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        if c == '-' {
            line_chars.next();
            if line_chars.next() != Some('>') {
                return Err(LoadErrorType::StrayDash);
            }
            tokens.push(Token::Arrow);
        } else if c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if is_quote(c) {
            tokens.push(lex_terminal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_nonterminal(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    #[test]
    fn lex_normal_terminal() {
        let lines = vec![
            "\"holmes\" sat down",
            "'thursday'",
            "\"a\"\"an\"'the'",
            "\"don't\"",
        ];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Terminal("holmes".to_string()), " sat down"),
            (Token::Terminal("thursday".to_string()), ""),
            (Token::Terminal("a".to_string()), "\"an\"'the'"),
            (Token::Terminal("don't".to_string()), ""),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_terminal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_mismatched_terminal() {
        let lines = vec![
            "\"holmes",
            "'holmes sat down",
            "\"holmes'",
        ];

        for line in lines {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_terminal(&mut chars).unwrap_err(), LoadErrorType::UnmatchedQuote);
        }
    }

    #[test]
    fn lex_normal_nonterminal() {
        let lines = vec![
            "NP VP",
            "Det",
            "Adj|AP",
        ];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (Token::Nonterminal("NP".to_string()), " VP"),
            (Token::Nonterminal("Det".to_string()), ""),
            (Token::Nonterminal("Adj".to_string()), "|AP"),
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_nonterminal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_normal_line() {
        let lines = vec![
            "S -> NP VP | S Conj S",
            "Det -> \"a\" | 'the'",
            "AP->Adj|Adj AP",
        ];
        let answers = vec![
            vec![
                Token::Nonterminal("S".to_string()),
                Token::Arrow,
                Token::Nonterminal("NP".to_string()),
                Token::Nonterminal("VP".to_string()),
                Token::Or,
                Token::Nonterminal("S".to_string()),
                Token::Nonterminal("Conj".to_string()),
                Token::Nonterminal("S".to_string()),
            ],
            vec![
                Token::Nonterminal("Det".to_string()),
                Token::Arrow,
                Token::Terminal("a".to_string()),
                Token::Or,
                Token::Terminal("the".to_string()),
            ],
            vec![
                Token::Nonterminal("AP".to_string()),
                Token::Arrow,
                Token::Nonterminal("Adj".to_string()),
                Token::Or,
                Token::Nonterminal("Adj".to_string()),
                Token::Nonterminal("AP".to_string()),
            ],
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(lex_line(line).unwrap(), answer)
        }
    }

    #[test]
    fn lex_stray_dash() {
        assert_eq!(lex_line("S - NP").unwrap_err(), LoadErrorType::StrayDash);
        assert_eq!(lex_line("S -").unwrap_err(), LoadErrorType::StrayDash);
    }
}
