use itertools::Itertools;

#[derive(Debug, PartialEq, Clone, Copy)]
enum CharClass {
    Word,
    Punctuation,
    Space,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Punctuation
    }
}

/// Splits `text` into runs of word characters and runs of punctuation,
/// dropping whitespace. "Holmes's pipe." becomes `Holmes ' s pipe .`
pub fn word_punct_tokenize(text: &str) -> Vec<&str> {
    let runs = text.char_indices().chunk_by(|&(_, c)| classify(c));

    let tokens = runs.into_iter()
        .filter(|(class, _)| *class != CharClass::Space)
        .filter_map(|(_, mut run)| {
            let (begin, first) = run.next()?;
            let (last, last_char) = run.last().unwrap_or((begin, first));
            Some(&text[begin..last + last_char.len_utf8()])
        })
        .collect();
    tokens
}

/// Turns a raw sentence into the words handed to the parser: lowercased,
/// with every token lacking an alphabetic character removed.
pub fn preprocess(sentence: &str) -> Vec<String> {
    let sentence = sentence.to_lowercase();

    word_punct_tokenize(&sentence)
        .into_iter()
        .filter(|word| word.chars().any(char::is_alphabetic))
        .map(str::to_string)
        .collect()
}
