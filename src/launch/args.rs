// src/launch/args.rs

use crate::errors::{DevloopError, Result};

/// Split a command-line string into arguments the way a POSIX shell would
/// for simple cases: whitespace separates words, single quotes are literal,
/// double quotes group, and a backslash escapes the next character outside
/// single quotes.
///
/// `-Dfoo="a b" --flag` becomes `["-Dfoo=a b", "--flag"]`.
pub fn split_args(input: &str) -> Result<Vec<String>> {
    #[derive(PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next) => current.push(next),
                    None => current.push('\\'),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        args.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(DevloopError::Config(format!(
            "unbalanced quotes in argument string: {input}"
        )));
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}
