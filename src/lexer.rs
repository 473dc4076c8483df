// ABOUTME: Lexer turning source lines into a flat token stream using nom recognisers

use crate::error::LexError;
use crate::source::SourceFile;
use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    IResult, Parser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Language,
    Identifier,
    Comment,
    Punctuation,
    Number,
    String,
    Character,
    Boolean,
}

/// One lexed token: its kind and the source text it carries. Punctuation
/// tokens carry exactly one of `( ) [ ] ' .`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

/// Lex a whole source file. The first token produced must be the `#lang
/// racket` Language token, otherwise lexing fails.
pub fn lex(source: &SourceFile) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();

    for line in source.lines() {
        lex_line(line, &mut tokens)?;
    }

    match tokens.first() {
        Some(token) if token.kind == TokenKind::Language => Ok(tokens),
        _ => Err(LexError::MissingLanguage),
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '+' | '-' | '*' | '/' | '!')
}

/// A number: optional sign, digits, at most one dot. A second dot is caught
/// by the caller, which sees it left over after the recogniser stops.
fn number_text(input: &str) -> IResult<&str, &str> {
    recognize((opt(char('-')), digit1, opt((char('.'), opt(digit1))))).parse(input)
}

fn identifier_text(input: &str) -> IResult<&str, &str> {
    take_while1(is_identifier_char)(input)
}

/// A string literal: content runs to the closing quote on the same line.
fn string_text(input: &str) -> IResult<&str, &str> {
    let (input, _) = char('"')(input)?;
    let (input, content) = take_while(|c| c != '"')(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, content))
}

fn lex_line(line: &str, tokens: &mut Vec<Token>) -> Result<(), LexError> {
    let mut rest = line;

    loop {
        rest = rest.trim_start_matches(' ');

        let Some(ch) = rest.chars().next() else {
            return Ok(());
        };

        match ch {
            // comment: the remainder of the line is one token
            ';' => {
                tokens.push(Token::new(TokenKind::Comment, &rest[1..]));
                return Ok(());
            }

            '#' => {
                rest = lex_hash(&rest[1..], tokens)?;
            }

            '(' | ')' | '[' | ']' | '\'' => {
                tokens.push(Token::new(TokenKind::Punctuation, &rest[..1]));
                rest = &rest[1..];
            }

            '"' => match string_text(rest) {
                Ok((after, content)) => {
                    tokens.push(Token::new(TokenKind::String, content));
                    rest = after;
                }
                Err(_) => {
                    return Err(LexError::UnterminatedString(rest[1..].to_string()));
                }
            },

            c if c.is_ascii_digit() || (c == '-' && starts_with_digit(&rest[1..])) => {
                match number_text(rest) {
                    Ok((after, text)) => {
                        // a second dot right after the recognised number is
                        // the two-dot case: 1.2.3
                        if after.starts_with('.') {
                            return Err(LexError::MalformedNumber(format!("{}.", text)));
                        }
                        tokens.push(Token::new(TokenKind::Number, text));
                        rest = after;
                    }
                    Err(_) => return Err(LexError::UnexpectedCharacter(c)),
                }
            }

            '.' => {
                tokens.push(Token::new(TokenKind::Punctuation, "."));
                rest = &rest[1..];
            }

            c if is_identifier_char(c) => match identifier_text(rest) {
                Ok((after, text)) => {
                    tokens.push(Token::new(TokenKind::Identifier, text));
                    rest = after;
                }
                Err(_) => return Err(LexError::UnexpectedCharacter(c)),
            },

            other => return Err(LexError::UnexpectedCharacter(other)),
        }
    }
}

/// Everything that starts with `#`: the language line, booleans, and
/// character literals. Returns the unconsumed remainder of the line.
fn lex_hash<'a>(after_hash: &'a str, tokens: &mut Vec<Token>) -> Result<&'a str, LexError> {
    // character literal: #\x, exactly one character
    if let Some(content) = after_hash.strip_prefix('\\') {
        let mut chars = content.chars();
        let Some(ch) = chars.next() else {
            return Err(LexError::BadCharacterLiteral(String::new()));
        };
        let rest = chars.as_str();
        if rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(LexError::BadCharacterLiteral(content.to_string()));
        }
        tokens.push(Token::new(TokenKind::Character, ch.to_string()));
        return Ok(rest);
    }

    // booleans: #t / #f
    if after_hash.starts_with('t') || after_hash.starts_with('f') {
        tokens.push(Token::new(TokenKind::Boolean, &after_hash[..1]));
        return Ok(&after_hash[1..]);
    }

    // the language line: must be exactly `#lang racket` to end of line
    if let Some(language) = after_hash.strip_prefix("lang ") {
        if language == "racket" {
            tokens.push(Token::new(TokenKind::Language, language));
            return Ok("");
        }
    }

    Err(LexError::UnsupportedLanguage(after_hash.to_string()))
}

fn starts_with_digit(input: &str) -> bool {
    input.starts_with(|c: char| c.is_ascii_digit())
}
