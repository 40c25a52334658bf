//! Lexical scanning of EDN text.
//!
//! The tokenizer is a pure function of the input and a byte offset: it skips
//! whitespace, commas and comments, then returns one token with its span.

use crate::edn::character::character_for_name;
use crate::edn::value::Ident;
use crate::error::{ErrorKind, ParseError, ParseResult};
use num_bigint::BigInt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

impl Delimiter {
    pub fn open_char(&self) -> char {
        match self {
            Delimiter::Paren => '(',
            Delimiter::Bracket => '[',
            Delimiter::Brace => '{',
        }
    }

    pub fn close_char(&self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
            Delimiter::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open(Delimiter),
    Close(Delimiter),
    /// `#{`
    SetOpen,
    /// `#_`
    Discard,
    Tag(Ident),
    String(String),
    Character(char),
    Keyword(Ident),
    Symbol(Ident),
    Integer(BigInt),
    Float(f64),
    End,
}

/// Byte range `[start, end)` of a token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Scan the token starting at or after `offset`.
///
/// At the end of input the result is `Token::End` with an empty span.
pub fn next_token(input: &str, offset: usize) -> ParseResult<(Token, Span)> {
    Scanner::new(input, offset).scan()
}

/// Offset of the first byte after `offset` that is not whitespace, a comma or
/// part of a comment.
pub fn skip_whitespace(input: &str, offset: usize) -> usize {
    let mut scanner = Scanner::new(input, offset);
    scanner.skip_whitespace_and_comments();
    scanner.position
}

fn is_terminator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';')
}

struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, offset: usize) -> Self {
        Self {
            input,
            position: offset.min(input.len()),
        }
    }

    fn scan(mut self) -> ParseResult<(Token, Span)> {
        self.skip_whitespace_and_comments();
        let start = self.position;
        let token = match self.peek() {
            None => Token::End,
            Some(ch) => self.scan_token(ch, start)?,
        };
        Ok((
            token,
            Span {
                start,
                end: self.position,
            },
        ))
    }

    fn scan_token(&mut self, ch: char, start: usize) -> ParseResult<Token> {
        match ch {
            '(' | '[' | '{' | ')' | ']' | '}' => {
                self.advance();
                Ok(match ch {
                    '(' => Token::Open(Delimiter::Paren),
                    '[' => Token::Open(Delimiter::Bracket),
                    '{' => Token::Open(Delimiter::Brace),
                    ')' => Token::Close(Delimiter::Paren),
                    ']' => Token::Close(Delimiter::Bracket),
                    _ => Token::Close(Delimiter::Brace),
                })
            }
            '"' => self.scan_string(start),
            '\\' => self.scan_character(start),
            ':' => self.scan_keyword(start),
            '#' => self.scan_dispatch(start),
            '0'..='9' => self.scan_number(start),
            '+' | '-' if self.peek_ahead(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            '.' if self
                .peek_ahead(1)
                .map_or(true, |c| c.is_ascii_digit() || is_terminator(c)) =>
            {
                let text = self.read_token_text();
                Err(self.error(
                    ErrorKind::InvalidNumber,
                    start,
                    format!("Invalid number: {}", text),
                ))
            }
            '^' | '\'' | '`' | '~' | '@' => {
                self.advance();
                Err(self.error(
                    ErrorKind::UnsupportedFeature,
                    start,
                    format!("Reader macro `{}` is not supported in EDN", ch),
                ))
            }
            _ => self.scan_symbol(start),
        }
    }

    fn scan_symbol(&mut self, start: usize) -> ParseResult<Token> {
        let text = self.read_token_text();
        Ident::parse_symbol(text)
            .map(Token::Symbol)
            .ok_or_else(|| self.error(ErrorKind::InvalidToken, start, format!("Invalid token: {}", text)))
    }

    fn scan_keyword(&mut self, start: usize) -> ParseResult<Token> {
        self.advance(); // consume ':'
        let text = self.read_token_text();
        if text.is_empty() {
            return Err(self.error(ErrorKind::InvalidKeyword, start, "Empty keyword"));
        }
        Ident::parse_keyword(text)
            .map(Token::Keyword)
            .ok_or_else(|| self.error(ErrorKind::InvalidKeyword, start, format!("Invalid keyword: :{}", text)))
    }

    fn scan_dispatch(&mut self, start: usize) -> ParseResult<Token> {
        self.advance(); // consume '#'
        match self.peek() {
            Some('_') => {
                self.advance();
                Ok(Token::Discard)
            }
            Some('{') => {
                self.advance();
                Ok(Token::SetOpen)
            }
            Some('#') => {
                self.advance();
                match self.read_token_text() {
                    "Inf" => Ok(Token::Float(f64::INFINITY)),
                    "-Inf" => Ok(Token::Float(f64::NEG_INFINITY)),
                    "NaN" => Ok(Token::Float(f64::NAN)),
                    other => Err(self.error(
                        ErrorKind::InvalidToken,
                        start,
                        format!("Unknown symbolic value: ##{}", other),
                    )),
                }
            }
            Some(c @ ('(' | '"' | '\'' | '=' | '^' | '?' | ':')) => Err(self.error(
                ErrorKind::UnsupportedFeature,
                start,
                format!("Dispatch macro `#{}` is not supported in EDN", c),
            )),
            Some(c) if c.is_alphabetic() => {
                let text = self.read_token_text();
                Ident::parse_symbol(text)
                    .map(Token::Tag)
                    .ok_or_else(|| self.error(ErrorKind::InvalidTag, start, format!("Invalid tag: #{}", text)))
            }
            Some(c) => Err(self.error(
                ErrorKind::InvalidTag,
                start,
                format!("Tags must start with an alphabetic character, found `{}`", c),
            )),
            None => Err(self.error(ErrorKind::InvalidTag, start, "Dispatch `#` at end of input")),
        }
    }

    fn scan_string(&mut self, start: usize) -> ParseResult<Token> {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            let escape_start = self.position;
            match self.advance() {
                None => {
                    return Err(self.error(ErrorKind::UnterminatedString, start, "Unterminated string"));
                }
                Some('"') => break,
                Some('\\') => {
                    let ch = match self.advance() {
                        None => {
                            return Err(self.error(
                                ErrorKind::UnterminatedString,
                                start,
                                "Unterminated string escape",
                            ))
                        }
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{08}',
                        Some('f') => '\u{0C}',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('u') => self.unicode_escape_in_string(escape_start)?,
                        Some(c) => {
                            return Err(self.error(
                                ErrorKind::InvalidEscape,
                                escape_start,
                                format!("Invalid escape sequence: \\{}", c),
                            ))
                        }
                    };
                    value.push(ch);
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::String(value))
    }

    /// Decode the digits after `\u`, combining a UTF-16 surrogate pair
    /// written as two consecutive escapes.
    fn unicode_escape_in_string(&mut self, escape_start: usize) -> ParseResult<char> {
        let code = self.read_hex4(ErrorKind::InvalidEscape, escape_start)?;
        let code = match code {
            0xD800..=0xDBFF => {
                if !self.input[self.position..].starts_with("\\u") {
                    return Err(self.error(
                        ErrorKind::InvalidEscape,
                        escape_start,
                        format!("Unpaired surrogate in string: \\u{:04X}", code),
                    ));
                }
                self.position += 2;
                let low = self.read_hex4(ErrorKind::InvalidEscape, escape_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(
                        ErrorKind::InvalidEscape,
                        escape_start,
                        format!("Invalid surrogate pair: \\u{:04X}\\u{:04X}", code, low),
                    ));
                }
                0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
            }
            other => other,
        };
        char::from_u32(code).ok_or_else(|| {
            self.error(
                ErrorKind::InvalidEscape,
                escape_start,
                format!("Invalid Unicode code point in string: U+{:04X}", code),
            )
        })
    }

    fn read_hex4(&mut self, kind: ErrorKind, at: usize) -> ParseResult<u32> {
        let digits = self.input[self.position..]
            .chars()
            .take(4)
            .take_while(|c| c.is_ascii_hexdigit())
            .count();
        if digits < 4 {
            return Err(self.error(kind, at, "Unicode escape requires exactly 4 hex digits"));
        }
        let hex = &self.input[self.position..self.position + 4];
        self.position += 4;
        u32::from_str_radix(hex, 16)
            .map_err(|_| self.error(kind, at, format!("Invalid hex digits in Unicode escape: {}", hex)))
    }

    fn scan_character(&mut self, start: usize) -> ParseResult<Token> {
        self.advance(); // consume '\'
        let first = match self.advance() {
            Some(c) if !c.is_whitespace() => c,
            _ => {
                return Err(self.error(
                    ErrorKind::InvalidCharacter,
                    start,
                    "Backslash must be followed by a character",
                ))
            }
        };
        let name_start = self.position - first.len_utf8();
        let rest = self.read_token_text();
        if rest.is_empty() {
            return Ok(Token::Character(first));
        }

        let name = &self.input[name_start..self.position];
        if first == 'u' && rest.len() == 4 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
            let code = u32::from_str_radix(rest, 16).ok();
            return code
                .and_then(char::from_u32)
                .map(Token::Character)
                .ok_or_else(|| {
                    self.error(
                        ErrorKind::InvalidCharacter,
                        start,
                        format!("Invalid Unicode code point: \\{}", name),
                    )
                });
        }
        character_for_name(name)
            .map(Token::Character)
            .ok_or_else(|| self.error(ErrorKind::InvalidCharacter, start, format!("Invalid character literal: \\{}", name)))
    }

    fn scan_number(&mut self, start: usize) -> ParseResult<Token> {
        let text = self.read_token_text();
        parse_number(text)
            .ok_or_else(|| self.error(ErrorKind::InvalidNumber, start, format!("Invalid number: {}", text)))
    }

    fn read_token_text(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if is_terminator(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.position]
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, kind: ErrorKind, at: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, self.input, at, message)
    }
}

/// Parse a complete numeric token.
///
/// Integers are `[+-]?(0|[1-9][0-9]*)N?`. Floats add a fraction, an exponent or
/// a trailing `M`. The `N` and `M` precision markers are accepted and dropped.
fn parse_number(text: &str) -> Option<Token> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = &text[int_start..i];
    if int_digits.is_empty() || (int_digits.len() > 1 && int_digits.starts_with('0')) {
        return None;
    }

    let rest = &text[i..];
    if rest.is_empty() || rest == "N" {
        let digits = &text[..i];
        let digits = digits.strip_prefix('+').unwrap_or(digits);
        return BigInt::from_str(digits).ok().map(Token::Integer);
    }

    let mut is_float = false;
    if bytes.get(i) == Some(&b'.') {
        is_float = true;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        is_float = true;
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    let float_text = &text[..i];
    match &text[i..] {
        "" if is_float => {}
        "M" => {}
        _ => return None,
    }

    float_text
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Token::Float)
}
