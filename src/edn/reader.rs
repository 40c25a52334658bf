//! Recursive-descent reader turning EDN text into [`Value`]s.

use crate::edn::tokenizer::{next_token, skip_whitespace, Delimiter, Span, Token};
use crate::edn::value::{Ident, Value};
use crate::error::{ErrorKind, ParseError, ParseResult};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Read keywords as plain strings holding their name (`:a/b` becomes `"a/b"`).
    pub keywords_as_strings: bool,
    /// Deepest nesting of collections, tags and discards accepted before
    /// failing with `DepthLimitExceeded`.
    pub max_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            keywords_as_strings: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords_as_strings(mut self, enabled: bool) -> Self {
        self.keywords_as_strings = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Read the next top-level value at or after `offset`.
///
/// Returns the value together with the offset just past it, or `None` when
/// only whitespace, comments and discarded forms remain. This function holds
/// no state between calls; [`Reader`] is a convenience wrapper around it.
pub fn read_next(input: &str, offset: usize, options: &ReaderOptions) -> ParseResult<Option<(Value, usize)>> {
    let mut cursor = Cursor::new(input, offset, options);
    match cursor.read_item()? {
        Item::Value(value) => Ok(Some((value, cursor.offset))),
        Item::End => Ok(None),
        Item::Close(delimiter, span) => Err(cursor.error(
            ErrorKind::InvalidToken,
            span.start,
            format!("Unexpected `{}` with no open collection", delimiter.close_char()),
        )),
    }
}

/// A stateful reader over one input string.
///
/// Successive [`parse_next_value`](Reader::parse_next_value) calls share a
/// cursor, and the first error is kept until new input is assigned. A
/// `Reader` needs `&mut self` for every read; share one between threads only
/// behind a lock.
///
/// ```
/// use ednkit::{Reader, Value};
///
/// let mut reader = Reader::new();
/// reader.set_input("1 \"abc\" [1 2 3]");
///
/// let mut values = Vec::new();
/// while !reader.is_complete() {
///     if let Some(value) = reader.parse_next_value().unwrap() {
///         values.push(value);
///     }
/// }
/// assert_eq!(values, vec![Value::from(1), Value::from("abc"), Value::from(vec![1, 2, 3])]);
/// ```
#[derive(Debug, Clone)]
pub struct Reader {
    input: String,
    offset: usize,
    error: Option<ParseError>,
    complete: bool,
    options: ReaderOptions,
}

impl Default for Reader {
    fn default() -> Self {
        Self::with_options(ReaderOptions::default())
    }
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self {
            input: String::new(),
            offset: 0,
            error: None,
            complete: true,
            options,
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Assign new input, discarding any previous position and error.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.offset = 0;
        self.error = None;
        self.complete = self.at_end(0);
    }

    /// Clear input, position and error.
    pub fn reset(&mut self) {
        self.set_input(String::new());
    }

    /// True once no further value remains or an error has occurred.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Parse the next value of the current input.
    ///
    /// `Ok(None)` means the input is exhausted. After a failure the same
    /// error is returned by every call until the input is reassigned.
    pub fn parse_next_value(&mut self) -> ParseResult<Option<Value>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match read_next(&self.input, self.offset, &self.options) {
            Ok(Some((value, offset))) => {
                self.offset = offset;
                self.complete = self.at_end(offset);
                Ok(Some(value))
            }
            Ok(None) => {
                self.offset = self.input.len();
                self.complete = true;
                Ok(None)
            }
            Err(err) => {
                self.error = Some(err.clone());
                self.complete = true;
                Err(err)
            }
        }
    }

    /// Parse `input`, which must hold exactly one value.
    pub fn parse_single(&mut self, input: impl Into<String>) -> ParseResult<Value> {
        self.set_input(input);
        let value = match self.parse_next_value()? {
            Some(value) => value,
            None => {
                let end = self.input.len();
                return Err(self.fail(ErrorKind::NoExpression, end, "No value found in input"));
            }
        };
        let next_start = skip_whitespace(&self.input, self.offset);
        match self.parse_next_value()? {
            None => Ok(value),
            Some(_) => Err(self.fail(
                ErrorKind::MultipleValues,
                next_start,
                "Expected a single value but found more",
            )),
        }
    }

    fn at_end(&self, offset: usize) -> bool {
        skip_whitespace(&self.input, offset) >= self.input.len()
    }

    fn fail(&mut self, kind: ErrorKind, offset: usize, message: &str) -> ParseError {
        let err = ParseError::new(kind, &self.input, offset, message);
        self.error = Some(err.clone());
        self.complete = true;
        err
    }
}

enum Item {
    Value(Value),
    Close(Delimiter, Span),
    End,
}

struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    options: &'a ReaderOptions,
    /// Offsets of the currently open collections, tags and discards.
    open: SmallVec<[usize; 16]>,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, offset: usize, options: &'a ReaderOptions) -> Self {
        Self {
            input,
            offset,
            options,
            open: SmallVec::new(),
        }
    }

    fn next(&mut self) -> ParseResult<(Token, Span)> {
        let (token, span) = next_token(self.input, self.offset)?;
        self.offset = span.end;
        Ok((token, span))
    }

    /// Read one form, skipping discarded ones. Close delimiters and the end of
    /// input are handed back to the caller.
    fn read_item(&mut self) -> ParseResult<Item> {
        loop {
            let (token, span) = self.next()?;
            let value = match token {
                Token::End => return Ok(Item::End),
                Token::Close(delimiter) => return Ok(Item::Close(delimiter, span)),
                Token::Discard => {
                    self.discard(span)?;
                    continue;
                }
                Token::Open(Delimiter::Paren) => Value::List(self.read_elements(Delimiter::Paren, span, "list")?),
                Token::Open(Delimiter::Bracket) => {
                    Value::Vector(self.read_elements(Delimiter::Bracket, span, "vector")?)
                }
                Token::Open(Delimiter::Brace) => self.read_map(span)?,
                Token::SetOpen => {
                    let items = self.read_elements(Delimiter::Brace, span, "set")?;
                    Value::Set(items.into_iter().collect::<IndexSet<_>>())
                }
                Token::Tag(tag) => self.read_tagged(tag, span)?,
                Token::String(s) => Value::String(s),
                Token::Character(c) => Value::Character(c),
                Token::Integer(n) => Value::Integer(n),
                Token::Float(f) => Value::Float(f),
                Token::Keyword(ident) => {
                    if self.options.keywords_as_strings {
                        Value::String(ident.to_string())
                    } else {
                        Value::Keyword(ident)
                    }
                }
                Token::Symbol(ident) => literal_or_symbol(ident),
            };
            return Ok(Item::Value(value));
        }
    }

    fn read_elements(&mut self, delimiter: Delimiter, open: Span, what: &str) -> ParseResult<Vec<Value>> {
        self.enter(open.start)?;
        let mut items = Vec::new();
        loop {
            match self.read_item()? {
                Item::Value(value) => items.push(value),
                Item::Close(close, _) if close == delimiter => break,
                Item::Close(close, span) => {
                    return Err(self.error(
                        ErrorKind::InvalidToken,
                        span.start,
                        format!(
                            "Expected `{}` to close {} but found `{}`",
                            delimiter.close_char(),
                            what,
                            close.close_char()
                        ),
                    ))
                }
                Item::End => {
                    let opener = &self.input[open.start..open.end];
                    return Err(self.error(
                        ErrorKind::UnterminatedCollection,
                        open.start,
                        format!("Unterminated {}: `{}` is never closed", what, opener),
                    ));
                }
            }
        }
        self.leave();
        Ok(items)
    }

    fn read_map(&mut self, open: Span) -> ParseResult<Value> {
        let items = self.read_elements(Delimiter::Brace, open, "map")?;
        if items.len() % 2 != 0 {
            return Err(self.error(
                ErrorKind::UnsupportedFeature,
                open.start,
                "Map literal must contain an even number of forms",
            ));
        }
        let mut map = IndexMap::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn read_tagged(&mut self, tag: Ident, open: Span) -> ParseResult<Value> {
        self.enter(open.start)?;
        let value = match self.read_item()? {
            Item::Value(value) => value,
            Item::Close(..) | Item::End => {
                return Err(self.error(
                    ErrorKind::InvalidTag,
                    open.start,
                    format!("Tag `#{}` is not followed by a value", tag),
                ))
            }
        };
        self.leave();
        Ok(Value::tagged(tag, value))
    }

    fn discard(&mut self, open: Span) -> ParseResult<()> {
        self.enter(open.start)?;
        match self.read_item()? {
            Item::Value(_) => {}
            Item::Close(..) | Item::End => {
                return Err(self.error(
                    ErrorKind::InvalidDiscard,
                    open.start,
                    "Discard `#_` is not followed by a value",
                ))
            }
        }
        self.leave();
        Ok(())
    }

    fn enter(&mut self, offset: usize) -> ParseResult<()> {
        if self.open.len() >= self.options.max_depth {
            return Err(self.error(
                ErrorKind::DepthLimitExceeded,
                offset,
                format!("Nesting deeper than {} levels", self.options.max_depth),
            ));
        }
        self.open.push(offset);
        Ok(())
    }

    fn leave(&mut self) {
        self.open.pop();
    }

    fn error(&self, kind: ErrorKind, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(kind, self.input, offset, message)
    }
}

fn literal_or_symbol(ident: Ident) -> Value {
    if ident.namespace.is_none() {
        match ident.name.as_str() {
            "nil" => return Value::Nil,
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::Symbol(ident)
}
