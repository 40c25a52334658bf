//! Reading and writing [EDN](https://github.com/edn-format/edn).
//!
//! ```
//! let value = ednkit::from_str("{:name \"ednkit\" :tags #{:edn :codec}}").unwrap();
//! assert_eq!(value.get(&ednkit::Value::keyword("name")), Some(&ednkit::Value::from("ednkit")));
//! assert_eq!(ednkit::to_string(&value), "{:name \"ednkit\" :tags #{:edn :codec}}");
//! ```
//!
//! For several values in one input, use a [`Reader`]:
//!
//! ```
//! use ednkit::Reader;
//!
//! let mut reader = Reader::new();
//! reader.set_input("1 \"abc\" [1 2 3]");
//! let mut count = 0;
//! while let Some(_) = reader.parse_next_value().unwrap() {
//!     count += 1;
//! }
//! assert_eq!(count, 3);
//! assert!(reader.is_complete());
//! ```

pub mod edn;
pub mod error;

pub use edn::{
    read_next, CharacterTags, Ident, Reader, ReaderOptions, Value, Writer, WriterOptions,
    DEFAULT_MAX_DEPTH,
};
pub use error::{ErrorKind, ParseError, ParseResult};

/// Parse exactly one value.
pub fn from_str(text: &str) -> ParseResult<Value> {
    Reader::new().parse_single(text)
}

/// Parse exactly one value, reading keywords as plain strings (`:a/b` → `"a/b"`).
pub fn from_str_no_keywords(text: &str) -> ParseResult<Value> {
    Reader::with_options(ReaderOptions::new().with_keywords_as_strings(true)).parse_single(text)
}

pub fn to_string(value: &Value) -> String {
    Writer::new().serialize(value)
}

/// Serialize, writing string map keys as keywords where they are valid keyword names.
pub fn to_string_with_keyword_keys(value: &Value) -> String {
    Writer::with_options(WriterOptions::new().with_keywords_in_maps(true)).serialize(value)
}
