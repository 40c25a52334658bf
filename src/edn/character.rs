//! Character names and the integer-as-character marker table.

use crate::edn::Value;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Characters with a spelled-out EDN form, e.g. `\newline`.
const NAMED_CHARACTERS: [(&str, char); 6] = [
    ("newline", '\n'),
    ("space", ' '),
    ("tab", '\t'),
    ("return", '\r'),
    ("formfeed", '\u{0C}'),
    ("backspace", '\u{08}'),
];

pub fn character_for_name(name: &str) -> Option<char> {
    NAMED_CHARACTERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

pub fn name_for_character(ch: char) -> Option<&'static str> {
    NAMED_CHARACTERS
        .iter()
        .find(|(_, c)| *c == ch)
        .map(|(n, _)| *n)
}

/// Marks individual `Integer` values as characters for the writer.
///
/// Values arriving from integer-only sources (code points stored in a `Vec<u32>`,
/// say) lose the fact that they were characters. Marking is by identity: the
/// table remembers *which* `Value` was marked, not which number, so
/// `[10 10]` can have its first element written as `\newline` and its
/// second as `10`.
///
/// ```
/// use ednkit::{CharacterTags, Value, Writer};
///
/// let codes = Value::from(vec![104, 10]);
/// let mut tags = CharacterTags::new();
/// if let Value::Vector(items) = &codes {
///     tags.tag_as_character(&items[1]);
/// }
/// assert_eq!(Writer::new().serialize_with_characters(&codes, &tags), "[104 \\newline]");
/// ```
#[derive(Debug, Default)]
pub struct CharacterTags<'a> {
    marked: HashSet<usize>,
    _values: PhantomData<&'a Value>,
}

impl<'a> CharacterTags<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `number` as a character and hand it back.
    pub fn tag_as_character(&mut self, number: &'a Value) -> &'a Value {
        self.marked.insert(identity(number));
        number
    }

    pub fn is_character(&self, number: &Value) -> bool {
        self.marked.contains(&identity(number))
    }

    /// The character a marked integer stands for, if it is a Unicode scalar.
    pub fn character_for(&self, value: &Value) -> Option<char> {
        if !self.is_character(value) {
            return None;
        }
        value
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
            .and_then(char::from_u32)
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}

fn identity(value: &Value) -> usize {
    value as *const Value as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_named_characters() {
        assert_eq!(character_for_name("newline"), Some('\n'));
        assert_eq!(character_for_name("formfeed"), Some('\u{0C}'));
        assert_eq!(character_for_name("bell"), None);
        assert_eq!(name_for_character(' '), Some("space"));
        assert_eq!(name_for_character('a'), None);
    }

    #[test]
    fn test_marking_is_by_identity() {
        let first = Value::from(10);
        let second = Value::from(10);
        let mut tags = CharacterTags::new();
        assert!(tags.is_empty());

        let returned = tags.tag_as_character(&first);
        assert!(std::ptr::eq(returned, &first));
        assert!(tags.is_character(&first));
        assert!(!tags.is_character(&second));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_character_for() {
        let newline = Value::from(10);
        let surrogate = Value::from(0xD800);
        let text = Value::from("not a number");
        let mut tags = CharacterTags::new();
        tags.tag_as_character(&newline);
        tags.tag_as_character(&surrogate);
        tags.tag_as_character(&text);

        assert_eq!(tags.character_for(&newline), Some('\n'));
        assert_eq!(tags.character_for(&surrogate), None);
        assert_eq!(tags.character_for(&text), None);
    }
}
