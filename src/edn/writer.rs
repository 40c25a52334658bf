//! Canonical EDN output.

use crate::edn::character::{name_for_character, CharacterTags};
use crate::edn::value::{Ident, Value};

/// Writer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Write string map keys that are valid keyword names as keywords, so a
    /// map built from `HashMap<String, _>` comes out as `{:name "x"}` rather
    /// than `{"name" "x"}`. Off by default, since it changes the value read
    /// back.
    pub use_keywords_in_maps: bool,
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords_in_maps(mut self, enabled: bool) -> Self {
        self.use_keywords_in_maps = enabled;
        self
    }
}

/// Serializes [`Value`]s as canonical EDN: single spaces between elements,
/// no trailing whitespace, maps and sets in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    pub fn serialize(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, None);
        out
    }

    /// Serialize, writing every integer marked in `characters` as a character.
    pub fn serialize_with_characters(&self, value: &Value, characters: &CharacterTags<'_>) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, Some(characters));
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, characters: Option<&CharacterTags<'_>>) {
        match value {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => match characters.and_then(|c| c.character_for(value)) {
                Some(ch) => write_character(out, ch),
                None => out.push_str(&n.to_string()),
            },
            Value::Float(f) => write_float(out, *f),
            Value::String(s) => write_string(out, s),
            Value::Character(c) => write_character(out, *c),
            Value::Symbol(ident) => write_ident(out, ident),
            Value::Keyword(ident) => {
                out.push(':');
                write_ident(out, ident);
            }
            Value::List(items) => self.write_sequence(out, "(", ")", items.iter(), characters),
            Value::Vector(items) => self.write_sequence(out, "[", "]", items.iter(), characters),
            Value::Set(items) => self.write_sequence(out, "#{", "}", items.iter(), characters),
            Value::Map(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.write_map_key(out, key, characters);
                    out.push(' ');
                    self.write_value(out, value, characters);
                }
                out.push('}');
            }
            Value::Tagged { tag, value } => {
                out.push('#');
                write_ident(out, tag);
                out.push(' ');
                self.write_value(out, value, characters);
            }
        }
    }

    fn write_sequence<'v>(
        &self,
        out: &mut String,
        open: &str,
        close: &str,
        items: impl Iterator<Item = &'v Value>,
        characters: Option<&CharacterTags<'_>>,
    ) {
        out.push_str(open);
        for (i, item) in items.enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.write_value(out, item, characters);
        }
        out.push_str(close);
    }

    fn write_map_key(&self, out: &mut String, key: &Value, characters: Option<&CharacterTags<'_>>) {
        if self.options.use_keywords_in_maps {
            if let Value::String(s) = key {
                if let Some(ident) = Ident::parse_keyword(s) {
                    out.push(':');
                    write_ident(out, &ident);
                    return;
                }
            }
        }
        self.write_value(out, key, characters);
    }
}

fn write_ident(out: &mut String, ident: &Ident) {
    if let Some(namespace) = &ident.namespace {
        out.push_str(namespace);
        out.push('/');
    }
    out.push_str(&ident.name);
}

/// Shortest text that reads back as the same `f64`, always with a decimal
/// point so it cannot be mistaken for an integer.
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("##NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "##Inf" } else { "##-Inf" });
    } else {
        let text = format!("{:?}", f);
        match text.find(|c: char| c == 'e' || c == 'E') {
            Some(exp) if !text[..exp].contains('.') => {
                out.push_str(&text[..exp]);
                out.push_str(".0");
                out.push_str(&text[exp..]);
            }
            _ if !text.contains('.') => {
                out.push_str(&text);
                out.push_str(".0");
            }
            _ => out.push_str(&text),
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_character(out: &mut String, c: char) {
    out.push('\\');
    if let Some(name) = name_for_character(c) {
        out.push_str(name);
    } else if (c.is_control() || c.is_whitespace()) && (c as u32) <= 0xFFFF {
        out.push_str(&format!("u{:04X}", c as u32));
    } else {
        out.push(c);
    }
}
