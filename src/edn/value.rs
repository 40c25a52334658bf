use crate::edn::writer::Writer;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Punctuation allowed inside symbols and keywords, besides alphanumerics.
const SYMBOL_PUNCTUATION: &str = ".*+!-_?$%&=<>':#";

/// A symbol, keyword or tag name with an optional namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    pub namespace: Option<String>,
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parse symbol text such as `foo`, `my.ns/foo` or `/`.
    ///
    /// Returns `None` when the text does not follow EDN symbol grammar.
    pub fn parse_symbol(text: &str) -> Option<Self> {
        if text == "/" {
            return Some(Ident::new("/"));
        }
        match text.split_once('/') {
            Some((namespace, name)) => {
                (is_valid_part(namespace) && is_valid_part(name)).then(|| Ident::namespaced(namespace, name))
            }
            None => is_valid_part(text).then(|| Ident::new(text)),
        }
    }

    /// Parse keyword text with the leading `:` already removed.
    pub fn parse_keyword(text: &str) -> Option<Self> {
        if text == "/" {
            return None;
        }
        Self::parse_symbol(text)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

pub(crate) fn is_symbol_char(ch: char) -> bool {
    ch.is_alphanumeric() || SYMBOL_PUNCTUATION.contains(ch)
}

fn is_valid_part(part: &str) -> bool {
    let mut chars = part.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return false,
    };
    if first.is_ascii_digit() || matches!(first, ':' | '#' | '\'') {
        return false;
    }
    if matches!(first, '+' | '-' | '.') && chars.clone().next().map_or(false, |c| c.is_ascii_digit()) {
        return false;
    }
    is_symbol_char(first) && chars.all(is_symbol_char)
}

/// An EDN value.
///
/// Maps and sets keep insertion order for output, but compare equal
/// regardless of order. Floats compare by bit pattern, which keeps equality
/// reflexive (`##NaN` equals itself) so values can be used as map keys.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    String(String),
    Character(char),
    Symbol(Ident),
    Keyword(Ident),
    List(Vec<Value>),
    Vector(Vec<Value>),
    Set(IndexSet<Value>),
    Map(IndexMap<Value, Value>),
    Tagged { tag: Ident, value: Box<Value> },
}

impl Value {
    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(Ident::new(name))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Ident::new(name))
    }

    pub fn tagged(tag: Ident, value: Value) -> Self {
        Value::Tagged {
            tag,
            value: Box::new(value),
        }
    }

    /// Build a map from key/value pairs; a repeated key keeps the last value.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut map = IndexMap::new();
        for (k, v) in pairs {
            map.insert(k.into(), v.into());
        }
        Value::Map(map)
    }

    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// A `Character` for the given code point, if it is a Unicode scalar.
    pub fn character_code(code: u32) -> Option<Self> {
        char::from_u32(code).map(Value::Character)
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Character(_) => "character",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Tagged { .. } => "tagged",
        }
    }

    /// The tag in front of a tagged value, e.g. `myapp/point` for
    /// `#myapp/point {:x 1}`.
    pub fn tag(&self) -> Option<&Ident> {
        match self {
            Value::Tagged { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// The wrapped value of a tagged value, or the value itself.
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Tagged { value, .. } => value.untagged(),
            other => other,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|n| i64::try_from(n).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Character(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&Ident> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Ident> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Get the count of elements in a collection
    pub fn count(&self) -> Option<usize> {
        match self {
            Value::List(items) | Value::Vector(items) => Some(items.len()),
            Value::Set(s) => Some(s.len()),
            Value::Map(m) => Some(m.len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Get value by key (for maps) or index (for lists and vectors)
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match (self, key) {
            (Value::Map(m), k) => m.get(k),
            (Value::List(items) | Value::Vector(items), Value::Integer(i)) => {
                usize::try_from(i).ok().and_then(|i| items.get(i))
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (
                Value::Tagged { tag: t1, value: v1 },
                Value::Tagged { tag: t2, value: v2 },
            ) => t1 == t2 && v1 == v2,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Character(c) => c.hash(state),
            Value::Symbol(s) | Value::Keyword(s) => s.hash(state),
            Value::List(items) | Value::Vector(items) => items.hash(state),
            Value::Set(s) => {
                s.len().hash(state);
                unordered_hash(s.iter()).hash(state);
            }
            Value::Map(m) => {
                m.len().hash(state);
                unordered_hash(m.iter()).hash(state);
            }
            Value::Tagged { tag, value } => {
                tag.hash(state);
                value.hash(state);
            }
        }
    }
}

// Order-independent combination, so equal maps and sets hash alike.
fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items
        .map(|item| {
            let mut hasher = DefaultHasher::new();
            item.hash(&mut hasher);
            hasher.finish()
        })
        .fold(0u64, u64::wrapping_add)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Writer::new().serialize(self))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(BigInt::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Character(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Vector(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::map(map)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::map(map)
    }
}

impl<T: Into<Value>, S> From<HashSet<T, S>> for Value {
    fn from(set: HashSet<T, S>) -> Self {
        Value::set(set)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(set: BTreeSet<T>) -> Self {
        Value::set(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::from("test").type_name(), "string");
        assert_eq!(Value::keyword("key").type_name(), "keyword");
        assert_eq!(Value::from(42).type_name(), "integer");
        assert_eq!(Value::tagged(Ident::new("inst"), Value::from("x")).type_name(), "tagged");
    }

    #[test]
    fn test_symbol_grammar() {
        assert_eq!(Ident::parse_symbol("foo"), Some(Ident::new("foo")));
        assert_eq!(Ident::parse_symbol("my.ns/foo"), Some(Ident::namespaced("my.ns", "foo")));
        assert_eq!(Ident::parse_symbol("/"), Some(Ident::new("/")));
        assert_eq!(Ident::parse_symbol("-"), Some(Ident::new("-")));
        assert_eq!(Ident::parse_symbol("-foo"), Some(Ident::new("-foo")));
        assert_eq!(Ident::parse_symbol("valid?"), Some(Ident::new("valid?")));
        assert_eq!(Ident::parse_symbol("<=>"), Some(Ident::new("<=>")));
        assert_eq!(Ident::parse_symbol("a'b"), Some(Ident::new("a'b")));

        assert_eq!(Ident::parse_symbol(""), None);
        assert_eq!(Ident::parse_symbol("1abc"), None);
        assert_eq!(Ident::parse_symbol("-1"), None);
        assert_eq!(Ident::parse_symbol(".5x"), None);
        assert_eq!(Ident::parse_symbol("ns/"), None);
        assert_eq!(Ident::parse_symbol("/name"), None);
        assert_eq!(Ident::parse_symbol("a/b/c"), None);
        assert_eq!(Ident::parse_symbol("a\\b"), None);
        assert_eq!(Ident::parse_symbol(":a"), None);
    }

    #[test]
    fn test_keyword_grammar() {
        assert_eq!(Ident::parse_keyword("key"), Some(Ident::new("key")));
        assert_eq!(Ident::parse_keyword("ns/key"), Some(Ident::namespaced("ns", "key")));
        assert_eq!(Ident::parse_keyword("/"), None);
        assert_eq!(Ident::parse_keyword("has space"), None);
    }

    #[test]
    fn test_ident_display() {
        assert_eq!(Ident::new("foo").to_string(), "foo");
        assert_eq!(Ident::namespaced("myapp", "point").to_string(), "myapp/point");
    }

    #[test]
    fn test_count() {
        let vec = Value::from(vec![1, 2, 3]);
        assert_eq!(vec.count(), Some(3));

        let map_val = Value::map([(Value::keyword("a"), 1)]);
        assert_eq!(map_val.count(), Some(1));

        assert_eq!(Value::from("hello").count(), Some(5));
        assert_eq!(Value::from(42).count(), None);
    }

    #[test]
    fn test_get() {
        let vec = Value::from(vec![10, 20, 30]);
        assert_eq!(vec.get(&Value::from(0)), Some(&Value::from(10)));
        assert_eq!(vec.get(&Value::from(2)), Some(&Value::from(30)));
        assert_eq!(vec.get(&Value::from(5)), None);
        assert_eq!(vec.get(&Value::from(-1)), None);

        let map_val = Value::map([(Value::keyword("name"), "Alice")]);
        assert_eq!(map_val.get(&Value::keyword("name")), Some(&Value::from("Alice")));
        assert_eq!(map_val.get(&Value::keyword("age")), None);
    }

    #[test]
    fn test_map_last_write_wins() {
        let map_val = Value::map([(Value::keyword("a"), 1), (Value::keyword("a"), 2)]);
        assert_eq!(map_val.count(), Some(1));
        assert_eq!(map_val.get(&Value::keyword("a")), Some(&Value::from(2)));
    }

    #[test]
    fn test_unordered_equality() {
        let a = Value::map([(Value::keyword("a"), 1), (Value::keyword("b"), 2)]);
        let b = Value::map([(Value::keyword("b"), 2), (Value::keyword("a"), 1)]);
        assert_eq!(a, b);

        let s1 = Value::set([1, 2, 3]);
        let s2 = Value::set([3, 1, 2]);
        assert_eq!(s1, s2);

        // Order still matters for sequences
        assert_ne!(Value::from(vec![1, 2]), Value::from(vec![2, 1]));
        assert_ne!(
            Value::List(vec![Value::from(1)]),
            Value::Vector(vec![Value::from(1)])
        );
    }

    #[test]
    fn test_hash_consistency() {
        let mut map = HashMap::new();
        map.insert(Value::set([1, 2, 3]), "set");
        assert_eq!(map.get(&Value::set([3, 2, 1])), Some(&"set"));

        let nan = Value::Float(f64::NAN);
        map.insert(nan.clone(), "nan");
        assert_eq!(map.get(&nan), Some(&"nan"));

        let float_key = Value::Float(3.14);
        map.insert(float_key.clone(), "pi");
        assert_eq!(map.get(&float_key), Some(&"pi"));
    }

    #[test]
    fn test_tag_introspection() {
        let tagged = Value::tagged(Ident::namespaced("myapp", "point"), Value::from(vec![1, 2]));
        assert_eq!(tagged.tag(), Some(&Ident::namespaced("myapp", "point")));
        assert_eq!(tagged.untagged(), &Value::from(vec![1, 2]));
        assert_eq!(Value::from(1).tag(), None);
    }

    #[test]
    fn test_native_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Value::from(u64::MAX).as_i64(), None);
        assert_eq!(Value::from(-7i8).as_i64(), Some(-7));
        assert_eq!(Value::character_code(10), Some(Value::Character('\n')));
        assert_eq!(Value::character_code(0xD800), None);

        let mut native = BTreeMap::new();
        native.insert("b", vec![1]);
        native.insert("a", vec![2]);
        let value = Value::from(native);
        assert_eq!(value.get(&Value::from("a")), Some(&Value::from(vec![2])));
    }
}
