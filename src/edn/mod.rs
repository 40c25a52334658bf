pub mod character;
pub mod reader;
pub mod tokenizer;
pub mod value;
pub mod writer;

pub use character::{character_for_name, name_for_character, CharacterTags};
pub use reader::{read_next, Reader, ReaderOptions, DEFAULT_MAX_DEPTH};
pub use tokenizer::{next_token, Delimiter, Span, Token};
pub use value::{Ident, Value};
pub use writer::{Writer, WriterOptions};
