//! A self-contained JSON document codec.
//!
//! `minijson` parses a UTF-8 JSON text into an in-memory [`Value`] tree,
//! renders a tree back into compact JSON text, and provides the mutation,
//! inspection, and structural-equality operations needed to work with that
//! tree directly.
//!
//! ```
//! use minijson::{parse, stringify, Value};
//!
//! let doc = parse(r#"{"a":1,"b":[true,null]}"#).unwrap();
//! assert_eq!(doc.as_object().unwrap().get("a"), Some(&Value::Number(1.0)));
//! assert_eq!(stringify(&doc), r#"{"a":1,"b":[true,null]}"#);
//! ```

#![no_std]
#![allow(clippy::module_name_repetitions)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod array;
mod buffer;
mod error;
mod object;
mod parser;
mod serializer;
mod unicode_escape;
mod utf8;
mod value;

pub use error::{ErrorKind, ParseError};
pub use object::{Object, ObjectOperation};
pub use parser::parse;
pub use serializer::stringify;
pub use value::Value;
