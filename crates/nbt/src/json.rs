//! Bridge between tags and JSON values.
//!
//! Used for text components, which moved from JSON strings to NBT compounds
//! in 1.21.5. Booleans travel as bytes; JSON integers become ints (longs when
//! out of range) and JSON floats become doubles.

use crate::tag::{Compound, Number, NumberKind, Tag};
use serde_json::{Map, Value};

impl Tag {
    /// Convert a JSON value to a tag. `null` becomes an empty string.
    pub fn from_json(value: &Value) -> Tag {
        match value {
            Value::Null => Tag::String(String::new()),
            Value::Bool(b) => Tag::byte(i64::from(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i32::try_from(i).is_ok() {
                        Tag::int(i)
                    } else {
                        Tag::Number(Number::long(i))
                    }
                } else {
                    Tag::double(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => Tag::String(s.clone()),
            Value::Array(items) => Tag::list(items.iter().map(Tag::from_json).collect()),
            Value::Object(map) => {
                let mut out = Compound::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), Tag::from_json(v));
                }
                Tag::Compound(out)
            }
        }
    }

    /// Convert a tag to JSON. Bytes holding 0 or 1 become booleans, macros
    /// become their `$(name)` text, and single-key `{"": v}` list wrappers are
    /// unwrapped.
    pub fn to_json(&self) -> Value {
        match self {
            Tag::Number(n) => match n.kind() {
                NumberKind::Byte if matches!(n.as_i64(), 0 | 1) => Value::Bool(n.as_i64() == 1),
                kind if kind.is_float() => serde_json::Number::from_f64(n.as_f64())
                    .map_or(Value::Null, Value::Number),
                _ => Value::from(n.as_i64()),
            },
            Tag::String(s) => Value::String(s.clone()),
            Tag::Macro(name) => Value::String(format!("$({name})")),
            Tag::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item.as_compound() {
                        Some(c) if c.len() == 1 && c.contains_key("") => c[""].to_json(),
                        _ => item.to_json(),
                    })
                    .collect(),
            ),
            Tag::ByteArray(v) => Value::Array(v.iter().map(|x| Value::from(*x)).collect()),
            Tag::IntArray(v) => Value::Array(v.iter().map(|x| Value::from(*x)).collect()),
            Tag::LongArray(v) => Value::Array(v.iter().map(|x| Value::from(*x)).collect()),
            Tag::Compound(map) => {
                let mut out = Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                Value::Object(out)
            }
        }
    }
}
