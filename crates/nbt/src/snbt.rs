//! SNBT text: `unpack` parses, `pack` serializes.
//!
//! The parser is lenient in the ways old map content needs: unquoted string
//! values may contain `:` (`{id:minecraft:stone}`), legacy indexed list
//! entries (`[0:1d,1:2d]`) are accepted, and `$(name)` macro placeholders
//! parse as [`Tag::Macro`].

use crate::tag::{Compound, Number, NumberKind, Tag};
use thiserror::Error;

/// SNBT parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnbtError {
    /// Input ended inside a value.
    #[error("unexpected end of SNBT at byte {pos}")]
    UnexpectedEnd {
        /// Byte offset.
        pos: usize,
    },
    /// A character did not fit the grammar.
    #[error("unexpected '{found}' at byte {pos}, expected {expected}")]
    Unexpected {
        /// Byte offset.
        pos: usize,
        /// Offending character.
        found: char,
        /// What the parser wanted.
        expected: &'static str,
    },
    /// Typed array element is not a number of the array's width.
    #[error("invalid typed array element '{text}' at byte {pos}")]
    InvalidArrayElement {
        /// Byte offset.
        pos: usize,
        /// Element text.
        text: String,
    },
    /// Extra text after the value.
    #[error("trailing data at byte {pos}")]
    TrailingData {
        /// Byte offset.
        pos: usize,
    },
}

/// Parse SNBT text into a tag.
pub fn unpack(text: &str) -> Result<Tag, SnbtError> {
    let mut p = Parser {
        src: text,
        b: text.as_bytes(),
        i: 0,
    };
    p.skip_ws();
    let tag = p.value()?;
    p.skip_ws();
    if p.i < p.b.len() {
        return Err(SnbtError::TrailingData { pos: p.i });
    }
    Ok(tag)
}

/// Serialize a tag to SNBT.
///
/// Strings are double-quoted, keys are quoted only when needed, numeric
/// suffixes are lowercase.
pub fn pack(tag: &Tag) -> String {
    let mut out = String::new();
    write_tag(&mut out, tag);
    out
}

struct Parser<'a> {
    src: &'a str,
    b: &'a [u8],
    i: usize,
}

fn is_unquoted(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'-' | b'.' | b'+')
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.i < self.b.len() && self.b[self.i].is_ascii_whitespace() {
            self.i += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.b.get(self.i).copied()
    }

    fn unexpected(&self, expected: &'static str) -> SnbtError {
        match self.src[self.i..].chars().next() {
            Some(found) => SnbtError::Unexpected {
                pos: self.i,
                found,
                expected,
            },
            None => SnbtError::UnexpectedEnd { pos: self.i },
        }
    }

    fn expect(&mut self, c: u8, expected: &'static str) -> Result<(), SnbtError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.i += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn value(&mut self) -> Result<Tag, SnbtError> {
        self.skip_ws();
        match self.peek() {
            None => Err(SnbtError::UnexpectedEnd { pos: self.i }),
            Some(b'{') => self.compound(),
            Some(b'[') => self.list_or_array(),
            Some(b'"' | b'\'') => Ok(Tag::String(self.quoted()?)),
            Some(b'$') if self.b.get(self.i + 1) == Some(&b'(') => self.macro_token(),
            Some(_) => self.scalar(),
        }
    }

    fn macro_token(&mut self) -> Result<Tag, SnbtError> {
        let start = self.i + 2;
        let Some(len) = self.src[start..].find(')') else {
            return Err(SnbtError::UnexpectedEnd { pos: self.b.len() });
        };
        self.i = start + len + 1;
        Ok(Tag::Macro(self.src[start..start + len].to_string()))
    }

    fn quoted(&mut self) -> Result<String, SnbtError> {
        let quote = self.b[self.i];
        self.i += 1;
        let mut out = String::new();
        let mut run = self.i;
        while self.i < self.b.len() {
            let c = self.b[self.i];
            if c == b'\\' {
                out.push_str(&self.src[run..self.i]);
                self.i += 1;
                match self.src[self.i..].chars().next() {
                    Some(escaped) => {
                        out.push(escaped);
                        self.i += escaped.len_utf8();
                    }
                    None => return Err(SnbtError::UnexpectedEnd { pos: self.i }),
                }
                run = self.i;
            } else if c == quote {
                out.push_str(&self.src[run..self.i]);
                self.i += 1;
                return Ok(out);
            } else {
                self.i += 1;
            }
        }
        Err(SnbtError::UnexpectedEnd { pos: self.i })
    }

    fn key(&mut self) -> Result<String, SnbtError> {
        self.skip_ws();
        match self.peek() {
            Some(b'"' | b'\'') => self.quoted(),
            _ => {
                let start = self.i;
                while self.peek().is_some_and(is_unquoted) {
                    self.i += 1;
                }
                if start == self.i {
                    return Err(self.unexpected("a key"));
                }
                Ok(self.src[start..self.i].to_string())
            }
        }
    }

    fn compound(&mut self) -> Result<Tag, SnbtError> {
        self.i += 1;
        let mut map = Compound::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.i += 1;
            return Ok(Tag::Compound(map));
        }
        loop {
            let key = self.key()?;
            self.expect(b':', "':'")?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.i += 1;
                    self.skip_ws();
                    if self.peek() == Some(b'}') {
                        self.i += 1;
                        return Ok(Tag::Compound(map));
                    }
                }
                Some(b'}') => {
                    self.i += 1;
                    return Ok(Tag::Compound(map));
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
    }

    fn list_or_array(&mut self) -> Result<Tag, SnbtError> {
        self.i += 1;
        if let (Some(kind), Some(b';')) = (self.peek(), self.b.get(self.i + 1).copied())
            && matches!(kind.to_ascii_uppercase(), b'B' | b'I' | b'L')
        {
            self.i += 2;
            return self.typed_array(kind.to_ascii_uppercase());
        }
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.i += 1;
            return Ok(Tag::List(items));
        }
        loop {
            self.skip_legacy_index();
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.i += 1;
                    self.skip_ws();
                    if self.peek() == Some(b']') {
                        self.i += 1;
                        break;
                    }
                }
                Some(b']') => {
                    self.i += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
        Ok(Tag::list(items))
    }

    /// Skip a pre-1.12 `N:` list index.
    fn skip_legacy_index(&mut self) {
        self.skip_ws();
        let mut j = self.i;
        while j < self.b.len() && self.b[j].is_ascii_digit() {
            j += 1;
        }
        if j > self.i && self.b.get(j) == Some(&b':') {
            self.i = j + 1;
        }
    }

    fn typed_array(&mut self, kind: u8) -> Result<Tag, SnbtError> {
        let mut values = Vec::new();
        self.skip_ws();
        if self.peek() != Some(b']') {
            loop {
                self.skip_ws();
                let pos = self.i;
                let tag = self.scalar()?;
                let bad = || SnbtError::InvalidArrayElement {
                    pos,
                    text: pack(&tag),
                };
                let Tag::Number(n) = &tag else { return Err(bad()) };
                if n.kind().is_float() {
                    return Err(bad());
                }
                values.push(n.as_i64());
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.i += 1,
                    Some(b']') => break,
                    _ => return Err(self.unexpected("',' or ']'")),
                }
            }
        }
        self.i += 1;
        Ok(match kind {
            b'B' => Tag::ByteArray(values.into_iter().map(|v| Number::byte(v).as_i64() as i8).collect()),
            b'I' => Tag::IntArray(values.into_iter().map(|v| Number::int(v).as_i64() as i32).collect()),
            _ => Tag::LongArray(values),
        })
    }

    fn scalar(&mut self) -> Result<Tag, SnbtError> {
        let start = self.i;
        while self.peek().is_some_and(|c| is_unquoted(c) || c == b':') {
            self.i += 1;
        }
        if start == self.i {
            return Err(self.unexpected("a value"));
        }
        let text = &self.src[start..self.i];
        Ok(parse_scalar(text))
    }
}

fn parse_scalar(text: &str) -> Tag {
    match text {
        "true" => return Tag::byte(1),
        "false" => return Tag::byte(0),
        _ => {}
    }
    if let Some(number) = parse_number(text) {
        return Tag::Number(number);
    }
    Tag::String(text.to_string())
}

fn parse_number(text: &str) -> Option<Number> {
    let last = text.chars().last()?;
    let (body, kind, explicit) = match last.to_ascii_lowercase() {
        'b' => (&text[..text.len() - 1], NumberKind::Byte, true),
        's' => (&text[..text.len() - 1], NumberKind::Short, true),
        'l' => (&text[..text.len() - 1], NumberKind::Long, true),
        'f' => (&text[..text.len() - 1], NumberKind::Float, true),
        'd' => (&text[..text.len() - 1], NumberKind::Double, true),
        _ => (text, NumberKind::Int, false),
    };
    let digits = body.strip_prefix(['-', '+']).unwrap_or(body);
    if digits.is_empty() || !digits.bytes().next().is_some_and(|c| c.is_ascii_digit() || c == b'.') {
        return None;
    }
    let integral = digits.bytes().all(|c| c.is_ascii_digit());
    if integral && !kind.is_float() {
        let value: i64 = body.parse().ok()?;
        // An unsuffixed integer outside the int range is a string.
        if !explicit && i32::try_from(value).is_err() {
            return None;
        }
        return Some(Number::new(kind, value));
    }
    if !digits
        .bytes()
        .all(|c| c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E' | b'-' | b'+'))
    {
        return None;
    }
    let value: f64 = body.parse().ok()?;
    match kind {
        NumberKind::Float => Some(Number::float32(value)),
        NumberKind::Double => Some(Number::double(value)),
        NumberKind::Int if !integral => Some(Number::double(value).with_suffix(None)),
        _ => None,
    }
}

fn write_tag(out: &mut String, tag: &Tag) {
    match tag {
        Tag::Number(n) => write_number(out, n),
        Tag::String(s) => write_quoted(out, s),
        Tag::Macro(name) => {
            out.push_str("$(");
            out.push_str(name);
            out.push(')');
        }
        Tag::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_tag(out, item);
            }
            out.push(']');
        }
        Tag::ByteArray(v) => write_array(out, 'B', v.iter().map(|x| format!("{x}b"))),
        Tag::IntArray(v) => write_array(out, 'I', v.iter().map(ToString::to_string)),
        Tag::LongArray(v) => write_array(out, 'L', v.iter().map(|x| format!("{x}l"))),
        Tag::Compound(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key(out, key);
                out.push(':');
                write_tag(out, value);
            }
            out.push('}');
        }
    }
}

fn write_array(out: &mut String, prefix: char, items: impl Iterator<Item = String>) {
    out.push('[');
    out.push(prefix);
    out.push(';');
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&item);
    }
    out.push(']');
}

fn write_number(out: &mut String, n: &Number) {
    if n.kind().is_float() {
        let mut text = if n.kind() == NumberKind::Float {
            format!("{}", n.as_f64() as f32)
        } else {
            format!("{}", n.as_f64())
        };
        if n.suffix().is_none() && !text.contains(['.', 'e', 'E', 'N', 'i']) {
            text.push_str(".0");
        }
        out.push_str(&text);
    } else {
        out.push_str(&n.as_i64().to_string());
    }
    if let Some(suffix) = n.suffix() {
        out.push(suffix);
    }
}

fn write_key(out: &mut String, key: &str) {
    if !key.is_empty() && key.bytes().all(is_unquoted) {
        out.push_str(key);
    } else {
        write_quoted(out, key);
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_numbers() {
        assert_eq!(unpack("1b").unwrap(), Tag::byte(1));
        assert_eq!(unpack("1B").unwrap(), Tag::byte(1));
        assert_eq!(unpack("-5s").unwrap(), Tag::short(-5));
        assert_eq!(unpack("7").unwrap(), Tag::int(7));
        assert_eq!(unpack("3000000000L").unwrap(), Tag::Number(Number::long(3_000_000_000)));
        assert_eq!(unpack("0.5f").unwrap(), Tag::float(0.5));
        assert_eq!(unpack("1.5").unwrap(), Tag::double(1.5));
        assert_eq!(unpack("true").unwrap(), Tag::byte(1));
    }

    #[test]
    fn suffix_casing_is_normalized() {
        assert_eq!(pack(&unpack("{a:1B,b:2L,c:3.0D}").unwrap()), "{a:1b,b:2l,c:3d}");
    }

    #[test]
    fn unsuffixed_double_keeps_its_point() {
        assert_eq!(pack(&unpack("1.0").unwrap()), "1.0");
        assert_eq!(pack(&unpack("[1.0d,2.5]").unwrap()), "[1d,2.5]");
    }

    #[test]
    fn out_of_range_plain_integer_is_a_string() {
        assert_eq!(unpack("3000000000").unwrap(), Tag::string("3000000000"));
    }

    #[test]
    fn lenient_unquoted_ids() {
        let tag = unpack("{id:minecraft:stone,Count:1b}").unwrap();
        assert_eq!(tag.as_compound().unwrap()["id"], Tag::string("minecraft:stone"));
    }

    #[test]
    fn legacy_indexed_lists() {
        let tag = unpack("{Pos:[0:1.0d,1:2.0d,2:3.0d]}").unwrap();
        assert_eq!(pack(&tag), "{Pos:[1d,2d,3d]}");
    }

    #[test]
    fn typed_arrays() {
        let tag = unpack("[I;1,-2,3]").unwrap();
        assert_eq!(tag, Tag::IntArray(vec![1, -2, 3]));
        assert_eq!(pack(&tag), "[I;1,-2,3]");
        assert_eq!(pack(&unpack("[B;1b,2b]").unwrap()), "[B;1b,2b]");
        assert!(unpack("[I;1.5]").is_err());
    }

    #[test]
    fn quoted_strings_and_escapes() {
        let tag = unpack(r#"{"a b":'it\'s',c:"say \"hi\""}"#).unwrap();
        let map = tag.as_compound().unwrap();
        assert_eq!(map["a b"], Tag::string("it's"));
        assert_eq!(map["c"], Tag::string("say \"hi\""));
        assert_eq!(pack(&tag), r#"{"a b":"it's",c:"say \"hi\""}"#);
    }

    #[test]
    fn macro_tokens_survive() {
        let tag = unpack("{Count:$(count),id:\"$(id)\"}").unwrap();
        let map = tag.as_compound().unwrap();
        assert_eq!(map["Count"], Tag::Macro("count".into()));
        assert_eq!(map["id"], Tag::string("$(id)"));
        assert_eq!(pack(&tag), "{Count:$(count),id:\"$(id)\"}");
    }

    #[test]
    fn preserves_key_order() {
        assert_eq!(pack(&unpack("{z:1,a:2,m:3}").unwrap()), "{z:1,a:2,m:3}");
    }

    #[test]
    fn errors_carry_positions() {
        assert_eq!(unpack("{a:1"), Err(SnbtError::UnexpectedEnd { pos: 4 }));
        assert!(matches!(unpack("{a:1} x"), Err(SnbtError::TrailingData { pos: 6 })));
        assert!(matches!(unpack("{:1}"), Err(SnbtError::Unexpected { pos: 1, .. })));
    }
}
