use indexmap::IndexMap;

/// Ordered string-keyed compound. Insertion order is kept for stable output.
pub type Compound = IndexMap<String, Tag>;

/// Width of a numeric tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// 8-bit signed.
    Byte,
    /// 16-bit signed.
    Short,
    /// 32-bit signed.
    Int,
    /// 64-bit signed.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl NumberKind {
    /// Canonical literal suffix (lowercase); `None` for `Int`.
    pub fn suffix(self) -> Option<char> {
        match self {
            NumberKind::Byte => Some('b'),
            NumberKind::Short => Some('s'),
            NumberKind::Int => None,
            NumberKind::Long => Some('l'),
            NumberKind::Float => Some('f'),
            NumberKind::Double => Some('d'),
        }
    }

    /// Whether values are stored as floating point.
    pub fn is_float(self) -> bool {
        matches!(self, NumberKind::Float | NumberKind::Double)
    }

    fn clamp(self, v: i64) -> i64 {
        match self {
            NumberKind::Byte => v.clamp(i8::MIN.into(), i8::MAX.into()),
            NumberKind::Short => v.clamp(i16::MIN.into(), i16::MAX.into()),
            NumberKind::Int => v.clamp(i32::MIN.into(), i32::MAX.into()),
            _ => v,
        }
    }
}

/// A numeric tag: width, value and the literal suffix it was written with.
///
/// Integer values are clamped to the width on construction. Equality ignores
/// the suffix, which only records whether an optional suffix (`d`) was
/// written.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    kind: NumberKind,
    int: i64,
    float: f64,
    suffix: Option<char>,
}

impl Number {
    /// Integer-valued number of `kind`, clamped to its width.
    pub fn new(kind: NumberKind, value: i64) -> Self {
        if kind.is_float() {
            return Self::float(kind, value as f64);
        }
        let int = kind.clamp(value);
        Self {
            kind,
            int,
            float: int as f64,
            suffix: kind.suffix(),
        }
    }

    /// Float-valued number of `kind`. Integer kinds truncate and clamp.
    pub fn float(kind: NumberKind, value: f64) -> Self {
        let float = match kind {
            NumberKind::Float => f64::from(value as f32),
            NumberKind::Double => value,
            _ => return Self::new(kind, value as i64),
        };
        Self {
            kind,
            int: float as i64,
            float,
            suffix: kind.suffix(),
        }
    }

    /// `Nb`.
    pub fn byte(v: i64) -> Self {
        Self::new(NumberKind::Byte, v)
    }

    /// `Ns`.
    pub fn short(v: i64) -> Self {
        Self::new(NumberKind::Short, v)
    }

    /// `N`.
    pub fn int(v: i64) -> Self {
        Self::new(NumberKind::Int, v)
    }

    /// `Nl`.
    pub fn long(v: i64) -> Self {
        Self::new(NumberKind::Long, v)
    }

    /// `Nf`.
    pub fn float32(v: f64) -> Self {
        Self::float(NumberKind::Float, v)
    }

    /// `Nd`.
    pub fn double(v: f64) -> Self {
        Self::float(NumberKind::Double, v)
    }

    /// Replace the recorded suffix. Only meaningful for `Double`, whose
    /// suffix is optional; other kinds always print their canonical suffix.
    pub fn with_suffix(mut self, suffix: Option<char>) -> Self {
        if self.kind == NumberKind::Double {
            self.suffix = suffix.map(|c| c.to_ascii_lowercase());
        }
        self
    }

    /// The width.
    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    /// The suffix printed by `pack`.
    pub fn suffix(&self) -> Option<char> {
        self.suffix
    }

    /// Value as an integer (floats truncate).
    pub fn as_i64(&self) -> i64 {
        self.int
    }

    /// Value as a float.
    pub fn as_f64(&self) -> f64 {
        self.float
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && if self.kind.is_float() {
                self.float.to_bits() == other.float.to_bits() || self.float == other.float
            } else {
                self.int == other.int
            }
    }
}

/// An NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// Byte, short, int, long, float or double.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Homogeneous list.
    List(Vec<Tag>),
    /// `[B; ...]`.
    ByteArray(Vec<i8>),
    /// `[I; ...]`.
    IntArray(Vec<i32>),
    /// `[L; ...]`.
    LongArray(Vec<i64>),
    /// Ordered compound.
    Compound(Compound),
    /// Unresolved `$(name)` function macro placeholder.
    Macro(String),
}

impl Tag {
    /// Binary type id (`Macro` travels as a string).
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::Number(n) => match n.kind() {
                NumberKind::Byte => 1,
                NumberKind::Short => 2,
                NumberKind::Int => 3,
                NumberKind::Long => 4,
                NumberKind::Float => 5,
                NumberKind::Double => 6,
            },
            Tag::ByteArray(_) => 7,
            Tag::String(_) | Tag::Macro(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    /// Shorthand for a byte tag.
    pub fn byte(v: i64) -> Tag {
        Tag::Number(Number::byte(v))
    }

    /// Shorthand for a short tag.
    pub fn short(v: i64) -> Tag {
        Tag::Number(Number::short(v))
    }

    /// Shorthand for an int tag.
    pub fn int(v: i64) -> Tag {
        Tag::Number(Number::int(v))
    }

    /// Shorthand for a float tag.
    pub fn float(v: f64) -> Tag {
        Tag::Number(Number::float32(v))
    }

    /// Shorthand for a double tag.
    pub fn double(v: f64) -> Tag {
        Tag::Number(Number::double(v))
    }

    /// Shorthand for a string tag.
    pub fn string(s: impl Into<String>) -> Tag {
        Tag::String(s.into())
    }

    /// Build a list. When element types differ, every non-compound element
    /// is wrapped in a single-key compound `{"": value}`.
    pub fn list(items: Vec<Tag>) -> Tag {
        Tag::List(homogenize(items))
    }

    /// Whether a macro placeholder occurs anywhere in this subtree.
    pub fn contains_macro(&self) -> bool {
        match self {
            Tag::Macro(_) => true,
            Tag::List(items) => items.iter().any(Tag::contains_macro),
            Tag::Compound(map) => map.values().any(Tag::contains_macro),
            _ => false,
        }
    }

    /// The string value, if this is a string tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value as an integer, if numeric.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Number(n) => Some(n.as_i64()),
            _ => None,
        }
    }

    /// The numeric value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// The compound, if this is one.
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// The compound, mutably.
    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// The list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Compound> for Tag {
    fn from(c: Compound) -> Self {
        Tag::Compound(c)
    }
}

impl From<Number> for Tag {
    fn from(n: Number) -> Self {
        Tag::Number(n)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::String(s.to_string())
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::String(s)
    }
}

fn homogenize(items: Vec<Tag>) -> Vec<Tag> {
    let mut kinds = items.iter().filter(|t| !matches!(t, Tag::Macro(_))).map(Tag::type_id);
    let Some(first) = kinds.next() else {
        return items;
    };
    if kinds.all(|k| k == first) {
        return items;
    }
    items
        .into_iter()
        .map(|t| match t {
            Tag::Compound(_) | Tag::Macro(_) => t,
            other => {
                let mut wrapper = Compound::new();
                wrapper.insert(String::new(), other);
                Tag::Compound(wrapper)
            }
        })
        .collect()
}

/// Rename `old` to `new` in place, keeping its position. An existing `new`
/// entry is replaced. Returns whether `old` was present.
pub fn rename_key(map: &mut Compound, old: &str, new: &str) -> bool {
    if old == new {
        return map.contains_key(old);
    }
    let Some(index) = map.get_index_of(old) else {
        return false;
    };
    map.shift_remove(new);
    let index = map.get_index_of(old).unwrap_or(index);
    if let Some((_, value)) = map.shift_remove_index(index) {
        map.shift_insert(index, new.to_string(), value);
    }
    true
}
