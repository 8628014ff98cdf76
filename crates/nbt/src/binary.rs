//! Binary (Java edition, big-endian) NBT bridge.
//!
//! Region/chunk collaborators hand whole files or payloads here; gzip and
//! zlib wrappers are detected from the leading bytes and restored on write.

use crate::tag::{Compound, Number, NumberKind, Tag};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression as Level;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::{self, Read, Write};
use thiserror::Error;

const MAX_DEPTH: usize = 512;

/// Binary NBT failure.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// Read or decompression error, including truncated input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Unknown tag type byte.
    #[error("invalid tag type {0}")]
    InvalidTagType(u8),
    /// The root tag is not a compound.
    #[error("root tag is type {0}, expected a compound")]
    RootNotCompound(u8),
    /// A length prefix is negative.
    #[error("negative length {0}")]
    NegativeLength(i32),
    /// Nesting deeper than the reader allows.
    #[error("nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,
    /// Data after the root compound.
    #[error("{0} trailing bytes after root compound")]
    TrailingData(usize),
}

/// Outer wrapper of an NBT payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw NBT.
    None,
    /// gzip (level.dat, structure files).
    Gzip,
    /// zlib (region chunk payloads).
    Zlib,
}

/// Detect the wrapper from the first bytes.
pub fn detect_compression(bytes: &[u8]) -> Compression {
    match bytes {
        [0x1f, 0x8b, ..] => Compression::Gzip,
        [0x78, 0x01 | 0x5e | 0x9c | 0xda, ..] => Compression::Zlib,
        _ => Compression::None,
    }
}

/// A decoded file: root name, root compound and the detected wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtFile {
    /// Name of the root tag (usually empty).
    pub name: String,
    /// Root compound.
    pub root: Compound,
    /// Wrapper to restore on write.
    pub compression: Compression,
}

/// Decode a possibly compressed binary NBT payload.
pub fn read(bytes: &[u8]) -> Result<NbtFile, BinaryError> {
    let compression = detect_compression(bytes);
    let raw = match compression {
        Compression::None => return read_raw(bytes, compression),
        Compression::Gzip => inflate(GzDecoder::new(bytes))?,
        Compression::Zlib => inflate(ZlibDecoder::new(bytes))?,
    };
    read_raw(&raw, compression)
}

/// Encode a file, applying its wrapper.
pub fn write(file: &NbtFile) -> Result<Vec<u8>, BinaryError> {
    let mut raw = Vec::new();
    raw.write_u8(10)?;
    write_string(&mut raw, &file.name)?;
    write_compound(&mut raw, &file.root)?;
    Ok(match file.compression {
        Compression::None => raw,
        Compression::Gzip => {
            let mut enc = GzEncoder::new(Vec::new(), Level::default());
            enc.write_all(&raw)?;
            enc.finish()?
        }
        Compression::Zlib => {
            let mut enc = ZlibEncoder::new(Vec::new(), Level::default());
            enc.write_all(&raw)?;
            enc.finish()?
        }
    })
}

fn inflate(mut reader: impl Read) -> Result<Vec<u8>, BinaryError> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

fn read_raw(bytes: &[u8], compression: Compression) -> Result<NbtFile, BinaryError> {
    let mut r = bytes;
    let ty = r.read_u8()?;
    if ty != 10 {
        return Err(BinaryError::RootNotCompound(ty));
    }
    let name = read_string(&mut r)?;
    let root = read_compound(&mut r, 0)?;
    if !r.is_empty() {
        return Err(BinaryError::TrailingData(r.len()));
    }
    Ok(NbtFile {
        name,
        root,
        compression,
    })
}

fn read_len(r: &mut &[u8]) -> Result<usize, BinaryError> {
    let len = r.read_i32::<BigEndian>()?;
    usize::try_from(len).map_err(|_| BinaryError::NegativeLength(len))
}

fn read_string(r: &mut &[u8]) -> Result<String, BinaryError> {
    let len = usize::from(r.read_u16::<BigEndian>()?);
    if r.len() < len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    let rest: &[u8] = *r;
    let (head, tail) = rest.split_at(len);
    *r = tail;
    Ok(simd_cesu8::mutf8::decode_lossy(head).into_owned())
}

fn read_compound(r: &mut &[u8], depth: usize) -> Result<Compound, BinaryError> {
    let mut map = Compound::new();
    loop {
        let ty = r.read_u8()?;
        if ty == 0 {
            return Ok(map);
        }
        let key = read_string(r)?;
        let value = read_payload(r, ty, depth + 1)?;
        map.insert(key, value);
    }
}

fn read_payload(r: &mut &[u8], ty: u8, depth: usize) -> Result<Tag, BinaryError> {
    if depth > MAX_DEPTH {
        return Err(BinaryError::TooDeep);
    }
    Ok(match ty {
        1 => Tag::byte(r.read_i8()?.into()),
        2 => Tag::short(r.read_i16::<BigEndian>()?.into()),
        3 => Tag::int(r.read_i32::<BigEndian>()?.into()),
        4 => Tag::Number(Number::long(r.read_i64::<BigEndian>()?)),
        5 => Tag::float(r.read_f32::<BigEndian>()?.into()),
        6 => Tag::double(r.read_f64::<BigEndian>()?),
        7 => {
            let len = read_len(r)?;
            let mut v = Vec::with_capacity(len.min(r.len()));
            for _ in 0..len {
                v.push(r.read_i8()?);
            }
            Tag::ByteArray(v)
        }
        8 => Tag::String(read_string(r)?),
        9 => {
            let elem = r.read_u8()?;
            let len = read_len(r)?;
            let mut items = Vec::with_capacity(len.min(r.len()));
            for _ in 0..len {
                items.push(read_payload(r, elem, depth + 1)?);
            }
            Tag::List(items)
        }
        10 => Tag::Compound(read_compound(r, depth)?),
        11 => {
            let len = read_len(r)?;
            let mut v = Vec::with_capacity(len.min(r.len() / 4));
            for _ in 0..len {
                v.push(r.read_i32::<BigEndian>()?);
            }
            Tag::IntArray(v)
        }
        12 => {
            let len = read_len(r)?;
            let mut v = Vec::with_capacity(len.min(r.len() / 8));
            for _ in 0..len {
                v.push(r.read_i64::<BigEndian>()?);
            }
            Tag::LongArray(v)
        }
        other => return Err(BinaryError::InvalidTagType(other)),
    })
}

fn write_string(w: &mut Vec<u8>, s: &str) -> io::Result<()> {
    let bytes = simd_cesu8::mutf8::encode(s);
    let len = u16::try_from(bytes.len()).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string longer than 65535 bytes"))?;
    w.write_u16::<BigEndian>(len)?;
    w.write_all(&bytes)
}

fn write_len(w: &mut Vec<u8>, len: usize) -> io::Result<()> {
    let len = i32::try_from(len).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "array too long"))?;
    w.write_i32::<BigEndian>(len)
}

fn write_compound(w: &mut Vec<u8>, map: &Compound) -> io::Result<()> {
    for (key, value) in map {
        w.write_u8(value.type_id())?;
        write_string(w, key)?;
        write_payload(w, value)?;
    }
    w.write_u8(0)
}

fn write_payload(w: &mut Vec<u8>, tag: &Tag) -> io::Result<()> {
    match tag {
        Tag::Number(n) => match n.kind() {
            NumberKind::Byte => w.write_i8(n.as_i64() as i8),
            NumberKind::Short => w.write_i16::<BigEndian>(n.as_i64() as i16),
            NumberKind::Int => w.write_i32::<BigEndian>(n.as_i64() as i32),
            NumberKind::Long => w.write_i64::<BigEndian>(n.as_i64()),
            NumberKind::Float => w.write_f32::<BigEndian>(n.as_f64() as f32),
            NumberKind::Double => w.write_f64::<BigEndian>(n.as_f64()),
        },
        Tag::String(s) => write_string(w, s),
        Tag::Macro(name) => write_string(w, &format!("$({name})")),
        Tag::ByteArray(v) => {
            write_len(w, v.len())?;
            v.iter().try_for_each(|x| w.write_i8(*x))
        }
        Tag::IntArray(v) => {
            write_len(w, v.len())?;
            v.iter().try_for_each(|x| w.write_i32::<BigEndian>(*x))
        }
        Tag::LongArray(v) => {
            write_len(w, v.len())?;
            v.iter().try_for_each(|x| w.write_i64::<BigEndian>(*x))
        }
        Tag::List(items) => {
            // Binary lists need one element type; wrap stragglers the way
            // `Tag::list` does.
            let items = match Tag::list(items.clone()) {
                Tag::List(items) => items,
                _ => Vec::new(),
            };
            w.write_u8(items.first().map_or(0, Tag::type_id))?;
            write_len(w, items.len())?;
            items.iter().try_for_each(|item| write_payload(w, item))
        }
        Tag::Compound(map) => write_compound(w, map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snbt::{pack, unpack};

    fn sample() -> NbtFile {
        let Tag::Compound(root) = unpack(
            r#"{Name:"héllo",Pos:[1d,2d,3d],Data:[I;1,2],Bytes:[B;-1b],Longs:[L;9l],Nested:{s:3s,f:0.5f,Count:1b}}"#,
        )
        .unwrap() else {
            panic!("expected compound");
        };
        NbtFile {
            name: String::new(),
            root,
            compression: Compression::None,
        }
    }

    #[test]
    fn raw_round_trip() {
        let file = sample();
        let bytes = write(&file).unwrap();
        assert_eq!(detect_compression(&bytes), Compression::None);
        assert_eq!(read(&bytes).unwrap(), file);
    }

    #[test]
    fn gzip_is_detected_and_restored() {
        let mut file = sample();
        file.compression = Compression::Gzip;
        let bytes = write(&file).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        let back = read(&bytes).unwrap();
        assert_eq!(back.compression, Compression::Gzip);
        assert_eq!(pack(&Tag::Compound(back.root)), pack(&Tag::Compound(file.root)));
    }

    #[test]
    fn rejects_non_compound_root() {
        assert!(matches!(read(&[8, 0, 0, 0, 0]), Err(BinaryError::RootNotCompound(8))));
    }

    #[test]
    fn truncated_input_is_an_io_error() {
        let bytes = write(&sample()).unwrap();
        assert!(matches!(read(&bytes[..bytes.len() - 3]), Err(BinaryError::Io(_))));
    }

    #[test]
    fn macro_travels_as_string() {
        let mut root = Compound::new();
        root.insert("id".into(), Tag::Macro("item".into()));
        let file = NbtFile {
            name: String::new(),
            root,
            compression: Compression::None,
        };
        let back = read(&write(&file).unwrap()).unwrap();
        assert_eq!(back.root["id"], Tag::string("$(item)"));
    }
}
