//! NBT tag model for mapshift.
//!
//! [`Tag`] is the in-memory NBT tree shared by every migration step. It is
//! created per call from SNBT ([`unpack`]), binary NBT ([`binary::read`]) or
//! JSON ([`Tag::from_json`]) and serialized back the same ways.

#![warn(missing_docs)]

/// Binary NBT reading and writing.
pub mod binary;
/// JSON bridge.
mod json;
/// SNBT parsing and serialization.
pub mod snbt;
mod tag;

pub use binary::{BinaryError, Compression, NbtFile};
pub use snbt::{SnbtError, pack, unpack};
pub use tag::{Compound, Number, NumberKind, Tag, rename_key};
