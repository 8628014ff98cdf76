//! Version gates and guide trees for mapshift.
//!
//! A *guide* is a declarative rule tree loaded once from a JSONC document and
//! converted into the typed AST in this crate: [`CommandGuide`] for command
//! grammar and [`NbtGuide`] for NBT migration. Loading validates everything
//! that can be checked without running a migration (node shapes, argument
//! type and edge-case names, wildcard keys, source contexts, SNBT literals),
//! so a loaded guide never surprises the engine at run time.

#![warn(missing_docs)]

/// Argument types and edge-case names.
pub mod arg_type;
/// Command grammar guide.
pub mod command;
/// NBT migration guide.
pub mod nbt;
/// Wildcard keys.
pub mod pattern;
/// Version codes and gates.
pub mod version;

pub use arg_type::{ArgType, CommandEdgeCase, NbtEdgeCase};
pub use command::{ArgSpec, Branch, CommandGuide, Legend, Mapping, Node, OutputPart, Source};
pub use nbt::{Action, Condition, NbtGuide, NecessaryTag, TagRule, TagsGuide};
pub use pattern::Pattern;
pub use version::{Gate, ParseVersionError, Version, Versioned, select};

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while loading a guide document.
#[derive(Debug, Error)]
pub enum GuideError {
    /// The document is not valid JSON after comment stripping.
    #[error("invalid guide JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node or rule has the wrong shape.
    #[error("{path}: {reason}")]
    Invalid {
        /// Dotted location in the document.
        path: String,
        /// What is wrong.
        reason: String,
    },

    /// A name does not belong to its closed set.
    #[error("{path}: unknown {kind} {name}")]
    UnknownName {
        /// Dotted location in the document.
        path: String,
        /// Which set was consulted.
        kind: &'static str,
        /// The offending name.
        name: String,
    },

    /// A branch key or object id pattern has a misplaced `**`.
    #[error("{path}: invalid wildcard {reason}")]
    InvalidWildcard {
        /// Dotted location in the document.
        path: String,
        /// What is wrong.
        reason: String,
    },

    /// A `min`/`max` bound is not a version.
    #[error("{path}: {reason}")]
    InvalidVersion {
        /// Dotted location in the document.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// An embedded SNBT literal does not parse.
    #[error("{path}: {source}")]
    Snbt {
        /// Dotted location in the document.
        path: String,
        /// Parser error.
        #[source]
        source: mapshift_nbt::SnbtError,
    },
}

/// Load a command grammar guide from JSONC text.
pub fn load_command_guide(text: &str) -> Result<CommandGuide, GuideError> {
    let value: Value = serde_json::from_str(&mapshift_jsonc_strip::to_json(text))?;
    CommandGuide::from_value(&value)
}

/// Load an NBT guide from JSONC text.
pub fn load_nbt_guide(text: &str) -> Result<NbtGuide, GuideError> {
    let value: Value = serde_json::from_str(&mapshift_jsonc_strip::to_json(text))?;
    NbtGuide::from_value(&value)
}

pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> GuideError {
    GuideError::Invalid {
        path: path.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn obj_field<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key)
}
