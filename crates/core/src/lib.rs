//! mapshift core library.
//!
//! Migrates Minecraft map content written for one version to a later one:
//! command lines and function files, SNBT and binary NBT, JSON text
//! components, and the block, item, entity and other identifiers inside
//! them. The main entry point is [`Engine`]; [`update_command`] runs the
//! default engine at the newest supported version.

#![warn(missing_docs)]

mod command;
/// Per-call migration state.
pub mod context;
mod convert;
/// The public engine API.
pub mod engine;
/// Item stack tags and data components.
pub mod item_components;
/// Guide-driven NBT migration.
pub mod nbt_update;
/// Identifier remappers.
pub mod remap;
/// Target selectors.
pub mod selector;
/// JSON text components.
pub mod text;
/// Quote- and bracket-aware tokenizer.
pub mod tokenize;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Engine
pub use engine::{
    CommandReport, DEFAULT_COMMAND_GUIDE, DEFAULT_NBT_GUIDE, DEFAULT_PASS_LIMIT, Engine, EngineBuilder, NbtInput,
    NbtReport, update_command,
};

// Per-call state
pub use context::{Ctx, Issue};

// Placeholder tags for ambiguous legacy values
pub use remap::placeholder_tags;

// Tokenizer
pub use tokenize::{Tokens, tokenize, tokenize_checked, tokenize_without_quotes};

// Re-exported from the sibling crates
pub use mapshift_diagnostics::{Diagnostic, Severity, codes};
pub use mapshift_guides::{GuideError, Version};
pub use mapshift_nbt::{Compound, Tag};
