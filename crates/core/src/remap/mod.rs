//! Domain remappers: version-indexed identifier and state tables.
//!
//! Tables live in `data/*.jsonc`, are embedded at compile time and parsed
//! once on first use. Every remapper is a pure function of its input and the
//! [`Ctx`] version window.

pub mod blocks;
pub mod entities;
pub mod ids;
pub mod items;
pub mod misc;
pub mod particles;

use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Namespace of the synthetic tags emitted for ambiguous legacy values.
pub const PLACEHOLDER_NAMESPACE: &str = "mapshift";

/// Dye palette in legacy data-value order (`light_gray` was `silver`).
pub const DYE_COLORS: [&str; 16] = [
    "white",
    "orange",
    "magenta",
    "light_blue",
    "yellow",
    "lime",
    "pink",
    "gray",
    "light_gray",
    "cyan",
    "purple",
    "blue",
    "brown",
    "green",
    "red",
    "black",
];

/// Parse an embedded JSONC table. Tables are compile-time data covered by
/// tests, so a malformed table is a build defect.
pub(crate) fn load_table<T: DeserializeOwned>(name: &str, text: &str) -> T {
    serde_json::from_str(&mapshift_jsonc_strip::to_json(text))
        .unwrap_or_else(|e| panic!("embedded table {name} is invalid: {e}"))
}

/// A set of renames crossing one version boundary.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Renames {
    pub(crate) max: u16,
    pub(crate) map: IndexMap<String, String>,
}

/// Apply every rename set the migration crosses, in increasing `max` order.
pub(crate) fn cascade(path: &str, renames: &[Renames], ctx: &Ctx<'_>) -> String {
    let mut current = path.to_string();
    for step in renames {
        if ctx.crosses(step.max)
            && let Some(next) = step.map.get(&current)
        {
            current = next.clone();
        }
    }
    current
}

pub(crate) fn sorted(mut renames: Vec<Renames>) -> Vec<Renames> {
    renames.sort_by_key(|r| r.max);
    renames
}

/// `minecraft:stone` -> `stone`; other namespaces are kept.
pub fn strip_namespace(id: &str) -> &str {
    id.strip_prefix("minecraft:").unwrap_or(id)
}

/// Add the `minecraft:` namespace to a bare id. Tags and macros are kept.
pub fn namespaced(id: &str) -> String {
    if id.is_empty() || id.contains(':') || id.starts_with('#') || id.contains("$(") {
        id.to_string()
    } else {
        format!("minecraft:{id}")
    }
}

/// Legacy names were case-insensitive; flattened ids are lowercase.
pub(crate) fn legacy_key(id: &str) -> String {
    strip_namespace(id).to_ascii_lowercase()
}

/// Emit the placeholder tag for an ambiguous legacy `family` and log it.
pub(crate) fn placeholder(ctx: &mut Ctx<'_>, family: &str, value: &str) -> String {
    let tag = format!("#{PLACEHOLDER_NAMESPACE}:legacy/{family}");
    ctx.diag(
        codes::AMBIGUOUS_LEGACY_VALUE,
        format!("{value} is ambiguous without world data; emitted {tag}"),
    );
    tag
}

/// Every placeholder tag the remappers can emit, with the ids its
/// definition must list. Used by external tooling to generate the companion
/// disambiguation data pack.
pub fn placeholder_tags() -> IndexMap<String, Vec<String>> {
    let mut tags = IndexMap::new();
    let families = blocks::placeholder_families()
        .into_iter()
        .chain(items::placeholder_families())
        .chain(entities::placeholder_families());
    for (family, members) in families {
        let entry: &mut Vec<String> = tags
            .entry(format!("{PLACEHOLDER_NAMESPACE}:legacy/{family}"))
            .or_default();
        for member in members {
            let member = namespaced(&member);
            if !entry.contains(&member) {
                entry.push(member);
            }
        }
    }
    tags
}

/// `CamelCase` or `camelCase` to `snake_case`.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}
