//! Sound events and entity attributes.

use super::{Renames, load_table, namespaced, snake_case, sorted, strip_namespace};
use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
struct SoundTables {
    legacy: IndexMap<String, String>,
    prefixes: Vec<Renames>,
}

static SOUNDS: LazyLock<SoundTables> = LazyLock::new(|| {
    let mut tables: SoundTables = load_table("sounds.jsonc", include_str!("../../data/sounds.jsonc"));
    tables.prefixes = sorted(std::mem::take(&mut tables.prefixes));
    tables
});

const ATTRIBUTE_PREFIXES: [&str; 4] = ["generic.", "player.", "zombie.", "horse."];

/// Migrate a sound event id.
pub fn sound(value: &str, ctx: &mut Ctx<'_>) -> String {
    if value.contains("$(") || (value.contains(':') && !value.starts_with("minecraft:")) {
        return value.to_string();
    }
    let mut path = strip_namespace(value).to_string();
    if ctx.crosses(802)
        && let Some(event) = SOUNDS.legacy.get(&path)
    {
        path.clone_from(event);
    }
    if ctx.crosses(1202) {
        for (small, base) in [("entity.small_slime.", "entity.slime."), ("entity.small_magmacube.", "entity.magma_cube.")] {
            if let Some(event) = path.strip_prefix(small) {
                path = format!("{base}{event}_small");
            }
        }
    }
    for step in &SOUNDS.prefixes {
        if !ctx.crosses(step.max) {
            continue;
        }
        if let Some((old, new)) = step.map.iter().find(|(old, _)| path.starts_with(old.as_str())) {
            path = format!("{new}{}", &path[old.len()..]);
        }
    }
    namespaced(&path)
}

/// Migrate an entity attribute id.
pub fn attribute(value: &str, ctx: &mut Ctx<'_>) -> String {
    if value.contains("$(") || (value.contains(':') && !value.starts_with("minecraft:")) {
        return value.to_string();
    }
    let mut path = strip_namespace(value).to_string();
    if ctx.crosses(1502) {
        path = snake_case(&path);
    }
    if ctx.crosses(2101)
        && let Some(prefix) = ATTRIBUTE_PREFIXES.iter().find(|p| path.starts_with(**p))
    {
        path = path[prefix.len()..].to_string();
    }
    if ctx.target_at_least(1600) || value.starts_with("minecraft:") {
        namespaced(&path)
    } else {
        path
    }
}

/// Migrate an attribute modifier operation (numeric or named).
pub fn attribute_operation(value: &str, ctx: &mut Ctx<'_>) -> String {
    let named = match value {
        "0" | "add" | "add_value" => "add_value",
        "1" | "multiply_base" | "add_multiplied_base" => "add_multiplied_base",
        "2" | "multiply" | "add_multiplied_total" => "add_multiplied_total",
        _ => {
            ctx.diag(codes::UNKNOWN_LEGACY_ID, format!("unknown attribute operation {value}"));
            return value.to_string();
        }
    };
    if ctx.crosses(2004) {
        return named.to_string();
    }
    if value.parse::<u8>().is_ok() {
        return value.to_string();
    }
    match named {
        "add_value" => "add",
        "add_multiplied_base" => "multiply_base",
        _ => "multiply",
    }
    .to_string()
}

/// Resource id of an attribute modifier identified by UUID and name before
/// 1.20.5. Derived from the name; the UUID is used when the name is empty.
pub fn modifier_id(uuid: &str, name: &str) -> String {
    let source = if name.trim().is_empty() { uuid } else { name };
    let mut id = String::with_capacity(source.len());
    for c in source.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/') {
            id.push(c);
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    namespaced(id.trim_matches('_'))
}
