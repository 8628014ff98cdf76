//! Entity type ids and the NBT fields that used to select them.

use super::{Renames, cascade, load_table, namespaced, placeholder, sorted, strip_namespace};
use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_nbt::{Compound, Tag};
use serde::Deserialize;
use std::sync::LazyLock;

/// An entity type reference plus the NBT that may refine it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityDescriptor {
    /// Entity type id or `#tag`.
    pub id: String,
    /// Entity data (summon NBT or a selector's `nbt=` filter).
    pub nbt: Option<Compound>,
    /// Whether the type is matched rather than created.
    pub read: bool,
}

#[derive(Debug, Deserialize)]
struct EntityTables {
    legacy: IndexMap<String, String>,
    split: IndexMap<String, Split>,
    renames: Vec<Renames>,
    boat_types: Vec<String>,
    block_entities: BlockEntityTables,
}

#[derive(Debug, Deserialize)]
struct BlockEntityTables {
    legacy: IndexMap<String, String>,
    renames: Vec<Renames>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Split {
    family: String,
    #[serde(default)]
    key: Option<String>,
    types: Vec<String>,
    #[serde(default)]
    flag: IndexMap<String, String>,
}

impl Split {
    fn members(&self) -> Vec<String> {
        let mut members: Vec<String> = Vec::new();
        for id in self.types.iter().chain(self.flag.values()) {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }
        members
    }
}

static TABLES: LazyLock<EntityTables> = LazyLock::new(|| {
    let mut tables: EntityTables = load_table("entities.jsonc", include_str!("../../data/entities.jsonc"));
    tables.renames = sorted(std::mem::take(&mut tables.renames));
    tables.block_entities.renames = sorted(std::mem::take(&mut tables.block_entities.renames));
    tables
});

/// Migrate an entity type reference across the window in `ctx`.
pub fn update(mut desc: EntityDescriptor, ctx: &mut Ctx<'_>) -> EntityDescriptor {
    desc.id = rename(&desc.id, desc.nbt.as_mut(), desc.read, ctx);
    if desc.nbt.as_ref().is_some_and(Compound::is_empty) {
        desc.nbt = None;
    }
    desc
}

/// The id `id` becomes in the target era. Discriminator fields that picked
/// the type are removed from `nbt`.
pub fn rename(id: &str, mut nbt: Option<&mut Compound>, read: bool, ctx: &mut Ctx<'_>) -> String {
    if id.contains("$(") || id.starts_with('#') {
        return id.to_string();
    }
    if id.contains(':') && !id.starts_with("minecraft:") {
        return id.to_string();
    }
    let key = strip_namespace(id);
    let mut path = key.to_string();
    // CamelCase names were still accepted after 1.11 and are invalid today.
    let camel_case = key.bytes().any(|b| b.is_ascii_uppercase());
    if ctx.crosses(1002) || (camel_case && ctx.target_at_least(1100)) {
        if let Some(split) = TABLES.split.get(key) {
            match discriminate(key, split, nbt.as_deref_mut()) {
                Some(picked) => path = picked,
                None if read => return placeholder(ctx, &split.family, &format!("{key} without its type field")),
                None => path = split.types[0].clone(),
            }
        } else if let Some(legacy) = TABLES.legacy.get(key) {
            path.clone_from(legacy);
        }
    }
    if camel_case && ctx.target_at_least(1100) {
        path = path.to_ascii_lowercase();
    }
    path = cascade(&path, &TABLES.renames, ctx);
    if ctx.crosses(2101) && (path == "boat" || path == "chest_boat") {
        let wood = nbt.as_deref_mut().and_then(|c| c.shift_remove("Type")).and_then(|t| match t {
            Tag::String(s) => Some(s),
            Tag::Number(n) => TABLES.boat_types.get(n.as_i64().max(0) as usize).cloned(),
            _ => None,
        });
        path = match wood {
            Some(wood) => boat_id(&path, &wood),
            None if read => return placeholder(ctx, &path, &format!("{path} without a wood type")),
            None => boat_id(&path, "oak"),
        };
    }
    namespaced(&path)
}

fn boat_id(kind: &str, wood: &str) -> String {
    match (kind, wood) {
        ("boat", "bamboo") => "bamboo_raft".into(),
        ("chest_boat", "bamboo") => "bamboo_chest_raft".into(),
        _ => format!("{wood}_{kind}"),
    }
}

fn discriminate(key: &str, split: &Split, nbt: Option<&mut Compound>) -> Option<String> {
    let nbt = nbt?;
    for (field, id) in &split.flag {
        if let Some(flag) = nbt.shift_remove(field)
            && flag.as_i64().unwrap_or(0) != 0
        {
            return Some(id.clone());
        }
    }
    let field = split.key.as_deref()?;
    let value = nbt.shift_remove(field)?.as_i64()?;
    if key == "Zombie" && (1..=5).contains(&value) {
        nbt.insert("Profession".into(), Tag::int(value - 1));
    }
    Some(
        split
            .types
            .get(value.max(0) as usize)
            .unwrap_or(&split.types[0])
            .clone(),
    )
}

/// Migrate a block entity `id`.
pub fn block_entity_id(id: &str, ctx: &Ctx<'_>) -> String {
    if id.contains("$(") || (id.contains(':') && !id.starts_with("minecraft:")) {
        return id.to_string();
    }
    let key = strip_namespace(id);
    let mut path = key.to_string();
    if ctx.crosses(1002)
        && let Some(modern) = TABLES.block_entities.legacy.get(key)
    {
        path.clone_from(modern);
    }
    let path = cascade(&path, &TABLES.block_entities.renames, ctx);
    if ctx.target_at_least(1100) || id.starts_with("minecraft:") {
        namespaced(&path)
    } else {
        path
    }
}

/// The 1.13 id of a legacy entity name.
pub(crate) fn flattening_name(id: &str) -> String {
    let key = strip_namespace(id);
    let mut name = TABLES
        .legacy
        .get(key)
        .cloned()
        .unwrap_or_else(|| key.to_ascii_lowercase());
    for step in TABLES.renames.iter().filter(|r| r.max <= 1202) {
        if let Some(next) = step.map.get(&name) {
            name.clone_from(next);
        }
    }
    name
}

pub(crate) fn placeholder_families() -> Vec<(String, Vec<String>)> {
    let mut families: Vec<(String, Vec<String>)> = TABLES
        .split
        .values()
        .map(|split| (split.family.clone(), split.members()))
        .collect();
    for kind in ["boat", "chest_boat"] {
        families.push((
            kind.into(),
            TABLES.boat_types.iter().map(|w| boat_id(kind, w)).collect(),
        ));
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;
    use mapshift_nbt::unpack;

    fn run(id: &str, nbt: Option<&str>, read: bool, source: u16, target: u16) -> (EntityDescriptor, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let desc = EntityDescriptor {
            id: id.into(),
            nbt: nbt.map(|s| match unpack(s).unwrap() {
                Tag::Compound(c) => c,
                other => panic!("not a compound: {other:?}"),
            }),
            read,
        };
        let out = update(desc, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn camel_case_names_become_ids() {
        assert_eq!(run("PigZombie", None, false, 1000, 1100).0.id, "minecraft:zombie_pigman");
        assert_eq!(run("PigZombie", None, false, 1000, 2105).0.id, "minecraft:zombified_piglin");
        assert_eq!(run("XPOrb", None, false, 1000, 1300).0.id, "minecraft:experience_orb");
        assert_eq!(run("minecraft:snowman", None, false, 1202, 1300).0.id, "minecraft:snow_golem");
    }

    #[test]
    fn discriminators_pick_the_type() {
        let (out, _) = run("Skeleton", Some("{SkeletonType:1b,NoAI:1b}"), false, 1000, 1300);
        assert_eq!(out.id, "minecraft:wither_skeleton");
        assert_eq!(out.nbt.unwrap().len(), 1);

        let (out, _) = run("Zombie", Some("{ZombieType:3}"), false, 1000, 1300);
        assert_eq!(out.id, "minecraft:zombie_villager");
        assert_eq!(out.nbt.unwrap()["Profession"], Tag::int(2));

        let (out, _) = run("Guardian", Some("{Elder:1b}"), false, 1000, 1300);
        assert_eq!((out.id.as_str(), out.nbt), ("minecraft:elder_guardian", None));

        assert_eq!(run("EntityHorse", Some("{Type:4}"), false, 1000, 1300).0.id, "minecraft:skeleton_horse");
        assert_eq!(run("EntityHorse", None, false, 1000, 1300).0.id, "minecraft:horse");
    }

    #[test]
    fn untyped_reads_are_ambiguous() {
        let (out, diags) = run("Skeleton", None, true, 1000, 1300);
        assert_eq!(out.id, "#mapshift:legacy/skeleton");
        assert_eq!(diags, 1);
        let (out, _) = run("minecraft:boat", None, true, 2004, 2105);
        assert_eq!(out.id, "#mapshift:legacy/boat");
    }

    #[test]
    fn boats_split_by_wood_type() {
        let (out, _) = run("minecraft:boat", Some(r#"{Type:"spruce"}"#), false, 2004, 2105);
        assert_eq!((out.id.as_str(), out.nbt), ("minecraft:spruce_boat", None));
        assert_eq!(run("minecraft:chest_boat", Some(r#"{Type:"bamboo"}"#), false, 2004, 2105).0.id, "minecraft:bamboo_chest_raft");
        assert_eq!(run("minecraft:boat", None, false, 2004, 2105).0.id, "minecraft:oak_boat");
        assert_eq!(run("minecraft:boat", None, false, 2004, 2101).0.id, "minecraft:boat");
    }

    #[test]
    fn block_entity_ids() {
        let engine = Engine::new(Version::new(1300));
        let ctx = Ctx::new(&engine, Version::new(1000), "test");
        assert_eq!(block_entity_id("Control", &ctx), "minecraft:command_block");
        assert_eq!(block_entity_id("Music", &ctx), "minecraft:note_block");
        assert_eq!(block_entity_id("minecraft:chest", &ctx), "minecraft:chest");
    }

    #[test]
    fn spawn_egg_names_use_the_1_13_id() {
        assert_eq!(flattening_name("Ozelot"), "ocelot");
        assert_eq!(flattening_name("minecraft:villager_golem"), "iron_golem");
        assert_eq!(flattening_name("minecraft:zombie_pigman"), "zombie_pigman");
    }
}
