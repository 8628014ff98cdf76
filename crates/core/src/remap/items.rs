//! Item ids, legacy damage values and the item tag fields they moved into.

use super::{
    DYE_COLORS, Renames, blocks, cascade, entities, ids, legacy_key, load_table, namespaced, placeholder,
    sorted, strip_namespace,
};
use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use mapshift_nbt::{Compound, SnbtError, Tag, pack, unpack};
use serde::Deserialize;
use std::sync::LazyLock;

/// An item reference as it appears in commands and NBT.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDescriptor {
    /// Identifier, numeric legacy id, or `#tag`.
    pub id: String,
    /// Legacy damage value; `-1` (or `None` when read) means any.
    pub data: Option<i32>,
    /// Item `tag` compound.
    pub nbt: Option<Compound>,
    /// Raw data component list (the text between the brackets).
    pub components: Option<String>,
    /// Whether the item is tested rather than given.
    pub read: bool,
}

impl ItemDescriptor {
    /// A descriptor holding only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parse `id{nbt}` or `id[components]`.
    pub fn parse(text: &str) -> Result<Self, SnbtError> {
        let text = text.trim();
        let split = text.find(['[', '{']).unwrap_or(text.len());
        let (id, mut rest) = text.split_at(split);
        let mut components = None;
        if rest.starts_with('[') {
            let end = closing_bracket(rest).unwrap_or(rest.len());
            components = Some(rest[1..end.min(rest.len())].to_string());
            rest = rest.get(end + 1..).unwrap_or("");
        }
        let nbt = if rest.trim().is_empty() {
            None
        } else {
            match unpack(rest)? {
                Tag::Compound(c) => Some(c),
                _ => {
                    return Err(SnbtError::Unexpected {
                        pos: text.len() - rest.len(),
                        found: rest.chars().next().unwrap_or(' '),
                        expected: "item tag compound",
                    });
                }
            }
        };
        Ok(Self {
            id: id.to_string(),
            data: None,
            nbt,
            components,
            read: false,
        })
    }

    /// Render as `id[components]{nbt}`; empty parts are omitted.
    pub fn render(&self) -> String {
        let mut out = self.id.clone();
        if let Some(components) = &self.components {
            out.push('[');
            out.push_str(components);
            out.push(']');
        }
        if let Some(nbt) = self.nbt.as_ref().filter(|c| !c.is_empty()) {
            out.push_str(&pack(&Tag::Compound(nbt.clone())));
        }
        out
    }

    fn tag_mut(&mut self) -> &mut Compound {
        self.nbt.get_or_insert_with(Compound::new)
    }
}

/// Byte offset of the bracket closing the one at offset 0.
fn closing_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct ItemTables {
    numeric: Vec<String>,
    records: Vec<String>,
    flatten: IndexMap<String, ItemRule>,
    durability: Vec<String>,
    spawn_eggs: Vec<String>,
    renames: Vec<Renames>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ItemRule {
    id: Option<String>,
    variants: Vec<String>,
    colors: Option<String>,
    inverted: bool,
}

impl ItemRule {
    fn resolve(&self, name: &str, data: i32) -> String {
        if !self.variants.is_empty() {
            return self
                .variants
                .get(data.max(0) as usize)
                .unwrap_or(&self.variants[0])
                .clone();
        }
        if let Some(template) = &self.colors {
            let index = (data & 15) as usize;
            let index = if self.inverted { 15 - index } else { index };
            return template.replace("{color}", DYE_COLORS[index]);
        }
        self.id.clone().unwrap_or_else(|| name.to_string())
    }

    fn members(&self, name: &str) -> Vec<String> {
        if !self.variants.is_empty() {
            self.variants.clone()
        } else if let Some(template) = &self.colors {
            DYE_COLORS.iter().map(|c| template.replace("{color}", c)).collect()
        } else {
            vec![self.id.clone().unwrap_or_else(|| name.to_string())]
        }
    }
}

static TABLES: LazyLock<ItemTables> = LazyLock::new(|| {
    let mut tables: ItemTables = load_table("items.jsonc", include_str!("../../data/items.jsonc"));
    tables.renames = sorted(std::mem::take(&mut tables.renames));
    tables
});

/// Name of a numeric legacy item id (blocks below 256).
pub fn numeric_name(id: i64) -> Option<&'static str> {
    let name = match id {
        0..256 => return blocks::numeric_name(id),
        256..2256 => TABLES.numeric.get((id - 256) as usize),
        _ => usize::try_from(id - 2256).ok().and_then(|i| TABLES.records.get(i)),
    };
    name.map(String::as_str).filter(|n| !n.is_empty())
}

/// Migrate an item reference across the window in `ctx`.
pub fn update(mut desc: ItemDescriptor, ctx: &mut Ctx<'_>) -> ItemDescriptor {
    if desc.id.contains("$(") || desc.id.starts_with('#') {
        return desc;
    }
    if ctx.crosses(802) {
        legacy_potion(&mut desc);
    }
    if ctx.crosses(1202) {
        desc = flatten(desc, ctx);
        if desc.id.starts_with('#') {
            return desc;
        }
    } else {
        desc.id = namespaced(&desc.id);
    }
    if !desc.id.starts_with("minecraft:") {
        return desc;
    }
    desc.id = namespaced(&cascade(strip_namespace(&desc.id), &TABLES.renames, ctx));
    desc
}

/// Pre-1.9 potions stored their type in the damage value.
fn legacy_potion(desc: &mut ItemDescriptor) {
    let key = legacy_key(&desc.id);
    if key != "potion" && key != "373" {
        return;
    }
    let Some(damage) = desc.data.filter(|d| *d > 0) else {
        return;
    };
    let (potion, splash) = ids::legacy_potion(i64::from(damage));
    desc.tag_mut().insert("Potion".into(), Tag::string(potion));
    desc.id = if splash { "splash_potion" } else { "potion" }.into();
    desc.data = Some(0);
}

fn flatten(mut desc: ItemDescriptor, ctx: &mut Ctx<'_>) -> ItemDescriptor {
    if desc.id.contains(':') && !desc.id.starts_with("minecraft:") {
        return desc;
    }
    let key = legacy_key(&desc.id);
    let name = match key.parse::<i64>() {
        Ok(n) => match numeric_name(n) {
            Some(name) => name.to_string(),
            None => {
                ctx.diag(codes::UNKNOWN_LEGACY_ID, format!("unknown numeric item id {n}"));
                return desc;
            }
        },
        Err(_) => key,
    };
    let any = desc.read && matches!(desc.data, None | Some(-1));
    let data = desc.data.take().unwrap_or(0).max(0);

    let id = match name.as_str() {
        "spawn_egg" => spawn_egg(&mut desc, ctx),
        "filled_map" => {
            if !any {
                desc.tag_mut().entry("map".into()).or_insert(Tag::int(i64::from(data)));
            }
            name
        }
        _ if TABLES.durability.contains(&name) => {
            if !any && data > 0 {
                desc.tag_mut().entry("Damage".into()).or_insert(Tag::int(i64::from(data)));
            }
            name
        }
        _ => match TABLES.flatten.get(&name) {
            Some(rule) if any && rule.members(&name).len() > 1 => {
                placeholder(ctx, &name, &format!("{name} with any damage value"))
            }
            Some(rule) => rule.resolve(&name, data),
            None if blocks::is_legacy_block(&name) => {
                if any && blocks::family(&name).len() > 1 {
                    placeholder(ctx, &name, &format!("{name} with any damage value"))
                } else {
                    blocks::flatten_id(&name, data).unwrap_or(name)
                }
            }
            None => name,
        },
    };
    desc.id = namespaced(&id);
    if let Some(tag) = &desc.nbt
        && tag.is_empty()
    {
        desc.nbt = None;
    }
    desc
}

/// The 1.13 id of a legacy item name with damage 0.
pub(crate) fn flatten_name(name: &str) -> String {
    let name = legacy_key(name);
    match TABLES.flatten.get(&name) {
        Some(rule) => rule.resolve(&name, 0),
        None => blocks::flatten_id(&name, 0).unwrap_or(name),
    }
}

fn spawn_egg(desc: &mut ItemDescriptor, ctx: &mut Ctx<'_>) -> String {
    let entity = desc.nbt.as_mut().and_then(|tag| {
        let entity_tag = tag.get_mut("EntityTag")?.as_compound_mut()?;
        let id = entity_tag.shift_remove("id");
        if entity_tag.is_empty() {
            tag.shift_remove("EntityTag");
        }
        id
    });
    match entity.as_ref().and_then(Tag::as_str) {
        Some(entity) => format!("{}_spawn_egg", entities::flattening_name(entity)),
        None if desc.read => placeholder(ctx, "spawn_egg", "spawn egg without an entity"),
        None => {
            ctx.diag(
                codes::UNKNOWN_LEGACY_ID,
                "spawn egg without an entity; defaulted to pig_spawn_egg",
            );
            "pig_spawn_egg".into()
        }
    }
}

pub(crate) fn placeholder_families() -> Vec<(String, Vec<String>)> {
    let mut families: Vec<(String, Vec<String>)> = TABLES
        .flatten
        .iter()
        .map(|(name, rule)| (name.clone(), rule.members(name)))
        .filter(|(_, members)| members.len() > 1)
        .collect();
    families.push((
        "spawn_egg".into(),
        TABLES.spawn_eggs.iter().map(|e| format!("{e}_spawn_egg")).collect(),
    ));
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn run(desc: ItemDescriptor, source: u16, target: u16) -> (ItemDescriptor, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = update(desc, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    fn legacy(id: &str, data: i32) -> ItemDescriptor {
        ItemDescriptor {
            data: Some(data),
            ..ItemDescriptor::new(id)
        }
    }

    #[test]
    fn damage_variants_flatten() {
        assert_eq!(run(legacy("coal", 1), 1202, 1300).0.id, "minecraft:charcoal");
        assert_eq!(run(legacy("351", 4), 1202, 1300).0.id, "minecraft:lapis_lazuli");
        assert_eq!(run(legacy("banner", 0), 1202, 1300).0.id, "minecraft:black_banner");
        assert_eq!(run(legacy("bed", 14), 1202, 1300).0.id, "minecraft:red_bed");
        assert_eq!(run(legacy("wool", 14), 1202, 1300).0.id, "minecraft:red_wool");
        assert_eq!(run(legacy("2256", 0), 1202, 1300).0.id, "minecraft:music_disc_13");
    }

    #[test]
    fn dye_renames_follow_the_target() {
        assert_eq!(run(legacy("dye", 1), 1202, 1300).0.id, "minecraft:rose_red");
        assert_eq!(run(legacy("dye", 1), 1202, 2105).0.id, "minecraft:red_dye");
        assert_eq!(run(ItemDescriptor::new("scute"), 1300, 2004).0.id, "minecraft:scute");
        assert_eq!(run(ItemDescriptor::new("scute"), 1300, 2005).0.id, "minecraft:turtle_scute");
    }

    #[test]
    fn durability_moves_into_the_tag() {
        let (out, _) = run(legacy("iron_sword", 5), 1202, 1300);
        assert_eq!(out.render(), "minecraft:iron_sword{Damage:5}");
        let (out, _) = run(legacy("iron_sword", 0), 1202, 1300);
        assert_eq!(out.render(), "minecraft:iron_sword");
        let (out, _) = run(legacy("filled_map", 3), 1202, 1300);
        assert_eq!(out.render(), "minecraft:filled_map{map:3}");
    }

    #[test]
    fn spawn_eggs_take_their_entity() {
        let mut egg = ItemDescriptor::parse(r#"spawn_egg{EntityTag:{id:"minecraft:zombie_pigman"}}"#).unwrap();
        egg.data = Some(0);
        let (out, _) = run(egg.clone(), 1202, 1300);
        assert_eq!(out.render(), "minecraft:zombie_pigman_spawn_egg");
        let (out, _) = run(egg, 1202, 2105);
        assert_eq!(out.id, "minecraft:zombified_piglin_spawn_egg");

        let legacy_name = ItemDescriptor::parse(r#"spawn_egg{EntityTag:{id:"Creeper",NoAI:1b}}"#).unwrap();
        let (out, _) = run(legacy_name, 1202, 1300);
        assert_eq!(out.render(), "minecraft:creeper_spawn_egg{EntityTag:{NoAI:1b}}");
    }

    #[test]
    fn any_damage_reads_emit_placeholders() {
        let desc = ItemDescriptor {
            data: Some(-1),
            read: true,
            ..ItemDescriptor::new("dye")
        };
        let (out, diags) = run(desc, 1202, 2105);
        assert_eq!(out.id, "#mapshift:legacy/dye");
        assert_eq!(diags, 1);

        let planks = ItemDescriptor {
            read: true,
            ..ItemDescriptor::new("planks")
        };
        assert_eq!(run(planks, 1202, 2105).0.id, "#mapshift:legacy/planks");

        let sword = ItemDescriptor {
            read: true,
            ..ItemDescriptor::new("diamond_sword")
        };
        assert_eq!(run(sword, 1202, 2105), (ItemDescriptor { read: true, ..ItemDescriptor::new("minecraft:diamond_sword") }, 0));
    }

    #[test]
    fn pre_combat_update_potions_get_a_type() {
        let (out, _) = run(legacy("potion", 8197), 800, 900);
        assert_eq!(out.render(), r#"minecraft:potion{Potion:"minecraft:healing"}"#);
        let (out, _) = run(legacy("potion", 16421), 800, 900);
        assert_eq!(out.render(), r#"minecraft:splash_potion{Potion:"minecraft:strong_healing"}"#);
    }

    #[test]
    fn components_survive_parse_and_render() {
        let desc = ItemDescriptor::parse(r#"minecraft:stick[custom_name='"a]b"',max_stack_size=1]"#).unwrap();
        assert_eq!(desc.components.as_deref(), Some(r#"custom_name='"a]b"',max_stack_size=1"#));
        assert_eq!(desc.render(), r#"minecraft:stick[custom_name='"a]b"',max_stack_size=1]"#);
    }

    #[test]
    fn numeric_ids_cover_blocks_items_and_records() {
        assert_eq!(numeric_name(1), Some("stone"));
        assert_eq!(numeric_name(351), Some("dye"));
        assert_eq!(numeric_name(451), None);
        assert_eq!(numeric_name(2267), Some("record_wait"));
        assert_eq!(TABLES.numeric.len(), 198);
    }
}
