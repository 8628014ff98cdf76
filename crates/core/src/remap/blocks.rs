//! Block ids, legacy data values and block states.

use super::{
    DYE_COLORS, Renames, cascade, legacy_key, load_table, namespaced, placeholder, sorted, strip_namespace,
};
use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_nbt::{Compound, SnbtError, Tag, pack, unpack};
use serde::Deserialize;
use std::sync::LazyLock;

/// Block state properties in written order.
pub type States = IndexMap<String, String>;

/// A block reference as it appears in commands and NBT.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockDescriptor {
    /// Identifier, numeric legacy id, or `#tag`.
    pub id: String,
    /// Legacy data value; `-1` (or `None` when read) means any.
    pub data: Option<i32>,
    /// Block states.
    pub states: States,
    /// Block entity data.
    pub nbt: Option<Compound>,
    /// Whether the block is tested against world state rather than placed.
    pub read: bool,
}

impl BlockDescriptor {
    /// A descriptor holding only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parse `id[key=value,...]{nbt}`.
    pub fn parse(text: &str) -> Result<Self, SnbtError> {
        let text = text.trim();
        let split = text.find(['[', '{']).unwrap_or(text.len());
        let (id, mut rest) = text.split_at(split);
        let mut states = States::new();
        if let Some(body) = rest.strip_prefix('[') {
            let end = body.find(']').unwrap_or(body.len());
            states = parse_states(&body[..end]);
            rest = body.get(end + 1..).unwrap_or("");
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
                        expected: "block entity compound",
                    });
                }
            }
        };
        Ok(Self {
            id: id.to_string(),
            data: None,
            states,
            nbt,
            read: false,
        })
    }

    /// Render as `id[states]{nbt}`; empty parts are omitted.
    pub fn render(&self) -> String {
        let mut out = self.id.clone();
        if !self.states.is_empty() {
            let states: Vec<String> = self.states.iter().map(|(k, v)| format!("{k}={v}")).collect();
            out.push('[');
            out.push_str(&states.join(","));
            out.push(']');
        }
        if let Some(nbt) = self.nbt.as_ref().filter(|c| !c.is_empty()) {
            out.push_str(&pack(&Tag::Compound(nbt.clone())));
        }
        out
    }
}

/// Parse `key=value,key=value`.
pub fn parse_states(text: &str) -> States {
    text.split(',')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct BlockTables {
    numeric: Vec<String>,
    flatten: IndexMap<String, FlattenRule>,
    renames: Vec<Renames>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlattenRule {
    id: Option<String>,
    variants: Vec<String>,
    shift: u32,
    mask: Option<i32>,
    colors: Option<String>,
    by_data: IndexMap<i32, Flat>,
    shape: Option<Shape>,
    flag: Option<String>,
    wall_id: Option<String>,
    states: States,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Flat {
    id: String,
    #[serde(default)]
    states: States,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Shape {
    Stairs,
    Slab,
    DoubleSlab,
    Log,
    Pillar,
    Facing6,
    Horizontal,
    Facing4,
    Torch,
    Button,
    Door,
    Bed,
    Rail,
    PoweredRail,
    Trapdoor,
    Repeater,
    DoublePlant,
    Age,
    Rotation,
    Power,
    Powered,
    Layers,
    Level,
    Moisture,
    Bites,
}

static TABLES: LazyLock<BlockTables> = LazyLock::new(|| {
    let mut tables: BlockTables = load_table("blocks.jsonc", include_str!("../../data/blocks.jsonc"));
    tables.renames = sorted(std::mem::take(&mut tables.renames));
    tables
});

const SKULLS: [&str; 6] = [
    "skeleton_skull",
    "wither_skeleton_skull",
    "zombie_head",
    "player_head",
    "creeper_head",
    "dragon_head",
];

const POTTABLE: [&str; 21] = [
    "oak_sapling",
    "spruce_sapling",
    "birch_sapling",
    "jungle_sapling",
    "acacia_sapling",
    "dark_oak_sapling",
    "fern",
    "dandelion",
    "poppy",
    "blue_orchid",
    "allium",
    "azure_bluet",
    "red_tulip",
    "orange_tulip",
    "white_tulip",
    "pink_tulip",
    "oxeye_daisy",
    "red_mushroom",
    "brown_mushroom",
    "dead_bush",
    "cactus",
];

/// Name of a numeric legacy block id.
pub fn numeric_name(id: i64) -> Option<&'static str> {
    usize::try_from(id)
        .ok()
        .and_then(|i| TABLES.numeric.get(i))
        .map(String::as_str)
        .filter(|n| !n.is_empty())
}

/// Migrate a block reference across the window in `ctx`.
pub fn update(mut desc: BlockDescriptor, ctx: &mut Ctx<'_>) -> BlockDescriptor {
    if desc.id.contains("$(") || desc.id.starts_with('#') {
        return desc;
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
    let mut path = cascade(strip_namespace(&desc.id), &TABLES.renames, ctx);
    if ctx.crosses(1605) && path == "cauldron" {
        match desc.states.get("level").and_then(|l| l.parse::<u8>().ok()) {
            Some(level) if level > 0 => path = "water_cauldron".into(),
            _ => {
                desc.states.shift_remove("level");
            }
        }
    }
    desc.id = namespaced(&path);
    desc
}

/// The 1.13 id a legacy `(name, data)` pair flattens to, ignoring states.
/// `None` when the name is not a legacy block.
pub fn flatten_id(name: &str, data: i32) -> Option<String> {
    let name = legacy_key(name);
    let name = match name.parse::<i64>() {
        Ok(n) => numeric_name(n)?.to_string(),
        Err(_) => name,
    };
    match name.as_str() {
        "bed" => return Some("red_bed".into()),
        "skull" => return Some(SKULLS.get(data as usize).unwrap_or(&SKULLS[0]).to_string()),
        "standing_banner" | "wall_banner" => return Some("black_banner".into()),
        _ => {}
    }
    let Some(rule) = TABLES.flatten.get(&name) else {
        return TABLES.numeric.contains(&name).then_some(name);
    };
    let (mut id, _) = resolve(&name, rule, data.max(0));
    if let Some(wall) = &rule.wall_id
        && id == *wall
    {
        id = rule.id.clone().unwrap_or_else(|| name.clone());
    }
    Some(id)
}

/// Whether `name` is a known legacy block name.
pub fn is_legacy_block(name: &str) -> bool {
    let key = legacy_key(name);
    TABLES.flatten.contains_key(&key) || TABLES.numeric.contains(&key)
}

/// Flattened ids a legacy block name can stand for across its data values.
pub(crate) fn family(name: &str) -> Vec<String> {
    let name = legacy_key(name);
    match TABLES.flatten.get(&name) {
        Some(rule) => rule_members(&name, rule),
        None => vec![name],
    }
}

fn flatten(mut desc: BlockDescriptor, ctx: &mut Ctx<'_>) -> BlockDescriptor {
    let key = legacy_key(&desc.id);
    if desc.id.contains(':') && !desc.id.starts_with("minecraft:") {
        return desc;
    }
    let name = match key.parse::<i64>() {
        Ok(n) => match numeric_name(n) {
            Some(name) => name.to_string(),
            None => {
                ctx.diag(
                    mapshift_diagnostics::codes::UNKNOWN_LEGACY_ID,
                    format!("unknown numeric block id {n}"),
                );
                return desc;
            }
        },
        Err(_) => key,
    };
    let any = desc.read && matches!(desc.data, None | Some(-1)) && desc.states.is_empty();

    if let Some(out) = irregular(&name, &mut desc, any, ctx) {
        return out;
    }

    let Some(rule) = TABLES.flatten.get(&name) else {
        desc.id = namespaced(&name);
        desc.data = None;
        return desc;
    };

    let mut given = std::mem::take(&mut desc.states);
    let mut data = desc.data.take();
    if data.is_none() && !given.is_empty() {
        data = legacy_states(rule, &mut given);
    }

    if any {
        let members = rule_members(&name, rule);
        desc.id = if members.len() > 1 {
            placeholder(ctx, &name, &format!("{name} with any data value"))
        } else {
            namespaced(&members[0])
        };
        return desc;
    }

    let (id, mut states) = resolve(&name, rule, data.unwrap_or(0).max(0));
    for (k, v) in given {
        let k = if k == "log_axis" { "axis".to_string() } else { k };
        states.insert(k, v);
    }
    desc.id = namespaced(&id);
    desc.states = states;
    desc
}

fn legacy_states(rule: &FlattenRule, states: &mut States) -> Option<i32> {
    for key in ["variant", "color", "type"] {
        let Some(value) = states.shift_remove(key) else { continue };
        let value = if value == "silver" { "light_gray".to_string() } else { value };
        if rule.colors.is_some()
            && let Some(i) = DYE_COLORS.iter().position(|c| *c == value)
        {
            return Some(i as i32);
        }
        let prefix = format!("{value}_");
        let suffix = format!("_{value}");
        if let Some(i) = rule
            .variants
            .iter()
            .position(|v| *v == value || v.starts_with(&prefix) || v.ends_with(&suffix))
        {
            return Some((i as i32) << rule.shift);
        }
    }
    None
}

fn resolve(name: &str, rule: &FlattenRule, data: i32) -> (String, States) {
    let mut states = rule.states.clone();
    if let Some(flat) = rule.by_data.get(&data) {
        states.extend(flat.states.clone());
        return (flat.id.clone(), states);
    }
    let mut id = if !rule.variants.is_empty() {
        let index = ((data >> rule.shift) & rule.mask.unwrap_or(15)) as usize;
        rule.variants.get(index).unwrap_or(&rule.variants[0]).clone()
    } else if let Some(template) = &rule.colors {
        template.replace("{color}", DYE_COLORS[(data & 15) as usize])
    } else {
        rule.id.clone().unwrap_or_else(|| name.to_string())
    };
    if let Some(shape) = rule.shape {
        apply_shape(shape, data, &mut id, &mut states, rule);
    }
    (id, states)
}

fn set(states: &mut States, key: &str, value: impl ToString) {
    states.insert(key.to_string(), value.to_string());
}

fn apply_shape(shape: Shape, d: i32, id: &mut String, states: &mut States, rule: &FlattenRule) {
    const FACING6: [&str; 8] = ["down", "up", "north", "south", "west", "east", "down", "down"];
    const FACING4: [&str; 4] = ["south", "west", "north", "east"];
    const RAILS: [&str; 10] = [
        "north_south",
        "east_west",
        "ascending_east",
        "ascending_west",
        "ascending_north",
        "ascending_south",
        "south_east",
        "south_west",
        "north_west",
        "north_east",
    ];
    let horizontal = |d: i32| match d {
        3 => "south",
        4 => "west",
        5 => "east",
        _ => "north",
    };
    let flag = |states: &mut States, bit: i32| {
        if let Some(name) = &rule.flag {
            set(states, name, d & bit != 0);
        }
    };
    match shape {
        Shape::Stairs => {
            set(states, "facing", ["east", "west", "south", "north"][(d & 3) as usize]);
            set(states, "half", if d & 4 != 0 { "top" } else { "bottom" });
        }
        Shape::Slab => set(states, "type", if d & 8 != 0 { "top" } else { "bottom" }),
        Shape::DoubleSlab => set(states, "type", "double"),
        Shape::Log => match (d >> 2) & 3 {
            3 => {
                *id = id.replace("_log", "_wood");
                set(states, "axis", "y");
            }
            axis => set(states, "axis", ["y", "x", "z"][axis as usize]),
        },
        Shape::Pillar => set(states, "axis", ["y", "x", "z", "y"][((d >> 2) & 3) as usize]),
        Shape::Facing6 => {
            set(states, "facing", FACING6[(d & 7) as usize]);
            flag(states, 8);
        }
        Shape::Horizontal => set(states, "facing", horizontal(d)),
        Shape::Facing4 => {
            set(states, "facing", FACING4[(d & 3) as usize]);
            flag(states, 4);
        }
        Shape::Torch => {
            let facing = match d {
                1 => Some("east"),
                2 => Some("west"),
                3 => Some("south"),
                4 => Some("north"),
                _ => None,
            };
            if let (Some(facing), Some(wall)) = (facing, &rule.wall_id) {
                *id = wall.clone();
                set(states, "facing", facing);
            }
        }
        Shape::Button => {
            let (face, facing) = match d & 7 {
                0 => ("ceiling", "north"),
                1 => ("wall", "east"),
                2 => ("wall", "west"),
                3 => ("wall", "south"),
                4 => ("wall", "north"),
                _ => ("floor", "north"),
            };
            set(states, "face", face);
            set(states, "facing", facing);
            set(states, "powered", d & 8 != 0);
        }
        Shape::Door => {
            if d & 8 != 0 {
                set(states, "half", "upper");
                set(states, "hinge", if d & 1 != 0 { "right" } else { "left" });
                set(states, "powered", d & 2 != 0);
            } else {
                set(states, "half", "lower");
                set(states, "facing", ["east", "south", "west", "north"][(d & 3) as usize]);
                set(states, "open", d & 4 != 0);
            }
        }
        Shape::Bed => {
            set(states, "facing", FACING4[(d & 3) as usize]);
            set(states, "occupied", d & 4 != 0);
            set(states, "part", if d & 8 != 0 { "head" } else { "foot" });
        }
        Shape::Rail => set(states, "shape", RAILS.get(d as usize).unwrap_or(&RAILS[0])),
        Shape::PoweredRail => {
            set(states, "shape", RAILS[((d & 7) as usize).min(5)]);
            set(states, "powered", d & 8 != 0);
        }
        Shape::Trapdoor => {
            set(states, "facing", ["north", "south", "west", "east"][(d & 3) as usize]);
            set(states, "open", d & 4 != 0);
            set(states, "half", if d & 8 != 0 { "top" } else { "bottom" });
        }
        Shape::Repeater => {
            set(states, "facing", FACING4[(d & 3) as usize]);
            set(states, "delay", (d >> 2) + 1);
        }
        Shape::DoublePlant => set(states, "half", if d & 8 != 0 { "upper" } else { "lower" }),
        Shape::Age => set(states, "age", d),
        Shape::Rotation => set(states, "rotation", d & 15),
        Shape::Power => set(states, "power", d & 15),
        Shape::Powered => set(states, "powered", d > 0),
        Shape::Layers => set(states, "layers", (d + 1).clamp(1, 8)),
        Shape::Level => set(states, "level", d & 15),
        Shape::Moisture => set(states, "moisture", d & 7),
        Shape::Bites => set(states, "bites", d.clamp(0, 6)),
    }
}

fn rule_members(name: &str, rule: &FlattenRule) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    let mut add = |id: String| {
        if !members.contains(&id) {
            members.push(id);
        }
    };
    if !rule.variants.is_empty() {
        rule.variants.iter().cloned().for_each(&mut add);
    } else if let Some(template) = &rule.colors {
        DYE_COLORS.iter().for_each(|c| add(template.replace("{color}", c)));
    } else {
        add(rule.id.clone().unwrap_or_else(|| name.to_string()));
    }
    rule.by_data.values().for_each(|flat| add(flat.id.clone()));
    members
}

pub(crate) fn placeholder_families() -> Vec<(String, Vec<String>)> {
    let mut families: Vec<(String, Vec<String>)> = TABLES
        .flatten
        .iter()
        .map(|(name, rule)| (name.clone(), rule_members(name, rule)))
        .filter(|(_, members)| members.len() > 1)
        .collect();
    let colored = |template: &str| -> Vec<String> {
        DYE_COLORS.iter().map(|c| template.replace("{color}", c)).collect()
    };
    families.push(("bed".into(), colored("{color}_bed")));
    families.push(("standing_banner".into(), colored("{color}_banner")));
    families.push(("wall_banner".into(), colored("{color}_wall_banner")));
    families.push(("skull".into(), SKULLS.iter().map(|s| s.to_string()).collect()));
    families.push(("wall_skull".into(), SKULLS.iter().map(|s| wall_skull(s)).collect()));
    let mut pots = vec!["flower_pot".to_string()];
    pots.extend(POTTABLE.iter().map(|p| format!("potted_{p}")));
    families.push(("flower_pot".into(), pots));
    families
}

fn wall_skull(id: &str) -> String {
    if let Some(base) = id.strip_suffix("_skull") {
        format!("{base}_wall_skull")
    } else if let Some(base) = id.strip_suffix("_head") {
        format!("{base}_wall_head")
    } else {
        id.to_string()
    }
}

fn take_int(nbt: &mut Option<Compound>, key: &str) -> Option<i64> {
    nbt.as_mut()?.shift_remove(key)?.as_i64()
}

fn shape_states(name: &str, desc: &BlockDescriptor, any: bool) -> States {
    if any {
        return States::new();
    }
    TABLES
        .flatten
        .get(name)
        .map(|rule| resolve(name, rule, desc.data.unwrap_or(0).max(0)).1)
        .unwrap_or_default()
}

/// Rules reading block entity data to pick the flattened id.
fn irregular(
    name: &str,
    desc: &mut BlockDescriptor,
    any: bool,
    ctx: &mut Ctx<'_>,
) -> Option<BlockDescriptor> {
    let mut out = BlockDescriptor {
        id: String::new(),
        data: None,
        states: States::new(),
        nbt: None,
        read: desc.read,
    };
    match name {
        "bed" | "red_bed" => {
            out.states = shape_states("bed", desc, any);
            out.id = match take_int(&mut desc.nbt, "color") {
                Some(c) => namespaced(&format!("{}_bed", DYE_COLORS[(c & 15) as usize])),
                None if desc.read => placeholder(ctx, "bed", "bed without color data"),
                None => namespaced("red_bed"),
            };
        }
        "standing_banner" | "wall_banner" => {
            out.states = shape_states(name, desc, any);
            let suffix = if name == "wall_banner" { "wall_banner" } else { "banner" };
            out.id = match take_int(&mut desc.nbt, "Base") {
                Some(b) => namespaced(&format!("{}_{suffix}", DYE_COLORS[15 - (b & 15) as usize])),
                None if desc.read => placeholder(ctx, name, "banner without base color"),
                None => namespaced(&format!("black_{suffix}")),
            };
        }
        "skull" => {
            let data = desc.data.unwrap_or(1);
            let wall = (2..=5).contains(&data);
            let rot = take_int(&mut desc.nbt, "Rot");
            let skull = match take_int(&mut desc.nbt, "SkullType") {
                Some(t) => Some(SKULLS.get(t as usize).copied().unwrap_or(SKULLS[0])),
                None if desc.read => None,
                None => Some(SKULLS[0]),
            };
            if wall {
                let facing = match data {
                    3 => "south",
                    4 => "west",
                    5 => "east",
                    _ => "north",
                };
                set(&mut out.states, "facing", facing);
            } else if let Some(rot) = rot {
                set(&mut out.states, "rotation", rot & 15);
            }
            out.id = match skull {
                Some(s) if wall => namespaced(&wall_skull(s)),
                Some(s) => namespaced(s),
                None => placeholder(ctx, if wall { "wall_skull" } else { "skull" }, "skull without type"),
            };
        }
        "flower_pot" => {
            let item = desc.nbt.as_mut().and_then(|c| c.shift_remove("Item"));
            let data = take_int(&mut desc.nbt, "Data").unwrap_or(0) as i32;
            out.id = match item {
                None if desc.read => placeholder(ctx, "flower_pot", "flower pot without contents"),
                None => namespaced("flower_pot"),
                Some(item) => {
                    let plant = match &item {
                        Tag::String(s) => flatten_id(s, data),
                        Tag::Number(n) => flatten_id(&n.as_i64().to_string(), data),
                        _ => None,
                    };
                    match plant {
                        Some(p) if POTTABLE.contains(&p.as_str()) => namespaced(&format!("potted_{p}")),
                        _ => namespaced("flower_pot"),
                    }
                }
            };
        }
        _ => return None,
    }
    out.nbt = desc.nbt.take().filter(|c| !c.is_empty());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn run(desc: BlockDescriptor, source: u16, target: u16) -> (BlockDescriptor, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = update(desc, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    fn legacy(id: &str, data: i32) -> BlockDescriptor {
        BlockDescriptor {
            data: Some(data),
            ..BlockDescriptor::new(id)
        }
    }

    #[test]
    fn variants_and_colors_flatten() {
        assert_eq!(run(legacy("stone", 1), 1202, 1300).0.id, "minecraft:granite");
        assert_eq!(run(legacy("minecraft:wool", 14), 1202, 1300).0.id, "minecraft:red_wool");
        assert_eq!(run(legacy("35", 11), 1202, 1300).0.id, "minecraft:blue_wool");
    }

    #[test]
    fn shapes_produce_states() {
        let (out, _) = run(legacy("log", 4), 1202, 1300);
        assert_eq!(out.render(), "minecraft:oak_log[axis=x]");
        let (out, _) = run(legacy("log", 13), 1202, 1300);
        assert_eq!(out.render(), "minecraft:spruce_wood[axis=y]");
        let (out, _) = run(legacy("oak_stairs", 6), 1202, 1300);
        assert_eq!(out.render(), "minecraft:oak_stairs[facing=south,half=top]");
        let (out, _) = run(legacy("torch", 1), 1202, 1300);
        assert_eq!(out.render(), "minecraft:wall_torch[facing=east]");
        let (out, _) = run(legacy("torch", 5), 1202, 1300);
        assert_eq!(out.render(), "minecraft:torch");
    }

    #[test]
    fn legacy_state_strings_resolve_variants() {
        let mut desc = BlockDescriptor::new("stone");
        desc.states = parse_states("variant=diorite");
        assert_eq!(run(desc, 1202, 1300).0.render(), "minecraft:diorite");
    }

    #[test]
    fn rename_cascade_is_monotonic() {
        assert_eq!(run(legacy("tallgrass", 1), 1202, 1300).0.id, "minecraft:grass");
        assert_eq!(run(legacy("tallgrass", 1), 1202, 2002).0.id, "minecraft:grass");
        assert_eq!(run(legacy("tallgrass", 1), 1202, 2105).0.id, "minecraft:short_grass");
        assert_eq!(run(BlockDescriptor::new("grass"), 1300, 2105).0.id, "minecraft:short_grass");
    }

    #[test]
    fn ambiguous_read_emits_placeholder() {
        let desc = BlockDescriptor {
            data: Some(-1),
            read: true,
            ..BlockDescriptor::new("minecraft:red_bed")
        };
        let (out, diags) = run(desc, 1202, 2105);
        assert_eq!(out.id, "#mapshift:legacy/bed");
        assert_eq!(diags, 1);

        let wool = BlockDescriptor {
            data: Some(-1),
            read: true,
            ..BlockDescriptor::new("wool")
        };
        assert_eq!(run(wool, 1202, 2105).0.id, "#mapshift:legacy/wool");
    }

    #[test]
    fn any_data_on_single_id_block_drops_states() {
        let desc = BlockDescriptor {
            data: Some(-1),
            read: true,
            ..BlockDescriptor::new("oak_stairs")
        };
        assert_eq!(run(desc, 1202, 2105).0.render(), "minecraft:oak_stairs");
    }

    #[test]
    fn block_entity_data_picks_irregular_ids() {
        let mut bed = BlockDescriptor::parse("bed{color:11}").unwrap();
        bed.data = Some(0);
        assert_eq!(run(bed, 1202, 1300).0.id, "minecraft:blue_bed");

        let banner = BlockDescriptor::parse("standing_banner{Base:1}").unwrap();
        assert_eq!(run(banner, 1202, 1300).0.id, "minecraft:red_banner");

        let mut skull = BlockDescriptor::parse("skull{SkullType:3b,Owner:{Name:\"a\"}}").unwrap();
        skull.data = Some(3);
        let (out, _) = run(skull, 1202, 1300);
        assert_eq!(out.render(), r#"minecraft:player_wall_head[facing=south]{Owner:{Name:"a"}}"#);

        let pot = BlockDescriptor::parse(r#"flower_pot{Item:"minecraft:red_flower",Data:2}"#).unwrap();
        assert_eq!(run(pot, 1202, 1300).0.render(), "minecraft:potted_allium");
    }

    #[test]
    fn cauldron_splits_by_level() {
        let full = BlockDescriptor::parse("minecraft:cauldron[level=2]").unwrap();
        assert_eq!(run(full, 1300, 1700).0.render(), "minecraft:water_cauldron[level=2]");
        let empty = BlockDescriptor::parse("minecraft:cauldron[level=0]").unwrap();
        assert_eq!(run(empty, 1300, 1700).0.render(), "minecraft:cauldron");
    }

    #[test]
    fn modern_ids_are_left_alone() {
        let desc = BlockDescriptor::parse("minecraft:oak_log[axis=x]").unwrap();
        assert_eq!(run(desc.clone(), 2004, 2105).0, desc);
        let tag = BlockDescriptor::new("#minecraft:logs");
        assert_eq!(run(tag.clone(), 1202, 2105).0, tag);
    }

    #[test]
    fn every_numeric_name_is_known() {
        for (i, name) in TABLES.numeric.iter().enumerate() {
            assert!(
                name.is_empty() || !name.contains(':'),
                "numeric id {i} has a namespaced name"
            );
        }
        assert_eq!(numeric_name(35), Some("wool"));
        assert_eq!(numeric_name(253), None);
        assert_eq!(TABLES.numeric.len(), 256);
    }
}
