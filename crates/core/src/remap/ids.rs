//! Small identifier families.

use super::{
    DYE_COLORS, Renames, blocks, cascade, entities, items, load_table, namespaced, snake_case, sorted,
    strip_namespace,
};
use crate::context::Ctx;
use crate::remap::blocks::BlockDescriptor;
use crate::remap::items::ItemDescriptor;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use mapshift_guides::Version;
use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
struct IdTables {
    effects: Vec<String>,
    enchantments: IndexMap<String, String>,
    enchantment_renames: Vec<Renames>,
    potions: PotionTable,
    professions: Vec<Vec<String>>,
    gamemodes: IndexMap<String, String>,
    difficulties: IndexMap<String, String>,
    stat_types: IndexMap<String, String>,
    custom_stats: IndexMap<String, String>,
    custom_stat_renames: Vec<Renames>,
    slot_renames: Vec<Renames>,
    banner_patterns: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PotionTable {
    effects: Vec<String>,
    strong: Vec<String>,
    long: Vec<String>,
    bases: IndexMap<String, String>,
}

static TABLES: LazyLock<IdTables> = LazyLock::new(|| {
    let mut tables: IdTables = load_table("ids.jsonc", include_str!("../../data/ids.jsonc"));
    tables.enchantment_renames = sorted(std::mem::take(&mut tables.enchantment_renames));
    tables.custom_stat_renames = sorted(std::mem::take(&mut tables.custom_stat_renames));
    tables.slot_renames = sorted(std::mem::take(&mut tables.slot_renames));
    tables
});

fn unknown(ctx: &mut Ctx<'_>, kind: &str, value: &str) -> String {
    ctx.diag(codes::UNKNOWN_LEGACY_ID, format!("unknown {kind} {value}; kept as is"));
    value.to_string()
}

/// Status effect id from a numeric id or a name.
pub fn effect(value: &str, ctx: &mut Ctx<'_>) -> String {
    match value.parse::<i64>() {
        Ok(n) => match usize::try_from(n - 1).ok().and_then(|i| TABLES.effects.get(i)) {
            Some(name) => namespaced(name),
            None => unknown(ctx, "effect id", value),
        },
        Err(_) => namespaced(&value.to_ascii_lowercase()),
    }
}

/// Numeric id of a named status effect, for NBT written before 1.20.5.
pub fn effect_number(name: &str) -> Option<i64> {
    let name = strip_namespace(name);
    TABLES.effects.iter().position(|e| e == name).map(|i| i as i64 + 1)
}

/// Enchantment id from a numeric id or a name.
pub fn enchantment(value: &str, ctx: &mut Ctx<'_>) -> String {
    let name = match value.parse::<i64>() {
        Ok(_) => match TABLES.enchantments.get(value) {
            Some(name) => name.clone(),
            None => return unknown(ctx, "enchantment id", value),
        },
        Err(_) => {
            if value.contains(':') && !value.starts_with("minecraft:") {
                return value.to_string();
            }
            strip_namespace(value).to_ascii_lowercase()
        }
    };
    namespaced(&cascade(&name, &TABLES.enchantment_renames, ctx))
}

/// Potion type of a pre-1.9 potion damage value, and whether it was a
/// splash potion.
pub fn legacy_potion(damage: i64) -> (String, bool) {
    let table = &TABLES.potions;
    let splash = damage & 0x4000 != 0;
    let effect = table.effects[(damage & 15) as usize].as_str();
    let name = if effect.is_empty() {
        table
            .bases
            .get(&(damage & 0x3fff).to_string())
            .cloned()
            .unwrap_or_else(|| "water".into())
    } else if damage & 32 != 0 && table.strong.iter().any(|s| s == effect) {
        format!("strong_{effect}")
    } else if damage & 64 != 0 && table.long.iter().any(|l| l == effect) {
        format!("long_{effect}")
    } else {
        effect.to_string()
    };
    (namespaced(&name), splash)
}

/// Potion type from a legacy damage value or a name.
pub fn potion(value: &str, ctx: &mut Ctx<'_>) -> String {
    match value.parse::<i64>() {
        Ok(damage) if ctx.crosses(802) => legacy_potion(damage).0,
        Ok(_) => unknown(ctx, "potion", value),
        Err(_) => namespaced(value),
    }
}

/// Dye color name of a numeric color, or the modern name of a color name.
pub fn color(value: &str) -> String {
    match value.parse::<usize>() {
        Ok(n) => DYE_COLORS.get(n & 15).unwrap_or(&DYE_COLORS[0]).to_string(),
        Err(_) if value == "silver" => "light_gray".into(),
        Err(_) => value.to_string(),
    }
}

/// Banner pattern id of a legacy pattern code.
pub fn banner_pattern(code: &str) -> Option<String> {
    TABLES.banner_patterns.get(code).map(|p| namespaced(p))
}

/// Painting variant id of a legacy `Motive`.
pub fn painting(value: &str) -> String {
    if value.contains(':') {
        return value.to_string();
    }
    namespaced(&snake_case(value))
}

/// 1.14 profession of a legacy `Profession`/`Career` pair.
pub fn profession(profession: i64, career: i64) -> String {
    let Some(careers) = usize::try_from(profession).ok().and_then(|p| TABLES.professions.get(p)) else {
        return namespaced("none");
    };
    let index = usize::try_from(career - 1).unwrap_or(0);
    namespaced(careers.get(index).unwrap_or(&careers[0]))
}

/// Game mode name from a numeric id, abbreviation or name.
pub fn gamemode(value: &str, ctx: &mut Ctx<'_>) -> String {
    if !ctx.crosses(1202) {
        return value.to_string();
    }
    match TABLES.gamemodes.get(&value.to_ascii_lowercase()) {
        Some(name) => name.clone(),
        None => unknown(ctx, "game mode", value),
    }
}

/// Difficulty name from a numeric id, abbreviation or name.
pub fn difficulty(value: &str, ctx: &mut Ctx<'_>) -> String {
    if !ctx.crosses(1202) {
        return value.to_string();
    }
    match TABLES.difficulties.get(&value.to_ascii_lowercase()) {
        Some(name) => name.clone(),
        None => unknown(ctx, "difficulty", value),
    }
}

/// Scoreboard objective criteria.
///
/// `stat.*` criteria become `minecraft.<type>:<namespace>.<id>` at 1.13; the
/// object of a typed statistic then follows its block, item or entity
/// renames.
pub fn criteria(value: &str, ctx: &mut Ctx<'_>) -> String {
    let mut value = value.to_string();
    if ctx.crosses(1202)
        && let Some(rest) = value.strip_prefix("stat.")
    {
        value = match legacy_stat(rest) {
            Some(modern) => modern,
            None => return unknown(ctx, "statistic", &value),
        };
    }
    let Some((kind, object)) = value.split_once(':') else {
        return value;
    };
    let Some(kind) = kind.strip_prefix("minecraft.") else {
        return value;
    };
    let id = object.replacen('.', ":", 1);
    let modern = Version::new(ctx.source.code().max(1300));
    let id = ctx.with_source(modern, |ctx| match kind {
        "mined" => blocks::update(BlockDescriptor::new(id), ctx).id,
        "used" | "crafted" | "broken" | "picked_up" | "dropped" => items::update(ItemDescriptor::new(id), ctx).id,
        "killed" | "killed_by" => entities::rename(&id, None, false, ctx),
        "custom" => namespaced(&cascade(strip_namespace(&id), &TABLES.custom_stat_renames, ctx)),
        _ => id,
    });
    format!("minecraft.{kind}:{}", id.replacen(':', ".", 1))
}

fn legacy_stat(rest: &str) -> Option<String> {
    if let Some((kind, object)) = rest.split_once('.') {
        let modern = TABLES.stat_types.get(kind)?;
        let object = object.strip_prefix("minecraft.").unwrap_or(object);
        let id = match modern.as_str() {
            "mined" => blocks::flatten_id(object, 0)?,
            "killed" | "killed_by" => entities::flattening_name(object),
            _ => items::flatten_name(object),
        };
        return Some(format!("minecraft.{modern}:minecraft.{id}"));
    }
    let name = TABLES
        .custom_stats
        .get(rest)
        .cloned()
        .unwrap_or_else(|| snake_case(rest));
    Some(format!("minecraft.custom:minecraft.{name}"))
}

/// Inventory slot name.
pub fn slot(value: &str, ctx: &mut Ctx<'_>) -> String {
    let value = if ctx.crosses(1202) {
        value.strip_prefix("slot.").unwrap_or(value)
    } else {
        value
    };
    cascade(value, &TABLES.slot_renames, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn with_ctx<T>(source: u16, target: u16, f: impl FnOnce(&mut Ctx<'_>) -> T) -> T {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        f(&mut ctx)
    }

    #[test]
    fn numeric_effects_and_enchantments() {
        with_ctx(1202, 1300, |ctx| {
            assert_eq!(effect("1", ctx), "minecraft:speed");
            assert_eq!(effect("minecraft:speed", ctx), "minecraft:speed");
            assert_eq!(enchantment("16", ctx), "minecraft:sharpness");
            assert_eq!(enchantment("22", ctx), "minecraft:sweeping");
            assert_eq!(effect("99", ctx), "99");
            assert_eq!(ctx.diagnostics.len(), 1);
        });
        with_ctx(1202, 2105, |ctx| assert_eq!(enchantment("22", ctx), "minecraft:sweeping_edge"));
        assert_eq!(effect_number("minecraft:glowing"), Some(24));
    }

    #[test]
    fn legacy_potion_bits() {
        assert_eq!(legacy_potion(8194), ("minecraft:swiftness".into(), false));
        assert_eq!(legacy_potion(8226), ("minecraft:strong_swiftness".into(), false));
        assert_eq!(legacy_potion(8258), ("minecraft:long_swiftness".into(), false));
        assert_eq!(legacy_potion(16460), ("minecraft:harming".into(), true));
        assert_eq!(legacy_potion(16), ("minecraft:awkward".into(), false));
        assert_eq!(legacy_potion(0), ("minecraft:water".into(), false));
    }

    #[test]
    fn small_families() {
        assert_eq!(color("14"), "red");
        assert_eq!(color("silver"), "light_gray");
        assert_eq!(banner_pattern("cre").as_deref(), Some("minecraft:creeper"));
        assert_eq!(painting("BurningSkull"), "minecraft:burning_skull");
        assert_eq!(profession(3, 2), "minecraft:weaponsmith");
        assert_eq!(profession(1, 0), "minecraft:librarian");
        with_ctx(1202, 1300, |ctx| {
            assert_eq!(gamemode("1", ctx), "creative");
            assert_eq!(gamemode("sp", ctx), "spectator");
            assert_eq!(difficulty("h", ctx), "hard");
            assert_eq!(slot("slot.weapon.offhand", ctx), "weapon.offhand");
        });
        with_ctx(2004, 2105, |ctx| assert_eq!(slot("horse.armor", ctx), "armor.body"));
    }

    #[test]
    fn statistics_criteria() {
        with_ctx(1202, 1300, |ctx| {
            assert_eq!(criteria("stat.killEntity.Zombie", ctx), "minecraft.killed:minecraft.zombie");
            assert_eq!(criteria("stat.mineBlock.minecraft.log", ctx), "minecraft.mined:minecraft.oak_log");
            assert_eq!(criteria("stat.useItem.minecraft.reeds", ctx), "minecraft.used:minecraft.sugar_cane");
            assert_eq!(criteria("stat.chestOpened", ctx), "minecraft.custom:minecraft.open_chest");
            assert_eq!(criteria("stat.walkOneCm", ctx), "minecraft.custom:minecraft.walk_one_cm");
            assert_eq!(criteria("dummy", ctx), "dummy");
        });
        with_ctx(1202, 2105, |ctx| {
            assert_eq!(criteria("stat.playOneMinute", ctx), "minecraft.custom:minecraft.play_time");
            assert_eq!(criteria("stat.mineBlock.minecraft.grass", ctx), "minecraft.mined:minecraft.grass_block");
            assert_eq!(criteria("stat.killEntity.PigZombie", ctx), "minecraft.killed:minecraft.zombified_piglin");
        });
        with_ctx(1300, 2105, |ctx| {
            assert_eq!(criteria("minecraft.mined:minecraft.grass", ctx), "minecraft.mined:minecraft.short_grass");
        });
    }
}
