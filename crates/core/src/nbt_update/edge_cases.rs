//! Hand-written NBT rules.
//!
//! Each rule runs with the parent compound in scope and may read, move or
//! remove siblings of the key it is attached to. A rule attached to a list
//! element sees the element under the empty key.

use super::{Flow, Scope, apply_rules, update};
use crate::context::Ctx;
use crate::item_components;
use crate::remap::blocks::{self, BlockDescriptor};
use crate::remap::items::{self, ItemDescriptor};
use crate::remap::{entities, ids, namespaced, strip_namespace};
use crate::text;
use mapshift_guides::{NbtEdgeCase, TagRule, Version};
use mapshift_nbt::{Compound, Tag, rename_key};

const DEFAULT_DROP_CHANCE: f64 = 0.085;
const HAND_SLOTS: [&str; 2] = ["mainhand", "offhand"];
const ARMOR_SLOTS: [&str; 4] = ["feet", "legs", "chest", "head"];
const SIGN_LINES: [&str; 4] = ["Text1", "Text2", "Text3", "Text4"];

pub(super) fn run(
    case: NbtEdgeCase,
    compound: &mut Compound,
    key: &str,
    scope: &Scope<'_>,
    ctx: &mut Ctx<'_>,
) -> Flow {
    match case {
        NbtEdgeCase::Riding => return riding(compound, key),
        NbtEdgeCase::LegacyEquipment => legacy_equipment(compound, key, scope, ctx),
        NbtEdgeCase::DropChances => drop_chances(compound, key, scope, ctx),
        NbtEdgeCase::Equipment => equipment(compound, scope, ctx),
        NbtEdgeCase::Uuid => uuid(compound, key),
        NbtEdgeCase::EntityId => entity_id(compound, key, scope, ctx),
        NbtEdgeCase::BlockEntityId => block_entity_id(compound, key, ctx),
        NbtEdgeCase::ItemStack => item_stack(compound, key, scope, ctx),
        NbtEdgeCase::TextComponent => text_component(compound, key, 1202, ctx),
        NbtEdgeCase::Lore => lore(compound, key, ctx),
        NbtEdgeCase::SignText => sign_text(compound, ctx),
        NbtEdgeCase::SpawnData => spawn_data(compound, key, scope, ctx),
        NbtEdgeCase::SpawnPotentials => spawn_potentials(compound, key, scope, ctx),
        NbtEdgeCase::FallingBlock => falling_block(compound, ctx),
        NbtEdgeCase::VillagerData => villager_data(compound),
        NbtEdgeCase::BannerPatterns => banner_patterns(compound, key, ctx),
    }
    Flow::Continue
}

fn empty() -> Tag {
    Tag::Compound(Compound::new())
}

/// Run the rules of a key created by an edge case, skipping those whose
/// `max` is at or below `after`.
fn follow(compound: &mut Compound, key: &str, after: u16, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    let rules: Vec<TagRule> = scope
        .guide
        .rules(key)
        .iter()
        .filter(|r| r.gate.sort_key() > after)
        .cloned()
        .collect();
    apply_rules(compound, key, &rules, scope, ctx);
}

/// `{A.., Riding:{B..}}` becomes `{B.., Passengers:[{A..}]}`. The caller
/// restarts on the new root, which inverts the rest of the chain.
fn riding(compound: &mut Compound, key: &str) -> Flow {
    let Some(Tag::Compound(mut mount)) = compound.shift_remove(key) else {
        return Flow::Continue;
    };
    let rider = Tag::Compound(std::mem::take(compound));
    match mount.get_mut("Passengers") {
        Some(Tag::List(passengers)) => passengers.push(rider),
        _ => {
            mount.insert("Passengers".into(), Tag::List(vec![rider]));
        }
    }
    *compound = mount;
    Flow::Restart
}

fn padded(items: impl Iterator<Item = Tag>, len: usize, fill: impl Fn() -> Tag) -> Vec<Tag> {
    let mut out: Vec<Tag> = items.take(len).collect();
    while out.len() < len {
        out.push(fill());
    }
    out
}

/// 1.8 `Equipment` is `[hand, feet, legs, chest, head]`.
fn legacy_equipment(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    let Some(Tag::List(slots)) = compound.shift_remove(key) else {
        return;
    };
    let mut slots = slots.into_iter();
    let hand = slots.next().unwrap_or_else(empty);
    compound.insert("HandItems".into(), Tag::List(vec![hand, empty()]));
    compound.insert("ArmorItems".into(), Tag::List(padded(slots, 4, empty)));
    follow(compound, "HandItems", 802, scope, ctx);
    follow(compound, "ArmorItems", 802, scope, ctx);
}

fn drop_chances(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    if key == "DropChances" {
        if !ctx.crosses(802) {
            return;
        }
        let Some(Tag::List(chances)) = compound.shift_remove(key) else {
            return;
        };
        let default = || Tag::float(DEFAULT_DROP_CHANCE);
        let mut chances = chances.into_iter();
        let hand = chances.next().unwrap_or_else(default);
        compound.insert("HandDropChances".into(), Tag::List(vec![hand, default()]));
        compound.insert("ArmorDropChances".into(), Tag::List(padded(chances, 4, default)));
        follow(compound, "HandDropChances", 802, scope, ctx);
        follow(compound, "ArmorDropChances", 802, scope, ctx);
        return;
    }
    if !ctx.crosses(2104) {
        return;
    }
    let mut folded = match compound.shift_remove("drop_chances") {
        Some(Tag::Compound(c)) => c,
        _ => Compound::new(),
    };
    let mut keep = |slot: &str, chance: Option<f64>| {
        if let Some(chance) = chance
            && (chance - DEFAULT_DROP_CHANCE).abs() > 1e-6
        {
            folded.insert(slot.to_string(), Tag::float(chance));
        }
    };
    for (field, slots) in [("HandDropChances", &HAND_SLOTS[..]), ("ArmorDropChances", &ARMOR_SLOTS[..])] {
        if let Some(Tag::List(values)) = compound.shift_remove(field) {
            for (slot, value) in slots.iter().zip(values) {
                keep(slot, value.as_f64());
            }
        }
    }
    keep(
        "body",
        compound.shift_remove("body_armor_drop_chance").and_then(|t| t.as_f64()),
    );
    if !folded.is_empty() {
        compound.insert("drop_chances".into(), Tag::Compound(folded));
    }
}

/// Hand, armor, body and saddle slots fold into `equipment` at 1.21.5.
fn equipment(compound: &mut Compound, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    if !ctx.crosses(2104) {
        return;
    }
    let mut folded = match compound.shift_remove("equipment") {
        Some(Tag::Compound(c)) => c,
        _ => Compound::new(),
    };
    let mut put = |slot: &str, item: Tag, ctx: &mut Ctx<'_>| {
        let Tag::Compound(stack) = item else { return };
        if stack.is_empty() {
            return;
        }
        let stack = update_item_stack(stack, scope.read, ctx);
        folded.insert(slot.to_string(), Tag::Compound(stack));
    };
    for (field, slots) in [("HandItems", &HAND_SLOTS[..]), ("ArmorItems", &ARMOR_SLOTS[..])] {
        if let Some(Tag::List(items)) = compound.shift_remove(field) {
            for (slot, item) in slots.iter().zip(items) {
                put(slot, item, ctx);
            }
        }
    }
    for (field, slot) in [("body_armor_item", "body"), ("SaddleItem", "saddle")] {
        if let Some(item) = compound.shift_remove(field) {
            put(slot, item, ctx);
        }
    }
    if compound.shift_remove("Saddle").and_then(|s| s.as_i64()).unwrap_or(0) != 0 {
        let mut saddle = Compound::new();
        saddle.insert("id".into(), Tag::string("minecraft:saddle"));
        folded.insert("saddle".into(), Tag::Compound(saddle));
    }
    if !folded.is_empty() {
        compound.insert("equipment".into(), Tag::Compound(folded));
    }
}

fn uuid_words(most: i64, least: i64) -> Vec<i32> {
    vec![(most >> 32) as i32, most as i32, (least >> 32) as i32, least as i32]
}

/// Parse the hyphenated form, accepting short groups.
fn parse_uuid(text: &str) -> Option<(i64, i64)> {
    let parts: Vec<u64> = text
        .split('-')
        .map(|p| u64::from_str_radix(p, 16).ok())
        .collect::<Option<_>>()?;
    let [a, b, c, d, e] = parts[..] else {
        return None;
    };
    let most = (a << 32) | ((b & 0xffff) << 16) | (c & 0xffff);
    let least = ((d & 0xffff) << 48) | (e & 0xffff_ffff_ffff);
    Some((most as i64, least as i64))
}

/// `XMost`/`XLeast` pairs and hyphenated UUID strings become int arrays.
fn uuid(compound: &mut Compound, key: &str) {
    if let Some(base) = key.strip_suffix("Most").or_else(|| key.strip_suffix("Least")) {
        let (most_key, least_key) = (format!("{base}Most"), format!("{base}Least"));
        let most = compound.get(&most_key).and_then(Tag::as_i64);
        let least = compound.get(&least_key).and_then(Tag::as_i64);
        let (Some(most), Some(least)) = (most, least) else {
            return;
        };
        let index = [&most_key, &least_key]
            .iter()
            .filter_map(|k| compound.get_index_of(k.as_str()))
            .min()
            .unwrap_or(compound.len());
        compound.shift_remove(&most_key);
        compound.shift_remove(&least_key);
        let index = index.min(compound.len());
        compound.shift_insert(index, base.to_string(), Tag::IntArray(uuid_words(most, least)));
        return;
    }
    let Some((most, least)) = compound.get(key).and_then(Tag::as_str).and_then(parse_uuid) else {
        return;
    };
    let name = key.strip_suffix("UUID").filter(|n| !n.is_empty()).unwrap_or(key).to_string();
    compound.insert(key.to_string(), Tag::IntArray(uuid_words(most, least)));
    rename_key(compound, key, &name);
}

fn entity_id(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    let Some(id) = compound.get(key).and_then(Tag::as_str).map(str::to_string) else {
        return;
    };
    let had_profession = compound.contains_key("Profession");
    let mut renamed = entities::rename(&id, Some(&mut *compound), scope.read, ctx);
    if !ctx.target_at_least(1100) && !id.contains(':') {
        renamed = strip_namespace(&renamed).to_string();
    }
    compound.insert(key.to_string(), Tag::String(renamed));
    if !had_profession && compound.contains_key("Profession") {
        follow(compound, "Profession", 0, scope, ctx);
    }
}

fn block_entity_id(compound: &mut Compound, key: &str, ctx: &mut Ctx<'_>) {
    let Some(id) = compound.get(key).and_then(Tag::as_str).map(str::to_string) else {
        return;
    };
    compound.insert(key.to_string(), Tag::String(entities::block_entity_id(&id, ctx)));
}

fn item_stack(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    if let Some(Tag::Compound(stack)) = compound.get_mut(key) {
        let taken = std::mem::take(stack);
        *stack = update_item_stack(taken, scope.read, ctx);
    }
}

/// Migrate an item stack: id and damage, the `tag` compound, and the split
/// into data components at 1.20.5.
pub(crate) fn update_item_stack(mut stack: Compound, read: bool, ctx: &mut Ctx<'_>) -> Compound {
    if stack.is_empty() || stack.values().any(Tag::contains_macro) {
        return stack;
    }
    if stack.contains_key("components") || stack.contains_key("count") {
        if let Some(id) = stack.get("id").and_then(Tag::as_str) {
            let id = items::update(ItemDescriptor { read, ..ItemDescriptor::new(id) }, ctx).id;
            stack.insert("id".into(), Tag::String(id));
        }
        if let Some(Tag::Compound(components)) = stack.get_mut("components") {
            item_components::update(components, ctx);
        }
        return stack;
    }

    let id = match stack.get("id") {
        Some(Tag::String(s)) => s.clone(),
        Some(Tag::Number(n)) => n.as_i64().to_string(),
        _ => return stack,
    };
    let data = if ctx.crosses(802) || ctx.crosses(1202) {
        stack.get("Damage").and_then(Tag::as_i64)
    } else {
        None
    };
    let tag = match stack.shift_remove("tag") {
        Some(Tag::Compound(tag)) => Some(tag),
        _ => None,
    };
    let desc = items::update(
        ItemDescriptor {
            data: data.map(|d| d as i32),
            nbt: tag,
            read,
            ..ItemDescriptor::new(id)
        },
        ctx,
    );
    stack.insert("id".into(), Tag::String(desc.id.clone()));
    if ctx.crosses(1202) {
        stack.shift_remove("Damage");
    } else if let (Some(d), Some(_)) = (desc.data, data) {
        stack.insert("Damage".into(), Tag::short(i64::from(d)));
    }
    if let Some(tag) = desc.nbt {
        let cap = if ctx.crosses(2004) { Version::new(2005) } else { ctx.target };
        let tag = ctx.with_target(cap, |ctx| update(Tag::Compound(tag), "item_tag", &desc.id, read, ctx));
        if tag.as_compound().is_some_and(|c| !c.is_empty()) {
            stack.insert("tag".into(), tag);
        }
    }
    if ctx.crosses(2004) {
        ctx.with_target(Version::new(2005), |ctx| item_components::extract(&mut stack, ctx));
        ctx.with_source(Version::new(2005), |ctx| {
            if let Some(Tag::Compound(components)) = stack.get_mut("components") {
                item_components::update(components, ctx);
            }
        });
    }
    stack
}

fn is_json_text(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(raw),
        Ok(serde_json::Value::Object(_) | serde_json::Value::Array(_) | serde_json::Value::String(_))
    )
}

/// A stored text component: plain text becomes JSON when the migration
/// crosses `plain_until`, the JSON is updated, and it becomes an NBT
/// structure at 1.21.5.
pub(crate) fn text_tag(raw: &str, plain_until: u16, ctx: &mut Ctx<'_>) -> Tag {
    let json = if is_json_text(raw) {
        raw.to_string()
    } else if ctx.crosses(plain_until) {
        text::from_plain(raw)
    } else if ctx.target.code() <= plain_until {
        return Tag::string(raw);
    } else {
        raw.to_string()
    };
    let json = text::update(&json, ctx);
    if ctx.crosses(2104) {
        text::to_tag(&json)
    } else {
        Tag::String(json)
    }
}

fn text_component(compound: &mut Compound, key: &str, plain_until: u16, ctx: &mut Ctx<'_>) {
    let Some(raw) = compound.get(key).and_then(Tag::as_str).map(str::to_string) else {
        return;
    };
    let tag = text_tag(&raw, plain_until, ctx);
    compound.insert(key.to_string(), tag);
}

/// Lore lines were plain text until 1.14.
fn lore(compound: &mut Compound, key: &str, ctx: &mut Ctx<'_>) {
    let Some(Tag::List(lines)) = compound.get(key) else {
        return;
    };
    let lines = lines.clone();
    let lines = lines
        .into_iter()
        .map(|line| match line {
            Tag::String(raw) => text_tag(&raw, 1302, ctx),
            other => other,
        })
        .collect();
    compound.insert(key.to_string(), Tag::list(lines));
}

/// `Text1`..`Text4`, `Color` and `GlowingText` become `front_text` at 1.20.
fn sign_text(compound: &mut Compound, ctx: &mut Ctx<'_>) {
    let mut messages = Vec::with_capacity(SIGN_LINES.len());
    for line in SIGN_LINES {
        let raw = match compound.shift_remove(line) {
            Some(Tag::String(raw)) => raw,
            _ => "\"\"".to_string(),
        };
        messages.push(text_tag(&raw, 1202, ctx));
    }
    let color = compound
        .shift_remove("Color")
        .and_then(|c| c.as_str().map(str::to_string))
        .unwrap_or_else(|| "black".into());
    let glowing = compound.shift_remove("GlowingText").and_then(|g| g.as_i64()).unwrap_or(0);

    let side = |messages: Vec<Tag>, color: &str, glowing: i64| {
        let mut side = Compound::new();
        side.insert("messages".into(), Tag::list(messages));
        side.insert("color".into(), Tag::string(color));
        side.insert("has_glowing_text".into(), Tag::byte(glowing));
        Tag::Compound(side)
    };
    let blank = if ctx.crosses(2104) { Tag::string("") } else { Tag::string("\"\"") };
    compound.insert("front_text".into(), side(messages, &color, glowing));
    if !compound.contains_key("back_text") {
        compound.insert("back_text".into(), side(vec![blank; 4], "black", 0));
    }
}

fn migrate_entity(entity: Compound, read: bool, ctx: &mut Ctx<'_>) -> Compound {
    let id = entity.get("id").and_then(Tag::as_str).unwrap_or_default().to_string();
    match update(Tag::Compound(entity), "entity", &id, read, ctx) {
        Tag::Compound(c) => c,
        _ => Compound::new(),
    }
}

/// A spawner entry: the entity itself before 1.18, `{entity: ...}` after.
fn spawn_entry(mut data: Compound, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Compound {
    if ctx.source.code() > 1701 {
        if let Some(Tag::Compound(entity)) = data.get_mut("entity") {
            let taken = std::mem::take(entity);
            *entity = migrate_entity(taken, scope.read, ctx);
        }
        return data;
    }
    let entity = migrate_entity(data, scope.read, ctx);
    if ctx.crosses(1701) {
        let mut wrapped = Compound::new();
        wrapped.insert("entity".into(), Tag::Compound(entity));
        wrapped
    } else {
        entity
    }
}

/// Spawner `SpawnData`, plus the 1.8 `EntityId` that named its type.
fn spawn_data(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    if key == "EntityId" {
        if compound.contains_key("SpawnData") {
            return;
        }
        let Some(id) = compound.shift_remove("EntityId") else {
            return;
        };
        let mut data = Compound::new();
        data.insert("id".into(), id);
        compound.insert("SpawnData".into(), Tag::Compound(data));
        spawn_data(compound, "SpawnData", scope, ctx);
        return;
    }
    let legacy_id = if ctx.crosses(802) { compound.shift_remove("EntityId") } else { None };
    let Some(Tag::Compound(data)) = compound.get_mut(key) else {
        return;
    };
    let mut data = std::mem::take(data);
    if let Some(id) = legacy_id {
        let mut with_id = Compound::new();
        with_id.insert("id".into(), id);
        for (k, v) in data {
            with_id.entry(k).or_insert(v);
        }
        data = with_id;
    }
    let data = spawn_entry(data, scope, ctx);
    compound.insert(key.to_string(), Tag::Compound(data));
}

fn spawn_potentials(compound: &mut Compound, key: &str, scope: &Scope<'_>, ctx: &mut Ctx<'_>) {
    let Some(Tag::List(entries)) = compound.get(key) else {
        return;
    };
    let entries = entries.clone();
    let entries = entries
        .into_iter()
        .map(|entry| match entry {
            Tag::Compound(c) => Tag::Compound(potential(c, scope, ctx)),
            other => other,
        })
        .collect();
    compound.insert(key.to_string(), Tag::list(entries));
}

/// One weighted spawn: `{Type, Properties, Weight}` (1.8), `{Entity, Weight}`
/// (1.9) or `{data: {entity}, weight}` (1.18).
fn potential(mut entry: Compound, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Compound {
    if ctx.source.code() > 1701 {
        if let Some(Tag::Compound(data)) = entry.get_mut("data") {
            let taken = std::mem::take(data);
            *data = spawn_entry(taken, scope, ctx);
        }
        return entry;
    }
    if ctx.crosses(802) && !entry.contains_key("Entity") {
        let mut entity = Compound::new();
        if let Some(ty) = entry.shift_remove("Type") {
            entity.insert("id".into(), ty);
        }
        if let Some(Tag::Compound(properties)) = entry.shift_remove("Properties") {
            entity.extend(properties);
        }
        entry.insert("Entity".into(), Tag::Compound(entity));
    }
    let entity = match entry.shift_remove("Entity") {
        Some(Tag::Compound(entity)) => entity,
        _ => Compound::new(),
    };
    let entity = migrate_entity(entity, scope.read, ctx);
    let weight = entry.shift_remove("Weight");
    let mut out = Compound::new();
    if ctx.crosses(1701) {
        let mut data = Compound::new();
        data.insert("entity".into(), Tag::Compound(entity));
        out.insert("data".into(), Tag::Compound(data));
        if let Some(weight) = weight {
            out.insert("weight".into(), weight);
        }
    } else {
        out.insert("Entity".into(), Tag::Compound(entity));
        if let Some(weight) = weight {
            out.insert("Weight".into(), weight);
        }
    }
    out.extend(entry);
    out
}

/// Falling block `Block`/`TileID`/`Tile` and `Data` become `BlockState`.
fn falling_block(compound: &mut Compound, ctx: &mut Ctx<'_>) {
    if !ctx.crosses(1202) {
        return;
    }
    let id = ["Block", "TileID", "Tile"].iter().find_map(|k| match compound.get(*k) {
        Some(Tag::String(s)) => Some(s.clone()),
        Some(Tag::Number(n)) if *k == "Tile" => Some((n.as_i64() & 0xff).to_string()),
        Some(Tag::Number(n)) => Some(n.as_i64().to_string()),
        _ => None,
    });
    let data = compound.get("Data").and_then(Tag::as_i64).unwrap_or(0);
    for k in ["Block", "TileID", "Tile", "Data"] {
        compound.shift_remove(k);
    }
    let Some(id) = id else {
        return;
    };
    let desc = blocks::update(
        BlockDescriptor {
            data: Some(data as i32),
            ..BlockDescriptor::new(id)
        },
        ctx,
    );
    let mut state = Compound::new();
    state.insert("Name".into(), Tag::String(desc.id));
    if !desc.states.is_empty() {
        let properties = desc
            .states
            .into_iter()
            .map(|(k, v)| (k, Tag::String(v)))
            .collect::<Compound>();
        state.insert("Properties".into(), Tag::Compound(properties));
    }
    compound.insert("BlockState".into(), Tag::Compound(state));
}

/// `Profession`/`Career`/`CareerLevel` become `VillagerData` at 1.14.
fn villager_data(compound: &mut Compound) {
    let Some(profession) = compound.get("Profession").and_then(Tag::as_i64) else {
        return;
    };
    compound.shift_remove("Profession");
    let career = compound.shift_remove("Career").and_then(|c| c.as_i64()).unwrap_or(0);
    let level = compound.shift_remove("CareerLevel").and_then(|l| l.as_i64()).unwrap_or(1);
    let mut data = Compound::new();
    data.insert("profession".into(), Tag::String(ids::profession(profession, career)));
    data.insert("level".into(), Tag::int(level.max(1)));
    data.insert("type".into(), Tag::string("minecraft:plains"));
    compound.insert("VillagerData".into(), Tag::Compound(data));
}

/// Banner colors were inverted at 1.13; patterns became named entries at
/// 1.20.5.
fn banner_patterns(compound: &mut Compound, key: &str, ctx: &mut Ctx<'_>) {
    let Some(Tag::List(patterns)) = compound.get(key) else {
        return;
    };
    let invert = ctx.crosses(1202);
    let named = ctx.crosses(2004);
    if !invert && !named {
        return;
    }
    let patterns = patterns
        .iter()
        .cloned()
        .map(|pattern| {
            let Tag::Compound(mut pattern) = pattern else {
                return pattern;
            };
            if invert && let Some(color) = pattern.get("Color").and_then(Tag::as_i64) {
                pattern.insert("Color".into(), Tag::int(15 - color));
            }
            if !named {
                return Tag::Compound(pattern);
            }
            let mut out = Compound::new();
            if let Some(code) = pattern.get("Pattern").and_then(Tag::as_str) {
                let id = ids::banner_pattern(code).unwrap_or_else(|| namespaced(code));
                out.insert("pattern".into(), Tag::String(id));
            }
            let color = pattern.get("Color").and_then(Tag::as_i64).unwrap_or(0);
            out.insert("color".into(), Tag::String(ids::color(&color.to_string())));
            Tag::Compound(out)
        })
        .collect();
    compound.insert(key.to_string(), Tag::list(patterns));
    if named {
        rename_key(compound, key, "patterns");
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Ctx;
    use crate::engine::Engine;
    use crate::nbt_update::update_snbt;
    use mapshift_guides::Version;

    fn migrate(snbt: &str, context: &str, object_id: &str, source: u16, target: u16) -> String {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        update_snbt(snbt, context, object_id, false, &mut ctx)
    }

    #[test]
    fn legacy_equipment_splits_into_hand_and_armor() {
        let out = migrate(r#"{Equipment:[{id:"minecraft:stone"},{},{},{},{id:"minecraft:diamond_helmet"}]}"#, "entity", "", 800, 900);
        assert_eq!(
            out,
            r#"{HandItems:[{id:"minecraft:stone"},{}],ArmorItems:[{},{},{},{id:"minecraft:diamond_helmet"}]}"#
        );
    }

    #[test]
    fn drop_chances_fold_without_defaults() {
        let out = migrate(
            "{HandDropChances:[2.0f,0.085f],ArmorDropChances:[0.085f,0.085f,0.085f,0.5f]}",
            "entity",
            "",
            2104,
            2105,
        );
        assert_eq!(out, "{drop_chances:{mainhand:2f,head:0.5f}}");
    }

    #[test]
    fn equipment_folds_and_drops_empty_slots() {
        let out = migrate(
            r#"{HandItems:[{id:"minecraft:stone",count:1},{}],ArmorItems:[{},{},{},{}]}"#,
            "entity",
            "",
            2104,
            2105,
        );
        assert_eq!(out, r#"{equipment:{mainhand:{id:"minecraft:stone",count:1}}}"#);
    }

    #[test]
    fn uuid_pairs_become_int_arrays() {
        let out = migrate("{UUIDMost:1L,UUIDLeast:-1L,NoAI:1b}", "entity", "", 1502, 1600);
        assert_eq!(out, "{UUID:[I;0,1,-1,-1],NoAI:1b}");
        let out = migrate(r#"{OwnerUUID:"00000000-0000-0001-0000-000000000002"}"#, "entity", "", 1502, 1600);
        assert_eq!(out, "{Owner:[I;0,1,0,2]}");
    }

    #[test]
    fn custom_names_become_json_then_nbt() {
        assert_eq!(migrate(r#"{CustomName:"Bob"}"#, "entity", "", 1202, 1300), r#"{CustomName:"\"Bob\""}"#);
        assert_eq!(migrate(r#"{CustomName:"Bob"}"#, "entity", "", 1202, 2105), r#"{CustomName:"Bob"}"#);
        assert_eq!(
            migrate(r#"{CustomName:'{"text":"Bob","bold":true}'}"#, "entity", "", 2004, 2105),
            r#"{CustomName:{text:"Bob",bold:1b}}"#
        );
    }

    #[test]
    fn sign_lines_fold_into_front_text() {
        let out = migrate(
            r#"{Text1:'"a"',Text2:'""',Text3:'""',Text4:'""',Color:"red",GlowingText:1b}"#,
            "block",
            "minecraft:oak_sign",
            1904,
            2000,
        );
        assert!(
            out.starts_with(r#"{front_text:{messages:["\"a\"","\"\"","\"\"","\"\""],color:"red",has_glowing_text:1b},back_text:"#),
            "{out}"
        );
    }

    #[test]
    fn spawn_data_is_wrapped_and_migrated() {
        let out = migrate(r#"{SpawnData:{id:"minecraft:zombie"}}"#, "block", "minecraft:spawner", 1605, 1800);
        assert_eq!(out, r#"{SpawnData:{entity:{id:"minecraft:zombie"}}}"#);
        let out = migrate(r#"{EntityId:"Zombie",Delay:20s}"#, "block", "minecraft:mob_spawner", 800, 1100);
        assert_eq!(out, r#"{Delay:20s,SpawnData:{id:"minecraft:zombie"}}"#);
    }

    #[test]
    fn spawn_potentials_take_the_1_18_shape() {
        let out = migrate(
            r#"{SpawnPotentials:[{Entity:{id:"minecraft:pig"},Weight:3}]}"#,
            "block",
            "minecraft:spawner",
            1605,
            1800,
        );
        assert_eq!(out, r#"{SpawnPotentials:[{data:{entity:{id:"minecraft:pig"}},weight:3}]}"#);
    }

    #[test]
    fn falling_block_gets_a_block_state() {
        let out = migrate(r#"{id:"minecraft:falling_block",Block:"minecraft:wool",Data:14b,Time:1}"#, "entity", "", 1202, 1300);
        assert_eq!(out, r#"{id:"minecraft:falling_block",Time:1,BlockState:{Name:"minecraft:red_wool"}}"#);
    }

    #[test]
    fn villager_careers_become_villager_data() {
        let out = migrate(r#"{id:"minecraft:villager",Profession:0,Career:2,CareerLevel:3}"#, "entity", "", 1300, 1400);
        assert_eq!(
            out,
            r#"{id:"minecraft:villager",VillagerData:{profession:"minecraft:fisherman",level:3,type:"minecraft:plains"}}"#
        );
    }

    #[test]
    fn banner_colors_invert_then_patterns_are_named() {
        assert_eq!(
            migrate(r#"{Patterns:[{Pattern:"cr",Color:1}]}"#, "block", "minecraft:banner", 1202, 1300),
            r#"{Patterns:[{Pattern:"cr",Color:14}]}"#
        );
        assert_eq!(
            migrate(r#"{Patterns:[{Pattern:"cr",Color:14}]}"#, "block", "minecraft:red_banner", 2004, 2005),
            r#"{patterns:[{pattern:"minecraft:cross",color:"red"}]}"#
        );
    }
}
