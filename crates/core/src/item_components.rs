//! Item data components.
//!
//! 1.20.5 replaced the free-form item `tag` with typed components. This
//! module splits a migrated tag into components, applies the component
//! changes of later releases, and converts between the NBT and command
//! argument (`id[name=value,...]`) forms.

use crate::context::Ctx;
use crate::nbt_update::update_item_stack;
use crate::remap::{ids, misc, namespaced, snake_case, strip_namespace};
use crate::text;
use crate::tokenize::tokenize;
use mapshift_nbt::{Compound, Tag, pack, unpack};

// HideFlags bits.
const HIDE_ENCHANTMENTS: i64 = 1;
const HIDE_MODIFIERS: i64 = 2;
const HIDE_UNBREAKABLE: i64 = 4;
const HIDE_CAN_BREAK: i64 = 8;
const HIDE_CAN_PLACE_ON: i64 = 16;
const HIDE_ADDITIONAL: i64 = 32;
const HIDE_DYE: i64 = 64;
const HIDE_TRIM: i64 = 128;

/// Components whose tooltip lines `hide_additional_tooltip` covered.
const ADDITIONAL_TOOLTIP: [&str; 16] = [
    "banner_patterns",
    "bees",
    "block_entity_data",
    "block_state",
    "bundle_contents",
    "charged_projectiles",
    "container",
    "container_loot",
    "firework_explosion",
    "fireworks",
    "instrument",
    "map_id",
    "pot_decorations",
    "potion_contents",
    "stored_enchantments",
    "written_book_content",
];

/// Components that carried `show_in_tooltip` before 1.21.5.
const TOOLTIP_FLAGGED: [&str; 9] = [
    "enchantments",
    "stored_enchantments",
    "unbreakable",
    "dyed_color",
    "trim",
    "attribute_modifiers",
    "can_break",
    "can_place_on",
    "jukebox_playable",
];

const FIREWORK_SHAPES: [&str; 5] = ["small_ball", "large_ball", "star", "creeper", "burst"];

fn key(name: &str) -> String {
    format!("minecraft:{name}")
}

/// Split `{id, Count, tag}` into `{id, count, components}`. A count of one
/// is left implicit.
pub(crate) fn extract(stack: &mut Compound, ctx: &mut Ctx<'_>) {
    let id = stack.get("id").and_then(Tag::as_str).unwrap_or_default().to_string();
    let count = stack.shift_remove("Count").and_then(|c| c.as_i64()).unwrap_or(1);
    let tag = match stack.shift_remove("tag") {
        Some(Tag::Compound(tag)) => tag,
        _ => Compound::new(),
    };
    let components = from_tag(&id, tag, ctx);

    let mut out = Compound::new();
    out.insert("id".into(), Tag::String(id));
    if count != 1 {
        out.insert("count".into(), Tag::int(count));
    }
    if !components.is_empty() {
        out.insert("components".into(), Tag::Compound(components));
    }
    for (k, v) in std::mem::take(stack) {
        out.entry(k).or_insert(v);
    }
    *stack = out;
}

/// Components of a 1.20.4 item tag. Keys with no component land in
/// `custom_data`.
pub(crate) fn from_tag(item_id: &str, mut tag: Compound, ctx: &mut Ctx<'_>) -> Compound {
    let mut out = Compound::new();
    let hide = tag.shift_remove("HideFlags").and_then(|h| h.as_i64()).unwrap_or(0);
    let hidden = |bit: i64| hide & bit != 0;
    let tooltip = |mut c: Compound, bit: i64| {
        if hidden(bit) {
            c.insert("show_in_tooltip".into(), Tag::byte(0));
        }
        Tag::Compound(c)
    };

    if let Some(damage) = tag.shift_remove("Damage").and_then(|d| d.as_i64())
        && damage != 0
    {
        out.insert(key("damage"), Tag::int(damage));
    }
    if tag.shift_remove("Unbreakable").and_then(|u| u.as_i64()).unwrap_or(0) != 0 {
        out.insert(key("unbreakable"), tooltip(Compound::new(), HIDE_UNBREAKABLE));
    }
    if let Some(Tag::List(list)) = tag.shift_remove("Enchantments") {
        let levels = levels(&list);
        if levels.is_empty() {
            out.insert(key("enchantment_glint_override"), Tag::byte(1));
        } else {
            let mut c = Compound::new();
            c.insert("levels".into(), Tag::Compound(levels));
            out.insert(key("enchantments"), tooltip(c, HIDE_ENCHANTMENTS));
        }
    }
    if let Some(Tag::List(list)) = tag.shift_remove("StoredEnchantments") {
        let mut c = Compound::new();
        c.insert("levels".into(), Tag::Compound(levels(&list)));
        out.insert(key("stored_enchantments"), tooltip(c, HIDE_ADDITIONAL));
    }
    if let Some(Tag::Compound(mut display)) = tag.shift_remove("display") {
        if let Some(name) = display.shift_remove("Name") {
            out.insert(key("custom_name"), name);
        }
        if let Some(lore) = display.shift_remove("Lore") {
            out.insert(key("lore"), lore);
        }
        if let Some(rgb) = display.shift_remove("color") {
            let mut c = Compound::new();
            c.insert("rgb".into(), rgb);
            out.insert(key("dyed_color"), tooltip(c, HIDE_DYE));
        }
        if let Some(color) = display.shift_remove("MapColor") {
            out.insert(key("map_color"), color);
        }
        if !display.is_empty() {
            tag.insert("display".into(), Tag::Compound(display));
        }
    }
    if let Some(data) = tag.shift_remove("CustomModelData") {
        out.insert(key("custom_model_data"), data);
    }
    if let Some(cost) = tag.shift_remove("RepairCost").and_then(|c| c.as_i64())
        && cost != 0
    {
        out.insert(key("repair_cost"), Tag::int(cost));
    }
    for (field, component, bit) in [
        ("CanDestroy", "can_break", HIDE_CAN_BREAK),
        ("CanPlaceOn", "can_place_on", HIDE_CAN_PLACE_ON),
    ] {
        if let Some(Tag::List(blocks)) = tag.shift_remove(field) {
            let predicates = blocks
                .iter()
                .filter_map(Tag::as_str)
                .map(|b| {
                    let mut p = Compound::new();
                    p.insert("blocks".into(), Tag::string(b));
                    Tag::Compound(p)
                })
                .collect();
            let mut c = Compound::new();
            c.insert("predicates".into(), Tag::list(predicates));
            out.insert(key(component), tooltip(c, bit));
        }
    }
    if let Some(owner) = tag.shift_remove("SkullOwner") {
        out.insert(key("profile"), profile(owner));
    }
    if let Some(Tag::Compound(mut data)) = tag.shift_remove("BlockEntityTag") {
        for name in ["Patterns", "patterns"] {
            if let Some(patterns) = data.shift_remove(name) {
                out.insert(key("banner_patterns"), patterns);
            }
        }
        if let Some(base) = data.shift_remove("Base").and_then(|b| b.as_i64()) {
            out.insert(key("base_color"), Tag::String(ids::color(&base.to_string())));
        }
        if !data.is_empty() {
            data.entry("id".into())
                .or_insert_with(|| Tag::String(block_entity_of(item_id)));
            out.insert(key("block_entity_data"), Tag::Compound(data));
        }
    }
    if let Some(Tag::Compound(mut data)) = tag.shift_remove("EntityTag") {
        if !data.contains_key("id") {
            let entity = strip_namespace(item_id);
            let entity = entity.strip_suffix("_spawn_egg").unwrap_or(entity);
            data.insert("id".into(), Tag::String(namespaced(entity)));
        }
        out.insert(key("entity_data"), Tag::Compound(data));
    }
    if let Some(Tag::Compound(states)) = tag.shift_remove("BlockStateTag") {
        let states = states
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Tag::String(s) => s,
                    other => pack(&other),
                };
                (k, Tag::String(v))
            })
            .collect();
        out.insert(key("block_state"), Tag::Compound(states));
    }
    book(item_id, &mut tag, &mut out);
    potion_contents(&mut tag, &mut out, ctx);
    if let Some(Tag::List(modifiers)) = tag.shift_remove("AttributeModifiers") {
        let modifiers = modifiers
            .into_iter()
            .filter_map(|m| match m {
                Tag::Compound(m) => Some(Tag::Compound(attribute_modifier(m, ctx))),
                _ => None,
            })
            .collect();
        let mut c = Compound::new();
        c.insert("modifiers".into(), Tag::list(modifiers));
        out.insert(key("attribute_modifiers"), tooltip(c, HIDE_MODIFIERS));
    }
    if let Some(Tag::Compound(trim)) = tag.shift_remove("Trim") {
        out.insert(key("trim"), tooltip(trim, HIDE_TRIM));
    }
    if let Some(Tag::Compound(fireworks)) = tag.shift_remove("Fireworks") {
        let mut c = Compound::new();
        if let Some(flight) = fireworks.get("Flight") {
            c.insert("flight_duration".into(), flight.clone());
        }
        if let Some(Tag::List(explosions)) = fireworks.get("Explosions") {
            let explosions = explosions.iter().filter_map(Tag::as_compound).map(explosion).collect();
            c.insert("explosions".into(), Tag::list(explosions));
        }
        out.insert(key("fireworks"), Tag::Compound(c));
    }
    if let Some(Tag::Compound(e)) = tag.shift_remove("Explosion") {
        out.insert(key("firework_explosion"), explosion(&e));
    }
    if let Some(map) = tag.shift_remove("map") {
        out.insert(key("map_id"), map);
    }
    if hidden(HIDE_ADDITIONAL) {
        out.insert(key("hide_additional_tooltip"), Tag::Compound(Compound::new()));
    }
    if !tag.is_empty() {
        out.insert(key("custom_data"), Tag::Compound(tag));
    }
    out
}

fn levels(list: &[Tag]) -> Compound {
    let mut levels = Compound::new();
    for entry in list.iter().filter_map(Tag::as_compound) {
        let Some(id) = entry.get("id").and_then(Tag::as_str) else {
            continue;
        };
        let level = entry.get("lvl").and_then(Tag::as_i64).unwrap_or(1);
        levels.insert(namespaced(id), Tag::int(level));
    }
    levels
}

fn profile(owner: Tag) -> Tag {
    let mut out = Compound::new();
    match owner {
        Tag::String(name) => {
            out.insert("name".into(), Tag::String(name));
        }
        Tag::Compound(owner) => {
            if let Some(name) = owner.get("Name") {
                out.insert("name".into(), name.clone());
            }
            if let Some(id) = owner.get("Id") {
                out.insert("id".into(), id.clone());
            }
            let textures = owner
                .get("Properties")
                .and_then(Tag::as_compound)
                .and_then(|p| p.get("textures"))
                .and_then(Tag::as_list)
                .unwrap_or_default();
            let properties: Vec<Tag> = textures
                .iter()
                .filter_map(Tag::as_compound)
                .map(|t| {
                    let mut p = Compound::new();
                    p.insert("name".into(), Tag::string("textures"));
                    if let Some(value) = t.get("Value") {
                        p.insert("value".into(), value.clone());
                    }
                    if let Some(signature) = t.get("Signature") {
                        p.insert("signature".into(), signature.clone());
                    }
                    Tag::Compound(p)
                })
                .collect();
            if !properties.is_empty() {
                out.insert("properties".into(), Tag::list(properties));
            }
        }
        _ => {}
    }
    Tag::Compound(out)
}

/// Block entity id stored with an item's block entity data.
fn block_entity_of(item_id: &str) -> String {
    let path = strip_namespace(item_id);
    let kind = [
        ("_hanging_sign", "hanging_sign"),
        ("_sign", "sign"),
        ("_banner", "banner"),
        ("_bed", "bed"),
        ("shulker_box", "shulker_box"),
        ("_head", "skull"),
        ("_skull", "skull"),
    ]
    .iter()
    .find(|(suffix, _)| path.ends_with(suffix))
    .map_or(path, |(_, kind)| kind);
    namespaced(kind)
}

fn book(item_id: &str, tag: &mut Compound, out: &mut Compound) {
    let path = strip_namespace(item_id);
    let Some(Tag::List(pages)) = tag.shift_remove("pages") else {
        return;
    };
    let mut content = Compound::new();
    if path == "written_book" {
        for (field, name) in [("title", "title"), ("author", "author"), ("generation", "generation"), ("resolved", "resolved")] {
            if let Some(value) = tag.shift_remove(field) {
                content.insert(name.into(), value);
            }
        }
        content.insert("pages".into(), Tag::List(pages));
        out.insert(key("written_book_content"), Tag::Compound(content));
    } else {
        content.insert("pages".into(), Tag::List(pages));
        out.insert(key("writable_book_content"), Tag::Compound(content));
    }
}

fn potion_contents(tag: &mut Compound, out: &mut Compound, ctx: &mut Ctx<'_>) {
    let mut contents = Compound::new();
    if let Some(potion) = tag.shift_remove("Potion") {
        contents.insert("potion".into(), potion);
    }
    if let Some(color) = tag.shift_remove("CustomPotionColor") {
        contents.insert("custom_color".into(), color);
    }
    for field in ["custom_potion_effects", "CustomPotionEffects"] {
        if let Some(Tag::List(effects)) = tag.shift_remove(field) {
            let effects = effects
                .into_iter()
                .filter_map(|e| match e {
                    Tag::Compound(e) => Some(Tag::Compound(effect_instance(e, ctx))),
                    _ => None,
                })
                .collect();
            contents.insert("custom_effects".into(), Tag::list(effects));
        }
    }
    if !contents.is_empty() {
        out.insert(key("potion_contents"), Tag::Compound(contents));
    }
}

fn effect_instance(effect: Compound, ctx: &mut Ctx<'_>) -> Compound {
    effect
        .into_iter()
        .map(|(k, v)| {
            let k = snake_case(&k);
            let v = match (k.as_str(), v) {
                ("id", Tag::Number(n)) => Tag::String(ids::effect(&n.as_i64().to_string(), ctx)),
                (_, v) => v,
            };
            (k, v)
        })
        .collect()
}

fn attribute_modifier(modifier: Compound, ctx: &mut Ctx<'_>) -> Compound {
    let mut out = Compound::new();
    if let Some(name) = modifier.get("AttributeName").and_then(Tag::as_str) {
        out.insert("type".into(), Tag::String(misc::attribute(name, ctx)));
    }
    if let Some(uuid) = modifier.get("UUID") {
        out.insert("uuid".into(), uuid.clone());
    }
    if let Some(name) = modifier.get("Name") {
        out.insert("name".into(), name.clone());
    }
    if let Some(amount) = modifier.get("Amount").and_then(Tag::as_f64) {
        out.insert("amount".into(), Tag::double(amount));
    }
    if let Some(op) = modifier.get("Operation").and_then(Tag::as_i64) {
        out.insert("operation".into(), Tag::String(misc::attribute_operation(&op.to_string(), ctx)));
    }
    if let Some(slot) = modifier.get("Slot").and_then(Tag::as_str) {
        out.insert("slot".into(), Tag::string(slot));
    }
    out
}

fn explosion(e: &Compound) -> Tag {
    let mut out = Compound::new();
    let shape = e.get("Type").and_then(Tag::as_i64).unwrap_or(0);
    let shape = FIREWORK_SHAPES.get(shape.max(0) as usize).unwrap_or(&FIREWORK_SHAPES[0]);
    out.insert("shape".into(), Tag::string(*shape));
    for (field, name) in [
        ("Colors", "colors"),
        ("FadeColors", "fade_colors"),
        ("Trail", "has_trail"),
        ("Flicker", "has_twinkle"),
    ] {
        if let Some(value) = e.get(field) {
            out.insert(name.into(), value.clone());
        }
    }
    Tag::Compound(out)
}

fn uuid_string(words: &[i32]) -> String {
    let hex: String = words.iter().map(|w| format!("{:08x}", *w as u32)).collect();
    if hex.len() != 32 {
        return hex;
    }
    format!("{}-{}-{}-{}-{}", &hex[..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..])
}

/// Apply component changes made after 1.20.5.
pub(crate) fn update(components: &mut Compound, ctx: &mut Ctx<'_>) {
    if components.values().any(Tag::contains_macro) {
        return;
    }
    let modifiers = match components.get_mut(&key("attribute_modifiers")) {
        Some(Tag::Compound(wrapper)) => match wrapper.get_mut("modifiers") {
            Some(Tag::List(list)) => Some(list),
            _ => None,
        },
        Some(Tag::List(list)) => Some(list),
        _ => None,
    };
    for m in modifiers.into_iter().flatten().filter_map(Tag::as_compound_mut) {
        modern_modifier(m, ctx);
    }
    if ctx.crosses(2103)
        && let Some(value) = components.get(&key("custom_model_data")).and_then(Tag::as_f64)
    {
        let mut data = Compound::new();
        data.insert("floats".into(), Tag::list(vec![Tag::float(value)]));
        components.insert(key("custom_model_data"), Tag::Compound(data));
    }
    for name in ["container", "bundle_contents", "charged_projectiles"] {
        if let Some(Tag::List(items)) = components.get_mut(&key(name)) {
            for item in items.iter_mut() {
                nested_item(item, ctx);
            }
        }
    }
    for name in ["custom_name", "item_name"] {
        if let Some(value) = components.get_mut(&key(name)) {
            let taken = std::mem::replace(value, Tag::String(String::new()));
            *value = text_value(taken, ctx);
        }
    }
    if let Some(Tag::List(lines)) = components.get_mut(&key("lore")) {
        for line in lines.iter_mut() {
            let taken = std::mem::replace(line, Tag::String(String::new()));
            *line = text_value(taken, ctx);
        }
    }
    if let Some(Tag::Compound(book)) = components.get_mut(&key("written_book_content"))
        && let Some(Tag::List(pages)) = book.get_mut("pages")
    {
        for page in pages.iter_mut() {
            let taken = std::mem::replace(page, Tag::String(String::new()));
            *page = match taken {
                Tag::Compound(mut filterable) => {
                    if let Some(raw) = filterable.shift_remove("raw") {
                        filterable.insert("raw".into(), text_value(raw, ctx));
                    }
                    Tag::Compound(filterable)
                }
                other => text_value(other, ctx),
            };
        }
    }
    if ctx.crosses(2104) {
        tooltip_display(components);
    }
}

fn modern_modifier(modifier: &mut Compound, ctx: &mut Ctx<'_>) {
    if let Some(ty) = modifier.get("type").and_then(Tag::as_str) {
        let ty = misc::attribute(ty, ctx);
        modifier.insert("type".into(), Tag::String(ty));
    }
    if ctx.crosses(2006) && !modifier.contains_key("id") {
        let uuid = match modifier.shift_remove("uuid") {
            Some(Tag::IntArray(words)) => uuid_string(&words),
            Some(Tag::String(s)) => s,
            _ => String::new(),
        };
        let name = modifier
            .shift_remove("name")
            .and_then(|n| n.as_str().map(str::to_string))
            .unwrap_or_default();
        let mut out = Compound::new();
        out.insert("id".into(), Tag::String(misc::modifier_id(&uuid, &name)));
        out.extend(std::mem::take(modifier));
        *modifier = out;
    }
}

fn nested_item(item: &mut Tag, ctx: &mut Ctx<'_>) {
    let Tag::Compound(entry) = item else {
        return;
    };
    if let Some(Tag::Compound(stack)) = entry.get_mut("item") {
        let taken = std::mem::take(stack);
        *stack = update_item_stack(taken, false, ctx);
    } else if entry.contains_key("id") {
        let taken = std::mem::take(entry);
        *entry = update_item_stack(taken, false, ctx);
    }
}

fn text_value(value: Tag, ctx: &mut Ctx<'_>) -> Tag {
    let Tag::String(json) = value else {
        return value;
    };
    let json = text::update(&json, ctx);
    if ctx.crosses(2104) {
        text::to_tag(&json)
    } else {
        Tag::String(json)
    }
}

/// 1.21.5: `show_in_tooltip` flags, `hide_tooltip` and
/// `hide_additional_tooltip` move into `tooltip_display`, and wrapper
/// compounds around a single value are unwrapped.
fn tooltip_display(components: &mut Compound) {
    let mut hidden: Vec<Tag> = Vec::new();
    let mut hide_tooltip = false;
    for name in TOOLTIP_FLAGGED {
        let Some(Tag::Compound(c)) = components.get_mut(&key(name)) else {
            continue;
        };
        if c.shift_remove("show_in_tooltip").and_then(|s| s.as_i64()) == Some(0) {
            hidden.push(Tag::String(key(name)));
        }
        let inner = match name {
            "enchantments" | "stored_enchantments" => c.shift_remove("levels"),
            "dyed_color" => c.shift_remove("rgb"),
            "attribute_modifiers" => c.shift_remove("modifiers"),
            "can_break" | "can_place_on" => c.shift_remove("predicates"),
            "jukebox_playable" => c.shift_remove("song"),
            _ => None,
        };
        if let Some(inner) = inner {
            components.insert(key(name), inner);
        }
    }
    if components.shift_remove(&key("hide_additional_tooltip")).is_some() {
        for name in ADDITIONAL_TOOLTIP {
            let k = key(name);
            if components.contains_key(&k) && !hidden.contains(&Tag::String(k.clone())) {
                hidden.push(Tag::String(k));
            }
        }
    }
    if components.shift_remove(&key("hide_tooltip")).is_some() {
        hide_tooltip = true;
    }
    if hidden.is_empty() && !hide_tooltip {
        return;
    }
    let mut display = match components.shift_remove(&key("tooltip_display")) {
        Some(Tag::Compound(c)) => c,
        _ => Compound::new(),
    };
    if hide_tooltip {
        display.insert("hide_tooltip".into(), Tag::byte(1));
    }
    if !hidden.is_empty() {
        display.insert("hidden_components".into(), Tag::list(hidden));
    }
    components.insert(key("tooltip_display"), Tag::Compound(display));
}

/// Parse the text between the brackets of a command item argument.
/// `!name` removals are kept as empty compounds under `!minecraft:name`.
pub fn parse(text: &str) -> Option<Compound> {
    let mut out = Compound::new();
    for part in tokenize(text, ',', true) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(name) = part.strip_prefix('!') {
            out.insert(format!("!{}", namespaced(name.trim())), Tag::Compound(Compound::new()));
            continue;
        }
        let (name, value) = part.split_once('=')?;
        out.insert(namespaced(name.trim()), unpack(value.trim()).ok()?);
    }
    Some(out)
}

/// Render components as the text between the brackets of a command item
/// argument.
pub fn render(components: &Compound) -> String {
    components
        .iter()
        .map(|(name, value)| match name.strip_prefix('!') {
            Some(removed) => format!("!{}", strip_namespace(removed)),
            None => format!("{}={}", strip_namespace(name), pack(value)),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn stack(snbt: &str, source: u16, target: u16) -> String {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let Tag::Compound(stack) = unpack(snbt).unwrap() else {
            panic!("not a compound");
        };
        pack(&Tag::Compound(update_item_stack(stack, false, &mut ctx)))
    }

    #[test]
    fn tag_splits_into_components() {
        assert_eq!(
            stack(r#"{id:"minecraft:diamond_sword",Count:1b,tag:{Damage:5,Unbreakable:1b,HideFlags:4}}"#, 2004, 2005),
            r#"{id:"minecraft:diamond_sword",components:{"minecraft:damage":5,"minecraft:unbreakable":{show_in_tooltip:0b}}}"#
        );
    }

    #[test]
    fn count_of_one_is_implicit() {
        assert_eq!(stack(r#"{id:"minecraft:stone",Count:1b}"#, 2004, 2005), r#"{id:"minecraft:stone"}"#);
        assert_eq!(
            stack(r#"{id:"minecraft:stone",Count:3b,Slot:2b}"#, 2004, 2005),
            r#"{id:"minecraft:stone",count:3,Slot:2b}"#
        );
    }

    #[test]
    fn enchantments_and_leftovers() {
        assert_eq!(
            stack(
                r#"{id:"minecraft:bow",Count:1b,tag:{Enchantments:[{id:"minecraft:power",lvl:2s}],Custom:1b}}"#,
                2004,
                2005
            ),
            r#"{id:"minecraft:bow",components:{"minecraft:enchantments":{levels:{"minecraft:power":2}},"minecraft:custom_data":{Custom:1b}}}"#
        );
        assert_eq!(
            stack(r#"{id:"minecraft:stick",Count:1b,tag:{Enchantments:[{}]}}"#, 2004, 2005),
            r#"{id:"minecraft:stick",components:{"minecraft:enchantment_glint_override":1b}}"#
        );
    }

    #[test]
    fn later_releases_unwrap_and_collect_hidden_components() {
        assert_eq!(
            stack(
                r#"{id:"minecraft:bow",components:{"minecraft:enchantments":{levels:{"minecraft:power":2},show_in_tooltip:0b}}}"#,
                2005,
                2105
            ),
            r#"{id:"minecraft:bow",components:{"minecraft:enchantments":{"minecraft:power":2},"minecraft:tooltip_display":{hidden_components:["minecraft:enchantments"]}}}"#
        );
    }

    #[test]
    fn names_become_text_tags_from_1_21_5() {
        assert_eq!(
            stack(r#"{id:"minecraft:stone",Count:1b,tag:{display:{Name:'{"text":"A"}'}}}"#, 2004, 2105),
            r#"{id:"minecraft:stone",components:{"minecraft:custom_name":{text:"A"}}}"#
        );
    }

    #[test]
    fn command_form_round_trips() {
        let parsed = parse(r#"custom_name='"a"',!damage,enchantments={levels:{sharpness:1}}"#).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(
            render(&parsed),
            r#"custom_name="\"a\"",!damage,enchantments={levels:{sharpness:1}}"#
        );
    }
}
