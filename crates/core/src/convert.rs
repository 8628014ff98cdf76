//! Converter registry: one function per [`ArgType`].
//!
//! Every declared argument type resolves to a converter and a fixed
//! parameter through an exhaustive `match`, so a new type cannot be added to
//! the guides without a converter. Converters are plain functions; all state
//! travels in [`Ctx`].

use crate::command;
use crate::context::{Ctx, Issue};
use crate::engine::Engine;
use crate::item_components;
use crate::nbt_update::{self, update_item_stack};
use crate::remap::blocks::{self, BlockDescriptor, parse_states};
use crate::remap::items::ItemDescriptor;
use crate::remap::{entities, ids, misc, particles, strip_namespace};
use crate::selector;
use crate::text;
use crate::tokenize::tokenize_without_quotes;
use mapshift_diagnostics::codes;
use mapshift_guides::{Action, ArgType, NbtEdgeCase, TagsGuide};
use mapshift_nbt::{Compound, Tag, pack, unpack};

/// Raw values handed to a converter: one for a plain slot, several for a
/// group slot.
#[derive(Debug, Clone)]
pub(crate) struct Input<'a> {
    pub(crate) values: Vec<String>,
    /// Identifier of the object the value belongs to, if known.
    pub(crate) object_id: Option<&'a str>,
}

impl<'a> Input<'a> {
    pub(crate) fn single(value: impl Into<String>, object_id: Option<&'a str>) -> Self {
        Self {
            values: vec![value.into()],
            object_id,
        }
    }

    fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    fn get(&self, i: usize) -> Option<&str> {
        self.values.get(i).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn joined(&self) -> String {
        self.values.join(" ")
    }
}

/// Per-type constant handed to a shared converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fixed {
    None,
    /// The value is tested against world state.
    Read,
    /// The value is written to the world.
    Write,
    /// NBT guide context of the value.
    Context(&'static str),
}

impl Fixed {
    fn read(self) -> bool {
        self == Fixed::Read
    }
}

type Converter = fn(&mut Ctx<'_>, &Input<'_>, Fixed) -> Option<String>;

/// The converter and fixed parameter of `ty`.
pub(crate) fn registry(ty: ArgType) -> (Converter, Fixed) {
    match ty {
        ArgType::Literal => (literal, Fixed::None),
        ArgType::Selector => (selector_arg, Fixed::Read),
        ArgType::SelectorWithNbt => (selector_with_nbt, Fixed::Read),
        ArgType::Block => (block, Fixed::Write),
        ArgType::BlockPredicate => (block, Fixed::Read),
        ArgType::LegacyBlock => (legacy_block, Fixed::Write),
        ArgType::LegacyBlockPredicate => (legacy_block, Fixed::Read),
        ArgType::Item => (item, Fixed::Write),
        ArgType::ItemPredicate => (item, Fixed::Read),
        ArgType::LegacyItem => (legacy_item, Fixed::Write),
        ArgType::LegacyItemPredicate => (legacy_item, Fixed::Read),
        ArgType::Entity => (entity, Fixed::Write),
        ArgType::NbtEntity => (nbt, Fixed::Context("entity")),
        ArgType::NbtBlock => (nbt, Fixed::Context("block")),
        ArgType::NbtItem => (nbt_item, Fixed::Write),
        ArgType::NbtArbitrary => (nbt, Fixed::Context("arbitrary")),
        ArgType::NbtPath => (nbt_path, Fixed::Context("entity")),
        ArgType::NbtPathRead => (nbt_path_read, Fixed::Read),
        ArgType::TextComponent => (text_component, Fixed::None),
        ArgType::Particle => (particle, Fixed::None),
        ArgType::Sound => (sound, Fixed::None),
        ArgType::Effect => (effect, Fixed::None),
        ArgType::Enchantment => (enchantment, Fixed::None),
        ArgType::Potion => (potion, Fixed::None),
        ArgType::Painting => (painting, Fixed::None),
        ArgType::Gamemode => (gamemode, Fixed::None),
        ArgType::Difficulty => (difficulty, Fixed::None),
        ArgType::Criteria => (criteria, Fixed::None),
        ArgType::Slot => (slot, Fixed::None),
        ArgType::Attribute => (attribute, Fixed::None),
        ArgType::AttributeOperation => (attribute_operation, Fixed::None),
        ArgType::AttributeModifierId => (attribute_modifier_id, Fixed::None),
        ArgType::ScoreRange => (score_range, Fixed::None),
        ArgType::Experience => (experience, Fixed::None),
        ArgType::Command => (nested_command, Fixed::None),
    }
}

/// Convert `input` as a value of type `ty`. `None` drops the slot.
pub(crate) fn convert(ty: ArgType, input: &Input<'_>, ctx: &mut Ctx<'_>) -> Option<String> {
    if input.values.iter().any(|v| v.contains("$(")) && ty != ArgType::Command {
        return Some(input.joined());
    }
    let (converter, fixed) = registry(ty);
    converter(ctx, input, fixed)
}

/// Keep the namespace style of the input: unnamespaced in, unnamespaced out.
fn follow_namespace(original: &str, converted: String) -> String {
    if original.contains(':') || original.starts_with('#') {
        return converted;
    }
    match converted.strip_prefix("minecraft:") {
        Some(path) => path.to_string(),
        None => converted,
    }
}

fn parse_compound(text: &str, ctx: &mut Ctx<'_>) -> Option<Compound> {
    match unpack(text) {
        Ok(Tag::Compound(c)) => Some(c),
        Ok(_) => {
            ctx.diag(codes::MALFORMED_SNBT, format!("expected a compound, found `{text}`"));
            None
        }
        Err(e) => {
            ctx.diag(codes::MALFORMED_SNBT, format!("{e}; kept `{text}`"));
            None
        }
    }
}

fn literal(_: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(input.joined())
}

fn selector_arg(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    Some(selector::update(input.first()?, fixed.read(), ctx))
}

/// Legacy `testfor @e {nbt}`: the filter moves into the selector.
fn selector_with_nbt(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let sel = selector::update(input.first()?, fixed.read(), ctx);
    let Some(filter) = input.get(1) else {
        return Some(sel);
    };
    let filter = nbt_update::update_snbt(filter, "entity", input.object_id.unwrap_or(""), true, ctx);
    Some(selector::with_nbt(&sel, &filter))
}

/// Modern `id[states]{nbt}`.
fn block(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let text = input.first()?;
    let mut desc = match BlockDescriptor::parse(text) {
        Ok(desc) => desc,
        Err(e) => {
            ctx.diag(codes::MALFORMED_SNBT, format!("{e}; kept block `{text}`"));
            return Some(text.to_string());
        }
    };
    desc.read = fixed.read();
    Some(finish_block(text_id(text), desc, ctx))
}

/// Legacy group: id, then a data value or state list, then block entity NBT.
fn legacy_block(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let id = input.first()?;
    let read = fixed.read();
    let mut desc = BlockDescriptor {
        read,
        ..BlockDescriptor::new(id)
    };
    match input.get(1) {
        Some("*") => desc.data = read.then_some(-1),
        Some(states) if states.contains('=') => desc.states = parse_states(states),
        Some(data) => match data.parse::<i32>() {
            Ok(n) => desc.data = Some(n),
            Err(_) if data == "default" => {}
            Err(_) => ctx.diag(codes::AMBIGUOUS_LEGACY_VALUE, format!("block data `{data}` is not a number")),
        },
        None if !read => desc.data = Some(0),
        None => {}
    }
    let mut unreadable = None;
    if let Some(raw) = input.get(2) {
        desc.nbt = parse_compound(raw, ctx);
        unreadable = desc.nbt.is_none().then_some(raw);
    }
    let mut out = finish_block(id, desc, ctx);
    out.push_str(unreadable.unwrap_or_default());
    Some(out)
}

fn text_id(text: &str) -> &str {
    let end = text.find(['[', '{']).unwrap_or(text.len());
    &text[..end]
}

fn finish_block(original_id: &str, desc: BlockDescriptor, ctx: &mut Ctx<'_>) -> String {
    let read = desc.read;
    let mut desc = blocks::update(desc, ctx);
    if let Some(nbt) = desc.nbt.take() {
        let id = desc.id.clone();
        desc.nbt = match nbt_update::update(Tag::Compound(nbt), "block", &id, read, ctx) {
            Tag::Compound(c) => Some(c),
            _ => None,
        };
    }
    desc.id = follow_namespace(original_id, desc.id);
    desc.render()
}

/// Modern `id{nbt}` or `id[components]`.
fn item(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let text = input.first()?;
    let desc = match ItemDescriptor::parse(text) {
        Ok(desc) => desc,
        Err(e) => {
            ctx.diag(codes::MALFORMED_SNBT, format!("{e}; kept item `{text}`"));
            return Some(text.to_string());
        }
    };
    let mut stack = Compound::new();
    stack.insert("id".into(), Tag::String(desc.id.clone()));
    match &desc.components {
        Some(raw) => {
            let Some(components) = item_components::parse(raw) else {
                ctx.diag(codes::MALFORMED_SNBT, format!("unreadable components in `{text}`"));
                return Some(text.to_string());
            };
            stack.insert("components".into(), Tag::Compound(components));
        }
        None => {
            stack.insert("Count".into(), Tag::byte(1));
            if let Some(nbt) = desc.nbt {
                stack.insert("tag".into(), Tag::Compound(nbt));
            }
        }
    }
    let stack = update_item_stack(stack, fixed.read(), ctx);
    Some(render_stack(&desc.id, &stack))
}

/// Legacy group: id, then a damage value, then the item tag. Counts are
/// separate slots.
fn legacy_item(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let id = input.first()?;
    let mut stack = Compound::new();
    stack.insert("id".into(), Tag::string(id));
    stack.insert("Count".into(), Tag::byte(1));
    match input.get(1).map(str::parse::<i64>) {
        Some(Ok(-1)) | None if fixed.read() => {}
        Some(Ok(damage)) => {
            stack.insert("Damage".into(), Tag::short(damage.max(0)));
        }
        Some(Err(_)) => ctx.diag(codes::AMBIGUOUS_LEGACY_VALUE, format!("item data of `{id}` is not a number")),
        None => {}
    }
    let mut unreadable = None;
    if let Some(raw) = input.get(2) {
        match parse_compound(raw, ctx) {
            Some(tag) => {
                stack.insert("tag".into(), Tag::Compound(tag));
            }
            None => unreadable = Some(raw),
        }
    }
    let stack = update_item_stack(stack, fixed.read(), ctx);
    let mut out = render_stack(id, &stack);
    out.push_str(unreadable.unwrap_or_default());
    Some(out)
}

fn render_stack(original_id: &str, stack: &Compound) -> String {
    let id = stack.get("id").and_then(Tag::as_str).unwrap_or(original_id);
    let mut out = follow_namespace(original_id, id.to_string());
    match (stack.get("components"), stack.get("tag")) {
        (Some(Tag::Compound(components)), _) => {
            out.push('[');
            out.push_str(&item_components::render(components));
            out.push(']');
        }
        (_, Some(tag @ Tag::Compound(c))) if !c.is_empty() => out.push_str(&pack(tag)),
        _ => {}
    }
    out
}

/// Entity type, with an optional second member holding the entity NBT whose
/// discriminator fields pick the modern type.
fn entity(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let id = input.first()?;
    let mut nbt = input.get(1).and_then(|t| unpack(t).ok()).and_then(|t| match t {
        Tag::Compound(c) => Some(c),
        _ => None,
    });
    let renamed = entities::rename(id, nbt.as_mut(), fixed.read(), ctx);
    Some(follow_namespace(id, renamed))
}

/// Entity, block entity or arbitrary NBT. A second member carries the raw
/// entity type, which lets the entity guide resolve discriminator fields.
fn nbt(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let text = input.first()?;
    let Fixed::Context(context) = fixed else {
        return Some(text.to_string());
    };
    let object_id = input.object_id.unwrap_or("");
    let Some(raw_type) = input.get(1).filter(|_| context == "entity") else {
        return Some(nbt_update::update_snbt(text, context, object_id, false, ctx));
    };
    let Some(mut compound) = parse_compound(text, ctx) else {
        return Some(text.to_string());
    };
    if compound.contains_key("id") {
        return Some(nbt_update::update_snbt(text, context, object_id, false, ctx));
    }
    let original = compound.clone();
    compound.shift_insert(0, "id".into(), Tag::string(raw_type));
    let mut updated = match nbt_update::update(Tag::Compound(compound), context, object_id, false, ctx) {
        Tag::Compound(c) => c,
        _ => return Some(text.to_string()),
    };
    // A riding chain puts the vehicle at the root; the type slot follows it.
    if let Some(Tag::String(new_id)) = updated.shift_remove("id") {
        let slot_id = object_id_or(input.object_id, raw_type);
        if !strip_namespace(&new_id).eq_ignore_ascii_case(strip_namespace(slot_id)) {
            ctx.retype = Some(follow_namespace(raw_type, new_id));
        }
    }
    if updated == original {
        Some(text.to_string())
    } else {
        Some(pack(&Tag::Compound(updated)))
    }
}

fn object_id_or<'a>(object_id: Option<&'a str>, fallback: &'a str) -> &'a str {
    object_id.filter(|id| !id.is_empty()).unwrap_or(fallback)
}

/// A whole item stack (`{id:..., Count:...}`).
fn nbt_item(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let text = input.first()?;
    let Some(stack) = parse_compound(text, ctx) else {
        return Some(text.to_string());
    };
    let original = stack.clone();
    let updated = update_item_stack(stack, fixed.read(), ctx);
    if updated == original {
        Some(text.to_string())
    } else {
        Some(pack(&Tag::Compound(updated)))
    }
}

fn nbt_path(ctx: &mut Ctx<'_>, input: &Input<'_>, fixed: Fixed) -> Option<String> {
    let path = input.first()?;
    let context = match (input.get(1), fixed) {
        (Some(kind), _) => kind,
        (None, Fixed::Context(context)) => context,
        (None, _) => return Some(path.to_string()),
    };
    Some(update_path(path, context, ctx))
}

/// `data get` paths: group of source kind, source, and path. Item counts
/// read across 1.20.5 may now be absent; the reading line gets a safe-read
/// companion.
fn nbt_path_read(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let (Some(kind), Some(source), Some(path)) = (input.get(0), input.get(1), input.get(2)) else {
        return input.values.last().cloned();
    };
    let updated = update_path(path, kind, ctx);
    if ctx.crosses(2004) && last_segment(path) == "Count" && last_segment(&updated) == "count" {
        ctx.push_issue(Issue::DefaultedNbtRead {
            source: format!("{kind} {source}"),
            path: updated.clone(),
            default: "1".into(),
        });
    }
    Some(updated)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// What the value at a path segment is migrated as.
#[derive(Clone, Copy)]
enum Node<'g> {
    Guide(&'g TagsGuide, Option<&'g str>),
    Item,
    Opaque,
}

/// Migrate the key names of an NBT path against the guide of `context`
/// (`entity`, `block`; anything else is left as written).
pub(crate) fn update_path(path: &str, context: &str, ctx: &mut Ctx<'_>) -> String {
    if path.contains("$(") {
        return path.to_string();
    }
    let engine = ctx.engine();
    let Some(guide) = engine.nbt_guide().context(context) else {
        return path.to_string();
    };
    let segments = tokenize_without_quotes(path, '.');
    let mut out: Vec<String> = Vec::with_capacity(segments.len());
    let mut node = Node::Guide(guide, Some(context));
    let mut i = 0;
    while i < segments.len() {
        let segment = &segments[i];
        let split = segment.find(['[', '{']).unwrap_or(segment.len());
        let (name, suffix) = segment.split_at(split);
        match node {
            Node::Guide(guide, _) => {
                let (renamed, child) = rename_segment(guide, engine, name, ctx);
                let suffix = migrate_filters(suffix, child, ctx);
                out.push(format!("{renamed}{suffix}"));
                node = child;
            }
            Node::Item if ctx.crosses(2004) => {
                let (parts, used) = item_segment(&segments[i..]);
                out.extend(parts);
                i += used;
                node = Node::Opaque;
                continue;
            }
            Node::Item => {
                out.push(segment.clone());
                node = match name {
                    "tag" => engine
                        .nbt_guide()
                        .context("item_tag")
                        .map_or(Node::Opaque, |g| Node::Guide(g, Some("item_tag"))),
                    _ => Node::Opaque,
                };
            }
            Node::Opaque => out.push(segment.clone()),
        }
        i += 1;
    }
    out.join(".")
}

fn rename_segment<'g>(guide: &'g TagsGuide, engine: &'g Engine, name: &str, ctx: &Ctx<'_>) -> (String, Node<'g>) {
    let mut current = name.to_string();
    let mut floor = 0u16;
    loop {
        let rule = guide
            .rules(&current)
            .iter()
            .find(|r| r.gate.sort_key() > floor && ctx.gate(&r.gate) && r.rename.is_some());
        match rule.and_then(|r| r.rename.clone().map(|n| (n, r.gate.sort_key()))) {
            Some((next, key)) if next != current => {
                current = next;
                floor = key;
            }
            _ => break,
        }
    }
    let child = guide
        .rules(&current)
        .iter()
        .chain(guide.rules(name))
        .find_map(|r| r.action.as_ref())
        .map_or(Node::Opaque, |action| node_of(action, engine));
    (current, child)
}

fn node_of<'g>(action: &'g Action, engine: &'g Engine) -> Node<'g> {
    match action {
        Action::Source(context) => engine
            .nbt_guide()
            .context(context)
            .map_or(Node::Opaque, |g| Node::Guide(g, Some(context.as_str()))),
        Action::Tags(guide) => Node::Guide(guide, None),
        Action::List(inner) => node_of(inner, engine),
        Action::EdgeCase(NbtEdgeCase::ItemStack) => Node::Item,
        Action::Convert(_) | Action::EdgeCase(_) => Node::Opaque,
    }
}

/// Migrate compound filters (`[{...}]`, `{...}`) of a segment whose value
/// has a named guide context.
fn migrate_filters(suffix: &str, node: Node<'_>, ctx: &mut Ctx<'_>) -> String {
    let Node::Guide(_, Some(context)) = node else {
        return suffix.to_string();
    };
    let Some(open) = suffix.find('{') else {
        return suffix.to_string();
    };
    let Some(close) = suffix.rfind('}') else {
        return suffix.to_string();
    };
    let filter = &suffix[open..=close];
    let migrated = nbt_update::update_snbt(filter, context, "", true, ctx);
    format!("{}{migrated}{}", &suffix[..open], &suffix[close + 1..])
}

/// Legacy item tag paths that map onto a data component.
const COMPONENT_PATHS: [(&str, &str); 8] = [
    ("Damage", "\"minecraft:damage\""),
    ("Unbreakable", "\"minecraft:unbreakable\""),
    ("Enchantments", "\"minecraft:enchantments\".levels"),
    ("StoredEnchantments", "\"minecraft:stored_enchantments\".levels"),
    ("CustomModelData", "\"minecraft:custom_model_data\""),
    ("RepairCost", "\"minecraft:repair_cost\""),
    ("SkullOwner", "\"minecraft:profile\""),
    ("EntityTag", "\"minecraft:entity_data\""),
];

/// Rewrite the part of a path below an item stack for 1.20.5. Returns the
/// new segments and how many input segments they replace.
fn item_segment(segments: &[String]) -> (Vec<String>, usize) {
    let first = segments[0].as_str();
    match first {
        "Count" => (vec!["count".into()], 1),
        "tag" => {
            let Some(key) = segments.get(1) else {
                return (vec!["components".into()], 1);
            };
            if key == "display"
                && let Some(field) = segments.get(2)
            {
                let component = match field.as_str() {
                    "Name" => Some("\"minecraft:custom_name\""),
                    "Lore" => Some("\"minecraft:lore\""),
                    "color" => Some("\"minecraft:dyed_color\".rgb"),
                    _ => None,
                };
                if let Some(component) = component {
                    return (vec!["components".into(), component.into()], 3);
                }
            }
            let bare = key.split(['[', '{']).next().unwrap_or(key);
            let rest = &key[bare.len()..];
            match COMPONENT_PATHS.iter().find(|(legacy, _)| *legacy == bare) {
                Some((_, component)) => (vec!["components".into(), format!("{component}{rest}")], 2),
                None => (
                    vec!["components".into(), "\"minecraft:custom_data\"".into(), key.clone()],
                    2,
                ),
            }
        }
        _ => (vec![first.to_string()], 1),
    }
}

fn text_component(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let json = input.joined();
    if ctx.crosses(1202) && serde_json::from_str::<serde_json::Value>(&json).is_err() {
        return Some(text::update(&text::from_plain(&json), ctx));
    }
    Some(text::update(&json, ctx))
}

fn particle(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let name = input.first()?;
    let params: Vec<String> = input.values[1..]
        .iter()
        .flat_map(|p| p.split_whitespace())
        .map(str::to_string)
        .collect();
    Some(particles::update(name, &params, ctx))
}

fn sound(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let value = input.first()?;
    Some(follow_namespace(value, misc::sound(value, ctx)))
}

fn effect(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let value = input.first()?;
    if value.parse::<i64>().is_ok() && !ctx.crosses(1202) && !ctx.crosses(2001) {
        return Some(value.to_string());
    }
    Some(ids::effect(value, ctx))
}

fn enchantment(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let value = input.first()?;
    if value.parse::<i64>().is_ok() && !ctx.crosses(1202) && !ctx.crosses(2004) {
        return Some(value.to_string());
    }
    Some(ids::enchantment(value, ctx))
}

fn potion(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::potion(input.first()?, ctx))
}

fn painting(_: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::painting(input.first()?))
}

fn gamemode(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::gamemode(input.first()?, ctx))
}

fn difficulty(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::difficulty(input.first()?, ctx))
}

fn criteria(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::criteria(input.first()?, ctx))
}

fn slot(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(ids::slot(input.first()?, ctx))
}

fn attribute(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let value = input.first()?;
    Some(follow_namespace(value, misc::attribute(value, ctx)))
}

fn attribute_operation(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(misc::attribute_operation(input.first()?, ctx))
}

fn attribute_modifier_id(_: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let uuid = input.first()?;
    let name = input.get(1).unwrap_or("");
    Some(misc::modifier_id(uuid, name))
}

/// Group of min and max bounds; `*` leaves a side open.
fn score_range(_: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let bound = |i: usize| input.get(i).filter(|v| *v != "*");
    Some(match (bound(0), bound(1)) {
        (Some(min), Some(max)) if min == max => min.to_string(),
        (Some(min), Some(max)) => format!("{min}..{max}"),
        (Some(min), None) => format!("{min}.."),
        (None, Some(max)) => format!("..{max}"),
        (None, None) => "..".to_string(),
    })
}

/// `5L` -> `5 levels`, `5` -> `5 points`.
fn experience(_: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    let value = input.first()?;
    Some(match value.strip_suffix(['L', 'l']) {
        Some(levels) => format!("{levels} levels"),
        None => format!("{value} points"),
    })
}

fn nested_command(ctx: &mut Ctx<'_>, input: &Input<'_>, _: Fixed) -> Option<String> {
    Some(command::update_nested(&input.joined(), ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshift_guides::Version;

    fn run(ty: ArgType, values: &[&str], source: u16, target: u16) -> Option<String> {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let input = Input {
            values: values.iter().map(|v| v.to_string()).collect(),
            object_id: None,
        };
        convert(ty, &input, &mut ctx)
    }

    #[test]
    fn macros_are_copied_through() {
        assert_eq!(run(ArgType::Block, &["$(block)"], 1202, 2105).as_deref(), Some("$(block)"));
    }

    #[test]
    fn legacy_blocks_flatten() {
        assert_eq!(run(ArgType::LegacyBlock, &["wool", "14"], 1202, 1300).as_deref(), Some("red_wool"));
        assert_eq!(
            run(ArgType::LegacyBlock, &["minecraft:stone", "0"], 1202, 1300).as_deref(),
            Some("minecraft:stone")
        );
    }

    #[test]
    fn legacy_items_keep_their_tag() {
        assert_eq!(
            run(ArgType::LegacyItem, &["dye", "1", "{Unbreakable:1b}"], 1202, 1400).as_deref(),
            Some("red_dye{Unbreakable:1b}")
        );
    }

    #[test]
    fn items_take_components_from_1_20_5() {
        assert_eq!(
            run(ArgType::Item, &["diamond_sword{Unbreakable:1b}"], 2004, 2005).as_deref(),
            Some("diamond_sword[unbreakable={}]")
        );
        assert_eq!(run(ArgType::Item, &["stone"], 2004, 2105).as_deref(), Some("stone"));
    }

    #[test]
    fn score_ranges() {
        assert_eq!(run(ArgType::ScoreRange, &["1", "5"], 1202, 1300).as_deref(), Some("1..5"));
        assert_eq!(run(ArgType::ScoreRange, &["3", "3"], 1202, 1300).as_deref(), Some("3"));
        assert_eq!(run(ArgType::ScoreRange, &["*", "5"], 1202, 1300).as_deref(), Some("..5"));
    }

    #[test]
    fn experience_amounts_name_their_unit() {
        assert_eq!(run(ArgType::Experience, &["5L"], 1202, 1300).as_deref(), Some("5 levels"));
        assert_eq!(run(ArgType::Experience, &["30"], 1202, 1300).as_deref(), Some("30 points"));
    }

    #[test]
    fn count_paths_are_renamed_and_recorded() {
        let engine = Engine::new(Version::LATEST);
        let mut ctx = Ctx::new(&engine, Version::new(2004), "test");
        let input = Input {
            values: vec!["entity".into(), "@s".into(), "SelectedItem.Count".into()],
            object_id: None,
        };
        assert_eq!(convert(ArgType::NbtPathRead, &input, &mut ctx).as_deref(), Some("SelectedItem.count"));
        assert_eq!(ctx.issues.len(), 1);
    }

    #[test]
    fn item_tag_paths_become_component_paths() {
        let engine = Engine::new(Version::LATEST);
        let mut ctx = Ctx::new(&engine, Version::new(2004), "test");
        assert_eq!(
            update_path("SelectedItem.tag.display.Name", "entity", &mut ctx),
            "SelectedItem.components.\"minecraft:custom_name\""
        );
        assert_eq!(
            update_path("SelectedItem.tag.score", "entity", &mut ctx),
            "SelectedItem.components.\"minecraft:custom_data\".score"
        );
    }
}
