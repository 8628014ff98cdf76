//! Guide-driven NBT migration.
//!
//! A compound is migrated against the [`TagsGuide`] of its source context:
//! every key with rules is renamed, removed or recursed into, unknown keys
//! pass through, and necessary tags are synthesized once the keys are done.
//! Hand-written rules live in [`edge_cases`].

mod edge_cases;

pub(crate) use edge_cases::update_item_stack;

use crate::context::Ctx;
use crate::convert::{self, Input};
use mapshift_diagnostics::codes;
use mapshift_guides::{Action, NbtEdgeCase, TagRule, TagsGuide};
use mapshift_nbt::{Compound, Number, Tag, pack, rename_key, unpack};

/// What the caller does after an edge case ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Keep going with the next key.
    Continue,
    /// The compound was replaced; process it again from the start.
    Restart,
}

/// The compound currently being migrated.
pub(crate) struct Scope<'g> {
    pub(crate) guide: &'g TagsGuide,
    pub(crate) object_id: String,
    pub(crate) read: bool,
}

/// Migrate `tag` as a value of source `context`. `object_id` identifies the
/// object the NBT belongs to (the entity type of a summon, the block of a
/// setblock) and feeds necessary-tag conditions.
pub fn update(tag: Tag, context: &str, object_id: &str, read: bool, ctx: &mut Ctx<'_>) -> Tag {
    if tag.contains_macro() {
        return tag;
    }
    let engine = ctx.engine();
    let Some(guide) = engine.nbt_guide().context(context) else {
        tracing::debug!(context, "no NBT guide for context; value kept");
        return tag;
    };
    match tag {
        Tag::Compound(mut compound) => {
            update_compound(&mut compound, guide, object_id, read, ctx);
            Tag::Compound(compound)
        }
        Tag::List(items) => Tag::List(
            items
                .into_iter()
                .map(|item| update(item, context, object_id, read, ctx))
                .collect(),
        ),
        other => other,
    }
}

/// Migrate SNBT text. Malformed input is logged and returned unchanged.
pub fn update_snbt(text: &str, context: &str, object_id: &str, read: bool, ctx: &mut Ctx<'_>) -> String {
    if text.contains("$(") && unpack(text).is_err() {
        return text.to_string();
    }
    match unpack(text) {
        Ok(tag) => {
            let original = tag.clone();
            let updated = update(tag, context, object_id, read, ctx);
            if updated == original {
                text.to_string()
            } else {
                pack(&updated)
            }
        }
        Err(e) => {
            ctx.diag(codes::MALFORMED_SNBT, format!("{e}; kept `{text}`"));
            text.to_string()
        }
    }
}

pub(crate) fn update_compound(
    compound: &mut Compound,
    guide: &TagsGuide,
    object_id: &str,
    read: bool,
    ctx: &mut Ctx<'_>,
) {
    loop {
        let scope = Scope {
            guide,
            object_id: own_id(compound).unwrap_or(object_id).to_string(),
            read,
        };
        if run_keys(compound, &scope, ctx) == Flow::Continue {
            break;
        }
    }
    let id = own_id(compound).unwrap_or(object_id).to_string();
    for (key, necessary) in &guide.necessary {
        if ctx.gate(&necessary.gate) && !compound.contains_key(key) && necessary.when.holds(&id, compound) {
            compound.insert(key.clone(), necessary.value.clone());
        }
    }
}

fn own_id(compound: &Compound) -> Option<&str> {
    compound.get("id").and_then(Tag::as_str)
}

fn run_keys(compound: &mut Compound, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Flow {
    let mut keys: Vec<String> = compound
        .keys()
        .filter(|k| scope.guide.entries.contains_key(k.as_str()))
        .cloned()
        .collect();
    keys.sort_by_key(|k| !inverts_chain(scope.guide.rules(k)));
    for key in keys {
        if !compound.contains_key(&key) {
            continue;
        }
        if apply_rules(compound, &key, scope.guide.rules(&key), scope, ctx) == Flow::Restart {
            return Flow::Restart;
        }
    }
    Flow::Continue
}

fn inverts_chain(rules: &[TagRule]) -> bool {
    rules
        .iter()
        .any(|r| matches!(r.action, Some(Action::EdgeCase(NbtEdgeCase::Riding))))
}

/// Apply the rule chain of `key`. After a rename the chain continues with
/// the later rules of the new name.
pub(crate) fn apply_rules(
    compound: &mut Compound,
    key: &str,
    rules: &[TagRule],
    scope: &Scope<'_>,
    ctx: &mut Ctx<'_>,
) -> Flow {
    for rule in rules {
        if !ctx.gate(&rule.gate) {
            continue;
        }
        let Some(value) = compound.get(key) else {
            return Flow::Continue;
        };
        if value.contains_macro() {
            return Flow::Continue;
        }
        if let Some(action) = &rule.action {
            if let Action::EdgeCase(case) = action {
                if edge_cases::run(*case, compound, key, scope, ctx) == Flow::Restart {
                    return Flow::Restart;
                }
            } else if let Some(value) = compound.get_mut(key) {
                let taken = std::mem::replace(value, Tag::Compound(Compound::new()));
                *value = apply_action(action, taken, scope, ctx);
            }
        }
        if rule.remove {
            compound.shift_remove(key);
            return Flow::Continue;
        }
        if let Some(new_key) = &rule.rename {
            if !rename_key(compound, key, new_key) || new_key == key {
                return Flow::Continue;
            }
            let floor = rule.gate.sort_key();
            let later: Vec<TagRule> = scope
                .guide
                .rules(new_key)
                .iter()
                .filter(|r| r.gate.sort_key() > floor)
                .cloned()
                .collect();
            return apply_rules(compound, new_key, &later, scope, ctx);
        }
    }
    Flow::Continue
}

/// Apply a non-edge-case action to a detached value.
fn apply_action(action: &Action, value: Tag, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Tag {
    match action {
        Action::Source(context) => {
            let child_id = match &value {
                Tag::Compound(c) => own_id(c).unwrap_or(&scope.object_id).to_string(),
                _ => scope.object_id.clone(),
            };
            update(value, context, &child_id, scope.read, ctx)
        }
        Action::List(inner) => match value {
            Tag::List(items) => Tag::list(
                items
                    .into_iter()
                    .filter_map(|item| apply_to_element(inner, item, scope, ctx))
                    .collect(),
            ),
            other => other,
        },
        Action::Tags(guide) => match value {
            Tag::Compound(mut c) => {
                update_compound(&mut c, guide, &scope.object_id, scope.read, ctx);
                Tag::Compound(c)
            }
            other => other,
        },
        Action::Convert(ty) => convert_value(*ty, value, scope, ctx),
        Action::EdgeCase(case) => {
            let mut holder = Compound::new();
            holder.insert(String::new(), value);
            edge_cases::run(*case, &mut holder, "", scope, ctx);
            holder.shift_remove("").unwrap_or(Tag::Compound(Compound::new()))
        }
    }
}

/// List elements removed by an edge case are dropped from the list.
fn apply_to_element(action: &Action, item: Tag, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Option<Tag> {
    if item.contains_macro() {
        return Some(item);
    }
    match action {
        Action::EdgeCase(case) => {
            let mut holder = Compound::new();
            holder.insert(String::new(), item);
            edge_cases::run(*case, &mut holder, "", scope, ctx);
            holder.shift_remove("")
        }
        other => Some(apply_action(other, item, scope, ctx)),
    }
}

/// Run a string or number through a converter. Numbers keep their width
/// when the result is still numeric.
fn convert_value(ty: mapshift_guides::ArgType, value: Tag, scope: &Scope<'_>, ctx: &mut Ctx<'_>) -> Tag {
    let text = match &value {
        Tag::String(s) => s.clone(),
        Tag::Number(n) if n.kind().is_float() => n.as_f64().to_string(),
        Tag::Number(n) => n.as_i64().to_string(),
        _ => return value,
    };
    let input = Input::single(text, Some(scope.object_id.as_str()));
    let Some(out) = convert::convert(ty, &input, ctx) else {
        return value;
    };
    match value {
        Tag::Number(n) => match out.parse::<i64>() {
            Ok(v) if !n.kind().is_float() => Tag::Number(Number::new(n.kind(), v)),
            _ => Tag::String(out),
        },
        _ => Tag::String(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn migrate(snbt: &str, context: &str, object_id: &str, source: u16, target: u16) -> String {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        update_snbt(snbt, context, object_id, false, &mut ctx)
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert_eq!(
            migrate("{Foo:1b,Bar:{x:\"y\"}}", "entity", "minecraft:pig", 1300, 2105),
            "{Foo:1b,Bar:{x:\"y\"}}"
        );
    }

    #[test]
    fn macro_subtrees_are_kept() {
        let snbt = "{ActiveEffects:[{Id:$(effect)}]}";
        assert_eq!(migrate(snbt, "entity", "minecraft:pig", 1300, 2105), snbt);
    }

    #[test]
    fn malformed_snbt_is_logged() {
        let engine = Engine::new(Version::LATEST);
        let mut ctx = Ctx::new(&engine, Version::new(1202), "test");
        assert_eq!(update_snbt("{Foo:", "entity", "", false, &mut ctx), "{Foo:");
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn renamed_keys_continue_with_later_rules() {
        assert_eq!(
            migrate("{ActiveEffects:[{Id:1b,Amplifier:2b,Duration:100}]}", "entity", "minecraft:pig", 1202, 2105),
            r#"{active_effects:[{id:"minecraft:speed",amplifier:2b,duration:100}]}"#
        );
    }

    #[test]
    fn necessary_tags_are_added_when_absent() {
        let out = migrate("{}", "block", "minecraft:oak_sign", 1904, 2000);
        assert_eq!(out, "{is_waxed:0b}");
        assert_eq!(migrate("{is_waxed:1b}", "block", "minecraft:oak_sign", 1904, 2000), "{is_waxed:1b}");
        assert_eq!(migrate("{}", "block", "minecraft:chest", 1904, 2000), "{}");
    }

    #[test]
    fn riding_chain_is_inverted() {
        let out = migrate(
            r#"{id:"A",Riding:{id:"B",Riding:{id:"C"}}}"#,
            "entity",
            "A",
            800,
            900,
        );
        assert_eq!(out, r#"{id:"C",Passengers:[{id:"B",Passengers:[{id:"A"}]}]}"#);
    }
}
