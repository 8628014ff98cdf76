//! JSON text components.
//!
//! Components are walked as `serde_json` values with key order preserved.
//! Nested commands, selectors and hover items are migrated through the rest
//! of the engine; event objects change shape at 1.16 and 1.21.5.

use crate::context::Ctx;
use crate::{command, nbt_update, selector};
use mapshift_diagnostics::codes;
use mapshift_nbt::{Compound, Tag, pack, unpack};
use serde_json::{Map, Value};

/// Migrate a JSON text component. Input that does not parse is logged and
/// returned unchanged; input that needs no change is returned byte for byte.
pub fn update(json: &str, ctx: &mut Ctx<'_>) -> String {
    if json.contains("$(") {
        return json.to_string();
    }
    let original: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            ctx.diag(codes::INVALID_TEXT_COMPONENT, format!("invalid JSON text: {e}"));
            return json.to_string();
        }
    };
    let mut value = original.clone();
    update_value(&mut value, ctx);
    if value == original {
        json.to_string()
    } else {
        value.to_string()
    }
}

/// Wrap plain legacy text as a JSON string component.
pub fn from_plain(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// A JSON component as the NBT structure used from 1.21.5. Text that is
/// not JSON becomes a plain string tag.
pub fn to_tag(json: &str) -> Tag {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => Tag::from_json(&value),
        Err(_) => Tag::string(json),
    }
}

fn update_value(value: &mut Value, ctx: &mut Ctx<'_>) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(|item| update_value(item, ctx)),
        Value::Object(map) => update_component(map, ctx),
        _ => {}
    }
}

fn update_component(map: &mut Map<String, Value>, ctx: &mut Ctx<'_>) {
    for key in ["extra", "with", "separator"] {
        if let Some(child) = map.get_mut(key) {
            update_value(child, ctx);
        }
    }
    if let Some(Value::String(sel)) = map.get_mut("selector") {
        *sel = selector::update(sel, true, ctx);
    }
    if let Some(Value::Object(score)) = map.get_mut("score")
        && let Some(Value::String(name)) = score.get_mut("name")
        && name.starts_with('@')
    {
        *name = selector::update(name, true, ctx);
    }
    if map.contains_key("nbt")
        && let Some(Value::String(entity)) = map.get_mut("entity")
    {
        *entity = selector::update(entity, true, ctx);
    }
    update_click(map, ctx);
    update_hover(map, ctx);
}

fn update_click(map: &mut Map<String, Value>, ctx: &mut Ctx<'_>) {
    let key = if map.contains_key("clickEvent") { "clickEvent" } else { "click_event" };
    let Some(Value::Object(event)) = map.get_mut(key) else {
        return;
    };
    let action = event.get("action").and_then(Value::as_str).unwrap_or_default().to_string();
    let value_key = if event.contains_key("value") { "value" } else { "command" };
    if matches!(action.as_str(), "run_command" | "suggest_command")
        && let Some(Value::String(line)) = event.get_mut(value_key)
    {
        *line = command::update_line(line, ctx);
    }
    if key == "clickEvent" && ctx.crosses(2104) {
        let renamed = match action.as_str() {
            "open_url" => Some("url"),
            "run_command" | "suggest_command" => Some("command"),
            "change_page" => Some("page"),
            "open_file" => Some("path"),
            _ => None,
        };
        if let Some(new_key) = renamed
            && let Some(value) = event.shift_remove("value")
        {
            let value = match (new_key, value) {
                ("page", Value::String(s)) => s.parse::<i64>().map_or(Value::String(s), Value::from),
                (_, v) => v,
            };
            event.insert(new_key.into(), value);
        }
        rename_in_place(map, "clickEvent", "click_event");
    }
}

fn update_hover(map: &mut Map<String, Value>, ctx: &mut Ctx<'_>) {
    let key = if map.contains_key("hoverEvent") { "hoverEvent" } else { "hover_event" };
    let Some(Value::Object(event)) = map.get_mut(key) else {
        return;
    };
    let action = event.get("action").and_then(Value::as_str).unwrap_or_default().to_string();

    if ctx.crosses(1502)
        && let Some(value) = event.shift_remove("value")
    {
        let contents = match action.as_str() {
            "show_item" => legacy_show_item(&value, ctx),
            "show_entity" => legacy_show_entity(&value),
            _ => value,
        };
        event.insert("contents".into(), contents);
    }

    match action.as_str() {
        "show_text" => {
            for k in ["contents", "value"] {
                if let Some(text) = event.get_mut(k) {
                    update_value(text, ctx);
                }
            }
        }
        "show_item" if key == "hoverEvent" => {
            if let Some(Value::Object(contents)) = event.get_mut("contents") {
                update_item_contents(contents, ctx);
            }
        }
        "show_entity" => {
            if let Some(Value::Object(contents)) = event.get_mut("contents")
                && let Some(name) = contents.get_mut("name")
            {
                update_value(name, ctx);
            }
        }
        _ => {}
    }

    if key == "hoverEvent" && ctx.crosses(2104) {
        if let Some(contents) = event.shift_remove("contents") {
            match (action.as_str(), contents) {
                ("show_item", Value::Object(item)) => event.extend(item),
                ("show_entity", Value::Object(mut entity)) => {
                    if let Some(uuid) = entity.shift_remove("id") {
                        entity.insert("uuid".into(), uuid);
                    }
                    if let Some(ty) = entity.shift_remove("type") {
                        event.insert("id".into(), ty);
                    }
                    event.extend(entity);
                }
                (_, contents) => {
                    event.insert("value".into(), contents);
                }
            }
        }
        rename_in_place(map, "hoverEvent", "hover_event");
    }
}

/// 1.12 `show_item` values are SNBT item stacks, sometimes wrapped in a text
/// component.
fn legacy_show_item(value: &Value, ctx: &mut Ctx<'_>) -> Value {
    let snbt = match value {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("text").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    let Ok(Tag::Compound(stack)) = unpack(snbt) else {
        ctx.diag(codes::MALFORMED_SNBT, format!("hover item is not an item stack: {snbt}"));
        return value.clone();
    };
    let mut contents = Map::new();
    if let Some(id) = stack.get("id") {
        let id = match id {
            Tag::String(s) => s.clone(),
            other => pack(other),
        };
        contents.insert("id".into(), Value::String(id));
    }
    if let Some(count) = stack.get("Count").and_then(Tag::as_i64) {
        contents.insert("count".into(), Value::from(count));
    }
    if let Some(damage) = stack.get("Damage") {
        contents.insert("Damage".into(), Value::String(pack(damage)));
    }
    if let Some(tag) = stack.get("tag") {
        contents.insert("tag".into(), Value::String(pack(tag)));
    }
    Value::Object(contents)
}

fn legacy_show_entity(value: &Value) -> Value {
    let snbt = match value {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("text").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    let Ok(Tag::Compound(entity)) = unpack(snbt) else {
        return value.clone();
    };
    let mut contents = Map::new();
    if let Some(ty) = entity.get("type").and_then(Tag::as_str) {
        contents.insert("type".into(), Value::String(ty.to_string()));
    }
    if let Some(id) = entity.get("id").and_then(Tag::as_str) {
        contents.insert("id".into(), Value::String(id.to_string()));
    }
    if let Some(name) = entity.get("name").and_then(Tag::as_str) {
        let name = serde_json::from_str(name).unwrap_or_else(|_| Value::String(name.to_string()));
        contents.insert("name".into(), name);
    }
    Value::Object(contents)
}

/// Run `show_item` contents through the item stack migration.
fn update_item_contents(contents: &mut Map<String, Value>, ctx: &mut Ctx<'_>) {
    let mut stack = Compound::new();
    if let Some(id) = contents.get("id").and_then(Value::as_str) {
        stack.insert("id".into(), Tag::string(id));
    }
    let modern = contents.contains_key("components");
    let count = contents.get("count").and_then(Value::as_i64).unwrap_or(1);
    if modern {
        stack.insert("count".into(), Tag::int(count));
    } else {
        stack.insert("Count".into(), Tag::byte(count));
    }
    if let Some(damage) = contents.get("Damage").and_then(Value::as_str).and_then(|d| unpack(d).ok()) {
        stack.insert("Damage".into(), damage);
    }
    if let Some(tag) = contents.get("tag").and_then(Value::as_str) {
        match unpack(tag) {
            Ok(tag) => {
                stack.insert("tag".into(), tag);
            }
            Err(e) => ctx.diag(codes::MALFORMED_SNBT, format!("hover item tag: {e}")),
        }
    }
    if let Some(components) = contents.get("components") {
        stack.insert("components".into(), Tag::from_json(components));
    }

    let stack = nbt_update::update_item_stack(stack, false, ctx);

    let mut out = Map::new();
    if let Some(id) = stack.get("id").and_then(Tag::as_str) {
        out.insert("id".into(), Value::String(id.to_string()));
    }
    let count = stack
        .get("count")
        .or_else(|| stack.get("Count"))
        .and_then(Tag::as_i64)
        .unwrap_or(1);
    out.insert("count".into(), Value::from(count));
    if let Some(tag) = stack.get("tag") {
        out.insert("tag".into(), Value::String(pack(tag)));
    }
    if let Some(components) = stack.get("components") {
        out.insert("components".into(), components.to_json());
    }
    *contents = out;
}

fn rename_in_place(map: &mut Map<String, Value>, old: &str, new: &str) {
    if !map.contains_key(old) {
        return;
    }
    for (key, value) in std::mem::take(map) {
        let key = if key == old { new.to_string() } else { key };
        map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn run(json: &str, source: u16, target: u16) -> (String, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = update(json, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn unchanged_text_keeps_its_formatting() {
        let json = r#"{ "text": "hi",  "color": "red" }"#;
        assert_eq!(run(json, 1202, 2105).0, json);
    }

    #[test]
    fn invalid_json_is_logged_and_kept() {
        let (out, diags) = run("{text:", 1300, 2105);
        assert_eq!((out.as_str(), diags), ("{text:", 1));
    }

    #[test]
    fn hover_value_becomes_contents() {
        let json = r#"{"text":"a","hoverEvent":{"action":"show_text","value":"b"}}"#;
        assert_eq!(
            run(json, 1300, 1600).0,
            r#"{"text":"a","hoverEvent":{"action":"show_text","contents":"b"}}"#
        );
        assert_eq!(
            run(json, 1300, 2105).0,
            r#"{"text":"a","hover_event":{"action":"show_text","value":"b"}}"#
        );
    }

    #[test]
    fn click_events_are_renamed_from_1_21_5() {
        let json = r#"{"text":"a","clickEvent":{"action":"open_url","value":"https://x.y"}}"#;
        assert_eq!(
            run(json, 2004, 2105).0,
            r#"{"text":"a","click_event":{"action":"open_url","url":"https://x.y"}}"#
        );
        let page = r#"{"text":"a","clickEvent":{"action":"change_page","value":"3"}}"#;
        assert_eq!(
            run(page, 2004, 2105).0,
            r#"{"text":"a","click_event":{"action":"change_page","page":3}}"#
        );
    }

    #[test]
    fn show_item_snbt_is_migrated() {
        let json = r#"{"text":"a","hoverEvent":{"action":"show_item","value":"{id:\"minecraft:dye\",Damage:1s,Count:2b}"}}"#;
        let (out, _) = run(json, 1202, 1600);
        assert_eq!(
            out,
            r#"{"text":"a","hoverEvent":{"action":"show_item","contents":{"id":"minecraft:red_dye","count":2}}}"#
        );
    }

    #[test]
    fn plain_text_and_tags() {
        assert_eq!(from_plain("Bob \"B\""), r#""Bob \"B\"""#);
        assert_eq!(pack(&to_tag(r#"{"text":"a","bold":true}"#)), r#"{text:"a",bold:1b}"#);
        assert_eq!(to_tag(r#""a""#), Tag::string("a"));
    }
}
