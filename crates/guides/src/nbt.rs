//! NBT migration guide: per-context key rules and synthesized tags.
//!
//! ```jsonc
//! "entity": {
//!   "tags": {
//!     "Riding": { "max": 802, "edge_case": "riding" },
//!     "Passengers": { "list": { "source": "entity" } },
//!     "ActiveEffects": { "max": 2004, "rename": "active_effects", "list": { "source": "effect" } }
//!   },
//!   "necessary_tags": {
//!     "is_waxed": { "max": 1904, "when": { "object_id": ["**_sign"] }, "value": "1b" }
//!   }
//! }
//! ```

use crate::arg_type::{ArgType, NbtEdgeCase};
use crate::command::parse_gate;
use crate::pattern::Pattern;
use crate::version::Gate;
use crate::{GuideError, invalid, obj_field};
use indexmap::IndexMap;
use mapshift_nbt::Tag;
use serde_json::{Map, Value};

/// The NBT guide, keyed by source context (`entity`, `block`, `item`, ...).
#[derive(Debug, Clone, Default)]
pub struct NbtGuide {
    contexts: IndexMap<String, TagsGuide>,
}

impl NbtGuide {
    /// The guide for a source context.
    pub fn context(&self, name: &str) -> Option<&TagsGuide> {
        self.contexts.get(name)
    }

    /// Context names in declared order.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, GuideError> {
        let Value::Object(map) = value else {
            return Err(invalid("$", "NBT guide must be an object"));
        };
        let mut contexts = IndexMap::with_capacity(map.len());
        for (name, body) in map {
            let obj = body
                .as_object()
                .ok_or_else(|| invalid(name, "context must be an object"))?;
            contexts.insert(name.clone(), parse_tags_guide(obj, name)?);
        }
        let guide = Self { contexts };
        guide.check_sources()?;
        Ok(guide)
    }

    fn check_sources(&self) -> Result<(), GuideError> {
        fn walk(guide: &NbtGuide, tags: &TagsGuide, path: &str) -> Result<(), GuideError> {
            for (key, rules) in &tags.entries {
                for rule in rules {
                    if let Some(action) = &rule.action {
                        walk_action(guide, action, &format!("{path}.{key}"))?;
                    }
                }
            }
            Ok(())
        }
        fn walk_action(guide: &NbtGuide, action: &Action, path: &str) -> Result<(), GuideError> {
            match action {
                Action::Source(ctx) if guide.context(ctx).is_none() => Err(GuideError::UnknownName {
                    path: path.to_string(),
                    kind: "NBT source context",
                    name: ctx.clone(),
                }),
                Action::List(inner) => walk_action(guide, inner, path),
                Action::Tags(inner) => walk(guide, inner, path),
                _ => Ok(()),
            }
        }
        for (name, tags) in &self.contexts {
            walk(self, tags, name)?;
        }
        Ok(())
    }
}

/// Rules for the keys of one compound.
#[derive(Debug, Clone, Default)]
pub struct TagsGuide {
    /// Key rules, each list sorted by increasing `max` (unbounded last).
    pub entries: IndexMap<String, Vec<TagRule>>,
    /// Keys synthesized after the pass when absent.
    pub necessary: IndexMap<String, NecessaryTag>,
}

impl TagsGuide {
    /// Rules for `key`, empty when the key is not in the guide.
    pub fn rules(&self, key: &str) -> &[TagRule] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }
}

/// One rule for a compound key.
#[derive(Debug, Clone)]
pub struct TagRule {
    /// When the rule applies.
    pub gate: Gate,
    /// New key name.
    pub rename: Option<String>,
    /// Drop the key.
    pub remove: bool,
    /// What to do with the value.
    pub action: Option<Action>,
}

/// Value treatment.
#[derive(Debug, Clone)]
pub enum Action {
    /// Recurse with another context's guide.
    Source(String),
    /// Apply the inner action to every list element.
    List(Box<Action>),
    /// Recurse with an inline guide.
    Tags(Box<TagsGuide>),
    /// Run the value through a converter.
    Convert(ArgType),
    /// Hand-written rule with the parent compound in scope.
    EdgeCase(NbtEdgeCase),
}

/// A tag added when absent.
#[derive(Debug, Clone)]
pub struct NecessaryTag {
    /// When the tag is due.
    pub gate: Gate,
    /// Additional condition on the compound.
    pub when: Condition,
    /// Value inserted.
    pub value: Tag,
}

/// Condition for a necessary tag; all present parts must hold.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    /// Object id must match one of these patterns.
    pub object_id: Vec<Pattern>,
    /// Sibling key that must be present.
    pub key: Option<String>,
    /// Value the sibling key must equal.
    pub equals: Option<Tag>,
}

impl Condition {
    /// Evaluate against the object id and the compound being updated.
    pub fn holds(&self, object_id: &str, compound: &mapshift_nbt::Compound) -> bool {
        if !self.object_id.is_empty() && !self.object_id.iter().any(|p| p.matches(object_id)) {
            return false;
        }
        match (&self.key, &self.equals) {
            (Some(key), Some(expected)) => compound.get(key) == Some(expected),
            (Some(key), None) => compound.contains_key(key),
            _ => true,
        }
    }
}

fn parse_tags_guide(obj: &Map<String, Value>, path: &str) -> Result<TagsGuide, GuideError> {
    let mut guide = TagsGuide::default();
    for key in obj.keys() {
        if key != "tags" && key != "necessary_tags" {
            return Err(invalid(path, format!("unexpected field `{key}`")));
        }
    }
    if let Some(tags) = obj_field(obj, "tags") {
        let tags = tags
            .as_object()
            .ok_or_else(|| invalid(path, "`tags` must be an object"))?;
        for (key, rules) in tags {
            let here = format!("{path}.{key}");
            let mut parsed = match rules {
                Value::Array(list) => list
                    .iter()
                    .map(|r| parse_rule(r, &here))
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![parse_rule(single, &here)?],
            };
            parsed.sort_by_key(|r| r.gate.sort_key());
            guide.entries.insert(key.clone(), parsed);
        }
    }
    if let Some(necessary) = obj_field(obj, "necessary_tags") {
        let necessary = necessary
            .as_object()
            .ok_or_else(|| invalid(path, "`necessary_tags` must be an object"))?;
        for (key, spec) in necessary {
            let here = format!("{path}.necessary_tags.{key}");
            guide.necessary.insert(key.clone(), parse_necessary(spec, &here)?);
        }
    }
    Ok(guide)
}

fn parse_rule(value: &Value, path: &str) -> Result<TagRule, GuideError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(path, "rule must be an object"))?;
    let gate = parse_gate(obj, path)?;
    let rename = obj_field(obj, "rename")
        .map(|v| v.as_str().map(str::to_string).ok_or_else(|| invalid(path, "`rename` must be a string")))
        .transpose()?;
    let remove = obj_field(obj, "remove").and_then(Value::as_bool).unwrap_or(false);
    let action = parse_action(obj, path)?;
    if rename.is_none() && !remove && action.is_none() {
        return Err(invalid(path, "rule does nothing"));
    }
    Ok(TagRule {
        gate,
        rename,
        remove,
        action,
    })
}

fn parse_action(obj: &Map<String, Value>, path: &str) -> Result<Option<Action>, GuideError> {
    const KINDS: [&str; 5] = ["source", "list", "tags", "convert", "edge_case"];
    let present: Vec<&str> = KINDS.iter().copied().filter(|k| obj.contains_key(*k)).collect();
    let kind = match present.as_slice() {
        [] => return Ok(None),
        [one] => *one,
        _ => return Err(invalid(path, format!("rule has several actions: {present:?}"))),
    };
    let body = &obj[kind];
    let action = match kind {
        "source" => Action::Source(
            body.as_str()
                .ok_or_else(|| invalid(path, "`source` must be a context name"))?
                .to_string(),
        ),
        "list" => {
            let inner = body
                .as_object()
                .ok_or_else(|| invalid(path, "`list` must be an action object"))?;
            let inner = parse_action(inner, &format!("{path}.list"))?
                .ok_or_else(|| invalid(path, "`list` has no action"))?;
            Action::List(Box::new(inner))
        }
        "tags" => {
            let mut wrapper = Map::new();
            wrapper.insert("tags".into(), body.clone());
            if let Some(n) = obj_field(obj, "necessary_tags") {
                wrapper.insert("necessary_tags".into(), n.clone());
            }
            Action::Tags(Box::new(parse_tags_guide(&wrapper, path)?))
        }
        "convert" => Action::Convert(serde_json::from_value(body.clone()).map_err(|_| {
            GuideError::UnknownName {
                path: path.to_string(),
                kind: "argument type",
                name: body.to_string(),
            }
        })?),
        _ => Action::EdgeCase(serde_json::from_value(body.clone()).map_err(|_| {
            GuideError::UnknownName {
                path: path.to_string(),
                kind: "NBT edge case",
                name: body.to_string(),
            }
        })?),
    };
    Ok(Some(action))
}

fn parse_necessary(value: &Value, path: &str) -> Result<NecessaryTag, GuideError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(path, "necessary tag must be an object"))?;
    let gate = parse_gate(obj, path)?;
    let snbt = |v: &Value, field: &str| -> Result<Tag, GuideError> {
        let text = v
            .as_str()
            .ok_or_else(|| invalid(path, format!("`{field}` must be SNBT text")))?;
        mapshift_nbt::unpack(text).map_err(|source| GuideError::Snbt {
            path: format!("{path}.{field}"),
            source,
        })
    };
    let value = snbt(
        obj_field(obj, "value").ok_or_else(|| invalid(path, "missing `value`"))?,
        "value",
    )?;
    let mut when = Condition::default();
    if let Some(cond) = obj_field(obj, "when") {
        let cond = cond
            .as_object()
            .ok_or_else(|| invalid(path, "`when` must be an object"))?;
        if let Some(ids) = obj_field(cond, "object_id") {
            let ids = ids
                .as_array()
                .ok_or_else(|| invalid(path, "`object_id` must be an array"))?;
            for id in ids {
                let id = id
                    .as_str()
                    .ok_or_else(|| invalid(path, "object id patterns must be strings"))?;
                when.object_id.push(Pattern::parse(id).map_err(|reason| {
                    GuideError::InvalidWildcard {
                        path: path.to_string(),
                        reason,
                    }
                })?);
            }
        }
        when.key = obj_field(cond, "key").and_then(Value::as_str).map(str::to_string);
        when.equals = obj_field(cond, "equals").map(|v| snbt(v, "equals")).transpose()?;
        if when.equals.is_some() && when.key.is_none() {
            return Err(invalid(path, "`equals` needs `key`"));
        }
    }
    Ok(NecessaryTag { gate, when, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_nbt_guide;
    use crate::version::Version;

    const GUIDE: &str = r#"{
      "entity": {
        "tags": {
          "Riding": { "max": 802, "edge_case": "riding" },
          "Passengers": { "list": { "source": "entity" } },
          "CustomName": [
            { "edge_case": "text_component" },
            { "max": 1202, "convert": "literal" }
          ]
        },
        "necessary_tags": {
          "is_waxed": { "max": 1904, "when": { "object_id": ["**_sign"] }, "value": "1b" }
        }
      }
    }"#;

    #[test]
    fn rules_sorted_by_max_unbounded_last() {
        let guide = load_nbt_guide(GUIDE).unwrap();
        let rules = guide.context("entity").unwrap().rules("CustomName");
        assert_eq!(rules[0].gate.max, Some(Version::new(1202)));
        assert_eq!(rules[1].gate.max, None);
    }

    #[test]
    fn necessary_tag_value_is_parsed() {
        let guide = load_nbt_guide(GUIDE).unwrap();
        let tag = &guide.context("entity").unwrap().necessary["is_waxed"];
        assert_eq!(tag.value, mapshift_nbt::unpack("1b").unwrap());
        assert!(tag.when.holds("minecraft:oak_sign", &Default::default()));
        assert!(!tag.when.holds("minecraft:chest", &Default::default()));
    }

    #[test]
    fn unknown_source_context_is_an_error() {
        let err = load_nbt_guide(r#"{"entity": {"tags": {"Item": {"source": "itme"}}}}"#).unwrap_err();
        assert!(matches!(err, GuideError::UnknownName { kind: "NBT source context", .. }), "{err}");
    }

    #[test]
    fn rule_with_two_actions_is_an_error() {
        let err = load_nbt_guide(
            r#"{"entity": {"tags": {"Item": {"source": "entity", "convert": "item"}}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("several actions"), "{err}");
    }

    #[test]
    fn empty_rule_is_an_error() {
        assert!(load_nbt_guide(r#"{"entity": {"tags": {"Item": {"max": 1202}}}}"#).is_err());
    }
}
