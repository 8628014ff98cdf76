//! Command grammar guide: the typed tree walked by the dispatch engine.
//!
//! Guide documents are JSONC objects keyed by root literal. Each value is a
//! node object with exactly one of `branch`, `mapping`, `versions` or
//! `edge_case`:
//!
//! ```jsonc
//! "give": { "versions": [
//!   { "max": 1202, "node": { "mapping": {
//!       "output": ["give", "$target", "$item", "$count"],
//!       "args": { "target": { "type": "selector" },
//!                 "item": { "type": "legacy_item" },
//!                 "count": { "type": "literal" } },
//!       "legend": { "target": 1, "item": [2, 4, 5], "count": 3 } } } },
//!   { "node": { "edge_case": "unsupported" } } ] }
//! ```

use crate::arg_type::{ArgType, CommandEdgeCase};
use crate::pattern::Pattern;
use crate::version::{Gate, Versioned};
use crate::{GuideError, invalid, obj_field};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// The whole command grammar, keyed by root literal.
#[derive(Debug, Clone, Default)]
pub struct CommandGuide {
    roots: IndexMap<String, Node>,
}

impl CommandGuide {
    /// The node for a root literal.
    pub fn root(&self, literal: &str) -> Option<&Node> {
        self.roots.get(literal)
    }

    /// Root literals in declared order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Number of root commands.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the guide declares no commands.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, GuideError> {
        let Value::Object(map) = value else {
            return Err(invalid("$", "command guide must be an object"));
        };
        let mut roots = IndexMap::with_capacity(map.len());
        for (root, node) in map {
            roots.insert(root.clone(), Node::from_value(node, root)?);
        }
        Ok(Self { roots })
    }
}

/// One guide node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Dispatch on a token.
    Branch(Box<Branch>),
    /// Project tokens into typed slots.
    Mapping(Box<Mapping>),
    /// First arm whose gate applies.
    Versions(Vec<Versioned<Node>>),
    /// Hand-written handler.
    EdgeCase(CommandEdgeCase),
}

/// Token dispatch.
#[derive(Debug, Clone)]
pub struct Branch {
    /// Token position inspected.
    pub index: usize,
    /// Literal arms.
    pub exact: IndexMap<String, Node>,
    /// Wildcard arms in declared order.
    pub wildcards: Vec<(Pattern, Node)>,
    /// Fallback when no key matches.
    pub otherwise: Option<Node>,
    /// Arm taken when the token does not exist.
    pub absent: Option<Node>,
}

impl Branch {
    /// Resolve the arm for `token` (`None` when the position is past the end).
    pub fn arm(&self, token: Option<&str>) -> Option<&Node> {
        let Some(token) = token else {
            return self.absent.as_ref().or(self.otherwise.as_ref());
        };
        if let Some(node) = self.exact.get(token) {
            return Some(node);
        }
        self.wildcards
            .iter()
            .find(|(pattern, _)| pattern.matches(token))
            .map(|(_, node)| node)
            .or(self.otherwise.as_ref())
    }
}

/// Output projection.
#[derive(Debug, Clone)]
pub struct Mapping {
    /// Output tokens in order.
    pub output: Vec<OutputPart>,
    /// Declared slots.
    pub args: IndexMap<String, ArgSpec>,
    /// Where each slot reads its raw value from.
    pub legend: Legend,
}

/// A piece of mapping output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPart {
    /// Emitted verbatim.
    Literal(String),
    /// Replaced by the converted slot value (dropped when empty).
    Slot(String),
}

/// Slot declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    /// Converter selection.
    pub ty: ArgType,
    /// Literal used when the source token is missing.
    pub default: Option<String>,
    /// An earlier slot whose converted value is this slot's object id.
    pub with: Option<String>,
}

/// Slot-to-source tables.
#[derive(Debug, Clone)]
pub enum Legend {
    /// One table for every version.
    Fixed(IndexMap<String, Source>),
    /// First table whose gate applies.
    Versioned(Vec<Versioned<IndexMap<String, Source>>>),
}

/// Where a slot's raw value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// One token.
    Index(usize),
    /// Tokens `from..=to` joined by single spaces (`to = None`: to the end).
    Range {
        /// First token.
        from: usize,
        /// Last token, inclusive.
        to: Option<usize>,
    },
    /// Several raw values handed to one converter.
    Group(Vec<Source>),
}

impl Node {
    fn from_value(value: &Value, path: &str) -> Result<Self, GuideError> {
        let Value::Object(obj) = value else {
            return Err(invalid(path, "node must be an object"));
        };
        if obj.len() != 1 {
            return Err(invalid(
                path,
                "node must have exactly one of `branch`, `mapping`, `versions`, `edge_case`",
            ));
        }
        let (kind, body) = obj.iter().next().ok_or_else(|| invalid(path, "empty node"))?;
        let here = format!("{path}.{kind}");
        match kind.as_str() {
            "branch" => Ok(Node::Branch(Box::new(parse_branch(body, &here)?))),
            "mapping" => Ok(Node::Mapping(Box::new(parse_mapping(body, &here)?))),
            "versions" => parse_versions(body, &here).map(Node::Versions),
            "edge_case" => {
                let edge = serde_json::from_value(body.clone()).map_err(|_| GuideError::UnknownName {
                    path: here.clone(),
                    kind: "command edge case",
                    name: body.to_string(),
                })?;
                Ok(Node::EdgeCase(edge))
            }
            other => Err(invalid(path, format!("unknown node kind `{other}`"))),
        }
    }
}

fn parse_branch(value: &Value, path: &str) -> Result<Branch, GuideError> {
    let obj = as_object(value, path)?;
    let index = obj_field(obj, "index")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid(path, "branch needs a non-negative `index`"))? as usize;
    let mut exact = IndexMap::new();
    let mut wildcards = Vec::new();
    if let Some(keys) = obj_field(obj, "keys") {
        for (key, node) in as_object(keys, path)? {
            let here = format!("{path}.keys.{key}");
            let pattern = Pattern::parse(key).map_err(|reason| GuideError::InvalidWildcard {
                path: here.clone(),
                reason,
            })?;
            let node = Node::from_value(node, &here)?;
            match pattern {
                Pattern::Exact(k) => {
                    exact.insert(k, node);
                }
                wild => wildcards.push((wild, node)),
            }
        }
    }
    let otherwise = obj_field(obj, "else")
        .map(|n| Node::from_value(n, &format!("{path}.else")))
        .transpose()?;
    let absent = obj_field(obj, "absent")
        .map(|n| Node::from_value(n, &format!("{path}.absent")))
        .transpose()?;
    if exact.is_empty() && wildcards.is_empty() && otherwise.is_none() && absent.is_none() {
        return Err(invalid(path, "branch has no arms"));
    }
    Ok(Branch {
        index,
        exact,
        wildcards,
        otherwise,
        absent,
    })
}

fn parse_mapping(value: &Value, path: &str) -> Result<Mapping, GuideError> {
    let obj = as_object(value, path)?;

    let mut args = IndexMap::new();
    if let Some(raw_args) = obj_field(obj, "args") {
        for (name, spec) in as_object(raw_args, path)? {
            let here = format!("{path}.args.{name}");
            let spec_obj = as_object(spec, &here)?;
            let ty_value = obj_field(spec_obj, "type").ok_or_else(|| invalid(&here, "missing `type`"))?;
            let ty: ArgType = serde_json::from_value(ty_value.clone()).map_err(|_| GuideError::UnknownName {
                path: here.clone(),
                kind: "argument type",
                name: ty_value.to_string(),
            })?;
            let default = obj_field(spec_obj, "default").map(value_as_literal);
            let with = obj_field(spec_obj, "with")
                .map(|w| w.as_str().map(str::to_string).ok_or_else(|| invalid(&here, "`with` must be a slot name")))
                .transpose()?;
            args.insert(name.clone(), ArgSpec { ty, default, with });
        }
    }

    let raw_output = obj_field(obj, "output")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(path, "mapping needs an `output` array"))?;
    let mut output = Vec::with_capacity(raw_output.len());
    for part in raw_output {
        let text = part
            .as_str()
            .ok_or_else(|| invalid(path, "output entries must be strings"))?;
        match text.strip_prefix('$') {
            Some(slot) if !slot.is_empty() && !slot.starts_with('(') => {
                if !args.contains_key(slot) {
                    return Err(invalid(path, format!("output references undeclared slot `{slot}`")));
                }
                output.push(OutputPart::Slot(slot.to_string()));
            }
            _ => output.push(OutputPart::Literal(text.to_string())),
        }
    }

    // `with` must name a slot converted earlier in output order.
    for (name, spec) in &args {
        let Some(with) = &spec.with else { continue };
        let pos = |n: &str| output.iter().position(|p| matches!(p, OutputPart::Slot(s) if s == n));
        match (pos(with), pos(name)) {
            (Some(w), Some(s)) if w < s => {}
            _ => {
                return Err(invalid(
                    path,
                    format!("slot `{name}` uses `with: {with}` which is not an earlier output slot"),
                ));
            }
        }
    }

    let legend = match obj_field(obj, "legend") {
        None => Legend::Fixed(IndexMap::new()),
        Some(Value::Array(entries)) => {
            let mut versioned = Vec::with_capacity(entries.len());
            for (i, entry) in entries.iter().enumerate() {
                let here = format!("{path}.legend[{i}]");
                let entry_obj = as_object(entry, &here)?;
                let gate = parse_gate(entry_obj, &here)?;
                let map = obj_field(entry_obj, "map").ok_or_else(|| invalid(&here, "missing `map`"))?;
                versioned.push(Versioned {
                    gate,
                    value: parse_legend_map(map, &args, &here)?,
                });
            }
            Legend::Versioned(versioned)
        }
        Some(map) => Legend::Fixed(parse_legend_map(map, &args, &format!("{path}.legend"))?),
    };

    Ok(Mapping { output, args, legend })
}

fn parse_legend_map(
    value: &Value,
    args: &IndexMap<String, ArgSpec>,
    path: &str,
) -> Result<IndexMap<String, Source>, GuideError> {
    let mut map = IndexMap::new();
    for (slot, source) in as_object(value, path)? {
        if !args.contains_key(slot) {
            return Err(invalid(path, format!("legend references undeclared slot `{slot}`")));
        }
        map.insert(slot.clone(), parse_source(source, &format!("{path}.{slot}"), true)?);
    }
    Ok(map)
}

fn parse_source(value: &Value, path: &str, allow_group: bool) -> Result<Source, GuideError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|i| Source::Index(i as usize))
            .ok_or_else(|| invalid(path, "token index must be a non-negative integer")),
        Value::Array(members) if allow_group => members
            .iter()
            .map(|m| parse_source(m, path, false))
            .collect::<Result<Vec<_>, _>>()
            .map(Source::Group),
        Value::Object(obj) => {
            let from = obj_field(obj, "from")
                .and_then(Value::as_u64)
                .ok_or_else(|| invalid(path, "range needs `from`"))? as usize;
            let to = obj_field(obj, "to").and_then(Value::as_u64).map(|t| t as usize);
            if to.is_some_and(|t| t < from) {
                return Err(invalid(path, "range `to` precedes `from`"));
            }
            Ok(Source::Range { from, to })
        }
        _ => Err(invalid(path, "source must be an index, a group or a range")),
    }
}

fn parse_versions(value: &Value, path: &str) -> Result<Vec<Versioned<Node>>, GuideError> {
    let entries = value
        .as_array()
        .ok_or_else(|| invalid(path, "`versions` must be an array"))?;
    let mut arms = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let here = format!("{path}[{i}]");
        let obj = as_object(entry, &here)?;
        let gate = parse_gate(obj, &here)?;
        let node = obj_field(obj, "node").ok_or_else(|| invalid(&here, "missing `node`"))?;
        arms.push(Versioned {
            gate,
            value: Node::from_value(node, &format!("{here}.node"))?,
        });
    }
    if arms.is_empty() {
        return Err(invalid(path, "`versions` has no arms"));
    }
    Ok(arms)
}

pub(crate) fn parse_gate(obj: &Map<String, Value>, path: &str) -> Result<Gate, GuideError> {
    let bound = |key: &str| -> Result<_, GuideError> {
        obj_field(obj, key)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|e| GuideError::InvalidVersion {
                    path: format!("{path}.{key}"),
                    reason: e.to_string(),
                })
            })
            .transpose()
    };
    Ok(Gate {
        min: bound("min")?,
        max: bound("max")?,
    })
}

fn as_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>, GuideError> {
    value.as_object().ok_or_else(|| invalid(path, "expected an object"))
}

fn value_as_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
