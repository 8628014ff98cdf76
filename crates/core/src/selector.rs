//! Target selectors.
//!
//! 1.13 replaced the single-letter selector arguments with named ones and
//! joined min/max pairs into ranges. Modern selectors still carry entity
//! types and NBT filters that follow the entity and NBT renames.

use crate::context::Ctx;
use crate::nbt_update;
use crate::remap::{entities, ids, strip_namespace};
use crate::tokenize::{tokenize, tokenize_without_quotes};
use indexmap::IndexMap;
use mapshift_diagnostics::codes;

/// Names given to positional arguments (`@e[1,2,3,4]`).
const POSITIONAL: [&str; 4] = ["x", "y", "z", "r"];

/// Legacy arguments kept under the same name in 1.13.
const KEPT: [&str; 9] = ["x", "y", "z", "dx", "dy", "dz", "name", "team", "tag"];

/// A selector split into its variable and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parsed {
    head: String,
    args: Vec<(String, String)>,
}

impl Parsed {
    fn render(&self) -> String {
        if self.args.is_empty() {
            return self.head.clone();
        }
        let args: Vec<String> = self.args.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{}[{}]", self.head, args.join(","))
    }
}

fn parse(sel: &str, legacy: bool) -> Option<Parsed> {
    let (head, rest) = match sel.find('[') {
        Some(open) => (&sel[..open], Some(&sel[open..])),
        None => (sel, None),
    };
    if head.len() != 2 || !head.starts_with('@') {
        return None;
    }
    let mut args = Vec::new();
    if let Some(rest) = rest {
        let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
        let parts = if legacy {
            tokenize_without_quotes(inner, ',')
        } else {
            tokenize(inner, ',', true)
        };
        let mut position = 0;
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((k, v)) => args.push((k.trim().to_string(), v.trim().to_string())),
                None => {
                    let name = POSITIONAL.get(position)?;
                    args.push(((*name).to_string(), part.to_string()));
                    position += 1;
                }
            }
        }
    }
    Some(Parsed {
        head: head.to_string(),
        args,
    })
}

/// Migrate a selector. Player names, UUIDs and macros are returned
/// unchanged; so is anything that does not parse as a selector.
pub fn update(sel: &str, read: bool, ctx: &mut Ctx<'_>) -> String {
    if sel.contains("$(") || !sel.starts_with('@') {
        return sel.to_string();
    }
    let legacy = ctx.crosses(1202);
    let Some(mut parsed) = parse(sel, legacy) else {
        return sel.to_string();
    };
    if legacy {
        parsed.args = legacy_args(&parsed.head, std::mem::take(&mut parsed.args), ctx);
    }
    modern_args(&mut parsed.args, read, ctx);
    let out = parsed.render();
    if parse(sel, legacy).is_some_and(|p| p.render() == out) {
        sel.to_string()
    } else {
        out
    }
}

/// Convert the 1.12 argument list.
fn legacy_args(head: &str, args: Vec<(String, String)>, ctx: &mut Ctx<'_>) -> Vec<(String, String)> {
    let lookup: IndexMap<String, String> = args.iter().cloned().collect();
    let get = |k: &str| lookup.get(k).map(String::as_str);
    let mut out: Vec<(String, String)> = Vec::new();

    for (key, value) in &args {
        match key.as_str() {
            "r" | "rm" if !done("distance", &out) => {
                out.push(("distance".into(), range(get("rm"), get("r"))));
            }
            "l" | "lm" if !done("level", &out) => {
                out.push(("level".into(), range(get("lm"), get("l"))));
            }
            "rx" | "rxm" if !done("x_rotation", &out) => {
                out.push(("x_rotation".into(), range(get("rxm"), get("rx"))));
            }
            "ry" | "rym" if !done("y_rotation", &out) => {
                out.push(("y_rotation".into(), range(get("rym"), get("ry"))));
            }
            "r" | "rm" | "l" | "lm" | "rx" | "rxm" | "ry" | "rym" => {}
            "c" => {
                let count: i64 = value.parse().unwrap_or(1);
                out.push(("limit".into(), count.unsigned_abs().to_string()));
                match (head, count < 0) {
                    ("@p", true) => out.push(("sort".into(), "furthest".into())),
                    ("@e" | "@a", negative) => {
                        let order = if negative { "furthest" } else { "nearest" };
                        out.push(("sort".into(), order.into()));
                    }
                    _ => {}
                }
            }
            "m" => {
                let (negated, mode) = split_negation(value);
                out.push(("gamemode".into(), format!("{negated}{}", ids::gamemode(mode, ctx))));
            }
            "type" => out.push(("type".into(), value.clone())),
            k if k.starts_with("score_") => {
                if done("scores", &out) {
                    continue;
                }
                out.push(("scores".into(), legacy_scores(&args)));
            }
            k if KEPT.contains(&k) => out.push((key.clone(), value.clone())),
            _ => {
                ctx.diag(
                    codes::UNKNOWN_SELECTOR_ARGUMENT,
                    format!("selector argument `{key}={value}` kept as written"),
                );
                out.push((key.clone(), value.clone()));
            }
        }
    }
    out
}

fn done(name: &str, out: &[(String, String)]) -> bool {
    out.iter().any(|(k, _)| k == name)
}

/// `score_X_min` and `score_X` pairs folded into `{X=min..max}`.
fn legacy_scores(args: &[(String, String)]) -> String {
    let mut bounds: IndexMap<&str, (Option<&str>, Option<&str>)> = IndexMap::new();
    for (key, value) in args {
        let Some(name) = key.strip_prefix("score_") else {
            continue;
        };
        match name.strip_suffix("_min") {
            Some(objective) => bounds.entry(objective).or_default().0 = Some(value.as_str()),
            None => bounds.entry(name).or_default().1 = Some(value.as_str()),
        }
    }
    let parts: Vec<String> = bounds
        .iter()
        .map(|(objective, (min, max))| format!("{objective}={}", range(*min, *max)))
        .collect();
    format!("{{{}}}", parts.join(","))
}

fn range(min: Option<&str>, max: Option<&str>) -> String {
    match (min, max) {
        (Some(a), Some(b)) if a == b => a.to_string(),
        (Some(a), Some(b)) => format!("{a}..{b}"),
        (Some(a), None) => format!("{a}.."),
        (None, Some(b)) => format!("..{b}"),
        (None, None) => String::new(),
    }
}

fn split_negation(value: &str) -> (&'static str, &str) {
    match value.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", value),
    }
}

/// Entity types follow the entity renames; NBT filters are migrated as read
/// entity data of that type.
fn modern_args(args: &mut [(String, String)], read: bool, ctx: &mut Ctx<'_>) {
    let mut object_id = String::new();
    for (key, value) in args.iter_mut() {
        if key != "type" || value.contains("$(") {
            continue;
        }
        let (negated, id) = split_negation(value);
        let mut renamed = entities::rename(id, None, read, ctx);
        if !id.contains(':') {
            renamed = strip_namespace(&renamed).to_string();
        }
        if negated.is_empty() {
            object_id.clone_from(&renamed);
        }
        *value = format!("{negated}{renamed}");
    }
    for (key, value) in args.iter_mut() {
        if key != "nbt" {
            continue;
        }
        let (negated, nbt) = split_negation(value);
        let nbt = nbt_update::update_snbt(nbt, "entity", &object_id, read, ctx);
        *value = format!("{negated}{nbt}");
    }
}

/// Append an NBT filter to a selector (`@e[type=pig]` + `{NoAI:1b}`).
pub(crate) fn with_nbt(sel: &str, nbt: &str) -> String {
    if nbt.is_empty() {
        return sel.to_string();
    }
    match sel.strip_suffix(']') {
        Some(open) => format!("{open},nbt={nbt}]"),
        None => format!("{sel}[nbt={nbt}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn sel(text: &str, source: u16, target: u16) -> (String, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = update(text, true, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn names_and_uuids_pass_through() {
        assert_eq!(sel("Steve", 1202, 2105).0, "Steve");
        assert_eq!(sel("@s", 1202, 2105).0, "@s");
    }

    #[test]
    fn legacy_ranges_are_joined() {
        assert_eq!(sel("@e[r=10,rm=2]", 1202, 1300).0, "@e[distance=2..10]");
        assert_eq!(sel("@a[lm=5]", 1202, 1300).0, "@a[level=5..]");
        assert_eq!(sel("@a[score_kills_min=3,score_kills=3]", 1202, 1300).0, "@a[scores={kills=3}]");
    }

    #[test]
    fn count_becomes_limit_and_sort() {
        assert_eq!(sel("@e[c=1]", 1202, 1300).0, "@e[limit=1,sort=nearest]");
        assert_eq!(sel("@p[c=-2]", 1202, 1300).0, "@p[limit=2,sort=furthest]");
        assert_eq!(sel("@r[c=3]", 1202, 1300).0, "@r[limit=3]");
        assert_eq!(
            sel("@e[c=-9223372036854775808]", 1202, 1300).0,
            "@e[limit=9223372036854775808,sort=furthest]"
        );
    }

    #[test]
    fn positional_shorthand_is_named() {
        assert_eq!(sel("@e[1,2,3,4]", 1202, 1300).0, "@e[x=1,y=2,z=3,distance=..4]");
    }

    #[test]
    fn legacy_types_and_gamemodes() {
        assert_eq!(sel("@e[type=!Creeper,m=1]", 1202, 1300).0, "@e[type=!creeper,gamemode=creative]");
    }

    #[test]
    fn camel_case_types_are_lowercased_from_any_source() {
        assert_eq!(sel("@e[type=Creeper]", 1000, 2105).0, "@e[type=creeper]");
        assert_eq!(sel("@e[type=Creeper]", 1202, 2105).0, "@e[type=creeper]");
        assert_eq!(sel("@e[type=minecraft:Creeper]", 1202, 2105).0, "@e[type=minecraft:creeper]");
    }

    #[test]
    fn type_namespace_follows_the_input() {
        assert_eq!(sel("@e[type=pig]", 1300, 2105).0, "@e[type=pig]");
        assert_eq!(sel("@e[type=minecraft:pig]", 1300, 2105).0, "@e[type=minecraft:pig]");
    }

    #[test]
    fn unknown_argument_is_reported() {
        let (out, warnings) = sel("@e[foo=1]", 1202, 1300);
        assert_eq!(out, "@e[foo=1]");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn modern_nbt_follows_entity_renames() {
        assert_eq!(
            sel("@e[type=zombie_pigman,nbt={NoAI:1b}]", 1300, 1600).0,
            "@e[type=zombified_piglin,nbt={NoAI:1b}]"
        );
    }

    #[test]
    fn nbt_filters_are_appended() {
        assert_eq!(with_nbt("@e", "{a:1b}"), "@e[nbt={a:1b}]");
        assert_eq!(with_nbt("@e[type=pig]", "{a:1b}"), "@e[type=pig,nbt={a:1b}]");
    }
}
