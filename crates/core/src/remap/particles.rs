//! Particle ids and their parameters.

use super::blocks::{self, BlockDescriptor};
use super::items::{self, ItemDescriptor};
use super::{load_table, namespaced, strip_namespace};
use crate::context::Ctx;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use mapshift_nbt::{Tag, pack};
use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
struct ParticleTables {
    legacy: IndexMap<String, String>,
    block_marker: Vec<String>,
    options: IndexMap<String, Vec<String>>,
}

static TABLES: LazyLock<ParticleTables> =
    LazyLock::new(|| load_table("particles.jsonc", include_str!("../../data/particles.jsonc")));

const DEFAULT_DUST: [&str; 4] = ["1.0", "0.0", "0.0", "1.0"];
const DEFAULT_EFFECT_COLOR: &str = "{color:[1.0,1.0,1.0,1.0]}";

/// Migrate a particle id and its positional parameters. Returns the particle
/// argument text: the id followed by its parameters, or by an option
/// compound once the target reads those.
pub fn update(name: &str, params: &[String], ctx: &mut Ctx<'_>) -> String {
    if name.contains("$(") || name.contains('{') || params.iter().any(|p| p.contains("$(")) {
        return join(name, params);
    }
    let mut path = strip_namespace(name).to_string();
    let mut params = params.to_vec();

    if ctx.crosses(1202) && !name.contains(':') {
        let Some(modern) = TABLES.legacy.get(&path) else {
            ctx.diag(codes::UNKNOWN_LEGACY_ID, format!("unknown particle {name}; kept as is"));
            return join(name, &params);
        };
        params = legacy_params(modern, &params, ctx);
        path.clone_from(modern);
    }
    if ctx.crosses(1605) && TABLES.block_marker.contains(&path) {
        params = vec![namespaced(&path)];
        path = "block_marker".into();
    }
    if ctx.crosses(2004) {
        if path == "ambient_entity_effect" {
            path = "entity_effect".into();
        }
        if path == "entity_effect" && params.is_empty() {
            return format!("{}{DEFAULT_EFFECT_COLOR}", namespaced(&path));
        }
        if let Some(keys) = TABLES.options.get(&path)
            && !params.is_empty()
        {
            return format!("{}{}", namespaced(&path), options(keys, &params));
        }
    }
    join(&namespaced(&path), &params)
}

fn join(name: &str, params: &[String]) -> String {
    let mut out = name.to_string();
    for p in params {
        out.push(' ');
        out.push_str(p);
    }
    out
}

/// 1.12 packed block (`id + data * 4096`) and item (`id data`) parameters.
fn legacy_params(modern: &str, params: &[String], ctx: &mut Ctx<'_>) -> Vec<String> {
    let int = |i: usize| params.get(i).and_then(|p| p.parse::<i32>().ok());
    match modern {
        "dust" => DEFAULT_DUST.iter().map(|s| s.to_string()).collect(),
        "block" | "falling_dust" => {
            let packed = int(0).unwrap_or(0);
            let desc = BlockDescriptor {
                data: Some(packed >> 12),
                ..BlockDescriptor::new((packed & 4095).to_string())
            };
            vec![blocks::update(desc, ctx).render()]
        }
        "item" => {
            let desc = ItemDescriptor {
                data: int(1),
                ..ItemDescriptor::new(params.first().map_or("stone", String::as_str))
            };
            vec![items::update(desc, ctx).render()]
        }
        _ => Vec::new(),
    }
}

fn options(keys: &[String], params: &[String]) -> String {
    let mut values = params.iter();
    let mut parts = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(key) = key.strip_suffix("[3]") {
            let list: Vec<&str> = values.by_ref().take(3).map(String::as_str).collect();
            if list.len() < 3 {
                break;
            }
            parts.push(format!("{key}:[{}]", list.join(",")));
        } else if let Some(key) = key.strip_prefix('$') {
            let Some(value) = values.next() else { break };
            parts.push(format!("{key}:{}", pack(&Tag::string(value.as_str()))));
        } else {
            let Some(value) = values.next() else { break };
            parts.push(format!("{key}:{value}"));
        }
    }
    format!("{{{}}}", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn run(name: &str, params: &[&str], source: u16, target: u16) -> String {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        update(name, &params, &mut ctx)
    }

    #[test]
    fn legacy_names_and_parameters() {
        assert_eq!(run("hugeexplosion", &[], 1202, 1300), "minecraft:explosion_emitter");
        assert_eq!(run("reddust", &[], 1202, 1300), "minecraft:dust 1.0 0.0 0.0 1.0");
        assert_eq!(run("blockcrack", &["4097"], 1202, 1300), "minecraft:block minecraft:granite");
        assert_eq!(run("iconcrack", &["351", "4"], 1202, 1300), "minecraft:item minecraft:lapis_lazuli");
    }

    #[test]
    fn light_and_barrier_become_block_markers() {
        assert_eq!(run("minecraft:barrier", &[], 1300, 1700), "minecraft:block_marker minecraft:barrier");
        assert_eq!(run("minecraft:barrier", &[], 1300, 1605), "minecraft:barrier");
    }

    #[test]
    fn option_compounds_from_1_20_5() {
        assert_eq!(
            run("reddust", &[], 1202, 2105),
            "minecraft:dust{color:[1.0,0.0,0.0],scale:1.0}"
        );
        assert_eq!(
            run("minecraft:block", &["minecraft:stone"], 2004, 2105),
            r#"minecraft:block{block_state:"minecraft:stone"}"#
        );
        assert_eq!(
            run("minecraft:ambient_entity_effect", &[], 2004, 2105),
            "minecraft:entity_effect{color:[1.0,1.0,1.0,1.0]}"
        );
    }

    #[test]
    fn modern_forms_are_stable() {
        let modern = r#"minecraft:dust{color:[1.0,0.0,0.0],scale:1.0}"#;
        assert_eq!(run(modern, &[], 2004, 2105), modern);
        assert_eq!(run("minecraft:flame", &[], 1202, 2105), "minecraft:flame");
    }
}
