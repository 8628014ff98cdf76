//! Grammar dispatch: walks the command guide over a tokenized line.
//!
//! A line is split into tokens, the root literal picks a guide node, and the
//! node tree is walked: branches select on a token, mappings project tokens
//! into converted slots, version arms translate one era at a time. When a
//! version arm bounded by `max = N` is taken, the rewritten line is
//! dispatched again as a line of era `N + 1` until no arm advances it.

mod execute;
pub(crate) mod fixups;
pub(crate) mod issues;

use crate::context::Ctx;
use crate::convert::{self, Input};
use crate::tokenize::tokenize;
use indexmap::IndexMap;
use mapshift_diagnostics::codes;
use mapshift_guides::{CommandEdgeCase, Legend, Mapping, Node, OutputPart, Source, Version, Versioned, select};

/// Migrate one line of a function file. Blank lines and comments are kept;
/// a macro line keeps its `$` and a command keeps its leading `/`.
pub(crate) fn update_line(line: &str, ctx: &mut Ctx<'_>) -> String {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return line.to_string();
    }
    let indent = &line[..line.len() - trimmed.len()];
    let (prefix, body) = if let Some(rest) = trimmed.strip_prefix('$') {
        ("$", rest)
    } else if let Some(rest) = trimmed.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", trimmed)
    };
    let out = update_nested(body.trim_end(), ctx);
    let out = fixups::apply(&out, ctx);
    format!("{indent}{prefix}{out}")
}

/// Migrate a command that appears inside another value (`execute ... run`,
/// a click event). The re-dispatch loop runs to completion here; the caller's
/// era is restored afterwards.
pub(crate) fn update_nested(line: &str, ctx: &mut Ctx<'_>) -> String {
    if line.trim().is_empty() {
        return line.to_string();
    }
    let saved_source = ctx.source;
    let saved_advance = ctx.advanced_to.take();
    let limit = ctx.engine().pass_limit();
    let mut line = line.to_string();
    let mut passes = 0;
    loop {
        ctx.advanced_to = None;
        line = dispatch(&line, ctx);
        passes += 1;
        let Some(next) = ctx.advanced_to.take() else {
            break;
        };
        if next >= ctx.target || next <= ctx.source {
            break;
        }
        if passes >= limit {
            ctx.diag(
                codes::PASS_LIMIT,
                format!("stopped after {passes} passes at {next}; `{line}` may be partly migrated"),
            );
            break;
        }
        tracing::trace!(from = %ctx.source, to = %next, "re-dispatching");
        ctx.source = next;
    }
    ctx.source = saved_source;
    ctx.advanced_to = saved_advance;
    line
}

/// One pass over `line` in the current era.
fn dispatch(line: &str, ctx: &mut Ctx<'_>) -> String {
    let mut tokens = tokenize(line, ' ', true);
    tokens.retain(|t| !t.is_empty());
    let Some(root) = tokens.first() else {
        return line.to_string();
    };
    let literal = root.to_ascii_lowercase();
    let engine = ctx.engine();
    let Some(node) = engine.commands().root(literal.strip_prefix("minecraft:").unwrap_or(&literal)) else {
        ctx.diag(codes::UNKNOWN_COMMAND, format!("no guide for `{root}`; kept `{line}`"));
        return tokens.join(" ");
    };
    transform(&tokens, node, ctx)
}

/// Which arm of a version list a line takes.
enum Arm<'n> {
    /// Translate with this node; `Some(max)` when the arm ends an era.
    Take(&'n Node, Option<Version>),
    /// The source era is still current at the target; keep the line.
    InEra,
}

/// The arm describing the syntax of the source era.
fn pick_arm<'n>(arms: &'n [Versioned<Node>], ctx: &Ctx<'_>) -> Option<Arm<'n>> {
    for arm in arms {
        if arm.gate.min.is_some_and(|min| ctx.source < min) {
            continue;
        }
        match arm.gate.max {
            Some(max) if ctx.source <= max => {
                return Some(if ctx.target > max {
                    Arm::Take(&arm.value, Some(max))
                } else {
                    Arm::InEra
                });
            }
            Some(_) => {}
            None => return Some(Arm::Take(&arm.value, None)),
        }
    }
    None
}

/// Walk `node` over `tokens`.
pub(crate) fn transform(tokens: &[String], node: &Node, ctx: &mut Ctx<'_>) -> String {
    match node {
        Node::Branch(branch) => {
            let token = tokens.get(branch.index).map(String::as_str);
            match branch.arm(token) {
                Some(next) => transform(tokens, next, ctx),
                None => {
                    ctx.diag(
                        codes::UNMATCHED_BRANCH,
                        format!("no arm for `{}` at token {}", token.unwrap_or(""), branch.index),
                    );
                    tokens.join(" ")
                }
            }
        }
        Node::Mapping(mapping) => map_tokens(tokens, mapping, ctx),
        Node::Versions(arms) => match pick_arm(arms, ctx) {
            Some(Arm::Take(next, None)) => transform(tokens, next, ctx),
            Some(Arm::Take(next, Some(max))) => {
                let era = max.next();
                ctx.advanced_to = Some(ctx.advanced_to.map_or(era, |a| a.min(era)));
                ctx.with_target(era, |ctx| transform(tokens, next, ctx))
            }
            Some(Arm::InEra) => tokens.join(" "),
            None => {
                ctx.diag(
                    codes::UNMATCHED_BRANCH,
                    format!("no version arm for {} in `{}`", ctx.source, tokens.join(" ")),
                );
                tokens.join(" ")
            }
        },
        Node::EdgeCase(case) => match case {
            CommandEdgeCase::LegacyExecute => execute::legacy(tokens, ctx),
            CommandEdgeCase::Execute => execute::modern(tokens, ctx),
            CommandEdgeCase::Unsupported => {
                let line = tokens.join(" ");
                ctx.diag(
                    codes::UNSUPPORTED_COMMAND,
                    format!("`{}` has no equivalent in {}; kept as written", tokens[0], ctx.target),
                );
                line
            }
        },
    }
}

/// Raw values of a slot source; `None` when its first token is missing.
/// Group members stop at the first missing token.
fn resolve(source: &Source, tokens: &[String]) -> Option<Vec<String>> {
    match source {
        Source::Index(i) => tokens.get(*i).map(|t| vec![t.clone()]),
        Source::Range { from, to } => {
            if *from >= tokens.len() {
                return None;
            }
            let end = to.map_or(tokens.len(), |t| (t + 1).min(tokens.len()));
            Some(vec![tokens[*from..end].join(" ")])
        }
        Source::Group(members) => {
            let values: Vec<String> = members
                .iter()
                .map_while(|m| resolve(m, tokens))
                .flatten()
                .collect();
            (!values.is_empty()).then_some(values)
        }
    }
}

fn legend<'m>(mapping: &'m Mapping, ctx: &Ctx<'_>) -> Option<&'m IndexMap<String, Source>> {
    match &mapping.legend {
        Legend::Fixed(map) => Some(map),
        Legend::Versioned(entries) => select(entries, ctx.source, ctx.target).map(|e| &e.value),
    }
}

/// Project tokens into the mapping's output, converting slots left to right.
fn map_tokens(tokens: &[String], mapping: &Mapping, ctx: &mut Ctx<'_>) -> String {
    let Some(legend) = legend(mapping, ctx) else {
        ctx.diag(codes::UNMATCHED_BRANCH, format!("no legend for {} in `{}`", ctx.source, tokens.join(" ")));
        return tokens.join(" ");
    };
    // Converted slots with their position in `out`.
    let mut converted: IndexMap<&str, (usize, String)> = IndexMap::new();
    let mut out: Vec<String> = Vec::with_capacity(mapping.output.len());
    for part in &mapping.output {
        let name = match part {
            OutputPart::Literal(text) => {
                out.push(text.clone());
                continue;
            }
            OutputPart::Slot(name) => name.as_str(),
        };
        let Some(spec) = mapping.args.get(name) else {
            continue;
        };
        let raw = legend.get(name).and_then(|source| resolve(source, tokens));
        let value = match (raw, &spec.default) {
            (Some(values), _) => {
                let object_id = spec.with.as_deref().and_then(|w| converted.get(w)).map(|(_, v)| v.as_str());
                let input = Input { values, object_id };
                ctx.retype = None;
                let value = convert::convert(spec.ty, &input, ctx);
                if let Some(retyped) = ctx.retype.take()
                    && let Some((at, earlier)) = spec.with.as_deref().and_then(|w| converted.get_mut(w))
                {
                    out[*at] = retyped.clone();
                    *earlier = retyped;
                }
                value
            }
            (None, Some(default)) => Some(default.clone()),
            (None, None) => None,
        };
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            converted.insert(name, (out.len(), value.clone()));
            out.push(value);
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn run(line: &str, source: u16, target: u16) -> (String, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = update_line(line, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn unknown_root_warns_once() {
        let (out, warnings) = run("frobnicate  @a 1", 1202, 2105);
        assert_eq!(out, "frobnicate @a 1");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn comments_blank_lines_and_prefixes() {
        assert_eq!(run("# a comment", 1202, 2105).0, "# a comment");
        assert_eq!(run("", 1202, 2105).0, "");
        assert_eq!(run("/say hi", 1202, 2105).0, "/say hi");
        assert_eq!(run("$say $(msg)", 1202, 2105).0, "$say $(msg)");
    }

    #[test]
    fn legacy_give_is_rewritten_per_era() {
        assert_eq!(run("give @p wool 2 14", 1202, 1300).0, "give @p red_wool 2");
        assert_eq!(
            run("give @p diamond_sword 1 0 {Unbreakable:1b}", 1202, 2105).0,
            "give @p diamond_sword[unbreakable={}] 1"
        );
    }

    #[test]
    fn lines_inside_one_era_are_kept() {
        assert_eq!(run("give @p wool 2 14", 1100, 1202).0, "give @p wool 2 14");
    }

    #[test]
    fn toggledownfall_becomes_weather() {
        assert_eq!(run("toggledownfall", 1202, 2105).0, "weather clear");
    }

    #[test]
    fn stats_is_unsupported() {
        let (out, warnings) = run("stats entity @s set QueryResult @s x", 1202, 2105);
        assert_eq!(out, "stats entity @s set QueryResult @s x");
        assert_eq!(warnings, 1);
    }
}
