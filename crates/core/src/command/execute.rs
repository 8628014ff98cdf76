//! `execute` in both of its grammars.

use super::update_nested;
use crate::context::Ctx;
use crate::convert::{self, Input};
use mapshift_diagnostics::codes;
use mapshift_guides::ArgType;

/// 1.12 `execute <who> <x> <y> <z> [detect <x> <y> <z> <block> <data>] <command>`
/// to a 1.13 subcommand chain.
pub(super) fn legacy(tokens: &[String], ctx: &mut Ctx<'_>) -> String {
    let detect = tokens.get(5).is_some_and(|t| t == "detect");
    let command_at = if detect { 11 } else { 5 };
    if tokens.len() <= command_at {
        ctx.diag(
            codes::MISSING_ARGUMENT,
            format!("`{}` is missing its command; kept as written", tokens.join(" ")),
        );
        return tokens.join(" ");
    }
    let who = convert_one(ArgType::Selector, &tokens[1], ctx);
    let mut out: Vec<String> = vec!["execute".into(), "as".into(), who, "at".into(), "@s".into()];
    out.push("positioned".into());
    out.extend(tokens[2..5].iter().cloned());
    if detect {
        let input = Input {
            values: vec![tokens[9].clone(), tokens[10].clone()],
            object_id: None,
        };
        let block = convert::convert(ArgType::LegacyBlockPredicate, &input, ctx).unwrap_or_else(|| tokens[9].clone());
        out.extend(["if".into(), "block".into()]);
        out.extend(tokens[6..9].iter().cloned());
        out.push(block);
    }
    out.push("run".into());
    out.push(update_nested(&tokens[command_at..].join(" "), ctx));
    out.join(" ")
}

fn convert_one(ty: ArgType, value: &str, ctx: &mut Ctx<'_>) -> String {
    convert::convert(ty, &Input::single(value, None), ctx).unwrap_or_else(|| value.to_string())
}

/// Cursor over a modern subcommand chain.
struct Chain<'t> {
    tokens: &'t [String],
    at: usize,
    out: Vec<String>,
}

impl<'t> Chain<'t> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.at).map(String::as_str)
    }

    /// Copy `n` tokens through. `false` when the chain ran out.
    fn copy(&mut self, n: usize, ctx: &mut Ctx<'_>) -> bool {
        if self.at + n > self.tokens.len() {
            ctx.diag(
                codes::MISSING_ARGUMENT,
                format!("`{}` ends early; kept as written", self.tokens.join(" ")),
            );
            self.out.extend(self.tokens[self.at..].iter().cloned());
            self.at = self.tokens.len();
            return false;
        }
        self.out.extend(self.tokens[self.at..self.at + n].iter().cloned());
        self.at += n;
        true
    }

    /// Convert the next token as `ty`.
    fn convert(&mut self, ty: ArgType, ctx: &mut Ctx<'_>) -> bool {
        let Some(value) = self.peek() else {
            return self.copy(1, ctx);
        };
        self.out.push(convert_one(ty, value, ctx));
        self.at += 1;
        true
    }

    /// Convert the next token as an NBT path below a source of `kind`.
    fn path(&mut self, kind: &str, ctx: &mut Ctx<'_>) -> bool {
        let Some(path) = self.peek() else {
            return self.copy(1, ctx);
        };
        self.out.push(convert::update_path(path, kind, ctx));
        self.at += 1;
        true
    }

    /// `block <pos>`, `entity <selector>` or `storage <id>`, then a path.
    fn data_source(&mut self, ctx: &mut Ctx<'_>) -> bool {
        let kind = self.peek().unwrap_or("");
        let ok = match kind {
            "block" => self.copy(4, ctx),
            "entity" => self.copy(1, ctx) && self.convert(ArgType::Selector, ctx),
            "storage" => self.copy(2, ctx),
            _ => return self.rest_unmatched(ctx),
        };
        ok && self.path(kind, ctx)
    }

    fn rest_unmatched(&mut self, ctx: &mut Ctx<'_>) -> bool {
        let rest = self.tokens[self.at..].join(" ");
        ctx.diag(codes::UNMATCHED_BRANCH, format!("unknown execute subcommand at `{rest}`"));
        self.out.push(rest);
        self.at = self.tokens.len();
        false
    }

    fn condition(&mut self, ctx: &mut Ctx<'_>) -> bool {
        match self.peek() {
            Some("block") => self.copy(4, ctx) && self.convert(ArgType::BlockPredicate, ctx),
            Some("blocks") => self.copy(11, ctx),
            Some("entity") => self.copy(1, ctx) && self.convert(ArgType::Selector, ctx),
            Some("score") => {
                if !(self.copy(1, ctx) && self.convert(ArgType::Selector, ctx) && self.copy(1, ctx)) {
                    return false;
                }
                match self.peek() {
                    Some("matches") => self.copy(2, ctx),
                    _ => self.copy(1, ctx) && self.convert(ArgType::Selector, ctx) && self.copy(1, ctx),
                }
            }
            Some("data") => self.copy(1, ctx) && self.data_source(ctx),
            Some("predicate" | "dimension" | "function") => self.copy(2, ctx),
            Some("biome") => self.copy(5, ctx),
            Some("loaded") => self.copy(4, ctx),
            Some("items") => {
                let target = match self.tokens.get(self.at + 1).map(String::as_str) {
                    Some("entity") => self.copy(2, ctx) && self.convert(ArgType::Selector, ctx),
                    Some("block") => self.copy(5, ctx),
                    _ => return self.rest_unmatched(ctx),
                };
                target && self.copy(1, ctx) && self.convert(ArgType::ItemPredicate, ctx)
            }
            _ => self.rest_unmatched(ctx),
        }
    }

    fn store(&mut self, ctx: &mut Ctx<'_>) -> bool {
        if !self.copy(1, ctx) {
            return false;
        }
        match self.peek() {
            Some("block") => self.copy(4, ctx) && self.path("block", ctx) && self.copy(2, ctx),
            Some("entity") => {
                self.copy(1, ctx) && self.convert(ArgType::Selector, ctx) && self.path("entity", ctx) && self.copy(2, ctx)
            }
            Some("storage") => self.copy(2, ctx) && self.path("storage", ctx) && self.copy(2, ctx),
            Some("score") => self.copy(1, ctx) && self.convert(ArgType::Selector, ctx) && self.copy(1, ctx),
            Some("bossbar") => self.copy(3, ctx),
            _ => self.rest_unmatched(ctx),
        }
    }
}

/// Modern subcommand chains: selectors, block and item predicates and NBT
/// paths are converted in place and the `run` tail is migrated as a command.
pub(super) fn modern(tokens: &[String], ctx: &mut Ctx<'_>) -> String {
    let mut chain = Chain {
        tokens,
        at: 1,
        out: vec![tokens[0].clone()],
    };
    while let Some(sub) = chain.peek() {
        chain.out.push(sub.to_string());
        chain.at += 1;
        let ok = match sub {
            "as" | "at" => chain.convert(ArgType::Selector, ctx),
            "positioned" | "rotated" => match chain.peek() {
                Some("as") => chain.copy(1, ctx) && chain.convert(ArgType::Selector, ctx),
                Some("over") => chain.copy(2, ctx),
                _ => chain.copy(if sub == "positioned" { 3 } else { 2 }, ctx),
            },
            "facing" => match chain.peek() {
                Some("entity") => chain.copy(1, ctx) && chain.convert(ArgType::Selector, ctx) && chain.copy(1, ctx),
                _ => chain.copy(3, ctx),
            },
            "align" | "anchored" | "in" | "on" => chain.copy(1, ctx),
            "summon" => chain.convert(ArgType::Entity, ctx),
            "if" | "unless" => chain.condition(ctx),
            "store" => chain.store(ctx),
            "run" => {
                let rest = tokens[chain.at..].join(" ");
                chain.out.push(update_nested(&rest, ctx));
                break;
            }
            _ => {
                chain.out.pop();
                chain.at -= 1;
                chain.rest_unmatched(ctx)
            }
        };
        if !ok {
            break;
        }
    }
    chain.out.retain(|t| !t.is_empty());
    chain.out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use mapshift_guides::Version;

    fn run(line: &str, source: u16, target: u16) -> (String, usize) {
        let engine = Engine::new(Version::new(target));
        let mut ctx = Ctx::new(&engine, Version::new(source), "test");
        let out = super::super::update_line(line, &mut ctx);
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn legacy_execute_becomes_a_chain() {
        assert_eq!(
            run("execute @e[type=pig] ~ ~1 ~ say hi", 1202, 1300).0,
            "execute as @e[type=pig] at @s positioned ~ ~1 ~ run say hi"
        );
    }

    #[test]
    fn self_at_own_position_collapses() {
        assert_eq!(run("execute @s ~ ~ ~ say hi", 1202, 1300).0, "execute at @s run say hi");
    }

    #[test]
    fn detect_becomes_if_block() {
        assert_eq!(
            run("execute @a ~ ~ ~ detect ~ ~-1 ~ wool 14 say red", 1202, 1300).0,
            "execute as @a at @s if block ~ ~-1 ~ red_wool run say red"
        );
    }

    #[test]
    fn nested_legacy_executes_merge() {
        assert_eq!(
            run("execute @a ~ ~ ~ execute @e[c=1] ~ ~ ~ say hi", 1202, 1300).0,
            "execute as @a at @s as @e[limit=1,sort=nearest] at @s run say hi"
        );
    }

    #[test]
    fn modern_chains_convert_their_arguments() {
        assert_eq!(
            run("execute as @e[type=zombie_pigman] if block ~ ~ ~ grass_path run kill @s", 1300, 2105).0,
            "execute as @e[type=zombified_piglin] if block ~ ~ ~ dirt_path run kill @s"
        );
    }

    #[test]
    fn unknown_subcommand_is_reported() {
        let (out, warnings) = run("execute frob @s run say hi", 1300, 2105);
        assert_eq!(out, "execute frob @s run say hi");
        assert_eq!(warnings, 1);
    }
}
