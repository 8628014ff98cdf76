//! Post-processing fix-ups for artefacts of the legacy `execute` rewrite.
//!
//! The 1.12 translation emits `as <who> at @s positioned <pos> run ...` for
//! every `execute`, which leaves no-op subcommands and nested chains behind.
//! Each fix-up carries its own gate; they run newest gate first.

use crate::context::Ctx;
use crate::tokenize::tokenize;
use mapshift_guides::{Gate, Version};

struct Fixup {
    name: &'static str,
    gate: Gate,
    apply: fn(&mut Vec<String>) -> bool,
}

const LEGACY_EXECUTE: Gate = Gate::until(Version::new(1202));

const FIXUPS: [Fixup; 4] = [
    Fixup {
        name: "merge_run_execute",
        gate: LEGACY_EXECUTE,
        apply: merge_run_execute,
    },
    Fixup {
        name: "strip_noop_positioned",
        gate: LEGACY_EXECUTE,
        apply: strip_noop_positioned,
    },
    Fixup {
        name: "strip_leading_as_self",
        gate: LEGACY_EXECUTE,
        apply: strip_leading_as_self,
    },
    Fixup {
        name: "collapse_empty_execute",
        gate: LEGACY_EXECUTE,
        apply: collapse_empty_execute,
    },
];

/// Apply every fix-up whose gate passes to a migrated line.
pub(crate) fn apply(line: &str, ctx: &Ctx<'_>) -> String {
    if !line.starts_with("execute ") {
        return line.to_string();
    }
    let mut order: Vec<&Fixup> = FIXUPS.iter().collect();
    order.sort_by_key(|f| std::cmp::Reverse(f.gate.sort_key()));
    let mut tokens = tokenize(line, ' ', true);
    let mut changed = false;
    for fixup in order {
        if ctx.gate(&fixup.gate) && (fixup.apply)(&mut tokens) {
            tracing::trace!(fixup = fixup.name, "applied");
            changed = true;
        }
    }
    if changed { tokens.join(" ") } else { line.to_string() }
}

/// Index of the first top-level `run`; subcommands sit before it.
fn run_index(tokens: &[String]) -> usize {
    tokens.iter().position(|t| t == "run").unwrap_or(tokens.len())
}

/// `execute A run execute B` -> `execute A B`.
///
/// Only the first top-level `run` is looked at; the nested command after it
/// may carry free text.
fn merge_run_execute(tokens: &mut Vec<String>) -> bool {
    let mut changed = false;
    loop {
        let i = run_index(tokens);
        if tokens.get(i + 1).is_none_or(|t| t != "execute") {
            return changed;
        }
        tokens.drain(i..i + 2);
        changed = true;
    }
}

/// Drop `positioned ~ ~ ~`.
fn strip_noop_positioned(tokens: &mut Vec<String>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 3 < run_index(tokens) {
        if tokens[i] == "positioned" && tokens[i + 1..i + 4].iter().all(|t| t == "~") {
            tokens.drain(i..i + 4);
            changed = true;
        } else {
            i += 1;
        }
    }
    changed
}

/// Drop a leading `as @s`, which selects the executor it already has.
fn strip_leading_as_self(tokens: &mut Vec<String>) -> bool {
    if tokens.len() > 3 && tokens[1] == "as" && tokens[2] == "@s" {
        tokens.drain(1..3);
        return true;
    }
    false
}

/// `execute run X` -> `X`.
fn collapse_empty_execute(tokens: &mut Vec<String>) -> bool {
    if tokens.len() > 2 && tokens[1] == "run" {
        tokens.drain(0..2);
        return true;
    }
    false
}
