//! Property tests for the migration invariants: tokenizer splitting, macro
//! preservation, idempotence and monotonic version gating.

mod common;

use mapshift_core::tokenize::{tokenize, tokenize_checked};
use mapshift_core::{Engine, Version};
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z0-9@~^.:_-]{1,8}"
}

proptest! {
    #[test]
    fn plain_words_split_on_spaces(words in prop::collection::vec(word(), 1..8)) {
        let line = words.join(" ");
        prop_assert_eq!(tokenize(&line, ' ', true), words);
    }

    #[test]
    fn bracketed_values_stay_whole(
        before in prop::collection::vec(word(), 0..4),
        inner in prop::collection::vec(word(), 1..5),
        after in prop::collection::vec(word(), 0..4),
    ) {
        let payload = format!("{{Items:[{}]}}", inner.join(" "));
        let mut parts = before.clone();
        parts.push(payload.clone());
        parts.extend(after.iter().cloned());
        let checked = tokenize_checked(&parts.join(" "), ' ', true);
        prop_assert!(checked.balanced);
        prop_assert_eq!(checked.tokens.len(), before.len() + 1 + after.len());
        prop_assert_eq!(&checked.tokens[before.len()], &payload);
    }

    #[test]
    fn quoted_spaces_do_not_split(left in word(), right in word()) {
        let line = format!("tellraw @a \"{left} {right}\"");
        let tokens = tokenize(&line, ' ', true);
        prop_assert_eq!(tokens.len(), 3);
        prop_assert_eq!(&tokens[2], &format!("\"{left} {right}\""));
    }

    #[test]
    fn macro_arguments_survive_migration(name in "[a-z_]{1,10}", template in 0usize..5) {
        let line = match template {
            0 => format!("$give @p $({name}) 1"),
            1 => format!("$kill $({name})"),
            2 => format!("$setblock ~ ~ ~ $({name})"),
            3 => format!("$tp @s $({name})"),
            _ => format!("$execute as $({name}) run say hi"),
        };
        let out = common::migrate(&line, 1300, 2105).output;
        prop_assert_eq!(out, line);
    }
}

#[test]
fn migrated_lines_are_fixed_points() {
    let lines = [
        ("give @p wool 2 14", 1202),
        ("toggledownfall", 1202),
        ("say hello world", 1202),
        ("execute @a ~ ~ ~ detect ~ ~-1 ~ wool 14 say red", 1202),
        ("kill @e[type=zombie_pigman]", 1300),
        ("execute as @e[type=zombie_pigman] if block ~ ~ ~ grass_path run kill @s", 1300),
    ];
    let engine = Engine::new(Version::LATEST);
    for (line, source) in lines {
        let once = engine.update_command(line, Version::new(source), "test");
        let twice = engine.update_command(&once, Version::LATEST, "test");
        assert_eq!(twice, once, "`{line}` from {source}");
    }
}

const MODERN_LINES: [&str; 8] = [
    "say hello world",
    "weather clear",
    "kill @e[type=zombie_pigman]",
    "execute as @a run say hi",
    "execute as @e[type=zombie_pigman] if block ~ ~ ~ grass_path run kill @s",
    "setblock ~ ~ ~ grass_path",
    "data get entity @s SelectedItem.Count",
    "scoreboard players add @s points 1",
];

proptest! {
    #[test]
    fn migrating_twice_from_the_same_source_changes_nothing(
        index in 0..MODERN_LINES.len(),
        source in prop::sample::select(vec![1300u16, 1502, 1600, 2004]),
    ) {
        let engine = common::engine(Version::LATEST.code());
        let line = MODERN_LINES[index];
        let once = engine.update_command(line, Version::new(source), "test");
        let twice = engine.update_command(&once, Version::new(source), "test");
        prop_assert_eq!(twice, once, "`{}` from {}", line, source);
    }
}

#[test]
fn rename_cascades_stop_at_the_target() {
    let legacy = r#"{id:"PigZombie"}"#;
    assert_eq!(common::migrate_snbt(legacy, "entity", 1000, 1100), r#"{id:"minecraft:zombie_pigman"}"#);
    assert_eq!(common::migrate_snbt(legacy, "entity", 1000, 1502), r#"{id:"minecraft:zombie_pigman"}"#);
    assert_eq!(common::migrate_snbt(legacy, "entity", 1000, 1600), r#"{id:"minecraft:zombified_piglin"}"#);
    assert_eq!(common::migrate_snbt(legacy, "entity", 1000, 2105), r#"{id:"minecraft:zombified_piglin"}"#);
}

#[test]
fn macro_subtrees_in_nbt_are_kept() {
    let snbt = r#"{id:"Pig",CustomName:$(name)}"#;
    let out = common::migrate_snbt(snbt, "entity", 1202, 2105);
    assert!(out.contains("CustomName:$(name)"), "{out}");
}
