//! End-to-end command and function migration through the embedded guides.

mod common;

use mapshift_core::{Engine, Version, codes};

#[test]
fn unmatched_branch_keeps_the_line_with_one_warning() {
    let report = common::migrate("effect frob @s speed", 1300, 2105);
    assert_eq!(report.output, "effect frob @s speed");
    assert_eq!(common::warnings(&report), 1);
    assert_eq!(common::codes(&report), [codes::UNMATCHED_BRANCH]);
}

#[test]
fn any_data_value_becomes_a_placeholder_tag() {
    let report = common::migrate("testforblock ~ ~ ~ wool -1", 1202, 1300);
    assert_eq!(report.output, "execute if block ~ ~ ~ #mapshift:legacy/wool");
    assert_eq!(common::codes(&report), [codes::AMBIGUOUS_LEGACY_VALUE]);
}

#[test]
fn riding_chains_become_passengers() {
    let out = common::migrate_snbt(r#"{id:"Pig",Riding:{id:"Cow"}}"#, "entity", 800, 1300);
    assert_eq!(out, r#"{id:"minecraft:cow",Passengers:[{id:"minecraft:pig"}]}"#);
}

#[test]
fn legacy_commands_cross_several_eras() {
    assert_eq!(common::migrate("toggledownfall", 1202, 2105).output, "weather clear");
    assert_eq!(common::migrate("testfor @a[score_kills_min=1]", 1202, 1300).output, "execute if entity @a[scores={kills=1..}]");
    assert_eq!(common::migrate("xp 5L @p", 1202, 1300).output, "experience add @p 5 levels");
    assert_eq!(common::migrate("xp 30", 1202, 1300).output, "experience add @s 30 points");
}

#[test]
fn function_files_keep_comments_and_line_endings() {
    let engine = Engine::new(Version::new(1300));
    let text = "# reward\ngive @p wool 1 14\n\ntoggledownfall\n";
    let report = engine.update_function(text, Version::new(1202), "reward.mcfunction");
    assert_eq!(report.output, "# reward\ngive @p red_wool 1\n\nweather clear\n");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn stats_is_reported_as_unsupported() {
    let report = common::migrate("stats block ~ ~ ~ set SuccessCount @p ok", 1202, 2105);
    assert_eq!(report.output, "stats block ~ ~ ~ set SuccessCount @p ok");
    assert_eq!(common::codes(&report), [codes::UNSUPPORTED_COMMAND]);
}

#[test]
fn custom_guides_replace_the_embedded_ones() {
    let engine = Engine::builder()
        .target(Version::new(1300))
        .command_guide(
            r#"{
              // Renames a custom root.
              "hello": { "mapping": {
                "output": ["say", "$who"],
                "args": { "who": { "type": "literal", "default": "world" } },
                "legend": { "who": 1 }
              } }
            }"#,
        )
        .build()
        .unwrap();
    assert_eq!(engine.update_command("hello", Version::new(1202), "test"), "say world");
    assert_eq!(engine.update_command("hello there", Version::new(1202), "test"), "say there");
    let report = engine.update_command_report("give @p stone", Version::new(1202), "test");
    assert_eq!(common::codes(&report), [codes::UNKNOWN_COMMAND]);
}

#[test]
fn chat_text_mentioning_run_execute_is_kept() {
    let out = common::migrate("execute @a ~ ~ ~ say I will run execute now", 1202, 1300).output;
    assert!(out.starts_with("execute as @a "), "{out}");
    assert!(out.ends_with(" run say I will run execute now"), "{out}");
}

#[test]
fn slash_commands_in_click_events_are_migrated() {
    let json = r#"{"text":"x","clickEvent":{"action":"run_command","value":"/toggledownfall"}}"#;
    let out = common::engine(1300).update_text(json, Version::new(1202));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["clickEvent"]["value"], "/weather clear");

    let suggest = r#"{"text":"x","clickEvent":{"action":"suggest_command","value":"/xp 30"}}"#;
    let out = common::engine(1300).update_text(suggest, Version::new(1202));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["clickEvent"]["value"], "/experience add @s 30 points");
}

#[test]
fn summoned_riders_follow_their_vehicle() {
    let out = common::migrate("summon Pig ~ ~ ~ {Riding:{id:Cow}}", 800, 2105).output;
    assert!(out.starts_with("summon cow ~ ~ ~ "), "{out}");
    assert!(out.contains(r#"Passengers:[{id:"minecraft:pig"}]"#), "{out}");
}

#[test]
fn unreadable_item_tags_are_kept_as_written() {
    let report = common::migrate(r#"give @p stone 1 0 {display:{Name:"a"}"#, 1202, 1300);
    assert!(report.output.contains(r#"{display:{Name:"a"}"#), "{}", report.output);
    assert!(common::codes(&report).iter().any(|c| c == codes::MALFORMED_SNBT));

    let report = common::migrate(r#"give @p stone 1 0 {display:{Name:"a"}"#, 1202, 2105);
    assert!(report.output.contains(r#"{display:{Name:"a"}"#), "{}", report.output);
}

#[test]
fn camel_case_entity_types_are_lowercased() {
    assert_eq!(common::migrate("kill @e[type=Creeper]", 1202, 2105).output, "kill @e[type=creeper]");
    assert_eq!(common::migrate("kill @e[type=!Creeper]", 1100, 1300).output, "kill @e[type=!creeper]");
}
