//! Shared test helpers for `mapshift_core` integration tests.

#![allow(unreachable_pub)]

use mapshift_core::{CommandReport, Engine, Severity, Version};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Engines are built once per target per test binary.
static ENGINES: LazyLock<Mutex<HashMap<u16, Engine>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// The default engine for `target`.
pub fn engine(target: u16) -> Engine {
    let mut engines = ENGINES.lock().unwrap();
    engines
        .entry(target)
        .or_insert_with(|| Engine::new(Version::new(target)))
        .clone()
}

/// Migrate one command line from `source` to `target`.
pub fn migrate(line: &str, source: u16, target: u16) -> CommandReport {
    engine(target).update_command_report(line, Version::new(source), "test")
}

/// Migrate SNBT text in a context.
#[allow(dead_code)]
pub fn migrate_snbt(snbt: &str, context: &str, source: u16, target: u16) -> String {
    engine(target).update_snbt(snbt, Version::new(source), context, "", false)
}

/// Number of warnings in a report.
#[allow(dead_code)]
pub fn warnings(report: &CommandReport) -> usize {
    report
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warn)
        .count()
}

/// Diagnostic codes (in order) of a report.
#[allow(dead_code)]
pub fn codes(report: &CommandReport) -> Vec<String> {
    report.diagnostics.iter().map(|d| d.id.to_string()).collect()
}
