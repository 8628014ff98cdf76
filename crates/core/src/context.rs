//! Per-call migration state.

use crate::engine::Engine;
use mapshift_diagnostics::Diagnostic;
use mapshift_guides::{Gate, Version};

/// A deferred rewrite recorded during one update and applied after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A `data get` of a path whose value may now be absent (item counts of
    /// one are no longer stored from 1.20.5). A safe-read line setting the
    /// score to `default` is spliced after the storing command.
    DefaultedNbtRead {
        /// The `data get` source, e.g. `entity @s`.
        source: String,
        /// The NBT path read.
        path: String,
        /// Value the path implicitly had.
        default: String,
    },
}

/// Mutable state threaded through one top-level update.
///
/// `source` is the era the value being converted was written in. `target` is
/// the era the current pass converts to: the engine target, or a lower cap
/// while a version-gated grammar arm is being translated one era at a time.
pub struct Ctx<'e> {
    pub(crate) engine: &'e Engine,
    /// Era of the input.
    pub source: Version,
    /// Era of the output of this pass.
    pub target: Version,
    pub(crate) issues: Vec<Issue>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Era reached by a gated grammar arm during this pass, if any.
    pub(crate) advanced_to: Option<Version>,
    /// New value for the slot a converter was given its object id from,
    /// set when the conversion changed the object's type.
    pub(crate) retype: Option<String>,
    label: String,
}

impl<'e> Ctx<'e> {
    pub(crate) fn new(engine: &'e Engine, source: Version, label: impl Into<String>) -> Self {
        Self {
            engine,
            source,
            target: engine.target(),
            issues: Vec::new(),
            diagnostics: Vec::new(),
            advanced_to: None,
            retype: None,
            label: label.into(),
        }
    }

    /// The engine this call runs on.
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    /// Whether the migration crosses the boundary after `max`
    /// (`source <= max < target`).
    pub fn crosses(&self, max: u16) -> bool {
        self.source.code() <= max && self.target.code() > max
    }

    /// Whether `gate` applies to this migration.
    pub fn gate(&self, gate: &Gate) -> bool {
        gate.applies(self.source, self.target)
    }

    /// Whether the output era is at least `code`.
    pub fn target_at_least(&self, code: u16) -> bool {
        self.target.code() >= code
    }

    /// Record a deferred rewrite.
    pub fn push_issue(&mut self, issue: Issue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    /// Log a diagnostic and keep it for the call's report.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = if self.label.is_empty() {
            diagnostic
        } else {
            diagnostic.with("label", self.label.clone())
        };
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    /// Shorthand for [`Ctx::report`] with the catalogue severity of `code`.
    pub fn diag(&mut self, code: &'static str, message: impl Into<String>) {
        self.report(Diagnostic::from_code(code, message));
    }

    /// Run `f` with `source` temporarily replaced.
    pub(crate) fn with_source<T>(&mut self, source: Version, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.source, source);
        let out = f(self);
        self.source = saved;
        out
    }

    /// Run `f` with the pass target capped at `cap`.
    pub(crate) fn with_target<T>(&mut self, cap: Version, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.target;
        self.target = saved.min(cap);
        let out = f(self);
        self.target = saved;
        out
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
