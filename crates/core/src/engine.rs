//! The public migration API.
//!
//! An [`Engine`] pairs a target version with a command guide and an NBT
//! guide. It is immutable after construction and can be shared across
//! threads; every call builds its own [`Ctx`] and returns the migrated value
//! together with the diagnostics raised along the way.
//!
//! All `update_*` entry points are total: every converter answers input it
//! cannot read with that input, logged. A panic is a bug and is not caught.

use std::sync::{Arc, LazyLock};

use crate::command::{self, issues};
use crate::context::Ctx;
use crate::convert::{self, Input};
use crate::{nbt_update, selector, text};
use mapshift_diagnostics::{Diagnostic, codes};
use mapshift_guides::{ArgType, CommandGuide, GuideError, NbtGuide, Version, load_command_guide, load_nbt_guide};
use mapshift_nbt::{BinaryError, Tag, binary, unpack};
use serde::Serialize;

/// Command grammar guide compiled into the crate.
pub const DEFAULT_COMMAND_GUIDE: &str = include_str!("../guides/commands.jsonc");
/// NBT guide compiled into the crate.
pub const DEFAULT_NBT_GUIDE: &str = include_str!("../guides/nbt.jsonc");

/// Re-dispatch passes allowed per command before `MS1004`.
pub const DEFAULT_PASS_LIMIT: usize = 32;

static DEFAULT_COMMANDS: LazyLock<Arc<CommandGuide>> = LazyLock::new(|| {
    Arc::new(
        load_command_guide(DEFAULT_COMMAND_GUIDE)
            .unwrap_or_else(|e| panic!("embedded command guide is invalid: {e}")),
    )
});

static DEFAULT_NBT: LazyLock<Arc<NbtGuide>> = LazyLock::new(|| {
    Arc::new(load_nbt_guide(DEFAULT_NBT_GUIDE).unwrap_or_else(|e| panic!("embedded NBT guide is invalid: {e}")))
});

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(|| Engine::new(Version::LATEST));

/// Migrates values written for some source version to [`Engine::target`].
#[derive(Debug, Clone)]
pub struct Engine {
    target: Version,
    commands: Arc<CommandGuide>,
    nbt: Arc<NbtGuide>,
    pass_limit: usize,
}

/// Builder for an [`Engine`] with custom guides.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    target: Version,
    command_guide: Option<String>,
    nbt_guide: Option<String>,
    pass_limit: usize,
}

/// Input of [`Engine::update_nbt`].
#[derive(Debug, Clone, PartialEq)]
pub enum NbtInput {
    /// SNBT text.
    Text(String),
    /// An already parsed tag.
    Tag(Tag),
}

/// A migrated command or function together with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReport {
    /// The migrated text. May span several lines when issues were spliced.
    pub output: String,
    /// Every diagnostic raised while migrating.
    pub diagnostics: Vec<Diagnostic>,
}

/// A migrated NBT value together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtReport {
    /// The migrated value.
    pub tag: Tag,
    /// Every diagnostic raised while migrating.
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Version::LATEST)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            target: Version::LATEST,
            command_guide: None,
            nbt_guide: None,
            pass_limit: DEFAULT_PASS_LIMIT,
        }
    }
}

impl EngineBuilder {
    /// Version to migrate to.
    pub fn target(mut self, target: Version) -> Self {
        self.target = target;
        self
    }

    /// Replace the embedded command guide with JSONC `text`.
    pub fn command_guide(mut self, text: impl Into<String>) -> Self {
        self.command_guide = Some(text.into());
        self
    }

    /// Replace the embedded NBT guide with JSONC `text`.
    pub fn nbt_guide(mut self, text: impl Into<String>) -> Self {
        self.nbt_guide = Some(text.into());
        self
    }

    /// Re-dispatch passes allowed per command.
    pub fn pass_limit(mut self, limit: usize) -> Self {
        self.pass_limit = limit.max(1);
        self
    }

    /// Load the guides and build the engine.
    pub fn build(self) -> Result<Engine, GuideError> {
        let commands = match self.command_guide {
            Some(text) => Arc::new(load_command_guide(&text)?),
            None => Arc::clone(&DEFAULT_COMMANDS),
        };
        let nbt = match self.nbt_guide {
            Some(text) => Arc::new(load_nbt_guide(&text)?),
            None => Arc::clone(&DEFAULT_NBT),
        };
        Ok(Engine {
            target: self.target,
            commands,
            nbt,
            pass_limit: self.pass_limit,
        })
    }
}

impl Engine {
    /// An engine with the embedded guides.
    pub fn new(target: Version) -> Self {
        Self {
            target,
            commands: Arc::clone(&DEFAULT_COMMANDS),
            nbt: Arc::clone(&DEFAULT_NBT),
            pass_limit: DEFAULT_PASS_LIMIT,
        }
    }

    /// Start building an engine with custom guides.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The version this engine migrates to.
    pub fn target(&self) -> Version {
        self.target
    }

    /// The command grammar guide.
    pub fn commands(&self) -> &CommandGuide {
        &self.commands
    }

    /// The NBT guide.
    pub fn nbt_guide(&self) -> &NbtGuide {
        &self.nbt
    }

    /// Re-dispatch passes allowed per command.
    pub fn pass_limit(&self) -> usize {
        self.pass_limit
    }

    /// Migrate one command line written for `version`. `label` names the
    /// input in diagnostics (a file and line, a command block position).
    pub fn update_command(&self, line: &str, version: Version, label: &str) -> String {
        self.update_command_report(line, version, label).output
    }

    /// [`Engine::update_command`] with the diagnostics it raised.
    pub fn update_command_report(&self, line: &str, version: Version, label: &str) -> CommandReport {
        let mut ctx = Ctx::new(self, version, label);
        let output = migrate_line(line, &mut ctx);
        CommandReport {
            output,
            diagnostics: ctx.take_diagnostics(),
        }
    }

    /// Migrate a function file line by line. Line endings and a trailing
    /// newline are kept.
    pub fn update_function(&self, text: &str, version: Version, label: &str) -> CommandReport {
        let mut diagnostics = Vec::new();
        let mut output = String::with_capacity(text.len());
        for (n, raw) in text.split_inclusive('\n').enumerate() {
            let (line, ending) = split_ending(raw);
            let report = self.update_command_report(line, version, &format!("{label}:{}", n + 1));
            output.push_str(&report.output);
            output.push_str(ending);
            diagnostics.extend(report.diagnostics);
        }
        CommandReport { output, diagnostics }
    }

    /// Migrate an NBT value of guide `context` (`entity`, `block`, `item`...)
    /// belonging to `object_id`. `read` marks values tested against the
    /// world rather than written to it. Unparsable text is logged and kept
    /// as a string tag.
    pub fn update_nbt(&self, input: NbtInput, version: Version, context: &str, object_id: &str, read: bool) -> Tag {
        self.update_nbt_report(input, version, context, object_id, read).tag
    }

    /// [`Engine::update_nbt`] with the diagnostics it raised.
    pub fn update_nbt_report(
        &self,
        input: NbtInput,
        version: Version,
        context: &str,
        object_id: &str,
        read: bool,
    ) -> NbtReport {
        let mut ctx = Ctx::new(self, version, "");
        let tag = match input {
            NbtInput::Tag(tag) => tag,
            NbtInput::Text(text) => match unpack(&text) {
                Ok(tag) => tag,
                Err(e) => {
                    ctx.diag(codes::MALFORMED_SNBT, format!("{e}; kept `{text}`"));
                    return NbtReport {
                        tag: Tag::String(text),
                        diagnostics: ctx.take_diagnostics(),
                    };
                }
            },
        };
        let tag = nbt_update::update(tag, context, object_id, read, &mut ctx);
        NbtReport {
            tag,
            diagnostics: ctx.take_diagnostics(),
        }
    }

    /// Migrate SNBT text. Text that needs no change is returned as given.
    pub fn update_snbt(&self, text: &str, version: Version, context: &str, object_id: &str, read: bool) -> String {
        let mut ctx = Ctx::new(self, version, "");
        nbt_update::update_snbt(text, context, object_id, read, &mut ctx)
    }

    /// Migrate a JSON text component.
    pub fn update_text(&self, json: &str, version: Version) -> String {
        let mut ctx = Ctx::new(self, version, "");
        text::update(json, &mut ctx)
    }

    /// Migrate a target selector.
    pub fn update_selector(&self, selector: &str, version: Version) -> String {
        let mut ctx = Ctx::new(self, version, "");
        selector::update(selector, true, &mut ctx)
    }

    /// Migrate a block argument (`stone`, `wool 14`, `chest[facing=east]{...}`).
    pub fn update_block(&self, block: &str, version: Version) -> String {
        self.convert_one(ArgType::Block, block, version)
    }

    /// Migrate an item argument (`diamond_sword{Damage:3}`, `dye 1`).
    pub fn update_item(&self, item: &str, version: Version) -> String {
        let ty = if item.contains(' ') { ArgType::LegacyItem } else { ArgType::Item };
        self.convert_one(ty, item, version)
    }

    fn convert_one(&self, ty: ArgType, value: &str, version: Version) -> String {
        let mut ctx = Ctx::new(self, version, "");
        let input = Input {
            values: value.split(' ').map(str::to_string).collect(),
            object_id: None,
        };
        convert::convert(ty, &input, &mut ctx).unwrap_or_else(|| value.to_string())
    }

    /// Migrate a binary NBT payload (a structure file, a chunk's root
    /// compound) whose root is of guide `context`. The compression wrapper
    /// is detected and restored.
    pub fn update_binary_nbt(&self, bytes: &[u8], version: Version, context: &str) -> Result<Vec<u8>, BinaryError> {
        let mut file = binary::read(bytes)?;
        let object_id = file.root.get("id").and_then(Tag::as_str).unwrap_or_default().to_string();
        let root = std::mem::take(&mut file.root);
        file.root = match self.update_nbt(NbtInput::Tag(Tag::Compound(root.clone())), version, context, &object_id, false) {
            Tag::Compound(compound) => compound,
            other => {
                Diagnostic::from_code(
                    codes::INTERNAL_FAILURE,
                    format!("root of a binary payload became tag type {}; root kept", other.type_id()),
                )
                .emit();
                root
            }
        };
        binary::write(&file)
    }
}

/// Migrate one line and splice the deferred issues it recorded.
fn migrate_line(line: &str, ctx: &mut Ctx<'_>) -> String {
    let output = command::update_line(line, ctx);
    let issues = std::mem::take(&mut ctx.issues);
    let spliced = issues::splice(&output, &issues);
    if spliced != output {
        ctx.diag(
            codes::SAFE_READ_SPLICED,
            format!("added a safe read after `{output}`"),
        );
    }
    spliced
}

fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

/// Migrate `line` from `version` to the newest supported version with the
/// embedded guides.
pub fn update_command(line: &str, version: Version) -> String {
    DEFAULT_ENGINE.update_command(line, version, "")
}
