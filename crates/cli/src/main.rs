mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use mapshift_core::{Engine, NbtInput, Version};
use mapshift_diagnostics::{self as diag, Diagnostic, Severity};
use mapshift_profile::{MigrationProfile, load_profile};
use tracing_subscriber::filter::LevelFilter;

use crate::render::{Format, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "mapshift",
    version,
    about = "Migrate Minecraft map commands, function files and NBT to a newer release"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Migration profile (JSON) naming the source and target releases and
    /// optional replacement guides.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Release the input was written for (e.g. 1.12.2). Overrides the profile.
    #[arg(long, global = true)]
    from: Option<String>,

    /// Release to migrate to. Defaults to the profile's target, else the
    /// newest supported release.
    #[arg(long, global = true)]
    to: Option<String>,

    /// Replacement command grammar guide (JSONC).
    #[arg(long, global = true)]
    command_guide: Option<PathBuf>,

    /// Replacement NBT guide (JSONC).
    #[arg(long, global = true)]
    nbt_guide: Option<PathBuf>,

    /// Log migration decisions to stderr (-v warnings, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Migration ───────────────────────────────────────────────────
    /// Migrate one command line.
    Command { line: String },

    /// Migrate a function file line by line.
    Function {
        file: PathBuf,
        /// Write the migrated file back in place.
        #[arg(long, short)]
        write: bool,
    },

    /// Migrate SNBT text.
    Snbt {
        text: String,
        /// Guide context of the value (entity, block, item_tag, arbitrary).
        #[arg(long, default_value = "entity")]
        context: String,
        /// Id of the object the NBT belongs to (e.g. minecraft:oak_sign).
        #[arg(long, default_value = "")]
        id: String,
        /// Treat the value as a filter that is matched, not written.
        #[arg(long)]
        read: bool,
    },

    /// Migrate a JSON text component.
    Text { json: String },

    /// Migrate a binary NBT file (structure, level or entity file).
    Nbt {
        file: PathBuf,
        /// Guide context of the root compound.
        #[arg(long, default_value = "entity")]
        context: String,
        /// Write the migrated file back in place instead of printing SNBT.
        #[arg(long, short)]
        write: bool,
    },

    // ── Reference / informational ───────────────────────────────────
    /// Explain a diagnostic ID (e.g. MS1201).
    Explain { id: String },

    /// Load the configured guides and report what they contain.
    CheckGuides,
}

/// Versions and engine resolved from flags and the profile.
struct Setup {
    engine: Engine,
    source: Option<Version>,
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match &cli.cmd {
        Cmd::Explain { id } => return cmd_explain(id, format),
        Cmd::CheckGuides => return cmd_check_guides(&cli, format),
        _ => {}
    }

    let setup = setup(&cli)?;
    let source = setup
        .source
        .context("the source release is required; pass --from or --profile")?;
    let engine = &setup.engine;

    match cli.cmd {
        Cmd::Command { line } => cmd_command(engine, &line, source, format)?,
        Cmd::Function { file, write } => cmd_function(engine, &file, source, write, format)?,
        Cmd::Snbt { text, context, id, read } => cmd_snbt(engine, &text, source, &context, &id, read, format)?,
        Cmd::Text { json } => cmd_text(engine, &json, source, format)?,
        Cmd::Nbt { file, context, write } => cmd_nbt(engine, &file, source, &context, write, format)?,
        Cmd::Explain { .. } | Cmd::CheckGuides => unreachable!("handled before setup"),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_command(engine: &Engine, line: &str, source: Version, format: Format) -> Result<()> {
    let report = engine.update_command_report(line, source, "command");
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Pretty => {
            println!("{}", report.output);
            render_diagnostics_pretty(line, "<command>", &report.diagnostics);
            print_summary(&report.diagnostics);
        }
    }
    exit_on_errors(&report.diagnostics);
    Ok(())
}

fn cmd_function(engine: &Engine, file: &Path, source: Version, write: bool, format: Format) -> Result<()> {
    let input = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let name = file.display().to_string();
    let report = engine.update_function(&input, source, &name);
    let changed = report.output != input;

    if write {
        if changed {
            fs::write(file, &report.output).with_context(|| format!("failed to write {}", file.display()))?;
        }
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "status": if changed { "migrated" } else { "unchanged" },
                    "file": name,
                    "diagnostics": report.diagnostics,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Format::Pretty => {
                render_diagnostics_pretty(&input, &name, &report.diagnostics);
                print_summary(&report.diagnostics);
                eprintln!("{}: {name}", if changed { "migrated" } else { "unchanged" });
            }
        }
    } else {
        match format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            Format::Pretty => {
                print!("{}", report.output);
                render_diagnostics_pretty(&input, &name, &report.diagnostics);
                print_summary(&report.diagnostics);
            }
        }
    }

    exit_on_errors(&report.diagnostics);
    Ok(())
}

fn cmd_snbt(
    engine: &Engine,
    text: &str,
    source: Version,
    context: &str,
    id: &str,
    read: bool,
    format: Format,
) -> Result<()> {
    let report = engine.update_nbt_report(NbtInput::Text(text.to_string()), source, context, id, read);
    let snbt = match &report.tag {
        mapshift_nbt::Tag::String(kept) if kept == text => kept.clone(),
        tag => mapshift_nbt::pack(tag),
    };
    print_value("snbt", &snbt, &report.diagnostics, text, format)?;
    exit_on_errors(&report.diagnostics);
    Ok(())
}

fn cmd_text(engine: &Engine, json: &str, source: Version, format: Format) -> Result<()> {
    let out = engine.update_text(json, source);
    print_value("text", &out, &[], json, format)
}

fn cmd_nbt(engine: &Engine, file: &Path, source: Version, context: &str, write: bool, format: Format) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let migrated = engine
        .update_binary_nbt(&bytes, source, context)
        .with_context(|| format!("{} is not a binary NBT file", file.display()))?;

    if write {
        fs::write(file, &migrated).with_context(|| format!("failed to write {}", file.display()))?;
        return status_message(format, "migrated", &file.display().to_string());
    }

    let decoded = mapshift_nbt::binary::read(&migrated).context("migrated payload does not decode")?;
    let snbt = mapshift_nbt::pack(&mapshift_nbt::Tag::Compound(decoded.root));
    match format {
        Format::Json => {
            let out = serde_json::json!({ "file": file.display().to_string(), "snbt": snbt });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => println!("{snbt}"),
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // The explanation is the result, so stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

fn cmd_check_guides(cli: &Cli, format: Format) -> Result<()> {
    let engine = match setup(cli) {
        Ok(setup) => setup.engine,
        Err(e) => {
            match format {
                Format::Json => {
                    let out = serde_json::json!({ "ok": false, "error": format!("{e:#}") });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => eprintln!("error: {e:#}"),
            }
            process::exit(1);
        }
    };
    let roots = engine.commands().len();
    let contexts: Vec<&str> = engine.nbt_guide().contexts().collect();
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": true,
                "target": engine.target().to_string(),
                "commands": roots,
                "contexts": contexts,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("command guide: {roots} root commands");
            println!("nbt guide: {}", contexts.join(", "));
            eprintln!("guides ok (target {})", engine.target());
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Resolve versions and guides: flags first, then the profile, then the
/// built-in defaults.
fn setup(cli: &Cli) -> Result<Setup> {
    let profile: Option<MigrationProfile> = cli
        .profile
        .as_deref()
        .map(|path| load_profile(path).with_context(|| format!("failed to load profile {}", path.display())))
        .transpose()?;

    let source = match &cli.from {
        Some(text) => Some(parse_version("--from", text)?),
        None => profile.as_ref().map(|p| p.source_version),
    };
    let target = match &cli.to {
        Some(text) => parse_version("--to", text)?,
        None => profile.as_ref().map_or(Version::LATEST, MigrationProfile::target),
    };
    if target > Version::LATEST {
        bail!("target {target} is newer than the newest supported release ({})", Version::LATEST);
    }
    if let Some(source) = source
        && source > target
    {
        bail!("source {source} is newer than target {target}; migration is forward-only");
    }

    let command_guide = cli
        .command_guide
        .clone()
        .or_else(|| profile.as_ref().and_then(|p| p.command_guide.clone()));
    let nbt_guide = cli
        .nbt_guide
        .clone()
        .or_else(|| profile.as_ref().and_then(|p| p.nbt_guide.clone()));

    let mut builder = Engine::builder().target(target);
    if let Some(path) = command_guide {
        builder = builder.command_guide(read_guide(&path)?);
    }
    if let Some(path) = nbt_guide {
        builder = builder.nbt_guide(read_guide(&path)?);
    }
    if let Some(limit) = profile.as_ref().and_then(|p| p.pass_limit) {
        builder = builder.pass_limit(limit as usize);
    }
    let engine = builder.build().context("invalid guide")?;
    tracing::debug!(target = %engine.target(), "engine ready");

    Ok(Setup { engine, source })
}

fn parse_version(flag: &str, text: &str) -> Result<Version> {
    text.parse::<Version>()
        .map_err(|e| anyhow::anyhow!("{flag} {text}: {e}"))
}

fn read_guide(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read guide {}", path.display()))
}

/// Print a migrated value, with diagnostics on stderr in pretty mode.
fn print_value(key: &str, value: &str, diagnostics: &[Diagnostic], input: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({ key: value, "diagnostics": diagnostics });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            println!("{value}");
            render_diagnostics_pretty(input, "<input>", diagnostics);
            print_summary(diagnostics);
        }
    }
    Ok(())
}

/// Emit a status message for --write in the appropriate format.
fn status_message(format: Format, status: &str, file: &str) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({ "status": status, "file": file });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => eprintln!("{status}: {file}"),
    }
    Ok(())
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
