//! Migration profile definitions and validation for mapshift.

use mapshift_guides::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or validating a migration profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The profile file could not be read.
    #[error("failed to read profile {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A required field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// A migration profile: which map is being migrated, from which release and
/// to which release, and which guides to use.
///
/// # Example
/// ```
/// let profile = mapshift_profile::load_profile_from_str(
///     r#"{ "name": "skyblock", "source_version": "1.12.2", "target_version": "1.20.4" }"#,
/// )
/// .unwrap();
/// assert_eq!(profile.source_version.code(), 1202);
/// assert_eq!(profile.target().code(), 2004);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationProfile {
    /// Map name, used as the diagnostics label (e.g., `"skyblock"`).
    pub name: String,
    /// Release the map content was written for.
    pub source_version: Version,
    /// Release to migrate to; the newest known release when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<Version>,
    /// Replacement command grammar guide (JSONC file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_guide: Option<PathBuf>,
    /// Replacement NBT guide (JSONC file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt_guide: Option<PathBuf>,
    /// Upper bound on re-dispatch passes for one command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_limit: Option<u32>,
}

impl MigrationProfile {
    /// A profile migrating `source` to the newest release with built-in guides.
    pub fn new(name: impl Into<String>, source_version: Version) -> Self {
        Self {
            name: name.into(),
            source_version,
            target_version: None,
            command_guide: None,
            nbt_guide: None,
            pass_limit: None,
        }
    }

    /// The effective target version.
    pub fn target(&self) -> Version {
        self.target_version.unwrap_or(Version::LATEST)
    }

    /// Resolve relative guide paths against the profile's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.command_guide, &mut self.nbt_guide].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load and validate a [`MigrationProfile`] from a JSON string.
///
/// The `name` and `source_version` fields are required.
///
/// Performs structural validation after deserialization:
/// - `name` must be non-empty
/// - `source_version` must not predate 1.8 and must not exceed the newest known release
/// - `target_version` (if present) must be at least `source_version` and at most the newest known release
/// - `pass_limit` (if present) must be in range 1–64
pub fn load_profile_from_str(s: &str) -> Result<MigrationProfile, ProfileError> {
    let profile: MigrationProfile = serde_json::from_str(s)?;

    // -- Required string field validation --
    if profile.name.trim().is_empty() {
        return Err(ProfileError::InvalidField {
            field: "name".into(),
            reason: "must not be empty".into(),
        });
    }

    // -- Version window validation --
    if profile.source_version < Version::OLDEST {
        return Err(ProfileError::InvalidField {
            field: "source_version".into(),
            reason: format!(
                "{} predates the oldest supported release ({})",
                profile.source_version,
                Version::OLDEST
            ),
        });
    }
    if profile.source_version > Version::LATEST {
        return Err(ProfileError::InvalidField {
            field: "source_version".into(),
            reason: format!(
                "{} is newer than the newest known release ({})",
                profile.source_version,
                Version::LATEST
            ),
        });
    }
    if let Some(target) = profile.target_version {
        if target < profile.source_version {
            return Err(ProfileError::InvalidField {
                field: "target_version".into(),
                reason: format!(
                    "{target} precedes source_version {}; migration is forward-only",
                    profile.source_version
                ),
            });
        }
        if target > Version::LATEST {
            return Err(ProfileError::InvalidField {
                field: "target_version".into(),
                reason: format!("{target} is newer than the newest known release ({})", Version::LATEST),
            });
        }
    }

    // -- Pass limit validation --
    if let Some(limit) = profile.pass_limit
        && !(1..=64).contains(&limit)
    {
        return Err(ProfileError::InvalidField {
            field: "pass_limit".into(),
            reason: format!("{limit} is outside 1-64"),
        });
    }

    Ok(profile)
}

/// Read, validate and path-resolve a profile file.
pub fn load_profile(path: &Path) -> Result<MigrationProfile, ProfileError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut profile = load_profile_from_str(&text)?;
    if let Some(dir) = path.parent() {
        profile.resolve_paths(dir);
    }
    Ok(profile)
}
