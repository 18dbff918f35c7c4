//! Repository configuration (`.github/release-please.yml`).
//!
//! The file is YAML. Its top level holds the repository-wide release settings,
//! the optional `primaryBranch`, and an optional `branches` list of per-branch
//! overrides. Every setting legal on a branch entry is also legal at the top
//! level, where it acts as the default for all branches.
//!
//! # Schema
//!
//! The schema is the typed decode below plus a key check: unknown keys at
//! either level are rejected, so a typo such as `releaseTpye` surfaces as a
//! schema violation instead of being silently ignored.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use super::release_type::ReleaseType;

/// Path of the configuration file, relative to the repository root.
pub const WELL_KNOWN_CONFIGURATION_FILE: &str = ".github/release-please.yml";

/// Changelog path used when the configuration does not name one.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

/// Keys accepted on both the repository level and branch entries.
const SETTINGS_KEYS: &[&str] = &[
    "releaseType",
    "packageName",
    "path",
    "changelogPath",
    "monorepoTags",
    "bumpMinorPreMajor",
    "extraFiles",
    "releaseLabels",
    "releaseLabel",
    "manifest",
    "handleGHRelease",
];

/// Keys accepted only on the repository level.
const REPOSITORY_KEYS: &[&str] = &["primaryBranch", "branches"];

/// Keys accepted only on branch entries.
const BRANCH_KEYS: &[&str] = &["branch"];

/// Errors produced when a configuration file does not satisfy the schema.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    /// The file is not valid YAML, or a field has the wrong type.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document (or a branch entry) is not a mapping.
    #[error("{location} must be a mapping")]
    NotAMapping { location: String },

    /// A key that the schema does not know.
    #[error("unknown field `{field}` in {location}")]
    UnknownField { location: String, field: String },
}

/// Release settings shared by the repository level and branch entries.
///
/// Every field is optional; absent fields fall back to the repository-level
/// value (see [`ReleaseSettings::overlay`]) and then to the builder default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSettings {
    /// Explicit release type, overriding language inference.
    #[serde(default)]
    pub release_type: Option<ReleaseType>,

    /// Package name; defaults to the repository name.
    #[serde(default)]
    pub package_name: Option<String>,

    /// Sub-directory the package lives in.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub changelog_path: Option<String>,

    #[serde(default)]
    pub monorepo_tags: Option<bool>,

    #[serde(default)]
    pub bump_minor_pre_major: Option<bool>,

    /// Additional files the builder should update with the new version.
    #[serde(default)]
    pub extra_files: Option<Vec<String>>,

    /// Labels applied to the release pull request instead of the default.
    #[serde(default)]
    pub release_labels: Option<Vec<String>>,

    /// Label the publisher applies once the release is created.
    #[serde(default)]
    pub release_label: Option<String>,

    /// Multi-package (manifest) mode.
    #[serde(default)]
    pub manifest: Option<bool>,

    /// Opt in to publishing a GitHub release after the release PR merges.
    #[serde(default, rename = "handleGHRelease")]
    pub handle_gh_release: Option<bool>,
}

impl ReleaseSettings {
    /// Returns `over` layered on top of `self`: each field of `over` that is
    /// set wins, the rest come from `self`.
    pub fn overlay(&self, over: &ReleaseSettings) -> ReleaseSettings {
        ReleaseSettings {
            release_type: over.release_type.or(self.release_type),
            package_name: over
                .package_name
                .clone()
                .or_else(|| self.package_name.clone()),
            path: over.path.clone().or_else(|| self.path.clone()),
            changelog_path: over
                .changelog_path
                .clone()
                .or_else(|| self.changelog_path.clone()),
            monorepo_tags: over.monorepo_tags.or(self.monorepo_tags),
            bump_minor_pre_major: over.bump_minor_pre_major.or(self.bump_minor_pre_major),
            extra_files: over
                .extra_files
                .clone()
                .or_else(|| self.extra_files.clone()),
            release_labels: over
                .release_labels
                .clone()
                .or_else(|| self.release_labels.clone()),
            release_label: over
                .release_label
                .clone()
                .or_else(|| self.release_label.clone()),
            manifest: over.manifest.or(self.manifest),
            handle_gh_release: over.handle_gh_release.or(self.handle_gh_release),
        }
    }
}

/// One entry of the `branches` list.
///
/// `branch` is optional at decode time so that a malformed entry does not
/// reject the whole file; the branch matcher reports it instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(flatten)]
    pub settings: ReleaseSettings,
}

/// The decoded configuration file for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfiguration {
    /// The branch release PRs target by default. Filled in from the
    /// repository's default branch when the file omits it.
    #[serde(default)]
    pub primary_branch: Option<String>,

    /// Additional release branches.
    #[serde(default)]
    pub branches: Option<Vec<BranchEntry>>,

    /// Repository-level defaults.
    #[serde(flatten)]
    pub defaults: ReleaseSettings,
}

/// A fully resolved release policy for one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfiguration {
    pub branch: String,
    pub settings: ReleaseSettings,
}

impl BranchConfiguration {
    pub fn is_manifest(&self) -> bool {
        self.settings.manifest.unwrap_or(false)
    }

    pub fn handles_github_release(&self) -> bool {
        self.settings.handle_gh_release.unwrap_or(false)
    }
}

/// Builds the configuration for `branch` by layering the branch-level settings
/// over the repository-level defaults, field by field.
pub fn merge_defaults(
    repository: &RepositoryConfiguration,
    branch: impl Into<String>,
    branch_level: &ReleaseSettings,
) -> BranchConfiguration {
    BranchConfiguration {
        branch: branch.into(),
        settings: repository.defaults.overlay(branch_level),
    }
}

/// Parses and validates the text of a configuration file.
///
/// An empty document is valid and yields the defaults.
pub fn parse_config(text: &str) -> Result<RepositoryConfiguration, ConfigValidationError> {
    let value: Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(RepositoryConfiguration::default());
    }

    check_keys(&value, "configuration", &[REPOSITORY_KEYS, SETTINGS_KEYS])?;
    if let Some(branches) = value.get("branches").and_then(Value::as_sequence) {
        for (index, entry) in branches.iter().enumerate() {
            check_keys(entry, &format!("branches[{index}]"), &[BRANCH_KEYS, SETTINGS_KEYS])?;
        }
    }

    Ok(serde_yaml::from_value(value)?)
}

fn check_keys(
    value: &Value,
    location: &str,
    allowed: &[&[&str]],
) -> Result<(), ConfigValidationError> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| ConfigValidationError::NotAMapping {
            location: location.to_string(),
        })?;

    for key in mapping.keys() {
        let name = key.as_str().unwrap_or_default();
        if !allowed.iter().any(|keys| keys.contains(&name)) {
            return Err(ConfigValidationError::UnknownField {
                location: location.to_string(),
                field: match key.as_str() {
                    Some(s) => s.to_string(),
                    None => format!("{key:?}"),
                },
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_BRANCH: &str = r#"
releaseType: java-bom
bumpMinorPreMajor: true
handleGHRelease: true
branches:
  - branch: feature-branch
    releaseType: java-yoshi
  - branch: 1.x
    packageName: legacy
    handleGHRelease: false
"#;

    #[test]
    fn parses_multi_branch_file() {
        let config = parse_config(MULTI_BRANCH).unwrap();

        assert_eq!(config.primary_branch, None);
        assert_eq!(config.defaults.release_type, Some(ReleaseType::JavaBom));
        assert_eq!(config.defaults.bump_minor_pre_major, Some(true));
        assert_eq!(config.defaults.handle_gh_release, Some(true));

        let branches = config.branches.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].branch.as_deref(), Some("feature-branch"));
        assert_eq!(branches[0].settings.release_type, Some(ReleaseType::JavaYoshi));
        assert_eq!(branches[1].settings.package_name.as_deref(), Some("legacy"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), RepositoryConfiguration::default());
        assert_eq!(parse_config("{}").unwrap(), RepositoryConfiguration::default());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = parse_config("releaseTpye: node\n").unwrap_err();
        match err {
            ConfigValidationError::UnknownField { location, field } => {
                assert_eq!(location, "configuration");
                assert_eq!(field, "releaseTpye");
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn unknown_branch_key_is_rejected() {
        let err = parse_config("branches:\n  - branch: main\n    primaryBranch: x\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigValidationError::UnknownField { ref location, .. } if location == "branches[0]"
        ));
    }

    #[test]
    fn branch_key_is_not_legal_at_top_level() {
        assert!(parse_config("branch: main\n").is_err());
    }

    #[test]
    fn unknown_release_type_is_rejected() {
        let err = parse_config("releaseType: cobol\n").unwrap_err();
        assert!(matches!(err, ConfigValidationError::Yaml(_)));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        assert!(parse_config("monorepoTags: [1, 2]\n").is_err());
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let err = parse_config("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigValidationError::NotAMapping { .. }));
    }

    #[test]
    fn overlay_prefers_branch_fields() {
        let repo = ReleaseSettings {
            release_type: Some(ReleaseType::Node),
            package_name: Some("repo-pkg".to_string()),
            bump_minor_pre_major: Some(true),
            ..Default::default()
        };
        let branch = ReleaseSettings {
            release_type: Some(ReleaseType::Python),
            bump_minor_pre_major: Some(false),
            ..Default::default()
        };

        let merged = repo.overlay(&branch);
        assert_eq!(merged.release_type, Some(ReleaseType::Python));
        assert_eq!(merged.package_name.as_deref(), Some("repo-pkg"));
        assert_eq!(merged.bump_minor_pre_major, Some(false));
    }

    #[test]
    fn merge_defaults_sets_branch() {
        let config = parse_config(MULTI_BRANCH).unwrap();
        let entry = &config.branches.as_ref().unwrap()[1];

        let merged = merge_defaults(&config, "1.x", &entry.settings);
        assert_eq!(merged.branch, "1.x");
        assert_eq!(merged.settings.package_name.as_deref(), Some("legacy"));
        assert_eq!(merged.settings.release_type, Some(ReleaseType::JavaBom));
        assert!(!merged.handles_github_release());
    }
}
