//! Configuration document types describing the GitHub sources feeding the
//! site data layer.
//!
//! The types in this module mirror the structure of the YAML documents
//! consumed by the loader CLI. Every field carries a default matching the
//! upstream bridge-core repositories, so an omitted configuration file yields
//! the canonical source set. The document also carries an opaque `settings`
//! value that is attached verbatim to the data store metadata.

use std::{fs, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Branch queried for manifests and READMEs when none is configured.
const DEFAULT_BRANCH: &str = "master";
/// Manifest documents listing plugin and extension metadata records.
const DEFAULT_MANIFESTS: &[&str] = &["plugins.json", "extensions.json"];
/// Account owning the default source repositories.
const DEFAULT_OWNER: &str = "bridge-core";

/// Root configuration document describing the repositories to read.
///
/// # Examples
///
/// ```
/// use bridge_site_data::SourceConfig;
///
/// let yaml = r#"
/// repositories:
///   core:
///     owner: bridge-core
///     name: "bridge."
/// branch: master
/// "#;
/// let config: SourceConfig = serde_yaml::from_str(yaml).expect("valid configuration");
/// assert_eq!(config.repositories.core.owner, "bridge-core");
/// assert_eq!(config.manifests, vec!["plugins.json", "extensions.json"]);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    /// Repositories read by the pipeline.
    #[serde(default)]
    pub repositories: RepositorySet,

    /// Manifest file paths fetched from the plugin repository.
    #[serde(default = "default_manifests")]
    pub manifests: Vec<String>,

    /// Branch queried for manifest and README contents.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Opaque settings value attached to the store metadata under the
    /// `settings` key and surfaced to the page renderer unchanged.
    #[serde(default)]
    pub settings: serde_json::Value
}

/// The four repositories contributing contributor, release, and plugin data.
///
/// Source order matters: contributor reconciliation walks the repositories in
/// the declared order (core, plugins, data, editor) and keeps the first
/// occurrence of each login.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepositorySet {
    /// Main application repository; contributes contributors and releases.
    #[serde(default = "default_core_repository")]
    pub core: RepositoryId,

    /// Plugin repository; contributes contributors (flagged as plugin
    /// authors), the manifest documents, and per-plugin READMEs.
    #[serde(default = "default_plugins_repository")]
    pub plugins: RepositoryId,

    /// Data repository; contributes contributors.
    #[serde(default = "default_data_repository")]
    pub data: RepositoryId,

    /// Editor repository; contributes contributors.
    #[serde(default = "default_editor_repository")]
    pub editor: RepositoryId
}

/// Owner and name pair identifying a GitHub repository.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    /// Account that owns the repository.
    #[serde(alias = "user")]
    pub owner: String,

    /// Repository name.
    #[serde(alias = "repo")]
    pub name: String
}

impl RepositoryId {
    /// Creates a repository identifier from owner and name parts.
    pub fn new<O, N>(owner: O, name: N) -> Self
    where
        O: Into<String>,
        N: Into<String>
    {
        Self {
            owner: owner.into(),
            name:  name.into()
        }
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Default for RepositorySet {
    fn default() -> Self {
        Self {
            core:    default_core_repository(),
            plugins: default_plugins_repository(),
            data:    default_data_repository(),
            editor:  default_editor_repository()
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repositories: RepositorySet::default(),
            manifests:    default_manifests(),
            branch:       default_branch(),
            settings:     serde_json::Value::Null
        }
    }
}

impl SourceConfig {
    /// Checks the configuration against loader invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when a repository
    /// identifier is malformed, the manifest list is empty, or the branch
    /// name is blank or contains whitespace.
    pub fn validate(&self) -> Result<(), Error> {
        for (field, repository) in [
            ("repositories.core", &self.repositories.core),
            ("repositories.plugins", &self.repositories.plugins),
            ("repositories.data", &self.repositories.data),
            ("repositories.editor", &self.repositories.editor)
        ] {
            validate_identifier(&repository.owner, &format!("{field}.owner"))?;
            validate_identifier(&repository.name, &format!("{field}.name"))?;
        }

        if self.manifests.is_empty() {
            return Err(Error::validation("manifests must list at least one document"));
        }
        for manifest in &self.manifests {
            if manifest.trim().is_empty() {
                return Err(Error::validation("manifest paths cannot be empty"));
            }
        }

        let branch = self.branch.trim();
        if branch.is_empty() {
            return Err(Error::validation("branch cannot be empty"));
        }
        if branch.chars().any(char::is_whitespace) {
            return Err(Error::validation("branch cannot contain whitespace"));
        }

        Ok(())
    }
}

/// Loads and validates a source configuration from the provided YAML file.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// deserialized, or the configuration violates invariants.
pub fn load_config(path: &Path) -> Result<SourceConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Parses and validates a source configuration from a YAML document string.
///
/// This function is suitable for unit tests and higher-level callers that
/// already obtained the configuration contents.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// and [`Error::Validation`](Error::Validation) when invariants are violated.
pub fn parse_config(contents: &str) -> Result<SourceConfig, Error> {
    let config: SourceConfig = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Validates identifier-like fields such as owners or repository names.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when the value does not
/// match the GitHub identifier shape.
fn validate_identifier(value: &str, field: &str) -> Result<(), Error> {
    let pattern = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$")
        .map_err(|e| Error::validation(format!("invalid identifier pattern: {e}")))?;

    if !pattern.is_match(value) {
        return Err(Error::validation(format!(
            "{field} '{value}' is not a valid GitHub identifier"
        )));
    }

    Ok(())
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_owned()
}

fn default_manifests() -> Vec<String> {
    DEFAULT_MANIFESTS.iter().map(|path| (*path).to_owned()).collect()
}

fn default_core_repository() -> RepositoryId {
    RepositoryId::new(DEFAULT_OWNER, "bridge.")
}

fn default_plugins_repository() -> RepositoryId {
    RepositoryId::new(DEFAULT_OWNER, "plugins")
}

fn default_data_repository() -> RepositoryId {
    RepositoryId::new(DEFAULT_OWNER, "data")
}

fn default_editor_repository() -> RepositoryId {
    RepositoryId::new(DEFAULT_OWNER, "editor")
}
