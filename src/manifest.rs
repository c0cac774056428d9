//! Manifest document types describing plugin and extension entries.
//!
//! The types in this module mirror the structure of the JSON manifests
//! fetched from the plugin repository. Helper methods derive the values the
//! normalizer needs: the README location next to the entry link and the
//! ordered tag list combining platform tags, the version tag, and the
//! manifest-supplied tags.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target platform declared by a manifest entry.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    /// Entry targets the first-generation app only.
    #[default]
    V1,
    /// Entry targets the second-generation app only.
    V2,
    /// Entry targets both generations.
    Both
}

impl TargetPlatform {
    /// Returns the platform tags derived from this target.
    ///
    /// `both` expands to the two generation tags; a single generation yields
    /// exactly one tag.
    pub fn platform_tags(self) -> &'static [&'static str] {
        match self {
            Self::V1 => &["bridge-v1"],
            Self::V2 => &["bridge-v2"],
            Self::Both => &["bridge-v1", "bridge-v2"]
        }
    }
}

/// Raw manifest entry describing a single plugin or extension.
///
/// `author`, `tags`, and `target` are consumed during normalization; the
/// remaining fields, typed and untyped alike, pass through onto the plugin
/// record.
///
/// # Examples
///
/// ```
/// use bridge_site_data::{PluginManifestEntry, TargetPlatform};
///
/// let json = r#"{
///     "id": "snowstorm",
///     "author": "Solve Dev",
///     "version": "1.2.3",
///     "link": "plugins/snowstorm/plugin.js"
/// }"#;
/// let entry: PluginManifestEntry = serde_json::from_str(json).expect("valid entry");
/// assert_eq!(entry.target, TargetPlatform::V1);
/// assert_eq!(entry.readme_path(), "plugins/snowstorm/README.md");
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PluginManifestEntry {
    /// Unique plugin identifier.
    pub id: String,

    /// Display name of the plugin author.
    pub author: String,

    /// Plugin version string, usually dotted.
    pub version: String,

    /// Link to the plugin source file inside the repository.
    pub link: String,

    /// Optional tags supplied by the manifest.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Target platform; defaults to the first generation.
    #[serde(default)]
    pub target: TargetPlatform,

    /// Passthrough fields carried onto the plugin record.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>
}

impl PluginManifestEntry {
    /// Derives the README location for this entry.
    ///
    /// The entry link is split on both forward and back slashes, the trailing
    /// segment is dropped, and `README.md` is appended; the result always
    /// joins with forward slashes.
    pub fn readme_path(&self) -> String {
        let mut segments: Vec<&str> = self.link.split(['/', '\\']).collect();
        segments.pop();
        segments.push("README.md");
        segments.join("/")
    }

    /// Builds the ordered, lowercased tag list for this entry.
    ///
    /// Order is platform tag(s), then the version tag, then the
    /// manifest-supplied tags. All titles are lowercased; the Tag collection
    /// stores and looks tags up by this lowercased form.
    pub fn tag_titles(&self) -> Vec<String> {
        let mut titles = Vec::with_capacity(self.tags.len() + 3);

        for tag in self.target.platform_tags() {
            titles.push((*tag).to_owned());
        }
        titles.push(version_tag(&self.version));
        for tag in &self.tags {
            titles.push(tag.to_lowercase());
        }

        titles
    }
}

/// Decodes a manifest document into its entries.
///
/// # Errors
///
/// Returns [`Error::Decode`](Error::Decode) annotated with the manifest path
/// when the document is not a JSON array of entries. Manifest decode
/// failures are fatal to the build.
pub fn decode_manifest(context: &str, contents: &str) -> Result<Vec<PluginManifestEntry>, Error> {
    serde_json::from_str(contents).map_err(|source| Error::decode(context, source))
}

/// Formats the version tag for a plugin version.
///
/// Dots are replaced by dashes and the result is lowercased, so `1.2.3`
/// becomes `v1-2-3`.
fn version_tag(version: &str) -> String {
    format!("v{}", version.replace('.', "-")).to_lowercase()
}
