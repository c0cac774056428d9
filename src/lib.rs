//! Build-time data layer loader for the bridge. website.
//!
//! The library fetches contributor, release, and plugin metadata from the
//! bridge-core GitHub repositories and normalizes it into typed collections
//! consumed by a page-rendering layer. The pipeline runs once per build:
//! contributor lists are reconciled into a deduplicated set, releases are
//! rendered to HTML, and manifest entries are normalized into plugin records
//! cross-referencing their tags and authors. All public APIs are documented
//! with invariants, error semantics, and minimal examples to facilitate
//! integration in site tooling.

mod config;
mod contributors;
mod error;
mod github;
mod manifest;
mod markdown;
mod normalizer;
mod pipeline;
mod releases;
mod store;

pub use config::{RepositoryId, RepositorySet, SourceConfig, load_config, parse_config};
pub use contributors::{ContributorRecord, ContributorSource, reconcile_contributors};
pub use error::{Error, io_error};
pub use github::{GithubClient, RawContributor, RawRelease};
pub use manifest::{PluginManifestEntry, TargetPlatform, decode_manifest};
pub use markdown::render_html;
pub use normalizer::{
    PluginRecord, TagRecord, load_plugins, normalize_plugin, process_manifest_entry,
    resolve_author, resolve_tags,
};
pub use pipeline::{SETTINGS_METADATA_KEY, load_source};
pub use releases::{ReleaseRecord, normalize_releases};
pub use store::{
    AuthorRecord, Collection, CollectionsSnapshot, DataSnapshot, DataStore, Node, Reference,
};
