// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

//! Orchestration of the four loader stages.
//!
//! The pipeline runs once per build: contributor lists are fetched
//! sequentially in source order, releases are normalized and stored,
//! reconciled contributors are stored, and finally the manifest entries are
//! processed through the bounded fan-out. All contributor insertions happen
//! before any plugin processing because author resolution reads from the
//! contributor collection.
//!
//! Contributor list, release list, and manifest failures abort the run with
//! the first error; per-plugin README failures are handled inside the
//! fan-out and never abort the run. The caller serializes the store only
//! after this function returns success, so a failed run commits no output.
//!
//! Page generation happens downstream once the snapshot is written. It reads
//! the collections through the store contract and receives nothing else from
//! the loader; the hook exists on the rendering side and is intentionally
//! left empty here.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    config::SourceConfig,
    contributors::{ContributorSource, reconcile_contributors},
    error::Error,
    github::GithubClient,
    manifest::decode_manifest,
    normalizer::load_plugins,
    releases::normalize_releases,
    store::DataStore
};

/// Metadata key under which the configured settings value is attached.
pub const SETTINGS_METADATA_KEY: &str = "settings";

/// Populates the data store from the configured GitHub sources.
///
/// # Arguments
///
/// * `client` - Authenticated GitHub client
/// * `config` - Source repositories, manifest paths, and settings
/// * `store` - Mutable collections receiving the normalized records
///
/// # Errors
///
/// Returns an [`Error`] when a contributor list, the release list, or a
/// manifest cannot be fetched or decoded. No retry is attempted.
///
/// # Example
///
/// ```no_run
/// use bridge_site_data::{DataStore, GithubClient, SourceConfig, load_source};
///
/// # async fn example() -> Result<(), bridge_site_data::Error> {
/// let client = GithubClient::new("token")?;
/// let store = DataStore::new();
/// load_source(&client, &SourceConfig::default(), &store).await?;
/// println!("{} plugins loaded", store.plugins.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_source(
    client: &GithubClient,
    config: &SourceConfig,
    store: &DataStore
) -> Result<(), Error> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}")
            .expect("valid template")
    );

    store.add_metadata(SETTINGS_METADATA_KEY, config.settings.clone());

    let repositories = &config.repositories;

    let mut sources = Vec::with_capacity(4);
    for (repository, plugin_authors) in [
        (&repositories.core, false),
        (&repositories.plugins, true),
        (&repositories.data, false),
        (&repositories.editor, false)
    ] {
        pb.set_message(format!("Fetching contributors from {repository}..."));
        sources.push(ContributorSource {
            entries: client.contributors(repository).await?,
            plugin_authors
        });
    }
    let contributors = reconcile_contributors(&sources);

    pb.set_message(format!("Fetching releases from {}...", repositories.core));
    let releases = normalize_releases(client.releases(&repositories.core).await?);
    info!("Storing {} releases", releases.len());
    for release in releases {
        store.releases.add_node(release);
    }

    info!("Storing {} contributors", contributors.len());
    for contributor in contributors {
        store.contributors.add_node(contributor);
    }

    pb.set_message("Fetching plugin manifests...");
    let mut entries = Vec::new();
    for manifest in &config.manifests {
        debug!("Fetching manifest {}", manifest);
        let contents = client
            .file_contents(&repositories.plugins, &config.branch, manifest)
            .await?;
        entries.extend(decode_manifest(manifest, &contents)?);
    }
    pb.finish_with_message(format!("Fetched {} manifest entries", entries.len()));

    load_plugins(client, &repositories.plugins, &config.branch, store, &entries).await;

    Ok(())
}
