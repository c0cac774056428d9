// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

/// Contributor reconciliation across source repositories.
///
/// Merges contributor lists fetched from multiple repositories into one
/// deduplicated, ordered sequence keyed by login name.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{github::RawContributor, store::Node};

/// Normalized contributor exposed to the rendering layer.
///
/// Records reconciled from repository contributor lists carry the upstream
/// account identifier, profile URL, and account type. Records created on
/// demand during plugin author resolution carry a generated identifier and
/// avatar and leave the upstream-only fields unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq,)]
#[serde(rename_all = "camelCase")]
pub struct ContributorRecord
{
    /// Unique account identifier.
    pub account_id:       String,
    /// Login or display name.
    pub login:            String,
    /// Upstream account type, e.g. `User` or `Bot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type:     Option<String,>,
    /// Profile page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url:      Option<String,>,
    /// Avatar image URL.
    pub avatar_url:       String,
    /// Whether the contributor authored entries in the plugin repository.
    pub is_plugin_author: bool,
}

impl ContributorRecord
{
    /// Builds a record from a raw contributor list entry.
    ///
    /// # Arguments
    ///
    /// * `raw` - Contributor entry as returned by the GitHub API
    /// * `plugin_author` - Whether the entry came from the plugin repository
    pub fn from_raw(raw: &RawContributor, plugin_author: bool,) -> Self
    {
        Self {
            account_id:       raw.id.to_string(),
            login:            raw.login.clone(),
            account_type:     Some(raw.account_type.clone(),),
            profile_url:      Some(raw.html_url.clone(),),
            avatar_url:       raw.avatar_url.clone(),
            is_plugin_author: plugin_author,
        }
    }
}

impl Node for ContributorRecord
{
    fn node_id(&self,) -> &str
    {
        &self.account_id
    }
}

/// Contributor list fetched from one repository, in source order.
#[derive(Debug, Clone,)]
pub struct ContributorSource
{
    /// Raw entries as returned by the GitHub API.
    pub entries:        Vec<RawContributor,>,
    /// Whether entries from this source are flagged as plugin authors.
    pub plugin_authors: bool,
}

/// Deduplicates contributor lists from multiple repositories by login name.
///
/// Sources are walked in the provided order and the first occurrence of each
/// login is kept wholesale. Attribute provenance follows the first
/// occurrence: a later entry carrying the plugin-author flag does not
/// retroactively tag an earlier-accepted record, and differing attributes on
/// later duplicates are dropped. Fields of later duplicates are never merged
/// into the accepted record.
///
/// # Arguments
///
/// * `sources` - Contributor lists in reconciliation order
///
/// # Example
///
/// ```
/// use bridge_site_data::{ContributorSource, reconcile_contributors};
///
/// let reconciled = reconcile_contributors(&[ContributorSource {
///     entries:        Vec::new(),
///     plugin_authors: false,
/// }],);
/// assert!(reconciled.is_empty());
/// ```
pub fn reconcile_contributors(sources: &[ContributorSource],) -> Vec<ContributorRecord,>
{
    let total: usize = sources.iter().map(|source| source.entries.len(),).sum();
    let mut reconciled = Vec::with_capacity(total,);
    let mut seen_logins: HashSet<&str,> = HashSet::with_capacity(total,);

    for source in sources {
        for entry in &source.entries {
            if !seen_logins.insert(entry.login.as_str(),) {
                debug!("Dropping duplicate contributor {}", entry.login);
                continue;
            }

            reconciled.push(ContributorRecord::from_raw(entry, source.plugin_authors,),);
        }
    }

    info!("Reconciled {} contributors from {} sources", reconciled.len(), sources.len());

    reconciled
}
