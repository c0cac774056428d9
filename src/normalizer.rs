//! Transformation logic that converts raw manifest entries into normalized
//! plugin records.
//!
//! Each entry contributes lazily created tag records, an author reference
//! resolved through a cascading lookup, and HTML content rendered from the
//! plugin README. Entries are processed through a bounded unordered fan-out;
//! completion order is unspecified, and keyed inserts racing on a shared
//! identifier resolve deterministically to first-write-wins.

use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::RepositoryId,
    contributors::ContributorRecord,
    github::GithubClient,
    manifest::PluginManifestEntry,
    markdown::render_html,
    store::{DataStore, Node, Reference},
};

/// Number of manifest entries processed concurrently.
const MANIFEST_CONCURRENCY: usize = 8;

/// Tag record shared across the plugin collection.
///
/// Identifiers and titles are the lowercased tag string; records are created
/// lazily the first time a tag is encountered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq,)]
pub struct TagRecord
{
    /// Lowercased tag string used for lookups and references.
    pub id:    String,
    /// Display title; matches the identifier.
    pub title: String,
}

impl Node for TagRecord
{
    fn node_id(&self,) -> &str
    {
        &self.id
    }
}

/// Normalized plugin exposed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq,)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord
{
    /// Unique plugin identifier from the manifest.
    pub id:      String,
    /// Plugin version string.
    pub version: String,
    /// Link to the plugin source file.
    pub link:    String,
    /// HTML rendering of the plugin README; empty when no README exists.
    pub content: String,
    /// Site path of the plugin detail page.
    pub path:    String,
    /// Reference to the resolved author record.
    pub author:  Reference,
    /// References to the resolved tag records, in derivation order.
    pub tags:    Vec<Reference,>,
    /// Passthrough fields from the manifest entry.
    #[serde(flatten)]
    pub extra:   serde_json::Map<String, serde_json::Value,>,
}

impl Node for PluginRecord
{
    fn node_id(&self,) -> &str
    {
        &self.id
    }
}

/// Upserts the provided tag titles and returns references to them.
///
/// Each title is looked up case-sensitively against the already lowercased
/// tag identifiers and created with id = title when absent, so every
/// returned reference points at an existing record.
pub fn resolve_tags(store: &DataStore, titles: &[String],) -> Vec<Reference,>
{
    titles
        .iter()
        .map(|title| {
            let tag = store.tags.get_or_insert_with(title, || TagRecord {
                id:    title.clone(),
                title: title.clone(),
            },);
            store.tags.reference_to(&tag.id,)
        },)
        .collect()
}

/// Resolves the author of a manifest entry to a record reference.
///
/// The cascade checks the Author collection by normalized identifier
/// (lowercased, whitespace-stripped name), then the Contributor collection
/// by whitespace-stripped login, and finally creates a contributor flagged
/// as plugin author with a generated identifier and avatar. Created records
/// keep the raw author name as login while lookups use the stripped form.
pub fn resolve_author(store: &DataStore, author: &str,) -> Reference
{
    let stripped: String = author.chars().filter(|ch| !ch.is_whitespace(),).collect();
    let normalized = stripped.to_lowercase();

    if let Some(existing,) = store.authors.get_node(&normalized,) {
        return store.authors.reference_to(&existing.id,);
    }

    let contributor = store.contributors.find_or_insert_with(
        |record| record.login == stripped,
        || {
            debug!("Creating contributor record for plugin author {}", author);
            ContributorRecord {
                account_id:       Uuid::new_v4().to_string(),
                login:            author.to_owned(),
                account_type:     None,
                profile_url:      None,
                avatar_url:       format!("https://robohash.org/{author}"),
                is_plugin_author: true,
            }
        },
    );

    store.contributors.reference_to(&contributor.account_id,)
}

/// Normalizes one manifest entry and inserts the resulting plugin record.
///
/// Tag and author resolution run before the duplicate check, so an entry
/// whose identifier is already stored still contributes its tags and author.
/// Returns `true` when the record was inserted; a duplicate identifier is a
/// silent no-op that leaves the stored record untouched.
pub fn normalize_plugin(
    store: &DataStore,
    entry: &PluginManifestEntry,
    readme: Option<&str,>,
) -> bool
{
    let content = readme
        .filter(|markdown| !markdown.is_empty(),)
        .map(render_html,)
        .unwrap_or_default();

    let tags = resolve_tags(store, &entry.tag_titles(),);
    let author = resolve_author(store, &entry.author,);

    let record = PluginRecord {
        id: entry.id.clone(),
        version: entry.version.clone(),
        link: entry.link.clone(),
        content,
        path: format!("/plugins/{}/", entry.id),
        author,
        tags,
        extra: entry.extra.clone(),
    };

    let inserted = store.plugins.insert_if_absent(record,);
    if !inserted {
        debug!("Skipping duplicate plugin {}", entry.id);
    }

    inserted
}

/// Fetches the README for one manifest entry and normalizes it.
///
/// A failed README fetch yields empty content for this entry only; other
/// entries are unaffected.
pub async fn process_manifest_entry(
    client: &GithubClient,
    repo: &RepositoryId,
    branch: &str,
    store: &DataStore,
    entry: &PluginManifestEntry,
)
{
    let readme = client.optional_file_contents(repo, branch, &entry.readme_path(),).await;
    normalize_plugin(store, entry, readme.as_deref(),);
}

/// Processes all manifest entries through a bounded unordered fan-out.
///
/// The pipeline suspends until every entry completes. No ordering guarantee
/// exists between entries; two entries sharing an identifier resolve to
/// first-write-wins through the keyed insert.
pub async fn load_plugins(
    client: &GithubClient,
    repo: &RepositoryId,
    branch: &str,
    store: &DataStore,
    entries: &[PluginManifestEntry],
)
{
    info!("Processing {} manifest entries", entries.len());

    let pb = ProgressBar::new(entries.len() as u64,);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.yellow} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",)
            .expect("valid template",),
    );
    pb.set_message("Normalizing plugins...",);

    stream::iter(entries.iter().map(|entry| {
        let pb = &pb;
        async move {
            process_manifest_entry(client, repo, branch, store, entry,).await;
            pb.inc(1,);
        }
    },),)
    .buffer_unordered(MANIFEST_CONCURRENCY,)
    .collect::<Vec<(),>>()
    .await;

    pb.finish_with_message(format!("Processed {} manifest entries", entries.len()),);
}

#[cfg(test)]
mod tests
{
    use super::{normalize_plugin, resolve_author, resolve_tags};
    use crate::{
        manifest::{PluginManifestEntry, TargetPlatform},
        store::{AuthorRecord, DataStore, Reference},
    };

    fn entry(id: &str, author: &str,) -> PluginManifestEntry
    {
        PluginManifestEntry {
            id:      id.to_owned(),
            author:  author.to_owned(),
            version: "1.2.3".to_owned(),
            link:    format!("plugins/{id}/plugin.js"),
            tags:    vec!["Utility".to_owned()],
            target:  TargetPlatform::V1,
            extra:   serde_json::Map::new(),
        }
    }

    #[test]
    fn duplicate_plugin_id_keeps_first_record()
    {
        let store = DataStore::new();

        let first = normalize_plugin(&store, &entry("snowstorm", "Solve Dev",), Some("# First",),);
        let second =
            normalize_plugin(&store, &entry("snowstorm", "Other Dev",), Some("# Second",),);

        assert!(first);
        assert!(!second, "second entry with the same id must be dropped",);
        assert_eq!(store.plugins.len(), 1);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        assert!(stored.content.contains("First"));
    }

    #[test]
    fn unknown_author_creates_flagged_contributor()
    {
        let store = DataStore::new();

        normalize_plugin(&store, &entry("snowstorm", "Solve Dev",), None,);

        assert_eq!(store.contributors.len(), 1);
        let created = store
            .contributors
            .find_node(|record| record.login == "Solve Dev",)
            .expect("expected created contributor",);
        assert!(created.is_plugin_author);
        assert!(created.avatar_url.contains("Solve Dev"));
        assert!(created.account_type.is_none());
        assert!(created.profile_url.is_none());

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        assert_eq!(stored.author, Reference::to("Contributor", created.account_id,));
    }

    #[test]
    fn author_resolution_prefers_author_collection()
    {
        let store = DataStore::new();
        store.authors.add_node(AuthorRecord {
            id:   "solvedev".to_owned(),
            name: "Solve Dev".to_owned(),
        },);

        let reference = resolve_author(&store, "Solve Dev",);
        assert_eq!(reference, Reference::to("Author", "solvedev",));
        assert!(store.contributors.is_empty(), "no contributor may be created",);
    }

    #[test]
    fn author_resolution_matches_contributor_by_stripped_login()
    {
        let store = DataStore::new();
        store.contributors.add_node(crate::contributors::ContributorRecord {
            account_id:       "42".to_owned(),
            login:            "SolveDev".to_owned(),
            account_type:     Some("User".to_owned(),),
            profile_url:      Some("https://github.com/SolveDev".to_owned(),),
            avatar_url:       "https://avatars.githubusercontent.com/u/42".to_owned(),
            is_plugin_author: true,
        },);

        let reference = resolve_author(&store, "Solve Dev",);
        assert_eq!(reference, Reference::to("Contributor", "42",));
        assert_eq!(store.contributors.len(), 1);
    }

    #[test]
    fn spaceless_author_resolves_to_one_record_across_entries()
    {
        let store = DataStore::new();

        let first = resolve_author(&store, "SolveDev",);
        let second = resolve_author(&store, "SolveDev",);

        assert_eq!(first, second);
        assert_eq!(store.contributors.len(), 1);
    }

    #[test]
    fn created_author_keeps_raw_name_as_login()
    {
        let store = DataStore::new();

        resolve_author(&store, "Solve Dev",);

        let created = store
            .contributors
            .find_node(|record| record.is_plugin_author,)
            .expect("expected created contributor",);
        assert_eq!(created.login, "Solve Dev");
    }

    #[test]
    fn missing_readme_yields_empty_content()
    {
        let store = DataStore::new();

        normalize_plugin(&store, &entry("snowstorm", "Solve Dev",), None,);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        assert_eq!(stored.content, "");
    }

    #[test]
    fn readme_markdown_renders_to_html()
    {
        let store = DataStore::new();

        normalize_plugin(&store, &entry("snowstorm", "Solve Dev",), Some("# Snowstorm",),);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        assert_eq!(stored.content, "<h1>Snowstorm</h1>\n");
    }

    #[test]
    fn every_tag_reference_points_at_a_stored_tag()
    {
        let store = DataStore::new();
        let mut manifest_entry = entry("snowstorm", "Solve Dev",);
        manifest_entry.target = TargetPlatform::Both;

        normalize_plugin(&store, &manifest_entry, None,);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        for reference in &stored.tags {
            assert_eq!(reference.type_name, "Tag");
            assert!(
                store.tags.get_node(&reference.id,).is_some(),
                "referenced tag must exist in the Tag collection",
            );
        }

        let ids: Vec<String,> = stored.tags.iter().map(|tag| tag.id.clone(),).collect();
        assert_eq!(ids, ["bridge-v1", "bridge-v2", "v1-2-3", "utility"]);
    }

    #[test]
    fn tags_are_created_once_across_entries()
    {
        let store = DataStore::new();
        let titles = vec!["utility".to_owned(), "utility".to_owned()];

        let references = resolve_tags(&store, &titles,);
        assert_eq!(references.len(), 2);
        assert_eq!(store.tags.len(), 1);
    }

    #[test]
    fn plugin_path_derives_from_id()
    {
        let store = DataStore::new();

        normalize_plugin(&store, &entry("snowstorm", "Solve Dev",), None,);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        assert_eq!(stored.path, "/plugins/snowstorm/");
    }

    #[test]
    fn manifest_passthrough_fields_land_on_the_record()
    {
        let store = DataStore::new();
        let mut manifest_entry = entry("snowstorm", "Solve Dev",);
        manifest_entry
            .extra
            .insert("description".to_owned(), serde_json::Value::String("Particles".to_owned(),),);

        normalize_plugin(&store, &manifest_entry, None,);

        let stored = store.plugins.get_node("snowstorm",).expect("expected stored plugin",);
        let json = serde_json::to_value(&stored,).expect("serialization failed",);
        assert_eq!(json["description"], "Particles");
        assert_eq!(json["author"]["typeName"], "Contributor");
        assert!(json.get("target",).is_none(), "target is consumed, not stored",);
    }

    #[test]
    fn concurrent_entries_with_same_id_store_one_plugin()
    {
        let store = DataStore::new();

        std::thread::scope(|scope| {
            for index in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    let manifest_entry = entry("snowstorm", &format!("Author {index}"),);
                    normalize_plugin(store, &manifest_entry, None,);
                },);
            }
        },);

        assert_eq!(store.plugins.len(), 1);
    }
}
