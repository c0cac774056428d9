// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

//! In-memory data store backing the site data layer.
//!
//! The store models the add-collection / add-node / find-node /
//! create-reference contract consumed by the downstream page renderer.
//! Collections are explicit mutable values handed into each pipeline stage
//! rather than process-wide singletons, and every keyed operation
//! (insert-if-absent, get-or-insert) holds the collection lock across the
//! lookup and the insertion, so concurrent writers racing on the same key
//! resolve deterministically to first-write-wins.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard}
};

use serde::{Deserialize, Serialize};

use crate::{
    contributors::ContributorRecord,
    normalizer::{PluginRecord, TagRecord},
    releases::ReleaseRecord
};

/// Collection name holding release records.
pub const RELEASE_TYPE: &str = "Release";
/// Collection name holding contributor records.
pub const CONTRIBUTOR_TYPE: &str = "Contributor";
/// Collection name holding plugin records.
pub const PLUGIN_TYPE: &str = "Plugin";
/// Collection name holding tag records.
pub const TAG_TYPE: &str = "Tag";
/// Collection name holding author records owned by the rendering layer.
pub const AUTHOR_TYPE: &str = "Author";

/// Record stored in a [`Collection`], addressable by a stable identifier.
pub trait Node {
    /// Stable identifier of the record inside its collection.
    fn node_id(&self) -> &str;
}

/// Typed pointer from one record to another, resolved by the data store.
///
/// References carry the collection name and the target identifier; they are
/// not an ownership relation, and the store does not verify them beyond the
/// guarantees the pipeline establishes (tags are upserted before references
/// to them are created).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Name of the collection containing the referenced record.
    pub type_name: String,
    /// Identifier of the referenced record.
    pub id:        String
}

impl Reference {
    /// Creates a reference to the record with `id` in the named collection.
    pub fn to<T, I>(type_name: T, id: I) -> Self
    where
        T: Into<String>,
        I: Into<String>
    {
        Self {
            type_name: type_name.into(),
            id:        id.into()
        }
    }
}

/// Author record consulted during plugin author resolution.
///
/// The Author collection is owned by the downstream rendering layer; the
/// pipeline only reads it. Its identifiers are lowercased, whitespace-free
/// author names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    /// Normalized author identifier.
    pub id:   String,
    /// Display name of the author.
    pub name: String
}

impl Node for AuthorRecord {
    fn node_id(&self) -> &str {
        &self.id
    }
}

/// Named, ordered set of typed records exposed to downstream rendering.
///
/// Insertion order is preserved; all mutating operations take `&self` so a
/// collection can be shared across the concurrent manifest fan-out.
#[derive(Debug)]
pub struct Collection<T> {
    type_name: &'static str,
    nodes:     Mutex<Vec<T>>
}

impl<T> Collection<T>
where
    T: Node + Clone
{
    /// Creates an empty collection with the provided type name.
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            nodes: Mutex::new(Vec::new())
        }
    }

    /// Returns the collection type name used in references.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Appends a record unconditionally and returns a reference to it.
    pub fn add_node(&self, node: T) -> Reference {
        let reference = self.reference_to(node.node_id());
        self.guard().push(node);
        reference
    }

    /// Returns a copy of the record with the provided identifier.
    pub fn get_node(&self, id: &str) -> Option<T> {
        self.guard().iter().find(|node| node.node_id() == id).cloned()
    }

    /// Returns a copy of the first record matching the predicate.
    pub fn find_node<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool
    {
        self.guard().iter().find(|node| predicate(node)).cloned()
    }

    /// Inserts the record unless one with the same identifier exists.
    ///
    /// The lookup and the insertion happen under a single lock, so two
    /// concurrent calls with the same identifier resolve to exactly one
    /// stored record: the first writer wins and later records are dropped
    /// without modifying the stored one. Returns `true` when the record was
    /// inserted.
    pub fn insert_if_absent(&self, node: T) -> bool {
        let mut nodes = self.guard();
        if nodes.iter().any(|existing| existing.node_id() == node.node_id()) {
            return false;
        }
        nodes.push(node);
        true
    }

    /// Returns the record with the provided identifier, creating it through
    /// `make` when absent.
    ///
    /// The upsert key is the record identifier; the operation is idempotent
    /// and atomic with respect to other keyed operations on the collection.
    pub fn get_or_insert_with<F>(&self, id: &str, make: F) -> T
    where
        F: FnOnce() -> T
    {
        let mut nodes = self.guard();
        if let Some(existing) = nodes.iter().find(|node| node.node_id() == id) {
            return existing.clone();
        }
        let node = make();
        nodes.push(node.clone());
        node
    }

    /// Returns the first record matching the predicate, creating one through
    /// `make` when no record matches.
    ///
    /// Lookup and insertion share one lock acquisition, making the
    /// find-or-create sequence atomic for callers whose lookup key differs
    /// from the record identifier.
    pub fn find_or_insert_with<P, F>(&self, predicate: P, make: F) -> T
    where
        P: Fn(&T) -> bool,
        F: FnOnce() -> T
    {
        let mut nodes = self.guard();
        if let Some(existing) = nodes.iter().find(|node| predicate(node)) {
            return existing.clone();
        }
        let node = make();
        nodes.push(node.clone());
        node
    }

    /// Creates a reference to the record with the provided identifier.
    pub fn reference_to(&self, id: &str) -> Reference {
        Reference::to(self.type_name, id)
    }

    /// Returns a snapshot of all records in insertion order.
    pub fn nodes(&self) -> Vec<T> {
        self.guard().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Returns `true` when the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<T>> {
        match self.nodes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner()
        }
    }
}

/// Mutable stores populated by one pipeline run and handed to the renderer.
#[derive(Debug)]
pub struct DataStore {
    /// Release records from the core repository.
    pub releases:     Collection<ReleaseRecord>,
    /// Reconciled contributor records, plus authors created on demand.
    pub contributors: Collection<ContributorRecord>,
    /// Normalized plugin records.
    pub plugins:      Collection<PluginRecord>,
    /// Lazily created tag records.
    pub tags:         Collection<TagRecord>,
    /// Author records owned by the rendering layer; read-only here.
    pub authors:      Collection<AuthorRecord>,
    metadata:         Mutex<BTreeMap<String, serde_json::Value>>
}

impl DataStore {
    /// Creates a store with the five named collections empty.
    pub fn new() -> Self {
        Self {
            releases:     Collection::new(RELEASE_TYPE),
            contributors: Collection::new(CONTRIBUTOR_TYPE),
            plugins:      Collection::new(PLUGIN_TYPE),
            tags:         Collection::new(TAG_TYPE),
            authors:      Collection::new(AUTHOR_TYPE),
            metadata:     Mutex::new(BTreeMap::new())
        }
    }

    /// Attaches a build-wide metadata value under the provided key.
    pub fn add_metadata<K>(&self, key: K, value: serde_json::Value)
    where
        K: Into<String>
    {
        self.metadata_guard().insert(key.into(), value);
    }

    /// Returns a snapshot of the attached metadata.
    pub fn metadata(&self) -> BTreeMap<String, serde_json::Value> {
        self.metadata_guard().clone()
    }

    /// Captures the collections and metadata for serialization.
    pub fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            metadata:    self.metadata(),
            collections: CollectionsSnapshot {
                releases:     self.releases.nodes(),
                contributors: self.contributors.nodes(),
                plugins:      self.plugins.nodes(),
                tags:         self.tags.nodes(),
                authors:      self.authors.nodes()
            }
        }
    }

    fn metadata_guard(&self) -> MutexGuard<'_, BTreeMap<String, serde_json::Value>> {
        match self.metadata.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner()
        }
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of the store produced after a successful pipeline run.
#[derive(Debug, Serialize)]
pub struct DataSnapshot {
    /// Build-wide metadata values keyed by name.
    pub metadata:    BTreeMap<String, serde_json::Value>,
    /// All collections keyed by their type name.
    pub collections: CollectionsSnapshot
}

/// Collections keyed by the type names the renderer queries.
#[derive(Debug, Serialize)]
pub struct CollectionsSnapshot {
    /// Release records in insertion order.
    #[serde(rename = "Release")]
    pub releases:     Vec<ReleaseRecord>,
    /// Contributor records in insertion order.
    #[serde(rename = "Contributor")]
    pub contributors: Vec<ContributorRecord>,
    /// Plugin records in insertion order.
    #[serde(rename = "Plugin")]
    pub plugins:      Vec<PluginRecord>,
    /// Tag records in insertion order.
    #[serde(rename = "Tag")]
    pub tags:         Vec<TagRecord>,
    /// Author records in insertion order.
    #[serde(rename = "Author")]
    pub authors:      Vec<AuthorRecord>
}
