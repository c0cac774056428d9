// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

//! Release normalization for the core repository.
//!
//! Releases pass through almost untouched: the upstream fields are renamed
//! into the data layer shape and the markdown body, when present, is
//! rendered to HTML.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{github::RawRelease, markdown::render_html, store::Node};

/// Normalized release exposed to the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    /// Git tag identifying the release.
    pub tag: String,

    /// Human-readable release title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Publication timestamp as reported upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// Original markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// HTML rendering of the body; present only when the body is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Passthrough fields from the upstream release object.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>
}

impl Node for ReleaseRecord {
    fn node_id(&self) -> &str {
        &self.tag
    }
}

/// Normalizes raw releases into data layer records, preserving order.
///
/// A release with an empty or missing body yields a record without derived
/// HTML content; any other body is rendered through the markdown converter.
pub fn normalize_releases(raw: Vec<RawRelease>) -> Vec<ReleaseRecord> {
    let records: Vec<ReleaseRecord> = raw.into_iter().map(normalize_release).collect();
    info!("Normalized {} releases", records.len());
    records
}

fn normalize_release(raw: RawRelease) -> ReleaseRecord {
    let content = raw
        .body
        .as_deref()
        .filter(|body| !body.is_empty())
        .map(render_html);

    ReleaseRecord {
        tag: raw.tag_name,
        title: raw.name,
        published_at: raw.published_at,
        body: raw.body,
        content,
        extra: raw.extra
    }
}

#[cfg(test)]
mod tests {
    use super::{ReleaseRecord, normalize_releases};
    use crate::{github::RawRelease, markdown::render_html, store::Node};

    fn raw(tag: &str, body: Option<&str>) -> RawRelease {
        RawRelease {
            tag_name: tag.to_string(),
            name: Some(format!("Release {tag}")),
            published_at: Some("2020-06-01T10:00:00Z".to_string()),
            body: body.map(str::to_string),
            extra: serde_json::Map::new()
        }
    }

    #[test]
    fn empty_body_yields_no_content() {
        let records = normalize_releases(vec![raw("v1.0.0", Some(""))]);
        assert_eq!(records.len(), 1);
        assert!(records[0].content.is_none());
        assert_eq!(records[0].body.as_deref(), Some(""));
    }

    #[test]
    fn missing_body_yields_no_content() {
        let records = normalize_releases(vec![raw("v1.0.0", None)]);
        assert!(records[0].content.is_none());
    }

    #[test]
    fn non_empty_body_renders_to_html() {
        let body = "## Changes\n\n- faster loading";
        let records = normalize_releases(vec![raw("v2.0.0", Some(body))]);

        assert_eq!(records[0].content.as_deref(), Some(render_html(body).as_str()));
        assert_eq!(records[0].body.as_deref(), Some(body));
    }

    #[test]
    fn maps_upstream_fields() {
        let records = normalize_releases(vec![raw("v2.0.0", Some("body"))]);
        let record = &records[0];
        assert_eq!(record.tag, "v2.0.0");
        assert_eq!(record.title.as_deref(), Some("Release v2.0.0"));
        assert_eq!(record.published_at.as_deref(), Some("2020-06-01T10:00:00Z"));
        assert_eq!(record.node_id(), "v2.0.0");
    }

    #[test]
    fn preserves_passthrough_fields_and_order() {
        let mut first = raw("v1.0.0", None);
        first
            .extra
            .insert("prerelease".to_string(), serde_json::Value::Bool(true));
        let second = raw("v1.1.0", None);

        let records = normalize_releases(vec![first, second]);
        let tags: Vec<&str> = records.iter().map(|record| record.tag.as_str()).collect();
        assert_eq!(tags, ["v1.0.0", "v1.1.0"]);
        assert_eq!(records[0].extra["prerelease"], true);
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = ReleaseRecord {
            tag: "v1.0.0".to_string(),
            title: None,
            published_at: Some("2020-06-01T10:00:00Z".to_string()),
            body: None,
            content: None,
            extra: serde_json::Map::new()
        };

        let json = serde_json::to_value(&record).expect("serialization failed");
        assert_eq!(json["publishedAt"], "2020-06-01T10:00:00Z");
        assert!(json.get("content").is_none());
        assert!(json.get("title").is_none());
    }
}
