// SPDX-FileCopyrightText: 2025 bridge-core
// SPDX-License-Identifier: MIT

/// GitHub REST access for the site data loader.
///
/// Wraps an authenticated Octocrab client and exposes the read-only
/// endpoints the pipeline needs: contributor lists, release lists, and
/// repository file contents.
use base64::{Engine as _, engine::general_purpose::STANDARD};
use masterror::AppError;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::debug;

use crate::config::RepositoryId;

/// GitHub API contributor list entry.
#[derive(Debug, Clone, Deserialize,)]
pub struct RawContributor
{
    pub id:           u64,
    pub login:        String,
    pub html_url:     String,
    pub avatar_url:   String,
    #[serde(rename = "type")]
    pub account_type: String,
}

/// GitHub API release list entry.
///
/// Only the fields the normalizer touches are typed; everything else is
/// carried through `extra` untouched.
#[derive(Debug, Clone, Deserialize,)]
pub struct RawRelease
{
    pub tag_name:     String,
    #[serde(default)]
    pub name:         Option<String,>,
    #[serde(default)]
    pub published_at: Option<String,>,
    #[serde(default)]
    pub body:         Option<String,>,
    #[serde(flatten)]
    pub extra:        serde_json::Map<String, serde_json::Value,>,
}

/// GitHub contents API payload.
#[derive(Debug, Clone, Deserialize,)]
struct RawContent
{
    #[serde(default)]
    content:  Option<String,>,
    #[serde(default)]
    encoding: Option<String,>,
}

/// Authenticated GitHub client shared by all pipeline fetches.
#[derive(Debug, Clone,)]
pub struct GithubClient
{
    octocrab: Octocrab,
}

impl GithubClient
{
    /// Builds a client authenticated with the provided personal token.
    ///
    /// # Arguments
    ///
    /// * `token` - GitHub personal access token, used opaquely for all reads
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying client cannot be
    /// initialized.
    pub fn new(token: &str,) -> Result<Self, AppError,>
    {
        let octocrab = Octocrab::builder().personal_token(token,).build().map_err(|e| {
            AppError::unauthorized(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        Ok(Self {
            octocrab,
        },)
    }

    /// Fetches the contributor list of a repository.
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository to list contributors for
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the GitHub API request fails. Contributor
    /// list failures are fatal to the build.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bridge_site_data::{GithubClient, RepositoryId};
    ///
    /// # async fn example() -> Result<(), masterror::AppError> {
    /// let client = GithubClient::new("token",)?;
    /// let repo = RepositoryId::new("bridge-core", "bridge.",);
    /// let contributors = client.contributors(&repo,).await?;
    /// println!("{} contributors", contributors.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn contributors(
        &self,
        repo: &RepositoryId,
    ) -> Result<Vec<RawContributor,>, AppError,>
    {
        debug!("Fetching contributors for {}", repo);

        let contributors: Vec<RawContributor,> = self
            .octocrab
            .get(
                format!("/repos/{}/{}/contributors", repo.owner, repo.name),
                Some(&[("per_page", "100",),],),
            )
            .await
            .map_err(|e| {
                AppError::service(format!("failed to fetch contributors for {repo}: {e}"),)
            },)?;

        debug!("Fetched {} contributors for {}", contributors.len(), repo);

        Ok(contributors,)
    }

    /// Fetches the release list of a repository.
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository to list releases for
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the GitHub API request fails. Release list
    /// failures are fatal to the build.
    pub async fn releases(&self, repo: &RepositoryId,) -> Result<Vec<RawRelease,>, AppError,>
    {
        debug!("Fetching releases for {}", repo);

        let releases: Vec<RawRelease,> = self
            .octocrab
            .get(
                format!("/repos/{}/{}/releases", repo.owner, repo.name),
                Some(&[("per_page", "100",),],),
            )
            .await
            .map_err(|e| {
                AppError::service(format!("failed to fetch releases for {repo}: {e}"),)
            },)?;

        debug!("Fetched {} releases for {}", releases.len(), repo);

        Ok(releases,)
    }

    /// Fetches a repository file and decodes it into UTF-8 text.
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository containing the file
    /// * `branch` - Branch to read from
    /// * `path` - File path inside the repository
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the request fails or the payload cannot be
    /// decoded. Manifest fetch failures are fatal to the build.
    pub async fn file_contents(
        &self,
        repo: &RepositoryId,
        branch: &str,
        path: &str,
    ) -> Result<String, AppError,>
    {
        debug!("Fetching {} from {} at {}", path, repo, branch);

        let raw: RawContent = self
            .octocrab
            .get(
                format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path),
                Some(&[("ref", branch,),],),
            )
            .await
            .map_err(|e| {
                AppError::service(format!("failed to fetch {path} from {repo}: {e}"),)
            },)?;

        decode_content(path, &raw,)
    }

    /// Fetches a repository file, treating any failure as absence.
    ///
    /// Missing files, transport failures, and undecodable payloads all
    /// yield `None`; the caller proceeds with empty content. Used for
    /// per-plugin READMEs.
    pub async fn optional_file_contents(
        &self,
        repo: &RepositoryId,
        branch: &str,
        path: &str,
    ) -> Option<String,>
    {
        match self.file_contents(repo, branch, path,).await {
            Ok(contents,) => Some(contents,),
            Err(error,) => {
                debug!("Treating {} in {} as absent: {}", path, repo, error);
                None
            }
        }
    }
}

/// Decodes a contents API payload into UTF-8 text.
///
/// The API wraps base64 payloads across lines; embedded whitespace is
/// stripped before decoding.
fn decode_content(path: &str, raw: &RawContent,) -> Result<String, AppError,>
{
    let encoding = raw.encoding.as_deref().unwrap_or_default();
    if encoding != "base64" {
        return Err(AppError::service(format!(
            "unexpected encoding '{encoding}' for {path}"
        ),),);
    }

    let packed: String = raw
        .content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|ch| !ch.is_whitespace(),)
        .collect();

    let bytes = STANDARD
        .decode(packed,)
        .map_err(|e| AppError::service(format!("failed to decode {path}: {e}"),),)?;

    String::from_utf8(bytes,)
        .map_err(|e| AppError::service(format!("{path} is not valid UTF-8: {e}"),),)
}
