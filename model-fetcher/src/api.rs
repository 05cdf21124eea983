//! Client for the model-hosting API.
//!
//! Three calls per stage: a search for downloadable models, a request for the
//! download descriptor of the first hit, and the GLB download itself.

use std::path::Path;

use indicatif::ProgressBar;
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::FetchError;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_downloadable: bool,
    #[serde(default)]
    pub user: Option<ModelAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAuthor {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SearchResult {
    pub fn author(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        user.display_name
            .clone()
            .or_else(|| user.username.clone())
            .filter(|name| !name.is_empty())
    }
}

impl SearchResponse {
    /// First result that can actually be downloaded.
    pub fn first_downloadable(&self) -> Option<&SearchResult> {
        self.results.iter().find(|result| result.is_downloadable)
    }
}

/// Download formats offered for a model. Only GLB is used.
#[derive(Debug, Deserialize)]
pub struct DownloadDescriptor {
    #[serde(default)]
    pub glb: Option<DownloadLink>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

pub struct ModelApi {
    client: Client,
    base_url: String,
    token: String,
}

impl ModelApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, FetchError> {
        let token = token.ok_or(FetchError::MissingToken)?;
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        })
    }

    /// Search for `query` and return the first downloadable model.
    pub async fn search_first(&self, query: &str) -> Result<SearchResult, FetchError> {
        let url = format!("{}/search", self.base_url);
        debug!("Searching {} for '{}'", url, query);

        let resp = self
            .client
            .get(&url)
            .query(&[("type", "models"), ("downloadable", "true"), ("q", query)])
            .send()
            .await?;
        let body = success_body(resp).await?;

        let search: SearchResponse = serde_json::from_str(&body)?;
        search
            .first_downloadable()
            .cloned()
            .ok_or_else(|| FetchError::NoResult(query.to_string()))
    }

    /// Resolve the temporary GLB download URL for a model.
    pub async fn glb_download(&self, uid: &str) -> Result<DownloadLink, FetchError> {
        let url = format!("{}/models/{}/download", self.base_url, uid);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await?;
        let body = success_body(resp).await?;

        let descriptor: DownloadDescriptor = serde_json::from_str(&body)?;
        descriptor
            .glb
            .filter(|link| !link.url.is_empty())
            .ok_or_else(|| FetchError::NoGlbDownload(uid.to_string()))
    }

    /// Stream `url` into `dest`, advancing `progress` per chunk. The file is
    /// written under a `.part` name and only renamed once complete.
    pub async fn download_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressBar,
    ) -> Result<u64, FetchError> {
        let mut resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Api(format!("status {} for download", resp.status())));
        }
        if let Some(length) = resp.content_length() {
            progress.set_length(length);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let partial = dest.with_extension("glb.part");
        let mut file = fs::File::create(&partial).await?;
        let mut written = 0u64;

        let streamed = async {
            while let Some(chunk) = resp.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
                progress.set_position(written);
            }
            file.flush().await?;
            Ok::<(), FetchError>(())
        }
        .await;

        if let Err(e) = streamed {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
        fs::rename(&partial, dest).await?;
        Ok(written)
    }
}

async fn success_body(resp: Response) -> Result<String, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Api(format!("status {status}: {body}")));
    }
    Ok(resp.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_downloadable_result() {
        let body = r#"{
            "results": [
                { "uid": "a1", "name": "Locked dam", "isDownloadable": false },
                {
                    "uid": "b2",
                    "name": "Concrete Dam",
                    "isDownloadable": true,
                    "user": { "username": "builder", "displayName": "The Builder" }
                },
                { "uid": "c3", "name": "Other dam", "isDownloadable": true }
            ],
            "next": null
        }"#;
        let search: SearchResponse = serde_json::from_str(body).unwrap();
        let hit = search.first_downloadable().unwrap();
        assert_eq!(hit.uid, "b2");
        assert_eq!(hit.name, "Concrete Dam");
        assert_eq!(hit.author().as_deref(), Some("The Builder"));
    }

    #[test]
    fn author_falls_back_to_username() {
        let hit: SearchResult = serde_json::from_str(
            r#"{ "uid": "x", "isDownloadable": true, "user": { "username": "plumber", "displayName": "" } }"#,
        )
        .unwrap();
        assert_eq!(hit.author(), None);

        let hit: SearchResult = serde_json::from_str(
            r#"{ "uid": "x", "isDownloadable": true, "user": { "username": "plumber" } }"#,
        )
        .unwrap();
        assert_eq!(hit.author().as_deref(), Some("plumber"));
    }

    #[test]
    fn empty_search_has_no_hit() {
        let search: SearchResponse = serde_json::from_str(r#"{ "results": [] }"#).unwrap();
        assert!(search.first_downloadable().is_none());
        let search: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(search.first_downloadable().is_none());
    }

    #[test]
    fn descriptor_exposes_glb_link() {
        let body = r#"{
            "gltf": { "url": "https://cdn.example/model.zip", "size": 900 },
            "glb": { "url": "https://cdn.example/model.glb", "size": 512, "expires": 300 }
        }"#;
        let descriptor: DownloadDescriptor = serde_json::from_str(body).unwrap();
        let glb = descriptor.glb.unwrap();
        assert_eq!(glb.url, "https://cdn.example/model.glb");
        assert_eq!(glb.size, Some(512));

        let descriptor: DownloadDescriptor =
            serde_json::from_str(r#"{ "gltf": { "url": "x" } }"#).unwrap();
        assert!(descriptor.glb.is_none());
    }

    #[test]
    fn client_requires_token() {
        assert!(matches!(
            ModelApi::new("http://localhost", None),
            Err(FetchError::MissingToken)
        ));
        assert!(ModelApi::new("http://localhost", Some("t".into())).is_ok());
    }
}
