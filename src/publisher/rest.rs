//! WordPress REST API (wp/v2) publisher.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::{pick_random_category, Category, NewPost, Publisher, PublishResult};
use crate::config::WordPressConfig;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct RestPublisher {
    client: Client,
    api_url: String,
    auth_header: String,
    rng: StdRng,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    id: u64,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    id: u64,
    #[serde(default)]
    name: String,
}

impl RestPublisher {
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        let base = normalize_site_url(&config.url);
        let token = BASE64.encode(format!(
            "{}:{}",
            config.username,
            config.password.expose()
        ));
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .map_err(|e| Error::Publish(format!("failed to build HTTP client: {}", e)))?,
            api_url: format!("{}/wp-json/wp/v2", base),
            auth_header: format!("Basic {}", token),
            rng: StdRng::from_entropy(),
        })
    }

    /// Force a deterministic category pick (tests).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        let response = self
            .client
            .get(format!("{}/categories", self.api_url))
            .header("Authorization", &self.auth_header)
            .query(&[("per_page", "100")])
            .send()
            .await
            .map_err(|e| Error::Publish(format!("category list request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Publish(format!(
                "category list returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("bad category list response: {}", e)))
    }

    async fn find_category(&self, name: &str) -> Result<Option<u64>> {
        let response = self
            .client
            .get(format!("{}/categories", self.api_url))
            .header("Authorization", &self.auth_header)
            .query(&[("search", name)])
            .send()
            .await
            .map_err(|e| Error::Publish(format!("category search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Publish(format!(
                "category search returned {}",
                response.status()
            )));
        }
        let categories: Vec<Category> = response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("bad category search response: {}", e)))?;
        Ok(categories.into_iter().find(|c| c.name == name).map(|c| c.id))
    }

    /// Resolve the target category id: explicit name if it exists on the
    /// site, otherwise a random pick excluding the default bucket. Failures
    /// here are not fatal; the post just goes out uncategorized.
    async fn resolve_category(&mut self, requested: Option<&str>) -> Option<u64> {
        if let Some(name) = requested {
            match self.find_category(name).await {
                Ok(Some(id)) => {
                    debug!("Found category '{}' (ID: {})", name, id);
                    return Some(id);
                }
                Ok(None) => info!("Category '{}' not found, picking at random", name),
                Err(e) => warn!("Category search failed ({}), picking at random", e),
            }
        }
        match self.get_categories().await {
            Ok(categories) => {
                let picked = pick_random_category(&categories, &mut self.rng)?;
                info!(
                    "Randomly selected category '{}' (ID: {})",
                    picked.name, picked.id
                );
                Some(picked.id)
            }
            Err(e) => {
                warn!("Category list failed ({}), posting without a category", e);
                None
            }
        }
    }

    /// Create the tag or reuse an existing one with the same name.
    async fn ensure_tag(&self, name: &str) -> Result<Option<u64>> {
        let response = self
            .client
            .post(format!("{}/tags", self.api_url))
            .header("Authorization", &self.auth_header)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| Error::Publish(format!("tag create failed: {}", e)))?;

        match response.status().as_u16() {
            201 => {
                let tag: TagResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Publish(format!("bad tag response: {}", e)))?;
                Ok(Some(tag.id))
            }
            400 => {
                // Tag likely exists already; look it up
                let response = self
                    .client
                    .get(format!("{}/tags", self.api_url))
                    .header("Authorization", &self.auth_header)
                    .query(&[("search", name)])
                    .send()
                    .await
                    .map_err(|e| Error::Publish(format!("tag search failed: {}", e)))?;
                let tags: Vec<TagResponse> = response
                    .json()
                    .await
                    .map_err(|e| Error::Publish(format!("bad tag search response: {}", e)))?;
                Ok(tags.into_iter().find(|t| t.name == name).map(|t| t.id))
            }
            status => Err(Error::Publish(format!("tag create returned {}", status))),
        }
    }
}

#[async_trait]
impl Publisher for RestPublisher {
    async fn test_connection(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/users/me", self.api_url))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("REST connection failed: {}", e)))?;

        match response.status().as_u16() {
            200 => Ok(()),
            401 => Err(Error::Publish(
                "REST authentication failed: bad username or password".to_string(),
            )),
            status => Err(Error::Publish(format!("REST connection returned {}", status))),
        }
    }

    async fn publish(&mut self, post: &NewPost) -> Result<PublishResult> {
        info!("Publishing via REST: {}", post.title);

        let category_id = self.resolve_category(post.category.as_deref()).await;

        let mut tag_ids = Vec::new();
        for tag in &post.tags {
            match self.ensure_tag(tag).await {
                Ok(Some(id)) => tag_ids.push(id),
                Ok(None) => {}
                Err(e) => warn!("Tag '{}' skipped: {}", tag, e),
            }
        }

        let mut body = json!({
            "title": post.title,
            "content": post.content,
            "status": post.status,
        });
        if let Some(id) = category_id {
            body["categories"] = json!([id]);
        }
        if !tag_ids.is_empty() {
            body["tags"] = json!(tag_ids);
        }

        let response = self
            .client
            .post(format!("{}/posts", self.api_url))
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("post request failed: {}", e)))?;

        if response.status().as_u16() != 201 {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!(
                "post create returned {}: {}",
                status, text
            )));
        }

        let created: PostResponse = response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("bad post response: {}", e)))?;

        info!(
            "Post created (ID: {}, status: {})",
            created.id, post.status
        );
        Ok(PublishResult {
            remote_id: created.id.to_string(),
            link: created.link,
        })
    }
}

/// Normalize a configured site URL: drop an `/xmlrpc.php` suffix, default
/// to https when no scheme is given, and trim trailing slashes.
pub fn normalize_site_url(url: &str) -> String {
    let mut url = url.trim().trim_end_matches('/').to_string();
    if let Some(stripped) = url.strip_suffix("/xmlrpc.php") {
        url = stripped.to_string();
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{}", url);
    }
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_xmlrpc_suffix() {
        assert_eq!(
            normalize_site_url("https://blog.example.com/xmlrpc.php"),
            "https://blog.example.com"
        );
    }

    #[test]
    fn test_normalize_adds_https_scheme() {
        assert_eq!(normalize_site_url("blog.example.com"), "https://blog.example.com");
        assert_eq!(
            normalize_site_url("http://blog.example.com"),
            "http://blog.example.com"
        );
    }

    #[test]
    fn test_normalize_trims_trailing_slash() {
        assert_eq!(
            normalize_site_url("https://blog.example.com/"),
            "https://blog.example.com"
        );
    }
}
