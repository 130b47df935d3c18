//! Image sourcing: external index search, AI generation, or a mix.

use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, ImageMode};
use crate::error::{Error, Result};
use crate::llm::client::{ImageGenOptions, LlmClient};
use crate::llm::prompts;
use crate::util::SecretString;

const SEARCH_TIMEOUT_SECS: u64 = 10;

/// Supplies image URLs for one article. A failed image is logged and
/// skipped; the article proceeds with fewer images, never fails.
pub struct ImageProvider {
    client: Arc<dyn LlmClient>,
    mode: ImageMode,
    count: usize,
    gen_opts: ImageGenOptions,
    search: SearchClient,
}

impl ImageProvider {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            mode: config.image_mode,
            count: config.image_count,
            gen_opts: ImageGenOptions::from_config(config),
            search: SearchClient::from_env(&config.image_search_engine)?,
        })
    }

    /// Replace the search client (tests point it at a local mock server).
    pub fn with_search_client(mut self, search: SearchClient) -> Self {
        self.search = search;
        self
    }

    pub async fn fetch(&self, title: &str) -> Vec<String> {
        if self.count == 0 {
            return Vec::new();
        }
        match self.mode {
            ImageMode::Search => self.search_images(title, self.count).await,
            ImageMode::Generate => self.generate_images(title, self.count).await,
            ImageMode::Mixed => {
                let (search_count, generate_count) = split_mixed(self.count);
                let mut urls = self.search_images(title, search_count).await;
                urls.extend(self.generate_images(title, generate_count).await);
                urls
            }
        }
    }

    /// English search phrases for the title, via the LLM. Falls back to the
    /// raw title when the request fails.
    async fn search_phrases(&self, title: &str, count: usize) -> Vec<String> {
        let prompt = prompts::image_keywords_prompt(title, count);
        match self
            .client
            .complete(prompts::IMAGE_KEYWORD_SYSTEM, &prompt)
            .await
        {
            Ok(raw) => {
                let phrases: Vec<String> = raw
                    .lines()
                    .map(clean_phrase_line)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
                if phrases.is_empty() {
                    vec![title.chars().take(50).collect()]
                } else {
                    phrases
                }
            }
            Err(e) => {
                warn!("Image keyword request failed ({}), using the title", e);
                vec![title.chars().take(50).collect()]
            }
        }
    }

    async fn search_images(&self, title: &str, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        if self.search.engine() == SearchEngine::Picsum {
            return self.search.picsum_urls(count);
        }

        let phrases = self.search_phrases(title, count).await;
        let mut urls = Vec::new();
        for phrase in phrases.iter().take(count) {
            match self.search.search_one(phrase).await {
                Ok(Some(url)) => {
                    info!("Found image for '{}'", phrase);
                    urls.push(url);
                }
                Ok(None) => warn!("No image result for '{}'", phrase),
                Err(e) => warn!("Image search for '{}' failed: {}", phrase, e),
            }
        }

        if urls.is_empty() {
            warn!("Search returned nothing, falling back to placeholder images");
            return self.search.picsum_urls(count);
        }
        urls
    }

    async fn generate_images(&self, title: &str, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }

        let prompt = prompts::image_gen_prompts_prompt(title, count);
        let gen_prompts: Vec<String> = match self
            .client
            .complete(prompts::IMAGE_PROMPT_SYSTEM, &prompt)
            .await
        {
            Ok(raw) => raw
                .lines()
                .map(clean_phrase_line)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!("Image prompt request failed ({}), using a generic prompt", e);
                vec![format!("Illustration related to: {}", title)]
            }
        };

        let mut urls = Vec::new();
        for gen_prompt in gen_prompts.iter().take(count) {
            match self.client.generate_image(gen_prompt, &self.gen_opts).await {
                Ok(url) => {
                    info!("Generated image for '{}'", title);
                    urls.push(url);
                }
                Err(e) => warn!("Image generation failed: {}", e),
            }
        }
        urls
    }
}

/// Mixed mode split: first half searched, remainder generated.
pub fn split_mixed(count: usize) -> (usize, usize) {
    let search = count / 2;
    (search, count - search)
}

fn clean_phrase_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '、' | '-' | ' '))
        .trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Unsplash,
    Pexels,
    Pixabay,
    Picsum,
}

impl SearchEngine {
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "unsplash" => SearchEngine::Unsplash,
            "pexels" => SearchEngine::Pexels,
            "pixabay" => SearchEngine::Pixabay,
            "picsum" => SearchEngine::Picsum,
            other => {
                warn!("Unknown image search engine '{}', using picsum", other);
                SearchEngine::Picsum
            }
        }
    }
}

/// Thin client over the configured image index. Keyed engines read their
/// API key from the environment; a missing key downgrades to Picsum
/// placeholder URLs so the article still gets images.
pub struct SearchClient {
    engine: SearchEngine,
    api_key: Option<SecretString>,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UnsplashResponse {
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    large: String,
}

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
}

impl SearchClient {
    pub fn from_env(engine_name: &str) -> Result<Self> {
        let mut engine = SearchEngine::parse(engine_name);
        let key_var = match engine {
            SearchEngine::Unsplash => Some("UNSPLASH_ACCESS_KEY"),
            SearchEngine::Pexels => Some("PEXELS_API_KEY"),
            SearchEngine::Pixabay => Some("PIXABAY_API_KEY"),
            SearchEngine::Picsum => None,
        };
        let api_key = key_var.and_then(|var| env::var(var).ok()).map(SecretString::new);
        if api_key.is_none() && engine != SearchEngine::Picsum {
            warn!(
                "No API key for {:?} in the environment, falling back to picsum",
                engine
            );
            engine = SearchEngine::Picsum;
        }
        Self::new(engine, api_key)
    }

    pub fn new(engine: SearchEngine, api_key: Option<SecretString>) -> Result<Self> {
        Ok(Self {
            engine,
            api_key,
            base_url: default_base_url(engine).to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()
                .map_err(|e| Error::Image(format!("failed to build HTTP client: {}", e)))?,
        })
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn engine(&self) -> SearchEngine {
        self.engine
    }

    /// First matching image URL for one search phrase, if any.
    pub async fn search_one(&self, phrase: &str) -> Result<Option<String>> {
        let key = self.api_key.as_ref().map(|k| k.expose()).unwrap_or("");
        match self.engine {
            SearchEngine::Picsum => Ok(self.picsum_urls(1).into_iter().next()),
            SearchEngine::Unsplash => {
                let response = self
                    .client
                    .get(format!("{}/search/photos", self.base_url))
                    .header("Authorization", format!("Client-ID {}", key))
                    .query(&[
                        ("query", phrase),
                        ("per_page", "1"),
                        ("orientation", "landscape"),
                    ])
                    .send()
                    .await
                    .map_err(|e| Error::Image(format!("unsplash request failed: {}", e)))?;
                if !response.status().is_success() {
                    return Err(Error::Image(format!(
                        "unsplash returned {}",
                        response.status()
                    )));
                }
                let data: UnsplashResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Image(format!("bad unsplash response: {}", e)))?;
                Ok(data.results.into_iter().next().map(|p| p.urls.regular))
            }
            SearchEngine::Pexels => {
                let response = self
                    .client
                    .get(format!("{}/v1/search", self.base_url))
                    .header("Authorization", key)
                    .query(&[("query", phrase), ("per_page", "1")])
                    .send()
                    .await
                    .map_err(|e| Error::Image(format!("pexels request failed: {}", e)))?;
                if !response.status().is_success() {
                    return Err(Error::Image(format!(
                        "pexels returned {}",
                        response.status()
                    )));
                }
                let data: PexelsResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Image(format!("bad pexels response: {}", e)))?;
                Ok(data.photos.into_iter().next().map(|p| p.src.large))
            }
            SearchEngine::Pixabay => {
                // pixabay rejects per_page below 3
                let response = self
                    .client
                    .get(format!("{}/api/", self.base_url))
                    .query(&[
                        ("key", key),
                        ("q", phrase),
                        ("per_page", "3"),
                        ("image_type", "photo"),
                    ])
                    .send()
                    .await
                    .map_err(|e| Error::Image(format!("pixabay request failed: {}", e)))?;
                if !response.status().is_success() {
                    return Err(Error::Image(format!(
                        "pixabay returned {}",
                        response.status()
                    )));
                }
                let data: PixabayResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Image(format!("bad pixabay response: {}", e)))?;
                Ok(data.hits.into_iter().next().and_then(|h| h.large_image_url))
            }
        }
    }

    /// Placeholder image URLs with distinct random picture ids.
    pub fn picsum_urls(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut used = HashSet::new();
        let mut urls = Vec::with_capacity(count);
        while urls.len() < count {
            let id: u32 = rng.gen_range(1..=1000);
            if used.insert(id) {
                urls.push(format!("https://picsum.photos/id/{}/800/600", id));
            }
        }
        urls
    }
}

fn default_base_url(engine: SearchEngine) -> &'static str {
    match engine {
        SearchEngine::Unsplash => "https://api.unsplash.com",
        SearchEngine::Pexels => "https://api.pexels.com",
        SearchEngine::Pixabay => "https://pixabay.com",
        SearchEngine::Picsum => "https://picsum.photos",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_mixed_even_and_odd() {
        assert_eq!(split_mixed(4), (2, 2));
        assert_eq!(split_mixed(3), (1, 2));
        assert_eq!(split_mixed(1), (0, 1));
        assert_eq!(split_mixed(0), (0, 0));
    }

    #[test]
    fn test_engine_parse_falls_back_to_picsum() {
        assert_eq!(SearchEngine::parse("unsplash"), SearchEngine::Unsplash);
        assert_eq!(SearchEngine::parse("Pexels"), SearchEngine::Pexels);
        assert_eq!(SearchEngine::parse("bing"), SearchEngine::Picsum);
    }

    #[test]
    fn test_picsum_urls_are_distinct() {
        let client = SearchClient::new(SearchEngine::Picsum, None).unwrap();
        let urls = client.picsum_urls(10);
        assert_eq!(urls.len(), 10);
        let unique: HashSet<&String> = urls.iter().collect();
        assert_eq!(unique.len(), 10);
        assert!(urls.iter().all(|u| u.starts_with("https://picsum.photos/id/")));
    }

    #[test]
    fn test_clean_phrase_line() {
        assert_eq!(clean_phrase_line("1. modern tech"), "modern tech");
        assert_eq!(clean_phrase_line("- digital tools "), "digital tools");
        assert_eq!(clean_phrase_line("plain phrase"), "plain phrase");
    }
}
