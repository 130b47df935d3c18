use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::SecretString;

/// Run configuration, loaded once at startup and treated as immutable for
/// the lifetime of the batch. Components receive it by reference; there is
/// no ambient global config.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat model used for titles and article bodies.
    pub openai_model: String,
    /// Number of titles (and therefore articles) generated per keyword.
    pub title_per_keyword: usize,
    /// Seconds to wait between consecutive articles.
    pub delay_between_posts: u64,

    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default = "default_image_count")]
    pub image_count: usize,
    /// When false, no image provider is consulted at all and placeholder
    /// tags are left untouched in the generated HTML.
    #[serde(default)]
    pub fetch_real_images: bool,

    #[serde(default)]
    pub use_template: bool,
    /// HTML template with `{intro}`, `{body}` and `{conclusion}` slots.
    #[serde(default)]
    pub article_template: Option<String>,

    /// Words that must never appear in saved output. Matches are removed
    /// from generated HTML after the fact; titles containing them are
    /// dropped outright.
    #[serde(default)]
    pub forbidden_words: Vec<String>,

    #[serde(default)]
    pub image_mode: ImageMode,
    #[serde(default = "default_search_engine")]
    pub image_search_engine: String,
    #[serde(default = "default_image_model")]
    pub image_generate_model: String,
    #[serde(default = "default_image_size")]
    pub image_generate_size: String,
    #[serde(default = "default_image_quality")]
    pub image_generate_quality: String,
    #[serde(default = "default_image_style")]
    pub image_generate_style: String,

    pub save_path: String,
    pub save_mode: SaveMode,

    #[serde(default = "default_keywords_path")]
    pub keywords_path: String,
    #[serde(default = "default_keyword_delimiter")]
    pub keyword_delimiter: String,

    #[serde(default)]
    pub wordpress: WordPressConfig,
}

/// Output directory classification: one directory per keyword, or one per
/// run date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    Keyword,
    Date,
}

/// Image sourcing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    #[default]
    Search,
    Generate,
    Mixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordPressConfig {
    #[serde(default)]
    pub enabled: bool,
    /// `rest`, `xmlrpc`, or `auto` (REST first, XML-RPC fallback).
    #[serde(default = "default_api_method")]
    pub api_method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: SecretString,
    /// Explicit target category. When unset (or not found on the site) a
    /// category is picked at random, excluding the default bucket.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_method: default_api_method(),
            url: String::new(),
            username: String::new(),
            password: SecretString::default(),
            category: None,
            status: default_status(),
        }
    }
}

fn default_word_count() -> usize {
    2000
}

fn default_image_count() -> usize {
    3
}

fn default_search_engine() -> String {
    "unsplash".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_quality() -> String {
    "standard".to_string()
}

fn default_image_style() -> String {
    "natural".to_string()
}

fn default_keywords_path() -> String {
    "keywords.txt".to_string()
}

fn default_keyword_delimiter() -> String {
    "|".to_string()
}

fn default_api_method() -> String {
    "auto".to_string()
}

fn default_status() -> String {
    "draft".to_string()
}

impl Config {
    /// Load configuration. An explicit path must exist; otherwise the search
    /// order is `./config.yaml`, then the user config directory. A missing
    /// config file is fatal; there are no built-in defaults for the
    /// required keys.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(config_path);
        }

        if Path::new("config.yaml").exists() {
            debug!("Loading config from ./config.yaml");
            return Self::load_from_path("config.yaml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("autopost").join("config.yaml");
            if config_path.exists() {
                debug!("Loading config from {:?}", config_path);
                return Self::load_from_path(&config_path);
            }
        }

        Err(Error::Config(
            "config file not found (looked for ./config.yaml and the user config dir)".to_string(),
        ))
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::Config(format!("malformed {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the batch cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.title_per_keyword < 1 {
            return Err(Error::Config(
                "title_per_keyword must be at least 1".to_string(),
            ));
        }
        if self.save_path.trim().is_empty() {
            return Err(Error::Config("save_path must not be empty".to_string()));
        }
        if self.use_template && self.article_template.is_none() {
            return Err(Error::Config(
                "use_template is set but article_template is missing".to_string(),
            ));
        }
        if self.wordpress.enabled {
            if self.wordpress.url.trim().is_empty() {
                return Err(Error::Config(
                    "wordpress.enabled is set but wordpress.url is missing".to_string(),
                ));
            }
            match self.wordpress.api_method.as_str() {
                "rest" | "xmlrpc" | "auto" => {}
                other => {
                    return Err(Error::Config(format!(
                        "wordpress.api_method must be rest, xmlrpc or auto (got {:?})",
                        other
                    )));
                }
            }
            match self.wordpress.status.as_str() {
                "draft" | "publish" => {}
                other => {
                    return Err(Error::Config(format!(
                        "wordpress.status must be draft or publish (got {:?})",
                        other
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
openai_model: gpt-4-turbo
title_per_keyword: 3
delay_between_posts: 60
save_path: ./output
save_mode: keyword
"#;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: Config = serde_yaml_ng::from_str(MINIMAL).unwrap();
        assert_eq!(config.openai_model, "gpt-4-turbo");
        assert_eq!(config.word_count, 2000);
        assert_eq!(config.image_count, 3);
        assert_eq!(config.image_mode, ImageMode::Search);
        assert_eq!(config.image_search_engine, "unsplash");
        assert_eq!(config.keywords_path, "keywords.txt");
        assert_eq!(config.keyword_delimiter, "|");
        assert!(!config.fetch_real_images);
        assert!(!config.wordpress.enabled);
        assert_eq!(config.wordpress.api_method, "auto");
        assert_eq!(config.wordpress.status, "draft");
        config.validate().unwrap();
    }

    #[test]
    fn test_save_mode_values() {
        let config: Config = serde_yaml_ng::from_str(MINIMAL).unwrap();
        assert_eq!(config.save_mode, SaveMode::Keyword);

        let date = MINIMAL.replace("save_mode: keyword", "save_mode: date");
        let config: Config = serde_yaml_ng::from_str(&date).unwrap();
        assert_eq!(config.save_mode, SaveMode::Date);

        let bad = MINIMAL.replace("save_mode: keyword", "save_mode: weekly");
        assert!(serde_yaml_ng::from_str::<Config>(&bad).is_err());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let without_model = MINIMAL.replace("openai_model: gpt-4-turbo\n", "");
        assert!(serde_yaml_ng::from_str::<Config>(&without_model).is_err());
    }

    #[test]
    fn test_image_mode_values() {
        for (raw, expected) in [
            ("search", ImageMode::Search),
            ("generate", ImageMode::Generate),
            ("mixed", ImageMode::Mixed),
        ] {
            let yaml = format!("{}image_mode: {}\n", MINIMAL, raw);
            let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
            assert_eq!(config.image_mode, expected);
        }
    }

    #[test]
    fn test_title_per_keyword_zero_rejected() {
        let yaml = MINIMAL.replace("title_per_keyword: 3", "title_per_keyword: 0");
        let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_template_without_body_rejected() {
        let yaml = format!("{}use_template: true\n", MINIMAL);
        let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wordpress_block_parses() {
        let yaml = format!(
            "{}wordpress:\n  enabled: true\n  url: https://blog.example.com\n  username: admin\n  password: s3cret\n  category: 科技\n  status: publish\n",
            MINIMAL
        );
        let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        config.validate().unwrap();
        assert!(config.wordpress.enabled);
        assert_eq!(config.wordpress.username, "admin");
        assert_eq!(config.wordpress.password.expose(), "s3cret");
        assert_eq!(config.wordpress.category.as_deref(), Some("科技"));
        assert_eq!(config.wordpress.status, "publish");
        // password never shows up in debug output
        let debug = format!("{:?}", config.wordpress);
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_wordpress_bad_method_rejected() {
        let yaml = format!(
            "{}wordpress:\n  enabled: true\n  url: https://blog.example.com\n  api_method: soap\n",
            MINIMAL
        );
        let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_wordpress_requires_url() {
        let yaml = format!("{}wordpress:\n  enabled: true\n", MINIMAL);
        let config: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some("/nonexistent/autopost-config.yaml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
