use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;

/// Options forwarded to the image generation API.
#[derive(Debug, Clone)]
pub struct ImageGenOptions {
    pub model: String,
    pub size: String,
    pub quality: String,
    pub style: String,
}

impl ImageGenOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.image_generate_model.clone(),
            size: config.image_generate_size.clone(),
            quality: config.image_generate_quality.clone(),
            style: config.image_generate_style.clone(),
        }
    }
}

/// Seam between the pipeline and the LLM HTTP API. One implementation per
/// backend plus a mock for `--dry-run` and tests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat completion round-trip. Failures map to `Error::Generation`.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    /// One image generation round-trip, returning the image URL.
    /// Failures map to `Error::Image`.
    async fn generate_image(&self, prompt: &str, opts: &ImageGenOptions) -> Result<String>;
}

/// Canned-response client. Dispatches on prompt markers the same way the
/// real prompts are built, so the full pipeline runs offline.
pub struct MockLlmClient {
    titles: Vec<String>,
    article_html: String,
    image_url: String,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            titles: vec![
                "2025年值得一试的AI工具清单".to_string(),
                "我用了一个月AI工具后的真实感受".to_string(),
                "AI工具上手指南，从零开始也不难".to_string(),
            ],
            article_html: "<h2>先说结论</h2>\n<p>这是一段测试内容。</p>\n\
                 <img src=\"[IMAGE_PLACEHOLDER]\" alt=\"示例配图\">\n<p>就到这里。</p>"
                .to_string(),
            image_url: "https://images.example.com/mock.png".to_string(),
        }
    }

    /// Override the titles returned for title prompts.
    pub fn with_titles(mut self, titles: Vec<String>) -> Self {
        self.titles = titles;
        self
    }

    /// Override the HTML body returned for article prompts.
    pub fn with_article(mut self, html: String) -> Self {
        self.article_html = html;
        self
    }

    pub fn with_image_url(mut self, url: String) -> Self {
        self.image_url = url;
        self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        if prompt.contains("中文文章标题") {
            return Ok(self.titles.join("\n"));
        }
        if prompt.contains("适合搜索图片的英文关键词") {
            return Ok("artificial intelligence technology\n\
                 modern tech workspace\n\
                 digital innovation tools"
                .to_string());
        }
        if prompt.contains("适合AI图片生成的英文提示词") {
            return Ok("A modern workspace with holographic displays, professional photography\n\
                 Abstract neural network illustration, vibrant colors\n\
                 Person using software on a laptop in a bright office"
                .to_string());
        }
        if prompt.contains("撰写文章的") {
            // Template mode segment request
            return Ok("<p>段落内容。</p>".to_string());
        }
        Ok(self.article_html.clone())
    }

    async fn generate_image(&self, _prompt: &str, _opts: &ImageGenOptions) -> Result<String> {
        Ok(self.image_url.clone())
    }
}
