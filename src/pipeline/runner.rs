//! Sequential batch loop: keywords × titles, with a fixed delay between
//! articles.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::generator::ArticleGenerator;
use crate::pipeline::images::ImageProvider;
use crate::pipeline::writer::LocalWriter;
use crate::publisher::client::{NewPost, Publisher};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// keywords × titles_per_keyword, fixed up front.
    pub total: usize,
    /// Articles generated and written to disk.
    pub generated: usize,
    /// Subset of `generated` that also reached the remote CMS.
    pub published: usize,
    /// Titles that produced no saved article.
    pub failed: usize,
}

pub struct BatchRunner {
    generator: ArticleGenerator,
    /// `None` when image fetching is disabled; placeholders stay in the HTML.
    images: Option<ImageProvider>,
    writer: LocalWriter,
    publisher: Option<Box<dyn Publisher>>,
    titles_per_keyword: usize,
    delay: Duration,
    category: Option<String>,
    status: String,
}

impl BatchRunner {
    pub fn new(
        config: &Config,
        generator: ArticleGenerator,
        images: Option<ImageProvider>,
        writer: LocalWriter,
        publisher: Option<Box<dyn Publisher>>,
    ) -> Self {
        Self {
            generator,
            images,
            writer,
            publisher,
            titles_per_keyword: config.title_per_keyword,
            delay: Duration::from_secs(config.delay_between_posts),
            category: config.wordpress.category.clone(),
            status: config.wordpress.status.clone(),
        }
    }

    /// Process every keyword in order, strictly sequentially. Per-article
    /// failures are logged and skipped; nothing aborts the batch. No resume
    /// state is kept; a rerun starts over.
    pub async fn run(&mut self, keywords: &[String]) -> RunSummary {
        let total = keywords.len() * self.titles_per_keyword;
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        let mut article_index = 0usize;

        for keyword in keywords {
            info!("Processing keyword: {}", keyword);

            let titles = match self
                .generator
                .generate_titles(keyword, self.titles_per_keyword)
                .await
            {
                Ok(titles) => titles,
                Err(e) => {
                    warn!("Skipping keyword '{}': {}", keyword, e);
                    summary.failed += self.titles_per_keyword;
                    article_index += self.titles_per_keyword;
                    continue;
                }
            };

            // A short batch of titles still runs; the shortfall counts as
            // failed so the summary always adds up to `total`.
            let shortfall = self.titles_per_keyword.saturating_sub(titles.len());
            summary.failed += shortfall;

            for title in &titles {
                article_index += 1;
                info!("[{}/{}] Generating article: {}", article_index, total, title);

                match self.process_one(keyword, title).await {
                    Ok(published) => {
                        summary.generated += 1;
                        if published {
                            summary.published += 1;
                        }
                    }
                    Err(e) => {
                        error!("Article '{}' failed: {}", title, e);
                        summary.failed += 1;
                    }
                }

                if article_index < total && !self.delay.is_zero() {
                    info!("Waiting {}s before the next article", self.delay.as_secs());
                    tokio::time::sleep(self.delay).await;
                }
            }
            article_index += shortfall;
        }

        summary
    }

    /// Generate, write, and optionally publish one article. Returns whether
    /// the article reached the remote CMS; a publish failure is not an
    /// error here; the article is already safe on disk.
    async fn process_one(&mut self, keyword: &str, title: &str) -> Result<bool> {
        let image_urls = match &self.images {
            Some(provider) => provider.fetch(title).await,
            None => Vec::new(),
        };

        let article = self
            .generator
            .generate_article(keyword, title, &image_urls)
            .await?;
        let path = self.writer.save(&article)?;
        info!(
            keyword = %keyword,
            path = %path.display(),
            "Article generated and saved"
        );

        if let Some(publisher) = self.publisher.as_mut() {
            let post = NewPost {
                title: article.title.clone(),
                content: article.html_body.clone(),
                category: self.category.clone(),
                status: self.status.clone(),
                tags: vec![keyword.to_string()],
            };
            match publisher.publish(&post).await {
                Ok(result) => {
                    info!("Published to WordPress (ID: {})", result.remote_id);
                    return Ok(true);
                }
                Err(e) => {
                    warn!("Publish failed, article kept locally: {}", e);
                    return Ok(false);
                }
            }
        }
        Ok(false)
    }
}
