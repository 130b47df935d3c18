//! Title and article generation on top of the LLM client.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::llm::client::LlmClient;
use crate::llm::prompts::{self, Segment};

/// One generated article, written once to disk and optionally forwarded to
/// the publisher. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub html_body: String,
    pub keyword: String,
    pub generated_at: DateTime<Local>,
}

pub struct ArticleGenerator {
    client: Arc<dyn LlmClient>,
    forbidden_words: Vec<String>,
    word_count: usize,
    image_count: usize,
    /// `Some` switches to template mode: intro/body/conclusion are requested
    /// individually and substituted into the template's slots.
    template: Option<String>,
}

impl ArticleGenerator {
    pub fn new(client: Arc<dyn LlmClient>, config: &Config) -> Self {
        let template = if config.use_template {
            config.article_template.clone()
        } else {
            None
        };
        Self {
            client,
            forbidden_words: config.forbidden_words.clone(),
            word_count: config.word_count,
            image_count: config.image_count,
            template,
        }
    }

    /// Request `n` titles for a keyword. Lines are cleaned of list numbering
    /// and titles containing forbidden words are dropped; if that leaves
    /// fewer than `n`, the request is retried once and the best batch wins.
    pub async fn generate_titles(&self, keyword: &str, n: usize) -> Result<Vec<String>> {
        if n < 1 {
            return Err(Error::Generation("title count must be at least 1".to_string()));
        }

        let prompt = prompts::title_prompt(keyword, n, &self.forbidden_words);
        let mut best: Vec<String> = Vec::new();

        for attempt in 0..2 {
            let raw = self.client.complete(prompts::TITLE_SYSTEM, &prompt).await?;
            let titles: Vec<String> = raw
                .lines()
                .map(clean_title_line)
                .filter(|t| !t.is_empty())
                .filter(|t| !contains_forbidden(t, &self.forbidden_words))
                .map(str::to_string)
                .collect();

            if titles.len() >= n {
                return Ok(titles.into_iter().take(n).collect());
            }
            if titles.len() > best.len() {
                best = titles;
            }
            if attempt == 0 {
                warn!(
                    "Got {} usable titles for '{}' (wanted {}), retrying",
                    best.len(),
                    keyword,
                    n
                );
            }
        }

        if best.is_empty() {
            Err(Error::Generation(format!(
                "no usable titles for keyword '{}'",
                keyword
            )))
        } else {
            warn!(
                "Proceeding with {} of {} titles for '{}'",
                best.len(),
                n,
                keyword
            );
            Ok(best)
        }
    }

    /// Generate the HTML body for one title and assemble the article.
    /// The body is stripped of document chrome and code fences, cleaned of
    /// forbidden words, and has its image placeholders replaced with the
    /// given URLs (extras are left untouched).
    pub async fn generate_article(
        &self,
        keyword: &str,
        title: &str,
        image_urls: &[String],
    ) -> Result<Article> {
        let raw = if let Some(template) = self.template.clone() {
            self.generate_from_template(title, &template).await?
        } else {
            self.complete_article(title).await?
        };

        let mut html = strip_code_fences(&raw);
        html = strip_document_chrome(&html);
        if html.trim().is_empty() {
            return Err(Error::Generation(format!(
                "empty article body for '{}'",
                title
            )));
        }

        html = strip_forbidden(&html, &self.forbidden_words);
        if !image_urls.is_empty() {
            html = replace_image_placeholders(&html, image_urls);
        }

        Ok(Article {
            title: title.to_string(),
            html_body: html,
            keyword: keyword.to_string(),
            generated_at: Local::now(),
        })
    }

    async fn complete_article(&self, title: &str) -> Result<String> {
        let prompt = prompts::article_prompt(
            title,
            self.word_count,
            self.image_count,
            &self.forbidden_words,
        );
        // One immediate retry for transient API failures, then give up.
        match self.client.complete(prompts::ARTICLE_SYSTEM, &prompt).await {
            Ok(raw) => Ok(raw),
            Err(first) => {
                warn!("Article request failed ({}), retrying once", first);
                self.client.complete(prompts::ARTICLE_SYSTEM, &prompt).await
            }
        }
    }

    async fn generate_from_template(&self, title: &str, template: &str) -> Result<String> {
        let mut out = template.to_string();
        for segment in [Segment::Intro, Segment::Body, Segment::Conclusion] {
            let prompt =
                prompts::segment_prompt(title, segment, self.word_count, &self.forbidden_words);
            let raw = self.client.complete(prompts::ARTICLE_SYSTEM, &prompt).await?;
            let html = strip_document_chrome(&strip_code_fences(&raw));
            out = out.replace(segment.placeholder(), html.trim());
        }
        Ok(out)
    }
}

/// Strip leading list numbering the model sometimes adds despite
/// instructions ("1. ", "2、", "- ").
pub fn clean_title_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| {
            c.is_ascii_digit() || matches!(c, '.' | '、' | '-' | ')' | ' ')
        })
        .trim()
}

pub fn contains_forbidden(text: &str, words: &[String]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(&w.to_lowercase()))
}

/// Remove every occurrence of each forbidden word from the content. The
/// saved output must never contain them, whatever the model produced.
pub fn strip_forbidden(content: &str, words: &[String]) -> String {
    let mut out = content.to_string();
    for word in words {
        if word.is_empty() {
            continue;
        }
        out = out.replace(word.as_str(), "");
    }
    out
}

/// Strip markdown code fences the model sometimes wraps output in.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    for prefix in ["```html", "```"] {
        if trimmed.starts_with(prefix)
            && trimmed.ends_with("```")
            && trimmed.len() > prefix.len() + 3
        {
            return trimmed[prefix.len()..trimmed.len() - 3].trim().to_string();
        }
    }
    trimmed.to_string()
}

static BODY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").unwrap());
static CHROME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<!DOCTYPE[^>]*>",
        r"(?is)<html[^>]*>",
        r"(?is)</html>",
        r"(?is)<head[^>]*>.*?</head>",
        r"(?is)<body[^>]*>",
        r"(?is)</body>",
        r"(?is)<meta[^>]*>",
        r"(?is)<title[^>]*>.*?</title>",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Reduce a full HTML document to its article fragment. Output files carry
/// only the fragment, no surrounding document tags.
pub fn strip_document_chrome(content: &str) -> String {
    if !content.contains("<!DOCTYPE") && !content.contains("<html") {
        return content.trim().to_string();
    }

    let mut out = match BODY_RE.captures(content) {
        Some(caps) => caps[1].trim().to_string(),
        None => content.to_string(),
    };
    for re in CHROME_RES.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    let out = BLANK_RE.replace_all(&out, "\n\n").into_owned();
    out.trim().to_string()
}

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img\s+src="?\[IMAGE_PLACEHOLDER[^\]]*\]"?\s+alt="([^"]*)""#).unwrap()
});

/// Substitute the first N image placeholders with real URLs, keeping each
/// placeholder's alt text. Placeholders beyond the URL list are left as-is.
pub fn replace_image_placeholders(content: &str, urls: &[String]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for (i, caps) in PLACEHOLDER_RE.captures_iter(content).enumerate() {
        if i >= urls.len() {
            break;
        }
        let matched = caps.get(0).unwrap();
        let alt = caps.get(1).map_or("", |a| a.as_str());
        out.push_str(&content[last..matched.start()]);
        out.push_str(&format!(r#"<img src="{}" alt="{}""#, urls[i], alt));
        last = matched.end();
    }
    out.push_str(&content[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_line_strips_numbering() {
        assert_eq!(clean_title_line("1. 标题一"), "标题一");
        assert_eq!(clean_title_line("2、另一个标题"), "另一个标题");
        assert_eq!(clean_title_line("- 带横线的"), "带横线的");
        assert_eq!(clean_title_line("  普通标题  "), "普通标题");
    }

    #[test]
    fn test_contains_forbidden_case_insensitive() {
        let words = vec!["揭秘".to_string(), "Secret".to_string()];
        assert!(contains_forbidden("带你揭秘内幕", &words));
        assert!(contains_forbidden("the SECRET sauce", &words));
        assert!(!contains_forbidden("普通标题", &words));
    }

    #[test]
    fn test_strip_forbidden_removes_all_occurrences() {
        let words = vec!["揭秘".to_string()];
        let out = strip_forbidden("<p>揭秘一下，再揭秘一次</p>", &words);
        assert!(!out.contains("揭秘"));
        assert_eq!(out, "<p>一下，再一次</p>");
    }

    #[test]
    fn test_strip_code_fences_html_block() {
        let fenced = "```html\n<p>内容</p>\n```";
        assert_eq!(strip_code_fences(fenced), "<p>内容</p>");
    }

    #[test]
    fn test_strip_code_fences_plain_block() {
        assert_eq!(strip_code_fences("```\n<p>a</p>\n```"), "<p>a</p>");
        assert_eq!(strip_code_fences("<p>no fences</p>"), "<p>no fences</p>");
    }

    #[test]
    fn test_strip_document_chrome_extracts_body() {
        let doc = "<!DOCTYPE html>\n<html><head><title>t</title></head>\n\
             <body>\n<p>正文</p>\n</body></html>";
        assert_eq!(strip_document_chrome(doc), "<p>正文</p>");
    }

    #[test]
    fn test_strip_document_chrome_keeps_fragment_untouched() {
        let fragment = "<h2>小标题</h2>\n<p>内容</p>";
        assert_eq!(strip_document_chrome(fragment), fragment);
    }

    #[test]
    fn test_replace_image_placeholders_in_order() {
        let content = r#"<p>a</p><img src="[IMAGE_PLACEHOLDER]" alt="第一张"><p>b</p><img src="[IMAGE_PLACEHOLDER_2]" alt="第二张">"#;
        let urls = vec![
            "https://img.test/1.jpg".to_string(),
            "https://img.test/2.jpg".to_string(),
        ];
        let out = replace_image_placeholders(content, &urls);
        assert!(out.contains(r#"<img src="https://img.test/1.jpg" alt="第一张">"#));
        assert!(out.contains(r#"<img src="https://img.test/2.jpg" alt="第二张">"#));
        assert!(!out.contains("IMAGE_PLACEHOLDER"));
    }

    #[test]
    fn test_replace_image_placeholders_extra_placeholders_survive() {
        let content = r#"<img src="[IMAGE_PLACEHOLDER]" alt="一"><img src="[IMAGE_PLACEHOLDER]" alt="二">"#;
        let urls = vec!["https://img.test/only.jpg".to_string()];
        let out = replace_image_placeholders(content, &urls);
        assert!(out.contains("https://img.test/only.jpg"));
        assert!(out.contains("IMAGE_PLACEHOLDER"));
    }
}
