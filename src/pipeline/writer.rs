//! Article persistence under a classification directory.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SaveMode;
use crate::error::{Error, Result};
use crate::pipeline::generator::Article;
use crate::util::sanitize_component;

const MAX_STEM_CHARS: usize = 50;

pub struct LocalWriter {
    base: PathBuf,
    mode: SaveMode,
}

impl LocalWriter {
    pub fn new<P: Into<PathBuf>>(base: P, mode: SaveMode) -> Self {
        Self {
            base: base.into(),
            mode,
        }
    }

    /// Write the article's HTML body as a UTF-8 text file and return the
    /// final path. The filename encodes the sanitized title plus a
    /// second-resolution timestamp; same-second collisions get a sequence
    /// suffix so nothing is ever overwritten.
    pub fn save(&self, article: &Article) -> Result<PathBuf> {
        let dir = self.target_dir(article);
        fs::create_dir_all(&dir).map_err(|e| Error::Io {
            path: dir.clone(),
            source: e,
        })?;

        let stem = format!(
            "{}_{}",
            sanitize_component(&article.title, MAX_STEM_CHARS),
            article.generated_at.format("%Y%m%d_%H%M%S")
        );
        let path = next_free_path(&dir, &stem);

        fs::write(&path, &article.html_body).map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?;

        info!(
            keyword = %article.keyword,
            path = %path.display(),
            "Article saved"
        );
        Ok(path)
    }

    fn target_dir(&self, article: &Article) -> PathBuf {
        match self.mode {
            SaveMode::Keyword => self
                .base
                .join(sanitize_component(&article.keyword, MAX_STEM_CHARS)),
            SaveMode::Date => self
                .base
                .join(article.generated_at.format("%Y-%m-%d").to_string()),
        }
    }
}

fn next_free_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{}.txt", stem));
    let mut seq = 0;
    while path.exists() {
        seq += 1;
        path = dir.join(format!("{}_{}.txt", stem, seq));
    }
    path
}
