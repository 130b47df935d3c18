//! Keyword source file parsing.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

/// Load keywords from a plain-text file. Each line may carry several
/// keywords separated by `delimiter`; tokens are trimmed and empty tokens
/// dropped. Order follows the file. No dedup is applied; a keyword listed
/// twice is processed twice.
pub fn load_keywords<P: AsRef<Path>>(path: P, delimiter: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read keyword file {}: {}", path.display(), e)))?;

    let keywords = split_keywords(&content, delimiter);
    if keywords.is_empty() {
        return Err(Error::Config(format!(
            "keyword file {} contains no keywords",
            path.display()
        )));
    }

    info!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}

fn split_keywords(content: &str, delimiter: &str) -> Vec<String> {
    content
        .lines()
        .flat_map(|line| line.split(delimiter))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_pipe_delimited_lines() {
        let content = "AI工具|AI绘画\nrust web framework\n";
        let keywords = split_keywords(content, "|");
        assert_eq!(keywords, vec!["AI工具", "AI绘画", "rust web framework"]);
    }

    #[test]
    fn test_split_trims_and_drops_empty_tokens() {
        let content = " a | | b \n\n|\nc";
        let keywords = split_keywords(content, "|");
        assert_eq!(keywords, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_custom_delimiter() {
        let keywords = split_keywords("a;b;c\nd", ";");
        assert_eq!(keywords, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_token_count_matches_nonempty_tokens() {
        let content = "k1|k2|k3\nk4\n | k5|\n";
        assert_eq!(split_keywords(content, "|").len(), 5);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_keywords("/nonexistent/keywords.txt", "|");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   \n|||\n").unwrap();
        let result = load_keywords(file.path(), "|");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
