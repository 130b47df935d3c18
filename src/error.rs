use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure taxonomy for the generation pipeline.
///
/// Only `Config` is fatal: it aborts the run before the batch starts.
/// Every other variant is logged and the batch moves on: a failed title is
/// skipped, a failed image leaves the article with fewer images, a failed
/// write drops that article, and a failed publish leaves the article saved
/// locally but unpublished.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("image sourcing failed: {0}")]
    Image(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("publish failed: {0}")]
    Publish(String),
}

impl Error {
    /// True when the error must abort the run before the batch starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_is_fatal() {
        assert!(Error::Config("missing file".into()).is_fatal());
        assert!(!Error::Generation("api down".into()).is_fatal());
        assert!(!Error::Image("no key".into()).is_fatal());
        assert!(!Error::Publish("401".into()).is_fatal());
        let io = Error::Io {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!io.is_fatal());
    }

    #[test]
    fn test_io_error_message_includes_path() {
        let err = Error::Io {
            path: PathBuf::from("/data/posts/a.txt"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("/data/posts/a.txt"));
    }
}
