use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::Result;

/// Post submitted to the remote CMS.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// Explicit target category name; `None` means pick one at random.
    pub category: Option<String>,
    /// `draft` or `publish`.
    pub status: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PublishResult {
    pub remote_id: String,
    pub link: Option<String>,
}

/// A WordPress category, as returned by either wire protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Seam between the batch runner and the remote CMS. Implementations:
/// REST and XML-RPC.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn test_connection(&self) -> Result<()>;

    /// Submit one post. `&mut self` because category randomization draws
    /// from the publisher's own rng.
    async fn publish(&mut self, post: &NewPost) -> Result<PublishResult>;
}

/// Pick a category uniformly at random, excluding the default
/// "uncategorized" bucket (term id 1) unless it is the only one there is.
pub fn pick_random_category<'a>(
    categories: &'a [Category],
    rng: &mut impl rand::Rng,
) -> Option<&'a Category> {
    let eligible: Vec<&Category> = categories.iter().filter(|c| c.id != 1).collect();
    if eligible.is_empty() {
        categories.choose(rng)
    } else {
        eligible.choose(rng).copied()
    }
}
