//! autopost - keyword-driven article generation and WordPress publishing
//!
//! Reads a keyword file, asks an LLM for titles and HTML article bodies,
//! sources images by index search or AI generation, writes each article to
//! disk under a keyword or date directory, and optionally publishes it to
//! WordPress over REST or XML-RPC. The batch is strictly sequential with a
//! configurable delay between articles.

pub mod cli;
pub mod config;
pub mod error;
pub mod keywords;
pub mod llm;
pub mod pipeline;
pub mod publisher;
pub mod util;
