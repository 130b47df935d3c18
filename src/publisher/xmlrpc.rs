//! WordPress XML-RPC publisher (`wp.getTerms` / `wp.newPost`).
//!
//! The method call envelope is assembled as escaped text and responses are
//! decoded with a small event-driven reader; only the handful of response
//! shapes WordPress actually returns are handled.

use async_trait::async_trait;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use super::client::{pick_random_category, Category, NewPost, Publisher, PublishResult};
use super::rest::normalize_site_url;
use crate::config::WordPressConfig;
use crate::error::{Error, Result};
use crate::util::SecretString;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct XmlRpcPublisher {
    client: Client,
    endpoint: String,
    username: String,
    password: SecretString,
    rng: StdRng,
}

impl XmlRpcPublisher {
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .map_err(|e| Error::Publish(format!("failed to build HTTP client: {}", e)))?,
            endpoint: xmlrpc_endpoint(&config.url),
            username: config.username.clone(),
            password: config.password.clone(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Force a deterministic category pick (tests).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    async fn call(&self, body: String) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("XML-RPC request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Publish(format!(
                "XML-RPC endpoint returned {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| Error::Publish(format!("cannot read XML-RPC response: {}", e)))
    }

    async fn get_terms(&self) -> Result<Vec<Category>> {
        let body = build_get_terms(&self.username, self.password.expose());
        let xml = self.call(body).await?;
        parse_terms(&xml)
    }
}

#[async_trait]
impl Publisher for XmlRpcPublisher {
    async fn test_connection(&self) -> Result<()> {
        self.get_terms().await.map(|_| ())
    }

    async fn publish(&mut self, post: &NewPost) -> Result<PublishResult> {
        info!("Publishing via XML-RPC: {}", post.title);

        // XML-RPC takes category names, not ids. An explicit name is used
        // when the site actually has it; otherwise pick at random.
        let terms = self.get_terms().await.unwrap_or_else(|e| {
            warn!("Term listing failed ({}), posting without a category", e);
            Vec::new()
        });
        let category_name = post
            .category
            .as_deref()
            .filter(|name| terms.iter().any(|t| t.name == *name))
            .map(str::to_string)
            .or_else(|| {
                pick_random_category(&terms, &mut self.rng).map(|c| {
                    info!("Randomly selected category '{}' (ID: {})", c.name, c.id);
                    c.name.clone()
                })
            });

        let body = build_new_post(
            &self.username,
            self.password.expose(),
            post,
            category_name.as_deref(),
        );
        let xml = self.call(body).await?;
        let post_id = parse_post_id(&xml)?;

        info!("Post created (ID: {}, status: {})", post_id, post.status);
        Ok(PublishResult {
            remote_id: post_id,
            link: None,
        })
    }
}

/// Configured site URL → XML-RPC endpoint URL.
pub fn xmlrpc_endpoint(url: &str) -> String {
    format!("{}/xmlrpc.php", normalize_site_url(url))
}

fn string_param(value: &str) -> String {
    format!(
        "<param><value><string>{}</string></value></param>",
        escape(value)
    )
}

pub fn build_get_terms(username: &str, password: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\
         <methodCall><methodName>wp.getTerms</methodName><params>\
         <param><value><int>0</int></value></param>\
         {}{}\
         <param><value><string>category</string></value></param>\
         </params></methodCall>",
        string_param(username),
        string_param(password),
    )
}

pub fn build_new_post(
    username: &str,
    password: &str,
    post: &NewPost,
    category: Option<&str>,
) -> String {
    let mut terms = String::new();
    if let Some(name) = category {
        terms.push_str(&format!(
            "<member><name>category</name><value><array><data>\
             <value><string>{}</string></value>\
             </data></array></value></member>",
            escape(name)
        ));
    }
    if !post.tags.is_empty() {
        let tag_values: String = post
            .tags
            .iter()
            .map(|t| format!("<value><string>{}</string></value>", escape(t)))
            .collect();
        terms.push_str(&format!(
            "<member><name>post_tag</name><value><array><data>{}</data></array></value></member>",
            tag_values
        ));
    }
    let terms_member = if terms.is_empty() {
        String::new()
    } else {
        format!(
            "<member><name>terms_names</name><value><struct>{}</struct></value></member>",
            terms
        )
    };

    format!(
        "<?xml version=\"1.0\"?>\
         <methodCall><methodName>wp.newPost</methodName><params>\
         <param><value><int>0</int></value></param>\
         {}{}\
         <param><value><struct>\
         <member><name>post_title</name><value><string>{}</string></value></member>\
         <member><name>post_content</name><value><string>{}</string></value></member>\
         <member><name>post_status</name><value><string>{}</string></value></member>\
         {}\
         </struct></value></param>\
         </params></methodCall>",
        string_param(username),
        string_param(password),
        escape(&post.title),
        escape(&post.content),
        escape(&post.status),
        terms_member,
    )
}

/// Walk an XML-RPC response, collecting `<member>` key/value text pairs and
/// flagging `<fault>` envelopes. Shared by both response parsers.
struct ResponseWalker {
    fault: bool,
    fault_string: Option<String>,
    first_value: Option<String>,
    pairs: Vec<(String, String)>,
    struct_marks: Vec<usize>,
    structs: Vec<Vec<(String, String)>>,
}

impl ResponseWalker {
    fn walk(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut walker = ResponseWalker {
            fault: false,
            fault_string: None,
            first_value: None,
            pairs: Vec::new(),
            struct_marks: Vec::new(),
            structs: Vec::new(),
        };
        let mut in_name = false;
        let mut value_depth = 0usize;
        let mut current_key: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"fault" => walker.fault = true,
                    b"name" => in_name = true,
                    b"value" | b"string" | b"int" | b"i4" => value_depth += 1,
                    b"struct" => walker.struct_marks.push(walker.pairs.len()),
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"name" => in_name = false,
                    b"value" | b"string" | b"int" | b"i4" => {
                        value_depth = value_depth.saturating_sub(1)
                    }
                    b"struct" => {
                        if let Some(mark) = walker.struct_marks.pop() {
                            walker.structs.push(walker.pairs.split_off(mark));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| {
                            Error::Publish(format!("malformed XML-RPC response: {}", e))
                        })?
                        .trim()
                        .to_string();
                    if text.is_empty() {
                        continue;
                    }
                    if in_name {
                        current_key = Some(text);
                    } else if value_depth > 0 {
                        if walker.first_value.is_none() {
                            walker.first_value = Some(text.clone());
                        }
                        if let Some(key) = current_key.take() {
                            if key == "faultString" {
                                walker.fault_string = Some(text.clone());
                            }
                            walker.pairs.push((key, text));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Publish(format!("malformed XML-RPC response: {}", e)))
                }
                _ => {}
            }
        }
        Ok(walker)
    }

    fn into_fault_error(self) -> Option<Error> {
        if self.fault {
            Some(Error::Publish(format!(
                "XML-RPC fault: {}",
                self.fault_string.unwrap_or_else(|| "unknown".to_string())
            )))
        } else {
            None
        }
    }
}

/// Decode a `wp.getTerms` response into categories.
pub fn parse_terms(xml: &str) -> Result<Vec<Category>> {
    let walker = ResponseWalker::walk(xml)?;
    if walker.fault {
        return Err(walker.into_fault_error().unwrap());
    }

    let mut categories = Vec::new();
    for members in &walker.structs {
        let id = members
            .iter()
            .find(|(k, _)| k == "term_id")
            .and_then(|(_, v)| v.parse::<u64>().ok());
        let name = members
            .iter()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.clone());
        if let (Some(id), Some(name)) = (id, name) {
            categories.push(Category { id, name });
        }
    }
    Ok(categories)
}

/// Decode a `wp.newPost` response into the new post id.
pub fn parse_post_id(xml: &str) -> Result<String> {
    let walker = ResponseWalker::walk(xml)?;
    if walker.fault {
        return Err(walker.into_fault_error().unwrap());
    }
    walker
        .first_value
        .ok_or_else(|| Error::Publish("no post id in XML-RPC response".to_string()))
}
