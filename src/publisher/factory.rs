use tracing::{info, warn};

use super::client::Publisher;
use super::rest::RestPublisher;
use super::xmlrpc::XmlRpcPublisher;
use crate::config::WordPressConfig;
use crate::error::{Error, Result};

/// Create and connection-check a publisher for the configured API method.
/// `auto` tries REST first and falls back to XML-RPC. Returns `None` when
/// publishing is disabled; a connection failure is an `Error::Publish` the
/// caller downgrades to local-only mode.
pub async fn create_publisher(config: &WordPressConfig) -> Result<Option<Box<dyn Publisher>>> {
    if !config.enabled {
        return Ok(None);
    }

    match config.api_method.as_str() {
        "rest" => {
            let publisher = RestPublisher::new(config)?;
            publisher.test_connection().await?;
            info!("Publishing via the REST API");
            Ok(Some(Box::new(publisher)))
        }
        "xmlrpc" => {
            let publisher = XmlRpcPublisher::new(config)?;
            publisher.test_connection().await?;
            info!("Publishing via XML-RPC");
            Ok(Some(Box::new(publisher)))
        }
        "auto" => {
            let rest = RestPublisher::new(config)?;
            match rest.test_connection().await {
                Ok(()) => {
                    info!("Publishing via the REST API");
                    Ok(Some(Box::new(rest)))
                }
                Err(e) => {
                    warn!("REST connection failed ({}), trying XML-RPC", e);
                    let xmlrpc = XmlRpcPublisher::new(config)?;
                    xmlrpc.test_connection().await?;
                    info!("Publishing via XML-RPC");
                    Ok(Some(Box::new(xmlrpc)))
                }
            }
        }
        other => Err(Error::Publish(format!("unknown api_method: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_wordpress_yields_no_publisher() {
        let config = WordPressConfig::default();
        let publisher = create_publisher(&config).await.unwrap();
        assert!(publisher.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_rejected() {
        let config = WordPressConfig {
            enabled: true,
            api_method: "soap".to_string(),
            url: "https://blog.example.com".to_string(),
            ..WordPressConfig::default()
        };
        assert!(create_publisher(&config).await.is_err());
    }
}
