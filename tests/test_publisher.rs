// WordPress publisher tests against a mocked site
use autopost::config::WordPressConfig;
use autopost::error::Error;
use autopost::publisher::client::{NewPost, Publisher};
use autopost::publisher::rest::RestPublisher;
use autopost::publisher::xmlrpc::XmlRpcPublisher;
use autopost::util::SecretString;
use mockito::Matcher;

fn wp_config(url: &str, api_method: &str) -> WordPressConfig {
    WordPressConfig {
        enabled: true,
        api_method: api_method.to_string(),
        url: url.to_string(),
        username: "admin".to_string(),
        password: SecretString::new("app-password".to_string()),
        category: None,
        status: "draft".to_string(),
    }
}

fn post() -> NewPost {
    NewPost {
        title: "测试标题".to_string(),
        content: "<p>测试正文</p>".to_string(),
        category: None,
        status: "draft".to_string(),
        tags: vec!["AI工具".to_string()],
    }
}

#[tokio::test]
async fn test_rest_connection_ok() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wp-json/wp/v2/users/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1,"name":"admin"}"#)
        .create_async()
        .await;

    let publisher = RestPublisher::new(&wp_config(&server.url(), "rest")).unwrap();
    publisher.test_connection().await.unwrap();
}

#[tokio::test]
async fn test_rest_connection_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wp-json/wp/v2/users/me")
        .with_status(401)
        .create_async()
        .await;

    let publisher = RestPublisher::new(&wp_config(&server.url(), "rest")).unwrap();
    let result = publisher.test_connection().await;
    assert!(matches!(result, Err(Error::Publish(_))));
}

#[tokio::test]
async fn test_rest_publish_creates_post_with_random_category() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wp-json/wp/v2/categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id":1,"name":"未分类"},{"id":7,"name":"科技"},{"id":9,"name":"数码"}]"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/wp-json/wp/v2/tags")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":5,"name":"AI工具"}"#)
        .create_async()
        .await;
    // the chosen category must not be the default bucket (id 1)
    let post_mock = server
        .mock("POST", "/wp-json/wp/v2/posts")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJsonString(r#"{"status":"draft","tags":[5]}"#.to_string()),
            Matcher::Regex(r#""categories":\[(7|9)\]"#.to_string()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":123,"link":"https://blog.example.com/?p=123"}"#)
        .create_async()
        .await;

    let mut publisher = RestPublisher::new(&wp_config(&server.url(), "rest"))
        .unwrap()
        .with_rng_seed(42);
    let result = publisher.publish(&post()).await.unwrap();

    assert_eq!(result.remote_id, "123");
    assert_eq!(result.link.as_deref(), Some("https://blog.example.com/?p=123"));
    post_mock.assert_async().await;
}

#[tokio::test]
async fn test_rest_publish_explicit_category_resolved_by_name() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wp-json/wp/v2/categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":7,"name":"科技"}]"#)
        .create_async()
        .await;
    server
        .mock("POST", "/wp-json/wp/v2/tags")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":5,"name":"AI工具"}"#)
        .create_async()
        .await;
    let post_mock = server
        .mock("POST", "/wp-json/wp/v2/posts")
        .match_body(Matcher::PartialJsonString(
            r#"{"categories":[7]}"#.to_string(),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":200,"link":null}"#)
        .create_async()
        .await;

    let mut publisher = RestPublisher::new(&wp_config(&server.url(), "rest")).unwrap();
    let mut new_post = post();
    new_post.category = Some("科技".to_string());
    let result = publisher.publish(&new_post).await.unwrap();

    assert_eq!(result.remote_id, "200");
    post_mock.assert_async().await;
}

#[tokio::test]
async fn test_rest_publish_failure_is_publish_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wp-json/wp/v2/categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("POST", "/wp-json/wp/v2/tags")
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("POST", "/wp-json/wp/v2/posts")
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let mut publisher = RestPublisher::new(&wp_config(&server.url(), "rest")).unwrap();
    let result = publisher.publish(&post()).await;
    assert!(matches!(result, Err(Error::Publish(_))));
}

const TERMS_RESPONSE: &str = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
  <value><struct>
    <member><name>term_id</name><value><string>1</string></value></member>
    <member><name>name</name><value><string>未分类</string></value></member>
  </struct></value>
  <value><struct>
    <member><name>term_id</name><value><string>7</string></value></member>
    <member><name>name</name><value><string>科技</string></value></member>
  </struct></value>
</data></array></value></param></params></methodResponse>"#;

const NEW_POST_RESPONSE: &str = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><string>321</string></value></param></params></methodResponse>"#;

#[tokio::test]
async fn test_xmlrpc_connection_and_publish() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/xmlrpc.php")
        .match_body(Matcher::Regex("wp.getTerms".to_string()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(TERMS_RESPONSE)
        .expect_at_least(1)
        .create_async()
        .await;
    let new_post_mock = server
        .mock("POST", "/xmlrpc.php")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("wp.newPost".to_string()),
            Matcher::Regex("测试标题".to_string()),
            // only 科技 is eligible once 未分类 is excluded
            Matcher::Regex("<string>科技</string>".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(NEW_POST_RESPONSE)
        .create_async()
        .await;

    let mut publisher = XmlRpcPublisher::new(&wp_config(&server.url(), "xmlrpc"))
        .unwrap()
        .with_rng_seed(7);
    publisher.test_connection().await.unwrap();

    let result = publisher.publish(&post()).await.unwrap();
    assert_eq!(result.remote_id, "321");
    new_post_mock.assert_async().await;
}

#[tokio::test]
async fn test_xmlrpc_fault_is_publish_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/xmlrpc.php")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(
            r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
  <member><name>faultCode</name><value><int>403</int></value></member>
  <member><name>faultString</name><value><string>Incorrect username or password.</string></value></member>
</struct></value></fault></methodResponse>"#,
        )
        .create_async()
        .await;

    let publisher = XmlRpcPublisher::new(&wp_config(&server.url(), "xmlrpc")).unwrap();
    let result = publisher.test_connection().await;
    assert!(matches!(result, Err(Error::Publish(_))));
}

#[tokio::test]
async fn test_xmlrpc_endpoint_unreachable_is_publish_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/xmlrpc.php")
        .with_status(404)
        .create_async()
        .await;

    let publisher = XmlRpcPublisher::new(&wp_config(&server.url(), "xmlrpc")).unwrap();
    assert!(publisher.test_connection().await.is_err());
}
