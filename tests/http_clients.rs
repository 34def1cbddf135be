use sora_scanner::notifier::{build_payload, notify, DEFAULT_HEADER};
use sora_scanner::{
    DiscordWebhook, Notifier, RedditClient, RedditCredentials, ScannerError, Source, TokenSet,
};
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        user_agent: "sora-scanner-test/0.1".to_string(),
    }
}

fn reddit(server: &MockServer) -> RedditClient {
    RedditClient::new(credentials(), Duration::from_secs(5))
        .unwrap()
        .with_base_urls(server.uri(), server.uri())
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-123",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn reddit_search_returns_titles_and_bodies() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("q", "Sora invite code"))
        .and(query_param("limit", "2"))
        .and(query_param("restrict_sr", "false"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("user-agent", "sora-scanner-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "Listing",
            "data": {
                "after": null,
                "children": [
                    { "kind": "t3", "data": { "title": "Got codes", "selftext": "NEWCODE99" } },
                    { "kind": "t3", "data": { "title": "Link post only" } },
                    { "kind": "t3", "data": { "title": "extra", "selftext": "dropped" } }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = reddit(&server)
        .search("all", "Sora invite code", 2)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Got codes");
    assert_eq!(posts[0].body, "NEWCODE99");
    assert_eq!(posts[1].body, "");
}

#[tokio::test]
async fn named_subreddit_restricts_search() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/OpenAI/search"))
        .and(query_param("restrict_sr", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "Listing",
            "data": { "children": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = reddit(&server).search("OpenAI", "sora", 10).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn auth_failure_is_a_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = reddit(&server).search("all", "sora", 10).await.unwrap_err();
    assert!(matches!(err, ScannerError::Fetch(_)));
}

#[tokio::test]
async fn rate_limited_search_is_a_fetch_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let err = reddit(&server).search("all", "sora", 10).await.unwrap_err();
    assert!(matches!(err, ScannerError::Fetch(_)));
}

#[tokio::test]
async fn webhook_receives_content_envelope() {
    let server = MockServer::start().await;
    let tokens: TokenSet = ["ABCDEFGH", "NEWCODE99"].iter().map(|s| s.to_string()).collect();

    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_json(serde_json::json!({
            "content": "New Sora codes found:\nABCDEFGH\nNEWCODE99"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = DiscordWebhook::new(format!("{}/webhook", server.uri()), Duration::from_secs(5)).unwrap();

    assert!(notify(&webhook, DEFAULT_HEADER, &tokens).await);
}

#[tokio::test]
async fn webhook_error_status_is_reported_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = DiscordWebhook::new(server.uri(), Duration::from_secs(5)).unwrap();
    let tokens: TokenSet = ["NEWCODE99".to_string()].into_iter().collect();

    let err = webhook
        .deliver(&build_payload(DEFAULT_HEADER, &tokens))
        .await
        .unwrap_err();
    assert!(matches!(err, ScannerError::Delivery(_)));

    // notify swallows the same failure
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let webhook = DiscordWebhook::new(server.uri(), Duration::from_secs(5)).unwrap();
    assert!(!notify(&webhook, DEFAULT_HEADER, &tokens).await);
}

#[tokio::test]
async fn empty_batch_never_reaches_webhook() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let webhook = DiscordWebhook::new(server.uri(), Duration::from_secs(5)).unwrap();
    assert!(!notify(&webhook, DEFAULT_HEADER, &TokenSet::new()).await);
}
