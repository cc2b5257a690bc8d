//! Integration tests for `ApiClient` and `LiveSource` using wiremock HTTP mocks.

use std::time::{Duration, Instant};

use infl_api::{ApiClient, ApiError, LiveSource, RetryPolicy};
use infl_core::{DataSource, ImageSource, SourceError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(base_url, Some("tok"), 30, "infl-test/0.1", Duration::ZERO)
        .expect("client construction should not fail")
}

fn no_wait_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff_base_secs: 0,
    }
}

fn user_body(username: &str, is_private: bool) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "user": {
            "pk": 42,
            "username": username,
            "follower_count": 1200,
            "following_count": 300,
            "media_count": 87,
            "usertags_count": 5,
            "category": "Personal blog",
            "biography": "coffee and mountains",
            "is_private": is_private
        }
    })
}

fn feed_item(id: &str, taken_at: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "taken_at": taken_at,
        "like_count": 10,
        "comment_count": 2,
        "image_versions2": { "candidates": [
            { "url": format!("https://cdn.test/{id}.jpg"), "width": 150, "height": 150 }
        ] }
    })
}

fn comments_body(n: usize) -> serde_json::Value {
    let comments: Vec<serde_json::Value> = (0..n)
        .map(|i| serde_json::json!({ "user": { "username": format!("fan{i}") }, "text": "nice shot" }))
        .collect();
    serde_json::json!({ "status": "ok", "comments": comments })
}

async fn mount_user(server: &MockServer, username: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{username}/usernameinfo/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(username, false)))
        .mount(server)
        .await;
}

async fn mount_comments(server: &MockServer, n: usize) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/media/[^/]+/comments/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments_body(n)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_user_returns_parsed_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("alice", false)))
        .mount(&server)
        .await;

    let user = test_client(&server.uri())
        .search_user("alice")
        .await
        .expect("should parse user");

    assert_eq!(user.pk, 42);
    assert_eq!(user.follower_count, 1200);
    assert_eq!(user.usertags_count, 5);
    assert_eq!(user.category.as_deref(), Some("Personal blog"));
    assert!(!user.is_private);
}

#[tokio::test]
async fn search_user_404_is_user_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost/usernameinfo/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).search_user("ghost").await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound { ref username }) if username == "ghost"),
        "expected UserNotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fail_envelope_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "fail", "message": "login_required" })),
        )
        .mount(&server)
        .await;

    let result = test_client(&server.uri()).search_user("alice").await;
    assert!(matches!(result, Err(ApiError::Api(ref m)) if m == "login_required"));
}

#[tokio::test]
async fn user_feed_follows_cursor_and_stops_at_limit() {
    let server = MockServer::start().await;

    let first: Vec<serde_json::Value> = (0..30).map(|i| feed_item(&format!("a{i}"), 1_000 + i)).collect();
    let second: Vec<serde_json::Value> = (0..30).map(|i| feed_item(&format!("b{i}"), 500 + i)).collect();

    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .and(query_param("max_id", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": second, "more_available": true, "next_max_id": "cursor-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": first, "more_available": true, "next_max_id": "cursor-1"
        })))
        .mount(&server)
        .await;

    let items = test_client(&server.uri())
        .user_feed(42, 50)
        .await
        .expect("feed should parse");

    assert_eq!(items.len(), 50, "feed is bounded to the requested limit");
    assert_eq!(items[0].id, "a0");
    assert_eq!(items[30].id, "b0");
}

#[tokio::test]
async fn user_feed_stops_when_no_more_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [feed_item("only", 1_000)], "more_available": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = test_client(&server.uri()).user_feed(42, 50).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn requests_are_paced() {
    let server = MockServer::start().await;
    mount_user(&server, "alice").await;

    let client = ApiClient::with_base_url(
        &server.uri(),
        None,
        30,
        "infl-test/0.1",
        Duration::from_millis(100),
    )
    .unwrap();

    let started = Instant::now();
    client.search_user("alice").await.unwrap();
    client.search_user("alice").await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn live_source_caps_comments_per_post() {
    let server = MockServer::start().await;
    mount_user(&server, "alice").await;
    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [feed_item("p1", 1_000), feed_item("p2", 2_000)],
            "more_available": false
        })))
        .mount(&server)
        .await;
    mount_comments(&server, 25).await;

    let source = LiveSource::new(test_client(&server.uri()), RetryPolicy::none(), 50, 10);
    let activity = source.fetch_user("alice").await.expect("extraction should succeed");

    assert_eq!(activity.profile.username, "alice");
    assert_eq!(activity.profile.followers, 1200);
    assert_eq!(activity.posts.len(), 2);
    for post in &activity.posts {
        assert_eq!(post.comments.len(), 10);
        assert_eq!(post.post.owner, "alice");
    }
    assert_eq!(
        activity.posts[0].post.image,
        Some(ImageSource::Url("https://cdn.test/p1.jpg".to_owned()))
    );
}

#[tokio::test]
async fn live_source_retries_whole_user_after_transient_failure() {
    let server = MockServer::start().await;

    // One 503 on the first lookup, then healthy responses.
    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("alice", false)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [feed_item("p1", 1_000)], "more_available": false
        })))
        .mount(&server)
        .await;
    mount_comments(&server, 1).await;

    let source = LiveSource::new(test_client(&server.uri()), no_wait_retries(3), 50, 10);
    let activity = source.fetch_user("alice").await.expect("should succeed after one retry");
    assert_eq!(activity.posts.len(), 1);
}

#[tokio::test]
async fn failure_mid_user_restarts_extraction_from_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("alice", false)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed/user/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [feed_item("p1", 1_000), feed_item("p2", 2_000)],
            "more_available": false
        })))
        .expect(2)
        .mount(&server)
        .await;
    // The second post's comments fail once, after p1 was already processed.
    Mock::given(method("GET"))
        .and(path("/media/p2/comments/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_comments(&server, 3).await;

    let source = LiveSource::new(test_client(&server.uri()), no_wait_retries(3), 50, 10);
    let activity = source.fetch_user("alice").await.expect("should succeed on the second pass");

    assert_eq!(activity.posts.len(), 2);
    let counts: Vec<usize> = activity.posts.iter().map(|p| p.comments.len()).collect();
    assert_eq!(counts, vec![3, 3]);
}

#[tokio::test]
async fn live_source_gives_up_after_bounded_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice/usernameinfo/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let source = LiveSource::new(test_client(&server.uri()), no_wait_retries(2), 50, 10);
    let result = source.fetch_user("alice").await;

    assert!(
        matches!(result, Err(SourceError::RetriesExhausted { attempts: 3, .. })),
        "expected RetriesExhausted, got: {result:?}"
    );
}

#[tokio::test]
async fn live_source_does_not_retry_private_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/locked/usernameinfo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("locked", true)))
        .expect(1)
        .mount(&server)
        .await;

    let source = LiveSource::new(test_client(&server.uri()), no_wait_retries(3), 50, 10);
    let result = source.fetch_user("locked").await;

    assert!(matches!(result, Err(SourceError::PrivateAccount { .. })));
}

#[tokio::test]
async fn live_source_reports_unknown_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost/usernameinfo/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let source = LiveSource::new(test_client(&server.uri()), no_wait_retries(3), 50, 10);
    let result = source.fetch_user("ghost").await;
    assert!(matches!(result, Err(SourceError::UserNotFound { .. })));
}

#[tokio::test]
async fn account_category_reads_user_category() {
    let server = MockServer::start().await;
    mount_user(&server, "acme").await;

    let source = LiveSource::new(test_client(&server.uri()), RetryPolicy::none(), 50, 10);
    let category = source.account_category("acme").await.unwrap();
    assert_eq!(category.as_deref(), Some("Personal blog"));
}

#[tokio::test]
async fn fetch_image_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/p1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;

    let source = LiveSource::new(test_client(&server.uri()), RetryPolicy::none(), 50, 10);
    let bytes = source
        .fetch_image(&format!("{}/img/p1.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}
