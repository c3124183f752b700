use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use passion_auto_2_roues::client::{AdminSession, ClientError, MarketplaceClient};
use passion_auto_2_roues::domain::NewSavedSearch;

fn client(server: &MockServer) -> MarketplaceClient {
    MarketplaceClient::new(&server.uri())
        .unwrap()
        .with_token("user-token")
}

fn saved_search(name: &str) -> serde_json::Value {
    let now = Utc::now();
    json!({
        "id": Uuid::new_v4(),
        "user_id": Uuid::new_v4(),
        "name": name,
        "filters": { "keyword": "yamaha", "sort": "recent" },
        "alerts_enabled": true,
        "created_at": now,
        "updated_at": now
    })
}

#[tokio::test]
async fn test_favorite_toggle_rolls_back_on_server_error() {
    let server = MockServer::start().await;
    let vehicle_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/favorites/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/favorites/{}", vehicle_id)))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "Internal server error", "code": "INTERNAL_ERROR" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.toggle_favorite(vehicle_id).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ClientError::Api { code: Some(ref c), .. } if c == "INTERNAL_ERROR"));

    // État local restauré, sans nouvel appel réseau
    assert!(!client.is_favorite(vehicle_id));
    assert!(client.favorite_ids(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_toggle_adds_then_removes() {
    let server = MockServer::start().await;
    let vehicle_id = Uuid::new_v4();
    let route = format!("/api/favorites/{}", vehicle_id);

    Mock::given(method("GET"))
        .and(path("/api/favorites/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(route.as_str()))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "favorite": true, "changed": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "favorite": false, "changed": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.toggle_favorite(vehicle_id).await.unwrap());
    assert!(client.is_favorite(vehicle_id));
    assert!(!client.toggle_favorite(vehicle_id).await.unwrap());
    assert!(!client.is_favorite(vehicle_id));
}

#[tokio::test]
async fn test_unread_count_is_cached_until_marked_read() {
    let server = MockServer::start().await;
    let counterpart = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/messages-simple/unread-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/messages-simple/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.unread_count(false).await.unwrap(), 3);
    assert_eq!(client.unread_count(false).await.unwrap(), 3);

    assert_eq!(client.mark_read(counterpart, None).await.unwrap(), 3);
    // Cache invalidé par l'écriture : second appel réseau
    client.unread_count(false).await.unwrap();
}

#[tokio::test]
async fn test_saved_searches_refetched_after_create() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/saved-searches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved_search("Roadsters")])))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/saved-searches"))
        .respond_with(ResponseTemplate::new(201).set_body_json(saved_search("Trails")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.saved_searches(false).await.unwrap().len(), 1);
    client.saved_searches(false).await.unwrap();
    // Rechargement forcé
    client.saved_searches(true).await.unwrap();

    let created = client
        .create_saved_search(&NewSavedSearch {
            name: "Trails".to_string(),
            filters: Default::default(),
            alerts_enabled: true,
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Trails");
    client.saved_searches(false).await.unwrap();
}

#[tokio::test]
async fn test_authenticated_calls_need_a_token() {
    let server = MockServer::start().await;
    let client = MarketplaceClient::new(&server.uri()).unwrap();

    let err = client.favorite_ids(true).await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_admin_session_from_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "admin-token",
            "email": "admin@example.com",
            "expires_at": Utc::now() + Duration::hours(24)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .and(header("authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users_total": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MarketplaceClient::new(&server.uri()).unwrap();
    let session = client.admin_login("admin@example.com", "secret").await.unwrap();
    assert!(session.admin_authenticated);
    assert_eq!(session.admin_email, "admin@example.com");

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    session.save(&file).unwrap();
    let restored = AdminSession::load(&file, Utc::now()).unwrap().unwrap();

    let stats = client.admin_stats(&restored).await.unwrap();
    assert_eq!(stats.users_total, 4);

    // Au-delà de 24 h, la session est refusée sans appel réseau
    let stale = AdminSession::new("admin@example.com", "admin-token", Utc::now() - Duration::hours(25));
    assert!(matches!(
        client.admin_stats(&stale).await,
        Err(ClientError::SessionExpired)
    ));
    assert_eq!(AdminSession::load(&file, Utc::now() + Duration::hours(25)).unwrap(), None);
}

#[tokio::test]
async fn test_rejected_admin_login_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "Invalid credentials", "code": "UNAUTHORIZED" })),
        )
        .mount(&server)
        .await;

    let client = MarketplaceClient::new(&server.uri()).unwrap();
    let err = client.admin_login("admin@example.com", "faux").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
