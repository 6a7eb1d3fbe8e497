//! End-to-end tests for the Convene API.
//!
//! Each test spawns the full router on an ephemeral port against an
//! isolated, migrated database and drives it over HTTP.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use api_service::config::Config;
use api_service::routes::{self, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn(pool: PgPool) -> Result<Self> {
        let config = Config {
            database_url: String::new(),
            bind_address: "127.0.0.1:0".to_string(),
            signing_key: vec![7u8; 32],
        };
        let state = Arc::new(AppState { pool, config });
        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return their id.
    async fn register(&self, email: &str, username: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({
                "email": email,
                "password": "password123",
                "username": username,
            }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await?;
        Ok(body["id"].as_str().unwrap().to_string())
    }

    /// Log a registered user in and return their access token.
    async fn login(&self, email: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({"email": email, "password": "password123"}))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await?;
        Ok(body["access_token"].as_str().unwrap().to_string())
    }

    /// Register, log in, and return (user_id, access_token).
    async fn signup(&self, email: &str, username: &str) -> Result<(String, String)> {
        let id = self.register(email, username).await?;
        let token = self.login(email).await?;
        Ok((id, token))
    }

    async fn create_meeting(&self, token: &str) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/meetings/"))
            .bearer_auth(token)
            .json(&json!({
                "title": "Planning",
                "start": "2026-09-01T10:00:00Z",
                "description": "Quarterly planning",
                "group_id": uuid::Uuid::new_v4(),
            }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        Ok(response.json().await?)
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_login_me_roundtrip(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;

    let (user_id, token) = server.signup("alice@example.com", "alice").await?;

    let response = server
        .client
        .get(server.url("/me"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["id"].as_str(), Some(user_id.as_str()));
    assert_eq!(body["email"].as_str(), Some("alice@example.com"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_unknown_email_is_404(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;

    let response = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "ghost@example.com", "password": "password123"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_wrong_password_is_400(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    server.register("bob@example.com", "bob").await?;

    let response = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "bob@example.com", "password": "wrong-password"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_email_is_409(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    server.register("dup@example.com", "first").await?;

    let response = server
        .client
        .post(server.url("/register"))
        .json(&json!({
            "email": "dup@example.com",
            "password": "password123",
            "username": "second",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_refresh_rejects_access_token(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, access_token) = server.signup("carol@example.com", "carol").await?;

    let response = server
        .client
        .post(server.url("/refresh"))
        .json(&json!({"refresh_token": access_token}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_refresh_mints_working_access_token(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    server.register("dave@example.com", "dave").await?;

    let login: Value = server
        .client
        .post(server.url("/login"))
        .json(&json!({"email": "dave@example.com", "password": "password123"}))
        .send()
        .await?
        .json()
        .await?;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let refreshed: Value = server
        .client
        .post(server.url("/refresh"))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await?
        .json()
        .await?;

    let new_access = refreshed["access_token"].as_str().unwrap();
    let response = server
        .client
        .get(server.url("/me"))
        .bearer_auth(new_access)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_route_requires_token(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;

    let response = server.client.get(server.url("/me")).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .client
        .get(server.url("/time_slots/"))
        .bearer_auth("garbage-token")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

// ============================================================================
// Time slots
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_time_slot_lifecycle(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, token) = server.signup("slots@example.com", "slots").await?;

    // Three inserts get sequential ids from zero
    for expected_id in 0..3 {
        let response = server
            .client
            .post(server.url("/time_slots/"))
            .bearer_auth(&token)
            .json(&json!({
                "start": "2026-09-01T09:00:00Z",
                "end": "2026-09-01T10:00:00Z",
            }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await?;
        assert_eq!(body["id"].as_i64(), Some(expected_id));
    }

    // Partial update touches only the provided field
    let response = server
        .client
        .patch(server.url("/time_slots/1"))
        .bearer_auth(&token)
        .json(&json!({"end": "2026-09-01T12:00:00Z"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["start"].as_str(), Some("2026-09-01T09:00:00Z"));

    // Delete id 1, then a new insert takes max+1, not the hole
    let response = server
        .client
        .delete(server.url("/time_slots/1"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .client
        .delete(server.url("/time_slots/1"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .client
        .post(server.url("/time_slots/"))
        .bearer_auth(&token)
        .json(&json!({
            "start": "2026-09-02T09:00:00Z",
            "end": "2026-09-02T10:00:00Z",
        }))
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["id"].as_i64(), Some(3));

    let listing: Value = server
        .client
        .get(server.url("/time_slots/"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let ids: Vec<i64> = listing["time_slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![0, 2, 3]);

    Ok(())
}

// ============================================================================
// Meetings and invitations
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_meeting_creation_enrolls_creator(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (user_id, token) = server.signup("host@example.com", "host").await?;

    let meeting = server.create_meeting(&token).await?;

    let participants = meeting["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["user_id"].as_str(), Some(user_id.as_str()));
    assert_eq!(
        participants[0]["status"].as_str(),
        Some("needs_acceptance")
    );
    assert_eq!(meeting["admin_id"].as_str(), Some(user_id.as_str()));

    // The creator's meeting view shows the same pending entry
    let tiles: Value = server
        .client
        .get(server.url("/meetings/"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let meetings = tiles["meetings"].as_array().unwrap();
    assert_eq!(meetings.len(), 1);
    assert_eq!(meetings[0]["status"].as_str(), Some("needs_acceptance"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_invite_and_accept_flow(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, host_token) = server.signup("host@example.com", "host").await?;
    let (guest_id, guest_token) = server.signup("guest@example.com", "guest").await?;

    let meeting = server.create_meeting(&host_token).await?;
    let meeting_id = meeting["id"].as_str().unwrap();

    // Guest invites themself
    let response = server
        .client
        .post(server.url(&format!("/meetings/{}/invite", meeting_id)))
        .bearer_auth(&guest_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"].as_str(), Some("needs_acceptance"));
    assert_eq!(body["user_id"].as_str(), Some(guest_id.as_str()));

    // Guest accepts through their invite
    let response = server
        .client
        .patch(server.url(&format!("/invites/{}", meeting_id)))
        .bearer_auth(&guest_token)
        .json(&json!({"status": "accepted"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Both views agree and no duplicate entries exist
    let shown: Value = server
        .client
        .get(server.url(&format!("/meetings/{}", meeting_id)))
        .send()
        .await?
        .json()
        .await?;
    let participants = shown["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    let guest_entry = participants
        .iter()
        .find(|p| p["user_id"].as_str() == Some(guest_id.as_str()))
        .unwrap();
    assert_eq!(guest_entry["status"].as_str(), Some("accepted"));

    let tiles: Value = server
        .client
        .get(server.url("/meetings/"))
        .bearer_auth(&guest_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(
        tiles["meetings"].as_array().unwrap()[0]["status"].as_str(),
        Some("accepted")
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_meeting_details_view(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, host_token) = server.signup("host@example.com", "host").await?;
    let (_, guest_token) = server.signup("guest@example.com", "guest").await?;

    let meeting = server.create_meeting(&host_token).await?;
    let meeting_id = meeting["id"].as_str().unwrap();

    // A non-member gets 404, not an empty view
    let response = server
        .client
        .get(server.url(&format!("/meetings/{}/details", meeting_id)))
        .bearer_auth(&guest_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The host sees usernames and their own status
    let details: Value = server
        .client
        .get(server.url(&format!("/meetings/{}/details", meeting_id)))
        .bearer_auth(&host_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(details["status"].as_str(), Some("needs_acceptance"));
    assert_eq!(
        details["participants"].as_array().unwrap()[0]["username"].as_str(),
        Some("host")
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_change_participant_status(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, host_token) = server.signup("host@example.com", "host").await?;
    let (guest_id, guest_token) = server.signup("guest@example.com", "guest").await?;

    let meeting = server.create_meeting(&host_token).await?;
    let meeting_id = meeting["id"].as_str().unwrap();

    server
        .client
        .post(server.url(&format!("/meetings/{}/invite", meeting_id)))
        .bearer_auth(&guest_token)
        .send()
        .await?;

    // Unrecognized status is a validation failure
    let response = server
        .client
        .patch(server.url(&format!(
            "/meetings/{}/change_participant_status",
            meeting_id
        )))
        .bearer_auth(&host_token)
        .json(&json!({"id": guest_id, "status": "maybe"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client
        .patch(server.url(&format!(
            "/meetings/{}/change_participant_status",
            meeting_id
        )))
        .bearer_auth(&host_token)
        .json(&json!({"id": guest_id, "status": "declined"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"].as_str(), Some("declined"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_meeting_update_and_delete(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let (_, token) = server.signup("host@example.com", "host").await?;

    let meeting = server.create_meeting(&token).await?;
    let meeting_id = meeting["id"].as_str().unwrap();

    // Empty partial update returns the stored document unchanged
    let unchanged: Value = server
        .client
        .patch(server.url(&format!("/meetings/{}", meeting_id)))
        .json(&json!({}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(unchanged["title"].as_str(), Some("Planning"));

    let updated: Value = server
        .client
        .patch(server.url(&format!("/meetings/{}", meeting_id)))
        .json(&json!({"title": "Replanning"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["title"].as_str(), Some("Replanning"));
    assert_eq!(
        updated["description"].as_str(),
        Some("Quarterly planning")
    );

    let response = server
        .client
        .delete(server.url(&format!("/meetings/{}", meeting_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .client
        .delete(server.url(&format!("/meetings/{}", meeting_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

// ============================================================================
// Users and groups
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_user_update_and_delete(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let user_id = server.register("erin@example.com", "erin").await?;

    // Empty partial update returns the stored document unchanged
    let unchanged: Value = server
        .client
        .put(server.url(&format!("/users/{}", user_id)))
        .json(&json!({}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(unchanged["username"].as_str(), Some("erin"));

    let updated: Value = server
        .client
        .put(server.url(&format!("/users/{}", user_id)))
        .json(&json!({"username": "erin2"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["username"].as_str(), Some("erin2"));
    assert_eq!(updated["email"].as_str(), Some("erin@example.com"));

    let response = server
        .client
        .delete(server.url(&format!("/users/{}", user_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .client
        .get(server.url(&format!("/users/{}", user_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_group_crud(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;

    let response = server
        .client
        .post(server.url("/groups/"))
        .json(&json!({"name": "Book Club", "description": "Monthly reads"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group: Value = response.json().await?;
    let group_id = group["id"].as_str().unwrap();

    let listing: Value = server
        .client
        .get(server.url("/groups/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listing["groups"].as_array().unwrap().len(), 1);

    let updated: Value = server
        .client
        .put(server.url(&format!("/groups/{}", group_id)))
        .json(&json!({"name": "Film Club"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["name"].as_str(), Some("Film Club"));
    assert_eq!(updated["description"].as_str(), Some("Monthly reads"));

    let response = server
        .client
        .delete(server.url(&format!("/groups/{}", group_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .client
        .get(server.url(&format!("/groups/{}", group_id)))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_deleting_nonexistent_ids_is_404(pool: PgPool) -> Result<()> {
    let server = TestServer::spawn(pool).await?;
    let ghost = uuid::Uuid::new_v4();

    for path in [
        format!("/users/{}", ghost),
        format!("/meetings/{}", ghost),
        format!("/groups/{}", ghost),
    ] {
        let response = server.client.delete(server.url(&path)).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
    }

    Ok(())
}
