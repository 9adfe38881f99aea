//! Supabase gateway tests against a mocked project.

use serde_json::json;
use tasks::auth::NOT_REGISTERED_HINT;
use tasks::storage::NewTask;
use tasks::{
    Authenticator, Storage, SupabaseAuth, SupabaseConfig, SupabaseStorage, TaskPatch,
    TaskPriority, TaskSource, TaskStatus, TasksError,
};
use chrono::{TimeZone, Utc};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn config(server: &MockServer) -> SupabaseConfig {
    SupabaseConfig::new(server.uri(), ANON_KEY)
}

fn row(id: u64, title: &str, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "priority": "medium",
        "status": "todo",
        "due_date": null,
        "created_at": created_at,
        "updated_at": null,
        "completed_at": null,
        "hours_spent": null,
        "user_email": "ada@example.com",
        "source": "manual"
    })
}

// =============================================================================
// Storage
// =============================================================================

#[tokio::test]
async fn test_load_tasks_sends_session_token_and_orders_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", ANON_KEY))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row(2, "Newer", "2026-10-18T10:00:00+00:00"),
            row(1, "Older", "2026-10-17T10:00:00+00:00"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server)).scoped("user-jwt", "ada@example.com");
    let tasks = storage.load_tasks().await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "2");
    assert_eq!(tasks[0].title, "Newer");
    assert_eq!(tasks[1].user_id, "ada@example.com");
    assert_eq!(tasks[1].updated_at, tasks[1].created_at);
}

#[tokio::test]
async fn test_unscoped_storage_uses_anon_key_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .and(header("authorization", format!("Bearer {ANON_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server));
    assert!(storage.load_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_task_posts_store_columns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/tasks"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "title": "Buy milk",
            "user_email": "ada@example.com",
            "source": "ai-extraction",
            "status": "todo"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "t-1",
            "title": "Buy milk",
            "priority": "low",
            "status": "todo",
            "created_at": "2026-10-18T08:00:00Z",
            "user_email": "ada@example.com",
            "source": "ai-extraction"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
    let storage = SupabaseStorage::new(config(&server)).scoped("user-jwt", "ada@example.com");
    let task = storage
        .add_task(NewTask {
            title: "Buy milk".to_string(),
            description: String::new(),
            priority: TaskPriority::Low,
            status: TaskStatus::Todo,
            due_date: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            hours_spent: None,
            user_id: "ada@example.com".to_string(),
            source: TaskSource::AiExtraction,
        })
        .await
        .unwrap();

    assert_eq!(task.id, "t-1");
    assert_eq!(task.source, TaskSource::AiExtraction);
    assert_eq!(task.priority, TaskPriority::Low);
}

#[tokio::test]
async fn test_update_with_empty_representation_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", "eq.missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server)).scoped("user-jwt", "ada@example.com");
    let patch = TaskPatch {
        title: Some("Renamed".to_string()),
        ..TaskPatch::default()
    };
    let err = storage.update_task("missing", &patch).await.unwrap_err();

    assert!(matches!(err, TasksError::TaskNotFound { task_id } if task_id == "missing"));
}

#[tokio::test]
async fn test_update_without_body_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", "eq.7"))
        .and(body_partial_json(json!({ "status": "in-progress", "completed_at": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server)).scoped("user-jwt", "ada@example.com");
    let patch = TaskPatch {
        status: Some(TaskStatus::InProgress),
        completed_at: Some(None),
        ..TaskPatch::default()
    };

    assert_eq!(storage.update_task("7", &patch).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_of_unmatched_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", "eq.nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/tasks"))
        .and(query_param("id", "eq.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([row(1, "Gone", "2026-10-18T10:00:00Z")])),
        )
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server)).scoped("user-jwt", "ada@example.com");

    assert!(matches!(
        storage.delete_task("nope").await,
        Err(TasksError::TaskNotFound { .. })
    ));
    storage.delete_task("1").await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })),
        )
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server)).scoped("stale-jwt", "ada@example.com");

    assert!(matches!(
        storage.load_tasks().await,
        Err(TasksError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_server_error_is_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tasks"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(config(&server));
    let err = storage.load_tasks().await.unwrap_err();

    match err {
        TasksError::Provider { service, reason } => {
            assert_eq!(service, "supabase");
            assert!(reason.contains("upstream down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unconfigured_gateways_fail_without_network() {
    let storage = SupabaseStorage::new(SupabaseConfig::default());
    assert!(matches!(
        storage.load_tasks().await,
        Err(TasksError::NotConfigured { .. })
    ));

    let auth = SupabaseAuth::new(SupabaseConfig::default());
    assert!(matches!(
        auth.sign_in("ada@example.com", "secret1").await,
        Err(TasksError::NotConfigured { .. })
    ));
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_in_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", ANON_KEY))
        .and(body_partial_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt",
            "refresh_token": "refresh",
            "token_type": "bearer",
            "user": {
                "id": "u-1",
                "email": "ada@example.com",
                "user_metadata": { "name": "Ada Lovelace" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));
    let session = auth.sign_in("ada@example.com", "secret1").await.unwrap();

    assert_eq!(session.access_token, "jwt");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(session.user.name, "Ada Lovelace");
}

#[tokio::test]
async fn test_sign_in_credential_mismatch_suggests_sign_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));
    let err = auth.sign_in("nobody@example.com", "secret1").await.unwrap_err();

    match err {
        TasksError::Auth { message } => assert_eq!(message, NOT_REGISTERED_HINT),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_in_other_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Email not confirmed"
        })))
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));
    let err = auth.sign_in("ada@example.com", "secret1").await.unwrap_err();

    assert_eq!(err.to_string(), "Email not confirmed");
}

#[tokio::test]
async fn test_sign_up_sends_name_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "ada@example.com",
            "data": { "name": "Ada" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt",
            "user": { "id": "u-1", "email": "ada@example.com", "user_metadata": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));
    let registration = auth
        .sign_up("ada@example.com", "secret1", Some("Ada"))
        .await
        .unwrap();

    assert_eq!(registration.user.name, "Ada");
    assert_eq!(registration.session.unwrap().user.name, "Ada");
}

#[tokio::test]
async fn test_sign_up_pending_confirmation_has_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-2",
            "email": "grace@example.com",
            "confirmation_sent_at": "2026-10-18T08:00:00Z"
        })))
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));
    let registration = auth
        .sign_up("grace@example.com", "secret1", None)
        .await
        .unwrap();

    assert!(registration.session.is_none());
    assert_eq!(registration.user.name, "grace");
}

#[tokio::test]
async fn test_current_user_with_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer bad"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })),
        )
        .mount(&server)
        .await;

    let auth = SupabaseAuth::new(config(&server));

    let user = auth.current_user("good").await.unwrap();
    assert_eq!(user.id, "u-1");
    assert_eq!(user.name, "ada");
    assert!(matches!(
        auth.current_user("bad").await,
        Err(TasksError::Unauthorized)
    ));
}
