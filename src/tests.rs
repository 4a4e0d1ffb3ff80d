//! Integration tests for the Horas backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Migrate a single account and return its email.
    async fn migrate_user(&self, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/admin/users/migrate"))
            .json(&json!({
                "users": [{
                    "email": email,
                    "password": "senha-123",
                    "displayName": "Usuário de Teste"
                }]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["migrated"], 1);
        email.to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_and_invalid_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;

    // Plain client without default headers
    let client = Client::new();

    let resp = client
        .get(fixture.url("/api/version"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = client
        .get(fixture.url("/api/version"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_valid_psk() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/version"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_tco_duplicate_check_end_to_end() {
    let fixture = TestFixture::new().await;

    // Register a TCO whose number normalizes to "42"
    let create_resp = fixture
        .client
        .post(fixture.url("/api/tcos"))
        .json(&json!({
            "tcoNumber": "TCO-0042",
            "natureza": "Lesão corporal leve",
            "createdBy": "sgt.silva@pm.example"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let tco_id = create_body["data"]["id"].as_str().unwrap().to_string();

    // A differently formatted number with the same normalized form is a duplicate
    let check_resp = fixture
        .client
        .get(fixture.url("/api/tcos/check-duplicate?number=0042"))
        .send()
        .await
        .unwrap();
    assert_eq!(check_resp.status(), 200);
    let check_body: Value = check_resp.json().await.unwrap();
    assert_eq!(check_body["data"]["duplicate"], true);
    assert_eq!(check_body["data"]["existing"]["id"], tco_id.as_str());

    // A different number is not
    let check_resp = fixture
        .client
        .get(fixture.url("/api/tcos/check-duplicate?number=9999"))
        .send()
        .await
        .unwrap();
    let check_body: Value = check_resp.json().await.unwrap();
    assert_eq!(check_body["data"]["duplicate"], false);

    // Input with no digits short-circuits to no duplicate
    let check_resp = fixture
        .client
        .get(fixture.url("/api/tcos/check-duplicate?number=abc"))
        .send()
        .await
        .unwrap();
    let check_body: Value = check_resp.json().await.unwrap();
    assert_eq!(check_body["data"]["duplicate"], false);
}

#[tokio::test]
async fn test_tco_crud_and_validation() {
    let fixture = TestFixture::new().await;

    // Empty number is rejected before any write
    let resp = fixture
        .client
        .post(fixture.url("/api/tcos"))
        .json(&json!({
            "tcoNumber": "  ",
            "natureza": "Ameaça",
            "createdBy": "cb.souza@pm.example"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Create with extra form fields carried as-is
    let create_resp = fixture
        .client
        .post(fixture.url("/api/tcos"))
        .json(&json!({
            "tcoNumber": "123/2026",
            "natureza": "Ameaça",
            "dataFato": "2026-08-20",
            "createdBy": "cb.souza@pm.example",
            "extra": { "autor": "Fulano de Tal", "testemunhas": 2 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let tco_id = create_body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(create_body["data"]["extra"]["autor"], "Fulano de Tal");

    // List filtered by creator
    let list_resp = fixture
        .client
        .get(fixture.url("/api/tcos?createdBy=cb.souza@pm.example"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/tcos/{}", tco_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/tcos/{}", tco_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 404);
}

#[tokio::test]
async fn test_draft_merge_and_clear() {
    let fixture = TestFixture::new().await;
    let owner = "sgt.silva@pm.example";

    // No draft yet
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/drafts/{}", owner)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());

    // Two sequential partial merges accumulate
    fixture
        .client
        .put(fixture.url(&format!("/api/drafts/{}", owner)))
        .json(&json!({"a": 1}))
        .send()
        .await
        .unwrap();
    fixture
        .client
        .put(fixture.url(&format!("/api/drafts/{}", owner)))
        .json(&json!({"b": 2}))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/drafts/{}", owner)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["payload"], json!({"a": 1, "b": 2}));

    // Clear removes the draft
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/drafts/{}", owner)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/drafts/{}", owner)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_corrupt_draft_loads_as_absent() {
    let fixture = TestFixture::new().await;
    let owner = "cb.souza@pm.example";

    sqlx::query("INSERT INTO drafts (owner_email, payload, updated_at) VALUES (?, ?, ?)")
        .bind(owner)
        .bind("{not-json")
        .bind("2026-08-24T12:00:00Z")
        .execute(&fixture.pool)
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/drafts/{}", owner)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_version_gate_flow() {
    let fixture = TestFixture::new().await;
    let email = fixture.migrate_user("sd.lima@pm.example").await;

    // First read lazily creates the default version record
    let resp = fixture
        .client
        .get(fixture.url("/api/version"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["version"], "1.0.0");

    // Fresh account carries the sentinel version: improvements dialog
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/version/check?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "firstUpgrade");

    // Acknowledge persists the system version to the user
    let resp = fixture
        .client
        .post(fixture.url("/api/version/acknowledge"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/version/check?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "current");

    // Publishing a new version makes the acknowledged session stale
    let resp = fixture
        .client
        .put(fixture.url("/api/version"))
        .json(&json!({ "version": "2.0.0", "improvements": "Novo calendário semanal." }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/version/check?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "signOutRequired");
    assert_eq!(body["data"]["version"], "2.0.0");
}

#[tokio::test]
async fn test_convocation_pending_and_unique_response() {
    let fixture = TestFixture::new().await;
    let email = "sgt.silva@pm.example";

    // No active convocation: nothing pending
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/convocations/pending?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());

    // Create an active convocation
    let create_resp = fixture
        .client
        .post(fixture.url("/api/convocations"))
        .json(&json!({
            "monthYear": "08/2026",
            "startsOn": "2026-08-01",
            "endsOn": "2026-08-31",
            "deadline": "2026-07-25"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let convocation_id = create_body["data"]["id"].as_str().unwrap().to_string();

    // Now pending for a user with no response
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/convocations/pending?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], convocation_id.as_str());

    // Respond
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/convocations/{}/respond", convocation_id)))
        .json(&json!({ "userEmail": email, "response": "volunteer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Nothing pending any more
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/convocations/pending?email={}", email)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].is_null());

    // A second response is a conflict
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/convocations/{}/respond", convocation_id)))
        .json(&json!({ "userEmail": email, "response": "decline" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_slot_capacity_is_enforced() {
    let fixture = TestFixture::new().await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/slots"))
        .json(&json!({
            "slotDate": "2026-08-25",
            "startsAt": "08:00",
            "endsAt": "12:00",
            "totalSlots": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let slot_id = create_body["data"]["id"].as_str().unwrap().to_string();

    // First booking fills the slot
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/book", slot_id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["usedSlots"], 1);

    // Second booking conflicts
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/book", slot_id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Cancelling frees the place again
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/cancel", slot_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["usedSlots"], 0);

    // Cancelling an empty slot conflicts
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/cancel", slot_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn test_slot_allowed_user_types() {
    let fixture = TestFixture::new().await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/slots"))
        .json(&json!({
            "slotDate": "2026-08-26",
            "startsAt": "14:00",
            "endsAt": "18:00",
            "totalSlots": 2,
            "allowedUserTypes": ["motorista"]
        }))
        .send()
        .await
        .unwrap();
    let create_body: Value = create_resp.json().await.unwrap();
    let slot_id = create_body["data"]["id"].as_str().unwrap().to_string();

    // Wrong user type is rejected
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/book", slot_id)))
        .json(&json!({ "userType": "administrativo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing user type is rejected when the slot is restricted
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/book", slot_id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Allowed user type books normally
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/slots/{}/book", slot_id)))
        .json(&json!({ "userType": "motorista" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_user_migration_reports_per_record_errors() {
    let fixture = TestFixture::new().await;
    fixture.migrate_user("existente@pm.example").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/users/migrate"))
        .json(&json!({
            "users": [
                { "email": "novo@pm.example", "password": "senha-1", "displayName": "Novo Usuário" },
                { "email": "existente@pm.example", "password": "senha-2", "displayName": "Duplicado" },
                { "email": "", "password": "senha-3", "displayName": "Sem Email" }
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["migrated"], 1);
    assert_eq!(body["data"]["failed"], 2);

    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["email"], "existente@pm.example");
    assert_eq!(errors[1]["email"], "");
}

#[tokio::test]
async fn test_user_update_and_block() {
    let fixture = TestFixture::new().await;
    fixture.migrate_user("bloqueado@pm.example").await;

    let list_resp = fixture
        .client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    let user_id = list_body["data"][0]["id"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/users/{}", user_id)))
        .json(&json!({ "blocked": true, "userType": "motorista" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["blocked"], true);
    assert_eq!(body["data"]["userType"], "motorista");
}

#[tokio::test]
async fn test_operations_duplicate_name_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/operations"))
        .json(&json!({ "name": "Operação Cavalaria" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let op_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["active"], true);

    // Same name again is a validation error
    let resp = fixture
        .client
        .post(fixture.url("/api/operations"))
        .json(&json!({ "name": "Operação Cavalaria" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Toggle inactive
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/operations/{}", op_id)))
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["active"], false);
}

#[tokio::test]
async fn test_message_crud() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/messages"))
        .json(&json!({
            "authorEmail": "cmd@pm.example",
            "body": "Reunião geral sexta-feira às 09h."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let message_id = body["data"]["id"].as_str().unwrap().to_string();

    let list_resp = fixture
        .client
        .get(fixture.url("/api/messages"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/messages/{}", message_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Empty body is rejected
    let resp = fixture
        .client
        .post(fixture.url("/api/messages"))
        .json(&json!({ "authorEmail": "cmd@pm.example", "body": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/tcos/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp = fixture
        .client
        .get(fixture.url("/api/users/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .get(fixture.url("/api/version/check?email=ninguem@pm.example"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
