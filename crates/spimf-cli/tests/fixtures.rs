//! Backend mock helpers for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temp SPIMF_HOME directory for test isolation.
pub fn temp_spimf_home() -> TempDir {
    TempDir::new().expect("create temp spimf home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn member_json() -> Value {
    json!({
        "your_name_nama_anda": "Aisyah",
        "status_account": "Active",
        "phone": "0123456789",
        "kode_user": "KU-77"
    })
}

/// Mounts a 200 response for `action`.
pub async fn mount_action(server: &MockServer, action: &str, body: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": action })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_member_login(server: &MockServer) {
    mount_action(
        server,
        "login",
        json!({"success": true, "member": member_json()}),
    )
    .await;
}

pub async fn mount_guest_login(server: &MockServer) {
    mount_action(
        server,
        "guestLogin",
        json!({"success": true, "member": {"your_name_nama_anda": "Guest"}}),
    )
    .await;
}
