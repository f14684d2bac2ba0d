use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use tempfile::TempDir;
use taskdeck::api::http::HttpApiClient;
use taskdeck::config::ApiConfig;
use taskdeck::storage::{MemoryTokenStore, TokenRepository};

/// Build an unsigned token carrying `claims`.
#[allow(dead_code)]
pub fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

/// A token for `u1` / `a@b.com` that expires in an hour.
#[allow(dead_code)]
pub fn valid_token() -> String {
    make_token(json!({
        "sub": "u1",
        "email": "a@b.com",
        "exp": chrono::Utc::now().timestamp() + 3600
    }))
}

/// Client pointed at `{base_uri}/api/v1`, sharing `tokens`.
#[allow(dead_code)]
pub fn make_client(base_uri: &str, tokens: Arc<dyn TokenRepository>) -> HttpApiClient {
    let config = ApiConfig {
        base_url: format!("{}/api/v1", base_uri),
        timeout_ms: 2_000,
    };
    HttpApiClient::new(&config, tokens).expect("client should build")
}

#[allow(dead_code)]
pub fn memory_tokens() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::new())
}

/// JSON for one task in the server's wire format.
#[allow(dead_code)]
pub fn task_json(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "status": status,
        "user_id": "u1",
        "created_at": "2024-01-15T09:30:00Z",
        "updated_at": "2024-01-15T09:30:00Z"
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
