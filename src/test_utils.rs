//! Test utilities for Taskdeck
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, unsigned token builders, and sample API
//! fixtures.

use crate::api::{LoginResponse, Task, TaskStatus};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Build an unsigned token carrying `claims`
///
/// The header is `{"alg":"HS256","typ":"JWT"}` and the signature segment is
/// the literal `signature`; nothing in the crate verifies it.
///
/// # Examples
///
/// ```ignore
/// let token = make_token(json!({ "sub": "u1", "email": "a@b.com" }));
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

/// An `exp` claim one hour from now
pub fn future_exp() -> i64 {
    Utc::now().timestamp() + 3600
}

/// An `exp` claim one hour ago
pub fn past_exp() -> i64 {
    Utc::now().timestamp() - 3600
}

/// Login payload with the given tokens
pub fn login_response(access_token: &str, refresh_token: &str) -> LoginResponse {
    LoginResponse {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
    }
}

/// A pending task owned by `u1`
pub fn sample_task(id: &str, title: &str) -> Task {
    sample_task_with_status(id, title, TaskStatus::Pending)
}

pub fn sample_task_with_status(id: &str, title: &str, status: TaskStatus) -> Task {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp");
    Task {
        id: id.to_string(),
        title: title.to_string(),
        status,
        user_id: "u1".to_string(),
        created_at: at,
        updated_at: at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token;
    use serde_json::json;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "content");
    }

    #[test]
    fn test_make_token_is_decodable() {
        let token = make_token(json!({ "sub": "u1", "email": "a@b.com", "exp": future_exp() }));
        let info = token::extract_user_info(&token).unwrap();
        assert_eq!(info.user_id, "u1");
        assert!(token.ends_with(".signature"));
    }
}
