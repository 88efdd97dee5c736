use base64::Engine;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use educador_ia::config::GeminiConfig;
use educador_ia::storage::SqliteStorage;
use serde_json::json;

#[allow(dead_code)]
pub fn create_temp_storage() -> (Arc<SqliteStorage>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("history.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (Arc::new(storage), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Gemini config pointing at a wiremock server
#[allow(dead_code)]
pub fn gemini_config(server_uri: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-key".to_string()),
        api_base: format!("{}/v1beta", server_uri),
        timeout_seconds: 5,
        ..Default::default()
    }
}

/// SSE body with one `GenerateContentResponse` event per text fragment
#[allow(dead_code)]
pub fn sse_body(fragments: &[&str]) -> String {
    fragments
        .iter()
        .map(|text| {
            let event = json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            });
            format!("data: {}\r\n\r\n", event)
        })
        .collect()
}

/// Base64 of a 1x1 PNG
#[allow(dead_code)]
pub fn png_base64() -> String {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::new(1, 1))
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
}
