//! End-to-end session flow: Gemini client on wiremock, SQLite history,
//! file export

mod common;

use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use educador_ia::catalog::Catalog;
use educador_ia::export;
use educador_ia::generation::create_client;
use educador_ia::history::HistoryStore;
use educador_ia::session::{ImageOutcome, Session, TextOutcome, GENERATION_ERROR_MESSAGE};

const STREAM_PATH: &str = "/v1beta/models/gemini-2.5-flash:streamGenerateContent";
const IMAGE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

struct Harness {
    session: Session,
    history: Arc<Mutex<HistoryStore>>,
    catalog: Catalog,
    _dir: tempfile::TempDir,
}

fn harness(server: &MockServer) -> Harness {
    let (storage, dir) = common::create_temp_storage();
    let history = Arc::new(Mutex::new(HistoryStore::open(storage, "history")));
    let catalog = Catalog::builtin().unwrap();
    let client = create_client(&common::gemini_config(&server.uri())).unwrap();
    let session = Session::new(client, history.clone(), catalog.contexts().to_vec());
    Harness {
        session,
        history,
        catalog,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_streamed_generation_is_recorded_and_exported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            common::sse_body(&["Ola", ", tudo bem", "!"]).into_bytes(),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let h = harness(&server);
    let template = h.catalog.template(1).unwrap().clone();
    h.session.open_template(&template);

    let outcome = h.session.generate_text().await;
    assert!(matches!(outcome, TextOutcome::Completed { saved: Some(_) }));
    assert_eq!(h.session.snapshot().result_text, "Ola, tudo bem!");

    let entries = h.history.lock().unwrap().entries().to_vec();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].template_title, "Planos de Aula Personalizados");
    assert_eq!(entries[0].prompt, template.default_prompt);

    let out = tempfile::tempdir().unwrap();
    let path = export::write_history(out.path(), &entries).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("Modelo: Planos de Aula Personalizados"));
    assert!(text.contains("Ola, tudo bem!"));

    let state = h.session.snapshot();
    let saved = export::write_result_text(out.path(), &template.title, &state.result_text).unwrap();
    assert!(saved
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("educador-ia-planos-de-aula-personalizados-"));
}

#[tokio::test]
async fn test_municipal_context_reaches_endpoint_but_not_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["ok"]).into_bytes(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.open_template(h.catalog.template(3).unwrap());
    h.session.set_prompt("Atividades de subtração");
    h.session.set_context("municipal");
    h.session.generate_text().await;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(sent.starts_with("Atividades de subtração\n\n[IMPORTANTE:"));

    let history = h.history.lock().unwrap();
    assert_eq!(history.entries()[0].prompt, "Atividades de subtração");
}

#[tokio::test]
async fn test_endpoint_failure_shows_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "internal", "status": "INTERNAL"}
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.open_template(h.catalog.template(1).unwrap());

    assert_eq!(h.session.generate_text().await, TextOutcome::Failed);
    let state = h.session.snapshot();
    assert_eq!(state.result_text, GENERATION_ERROR_MESSAGE);
    assert!(!state.generation_in_progress);
    assert!(h.history.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_image_after_text_keeps_both() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["texto"]).into_bytes(), "text/event-stream"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": common::png_base64()}}
            ]}}]
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.open_template(h.catalog.template(2).unwrap());
    h.session.generate_text().await;

    assert!(matches!(
        h.session.generate_image().await,
        ImageOutcome::Completed(_)
    ));
    let state = h.session.snapshot();
    assert_eq!(state.result_text, "texto");
    let image = state.generated_image.expect("image set");

    let out = tempfile::tempdir().unwrap();
    let path = export::write_image_png(out.path(), &image).unwrap();
    assert!(path.ends_with(export::IMAGE_FILE_NAME));
}

#[tokio::test]
async fn test_image_failure_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.open_template(h.catalog.template(2).unwrap());
    let before = h.session.snapshot();

    assert_eq!(h.session.generate_image().await, ImageOutcome::Failed);
    assert_eq!(h.session.snapshot(), before);
}
