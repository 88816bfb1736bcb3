// tests/api_tests.rs

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode as MockStatus,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use quizcraft::{
    config::AppConfig,
    domain::QuestionGroupConfig,
    protocol::{FormOut, QuizSummaryOut, SubmitOut},
    routes::build_router,
    state::AppState,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::{Mutex, Notify};

/// What the mock generation backend saw in one POST.
#[derive(Debug, Clone)]
struct Received {
    groups: String,
    files: Vec<(String, usize)>,
}

#[derive(Default)]
struct Mock {
    received: Mutex<Vec<Received>>,
    history: Mutex<Value>,
    fail_with: Mutex<Option<MockStatus>>,
    /// When set, job creation waits for `release` before answering.
    hold: Mutex<bool>,
    release: Notify,
}

async fn mock_create(State(mock): State<Arc<Mock>>, mut multipart: Multipart) -> impl IntoResponse {
    if let Some(status) = *mock.fail_with.lock().await {
        return (status, Json(json!({ "detail": "generator unavailable" })));
    }
    let hold = *mock.hold.lock().await;
    if hold {
        mock.release.notified().await;
    }
    let mut groups = String::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("groups") => groups = field.text().await.unwrap(),
            Some("files") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let len = field.bytes().await.unwrap().len();
                files.push((name, len));
            }
            _ => {}
        }
    }
    mock.received.lock().await.push(Received { groups, files });
    (MockStatus::CREATED, Json(json!({ "id": 42 })))
}

async fn mock_list(State(mock): State<Arc<Mock>>) -> impl IntoResponse {
    Json(mock.history.lock().await.clone())
}

/// Spawn the mock backend on a random port. Returns its base URL.
async fn spawn_mock(mock: Arc<Mock>) -> String {
    let app = Router::new()
        .route("/quiz-craft/", get(mock_list).post(mock_create))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Spawn the service pointed at `backend`. Returns its base URL.
async fn spawn_app(backend: &str) -> String {
    let config = AppConfig {
        api_base_url: backend.to_string(),
        static_dir: "./static-does-not-exist".into(),
        display_offset_minutes: Some(0),
        ..AppConfig::default()
    };
    let state = Arc::new(AppState::new(config).unwrap());
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn setup() -> (String, Arc<Mock>, reqwest::Client) {
    let mock = Arc::new(Mock::default());
    let backend = spawn_mock(mock.clone()).await;
    let address = spawn_app(&backend).await;
    (address, mock, reqwest::Client::new())
}

async fn mount(client: &reqwest::Client, address: &str) -> FormOut {
    let res = client.post(format!("{}/api/v1/forms", address)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn upload(client: &reqwest::Client, address: &str, form: &FormOut, body: Form) -> reqwest::Response {
    client
        .post(format!("{}/api/v1/forms/{}/files", address, form.id))
        .multipart(body)
        .send()
        .await
        .unwrap()
}

fn file_part(name: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec()).file_name(name.to_string())
}

#[tokio::test]
async fn mounted_form_has_one_fixed_group() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;

    assert_eq!(form.groups.len(), 1);
    assert_eq!(form.groups[0].config, QuestionGroupConfig::initial());
    assert!(!form.removable);
    assert!(form.files.is_empty());
    assert!(!form.submitting);
}

#[tokio::test]
async fn groups_append_and_remove() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;
    let groups_url = format!("{}/api/v1/forms/{}/groups", address, form.id);

    // Plain append uses the append default.
    let res = client.post(&groups_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: FormOut = res.json().await.unwrap();
    assert_eq!(view.groups.len(), 2);
    assert_eq!(view.groups[1].config, QuestionGroupConfig::appended());
    assert!(view.removable);

    // Append with explicit fields.
    let view: FormOut = client
        .post(&groups_url)
        .json(&json!({ "type": "Long answer", "difficulty": "Hard", "count": 4 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.groups.len(), 3);

    // Remove the middle one; order of the rest is kept.
    let view: FormOut = client
        .delete(format!("{}/1", groups_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let counts: Vec<u32> = view.groups.iter().map(|g| g.config.count).collect();
    assert_eq!(counts, vec![1, 4]);
    assert_eq!(view.groups[1].index, 1);

    let res = client.delete(format!("{}/1", groups_url)).send().await.unwrap();
    let view: FormOut = res.json().await.unwrap();
    assert_eq!(view.groups.len(), 1);
    assert!(!view.removable);
}

#[tokio::test]
async fn last_group_cannot_be_removed() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;

    let res = client
        .delete(format!("{}/api/v1/forms/{}/groups/0", address, form.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("last question group"));

    let view: FormOut = client
        .get(format!("{}/api/v1/forms/{}", address, form.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.groups.len(), 1);
}

#[tokio::test]
async fn group_edits_are_checked_at_entry() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;
    let group_url = format!("{}/api/v1/forms/{}/groups/0", address, form.id);

    let view: FormOut = client
        .put(&group_url)
        .json(&json!({ "count": 8 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.groups[0].config.count, 8);

    let res = client.put(&group_url).json(&json!({ "count": 9 })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.put(&group_url).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.put(&group_url).json(&json!({ "type": "Essay" })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .put(format!("{}/api/v1/forms/{}/groups/3", address, form.id))
        .json(&json!({ "count": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_attaches_exactly_one_file() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;

    let body = Form::new()
        .part("file", file_part("slides.pdf", b"%PDF-1.4"))
        .part("file", file_part("ignored.png", b"png"));
    let res = upload(&client, &address, &form, body).await;
    assert_eq!(res.status(), StatusCode::OK);
    let view: FormOut = res.json().await.unwrap();
    assert_eq!(view.files.len(), 1);
    assert_eq!(view.files[0].name, "slides.pdf");
    assert_eq!(view.files[0].size, 8);

    // Same name again appends, it does not replace.
    let res = upload(&client, &address, &form, Form::new().part("file", file_part("slides.pdf", b"x"))).await;
    let view: FormOut = res.json().await.unwrap();
    assert_eq!(view.files.len(), 2);

    let res = upload(&client, &address, &form, Form::new().text("note", "no file here")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn removing_a_file_keeps_the_others_in_order() {
    let (address, _, client) = setup().await;
    let form = mount(&client, &address).await;
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        upload(&client, &address, &form, Form::new().part("file", file_part(name, b"1"))).await;
    }

    let files_url = format!("{}/api/v1/forms/{}/files", address, form.id);
    let view: FormOut = client
        .delete(format!("{}/1", files_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = view.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "c.pdf"]);

    let res = client.delete(format!("{}/5", files_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_forwards_groups_and_files() {
    let (address, mock, client) = setup().await;
    let form = mount(&client, &address).await;
    client
        .post(format!("{}/api/v1/forms/{}/groups", address, form.id))
        .json(&json!({ "type": "Single choice", "difficulty": "Easy", "count": 3 }))
        .send()
        .await
        .unwrap();
    upload(&client, &address, &form, Form::new().part("file", file_part("notes.txt", b"hello"))).await;
    upload(&client, &address, &form, Form::new().part("file", file_part("notes.txt", b"again!"))).await;

    let res = client
        .post(format!("{}/api/v1/forms/{}/submit", address, form.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let out: SubmitOut = res.json().await.unwrap();
    assert!(out.ok);
    assert_eq!(out.groups, 2);
    assert_eq!(out.files, 2);
    assert_eq!(out.job, Some(json!({ "id": 42 })));

    let received = mock.received.lock().await.clone();
    assert_eq!(received.len(), 1);
    let groups: Value = serde_json::from_str(&received[0].groups).unwrap();
    assert_eq!(
        groups,
        json!([
            { "type": "True or False", "difficulty": "Medium", "count": 1 },
            { "type": "Single choice", "difficulty": "Easy", "count": 3 }
        ])
    );
    assert_eq!(
        received[0].files,
        vec![("notes.txt".to_string(), 5), ("notes.txt".to_string(), 6)]
    );

    // The form is left as it was, back to idle.
    let view: FormOut = client
        .get(format!("{}/api/v1/forms/{}", address, form.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.groups.len(), 2);
    assert_eq!(view.files.len(), 2);
    assert!(!view.submitting);
}

#[tokio::test]
async fn backend_failure_is_reported_and_form_returns_to_idle() {
    let (address, mock, client) = setup().await;
    *mock.fail_with.lock().await = Some(MockStatus::SERVICE_UNAVAILABLE);
    let form = mount(&client, &address).await;
    let submit_url = format!("{}/api/v1/forms/{}/submit", address, form.id);

    let res = client.post(&submit_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("generator unavailable"));

    // Not stuck in Submitting: a retry reaches the backend again.
    *mock.fail_with.lock().await = None;
    let res = client.post(&submit_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(mock.received.lock().await.len(), 1);
}

async fn form_view(client: &reqwest::Client, address: &str, form: &FormOut) -> FormOut {
    client
        .get(format!("{}/api/v1/forms/{}", address, form.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

/// Poll the form until its `submitting` flag equals `want`.
async fn wait_until_submitting(client: &reqwest::Client, address: &str, form: &FormOut, want: bool) {
    for _ in 0..100 {
        if form_view(client, address, form).await.submitting == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("form never reached submitting={}", want);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_refused() {
    let (address, mock, client) = setup().await;
    *mock.hold.lock().await = true;
    let form = mount(&client, &address).await;
    let submit_url = format!("{}/api/v1/forms/{}/submit", address, form.id);

    let first = tokio::spawn({
        let client = client.clone();
        let submit_url = submit_url.clone();
        async move { client.post(&submit_url).send().await.unwrap().status() }
    });
    wait_until_submitting(&client, &address, &form, true).await;

    let res = client.post(&submit_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    mock.release.notify_one();
    assert_eq!(first.await.unwrap(), StatusCode::OK);
    assert_eq!(mock.received.lock().await.len(), 1);
    assert!(!form_view(&client, &address, &form).await.submitting);
}

#[tokio::test]
async fn client_giving_up_mid_submit_does_not_lock_the_form() {
    let (address, mock, client) = setup().await;
    *mock.hold.lock().await = true;
    let form = mount(&client, &address).await;
    let submit_url = format!("{}/api/v1/forms/{}/submit", address, form.id);

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(150))
        .build()
        .unwrap();
    assert!(impatient.post(&submit_url).send().await.is_err());

    // The backend finishes after the client is gone; the form still settles.
    *mock.hold.lock().await = false;
    mock.release.notify_one();
    wait_until_submitting(&client, &address, &form, false).await;
    assert_eq!(mock.received.lock().await.len(), 1);

    let res = client.post(&submit_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(mock.received.lock().await.len(), 2);
}

#[tokio::test]
async fn history_is_summarized_in_backend_order() {
    let (address, mock, client) = setup().await;
    *mock.history.lock().await = json!([
        {
            "id": 7,
            "timestamp": "2024-05-01T09:05:00Z",
            "files": [
                { "path": "a-b-report.pdf" },
                { "path": "c-d-notes.pdf" },
                { "path": "e-f-img.png" }
            ]
        },
        {
            "id": 3,
            "timestamp": "2024-04-30T18:40:12.5Z",
            "files": [{ "path": "x-y-only.docx", "size": 10 }]
        }
    ]);

    let res = client.get(format!("{}/api/v1/quizzes", address)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list: Vec<QuizSummaryOut> = res.json().await.unwrap();
    assert_eq!(list.len(), 2);

    assert_eq!(list[0].id, 7);
    assert_eq!(list[0].label, "report.pdf, notes.pdf & 1 more");
    assert_eq!(list[0].time, "09:05");
    assert_eq!(list[0].href, "/quiz/7");
    assert_eq!(list[0].files, vec!["report.pdf", "notes.pdf", "img.png"]);

    assert_eq!(list[1].id, 3);
    assert_eq!(list[1].label, "only.docx");
    assert_eq!(list[1].time, "18:40");
}

#[tokio::test]
async fn malformed_path_fails_the_whole_history() {
    let (address, mock, client) = setup().await;
    *mock.history.lock().await = json!([
        { "id": 1, "timestamp": "2024-05-01T09:05:00Z", "files": [{ "path": "a-b-fine.pdf" }] },
        { "id": 2, "timestamp": "2024-05-01T09:06:00Z", "files": [{ "path": "onlyonepart" }] }
    ]);

    let res = client.get(format!("{}/api/v1/quizzes", address)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("onlyonepart"));
}

#[tokio::test]
async fn unknown_and_discarded_forms_are_not_found() {
    let (address, _, client) = setup().await;
    let res = client
        .get(format!("{}/api/v1/forms/{}", address, uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let form = mount(&client, &address).await;
    let form_url = format!("{}/api/v1/forms/{}", address, form.id);
    let res = client.delete(&form_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.post(format!("{}/submit", form_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lists_choices() {
    let (address, _, client) = setup().await;
    let body: Value = client
        .get(format!("{}/api/v1/catalog", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["question_types"].as_array().unwrap().len(), 5);
    assert_eq!(body["question_types"][0], "True or False");
    assert_eq!(body["difficulties"][2], json!({ "title": "Hard", "color": "red" }));
    assert_eq!(body["min_count"], 1);
    assert_eq!(body["max_count"], 8);
    assert_eq!(body["appended_group"]["type"], "Multiple choice");
}
