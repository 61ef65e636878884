use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use exam_catalog::app::ports::{CatalogSource, SessionToken};
use exam_catalog::common::error::CatalogError;
use exam_catalog::domain::{Credentials, NewTest};
use exam_catalog::infra::http_client::ReqwestCatalog;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Requests seen by the stub, as "METHOD path auth"
type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Default)]
struct StubState {
    log: Log,
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn auth(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

async fn categories(State(state): State<StubState>, headers: HeaderMap) -> impl IntoResponse {
    let auth = auth(&headers);
    state.log.lock().await.push(format!("GET /categories {auth}"));
    if auth != "Bearer token-1" {
        return (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response();
    }
    Json(json!({ "categories": [{ "id": 1, "name": "Prova" }, { "id": 2, "name": "Lista" }] })).into_response()
}

async fn disciplines(State(state): State<StubState>) -> impl IntoResponse {
    state.log.lock().await.push("GET /disciplines".to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn tests_grouped(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let group_by = params.get("groupBy").cloned().unwrap_or_default();
    state.log.lock().await.push(format!("GET /tests?groupBy={group_by}"));
    let test = json!({
        "id": 10,
        "name": "P1",
        "pdfUrl": "http://x/p1.pdf",
        "views": 4,
        "category": { "id": 1, "name": "Prova" }
    });
    if group_by == "teachers" {
        return Json(json!({ "tests": [{
            "id": 42,
            "teacher": { "id": 3, "name": "Ada" },
            "discipline": { "id": 7, "name": "Calculus", "term": { "id": 1, "number": 1 } },
            "tests": [test]
        }]}));
    }
    Json(json!({ "tests": [{
        "id": 1,
        "number": 1,
        "disciplines": [{
            "id": 7,
            "name": "Calculus",
            "termId": 1,
            "teacherDisciplines": [{
                "id": 42,
                "teacher": { "id": 3, "name": "Ada" },
                "tests": [test]
            }]
        }]
    }]}))
}

async fn teachers_for_discipline(State(state): State<StubState>, Path(id): Path<i64>) -> Json<Value> {
    state.log.lock().await.push(format!("GET /teachers/disciplines/{id}"));
    Json(json!({ "teachers": [{ "id": 42, "teacher": { "id": 3, "name": "Ada" } }] }))
}

async fn new_test(State(state): State<StubState>, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    state.log.lock().await.push(format!("POST /test {}", auth(&headers)));
    state.bodies.lock().await.push(body);
    StatusCode::CREATED
}

async fn update_view(State(state): State<StubState>, headers: HeaderMap, Path(id): Path<i64>) -> StatusCode {
    state
        .log
        .lock()
        .await
        .push(format!("PUT /tests/{id}/update-view {}", auth(&headers)));
    StatusCode::OK
}

async fn sign_in(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "secret" {
        return Json(json!({ "token": "token-1" })).into_response();
    }
    (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
}

async fn spawn_stub() -> Result<(ReqwestCatalog, StubState)> {
    let state = StubState::default();
    let app = Router::new()
        .route("/categories", get(categories))
        .route("/disciplines", get(disciplines))
        .route("/tests", get(tests_grouped))
        .route("/teachers/disciplines/:id", get(teachers_for_discipline))
        .route("/test", post(new_test))
        .route("/tests/:id/update-view", put(update_view))
        .route("/sign-in", post(sign_in))
        .with_state(state.clone());

    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let addr = listener.local_addr()?;
    let server = axum::Server::from_tcp(listener)?.serve(app.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });

    let client = ReqwestCatalog::new(&format!("http://{addr}"), Duration::from_secs(5))?;
    Ok((client, state))
}

fn token() -> SessionToken {
    SessionToken::new("token-1")
}

#[tokio::test]
async fn fetches_categories_with_bearer_token() -> Result<()> {
    let (client, state) = spawn_stub().await?;

    let categories = client.fetch_categories(&token()).await?;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Prova");
    assert_eq!(state.log.lock().await.clone(), vec!["GET /categories Bearer token-1"]);
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_an_api_error() -> Result<()> {
    let (client, _state) = spawn_stub().await?;

    let err = client.fetch_categories(&SessionToken::new("wrong")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Api { status: 401, .. }));

    let err = client.fetch_discipline_references(&token()).await.unwrap_err();
    match err {
        CatalogError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn decodes_both_grouping_shapes() -> Result<()> {
    let (client, state) = spawn_stub().await?;

    let terms = client.fetch_tests_grouped_by_discipline(&token()).await?;
    let pairing = &terms[0].disciplines[0].teacher_disciplines[0];
    assert_eq!(pairing.instructor.name, "Ada");
    assert_eq!(pairing.tests[0].document_url, "http://x/p1.pdf");
    assert_eq!(pairing.tests[0].view_count, 4);
    assert!(pairing.discipline.is_none());

    let by_instructor = client.fetch_tests_grouped_by_instructor(&token()).await?;
    assert_eq!(by_instructor[0].discipline_name(), "Calculus");

    assert_eq!(
        state.log.lock().await.clone(),
        vec!["GET /tests?groupBy=disciplines", "GET /tests?groupBy=teachers"]
    );
    Ok(())
}

#[tokio::test]
async fn instructor_options_carry_pairing_id() -> Result<()> {
    let (client, _state) = spawn_stub().await?;

    let options = client.fetch_instructors_for_discipline(&token(), 7).await?;
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].teacher_discipline_id, 42);
    assert_eq!(options[0].instructor.name, "Ada");
    Ok(())
}

#[tokio::test]
async fn submits_payload_with_service_field_names() -> Result<()> {
    let (client, state) = spawn_stub().await?;
    let payload = NewTest {
        name: "P1".to_string(),
        document_url: "http://x/p1.pdf".to_string(),
        category_id: 1,
        teacher_discipline_id: 42,
    };

    client.submit_test(&token(), &payload).await?;
    assert_eq!(
        state.bodies.lock().await.clone(),
        vec![json!({
            "name": "P1",
            "pdfUrl": "http://x/p1.pdf",
            "categoryId": 1,
            "teacherDisciplineId": 42
        })]
    );
    assert_eq!(state.log.lock().await.clone(), vec!["POST /test Bearer token-1"]);
    Ok(())
}

#[tokio::test]
async fn view_notification_works_without_token() -> Result<()> {
    let (client, state) = spawn_stub().await?;

    client.notify_test_viewed(None, 10).await?;
    client.notify_test_viewed(Some(&token()), 11).await?;
    assert_eq!(
        state.log.lock().await.clone(),
        vec![
            "PUT /tests/10/update-view -",
            "PUT /tests/11/update-view Bearer token-1"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn sign_in_returns_session_token() -> Result<()> {
    let (client, _state) = spawn_stub().await?;

    let session = client
        .sign_in(&Credentials {
            email: "a@b.c".to_string(),
            password: "secret".to_string(),
        })
        .await?;
    assert_eq!(session.as_str(), "token-1");

    let err = client
        .sign_in(&Credentials {
            email: "a@b.c".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Api { status: 401, .. }));
    Ok(())
}
