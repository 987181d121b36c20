use crate::api::{ExerciseDetail, PageRequest, ROUTINE_SEARCH_PAGE_SIZE, RoutineInput};
use crate::session::SessionStore;
use crate::test_helpers::{api_for, spawn_backend};
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, put};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<Value>>>;

fn backend(log: &Log) -> Router {
    let queries = log.clone();
    let updates = log.clone();
    Router::new()
        .route(
            "/routine",
            get(move |Query(q): Query<HashMap<String, String>>| async move {
                queries.lock().unwrap().push(json!(q));
                Json(json!({
                    "content": [
                        { "id": 1, "routineName": "push", "details": [{ "name": "bench", "weight": 80, "reps": 8, "sets": 3 }] },
                        { "id": 2, "name": "pull" }
                    ],
                    "totalElements": 2,
                    "totalPages": 1,
                    "number": 0,
                    "size": q["size"].parse::<u32>().unwrap()
                }))
            }),
        )
        .route(
            "/routine/{id}",
            put(move |Path(id): Path<i64>, Json(body): Json<Value>| async move {
                updates.lock().unwrap().push(json!({ "id": id, "body": body }));
                StatusCode::OK
            }),
        )
}

fn take(log: &Log) -> Vec<Value> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[tokio::test]
async fn routines_lists_a_page() {
    let log = Log::default();
    let base = spawn_backend(backend(&log)).await;
    let api = api_for(&base, &SessionStore::in_memory());

    let page = api.routines(PageRequest::new(0, 10)).await.unwrap();
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[0].details[0].weight, Some(80.0));
    assert_eq!(page.content[1].display_name(), "pull");
    assert_eq!(take(&log), vec![json!({ "page": "0", "size": "10" })]);
}

#[tokio::test]
async fn routine_scans_a_large_page_for_the_id() {
    let log = Log::default();
    let base = spawn_backend(backend(&log)).await;
    let api = api_for(&base, &SessionStore::in_memory());

    let found = api.routine(2).await.unwrap().expect("routine 2 exists");
    assert_eq!(found.display_name(), "pull");
    assert_eq!(
        take(&log),
        vec![json!({ "page": "0", "size": ROUTINE_SEARCH_PAGE_SIZE.to_string() })]
    );

    assert!(api.routine(77).await.unwrap().is_none());
}

#[tokio::test]
async fn update_routine_sends_cleaned_details() {
    let log = Log::default();
    let base = spawn_backend(backend(&log)).await;
    let api = api_for(&base, &SessionStore::in_memory());

    let input = RoutineInput::new(
        "push v2",
        vec![
            ExerciseDetail { name: "bench".into(), weight: Some(85.0), reps: Some(6), sets: Some(4), duration: None },
            ExerciseDetail::named(""),
            ExerciseDetail { name: " dips ".into(), weight: None, reps: Some(12), sets: Some(3), duration: None },
        ],
    );
    api.update_routine(1, &input).await.unwrap();

    assert_eq!(
        take(&log),
        vec![json!({
            "id": 1,
            "body": {
                "routineName": "push v2",
                "details": [
                    { "name": "bench", "weight": 85.0, "reps": 6, "sets": 4 },
                    { "name": "dips", "weight": null, "reps": 12, "sets": 3 }
                ]
            }
        })]
    );
}
