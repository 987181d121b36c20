use super::*;
use crate::session::SessionStore;
use crate::test_helpers::{api_for, sample_user, spawn_backend};
use axum::Json;
use axum::Router;
use axum::extract::Multipart;
use axum::http::HeaderMap;
use axum::routing::post;
use serde_json::{Value, json};

async fn upload_handler(headers: HeaderMap, mut multipart: Multipart) -> Json<Value> {
    let mut file_name = None;
    let mut size = 0;
    let mut context = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().map(str::to_owned).as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_owned);
                size = field.bytes().await.unwrap().len();
            }
            Some("context") => context = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none");
    Json(json!({
        "imageUrl": format!(
            "https://img.test/{}/{}?size={size}&auth={auth}",
            context.unwrap_or_default(),
            file_name.unwrap_or_default()
        )
    }))
}

#[tokio::test]
async fn upload_sends_file_and_context_as_multipart() {
    let base = spawn_backend(Router::new().route("/upload/image", post(upload_handler))).await;
    let store = SessionStore::in_memory();
    store.login(sample_user(1, "kim"), "tok").unwrap();
    let api = api_for(&base, &store);

    let uploaded = api
        .upload_image("avatar.png", vec![0_u8; 256], UPLOAD_CONTEXT_PROFILE)
        .await
        .unwrap();
    assert_eq!(uploaded.image_url, "https://img.test/profile/avatar.png?size=256&auth=Bearer tok");
}

#[tokio::test]
async fn upload_without_session_is_unauthenticated() {
    let base = spawn_backend(Router::new().route("/upload/image", post(upload_handler))).await;
    let api = api_for(&base, &SessionStore::in_memory());

    let uploaded = api
        .upload_image("set.jpg", b"jpeg".to_vec(), UPLOAD_CONTEXT_POST)
        .await
        .unwrap();
    assert_eq!(uploaded.image_url, "https://img.test/post/set.jpg?size=4&auth=none");
}
