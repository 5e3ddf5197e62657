//! Integration tests for the notes JSON API.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use market_integration_tests::TestApp;

#[tokio::test]
async fn test_notes_crud() {
    let app = TestApp::spawn().await;
    let client = TestApp::browser();

    let response = client.get(app.url("/api/notes")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!([]));

    let response = client
        .post(app.url("/api/notes"))
        .json(&json!({ "title": "Groceries", "content": "milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let note: Value = response.json().await.unwrap();
    assert_eq!(note, json!({ "id": 1, "title": "Groceries", "content": "milk" }));

    let response = client
        .put(app.url("/api/notes/1"))
        .json(&json!({ "title": "Groceries", "content": "milk, eggs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let note: Value = client
        .get(app.url("/api/notes/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(note["content"], "milk, eggs");

    let list: Value = client
        .get(app.url("/api/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = client.delete(app.url("/api/notes/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(app.url("/api/notes/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Note not found");
}

#[tokio::test]
async fn test_missing_notes() {
    let app = TestApp::spawn().await;
    let client = TestApp::browser();

    let response = client
        .put(app.url("/api/notes/7"))
        .json(&json!({ "title": "x", "content": "y" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.delete(app.url("/api/notes/7")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_note_ids_not_reused() {
    let app = TestApp::spawn().await;
    let client = TestApp::browser();

    for title in ["first", "second"] {
        client
            .post(app.url("/api/notes"))
            .json(&json!({ "title": title, "content": "" }))
            .send()
            .await
            .unwrap();
    }
    client.delete(app.url("/api/notes/2")).send().await.unwrap();

    let note: Value = client
        .post(app.url("/api/notes"))
        .json(&json!({ "title": "third", "content": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(note["id"], 3);
}

#[tokio::test]
async fn test_non_numeric_note_id_is_not_found() {
    let app = TestApp::spawn().await;
    let client = TestApp::browser();

    client
        .post(app.url("/api/notes"))
        .json(&json!({ "title": "kept", "content": "" }))
        .send()
        .await
        .unwrap();

    for id in ["abc", "1x", "99999999999"] {
        let response = client
            .get(app.url(&format!("/api/notes/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {id}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "message": "Note not found" }));

        let response = client
            .put(app.url(&format!("/api/notes/{id}")))
            .json(&json!({ "title": "x", "content": "y" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "PUT {id}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Note not found");

        let response = client
            .delete(app.url(&format!("/api/notes/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "DELETE {id}");
    }

    let list: Value = client
        .get(app.url("/api/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
}
