#![forbid(unsafe_code)]

mod support;
use support::*;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use ng_server::auth::Claims;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use tower::ServiceExt;

/// Folds a sync payload's note updates into a client-side view.
fn apply_notes(view: &mut HashMap<i64, String>, payload: &Value) {
    for row in payload["updates"]["notes"].as_array().unwrap() {
        let content = row["content"].as_str().unwrap().to_string();
        view.insert(row["id"].as_i64().unwrap(), content);
    }
}

#[tokio::test]
async fn sync_without_token_is_unauthorized() {
    let app = TestApp::start();
    let request = Request::builder()
        .uri("/api/sync")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.raw(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_unauthorized() {
    let app = TestApp::start();
    let (user, _) = app.user("ada").await;

    let expired = encode(
        &Header::default(),
        &Claims {
            user_id: user.get(),
            username: "ada".to_string(),
            exp: jsonwebtoken::get_current_timestamp() - 3600,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    let (status, _) = app.get("/api/sync", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = encode(
        &Header::default(),
        &Claims {
            user_id: user.get(),
            username: "ada".to_string(),
            exp: jsonwebtoken::get_current_timestamp() + 3600,
        },
        &EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();
    let (status, _) = app.get("/api/sync", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_since_is_a_bare_bad_request() {
    let app = TestApp::start();
    let (_, token) = app.user("ada").await;

    for since in ["abc", "-1", "1.5"] {
        let request = Request::builder()
            .uri(format!("/api/sync?since={since}"))
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.raw(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "since={since}");
        assert!(body.is_empty(), "since={since} must not carry a payload");
    }
}

#[tokio::test]
async fn token_for_a_vanished_user_is_unauthorized() {
    let app = TestApp::start();
    let token = app
        .state
        .tokens()
        .issue(ng_core::ids::UserId::new(999), "ghost")
        .unwrap();
    let (status, _) = app.get("/api/sync", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn note_lifecycle_round_trips_through_sync() {
    let app = TestApp::start();
    let (_, token) = app.user("ada").await;

    let (status, initial) = app.get("/api/sync", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        initial["updates"],
        json!({
            "graphs": [], "nodes": [], "edges": [], "notes": [],
            "checklists": [], "checklistItems": [], "images": []
        })
    );
    assert_eq!(initial["deletions"], json!([]));
    let t0 = initial["serverTimestamp"].as_i64().unwrap();

    let (status, note) = app
        .post("/api/notes", &token, json!({"title": "hello", "content": "world"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = note["id"].clone();

    let (_, after_create) = app.get(&format!("/api/sync?since={t0}"), &token).await;
    assert_eq!(ids(&after_create["updates"]["notes"]), vec![note_id.clone()]);
    assert_eq!(after_create["updates"]["notes"][0]["content"], "world");
    assert_eq!(after_create["deletions"], json!([]));
    let t1 = after_create["serverTimestamp"].as_i64().unwrap();
    assert!(t1 >= t0);

    assert_eq!(
        app.delete(&format!("/api/notes/{note_id}"), &token).await,
        StatusCode::NO_CONTENT
    );

    let (_, after_delete) = app.get(&format!("/api/sync?since={t1}"), &token).await;
    assert_eq!(after_delete["updates"]["notes"], json!([]));
    assert_eq!(
        after_delete["deletions"],
        json!([{"id": note_id, "type": "notes"}])
    );

    // The tombstone is invisible to normal reads.
    let (status, _) = app.get(&format!("/api/notes/{note_id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sync_only_reports_the_callers_rows() {
    let app = TestApp::start();
    let (_, ada) = app.user("ada").await;
    let (_, bob) = app.user("bob").await;

    let (_, graph) = app.post("/api/graphs", &ada, json!({"title": "map"})).await;
    let graph_id = graph["id"].as_i64().unwrap();
    let (status, _) = app
        .post(
            &format!("/api/graphs/{graph_id}/nodes"),
            &ada,
            json!({"id": "n-1", "position": {"x": 0.0, "y": 0.0}, "data": {"label": "root"}}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, for_ada) = app.get("/api/sync", &ada).await;
    assert_eq!(ids(&for_ada["updates"]["graphs"]), vec![json!(graph_id)]);
    assert_eq!(ids(&for_ada["updates"]["nodes"]), vec![json!("n-1")]);

    let (_, for_bob) = app.get("/api/sync", &bob).await;
    assert_eq!(for_bob["updates"]["graphs"], json!([]));
    assert_eq!(for_bob["updates"]["nodes"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_are_never_skipped_by_chained_syncs() {
    const WRITERS: usize = 8;
    const WRITES: usize = 60;

    let app = TestApp::start();
    let (_, token) = app.user("ada").await;

    let mut note_ids = Vec::with_capacity(WRITERS);
    for writer in 0..WRITERS {
        let (status, note) = app
            .post("/api/notes", &token, json!({"content": format!("n{writer}-start")}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        note_ids.push(note["id"].as_i64().unwrap());
    }

    let mut view = HashMap::new();
    let (_, initial) = app.get("/api/sync", &token).await;
    apply_notes(&mut view, &initial);
    let mut since = initial["serverTimestamp"].as_i64().unwrap();

    let writers: Vec<_> = note_ids
        .iter()
        .copied()
        .enumerate()
        .map(|(writer, note_id)| {
            let router = app.app.clone();
            let token = token.clone();
            tokio::spawn(async move {
                for write in 0..WRITES {
                    let body = json!({"content": format!("n{writer}-{write}")});
                    let request = Request::builder()
                        .method(Method::PUT)
                        .uri(format!("/api/notes/{note_id}"))
                        .header("authorization", format!("Bearer {token}"))
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap();
                    let response = router.clone().oneshot(request).await.unwrap();
                    assert_eq!(response.status(), StatusCode::OK);
                }
            })
        })
        .collect();

    // Chain cutoffs the way a client does while the writers run.
    let mut rounds = 0;
    loop {
        let writers_done = writers.iter().all(|writer| writer.is_finished());
        let (status, payload) = app.get(&format!("/api/sync?since={since}"), &token).await;
        assert_eq!(status, StatusCode::OK);
        apply_notes(&mut view, &payload);
        since = payload["serverTimestamp"].as_i64().unwrap();
        rounds += 1;
        if writers_done {
            break;
        }
    }
    for writer in writers {
        writer.await.unwrap();
    }
    assert!(rounds > 1);

    let expected: HashMap<i64, String> = note_ids
        .iter()
        .enumerate()
        .map(|(writer, id)| (*id, format!("n{writer}-{}", WRITES - 1)))
        .collect();
    assert_eq!(view, expected);

    let (status, listed) = app.get("/api/notes", &token).await;
    assert_eq!(status, StatusCode::OK);
    let mut server_view = HashMap::new();
    apply_notes(&mut server_view, &json!({"updates": {"notes": listed}}));
    assert_eq!(view, server_view);
}

#[tokio::test]
async fn write_right_after_a_sync_lands_past_its_timestamp() {
    let app = TestApp::start();
    let (_, token) = app.user("ada").await;

    let (_, initial) = app.get("/api/sync", &token).await;
    let t0 = initial["serverTimestamp"].as_i64().unwrap();

    let (status, note) = app
        .post("/api/notes", &token, json!({"content": "immediately"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(note["updated_at"].as_i64().unwrap() > t0);

    let (_, next) = app.get(&format!("/api/sync?since={t0}"), &token).await;
    assert_eq!(ids(&next["updates"]["notes"]), vec![note["id"].clone()]);
}
