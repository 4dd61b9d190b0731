mod common;

use actix_web::{test, web, App};
use common::{memory_forum, profile, LONG_ANSWER};
use rf_api::{configure_routes, AppState, USER_HEADER};
use rf_core::{Role, UserId};
use serde_json::{json, Value};

macro_rules! forum_app {
    ($service:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { service: $service }))
                .configure(configure_routes),
        )
        .await
    };
}

fn question() -> Value {
    json!({
        "title": "Why does my future not implement Send?",
        "text": "It holds a Rc across an await point.",
        "tags": ["Rust", "async"]
    })
}

#[actix_web::test]
async fn create_requires_an_identity() {
    let app = forum_app!(memory_forum().service);

    let req = test::TestRequest::post().uri("/api/questions").set_json(question()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let req = test::TestRequest::post()
        .uri("/api/questions")
        .insert_header((USER_HEADER, "not-a-uuid"))
        .set_json(question())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_web::test]
async fn invalid_bodies_are_rejected_before_the_core() {
    let app = forum_app!(memory_forum().service);
    let user = UserId::new().to_string();

    let req = test::TestRequest::post()
        .uri("/api/discussions")
        .insert_header((USER_HEADER, user.as_str()))
        .set_json(json!({ "title": " ", "text": "", "tags": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "text", "tags"]);
}

#[actix_web::test]
async fn missing_fields_are_validation_errors() {
    let app = forum_app!(memory_forum().service);
    let user = UserId::new().to_string();

    let req = test::TestRequest::post()
        .uri("/api/questions")
        .insert_header((USER_HEADER, user.as_str()))
        .set_json(json!({ "text": "body", "tags": ["rust"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"], json!([{ "field": "title", "message": "cannot be blank" }]));

    let req = test::TestRequest::post()
        .uri("/api/questions")
        .insert_header((USER_HEADER, user.as_str()))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().starts_with("malformed request body"));
}

#[actix_web::test]
async fn question_lifecycle_over_http() {
    let forum = memory_forum();
    let alice = profile("alice", Role::User);
    let bob = profile("bob", Role::User);
    forum.users.upsert(alice.clone());
    forum.users.upsert(bob.clone());
    let app = forum_app!(forum.service);
    let (a, b) = (alice.id.to_string(), bob.id.to_string());

    let req = test::TestRequest::post()
        .uri("/api/questions")
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(question())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["author"]["username"], "alice");
    assert_eq!(created["tags"], json!(["async", "rust"]));
    assert!(created.get("version").is_none());

    for (user, action) in [(&a, "upvote"), (&b, "upvote"), (&a, "downvote")] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/questions/{id}/{action}"))
            .insert_header((USER_HEADER, user.as_str()))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
    let req = test::TestRequest::post()
        .uri(&format!("/api/questions/{id}/unvote"))
        .insert_header((USER_HEADER, a.as_str()))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["score"], 1);
    assert_eq!(view["votes"].as_array().unwrap().len(), 1);

    // answers shorter than 30 characters never reach the thread
    let req = test::TestRequest::post()
        .uri(&format!("/api/questions/{id}/answers"))
        .insert_header((USER_HEADER, b.as_str()))
        .set_json(json!({ "text": "   short   " }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 422);

    let req = test::TestRequest::post()
        .uri(&format!("/api/questions/{id}/answers"))
        .insert_header((USER_HEADER, b.as_str()))
        .set_json(json!({ "text": LONG_ANSWER }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let answer = view["answers"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(view["answers"][0]["author"]["username"], "bob");
    assert!(view["answers"][0]["author"].get("role").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/questions/{id}/answers/{answer}/comments"))
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(json!({ "body": "Thanks!" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["answers"][0]["comments"][0]["body"], "Thanks!");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/questions/{id}/answers/{answer}"))
        .insert_header((USER_HEADER, b.as_str()))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["answers"], json!([]));

    let req = test::TestRequest::get().uri(&format!("/api/questions/{id}")).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["views"], 1);

    let req = test::TestRequest::get().uri("/api/questions/user/alice").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/questions/{id}"))
        .insert_header((USER_HEADER, a.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 204);

    let req = test::TestRequest::get().uri(&format!("/api/questions/{id}")).to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);
}

#[actix_web::test]
async fn removing_comments_over_http() {
    let forum = memory_forum();
    let alice = profile("alice", Role::User);
    forum.users.upsert(alice.clone());
    let app = forum_app!(forum.service);
    let a = alice.id.to_string();

    let req = test::TestRequest::post()
        .uri("/api/discussions")
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(question())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/discussions/{id}/comments"))
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(json!({ "body": "first" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let comment = view["comments"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/discussions/{id}/answers"))
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(json!({ "text": LONG_ANSWER }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let answer = view["answers"][0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/discussions/{id}/answers/{answer}/comments"))
        .insert_header((USER_HEADER, a.as_str()))
        .set_json(json!({ "body": "nested" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let nested = view["answers"][0]["comments"][0]["id"].as_str().unwrap().to_string();

    let top_uri = format!("/api/discussions/{id}/comments/{comment}");
    let nested_uri = format!("/api/discussions/{id}/answers/{answer}/comments/{nested}");

    let req = test::TestRequest::delete().uri(&top_uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 401);

    let req = test::TestRequest::delete()
        .uri(&top_uri)
        .insert_header((USER_HEADER, a.as_str()))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["comments"], json!([]));
    assert_eq!(view["author"]["username"], "alice");

    let req = test::TestRequest::delete()
        .uri(&nested_uri)
        .insert_header((USER_HEADER, a.as_str()))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["answers"][0]["comments"], json!([]));
    assert_eq!(view["answers"][0]["author"]["username"], "alice");

    for uri in [&top_uri, &nested_uri] {
        let req = test::TestRequest::delete()
            .uri(uri)
            .insert_header((USER_HEADER, a.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404, "{uri}");
    }
}

#[actix_web::test]
async fn error_statuses() {
    let app = forum_app!(memory_forum().service);
    let user = UserId::new().to_string();

    let req = test::TestRequest::get().uri("/api/questions/not-an-id").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("not-an-id"));

    let missing = UserId::new().to_string();
    let req = test::TestRequest::get().uri(&format!("/api/faqs/{missing}")).to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);

    let req = test::TestRequest::get().uri("/api/polls").to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);

    let req = test::TestRequest::get().uri("/api/discussions/user/nobody").to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);

    let req = test::TestRequest::get().uri("/api/discussions?author=bad").to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);

    let req = test::TestRequest::post()
        .uri(&format!("/api/faqs/{missing}/comments"))
        .insert_header((USER_HEADER, user.as_str()))
        .set_json(json!({ "body": "hello" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 404);
}

#[actix_web::test]
async fn listing_filters_by_tag_and_pages() {
    let app = forum_app!(memory_forum().service);
    let user = UserId::new().to_string();

    for (title, tag) in [("one", "tokio"), ("two", "serde"), ("three", "tokio")] {
        let req = test::TestRequest::post()
            .uri("/api/faqs")
            .insert_header((USER_HEADER, user.as_str()))
            .set_json(json!({ "title": title, "text": "body", "tags": [tag], "category": "libs" }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["category"], "libs");
    }

    let req = test::TestRequest::get().uri("/api/faqs?tags=Tokio,unused&limit=1").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"][0]["title"], "three");

    let req = test::TestRequest::get().uri("/api/faqs?page=2&limit=2").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["title"], "one");

    // kinds do not see each other's threads
    let req = test::TestRequest::get().uri("/api/questions").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 0);
}
