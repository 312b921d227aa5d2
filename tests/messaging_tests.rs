use std::future::poll_fn;

use actix_web::{body::MessageBody, http::StatusCode, test, web::Bytes};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[macro_use]
mod common;

/// Next chunk of a streaming response body.
async fn next_chunk<B: MessageBody>(body: &mut std::pin::Pin<Box<B>>) -> Bytes {
    poll_fn(|cx| body.as_mut().poll_next(cx))
        .await
        .and_then(|chunk| chunk.ok())
        .expect("stream chunk")
}

fn snapshot(chunk: &Bytes) -> Value {
    let text = std::str::from_utf8(chunk).expect("utf-8 event");
    let data = text
        .strip_prefix("event: snapshot\ndata: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .expect("snapshot event framing");
    serde_json::from_str(data).expect("snapshot json")
}

#[actix_web::test]
async fn test_public_and_private_channels() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    let member = ctx.user().await;
    let outsider = ctx.user().await;
    let link = ctx.organization(&owner, "Acme").await;
    ctx.join(&member, &link).await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "general", "visibility": "public" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let general: Value = test::read_body_json(resp).await;
    let general_id = general["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "leads", "visibility": "private", "members": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let leads: Value = test::read_body_json(resp).await;
    let leads_id = leads["data"]["id"].as_str().unwrap().to_string();

    // Private channel members must belong to the organization.
    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(owner.auth())
        .set_json(json!({
            "name": "secret",
            "visibility": "private",
            "members": [outsider.id()]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(member.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["general"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/organizations/Acme/channels?search=LEA")
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "leads");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/messages", leads_id))
        .insert_header(member.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}", general_id))
        .insert_header(outsider.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}", uuid::Uuid::new_v4()))
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_channel_messages_in_order() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    ctx.organization(&owner, "Acme").await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "general" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let channel: Value = test::read_body_json(resp).await;
    let uri = format!(
        "/api/v1/channels/{}/messages",
        channel["data"]["id"].as_str().unwrap()
    );

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(owner.auth())
        .set_json(json!({ "text": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    for text in ["first", "second", "third"] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(owner.auth())
            .set_json(json!({ "text": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(owner.auth())
        .set_json(json!({
            "text": "",
            "attachment": { "kind": "image", "contentType": "image/png", "data": "iVBORw0KGgo=" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["mediaType"], "image");
    assert!(
        body["data"]["mediaUrl"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8080/api/v1/media/images/")
    );

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let texts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third", ""]);
    assert_eq!(body["data"][0]["authorName"], owner.user.display_name.as_str());
}

#[actix_web::test]
async fn test_channel_stream_pushes_snapshots() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    ctx.organization(&owner, "Acme").await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Acme/channels")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "general" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let channel: Value = test::read_body_json(resp).await;
    let channel_id = channel["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/channels/{}/messages/stream", channel_id))
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let mut body = Box::pin(resp.into_body());
    let first = snapshot(&next_chunk(&mut body).await);
    assert_eq!(first, json!([]));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/channels/{}/messages", channel_id))
        .insert_header(owner.auth())
        .set_json(json!({ "text": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let second = snapshot(&next_chunk(&mut body).await);
    assert_eq!(second.as_array().unwrap().len(), 1);
    assert_eq!(second[0]["text"], "hello");
}

#[actix_web::test]
async fn test_direct_messages() {
    let ctx = common::TestContext::new();
    let alice = ctx.user().await;
    let bob = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/direct-messages/{}", alice.id()))
        .insert_header(alice.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/direct-messages/{}", uuid::Uuid::new_v4()))
        .insert_header(alice.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/direct-messages/{}/messages", bob.id()))
        .insert_header(alice.auth())
        .set_json(json!({ "text": "hi bob" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/direct-messages/{}/messages", alice.id()))
        .insert_header(bob.auth())
        .set_json(json!({ "text": "hi alice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Both sides read the same conversation.
    for (reader, partner) in [(&alice, &bob), (&bob, &alice)] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/direct-messages/{}/messages", partner.id()))
            .insert_header(reader.auth())
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        let texts: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["hi bob", "hi alice"]);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/direct-messages")
        .insert_header(alice.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], bob.id().to_string());
}

#[actix_web::test]
async fn test_media_upload_and_download() {
    let ctx = common::TestContext::new();
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/media")
        .insert_header(user.auth())
        .set_json(json!({
            "kind": "audio",
            "contentType": "audio/mpeg",
            "data": "data:audio/mpeg;base64,SUQzBAA="
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let path = body["data"]["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("audio/"), "{}", path);
    assert_eq!(body["data"]["size"], 5);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/media/{}", path))
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "audio/mpeg");
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), b"ID3\x04\x00");

    let req = test::TestRequest::get()
        .uri("/api/v1/media/audio/missing")
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/media")
        .insert_header(user.auth())
        .set_json(json!({ "kind": "image", "contentType": "image/png", "data": "%%%" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
