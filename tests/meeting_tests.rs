use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[macro_use]
mod common;

#[actix_web::test]
async fn test_create_and_join_meeting() {
    let ctx = common::TestContext::new();
    let host = ctx.user().await;
    let guest = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/meetings")
        .insert_header(host.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let call_id = body["data"]["callId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["appId"], 1234);
    assert_eq!(body["data"]["maxDurationSeconds"], 600);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/meetings/{}/join", call_id))
        .insert_header(guest.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["callId"], call_id.as_str());
    assert_eq!(body["data"]["userId"], guest.id().to_string());

    let token = body["data"]["token"].as_str().unwrap();
    let claims = ctx.state.video.verify(token).unwrap();
    assert_eq!(claims.call_id, call_id);
    assert_eq!(claims.sub, guest.id());

    let req = test::TestRequest::post()
        .uri("/api/v1/meetings/not%20valid!/join")
        .insert_header(guest.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_meeting_summary_and_transcriptions() {
    let ctx = common::TestContext::new();
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/meetings/weekly-sync/summary")
        .insert_header(user.auth())
        .set_json(json!({ "contentType": "audio/mp4", "data": "AAAAGGZ0eXA=" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["meetingId"], "weekly-sync");
    assert_eq!(body["data"]["summary"], "8 bytes of audio/mp4");

    let req = test::TestRequest::post()
        .uri("/api/v1/meetings/weekly-sync/summary")
        .insert_header(user.auth())
        .set_json(json!({ "data": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/meetings/weekly-sync/summary")
        .insert_header(user.auth())
        .set_json(json!({ "contentType": "audio mp4", "data": "AAAAGGZ0eXA=" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Bad request: Unsupported recording type: audio mp4");

    let req = test::TestRequest::get()
        .uri("/api/v1/transcriptions")
        .insert_header(user.auth())
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["userId"], user.id().to_string());
}

#[actix_web::test]
async fn test_assistant_chat() {
    let ctx = common::TestContext::new();
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/assistant/chat")
        .insert_header(user.auth())
        .set_json(json!({ "message": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Bad request: Message cannot be empty.");

    let req = test::TestRequest::post()
        .uri("/api/v1/assistant/chat")
        .insert_header(user.auth())
        .set_json(json!({ "message": " hello " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["reply"], "You said: hello");

    let req = test::TestRequest::post()
        .uri("/api/v1/assistant/chat")
        .insert_header(user.auth())
        .set_json(json!({ "message": "fail" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_news_headlines() {
    let ctx = common::TestContext::new();
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/news")
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["title"], "Headline for us");
    assert_eq!(body["data"][0]["source"]["name"], "Daily Test");

    let req = test::TestRequest::get()
        .uri("/api/v1/news?country=usa")
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/news?country=zz")
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
