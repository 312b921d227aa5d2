use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[macro_use]
mod common;

#[actix_web::test]
async fn test_create_and_list_organizations() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "  Acme  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["organization"]["name"], "Acme");
    let link = body["data"]["invitationLink"].as_str().unwrap();
    assert!(link.starts_with("officecomms://join/"), "{}", link);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "Acme" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations")
        .insert_header(owner.auth())
        .set_json(json!({ "name": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/organizations")
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|org| org["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acme"]);
}

#[actix_web::test]
async fn test_invitation_preview_and_accept() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    let joiner = ctx.user().await;
    let link = ctx.organization(&owner, "Globex").await;
    let link_id = link.rsplit('/').next().unwrap().to_string();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/invitations/{}", link_id))
        .insert_header(joiner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["organizationName"], "Globex");

    // Non-members cannot see the organization yet.
    let req = test::TestRequest::get()
        .uri("/api/v1/organizations/Globex")
        .insert_header(joiner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/invitations/accept")
            .insert_header(joiner.auth())
            .set_json(json!({ "link": link }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/organizations/Globex/members")
        .insert_header(joiner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let joined = ctx.reload(&joiner).await;
    assert_eq!(joined.organizations, vec!["Globex".to_string()]);
}

#[actix_web::test]
async fn test_invalid_invitation_links() {
    let ctx = common::TestContext::new();
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/v1/invitations/does-not-exist")
        .insert_header(user.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/invitations/accept")
        .insert_header(user.auth())
        .set_json(json!({ "link": "https://elsewhere.test/invite/abc" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_issue_invitation_and_leave() {
    let ctx = common::TestContext::new();
    let owner = ctx.user().await;
    let member = ctx.user().await;
    let link = ctx.organization(&owner, "Initech").await;
    ctx.join(&member, &link).await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations/Initech/invitations")
        .insert_header(member.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_ne!(body["data"]["link"].as_str().unwrap(), link);

    let req = test::TestRequest::delete()
        .uri("/api/v1/organizations/Initech/membership")
        .insert_header(member.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri("/api/v1/organizations/Initech/membership")
        .insert_header(member.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/organizations/Initech/members")
        .insert_header(owner.auth())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], owner.id().to_string());
}
