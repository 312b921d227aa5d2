use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[macro_use]
mod common;

fn login_request(peer: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(peer.parse().unwrap())
        .set_json(json!({ "email": "nobody@example.com", "password": "wrong-password" }))
}

#[actix_rt::test]
async fn test_auth_endpoints_are_rate_limited_per_address() {
    let mut config = officecomms::Config::test_config();
    config.rate_limit_requests = 3;
    let ctx = common::TestContext::with_config(config);
    let app = test_app!(ctx.state);

    for _ in 0..3 {
        let resp = test::call_service(&app, login_request("10.0.0.1:4000").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = test::call_service(&app, login_request("10.0.0.1:4001").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    // Other clients keep their own budget.
    let resp = test::call_service(&app, login_request("10.0.0.2:4000").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_profile_routes_are_not_rate_limited() {
    let mut config = officecomms::Config::test_config();
    config.rate_limit_requests = 1;
    let ctx = common::TestContext::with_config(config);
    let user = ctx.user().await;
    let app = test_app!(ctx.state);

    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .peer_addr("10.0.0.3:4000".parse().unwrap())
            .insert_header(user.auth())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
