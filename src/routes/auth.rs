use actix_web::web;

use crate::AppState;
use crate::handlers::auth;
use crate::middleware::{RateLimitConfig, RateLimitMiddleware};

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let limiter = || {
        RateLimitMiddleware::with_store(
            RateLimitConfig::from_config(&state.config),
            state.rate_limits.clone(),
        )
    };

    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/me", web::put().to(auth::update_me))
            .route("/me/avatar", web::post().to(auth::upload_avatar))
            .service(
                web::scope("")
                    .wrap(limiter())
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/forgot-password", web::post().to(auth::forgot_password))
                    .route("/reset-password", web::post().to(auth::reset_password)),
            ),
    );
}
