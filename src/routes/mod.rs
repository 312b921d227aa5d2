use actix_web::web;

use crate::AppState;
use crate::middleware::RequestIdExt;

pub mod auth;
pub mod meetings;
pub mod messaging;
pub mod organizations;
pub mod workplace;

/// Mounts every API route under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/api/v1")
            .configure(|cfg| auth::configure(cfg, state))
            .configure(organizations::configure)
            .configure(messaging::configure)
            .configure(workplace::configure)
            .configure(meetings::configure),
    );
}

/// JSON extractor settings: the body limit fits base64 media, and
/// malformed bodies answer with the usual `ApiResponse` envelope.
pub fn json_config(state: &AppState) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(state.config.json_payload_limit())
        .error_handler(|err, req| {
            let message = err.to_string();
            log::debug!(
                "Rejected JSON body [{}]: {}",
                req.correlation_id().unwrap_or_default(),
                message
            );
            actix_web::error::InternalError::from_response(
                err,
                actix_web::HttpResponse::BadRequest()
                    .json(crate::handlers::shared::ApiResponse::<()>::error(&message)),
            )
            .into()
        })
}
