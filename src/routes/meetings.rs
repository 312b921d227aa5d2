use actix_web::web;

use crate::handlers::{assistant, meetings};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/meetings")
            .route("", web::post().to(meetings::create_meeting))
            .route("/{call_id}/join", web::post().to(meetings::join_meeting))
            .route(
                "/{call_id}/summary",
                web::post().to(meetings::summarize_meeting),
            ),
    )
    .route(
        "/transcriptions",
        web::get().to(meetings::get_transcriptions),
    )
    .route("/assistant/chat", web::post().to(assistant::chat))
    .route("/news", web::get().to(assistant::news));
}
