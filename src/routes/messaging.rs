use actix_web::web;

use crate::handlers::{channels, direct_messages, media};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/channels")
            .route("/{id}", web::get().to(channels::get_channel))
            .route("/{id}/messages", web::get().to(channels::get_messages))
            .route("/{id}/messages", web::post().to(channels::send_message))
            .route(
                "/{id}/messages/stream",
                web::get().to(channels::stream_messages),
            ),
    )
    .service(
        web::scope("/direct-messages")
            .route("", web::get().to(direct_messages::get_partners))
            .route("/{user_id}", web::post().to(direct_messages::add_partner))
            .route(
                "/{user_id}/messages",
                web::get().to(direct_messages::get_messages),
            )
            .route(
                "/{user_id}/messages",
                web::post().to(direct_messages::send_message),
            )
            .route(
                "/{user_id}/messages/stream",
                web::get().to(direct_messages::stream_messages),
            ),
    )
    .service(
        web::scope("/media")
            .route("", web::post().to(media::upload))
            .route("/{path:.*}", web::get().to(media::download)),
    );
}
