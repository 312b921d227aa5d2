use actix_web::web;

use crate::handlers::{channels, organizations, projects};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/organizations")
            .route("", web::post().to(organizations::create_organization))
            .route("", web::get().to(organizations::get_my_organizations))
            .route("/{name}", web::get().to(organizations::get_organization))
            .route("/{name}/members", web::get().to(organizations::get_members))
            .route(
                "/{name}/invitations",
                web::post().to(organizations::create_invitation),
            )
            .route(
                "/{name}/membership",
                web::delete().to(organizations::leave_organization),
            )
            .route("/{name}/channels", web::post().to(channels::create_channel))
            .route("/{name}/channels", web::get().to(channels::get_channels))
            .route("/{name}/projects", web::post().to(projects::create_project)),
    )
    .service(
        web::scope("/invitations")
            .route("/accept", web::post().to(organizations::accept_invitation))
            .route("/{link_id}", web::get().to(organizations::preview_invitation)),
    );
}
