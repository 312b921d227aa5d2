use actix_web::web;

use crate::handlers::{activity, attendance, documents, events, leave, projects, todos};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("", web::get().to(attendance::get_history))
            .route("/status", web::get().to(attendance::get_status))
            .route("/clock-in", web::post().to(attendance::clock_in))
            .route("/clock-out", web::post().to(attendance::clock_out)),
    )
    .service(
        web::scope("/leave-requests")
            .route("", web::post().to(leave::create_leave_request))
            .route("", web::get().to(leave::get_leave_requests)),
    )
    .service(
        web::scope("/todos")
            .route("", web::post().to(todos::create_todo))
            .route("", web::get().to(todos::get_todos))
            .route("/{id}", web::delete().to(todos::delete_todo)),
    )
    .service(
        web::scope("/projects")
            .route("", web::get().to(projects::get_my_projects))
            .route(
                "/tasks/{id}/status",
                web::put().to(projects::update_task_status),
            )
            .route("/{id}/tasks", web::get().to(projects::get_project_tasks)),
    )
    .service(
        web::scope("/documents")
            .route("", web::post().to(documents::upload_document))
            .route("", web::get().to(documents::get_documents)),
    )
    .service(
        web::scope("/events")
            .route("", web::post().to(events::create_event))
            .route("", web::get().to(events::get_events)),
    )
    .route("/activity", web::get().to(activity::get_activity));
}
