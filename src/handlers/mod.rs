pub mod auth;
pub mod chat;
pub mod transport;

use actix_web::web;

use crate::chat::session;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/notifications", web::get().to(auth::notifications)),
    );

    // ── Chat routes ──
    cfg.service(
        web::scope("/chat")
            .route("/rooms", web::get().to(chat::list_rooms))
            .route("/projects/{project_id}/room", web::post().to(chat::open_room))
            .route("/rooms/{id}", web::get().to(chat::room_detail))
            .route("/rooms/{id}", web::delete().to(chat::delete_room))
            .route("/rooms/{id}/messages", web::get().to(chat::list_messages))
            .route("/rooms/{id}/messages", web::post().to(chat::post_message))
            .route("/rooms/{id}/read", web::post().to(chat::mark_read))
            .route("/rooms/{id}/attachments", web::post().to(chat::post_attachments))
            .route("/rooms/{id}/status", web::post().to(chat::change_status))
            .route("/rooms/{id}/deactivate", web::post().to(chat::deactivate_room))
            .route("/rooms/{id}/milestones", web::get().to(chat::list_milestones))
            .route("/rooms/{id}/milestones", web::post().to(chat::create_milestone))
            .route("/milestones/{id}/complete", web::post().to(chat::complete_milestone))
            .route("/messages/{id}/pin", web::post().to(chat::toggle_pin))
            // WebSocket (auth via ?token= query param)
            .route("/ws/{room_id}", web::get().to(session::ws_connect)),
    );

    // ── Transport routes ──
    cfg.service(
        web::scope("/transport")
            .route("/jobs", web::get().to(transport::list_jobs))
            .route("/jobs", web::post().to(transport::create_job))
            .route("/jobs/{id}", web::get().to(transport::job_detail))
            .route("/jobs/{id}", web::delete().to(transport::delete_job))
            .route("/jobs/{id}/bids", web::post().to(transport::submit_bid))
            .route("/jobs/{id}/start", web::post().to(transport::start_job))
            .route("/jobs/{id}/complete", web::post().to(transport::complete_job))
            .route("/jobs/{id}/cancel", web::post().to(transport::cancel_job))
            .route("/bids/{id}/accept", web::post().to(transport::accept_bid))
            .route("/contracts/{id}/confirm", web::post().to(transport::confirm_contract))
            .route("/templates", web::post().to(transport::save_template)),
    );
}
