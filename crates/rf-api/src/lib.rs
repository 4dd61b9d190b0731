//! # rf-api
//!
//! The web routing layer for Rusty-Forum.

pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod validation;

use actix_web::web;
use rf_core::ThreadKind;

pub use error::{ApiError, FieldError};
pub use handlers::AppState;
pub use identity::{Identity, USER_HEADER};

/// Mounts the forum API under `/api`.
///
/// Every kind gets its own scope carrying the kind as app data, so an
/// unknown kind segment falls through to the router's 404.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let mut api = web::scope("/api");
    for kind in ThreadKind::ALL {
        api = api.service(kind_scope(kind));
    }
    cfg.service(api);
}

fn kind_scope(kind: ThreadKind) -> actix_web::Scope {
    web::scope(&format!("/{}", kind.token()))
        .app_data(web::Data::new(kind))
        .app_data(json_config())
        .route("", web::get().to(handlers::list_threads))
        .route("", web::post().to(handlers::create_thread))
        .route("/user/{username}", web::get().to(handlers::list_by_username))
        .route("/{id}", web::get().to(handlers::show_thread))
        .route("/{id}", web::delete().to(handlers::delete_thread))
        .route("/{id}/upvote", web::post().to(handlers::upvote))
        .route("/{id}/downvote", web::post().to(handlers::downvote))
        .route("/{id}/unvote", web::post().to(handlers::unvote))
        .route("/{id}/comments", web::post().to(handlers::add_comment))
        .route("/{id}/comments/{comment}", web::delete().to(handlers::remove_comment))
        .route("/{id}/answers", web::post().to(handlers::add_answer))
        .route("/{id}/answers/{answer}", web::delete().to(handlers::remove_answer))
        .route("/{id}/answers/{answer}/comments", web::post().to(handlers::add_answer_comment))
        .route(
            "/{id}/answers/{answer}/comments/{comment}",
            web::delete().to(handlers::remove_answer_comment),
        )
}

/// Body extraction failures answer in the same JSON shape as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::MalformedBody(err.to_string()).into())
}
