//! rusty-forum/crates/rf-api/src/middleware.rs Middleware
//!
//! Request logging and CORS for the forum API.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;

use crate::identity::USER_HEADER;

// Access log line per request:
// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// The UI may be served from another origin; it needs to send the identity header.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(USER_HEADER)
        .max_age(3600)
}
