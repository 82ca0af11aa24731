//! HTTP inbound adapter exposing REST endpoints.

pub mod containers;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub(crate) mod validation;

pub use error::ApiResult;

use actix_web::web;

use self::containers::{
    change_status, container_counters, evaluate_expiration, get_container, reassign_fridge,
    register_container, reset_containers, search_containers,
};
use self::validation::{malformed_body_error, malformed_query_error};

/// Register the `/api/v1` container routes and extractor error handlers.
///
/// Fixed segments (`search`, `counters`) are registered ahead of the
/// `{code}` matcher so they are never captured as container codes.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use viandas::inbound::http::configure_api;
///
/// let _app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| malformed_body_error(&err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| malformed_query_error(&err.to_string()).into()),
    )
    .service(
        web::scope("/api/v1")
            .service(register_container)
            .service(reset_containers)
            .service(search_containers)
            .service(container_counters)
            .service(get_container)
            .service(evaluate_expiration)
            .service(change_status)
            .service(reassign_fridge),
    );
}
