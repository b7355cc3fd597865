//! Route definitions for script authoring.
//!
//! Mounted at `/scripts` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scripts;
use crate::state::AppState;

/// Script routes.
///
/// ```text
/// GET    /                   -> list_scripts
/// POST   /                   -> create_script
/// GET    /blank              -> blank_script
/// POST   /preview            -> preview_script
/// GET    /{id}               -> get_script
/// PUT    /{id}               -> update_script
/// DELETE /{id}               -> delete_script
/// GET    /{id}/edit          -> edit_script
/// GET    /{id}/document      -> get_script_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scripts::list_scripts).post(scripts::create_script))
        .route("/blank", get(scripts::blank_script))
        .route("/preview", post(scripts::preview_script))
        .route(
            "/{id}",
            get(scripts::get_script)
                .put(scripts::update_script)
                .delete(scripts::delete_script),
        )
        .route("/{id}/edit", get(scripts::edit_script))
        .route("/{id}/document", get(scripts::get_script_document))
}
