use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::alert_rules;
use crate::state::AppState;

/// Routes mounted at `/alert-rules`.
///
/// ```text
/// GET    /                    -> list_rules
/// POST   /                    -> create_rule
/// GET    /active              -> list_active
/// GET    /summary             -> summary
/// GET    /{id}                -> get_rule
/// PUT    /{id}                -> update_rule
/// DELETE /{id}                -> delete_rule
/// PATCH  /{id}/activate       -> activate
/// PATCH  /{id}/deactivate     -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(alert_rules::list_rules).post(alert_rules::create_rule),
        )
        .route("/active", get(alert_rules::list_active))
        .route("/summary", get(alert_rules::summary))
        .route(
            "/{id}",
            get(alert_rules::get_rule)
                .put(alert_rules::update_rule)
                .delete(alert_rules::delete_rule),
        )
        .route("/{id}/activate", patch(alert_rules::activate))
        .route("/{id}/deactivate", patch(alert_rules::deactivate))
}
