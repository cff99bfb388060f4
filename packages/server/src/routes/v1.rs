use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{migration, model};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(model::list_models, model::create_model))
        .routes(routes!(model::compute_model_paths))
        .routes(routes!(
            model::get_model,
            model::update_model,
            model::delete_model
        ))
        .routes(routes!(model::record_download))
        .routes(routes!(migration::preview))
        .routes(routes!(migration::apply))
        .routes(routes!(migration::rollback))
}
