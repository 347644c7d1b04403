use axum::{
    middleware,
    routing::get,
    Router,
};

use crate::auth;
use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/types", get(handlers::list_types))
        .route("/datasets", get(handlers::list_datasets))
        .route("/type/{type_name}/datasets", get(handlers::datasets_by_type))
        .route(
            "/type/{type_name}/dataset_ids",
            get(handlers::ids_by_type).post(handlers::ids_by_type_post),
        )
        .route(
            "/type/{type_name}/dataset/{dataset_name}/{ret_fields}",
            get(handlers::fields_by_type_dataset).post(handlers::fields_by_type_dataset_post),
        )
        .route("/dataset/{dataset_name}/types", get(handlers::types_by_dataset))
        .route(
            "/dataset/{dataset_name}/dataset_ids",
            get(handlers::ids_by_dataset).post(handlers::ids_by_dataset_post),
        )
        .route("/dataset/{dataset_name}", get(handlers::dataset_by_id))
        .route("/overlaps/{dataset_id}/{ret_fields}", get(handlers::overlaps_by_id))
        .route(
            "/overlaps/{dataset_id}/type/{type_name}/dataset/{dataset_name}/{ret_fields}",
            get(handlers::overlaps_by_id_type_dataset),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", catalog)
        .with_state(state)
}
