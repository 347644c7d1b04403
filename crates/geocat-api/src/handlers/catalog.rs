use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use geocat_query::builder::{SearchFilter, DATASET_FIELD, TYPE_FIELD};
use geocat_query::polygon::{parse_polygon, Polygon};
use geocat_query::PageWindow;

use crate::dto::{
    DatasetIdsEnvelope, DatasetsEnvelope, ResultEnvelope, ResultsEnvelope, TypesEnvelope,
};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page_size: Option<usize>,
    pub offset: Option<usize>,
}

/// Query-string parameters for filtered hit-list routes. The polygon
/// arrives as a JSON-encoded string.
#[derive(Debug, Deserialize)]
pub struct FilteredPageParams {
    pub page_size: Option<usize>,
    pub offset: Option<usize>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub polygon: Option<String>,
}

/// JSON-body parameters for the POST variants; the polygon is a native
/// coordinate array.
#[derive(Debug, Deserialize)]
pub struct FilteredPageBody {
    pub page_size: Option<usize>,
    pub offset: Option<usize>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub polygon: Option<Value>,
}

pub async fn list_types(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<TypesEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let page = state.catalog.query_types(&state.index, window).await?;
    Ok(Json(TypesEnvelope::new(page, window)))
}

pub async fn list_datasets(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<DatasetsEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let page = state.catalog.query_datasets(&state.index, window).await?;
    Ok(Json(DatasetsEnvelope::new(page, window)))
}

pub async fn datasets_by_type(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<DatasetsEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let page = state.catalog.query_datasets_by_type(&state.index, &type_name, window).await?;
    Ok(Json(DatasetsEnvelope::new(page, window)))
}

pub async fn types_by_dataset(
    State(state): State<AppState>,
    Path(dataset_name): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<TypesEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let page = state.catalog.query_types_by_dataset(&state.index, &dataset_name, window).await?;
    Ok(Json(TypesEnvelope::new(page, window)))
}

pub async fn ids_by_dataset(
    State(state): State<AppState>,
    Path(dataset_name): Path<String>,
    Query(params): Query<FilteredPageParams>,
) -> Result<Json<DatasetIdsEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let filter = filter_from_params(&params)?;
    let page = state
        .catalog
        .query_ids_by_dataset(&state.index, &dataset_name, window, &filter)
        .await?;
    Ok(Json(DatasetIdsEnvelope::new(page, window)))
}

pub async fn ids_by_dataset_post(
    State(state): State<AppState>,
    Path(dataset_name): Path<String>,
    Json(body): Json<FilteredPageBody>,
) -> Result<Json<DatasetIdsEnvelope>, ApiError> {
    let window = resolve_window(&state, body.page_size, body.offset)?;
    let filter = filter_from_body(body)?;
    let page = state
        .catalog
        .query_ids_by_dataset(&state.index, &dataset_name, window, &filter)
        .await?;
    Ok(Json(DatasetIdsEnvelope::new(page, window)))
}

pub async fn ids_by_type(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Query(params): Query<FilteredPageParams>,
) -> Result<Json<DatasetIdsEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let filter = filter_from_params(&params)?;
    let page =
        state.catalog.query_ids_by_type(&state.index, &type_name, window, &filter).await?;
    Ok(Json(DatasetIdsEnvelope::new(page, window)))
}

pub async fn ids_by_type_post(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Json(body): Json<FilteredPageBody>,
) -> Result<Json<DatasetIdsEnvelope>, ApiError> {
    let window = resolve_window(&state, body.page_size, body.offset)?;
    let filter = filter_from_body(body)?;
    let page =
        state.catalog.query_ids_by_type(&state.index, &type_name, window, &filter).await?;
    Ok(Json(DatasetIdsEnvelope::new(page, window)))
}

pub async fn dataset_by_id(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<ResultEnvelope>, ApiError> {
    tracing::info!(dataset_id = %dataset_id, "metadata lookup");
    let result = state.catalog.query_id(&state.index, &dataset_id).await?;
    Ok(Json(ResultEnvelope { success: true, result }))
}

pub async fn fields_by_type_dataset(
    State(state): State<AppState>,
    Path((type_name, dataset_name, ret_fields)): Path<(String, String, String)>,
    Query(params): Query<FilteredPageParams>,
) -> Result<Json<ResultsEnvelope>, ApiError> {
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let filter = filter_from_params(&params)?;
    run_fields_query(&state, &type_name, &dataset_name, &ret_fields, window, &filter).await
}

pub async fn fields_by_type_dataset_post(
    State(state): State<AppState>,
    Path((type_name, dataset_name, ret_fields)): Path<(String, String, String)>,
    Json(body): Json<FilteredPageBody>,
) -> Result<Json<ResultsEnvelope>, ApiError> {
    let window = resolve_window(&state, body.page_size, body.offset)?;
    let filter = filter_from_body(body)?;
    run_fields_query(&state, &type_name, &dataset_name, &ret_fields, window, &filter).await
}

pub async fn overlaps_by_id(
    State(state): State<AppState>,
    Path((dataset_id, ret_fields)): Path<(String, String)>,
    Query(params): Query<PageParams>,
) -> Result<Json<ResultsEnvelope>, ApiError> {
    tracing::info!(dataset_id = %dataset_id, "overlap search");
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let fields = split_fields(&ret_fields);
    let page = state
        .catalog
        .overlaps(&state.index, &dataset_id, &[], &fields, window)
        .await?;
    Ok(Json(ResultsEnvelope::new(page, window)))
}

pub async fn overlaps_by_id_type_dataset(
    State(state): State<AppState>,
    Path((dataset_id, type_name, dataset_name, ret_fields)): Path<(String, String, String, String)>,
    Query(params): Query<PageParams>,
) -> Result<Json<ResultsEnvelope>, ApiError> {
    tracing::info!(
        dataset_id = %dataset_id,
        type_name = %type_name,
        dataset_name = %dataset_name,
        "scoped overlap search"
    );
    let window = resolve_window(&state, params.page_size, params.offset)?;
    let terms = type_dataset_terms(&type_name, &dataset_name);
    let fields = split_fields(&ret_fields);
    let page = state
        .catalog
        .overlaps(&state.index, &dataset_id, &terms, &fields, window)
        .await?;
    Ok(Json(ResultsEnvelope::new(page, window)))
}

async fn run_fields_query(
    state: &AppState,
    type_name: &str,
    dataset_name: &str,
    ret_fields: &str,
    window: PageWindow,
    filter: &SearchFilter,
) -> Result<Json<ResultsEnvelope>, ApiError> {
    let terms = type_dataset_terms(type_name, dataset_name);
    let fields = split_fields(ret_fields);
    // Per-dataset indices hang off the base index name.
    let index = format!("{}_*_{}", state.index, dataset_name.to_lowercase());
    let page = state.catalog.query_fields(&index, &terms, &fields, window, filter).await?;
    Ok(Json(ResultsEnvelope::new(page, window)))
}

fn resolve_window(
    state: &AppState,
    page_size: Option<usize>,
    offset: Option<usize>,
) -> Result<PageWindow, ApiError> {
    Ok(PageWindow::resolve(page_size, offset, &state.page_limits)?)
}

fn filter_from_params(params: &FilteredPageParams) -> Result<SearchFilter, ApiError> {
    let polygon = match &params.polygon {
        Some(raw) => Some(parse_polygon(raw)?),
        None => None,
    };
    Ok(SearchFilter {
        start_time: params.start_time.clone(),
        end_time: params.end_time.clone(),
        polygon,
    })
}

fn filter_from_body(body: FilteredPageBody) -> Result<SearchFilter, ApiError> {
    let polygon = match body.polygon {
        Some(value) => Some(Polygon::from_value(value)?),
        None => None,
    };
    Ok(SearchFilter { start_time: body.start_time, end_time: body.end_time, polygon })
}

fn type_dataset_terms(type_name: &str, dataset_name: &str) -> Vec<(String, Value)> {
    vec![
        (TYPE_FIELD.to_string(), json!(type_name)),
        (DATASET_FIELD.to_string(), json!(dataset_name)),
    ]
}

fn split_fields(ret_fields: &str) -> Vec<String> {
    ret_fields
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ret_fields_split_ignores_blanks() {
        assert_eq!(
            split_fields("id, metadata.track_number,,location"),
            vec!["id", "metadata.track_number", "location"]
        );
    }

    #[test]
    fn term_filters_target_the_keyword_fields_in_order() {
        let terms = type_dataset_terms("acquisition", "acquisition-S1-IW_SLC");
        assert_eq!(terms[0].0, "dataset_type.keyword");
        assert_eq!(terms[1].0, "dataset.keyword");
    }
}
