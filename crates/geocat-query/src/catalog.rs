//! Catalog query operations over an injected search backend.

use std::sync::Arc;

use geocat_core::error::{CatalogError, Result};
use geocat_core::models::DatasetDocument;
use geocat_search::ports::SearchBackend;
use serde_json::Value;

use crate::builder::{self, AggQuery, OverlapEnvelope, SearchFilter};
use crate::normalize::{self, Paginated};
use crate::paging::PageWindow;

/// Catalog query service. Stateless apart from the shared backend handle,
/// so it is safe to call concurrently; the backend owns connection pooling
/// and timeouts.
#[derive(Clone)]
pub struct Catalog {
    backend: Arc<dyn SearchBackend>,
}

impl Catalog {
    /// The backend handle is constructor-injected; there is no process-wide
    /// client, which keeps test doubles trivial to swap in.
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Distinct dataset types across the index.
    pub async fn query_types(&self, index: &str, window: PageWindow) -> Result<Paginated<String>> {
        self.run_aggregation(index, builder::types_query(), window).await
    }

    /// Distinct dataset (collection) names across the index.
    pub async fn query_datasets(
        &self,
        index: &str,
        window: PageWindow,
    ) -> Result<Paginated<String>> {
        self.run_aggregation(index, builder::datasets_query(), window).await
    }

    /// Dataset names carrying the given type.
    pub async fn query_datasets_by_type(
        &self,
        index: &str,
        dataset_type: &str,
        window: PageWindow,
    ) -> Result<Paginated<String>> {
        self.run_aggregation(index, builder::datasets_by_type_query(dataset_type), window).await
    }

    /// Types present within the given dataset.
    pub async fn query_types_by_dataset(
        &self,
        index: &str,
        dataset: &str,
        window: PageWindow,
    ) -> Result<Paginated<String>> {
        self.run_aggregation(index, builder::types_by_dataset_query(dataset), window).await
    }

    /// Granule IDs within a dataset, optionally restricted in time and space.
    pub async fn query_ids_by_dataset(
        &self,
        index: &str,
        dataset: &str,
        window: PageWindow,
        filter: &SearchFilter,
    ) -> Result<Paginated<String>> {
        let body = builder::ids_by_dataset_query(dataset, window, filter);
        let response = self.run_search(index, &body).await?;
        normalize::id_page(&response)
    }

    /// Granule IDs within a dataset type, optionally restricted in time and
    /// space.
    pub async fn query_ids_by_type(
        &self,
        index: &str,
        dataset_type: &str,
        window: PageWindow,
        filter: &SearchFilter,
    ) -> Result<Paginated<String>> {
        let body = builder::ids_by_type_query(dataset_type, window, filter);
        let response = self.run_search(index, &body).await?;
        normalize::id_page(&response)
    }

    /// Full metadata for one granule. Absence is a valid outcome, reported
    /// as `None` rather than an error.
    pub async fn query_id(&self, index: &str, id: &str) -> Result<Option<DatasetDocument>> {
        let body = builder::id_query(id);
        let response = self.run_search(index, &body).await?;
        normalize::first_document(&response)
    }

    /// Documents matching an ordered list of term filters, projected down to
    /// `return_fields` and sorted by `starttime` descending.
    pub async fn query_fields(
        &self,
        index: &str,
        terms: &[(String, Value)],
        return_fields: &[String],
        window: PageWindow,
        filter: &SearchFilter,
    ) -> Result<Paginated<Value>> {
        let body = builder::fields_query(terms, return_fields, window, filter);
        let response = self.run_search(index, &body).await?;
        normalize::hit_page(&response)
    }

    /// Documents overlapping the reference granule temporally and spatially.
    ///
    /// Two sequential backend calls: the reference lookup, then the overlap
    /// search composed from its envelope. A missing reference ID is a
    /// terminal `DatasetNotFound` - distinct from an empty result - and
    /// short-circuits the second call. A reference without temporal or
    /// spatial fields simply contributes fewer predicates.
    pub async fn overlaps(
        &self,
        index: &str,
        id: &str,
        terms: &[(String, Value)],
        return_fields: &[String],
        window: PageWindow,
    ) -> Result<Paginated<Value>> {
        let reference = self
            .query_id(index, id)
            .await?
            .ok_or_else(|| CatalogError::DatasetNotFound { id: id.to_string() })?;

        let envelope = OverlapEnvelope {
            starttime: reference.starttime,
            endtime: reference.endtime,
            location: reference.location,
        };
        let body = builder::overlaps_query(&envelope, terms, return_fields, window);
        let response = self.run_search(index, &body).await?;
        normalize::hit_page(&response)
    }

    async fn run_aggregation(
        &self,
        index: &str,
        query: AggQuery,
        window: PageWindow,
    ) -> Result<Paginated<String>> {
        let response = self.run_search(index, &query.body).await?;
        normalize::aggregation_page(&response, query.bucket, window)
    }

    async fn run_search(&self, index: &str, body: &Value) -> Result<Value> {
        tracing::debug!(index, body = %body, "executing search");
        self.backend.search(index, body).await
    }
}
