//! Response envelopes for the catalog API.
//!
//! Every route answers with the same envelope shape; only the payload key
//! differs (`types`, `datasets`, `dataset_ids`, `results`, `result`).

use geocat_core::models::DatasetDocument;
use geocat_query::{PageWindow, Paginated};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TypesEnvelope {
    pub success: bool,
    pub total: usize,
    pub count: usize,
    pub page_size: usize,
    pub offset: usize,
    pub types: Vec<String>,
}

impl TypesEnvelope {
    pub fn new(page: Paginated<String>, window: PageWindow) -> Self {
        Self {
            success: true,
            total: page.total,
            count: page.items.len(),
            page_size: window.page_size,
            offset: window.offset,
            types: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DatasetsEnvelope {
    pub success: bool,
    pub total: usize,
    pub count: usize,
    pub page_size: usize,
    pub offset: usize,
    pub datasets: Vec<String>,
}

impl DatasetsEnvelope {
    pub fn new(page: Paginated<String>, window: PageWindow) -> Self {
        Self {
            success: true,
            total: page.total,
            count: page.items.len(),
            page_size: window.page_size,
            offset: window.offset,
            datasets: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DatasetIdsEnvelope {
    pub success: bool,
    pub total: usize,
    pub count: usize,
    pub page_size: usize,
    pub offset: usize,
    pub dataset_ids: Vec<String>,
}

impl DatasetIdsEnvelope {
    pub fn new(page: Paginated<String>, window: PageWindow) -> Self {
        Self {
            success: true,
            total: page.total,
            count: page.items.len(),
            page_size: window.page_size,
            offset: window.offset,
            dataset_ids: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsEnvelope {
    pub success: bool,
    pub total: usize,
    pub count: usize,
    pub page_size: usize,
    pub offset: usize,
    pub results: Vec<Value>,
}

impl ResultsEnvelope {
    pub fn new(page: Paginated<Value>, window: PageWindow) -> Self {
        Self {
            success: true,
            total: page.total,
            count: page.items.len(),
            page_size: window.page_size,
            offset: window.offset,
            results: page.items,
        }
    }
}

/// Single-document envelope: `result` stays null for "not found", which is
/// a successful response.
#[derive(Debug, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    pub result: Option<DatasetDocument>,
}
