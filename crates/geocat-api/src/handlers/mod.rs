mod catalog;
mod health;

pub use catalog::{
    dataset_by_id, datasets_by_type, fields_by_type_dataset, fields_by_type_dataset_post,
    ids_by_dataset, ids_by_dataset_post, ids_by_type, ids_by_type_post, list_datasets,
    list_types, overlaps_by_id, overlaps_by_id_type_dataset, types_by_dataset,
};
pub use health::health_check;
