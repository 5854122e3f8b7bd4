mod collectors;
mod model;
mod normalize;

pub use collectors::{
    collect_compute, collect_database, collect_storage, compute_resource, database_resource,
    storage_resource,
};
pub use model::{AttrValue, Attributes, Resource, ResourceKind, UNKNOWN_IDENTIFIER};
pub use normalize::{format_timestamp, normalize, normalize_attributes};
