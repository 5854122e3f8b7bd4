//! Per-kind collectors: one read-only provider call, mapped into [`Resource`]s
//!
//! Collectors never catch provider errors; they surface to the tool layer,
//! which turns them into error envelopes.

use super::model::{AttrValue, Attributes, Resource, ResourceKind};
use crate::aws::InfraApi;
use crate::error::InfraError;
use aws_sdk_ec2::primitives::{DateTime as SmithyDateTime, DateTimeFormat};
use aws_sdk_ec2::types::{Instance, Tag};
use aws_sdk_rds::types::DbInstance;
use aws_sdk_s3::types::Bucket;
use tracing::debug;

/// Compute instances, optionally limited to one instance state (e.g. "running").
pub async fn collect_compute(
    api: &dyn InfraApi,
    state: Option<&str>,
) -> Result<Vec<Resource>, InfraError> {
    let instances = api.describe_instances(state).await?;
    debug!("Collected {} compute instances (state filter: {:?})", instances.len(), state);
    Ok(instances.iter().map(compute_resource).collect())
}

pub async fn collect_storage(api: &dyn InfraApi) -> Result<Vec<Resource>, InfraError> {
    let buckets = api.list_buckets().await?;
    debug!("Collected {} storage buckets", buckets.len());
    Ok(buckets.iter().map(storage_resource).collect())
}

pub async fn collect_database(api: &dyn InfraApi) -> Result<Vec<Resource>, InfraError> {
    let instances = api.describe_db_instances().await?;
    debug!("Collected {} database instances", instances.len());
    Ok(instances.iter().map(database_resource).collect())
}

pub fn compute_resource(instance: &Instance) -> Resource {
    let mut data = Attributes::new();
    data.insert(
        "state".into(),
        instance
            .state()
            .and_then(|s| s.name())
            .map(|name| name.as_str())
            .into(),
    );
    data.insert(
        "type".into(),
        instance.instance_type().map(|t| t.as_str()).into(),
    );
    data.insert("launch_time".into(), timestamp(instance.launch_time()));
    data.insert(
        "availability_zone".into(),
        instance
            .placement()
            .and_then(|p| p.availability_zone())
            .into(),
    );
    data.insert("public_ip".into(), instance.public_ip_address().into());
    data.insert(
        "tags".into(),
        AttrValue::Array(instance.tags().iter().map(tag_value).collect()),
    );

    Resource::new(ResourceKind::ComputeInstance, instance.instance_id(), data)
}

pub fn storage_resource(bucket: &Bucket) -> Resource {
    let mut data = Attributes::new();
    data.insert("creation_date".into(), timestamp(bucket.creation_date()));

    Resource::new(ResourceKind::StorageBucket, bucket.name(), data)
}

pub fn database_resource(db: &DbInstance) -> Resource {
    let mut data = Attributes::new();
    data.insert("engine".into(), db.engine().into());
    data.insert("status".into(), db.db_instance_status().into());
    data.insert("instance_class".into(), db.db_instance_class().into());
    data.insert(
        "endpoint".into(),
        db.endpoint().and_then(|e| e.address()).into(),
    );
    data.insert("multi_az".into(), db.multi_az().into());

    Resource::new(ResourceKind::DatabaseInstance, db.db_instance_identifier(), data)
}

/// Raw EC2 tag as `{Key, Value}`, matching the provider's own shape.
fn tag_value(tag: &Tag) -> AttrValue {
    let mut pair = Attributes::new();
    pair.insert("Key".into(), tag.key().into());
    pair.insert("Value".into(), tag.value().into());
    AttrValue::Object(pair)
}

/// Lift an SDK timestamp into the attribute tree as a temporal value.
fn timestamp(value: Option<&SmithyDateTime>) -> AttrValue {
    let Some(dt) = value else {
        return AttrValue::Null;
    };
    match chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()) {
        Some(ts) => AttrValue::Timestamp(ts),
        // Outside chrono's range; keep the SDK's own rendering.
        None => dt
            .fmt(DateTimeFormat::DateTime)
            .map(AttrValue::String)
            .unwrap_or(AttrValue::Null),
    }
}
