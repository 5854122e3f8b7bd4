pub mod session;

pub use session::{validate_profile_name, AwsSession, AwsSessionFactory, SessionFactory};

use crate::error::InfraError;
use async_trait::async_trait;
use aws_sdk_ec2::types::Instance;
use aws_sdk_rds::types::DbInstance;
use aws_sdk_s3::types::Bucket;

/// Read-only provider calls, one per resource kind.
///
/// A value of this trait is a session handle: it is bound to one region and
/// credential profile and lives for a single tool invocation. Only the first
/// page of each listing is returned.
#[async_trait]
pub trait InfraApi: Send + Sync {
    /// Instances in response order, reservations flattened. `state` is applied
    /// as the `instance-state-name` filter.
    async fn describe_instances(&self, state: Option<&str>) -> Result<Vec<Instance>, InfraError>;

    async fn list_buckets(&self) -> Result<Vec<Bucket>, InfraError>;

    async fn describe_db_instances(&self) -> Result<Vec<DbInstance>, InfraError>;
}
