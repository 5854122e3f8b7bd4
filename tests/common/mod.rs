//! In-memory account used to drive the tools without AWS

#![allow(dead_code)]

use async_trait::async_trait;
use aws_infra_mcp::aws::{validate_profile_name, InfraApi, SessionFactory};
use aws_infra_mcp::error::InfraError;
use aws_infra_mcp::tools::ToolRegistry;
use aws_sdk_ec2::primitives::DateTime;
use aws_sdk_ec2::types::{Instance, InstanceState, InstanceStateName, InstanceType, Placement, Tag};
use aws_sdk_rds::types::{DbInstance, Endpoint};
use aws_sdk_s3::types::Bucket;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeAccount {
    pub instances: Vec<Instance>,
    pub buckets: Vec<Bucket>,
    pub databases: Vec<DbInstance>,
    pub compute_failure: Option<InfraError>,
    pub storage_failure: Option<InfraError>,
    pub database_failure: Option<InfraError>,
    pub provider_calls: AtomicUsize,
}

impl FakeAccount {
    pub fn calls(&self) -> usize {
        self.provider_calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeSession(Arc<FakeAccount>);

#[async_trait]
impl InfraApi for FakeSession {
    async fn describe_instances(&self, state: Option<&str>) -> Result<Vec<Instance>, InfraError> {
        self.0.record_call();
        if let Some(err) = &self.0.compute_failure {
            return Err(err.clone());
        }
        Ok(self
            .0
            .instances
            .iter()
            .filter(|i| match state {
                Some(wanted) => i.state().and_then(|s| s.name()).map(|n| n.as_str()) == Some(wanted),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, InfraError> {
        self.0.record_call();
        match &self.0.storage_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.0.buckets.clone()),
        }
    }

    async fn describe_db_instances(&self) -> Result<Vec<DbInstance>, InfraError> {
        self.0.record_call();
        match &self.0.database_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.0.databases.clone()),
        }
    }
}

/// Hands out sessions over one shared fake account and records each request.
pub struct FakeFactory {
    pub account: Arc<FakeAccount>,
    pub sessions: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl FakeFactory {
    pub fn new(account: FakeAccount) -> Self {
        Self {
            account: Arc::new(account),
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<(Option<String>, Option<String>)> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn create(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn InfraApi>, InfraError> {
        if let Some(profile) = profile {
            validate_profile_name(profile)?;
        }
        self.sessions
            .lock()
            .unwrap()
            .push((region.map(str::to_string), profile.map(str::to_string)));
        Ok(Box::new(FakeSession(Arc::clone(&self.account))))
    }
}

pub fn registry(account: FakeAccount) -> (ToolRegistry, Arc<FakeFactory>) {
    let factory = Arc::new(FakeFactory::new(account));
    (ToolRegistry::new(factory.clone()), factory)
}

pub fn instance(id: &str, state: InstanceStateName) -> Instance {
    Instance::builder()
        .instance_id(id)
        .state(InstanceState::builder().name(state).build())
        .instance_type(InstanceType::T3Small)
        .launch_time(DateTime::from_secs(1_700_000_000))
        .placement(Placement::builder().availability_zone("us-east-1b").build())
        .tags(Tag::builder().key("Name").value(id).build())
        .build()
}

pub fn bucket(name: &str) -> Bucket {
    Bucket::builder()
        .name(name)
        .creation_date(DateTime::from_secs(1_600_000_000))
        .build()
}

pub fn database(id: &str) -> DbInstance {
    DbInstance::builder()
        .db_instance_identifier(id)
        .engine("postgres")
        .db_instance_status("available")
        .db_instance_class("db.t3.micro")
        .endpoint(Endpoint::builder().address(format!("{id}.example.rds.amazonaws.com")).build())
        .multi_az(false)
        .build()
}

pub fn access_denied() -> InfraError {
    InfraError::Service {
        code: Some("AccessDenied".into()),
        message: Some("AccessDenied: User is not authorized to perform rds:DescribeDBInstances".into()),
        raw: "service error".into(),
    }
}
