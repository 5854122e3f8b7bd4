//! Session construction on top of the SDK's own resolution chain
//!
//! Region and credential discovery (environment, shared config files, SSO,
//! instance role) is left to `aws-config`. This module only applies the
//! caller's overrides and checks that the result is usable before any
//! service call is made.

use super::InfraApi;
use crate::error::{error_chain, InfraError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_ec2::types::{Filter, Instance};
use aws_sdk_rds::types::DbInstance;
use aws_sdk_s3::types::Bucket;
use tracing::debug;

/// Builds a fresh session handle per invocation. Handles are never cached or
/// shared, so one caller's region/profile cannot leak into another call.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn InfraApi>, InfraError>;
}

/// Factory backed by `aws-config`.
#[derive(Debug, Clone, Default)]
pub struct AwsSessionFactory {
    endpoint_url: Option<String>,
}

impl AwsSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point every client at a custom endpoint (LocalStack, etc.).
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url.filter(|url| !url.is_empty());
        self
    }
}

#[async_trait]
impl SessionFactory for AwsSessionFactory {
    async fn create(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn InfraApi>, InfraError> {
        if let Some(profile) = profile {
            validate_profile_name(profile)?;
        }

        debug!(
            "Creating AWS session [region: {:?}, profile: {:?}, endpoint: {:?}]",
            region, profile, self.endpoint_url
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = &self.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;

        // An unknown profile fails here, before the region check below.
        let provider = config
            .credentials_provider()
            .ok_or_else(|| InfraError::session("no credentials provider available"))?;
        provider.provide_credentials().await.map_err(|e| {
            InfraError::session(format!(
                "could not resolve credentials for {}: {}",
                describe_profile(profile),
                error_chain(&e)
            ))
        })?;

        let Some(resolved_region) = config.region() else {
            return Err(InfraError::session(format!(
                "no AWS region configured for {}; pass 'region' or set one for the profile",
                describe_profile(profile)
            )));
        };

        debug!("AWS session ready in {}", resolved_region);
        Ok(Box::new(AwsSession::from_config(&config, self.endpoint_url.is_some())))
    }
}

fn describe_profile(profile: Option<&str>) -> String {
    match profile {
        Some(profile) => format!("profile '{}'", profile),
        None => "the default profile".to_string(),
    }
}

/// Reject profile names the shared config format cannot express.
pub fn validate_profile_name(profile: &str) -> Result<(), InfraError> {
    if profile.trim().is_empty() {
        return Err(InfraError::session("profile name is empty"));
    }
    if let Some(bad) = profile
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '[' | ']'))
    {
        return Err(InfraError::session(format!(
            "malformed profile name '{}': unexpected character {:?}",
            profile, bad
        )));
    }
    Ok(())
}

/// Service clients for one region/profile selection.
#[derive(Debug, Clone)]
pub struct AwsSession {
    ec2: aws_sdk_ec2::Client,
    s3: aws_sdk_s3::Client,
    rds: aws_sdk_rds::Client,
}

impl AwsSession {
    pub fn from_config(config: &SdkConfig, custom_endpoint: bool) -> Self {
        // Virtual-hosted bucket addressing does not work against local emulators.
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(custom_endpoint)
            .build();

        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            rds: aws_sdk_rds::Client::new(config),
        }
    }
}

#[async_trait]
impl InfraApi for AwsSession {
    async fn describe_instances(&self, state: Option<&str>) -> Result<Vec<Instance>, InfraError> {
        let mut request = self.ec2.describe_instances();
        if let Some(state) = state {
            request = request.filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values(state)
                    .build(),
            );
        }
        let output = request.send().await?;

        Ok(output
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances().iter().cloned())
            .collect())
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, InfraError> {
        let output = self.s3.list_buckets().send().await?;
        Ok(output.buckets().to_vec())
    }

    async fn describe_db_instances(&self) -> Result<Vec<DbInstance>, InfraError> {
        let output = self.rds.describe_db_instances().send().await?;
        Ok(output.db_instances().to_vec())
    }
}
