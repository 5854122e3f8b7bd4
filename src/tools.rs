//! Tool registry: the four named, read-only inventory operations
//!
//! The registry is an explicit value built at startup and shared by
//! reference with the transport. It holds no per-call state: every
//! invocation creates its own session and its own envelope.

use crate::aws::SessionFactory;
use crate::error::InfraError;
use crate::resource::{collect_compute, collect_database, collect_storage};
use crate::response::{AccountSummary, ResponseEnvelope, FAILURE_PREFIX};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

pub const COMPUTE_TITLE: &str = "Compute instances";
pub const STORAGE_TITLE: &str = "Storage buckets";
pub const DATABASE_TITLE: &str = "Database instances";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ListCompute,
    ListStorage,
    ListDatabase,
    AccountSummary,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::ListCompute,
        ToolName::ListStorage,
        ToolName::ListDatabase,
        ToolName::AccountSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListCompute => "list-compute",
            ToolName::ListStorage => "list-storage",
            ToolName::ListDatabase => "list-database",
            ToolName::AccountSummary => "account-summary",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ListCompute => {
                "List EC2 compute instances. Filter by instance state with the optional \
                 'state' parameter (e.g. \"running\"). Accepts optional 'region' and 'profile'."
            }
            ToolName::ListStorage => {
                "List the S3 storage buckets available to the account. \
                 Accepts optional 'region' and 'profile'."
            }
            ToolName::ListDatabase => {
                "List RDS managed database instances. Accepts optional 'region' and 'profile'."
            }
            ToolName::AccountSummary => {
                "Quick account overview: counts of compute instances, storage buckets and \
                 database instances. Takes the same 'region'/'profile' parameters as the other tools."
            }
        }
    }

    fn input_schema(&self) -> Value {
        let mut properties = json!({
            "region": {
                "type": "string",
                "description": "AWS region, e.g. us-east-1. Defaults to the SDK's resolution chain."
            },
            "profile": {
                "type": "string",
                "description": "Named profile from the shared AWS config/credentials files."
            }
        });
        if *self == ToolName::ListCompute {
            properties["state"] = json!({
                "type": "string",
                "description": "Only return instances in this state (pending, running, stopping, stopped, shutting-down, terminated)."
            });
        }
        json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false
        })
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool metadata as advertised to the hosting runtime.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Arguments accepted by the tools. `state` is only valid for `list-compute`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolArgs {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub state: Option<String>,
}

/// Server-wide fallbacks for region/profile, applied when a call omits them.
#[derive(Debug, Clone, Default)]
pub struct ToolDefaults {
    pub region: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

pub struct ToolRegistry {
    factory: Arc<dyn SessionFactory>,
    defaults: ToolDefaults,
}

impl ToolRegistry {
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            defaults: ToolDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: ToolDefaults) -> Self {
        self.defaults = ToolDefaults {
            region: non_empty(defaults.region.as_deref()).map(str::to_string),
            profile: non_empty(defaults.profile.as_deref()).map(str::to_string),
        };
        self
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        ToolName::ALL.iter().map(ToolName::descriptor).collect()
    }

    /// Dispatch by tool name with JSON arguments, as the transport receives them.
    ///
    /// Only an unknown tool name is an `Err`; arguments that do not fit the
    /// tool's schema come back as an error envelope.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<ResponseEnvelope, ToolCallError> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;
        let args = match parse_args(tool, arguments) {
            Ok(args) => args,
            Err(detail) => {
                error!("Tool {} rejected arguments: {}", tool.as_str(), detail);
                return Ok(ResponseEnvelope::error(format!(
                    "{}: invalid arguments: {}",
                    FAILURE_PREFIX, detail
                )));
            }
        };
        let region = args.region.as_deref();
        let profile = args.profile.as_deref();

        Ok(match tool {
            ToolName::ListCompute => self.list_compute(region, profile, args.state.as_deref()).await,
            ToolName::ListStorage => self.list_storage(region, profile).await,
            ToolName::ListDatabase => self.list_database(region, profile).await,
            ToolName::AccountSummary => self.account_summary(region, profile).await,
        })
    }

    pub async fn list_compute(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
        state: Option<&str>,
    ) -> ResponseEnvelope {
        let state = non_empty(state);
        guarded(ToolName::ListCompute, async {
            let session = self.session(region, profile).await?;
            let resources = collect_compute(session.as_ref(), state).await?;
            Ok(ResponseEnvelope::success(COMPUTE_TITLE, resources))
        })
        .await
    }

    pub async fn list_storage(&self, region: Option<&str>, profile: Option<&str>) -> ResponseEnvelope {
        guarded(ToolName::ListStorage, async {
            let session = self.session(region, profile).await?;
            let resources = collect_storage(session.as_ref()).await?;
            Ok(ResponseEnvelope::success(STORAGE_TITLE, resources))
        })
        .await
    }

    pub async fn list_database(&self, region: Option<&str>, profile: Option<&str>) -> ResponseEnvelope {
        guarded(ToolName::ListDatabase, async {
            let session = self.session(region, profile).await?;
            let resources = collect_database(session.as_ref()).await?;
            Ok(ResponseEnvelope::success(DATABASE_TITLE, resources))
        })
        .await
    }

    /// Counts from running all three collectors unfiltered. The calls are
    /// independent and issued concurrently; any failure fails the summary.
    pub async fn account_summary(&self, region: Option<&str>, profile: Option<&str>) -> ResponseEnvelope {
        guarded(ToolName::AccountSummary, async {
            let session = self.session(region, profile).await?;
            let api = session.as_ref();
            let (compute, storage, database) = tokio::try_join!(
                collect_compute(api, None),
                collect_storage(api),
                collect_database(api),
            )?;
            Ok(ResponseEnvelope::summary(AccountSummary {
                compute_count: compute.len(),
                storage_count: storage.len(),
                database_count: database.len(),
            }))
        })
        .await
    }

    async fn session(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<Box<dyn crate::aws::InfraApi>, InfraError> {
        let region = non_empty(region).or(self.defaults.region.as_deref());
        let profile = non_empty(profile).or(self.defaults.profile.as_deref());
        self.factory.create(region, profile).await
    }
}

/// Run one tool body, turning any failure into an error envelope.
async fn guarded<F>(tool: ToolName, body: F) -> ResponseEnvelope
where
    F: Future<Output = Result<ResponseEnvelope, InfraError>>,
{
    debug!("Invoking tool {}", tool.as_str());
    match body.await {
        Ok(envelope) => envelope,
        Err(err) => {
            error!("Tool {} failed ({} error): {}", tool.as_str(), err.kind(), err);
            ResponseEnvelope::failure(&err)
        }
    }
}

/// Decode arguments against the same rules the advertised schema states.
fn parse_args(tool: ToolName, arguments: Value) -> Result<ToolArgs, String> {
    let args: ToolArgs = match arguments {
        Value::Null => ToolArgs::default(),
        other => serde_json::from_value(other).map_err(|e| e.to_string())?,
    };
    if tool != ToolName::ListCompute && args.state.is_some() {
        return Err(format!("unknown field `state`, not accepted by {}", tool.as_str()));
    }
    Ok(args)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
