mod common;

use aws_infra_mcp::error::InfraError;
use aws_infra_mcp::resource::{AttrValue, ResourceKind};
use aws_infra_mcp::response::{AccountSummary, Listing, ResponseEnvelope};
use aws_infra_mcp::tools::{ToolCallError, ToolDefaults, ToolRegistry, COMPUTE_TITLE, DATABASE_TITLE, STORAGE_TITLE};
use aws_sdk_ec2::types::InstanceStateName;
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn listing(envelope: &ResponseEnvelope) -> &Listing {
    match envelope {
        ResponseEnvelope::Listing(listing) => listing,
        other => panic!("expected a listing, got {other:?}"),
    }
}

fn error_message(envelope: &ResponseEnvelope) -> &str {
    match envelope {
        ResponseEnvelope::Error { message } => message,
        other => panic!("expected an error, got {other:?}"),
    }
}

fn mixed_account() -> FakeAccount {
    FakeAccount {
        instances: vec![
            instance("i-running", InstanceStateName::Running),
            instance("i-stopped", InstanceStateName::Stopped),
        ],
        buckets: vec![bucket("assets"), bucket("logs"), bucket("backups")],
        databases: vec![database("orders")],
        ..Default::default()
    }
}

#[tokio::test]
async fn compute_listing_preserves_provider_order() {
    let (registry, _) = registry(mixed_account());

    let envelope = registry.list_compute(None, None, None).await;
    assert!(!envelope.is_error());
    let listing = listing(&envelope);
    assert_eq!(listing.title, COMPUTE_TITLE);
    let ids: Vec<_> = listing.resources.iter().map(|r| r.identifier()).collect();
    assert_eq!(ids, ["i-running", "i-stopped"]);
    assert!(listing
        .resources
        .iter()
        .all(|r| r.kind() == ResourceKind::ComputeInstance));
}

#[tokio::test]
async fn state_filter_returns_only_matching_instances() {
    let (registry, _) = registry(mixed_account());

    let envelope = registry.list_compute(None, None, Some("running")).await;
    let resources = &listing(&envelope).resources;
    assert_eq!(resources.len(), 1);
    assert!(resources
        .iter()
        .all(|r| r.attribute("state").and_then(AttrValue::as_str) == Some("running")));
}

#[tokio::test]
async fn empty_state_filter_means_no_filter() {
    let (registry, _) = registry(mixed_account());
    let envelope = registry.list_compute(None, None, Some("")).await;
    assert_eq!(listing(&envelope).resources.len(), 2);
}

#[tokio::test]
async fn empty_account_yields_empty_success_for_every_kind() {
    let (registry, _) = registry(FakeAccount::default());

    let compute = registry.list_compute(None, None, None).await;
    let storage = registry.list_storage(None, None).await;
    let database = registry.list_database(None, None).await;

    for (envelope, title) in [
        (&compute, COMPUTE_TITLE),
        (&storage, STORAGE_TITLE),
        (&database, DATABASE_TITLE),
    ] {
        assert!(!envelope.is_error());
        let listing = listing(envelope);
        assert_eq!(listing.title, title);
        assert!(listing.resources.is_empty());
    }

    let rendered: Value = serde_json::from_str(&storage.render()).unwrap();
    assert_eq!(rendered, json!({"title": "Storage buckets", "resources": []}));
}

#[tokio::test]
async fn listed_resources_carry_no_timestamps() {
    let (registry, _) = registry(mixed_account());

    let compute = registry.list_compute(None, None, None).await;
    let storage = registry.list_storage(None, None).await;
    for envelope in [&compute, &storage] {
        for resource in &listing(envelope).resources {
            assert!(!resource.attributes().values().any(AttrValue::contains_timestamp));
        }
    }
    let first = &listing(&compute).resources[0];
    assert_eq!(
        first.attribute("launch_time").and_then(AttrValue::as_str),
        Some("2023-11-14T22:13:20+00:00")
    );
}

#[tokio::test]
async fn records_without_identifier_become_unknown() {
    let account = FakeAccount {
        instances: vec![aws_sdk_ec2::types::Instance::builder().build()],
        buckets: vec![aws_sdk_s3::types::Bucket::builder().build()],
        databases: vec![aws_sdk_rds::types::DbInstance::builder().build()],
        ..Default::default()
    };
    let (registry, _) = registry(account);

    let compute = registry.list_compute(None, None, None).await;
    let storage = registry.list_storage(None, None).await;
    let database = registry.list_database(None, None).await;
    for envelope in [&compute, &storage, &database] {
        assert_eq!(listing(envelope).resources[0].identifier(), "unknown");
    }
}

#[tokio::test]
async fn database_access_denied_becomes_error_envelope() {
    let account = FakeAccount {
        database_failure: Some(access_denied()),
        ..mixed_account()
    };
    let (registry, _) = registry(account);

    let envelope = registry.list_database(Some("us-east-1"), None).await;
    assert!(envelope.is_error());
    assert!(error_message(&envelope).contains("AccessDenied: User is not authorized"));

    let result = envelope.into_tool_result();
    assert!(result.is_error);
    assert_eq!(result.content.len(), 1);
}

#[tokio::test]
async fn malformed_profile_fails_without_provider_calls() {
    let (registry, factory) = registry(mixed_account());

    let envelope = registry.list_compute(None, Some("bad profile"), None).await;
    assert!(envelope.is_error());
    assert!(error_message(&envelope).contains("could not create AWS session"));
    assert_eq!(factory.account.calls(), 0);
    assert!(factory.requested().is_empty());
}

#[tokio::test]
async fn transport_failures_are_reported_not_raised() {
    let account = FakeAccount {
        storage_failure: Some(InfraError::Transport("dispatch failure: connection refused".into())),
        ..Default::default()
    };
    let (registry, _) = registry(account);

    let envelope = registry.list_storage(None, None).await;
    assert_eq!(
        error_message(&envelope),
        "AWS query failed: transport failure: dispatch failure: connection refused"
    );
}

#[tokio::test]
async fn summary_counts_match_individual_listings() {
    let (registry, _) = registry(mixed_account());

    let summary = match registry.account_summary(Some("eu-west-1"), Some("ops")).await {
        ResponseEnvelope::Summary(summary) => summary,
        other => panic!("expected a summary, got {other:?}"),
    };
    let compute = registry.list_compute(Some("eu-west-1"), Some("ops"), None).await;
    let storage = registry.list_storage(Some("eu-west-1"), Some("ops")).await;
    let database = registry.list_database(Some("eu-west-1"), Some("ops")).await;

    assert_eq!(
        summary,
        AccountSummary {
            compute_count: listing(&compute).resources.len(),
            storage_count: listing(&storage).resources.len(),
            database_count: listing(&database).resources.len(),
        }
    );
    assert_eq!(summary.compute_count, 2);
    assert_eq!(summary.storage_count, 3);
    assert_eq!(summary.database_count, 1);
}

#[tokio::test]
async fn summary_fails_whole_when_one_collector_fails() {
    let account = FakeAccount {
        database_failure: Some(access_denied()),
        ..mixed_account()
    };
    let (registry, _) = registry(account);

    let envelope = registry.account_summary(None, None).await;
    assert!(envelope.is_error());
    assert!(!envelope.render().contains("compute_count"));
}

#[tokio::test]
async fn every_invocation_gets_its_own_session() {
    let (registry, factory) = registry(mixed_account());

    registry.list_storage(Some("us-east-1"), Some("alpha")).await;
    registry.list_storage(Some("ap-south-1"), None).await;

    assert_eq!(
        factory.requested(),
        vec![
            (Some("us-east-1".to_string()), Some("alpha".to_string())),
            (Some("ap-south-1".to_string()), None),
        ]
    );
}

#[tokio::test]
async fn concurrent_invocations_keep_their_own_selection() {
    let (registry, factory) = registry(mixed_account());
    let registry = Arc::new(registry);

    let mut handles = Vec::new();
    for region in ["us-east-1", "eu-west-1", "ap-northeast-1", "sa-east-1"] {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.list_compute(Some(region), Some(region), None).await
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().is_error());
    }

    let requested = factory.requested();
    assert_eq!(requested.len(), 4);
    assert!(requested.iter().all(|(region, profile)| region == profile));
}

#[tokio::test]
async fn defaults_fill_missing_region_and_profile() {
    let factory = Arc::new(FakeFactory::new(mixed_account()));
    let registry = ToolRegistry::new(factory.clone()).with_defaults(ToolDefaults {
        region: Some("eu-central-1".into()),
        profile: Some("readonly".into()),
    });

    registry.list_database(None, None).await;
    registry.list_database(Some("us-west-2"), Some("")).await;

    assert_eq!(
        factory.requested(),
        vec![
            (Some("eu-central-1".to_string()), Some("readonly".to_string())),
            (Some("us-west-2".to_string()), Some("readonly".to_string())),
        ]
    );
}

#[tokio::test]
async fn invoke_dispatches_by_name() {
    let (registry, _) = registry(mixed_account());

    let envelope = registry
        .invoke("list-compute", json!({"state": "stopped"}))
        .await
        .unwrap();
    let ids: Vec<_> = listing(&envelope).resources.iter().map(|r| r.identifier()).collect();
    assert_eq!(ids, ["i-stopped"]);

    let summary = registry.invoke("account-summary", Value::Null).await.unwrap();
    assert!(matches!(summary, ResponseEnvelope::Summary(_)));
}

#[tokio::test]
async fn invoke_rejects_unknown_tools() {
    let (registry, factory) = registry(mixed_account());

    assert!(matches!(
        registry.invoke("delete-everything", json!({})).await,
        Err(ToolCallError::UnknownTool(name)) if name == "delete-everything"
    ));
    assert_eq!(factory.account.calls(), 0);
}

#[tokio::test]
async fn bad_arguments_become_error_envelopes() {
    let (registry, factory) = registry(mixed_account());

    for (tool, arguments) in [
        ("list-storage", json!({"region": 42})),
        ("list-storage", json!({"state": "running"})),
        ("list-database", json!({"bucket": "logs"})),
        ("account-summary", json!(["us-east-1"])),
    ] {
        let envelope = registry.invoke(tool, arguments.clone()).await.unwrap();
        let message = error_message(&envelope);
        assert!(
            message.starts_with("AWS query failed: invalid arguments: "),
            "{tool} {arguments}: {message}"
        );
    }
    assert_eq!(factory.account.calls(), 0);
    assert!(factory.requested().is_empty());
}
