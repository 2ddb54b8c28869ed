//! Storage contract tests for [`InMemoryToolRegistryStore`].

use crate::in_memory::helpers::{add_stdio_server, manifest, store};
use rstest::rstest;
use switchboard::tool_registry::{
    adapters::memory::InMemoryToolRegistryStore,
    domain::{
        CredentialKey, EncryptedSecret, GlobalConfig, GlobalConfigPatch, HealthRecord,
        HealthStatus, NewServerConfig, PageRequest, RoutingStrategy, ServerConfigUpdate, ServerId,
        ServerName, ServerTransport, ToolDefinition,
    },
    ports::ToolRegistryStore,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn added_server_gets_identity_timestamps_and_defaults(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;

    let fetched = store
        .get_server(server.id())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");

    assert_eq!(fetched, server);
    assert_eq!(fetched.created_at(), fetched.updated_at());
    assert!(fetched.env().is_empty());
    assert_eq!(fetched.transport().command(), Some("npx"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_names_are_accepted_and_lookup_returns_the_oldest(
    store: InMemoryToolRegistryStore,
) {
    let first = add_stdio_server(&store, "filesystem", true).await;
    let second = add_stdio_server(&store, "filesystem", false).await;

    let found = store
        .find_server_by_name(&ServerName::new("filesystem").expect("valid name"))
        .await
        .expect("lookup should succeed")
        .expect("server should exist");

    assert_ne!(first.id(), second.id());
    let oldest = if (first.created_at(), first.id()) <= (second.created_at(), second.id()) {
        first.id()
    } else {
        second.id()
    };
    assert_eq!(found.id(), oldest);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_pages_through_every_server_once(store: InMemoryToolRegistryStore) {
    for index in 0..5 {
        add_stdio_server(&store, &format!("server-{index}"), true).await;
    }

    let first = store
        .list_servers(PageRequest::new(2, 0).expect("valid page"))
        .await
        .expect("listing should succeed");
    let second = store
        .list_servers(PageRequest::new(2, 2).expect("valid page"))
        .await
        .expect("listing should succeed");
    let third = store
        .list_servers(PageRequest::new(2, 4).expect("valid page"))
        .await
        .expect("listing should succeed");

    assert_eq!(first.total, 5);
    assert_eq!(
        (first.items.len(), second.items.len(), third.items.len()),
        (2, 2, 1)
    );
    let ordered: Vec<_> = first
        .items
        .iter()
        .chain(&second.items)
        .chain(&third.items)
        .map(|server| (server.created_at(), server.id()))
        .collect();
    let mut sorted = ordered.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(ordered, sorted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_update_is_a_no_op(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;

    let updated = store
        .update_server(server.id(), &ServerConfigUpdate::new())
        .await
        .expect("update should succeed");
    let unchanged = store
        .get_server(server.id())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");

    assert!(!updated);
    assert_eq!(unchanged, server);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_update_changes_only_supplied_fields(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "search", true).await;
    let transport = ServerTransport::sse("https://tools.example.com/sse").expect("valid url");

    let updated = store
        .update_server(
            server.id(),
            &ServerConfigUpdate::new().with_transport(transport.clone()),
        )
        .await
        .expect("update should succeed");
    let changed = store
        .get_server(server.id())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");

    assert!(updated);
    assert_eq!(changed.transport(), &transport);
    assert_eq!(changed.name(), server.name());
    assert!(changed.is_enabled());
    assert!(changed.updated_at() >= server.updated_at());
    assert_eq!(changed.created_at(), server.created_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_an_unknown_server_reports_false(store: InMemoryToolRegistryStore) {
    let updated = store
        .update_server(ServerId::new(), &ServerConfigUpdate::new().with_enabled(false))
        .await
        .expect("update should succeed");

    assert!(!updated);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_server_keeps_its_dependent_records(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;
    let key = CredentialKey::new("GITHUB_TOKEN").expect("valid key");
    store
        .save_tools(server.id(), server.name(), &[manifest("search")])
        .await
        .expect("save should succeed");
    store
        .save_credential(server.id(), &key, &EncryptedSecret::new("cipher"))
        .await
        .expect("save should succeed");

    assert!(store.delete_server(server.id()).await.expect("delete should succeed"));
    assert!(!store.delete_server(server.id()).await.expect("delete should succeed"));

    assert!(
        store
            .get_credential(server.id(), &key)
            .await
            .expect("lookup should succeed")
            .is_some()
    );
    assert_eq!(
        store
            .delete_tools(server.id())
            .await
            .expect("delete should succeed"),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saving_tools_replaces_the_previous_set(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;
    store
        .save_tools(
            server.id(),
            server.name(),
            &[manifest("search"), manifest("open")],
        )
        .await
        .expect("save should succeed");
    store
        .save_tools(server.id(), server.name(), &[manifest("clone")])
        .await
        .expect("save should succeed");

    let tools = store
        .load_tools(server.id())
        .await
        .expect("load should succeed");

    let names: Vec<&str> = tools.iter().map(ToolDefinition::name).collect();
    assert_eq!(names, ["clone"]);
    assert!(tools.iter().all(|tool| tool.server_id() == server.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saving_an_empty_set_clears_persisted_tools(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;
    store
        .save_tools(server.id(), server.name(), &[manifest("search")])
        .await
        .expect("save should succeed");
    store
        .save_tools(server.id(), server.name(), &[])
        .await
        .expect("save should succeed");

    let tools = store
        .load_tools(server.id())
        .await
        .expect("load should succeed");

    assert!(tools.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn loaded_tools_carry_the_current_server_name(store: InMemoryToolRegistryStore) {
    let server = add_stdio_server(&store, "github", true).await;
    store
        .save_tools(server.id(), server.name(), &[manifest("search")])
        .await
        .expect("save should succeed");
    let renamed = ServerName::new("github-enterprise").expect("valid name");
    store
        .update_server(
            server.id(),
            &ServerConfigUpdate::new().with_name(renamed.clone()),
        )
        .await
        .expect("update should succeed");

    let tools = store
        .load_tools(server.id())
        .await
        .expect("load should succeed");

    assert_eq!(
        tools.first().map(|tool| tool.server_name().clone()),
        Some(renamed)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn config_defaults_apply_until_overridden(store: InMemoryToolRegistryStore) {
    let defaults = store.get_config().await.expect("read should succeed");
    assert_eq!(defaults, GlobalConfig::default());
    assert!(!defaults.expose_git);
    assert!(defaults.audit_enabled);
    assert_eq!(defaults.rate_limit_per_minute, 60);

    let patch = GlobalConfigPatch {
        expose_git: Some(true),
        routing_strategy: Some(RoutingStrategy::RoundRobin),
        ..GlobalConfigPatch::default()
    };
    let merged = store.set_config(&patch).await.expect("write should succeed");

    assert!(merged.expose_git);
    assert_eq!(merged.routing_strategy, RoutingStrategy::RoundRobin);
    assert!(!merged.expose_filesystem);
    assert_eq!(
        store.get_config().await.expect("read should succeed"),
        merged
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_config_patch_changes_nothing(store: InMemoryToolRegistryStore) {
    store
        .set_config(&GlobalConfigPatch {
            rate_limit_per_minute: Some(10),
            ..GlobalConfigPatch::default()
        })
        .await
        .expect("write should succeed");
    let before = store.get_config().await.expect("read should succeed");

    let after = store
        .set_config(&GlobalConfigPatch::default())
        .await
        .expect("write should succeed");

    assert_eq!(before, after);
    assert_eq!(after.rate_limit_per_minute, 10);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_is_upserted_per_server(store: InMemoryToolRegistryStore) {
    let server_id = ServerId::new();
    let now = chrono::Utc::now();
    let failing = HealthRecord::unknown(server_id).record_failure("connection refused", now);
    store
        .save_health(&failing)
        .await
        .expect("save should succeed");
    let recovered = failing.clone().record_success(12, now);
    store
        .save_health(&recovered)
        .await
        .expect("save should succeed");

    let stored = store
        .get_health(server_id)
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    let all = store.get_all_health().await.expect("listing should succeed");

    assert_eq!(stored.status, HealthStatus::Healthy);
    assert_eq!(stored.latency_ms, Some(12));
    assert_eq!(stored.consecutive_failures, 0);
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn credentials_round_trip_without_exposing_values_in_listings(
    store: InMemoryToolRegistryStore,
) {
    let server_id = ServerId::new();
    let key = CredentialKey::new("API_KEY").expect("valid key");
    store
        .save_credential(server_id, &key, &EncryptedSecret::new("v1"))
        .await
        .expect("save should succeed");
    store
        .save_credential(server_id, &key, &EncryptedSecret::new("v2"))
        .await
        .expect("save should succeed");

    let stored = store
        .get_credential(server_id, &key)
        .await
        .expect("lookup should succeed")
        .expect("credential should exist");
    let keys = store
        .list_credential_keys(server_id)
        .await
        .expect("listing should succeed");

    assert_eq!(stored.expose(), "v2");
    assert_eq!(keys, vec![key.clone()]);
    assert!(
        store
            .delete_credential(server_id, &key)
            .await
            .expect("delete should succeed")
    );
    assert!(
        store
            .get_credential(server_id, &key)
            .await
            .expect("lookup should succeed")
            .is_none()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn network_servers_keep_their_endpoint(store: InMemoryToolRegistryStore) {
    let transport =
        ServerTransport::streamable_http("https://mcp.example.com/rpc").expect("valid url");
    let input = NewServerConfig::new(ServerName::new("remote").expect("valid name"), transport)
        .with_env([("REGION", "eu-west-1")]);

    let server = store.add_server(input).await.expect("add should succeed");

    assert_eq!(server.transport().url(), Some("https://mcp.example.com/rpc"));
    assert_eq!(server.transport().command(), None);
    assert_eq!(
        server.env().get("REGION").map(String::as_str),
        Some("eu-west-1")
    );
    assert!(server.transport().args().is_empty());
}
