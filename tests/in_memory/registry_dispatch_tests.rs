//! Discovery, cache, and dispatch tests for [`ToolRegistryManager`] over
//! in-memory adapters.
//!
//! [`ToolRegistryManager`]: switchboard::tool_registry::services::ToolRegistryManager

use crate::in_memory::helpers::{RegistryContext, add_stdio_server, context, manifest};
use rstest::rstest;
use serde_json::json;
use switchboard::tool_registry::{
    domain::{CredentialKey, NewServerConfig, ServerConfigUpdate, ServerId},
    ports::{ToolRegistryStore, ToolTransportError},
    services::ToolRegistryServiceError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_tools_are_discovered_exactly(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;

    let registered = context
        .manager
        .register_tools(
            server.id(),
            server.name(),
            vec![manifest("search"), manifest("open_issue")],
        )
        .await
        .expect("registration should succeed");
    let discovered = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");

    assert_eq!(discovered, registered);
    assert!(
        discovered
            .iter()
            .all(|tool| tool.server_name() == server.name())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_servers_discover_nothing(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", false).await;
    context
        .store
        .save_tools(server.id(), server.name(), &[manifest("search")])
        .await
        .expect("save should succeed");

    let tools = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");
    let resources = context
        .manager
        .discover_resources(server.id())
        .await
        .expect("discovery should succeed");

    assert!(tools.is_empty());
    assert!(resources.is_empty());
    assert!(context.manager.cached_server_ids().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_servers_discover_nothing(context: RegistryContext) {
    let tools = context
        .manager
        .discover_tools(ServerId::new())
        .await
        .expect("discovery should succeed");

    assert!(tools.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cold_discovery_populates_the_cache_from_storage(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;
    context
        .store
        .save_tools(server.id(), server.name(), &[manifest("search")])
        .await
        .expect("save should succeed");

    let tools = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");

    assert_eq!(tools.len(), 1);
    assert_eq!(context.manager.cached_server_ids(), vec![server.id()]);
    assert_eq!(context.manager.get_all_tools(), tools);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn all_tools_span_every_cached_server(context: RegistryContext) {
    let first = add_stdio_server(&*context.store, "alpha", true).await;
    let second = add_stdio_server(&*context.store, "beta", true).await;
    context
        .manager
        .register_tools(
            first.id(),
            first.name(),
            vec![manifest("search"), manifest("open")],
        )
        .await
        .expect("registration should succeed");
    context
        .manager
        .register_tools(second.id(), second.name(), vec![manifest("search")])
        .await
        .expect("registration should succeed");

    assert_eq!(context.manager.get_all_tools().len(), 3);
    assert!(context.manager.get_all_resources().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clearing_the_cache_keeps_persisted_tools(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;
    context
        .manager
        .register_tools(server.id(), server.name(), vec![manifest("search")])
        .await
        .expect("registration should succeed");

    context.manager.clear_tools(server.id());
    assert!(context.manager.get_all_tools().is_empty());

    let tools = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");
    assert_eq!(tools.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_tools_removes_cache_and_storage(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;
    context
        .manager
        .register_tools(
            server.id(),
            server.name(),
            vec![manifest("search"), manifest("open")],
        )
        .await
        .expect("registration should succeed");

    let deleted = context
        .manager
        .delete_tools(server.id())
        .await
        .expect("delete should succeed");
    let tools = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");

    assert_eq!(deleted, 2);
    assert!(tools.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restoring_an_empty_set_evicts_the_cache_entry(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;
    context
        .manager
        .register_tools(server.id(), server.name(), vec![manifest("search")])
        .await
        .expect("registration should succeed");
    context
        .store
        .save_tools(server.id(), server.name(), &[])
        .await
        .expect("save should succeed");

    let restored = context
        .manager
        .restore_tools(server.id())
        .await
        .expect("restore should succeed");

    assert!(restored.is_empty());
    assert!(context.manager.cached_server_ids().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calls_to_disabled_servers_fail(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", false).await;

    let error = context
        .manager
        .call_tool(server.id(), "search", json!({"q": "rust"}))
        .await
        .expect_err("call should fail");

    assert!(matches!(
        error,
        ToolRegistryServiceError::ServerUnavailable(id) if id == server.id()
    ));
    assert!(error.to_string().contains("not found or disabled"));
    assert!(
        context
            .transport
            .invocations()
            .expect("lock should be healthy")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calls_carry_arguments_and_resolved_credentials(context: RegistryContext) {
    let input = NewServerConfig::stdio("github", "npx")
        .expect("valid input")
        .with_env([("GITHUB_TOKEN", "placeholder"), ("LOG_LEVEL", "debug")]);
    let server = context
        .store
        .add_server(input)
        .await
        .expect("add should succeed");
    context
        .injector
        .set_secret(
            server.id(),
            CredentialKey::new("GITHUB_TOKEN").expect("valid key"),
            "ghp_secret",
        )
        .expect("lock should be healthy");
    context
        .transport
        .set_response(server.id(), "search", json!({"hits": 3}))
        .expect("lock should be healthy");

    let result = context
        .manager
        .call_tool(server.id(), "search", json!({"q": "rust"}))
        .await
        .expect("call should succeed");

    assert_eq!(result, json!({"hits": 3}));
    let invocations = context
        .transport
        .invocations()
        .expect("lock should be healthy");
    let invocation = invocations.first().expect("one invocation recorded");
    assert_eq!(invocation.arguments, json!({"q": "rust"}));
    assert_eq!(
        invocation.env.get("GITHUB_TOKEN").map(String::as_str),
        Some("ghp_secret")
    );
    assert_eq!(
        invocation.env.get("LOG_LEVEL").map(String::as_str),
        Some("debug")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_failures_propagate_unchanged(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", true).await;

    let error = context
        .manager
        .call_tool(server.id(), "missing", json!({}))
        .await
        .expect_err("call should fail");

    assert!(matches!(
        error,
        ToolRegistryServiceError::Transport(ToolTransportError::ToolNotFound { ref tool_name, .. })
            if tool_name == "missing"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_all_discovers_enabled_servers_only(context: RegistryContext) {
    let enabled = add_stdio_server(&*context.store, "enabled", true).await;
    let disabled = add_stdio_server(&*context.store, "disabled", false).await;
    for server in [&enabled, &disabled] {
        context
            .store
            .save_tools(server.id(), server.name(), &[manifest("search")])
            .await
            .expect("save should succeed");
    }

    let summary = context
        .manager
        .refresh_all()
        .await
        .expect("refresh should succeed");

    assert_eq!(summary.servers_seen, 2);
    assert_eq!(summary.servers_refreshed, 1);
    assert_eq!(summary.tools_discovered, 1);
    assert_eq!(context.manager.cached_server_ids(), vec![enabled.id()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enabling_a_server_makes_its_tools_discoverable(context: RegistryContext) {
    let server = add_stdio_server(&*context.store, "github", false).await;

    let before = context
        .manager
        .discover_tools(server.id())
        .await
        .expect("discovery should succeed");
    let stored = context
        .manager
        .store()
        .get_server(server.id())
        .await
        .expect("lookup should succeed")
        .expect("server should exist");
    assert!(before.is_empty());
    assert!(!stored.is_enabled());

    let enabled = context
        .manager
        .store()
        .update_server(server.id(), &ServerConfigUpdate::new().with_enabled(true))
        .await
        .expect("update should succeed");
    assert!(enabled);

    context
        .manager
        .register_tools(
            server.id(),
            server.name(),
            vec![manifest("search"), manifest("open")],
        )
        .await
        .expect("registration should succeed");

    assert_eq!(context.manager.get_all_tools().len(), 2);
    assert_eq!(
        context
            .manager
            .discover_tools(server.id())
            .await
            .expect("discovery should succeed")
            .len(),
        2
    );
}
