//! Handler registration: the complete method surface of the gateway.
//!
//! Every method is registered exactly once, here, and served identically by
//! all transport bindings. Each handler body is a thin adapter: extract typed
//! arguments, make exactly one `GraphClient` call, serialize the result.

pub mod args;

mod admin;
mod edge;
mod graph;
mod node;
mod tenant;
mod vector;

use std::sync::Arc;

use serde_json::{Value, json};

use crate::registry::{MethodRegistry, RegistryError, ToolMetadata};
use crate::sdk::GraphClient;

/// Build advisory tool metadata for one method.
fn tool(description: &str, properties: Value, required: &[&str]) -> ToolMetadata {
    ToolMetadata {
        description: description.to_string(),
        schema: json!({
            "type": "object",
            "properties": properties,
        }),
        required: required.iter().map(|s| s.to_string()).collect(),
    }
}

/// Register the full method surface against one shared graph client.
///
/// Called once at startup; any error here (duplicate or malformed name) is a
/// wiring bug and aborts the process.
pub fn register_all(
    registry: &mut MethodRegistry,
    client: Arc<dyn GraphClient>,
) -> Result<(), RegistryError> {
    registry.register_tool(
        "echo/ping",
        tool("Echo the arguments back unchanged", json!({}), &[]),
        |args| Box::pin(async move { Ok(args.unwrap_or_else(|| json!({}))) }),
    )?;

    tenant::register(registry, &client)?;
    graph::register(registry, &client)?;
    node::register(registry, &client)?;
    edge::register(registry, &client)?;
    vector::register(registry, &client)?;
    admin::register(registry, &client)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::envelope::RequestEnvelope;
    use crate::sdk::MemoryGraph;

    fn full_dispatcher() -> Dispatcher {
        let mut registry = MethodRegistry::new();
        register_all(&mut registry, Arc::new(MemoryGraph::new())).unwrap();
        Dispatcher::new(Arc::new(registry), None)
    }

    async fn call(d: &Dispatcher, method: &str, args: Value) -> crate::envelope::ResponseEnvelope {
        d.dispatch(RequestEnvelope::new(None, method, Some(args)))
            .await
    }

    #[test]
    fn registration_is_conflict_free() {
        let mut registry = MethodRegistry::new();
        register_all(&mut registry, Arc::new(MemoryGraph::new())).unwrap();
        assert!(registry.len() > 25);
        // Every registered method carries discovery metadata.
        for (name, metadata) in registry.list_tools() {
            assert!(metadata.is_some(), "{name} has no metadata");
        }
    }

    #[tokio::test]
    async fn create_read_round_trip_through_dispatch() {
        let d = full_dispatcher();

        let tenant = call(&d, "tenant/create", json!({"name": "acme"}))
            .await
            .result
            .unwrap();
        let tenant_id = tenant["id"].as_str().unwrap().to_string();

        let graph = call(&d, "graph/create", json!({"tenant_id": tenant_id, "name": "g"}))
            .await
            .result
            .unwrap();
        let graph_id = graph["id"].as_str().unwrap().to_string();

        let node = call(
            &d,
            "node/create",
            json!({"graph_id": graph_id, "name": "n", "labels": ["person"]}),
        )
        .await
        .result
        .unwrap();

        let read = call(&d, "node/read", json!({"id": node["id"]}))
            .await
            .result
            .unwrap();
        assert_eq!(read["name"], "n");
        assert_eq!(read["labels"][0], "person");
    }

    #[tokio::test]
    async fn exists_returns_plain_boolean() {
        let d = full_dispatcher();
        let resp = call(
            &d,
            "tenant/exists",
            json!({"id": uuid::Uuid::new_v4().to_string()}),
        )
        .await;
        assert_eq!(resp.result.unwrap(), Value::Bool(false));
    }

    #[tokio::test]
    async fn missing_argument_is_invalid_arguments() {
        let d = full_dispatcher();
        let resp = call(&d, "tenant/create", json!({})).await;
        let err = resp.error.unwrap();
        assert_eq!(err.kind, "invalid_arguments");
        assert!(err.message.contains("'name'"));
    }

    #[tokio::test]
    async fn sdk_not_found_surfaces_as_not_found() {
        let d = full_dispatcher();
        let resp = call(
            &d,
            "node/read",
            json!({"id": uuid::Uuid::new_v4().to_string()}),
        )
        .await;
        assert_eq!(resp.error.unwrap().kind, "not_found");
    }

    #[tokio::test]
    async fn duplicate_tenant_is_conflict() {
        let d = full_dispatcher();
        call(&d, "tenant/create", json!({"name": "acme"})).await;
        let resp = call(&d, "tenant/create", json!({"name": "acme"})).await;
        assert_eq!(resp.error.unwrap().kind, "conflict");
    }

    #[tokio::test]
    async fn vector_flow_end_to_end() {
        let d = full_dispatcher();
        let tenant = call(&d, "tenant/create", json!({"name": "t"}))
            .await
            .result
            .unwrap();
        let graph = call(
            &d,
            "graph/create",
            json!({"tenant_id": tenant["id"], "name": "g"}),
        )
        .await
        .result
        .unwrap();
        let node = call(
            &d,
            "node/create",
            json!({"graph_id": graph["id"], "name": "n"}),
        )
        .await
        .result
        .unwrap();

        let up = call(
            &d,
            "vector/upsert",
            json!({"node_id": node["id"], "embedding": [1.0, 0.0]}),
        )
        .await;
        assert!(up.error.is_none());

        let hits = call(
            &d,
            "vector/search",
            json!({"graph_id": graph["id"], "query": [1.0, 0.0], "top_k": 5}),
        )
        .await
        .result
        .unwrap();
        assert_eq!(hits[0]["node_id"], node["id"]);
    }
}
