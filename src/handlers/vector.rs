//! `vector/*` methods.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{args, tool};
use crate::registry::{MethodRegistry, RegistryError};
use crate::sdk::GraphClient;

const DEFAULT_TOP_K: usize = 10;

pub(super) fn register(
    registry: &mut MethodRegistry,
    client: &Arc<dyn GraphClient>,
) -> Result<(), RegistryError> {
    let c = Arc::clone(client);
    registry.register_tool(
        "vector/upsert",
        tool(
            "Attach or replace a node's embedding",
            json!({
                "node_id": {"type": "string", "format": "uuid"},
                "embedding": {"type": "array", "items": {"type": "number"}}
            }),
            &["node_id", "embedding"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let node_id = args::require_uuid(map, "node_id")?;
                let embedding = args::require_f32_array(map, "embedding")?;
                c.vector_upsert(node_id, embedding).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "vector/delete",
        tool(
            "Remove a node's embedding",
            json!({"node_id": {"type": "string", "format": "uuid"}}),
            &["node_id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let node_id = args::require_uuid(map, "node_id")?;
                c.vector_delete(node_id).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "vector/search",
        tool(
            "Top-k cosine-similarity search within a graph",
            json!({
                "graph_id": {"type": "string", "format": "uuid"},
                "query": {"type": "array", "items": {"type": "number"}},
                "top_k": {"type": "integer", "minimum": 1}
            }),
            &["graph_id", "query"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let graph_id = args::require_uuid(map, "graph_id")?;
                let query = args::require_f32_array(map, "query")?;
                let top_k = args::optional_usize(map, "top_k", DEFAULT_TOP_K)?;
                args::to_json(&c.vector_search(graph_id, query, top_k).await?)
            })
        },
    )?;

    Ok(())
}
