//! `edge/*` methods.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{args, tool};
use crate::registry::{MethodRegistry, RegistryError};
use crate::sdk::GraphClient;

pub(super) fn register(
    registry: &mut MethodRegistry,
    client: &Arc<dyn GraphClient>,
) -> Result<(), RegistryError> {
    let c = Arc::clone(client);
    registry.register_tool(
        "edge/create",
        tool(
            "Create a labeled edge between two nodes of the same graph",
            json!({
                "from": {"type": "string", "format": "uuid"},
                "to": {"type": "string", "format": "uuid"},
                "label": {"type": "string"},
                "data": {}
            }),
            &["from", "to", "label"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let from = args::require_uuid(map, "from")?;
                let to = args::require_uuid(map, "to")?;
                let label = args::require_str(map, "label")?;
                let data = args::optional_value(map, "data");
                args::to_json(&c.edge_create(from, to, label, data).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "edge/read",
        tool(
            "Read an edge by GUID",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                args::to_json(&c.edge_read(id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "edge/delete",
        tool(
            "Delete an edge",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                c.edge_delete(id).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "edge/exists",
        tool(
            "Whether an edge exists",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                Ok(Value::Bool(c.edge_exists(id).await?))
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "edge/enumerate",
        tool(
            "All edges of a graph, in creation order",
            json!({"graph_id": {"type": "string", "format": "uuid"}}),
            &["graph_id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let graph_id = args::require_uuid(map, "graph_id")?;
                args::to_json(&c.edge_enumerate(graph_id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "edge/search",
        tool(
            "Edges of a graph filtered by label and/or endpoint",
            json!({
                "graph_id": {"type": "string", "format": "uuid"},
                "label": {"type": "string"},
                "node_id": {"type": "string", "format": "uuid"}
            }),
            &["graph_id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let graph_id = args::require_uuid(map, "graph_id")?;
                let label = args::optional_str(map, "label")?;
                let node_id = args::optional_uuid(map, "node_id")?;
                args::to_json(&c.edge_search(graph_id, label, node_id).await?)
            })
        },
    )?;

    Ok(())
}
