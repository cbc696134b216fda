//! `node/*` methods.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{args, tool};
use crate::error::GateError;
use crate::registry::{MethodRegistry, RegistryError};
use crate::sdk::{Direction, GraphClient};

fn parse_direction(raw: Option<&str>) -> Result<Direction, GateError> {
    match raw {
        None | Some("both") => Ok(Direction::Both),
        Some("out") => Ok(Direction::Out),
        Some("in") => Ok(Direction::In),
        Some(other) => Err(GateError::InvalidArguments {
            details: format!("'direction' must be one of out, in, both (got '{other}')"),
        }),
    }
}

pub(super) fn register(
    registry: &mut MethodRegistry,
    client: &Arc<dyn GraphClient>,
) -> Result<(), RegistryError> {
    let c = Arc::clone(client);
    registry.register_tool(
        "node/create",
        tool(
            "Create a node in a graph",
            json!({
                "graph_id": {"type": "string", "format": "uuid"},
                "name": {"type": "string"},
                "labels": {"type": "array", "items": {"type": "string"}},
                "data": {}
            }),
            &["graph_id", "name"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let graph_id = args::require_uuid(map, "graph_id")?;
                let name = args::require_str(map, "name")?;
                let labels = args::optional_string_array(map, "labels")?;
                let data = args::optional_value(map, "data");
                args::to_json(&c.node_create(graph_id, name, labels, data).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/read",
        tool(
            "Read a node by GUID",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                args::to_json(&c.node_read(id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/update",
        tool(
            "Replace a node's name, labels, and payload",
            json!({
                "id": {"type": "string", "format": "uuid"},
                "name": {"type": "string"},
                "labels": {"type": "array", "items": {"type": "string"}},
                "data": {}
            }),
            &["id", "name"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                let name = args::require_str(map, "name")?;
                let labels = args::optional_string_array(map, "labels")?;
                let data = args::optional_value(map, "data");
                args::to_json(&c.node_update(id, name, labels, data).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/delete",
        tool(
            "Delete a node and its incident edges",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                c.node_delete(id).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/exists",
        tool(
            "Whether a node exists",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                Ok(Value::Bool(c.node_exists(id).await?))
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/enumerate",
        tool(
            "All nodes of a graph, in creation order",
            json!({"graph_id": {"type": "string", "format": "uuid"}}),
            &["graph_id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let graph_id = args::require_uuid(map, "graph_id")?;
                args::to_json(&c.node_enumerate(graph_id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "node/traverse",
        tool(
            "Neighbors of a node reachable over one edge hop",
            json!({
                "id": {"type": "string", "format": "uuid"},
                "direction": {"type": "string", "enum": ["out", "in", "both"]}
            }),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                let direction = parse_direction(args::optional_str(map, "direction")?)?;
                args::to_json(&c.node_traverse(id, direction).await?)
            })
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_defaults_to_both() {
        assert_eq!(parse_direction(None).unwrap(), Direction::Both);
        assert_eq!(parse_direction(Some("out")).unwrap(), Direction::Out);
        assert_eq!(parse_direction(Some("in")).unwrap(), Direction::In);
        assert!(parse_direction(Some("sideways")).is_err());
    }
}
