//! `graph/*` methods.

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
        "graph/create",
        tool(
            "Create a graph under a tenant",
            json!({
                "tenant_id": {"type": "string", "format": "uuid"},
                "name": {"type": "string"}
            }),
            &["tenant_id", "name"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let tenant_id = args::require_uuid(map, "tenant_id")?;
                let name = args::require_str(map, "name")?;
                args::to_json(&c.graph_create(tenant_id, name).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "graph/read",
        tool(
            "Read a graph by GUID",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                args::to_json(&c.graph_read(id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "graph/update",
        tool(
            "Rename a graph",
            json!({
                "id": {"type": "string", "format": "uuid"},
                "name": {"type": "string"}
            }),
            &["id", "name"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                let name = args::require_str(map, "name")?;
                args::to_json(&c.graph_update(id, name).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "graph/delete",
        tool(
            "Delete a graph and its contents",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                c.graph_delete(id).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "graph/exists",
        tool(
            "Whether a graph exists",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                Ok(Value::Bool(c.graph_exists(id).await?))
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "graph/enumerate",
        tool(
            "All graphs of a tenant, in creation order",
            json!({"tenant_id": {"type": "string", "format": "uuid"}}),
            &["tenant_id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let tenant_id = args::require_uuid(map, "tenant_id")?;
                args::to_json(&c.graph_enumerate(tenant_id).await?)
            })
        },
    )?;

    Ok(())
}
