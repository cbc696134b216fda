//! `tenant/*` methods.

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
        "tenant/create",
        tool(
            "Create a tenant",
            json!({"name": {"type": "string"}}),
            &["name"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let name = args::require_str(map, "name")?;
                args::to_json(&c.tenant_create(name).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "tenant/read",
        tool(
            "Read a tenant by GUID",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                args::to_json(&c.tenant_read(id).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "tenant/update",
        tool(
            "Rename a tenant",
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
                args::to_json(&c.tenant_update(id, name).await?)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "tenant/delete",
        tool(
            "Delete a tenant and all its graphs",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                c.tenant_delete(id).await?;
                Ok(Value::Null)
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "tenant/exists",
        tool(
            "Whether a tenant exists",
            json!({"id": {"type": "string", "format": "uuid"}}),
            &["id"],
        ),
        move |args| {
            let c = Arc::clone(&c);
            Box::pin(async move {
                let map = args::object(&args)?;
                let id = args::require_uuid(map, "id")?;
                Ok(Value::Bool(c.tenant_exists(id).await?))
            })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "tenant/enumerate",
        tool("All tenants, in creation order", json!({}), &[]),
        move |_args| {
            let c = Arc::clone(&c);
            Box::pin(async move { args::to_json(&c.tenant_enumerate().await?) })
        },
    )?;

    Ok(())
}
