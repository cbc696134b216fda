//! `admin/*` methods.

use std::sync::Arc;

use serde_json::json;

use super::{args, tool};
use crate::registry::{MethodRegistry, RegistryError};
use crate::sdk::GraphClient;

pub(super) fn register(
    registry: &mut MethodRegistry,
    client: &Arc<dyn GraphClient>,
) -> Result<(), RegistryError> {
    let c = Arc::clone(client);
    registry.register_tool(
        "admin/stats",
        tool("Entity counts for the whole engine", json!({}), &[]),
        move |_args| {
            let c = Arc::clone(&c);
            Box::pin(async move { args::to_json(&c.admin_stats().await?) })
        },
    )?;

    let c = Arc::clone(client);
    registry.register_tool(
        "admin/backup",
        tool("Full JSON dump of the engine state", json!({}), &[]),
        move |_args| {
            let c = Arc::clone(&c);
            Box::pin(async move { Ok(c.admin_backup().await?) })
        },
    )?;

    Ok(())
}
