//! The downstream graph SDK surface.
//!
//! Handlers depend only on the [`GraphClient`] trait: an async black box
//! offering CRUD, traversal, search, and admin operations keyed by
//! tenant/graph/entity GUIDs. The trait object is shared (`Arc`) across all
//! concurrent handler invocations; implementations must be internally
//! synchronized, and the dispatcher never serializes access to them.
//!
//! The engine's own failures surface as [`SdkError`] and are normalized into
//! the gateway taxonomy at the dispatch boundary.

pub mod memory;

pub use memory::MemoryGraph;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::error::GateError;

/// Errors reported by the downstream graph engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SdkError {
    /// The referenced entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity type (tenant, graph, node, edge, vector)
        entity: &'static str,
        /// The missing identifier
        id: String,
    },

    /// The operation conflicts with existing state (e.g. duplicate create).
    #[error("conflict: {details}")]
    Conflict {
        /// Description of the conflict
        details: String,
    },

    /// The engine is unreachable or refused the call.
    #[error("graph engine unavailable: {details}")]
    Unavailable {
        /// Description of the failure
        details: String,
    },
}

impl From<SdkError> for GateError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::NotFound { entity, id } => GateError::NotFound {
                entity: entity.to_string(),
                id,
            },
            SdkError::Conflict { details } => GateError::Conflict { details },
            SdkError::Unavailable { details } => GateError::Unavailable { reason: details },
        }
    }
}

/// Result alias for SDK calls.
pub type SdkResult<T> = Result<T, SdkError>;

/// A tenant: the top-level isolation unit. Graphs live inside tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant GUID
    pub id: Uuid,
    /// Display name
    pub name: String,
}

/// A graph within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph GUID
    pub id: Uuid,
    /// Owning tenant
    pub tenant_id: Uuid,
    /// Display name
    pub name: String,
}

/// A node within a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Node GUID
    pub id: Uuid,
    /// Owning graph
    pub graph_id: Uuid,
    /// Display name
    pub name: String,
    /// Labels attached to the node
    #[serde(default)]
    pub labels: Vec<String>,
    /// Free-form JSON payload
    #[serde(default)]
    pub data: Value,
}

/// A directed, labeled edge between two nodes of the same graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Edge GUID
    pub id: Uuid,
    /// Owning graph
    pub graph_id: Uuid,
    /// Source node GUID
    pub from: Uuid,
    /// Target node GUID
    pub to: Uuid,
    /// Edge label (relationship type)
    pub label: String,
    /// Free-form JSON payload
    #[serde(default)]
    pub data: Value,
}

/// A vector attached to a node for similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// The node this embedding belongs to
    pub node_id: Uuid,
    /// The embedding itself
    pub embedding: Vec<f32>,
}

/// One vector-search hit: a node GUID with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    /// The matched node
    pub node_id: Uuid,
    /// Cosine similarity in `[-1, 1]`
    pub score: f32,
}

/// Direction selector for neighbor traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow outgoing edges only
    Out,
    /// Follow incoming edges only
    In,
    /// Follow edges in both directions
    Both,
}

/// Counts reported by `admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Number of tenants
    pub tenants: usize,
    /// Number of graphs across all tenants
    pub graphs: usize,
    /// Number of nodes across all graphs
    pub nodes: usize,
    /// Number of edges across all graphs
    pub edges: usize,
    /// Number of stored vectors
    pub vectors: usize,
}

/// Async client surface of the downstream graph engine.
///
/// Every handler body is a thin adapter over exactly one of these calls.
#[async_trait]
pub trait GraphClient: Send + Sync {
    // ── Tenants ─────────────────────────────────────────────────────────

    /// Create a tenant. Fails with `Conflict` on duplicate name.
    async fn tenant_create(&self, name: &str) -> SdkResult<Tenant>;
    /// Read a tenant by GUID.
    async fn tenant_read(&self, id: Uuid) -> SdkResult<Tenant>;
    /// Rename a tenant.
    async fn tenant_update(&self, id: Uuid, name: &str) -> SdkResult<Tenant>;
    /// Delete a tenant and everything inside it.
    async fn tenant_delete(&self, id: Uuid) -> SdkResult<()>;
    /// Whether a tenant exists.
    async fn tenant_exists(&self, id: Uuid) -> SdkResult<bool>;
    /// All tenants, in creation order.
    async fn tenant_enumerate(&self) -> SdkResult<Vec<Tenant>>;

    // ── Graphs ──────────────────────────────────────────────────────────

    /// Create a graph under a tenant.
    async fn graph_create(&self, tenant_id: Uuid, name: &str) -> SdkResult<Graph>;
    /// Read a graph by GUID.
    async fn graph_read(&self, id: Uuid) -> SdkResult<Graph>;
    /// Rename a graph.
    async fn graph_update(&self, id: Uuid, name: &str) -> SdkResult<Graph>;
    /// Delete a graph and its contents.
    async fn graph_delete(&self, id: Uuid) -> SdkResult<()>;
    /// Whether a graph exists.
    async fn graph_exists(&self, id: Uuid) -> SdkResult<bool>;
    /// All graphs of a tenant, in creation order.
    async fn graph_enumerate(&self, tenant_id: Uuid) -> SdkResult<Vec<Graph>>;

    // ── Nodes ───────────────────────────────────────────────────────────

    /// Create a node in a graph.
    async fn node_create(
        &self,
        graph_id: Uuid,
        name: &str,
        labels: Vec<String>,
        data: Value,
    ) -> SdkResult<Node>;
    /// Read a node by GUID.
    async fn node_read(&self, id: Uuid) -> SdkResult<Node>;
    /// Replace a node's name, labels, and payload.
    async fn node_update(
        &self,
        id: Uuid,
        name: &str,
        labels: Vec<String>,
        data: Value,
    ) -> SdkResult<Node>;
    /// Delete a node and its incident edges.
    async fn node_delete(&self, id: Uuid) -> SdkResult<()>;
    /// Whether a node exists.
    async fn node_exists(&self, id: Uuid) -> SdkResult<bool>;
    /// All nodes of a graph, in creation order.
    async fn node_enumerate(&self, graph_id: Uuid) -> SdkResult<Vec<Node>>;
    /// Neighbors of a node reachable over one edge hop.
    async fn node_traverse(&self, id: Uuid, direction: Direction) -> SdkResult<Vec<Node>>;

    // ── Edges ───────────────────────────────────────────────────────────

    /// Create an edge between two nodes of the same graph.
    async fn edge_create(&self, from: Uuid, to: Uuid, label: &str, data: Value) -> SdkResult<Edge>;
    /// Read an edge by GUID.
    async fn edge_read(&self, id: Uuid) -> SdkResult<Edge>;
    /// Delete an edge.
    async fn edge_delete(&self, id: Uuid) -> SdkResult<()>;
    /// Whether an edge exists.
    async fn edge_exists(&self, id: Uuid) -> SdkResult<bool>;
    /// All edges of a graph, in creation order.
    async fn edge_enumerate(&self, graph_id: Uuid) -> SdkResult<Vec<Edge>>;
    /// Edges of a graph filtered by label and/or endpoint.
    async fn edge_search(
        &self,
        graph_id: Uuid,
        label: Option<&str>,
        node_id: Option<Uuid>,
    ) -> SdkResult<Vec<Edge>>;

    // ── Vectors ─────────────────────────────────────────────────────────

    /// Attach (or replace) an embedding for a node.
    async fn vector_upsert(&self, node_id: Uuid, embedding: Vec<f32>) -> SdkResult<()>;
    /// Remove a node's embedding.
    async fn vector_delete(&self, node_id: Uuid) -> SdkResult<()>;
    /// Top-k cosine-similarity search within a graph. Entries whose
    /// embedding dimension differs from the query are not scored.
    async fn vector_search(
        &self,
        graph_id: Uuid,
        query: Vec<f32>,
        top_k: usize,
    ) -> SdkResult<Vec<VectorMatch>>;

    // ── Admin ───────────────────────────────────────────────────────────

    /// Entity counts for the whole engine.
    async fn admin_stats(&self) -> SdkResult<EngineStats>;
    /// Full JSON dump of the engine state.
    async fn admin_backup(&self) -> SdkResult<Value>;
}
