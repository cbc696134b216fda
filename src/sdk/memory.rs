//! In-memory graph engine.
//!
//! Backs the binary's default wiring and the test suite. One `RwLock` over
//! the whole store keeps the implementation obvious; the gateway only needs
//! an internally synchronized engine, not a fast one.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Direction, Edge, EngineStats, Graph, GraphClient, Node, SdkError, SdkResult, Tenant,
    VectorMatch,
};

#[derive(Default)]
struct Store {
    tenants: HashMap<Uuid, Tenant>,
    tenant_order: Vec<Uuid>,
    graphs: HashMap<Uuid, Graph>,
    graph_order: Vec<Uuid>,
    nodes: HashMap<Uuid, Node>,
    node_order: Vec<Uuid>,
    edges: HashMap<Uuid, Edge>,
    edge_order: Vec<Uuid>,
    /// node GUID -> embedding
    vectors: HashMap<Uuid, Vec<f32>>,
}

impl Store {
    fn tenant(&self, id: Uuid) -> SdkResult<&Tenant> {
        self.tenants.get(&id).ok_or(SdkError::NotFound {
            entity: "tenant",
            id: id.to_string(),
        })
    }

    fn graph(&self, id: Uuid) -> SdkResult<&Graph> {
        self.graphs.get(&id).ok_or(SdkError::NotFound {
            entity: "graph",
            id: id.to_string(),
        })
    }

    fn node(&self, id: Uuid) -> SdkResult<&Node> {
        self.nodes.get(&id).ok_or(SdkError::NotFound {
            entity: "node",
            id: id.to_string(),
        })
    }

    fn remove_node_cascading(&mut self, id: Uuid) {
        self.nodes.remove(&id);
        self.node_order.retain(|n| *n != id);
        self.vectors.remove(&id);
        let dead: Vec<Uuid> = self
            .edges
            .values()
            .filter(|e| e.from == id || e.to == id)
            .map(|e| e.id)
            .collect();
        for edge_id in dead {
            self.edges.remove(&edge_id);
            self.edge_order.retain(|e| *e != edge_id);
        }
    }

    fn remove_graph_cascading(&mut self, id: Uuid) {
        let nodes: Vec<Uuid> = self
            .nodes
            .values()
            .filter(|n| n.graph_id == id)
            .map(|n| n.id)
            .collect();
        for node_id in nodes {
            self.remove_node_cascading(node_id);
        }
        self.graphs.remove(&id);
        self.graph_order.retain(|g| *g != id);
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// In-memory [`GraphClient`] implementation.
#[derive(Default)]
pub struct MemoryGraph {
    store: RwLock<Store>,
}

impl MemoryGraph {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphClient for MemoryGraph {
    async fn tenant_create(&self, name: &str) -> SdkResult<Tenant> {
        let mut store = self.store.write().await;
        if store.tenants.values().any(|t| t.name == name) {
            return Err(SdkError::Conflict {
                details: format!("tenant '{name}' already exists"),
            });
        }
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        store.tenant_order.push(tenant.id);
        store.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn tenant_read(&self, id: Uuid) -> SdkResult<Tenant> {
        Ok(self.store.read().await.tenant(id)?.clone())
    }

    async fn tenant_update(&self, id: Uuid, name: &str) -> SdkResult<Tenant> {
        let mut store = self.store.write().await;
        store.tenant(id)?;
        if store.tenants.values().any(|t| t.name == name && t.id != id) {
            return Err(SdkError::Conflict {
                details: format!("tenant '{name}' already exists"),
            });
        }
        let tenant = store.tenants.get_mut(&id).ok_or(SdkError::NotFound {
            entity: "tenant",
            id: id.to_string(),
        })?;
        tenant.name = name.to_string();
        Ok(tenant.clone())
    }

    async fn tenant_delete(&self, id: Uuid) -> SdkResult<()> {
        let mut store = self.store.write().await;
        store.tenant(id)?;
        let graphs: Vec<Uuid> = store
            .graphs
            .values()
            .filter(|g| g.tenant_id == id)
            .map(|g| g.id)
            .collect();
        for graph_id in graphs {
            store.remove_graph_cascading(graph_id);
        }
        store.tenants.remove(&id);
        store.tenant_order.retain(|t| *t != id);
        Ok(())
    }

    async fn tenant_exists(&self, id: Uuid) -> SdkResult<bool> {
        Ok(self.store.read().await.tenants.contains_key(&id))
    }

    async fn tenant_enumerate(&self) -> SdkResult<Vec<Tenant>> {
        let store = self.store.read().await;
        Ok(store
            .tenant_order
            .iter()
            .filter_map(|id| store.tenants.get(id).cloned())
            .collect())
    }

    async fn graph_create(&self, tenant_id: Uuid, name: &str) -> SdkResult<Graph> {
        let mut store = self.store.write().await;
        store.tenant(tenant_id)?;
        if store
            .graphs
            .values()
            .any(|g| g.tenant_id == tenant_id && g.name == name)
        {
            return Err(SdkError::Conflict {
                details: format!("graph '{name}' already exists in tenant"),
            });
        }
        let graph = Graph {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
        };
        store.graph_order.push(graph.id);
        store.graphs.insert(graph.id, graph.clone());
        Ok(graph)
    }

    async fn graph_read(&self, id: Uuid) -> SdkResult<Graph> {
        Ok(self.store.read().await.graph(id)?.clone())
    }

    async fn graph_update(&self, id: Uuid, name: &str) -> SdkResult<Graph> {
        let mut store = self.store.write().await;
        let tenant_id = store.graph(id)?.tenant_id;
        if store
            .graphs
            .values()
            .any(|g| g.tenant_id == tenant_id && g.name == name && g.id != id)
        {
            return Err(SdkError::Conflict {
                details: format!("graph '{name}' already exists in tenant"),
            });
        }
        let graph = store.graphs.get_mut(&id).ok_or(SdkError::NotFound {
            entity: "graph",
            id: id.to_string(),
        })?;
        graph.name = name.to_string();
        Ok(graph.clone())
    }

    async fn graph_delete(&self, id: Uuid) -> SdkResult<()> {
        let mut store = self.store.write().await;
        store.graph(id)?;
        store.remove_graph_cascading(id);
        Ok(())
    }

    async fn graph_exists(&self, id: Uuid) -> SdkResult<bool> {
        Ok(self.store.read().await.graphs.contains_key(&id))
    }

    async fn graph_enumerate(&self, tenant_id: Uuid) -> SdkResult<Vec<Graph>> {
        let store = self.store.read().await;
        store.tenant(tenant_id)?;
        Ok(store
            .graph_order
            .iter()
            .filter_map(|id| store.graphs.get(id))
            .filter(|g| g.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn node_create(
        &self,
        graph_id: Uuid,
        name: &str,
        labels: Vec<String>,
        data: Value,
    ) -> SdkResult<Node> {
        let mut store = self.store.write().await;
        store.graph(graph_id)?;
        let node = Node {
            id: Uuid::new_v4(),
            graph_id,
            name: name.to_string(),
            labels,
            data,
        };
        store.node_order.push(node.id);
        store.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn node_read(&self, id: Uuid) -> SdkResult<Node> {
        Ok(self.store.read().await.node(id)?.clone())
    }

    async fn node_update(
        &self,
        id: Uuid,
        name: &str,
        labels: Vec<String>,
        data: Value,
    ) -> SdkResult<Node> {
        let mut store = self.store.write().await;
        store.node(id)?;
        let node = store.nodes.get_mut(&id).ok_or(SdkError::NotFound {
            entity: "node",
            id: id.to_string(),
        })?;
        node.name = name.to_string();
        node.labels = labels;
        node.data = data;
        Ok(node.clone())
    }

    async fn node_delete(&self, id: Uuid) -> SdkResult<()> {
        let mut store = self.store.write().await;
        store.node(id)?;
        store.remove_node_cascading(id);
        Ok(())
    }

    async fn node_exists(&self, id: Uuid) -> SdkResult<bool> {
        Ok(self.store.read().await.nodes.contains_key(&id))
    }

    async fn node_enumerate(&self, graph_id: Uuid) -> SdkResult<Vec<Node>> {
        let store = self.store.read().await;
        store.graph(graph_id)?;
        Ok(store
            .node_order
            .iter()
            .filter_map(|id| store.nodes.get(id))
            .filter(|n| n.graph_id == graph_id)
            .cloned()
            .collect())
    }

    async fn node_traverse(&self, id: Uuid, direction: Direction) -> SdkResult<Vec<Node>> {
        let store = self.store.read().await;
        store.node(id)?;
        let mut neighbor_ids: Vec<Uuid> = Vec::new();
        for edge in store.edge_order.iter().filter_map(|e| store.edges.get(e)) {
            let neighbor = match direction {
                Direction::Out if edge.from == id => Some(edge.to),
                Direction::In if edge.to == id => Some(edge.from),
                Direction::Both if edge.from == id => Some(edge.to),
                Direction::Both if edge.to == id => Some(edge.from),
                _ => None,
            };
            if let Some(n) = neighbor {
                if !neighbor_ids.contains(&n) {
                    neighbor_ids.push(n);
                }
            }
        }
        Ok(neighbor_ids
            .into_iter()
            .filter_map(|n| store.nodes.get(&n).cloned())
            .collect())
    }

    async fn edge_create(&self, from: Uuid, to: Uuid, label: &str, data: Value) -> SdkResult<Edge> {
        let mut store = self.store.write().await;
        let from_node = store.node(from)?;
        let graph_id = from_node.graph_id;
        let to_node = store.node(to)?;
        if to_node.graph_id != graph_id {
            return Err(SdkError::Conflict {
                details: "edge endpoints belong to different graphs".to_string(),
            });
        }
        let edge = Edge {
            id: Uuid::new_v4(),
            graph_id,
            from,
            to,
            label: label.to_string(),
            data,
        };
        store.edge_order.push(edge.id);
        store.edges.insert(edge.id, edge.clone());
        Ok(edge)
    }

    async fn edge_read(&self, id: Uuid) -> SdkResult<Edge> {
        self.store
            .read()
            .await
            .edges
            .get(&id)
            .cloned()
            .ok_or(SdkError::NotFound {
                entity: "edge",
                id: id.to_string(),
            })
    }

    async fn edge_delete(&self, id: Uuid) -> SdkResult<()> {
        let mut store = self.store.write().await;
        if store.edges.remove(&id).is_none() {
            return Err(SdkError::NotFound {
                entity: "edge",
                id: id.to_string(),
            });
        }
        store.edge_order.retain(|e| *e != id);
        Ok(())
    }

    async fn edge_exists(&self, id: Uuid) -> SdkResult<bool> {
        Ok(self.store.read().await.edges.contains_key(&id))
    }

    async fn edge_enumerate(&self, graph_id: Uuid) -> SdkResult<Vec<Edge>> {
        let store = self.store.read().await;
        store.graph(graph_id)?;
        Ok(store
            .edge_order
            .iter()
            .filter_map(|id| store.edges.get(id))
            .filter(|e| e.graph_id == graph_id)
            .cloned()
            .collect())
    }

    async fn edge_search(
        &self,
        graph_id: Uuid,
        label: Option<&str>,
        node_id: Option<Uuid>,
    ) -> SdkResult<Vec<Edge>> {
        let store = self.store.read().await;
        store.graph(graph_id)?;
        Ok(store
            .edge_order
            .iter()
            .filter_map(|id| store.edges.get(id))
            .filter(|e| e.graph_id == graph_id)
            .filter(|e| label.is_none_or(|l| e.label == l))
            .filter(|e| node_id.is_none_or(|n| e.from == n || e.to == n))
            .cloned()
            .collect())
    }

    async fn vector_upsert(&self, node_id: Uuid, embedding: Vec<f32>) -> SdkResult<()> {
        let mut store = self.store.write().await;
        store.node(node_id)?;
        store.vectors.insert(node_id, embedding);
        Ok(())
    }

    async fn vector_delete(&self, node_id: Uuid) -> SdkResult<()> {
        let mut store = self.store.write().await;
        if store.vectors.remove(&node_id).is_none() {
            return Err(SdkError::NotFound {
                entity: "vector",
                id: node_id.to_string(),
            });
        }
        Ok(())
    }

    async fn vector_search(
        &self,
        graph_id: Uuid,
        query: Vec<f32>,
        top_k: usize,
    ) -> SdkResult<Vec<VectorMatch>> {
        let store = self.store.read().await;
        store.graph(graph_id)?;
        // Embeddings whose dimension differs from the query are skipped
        // outright; scoring them would silently truncate to the shorter
        // length.
        let mut matches: Vec<VectorMatch> = store
            .vectors
            .iter()
            .filter(|(node_id, embedding)| {
                embedding.len() == query.len()
                    && store
                        .nodes
                        .get(node_id)
                        .is_some_and(|n| n.graph_id == graph_id)
            })
            .map(|(node_id, embedding)| VectorMatch {
                node_id: *node_id,
                score: cosine(&query, embedding),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn admin_stats(&self) -> SdkResult<EngineStats> {
        let store = self.store.read().await;
        Ok(EngineStats {
            tenants: store.tenants.len(),
            graphs: store.graphs.len(),
            nodes: store.nodes.len(),
            edges: store.edges.len(),
            vectors: store.vectors.len(),
        })
    }

    async fn admin_backup(&self) -> SdkResult<Value> {
        let store = self.store.read().await;
        let tenants: Vec<&Tenant> = store
            .tenant_order
            .iter()
            .filter_map(|id| store.tenants.get(id))
            .collect();
        let graphs: Vec<&Graph> = store
            .graph_order
            .iter()
            .filter_map(|id| store.graphs.get(id))
            .collect();
        let nodes: Vec<&Node> = store
            .node_order
            .iter()
            .filter_map(|id| store.nodes.get(id))
            .collect();
        let edges: Vec<&Edge> = store
            .edge_order
            .iter()
            .filter_map(|id| store.edges.get(id))
            .collect();
        serde_json::to_value(serde_json::json!({
            "tenants": tenants,
            "graphs": graphs,
            "nodes": nodes,
            "edges": edges,
        }))
        .map_err(|e| SdkError::Unavailable {
            details: format!("backup serialization failed: {e}"),
        })
    }
}
