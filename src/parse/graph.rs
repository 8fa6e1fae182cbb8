//! petgraph-based directed graph wrapper for the strategy workflow.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use super::types::Workflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub edge_id: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

pub struct StrategyGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl StrategyGraph {
    /// Build the graph. Edges naming an unknown node are left out, so they
    /// surface later as missing inputs or missing paths instead of failing.
    pub fn build(workflow: &Workflow) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &workflow.nodes {
            let id = node.id().to_string();
            let idx = graph.add_node(id.clone());
            node_indices.insert(id, idx);
        }

        for edge in &workflow.edges {
            match (
                node_indices.get(&edge.source),
                node_indices.get(&edge.target),
            ) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(
                        s,
                        t,
                        EdgeLabel {
                            edge_id: edge.id.clone(),
                            source_handle: edge.source_handle.clone(),
                            target_handle: edge.target_handle.clone(),
                        },
                    );
                }
                _ => {
                    debug!(
                        edge = %edge.id,
                        source = %edge.source,
                        target = %edge.target,
                        "skipping edge with dangling endpoint"
                    );
                }
            }
        }

        StrategyGraph {
            graph,
            node_indices,
        }
    }

    pub fn index(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_indices.get(node_id).copied()
    }

    pub fn node_id(&self, idx: NodeIndex) -> &str {
        self.graph[idx].as_str()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn outgoing_edges(&self, node_id: &str) -> Vec<EdgeReference<'_, EdgeLabel>> {
        self.edges_directed(node_id, Direction::Outgoing)
    }

    pub fn incoming_edges(&self, node_id: &str) -> Vec<EdgeReference<'_, EdgeLabel>> {
        self.edges_directed(node_id, Direction::Incoming)
    }

    /// Source node ids of every incoming edge; parallel edges repeat.
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.incoming_edges(node_id)
            .into_iter()
            .map(|e| self.node_id(e.source()))
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.incoming_edges(node_id).len()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.outgoing_edges(node_id).len()
    }

    fn edges_directed(
        &self,
        node_id: &str,
        direction: Direction,
    ) -> Vec<EdgeReference<'_, EdgeLabel>> {
        let Some(idx) = self.index(node_id) else {
            return vec![];
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        // petgraph walks adjacency lists newest-first; report in insertion order.
        edges.sort_by_key(|e| e.id());
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{NodeBase, NodeData, WorkflowEdge, WorkflowNode};

    fn source(id: &str) -> WorkflowNode {
        WorkflowNode::DataSource(NodeBase {
            id: id.into(),
            position: None,
            data: NodeData::default(),
        })
    }

    fn edge(id: &str, s: &str, t: &str) -> WorkflowEdge {
        WorkflowEdge {
            id: id.into(),
            source: s.into(),
            target: t.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let workflow = Workflow::new(
            vec![source("a"), source("b")],
            vec![edge("e1", "a", "b"), edge("e2", "a", "ghost")],
        );
        let graph = StrategyGraph::build(&workflow);
        assert_eq!(graph.graph.edge_count(), 1);
        assert_eq!(graph.outgoing_count("a"), 1);
        assert_eq!(graph.incoming_count("ghost"), 0);
    }

    #[test]
    fn parallel_edges_are_counted() {
        let workflow = Workflow::new(
            vec![source("a"), source("b")],
            vec![edge("e1", "a", "b"), edge("e2", "a", "b")],
        );
        let graph = StrategyGraph::build(&workflow);
        assert_eq!(graph.incoming_count("b"), 2);
        assert_eq!(graph.predecessors("b"), vec!["a", "a"]);
        let ids: Vec<&str> = graph
            .outgoing_edges("a")
            .iter()
            .map(|e| e.weight().edge_id.as_str())
            .collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }
}
