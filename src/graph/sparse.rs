//! Sparse directed graph in compressed form
//!
//! Edges keep the id they were inserted with. Two CSR indexes over those ids
//! (grouped by source and by destination) serve outgoing and incoming
//! traversals without re-sorting at forward time.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GatError, Result};

/// One directed edge `src -> dst`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Edge id (insertion order)
    pub id: usize,
    /// Source node
    pub src: usize,
    /// Destination node
    pub dst: usize,
}

/// Immutable directed graph topology
///
/// Serialized as its node count and edge list; loading goes back through
/// [`Graph::from_edges`], so the CSR indexes are always rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EdgeList", into = "EdgeList")]
pub struct Graph {
    /// Number of nodes
    n_nodes: usize,
    /// Source node per edge id
    src: Vec<usize>,
    /// Destination node per edge id
    dst: Vec<usize>,
    /// out_indptr[u]..out_indptr[u+1] indexes `out_edges` for node u
    out_indptr: Vec<usize>,
    out_edges: Vec<usize>,
    /// in_indptr[v]..in_indptr[v+1] indexes `in_edges` for node v
    in_indptr: Vec<usize>,
    in_edges: Vec<usize>,
}

/// Serialized form of a [`Graph`]
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeList {
    num_nodes: usize,
    edges: Vec<(usize, usize)>,
}

impl TryFrom<EdgeList> for Graph {
    type Error = GatError;

    fn try_from(list: EdgeList) -> Result<Self> {
        Graph::from_edges(list.num_nodes, &list.edges)
    }
}

impl From<Graph> for EdgeList {
    fn from(graph: Graph) -> Self {
        EdgeList {
            num_nodes: graph.n_nodes,
            edges: graph.src.into_iter().zip(graph.dst).collect(),
        }
    }
}

impl Graph {
    /// Create a graph with nodes and no edges
    pub fn new(n_nodes: usize) -> Self {
        Self::assemble(n_nodes, Vec::new(), Vec::new())
    }

    /// Create from an edge list; edge ids follow list order
    pub fn from_edges(n_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        for &(s, d) in edges {
            for node in [s, d] {
                if node >= n_nodes {
                    return Err(GatError::NodeOutOfRange {
                        node,
                        num_nodes: n_nodes,
                    });
                }
            }
        }

        Ok(Self::assemble(
            n_nodes,
            edges.iter().map(|e| e.0).collect(),
            edges.iter().map(|e| e.1).collect(),
        ))
    }

    /// Create from dense adjacency matrix
    ///
    /// A non-zero `adjacency[[i, j]]` becomes the edge `i -> j`; the value
    /// itself is not kept.
    pub fn from_dense(adjacency: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = adjacency.dim();
        if rows != cols {
            return Err(GatError::shape("adjacency matrix", (rows, rows), (rows, cols)));
        }

        let edges: Vec<(usize, usize)> = adjacency
            .indexed_iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(ij, _)| ij)
            .collect();

        Self::from_edges(rows, &edges)
    }

    /// Build the CSR indexes for endpoints already known to be below `n_nodes`
    pub(super) fn assemble(n_nodes: usize, src: Vec<usize>, dst: Vec<usize>) -> Self {
        let (out_indptr, out_edges) = group_by_node(&src, n_nodes);
        let (in_indptr, in_edges) = group_by_node(&dst, n_nodes);

        Self {
            n_nodes,
            src,
            dst,
            out_indptr,
            out_edges,
            in_indptr,
            in_edges,
        }
    }

    /// Get number of nodes
    pub fn num_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Get number of edges
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Edge by id
    pub fn edge(&self, id: usize) -> Edge {
        Edge {
            id,
            src: self.src[id],
            dst: self.dst[id],
        }
    }

    /// All edges in id order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.num_edges()).map(move |id| self.edge(id))
    }

    /// Source node per edge id
    pub fn sources(&self) -> &[usize] {
        &self.src
    }

    /// Destination node per edge id
    pub fn destinations(&self) -> &[usize] {
        &self.dst
    }

    /// Ids of edges ending at `node`, ascending
    pub fn in_edges(&self, node: usize) -> &[usize] {
        &self.in_edges[self.in_indptr[node]..self.in_indptr[node + 1]]
    }

    /// Ids of edges starting at `node`, ascending
    pub fn out_edges(&self, node: usize) -> &[usize] {
        &self.out_edges[self.out_indptr[node]..self.out_indptr[node + 1]]
    }

    /// Source nodes of the edges ending at `node`
    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.in_edges(node).iter().map(move |&e| self.src[e])
    }

    /// Destination nodes of the edges starting at `node`
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.out_edges(node).iter().map(move |&e| self.dst[e])
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.in_indptr[node + 1] - self.in_indptr[node]
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.out_indptr[node + 1] - self.out_indptr[node]
    }

    /// In-degree of every node
    pub fn in_degrees(&self) -> Array1<f64> {
        Array1::from_iter((0..self.n_nodes).map(|v| self.in_degree(v) as f64))
    }

    /// Nodes with no incoming edges
    pub fn nodes_without_in_edges(&self) -> Vec<usize> {
        (0..self.n_nodes).filter(|&v| self.in_degree(v) == 0).collect()
    }

    /// Check if edge exists
    pub fn has_edge(&self, src: usize, dst: usize) -> bool {
        src < self.n_nodes && self.successors(src).any(|d| d == dst)
    }

    /// Add a self-loop to every node that lacks one
    ///
    /// Existing edges keep their ids; the new loops follow in node order.
    pub fn add_self_loops(&self) -> Self {
        let existing = (0..self.n_nodes).filter(|&v| self.has_edge(v, v)).count();
        if existing > 0 {
            warn!(
                existing,
                "graph already has self-loops; keeping them and adding the rest"
            );
        }

        let mut src = self.src.clone();
        let mut dst = self.dst.clone();
        for v in (0..self.n_nodes).filter(|&v| !self.has_edge(v, v)) {
            src.push(v);
            dst.push(v);
        }
        Self::assemble(self.n_nodes, src, dst)
    }
}

/// Stable counting sort of edge ids by node key
fn group_by_node(keys: &[usize], n_nodes: usize) -> (Vec<usize>, Vec<usize>) {
    let mut indptr = vec![0usize; n_nodes + 1];
    for &k in keys {
        indptr[k + 1] += 1;
    }
    for i in 0..n_nodes {
        indptr[i + 1] += indptr[i];
    }

    let mut cursor = indptr[..n_nodes].to_vec();
    let mut order = vec![0usize; keys.len()];
    for (edge_id, &k) in keys.iter().enumerate() {
        order[cursor[k]] = edge_id;
        cursor[k] += 1;
    }

    (indptr, order)
}
