use orx_priority_queue::*;

use crate::error::Result;
use crate::graph::{Cost, DirectedEdge, NodeId, WeightedDigraph};

/// Single-source shortest paths over a non-negatively weighted digraph.
///
/// All work happens in [`DijkstraShortestPath::new`]; the queries afterwards
/// only read `dist_to` and `edge_to`.
#[derive(Debug)]
pub struct DijkstraShortestPath<'g> {
    graph: &'g WeightedDigraph,
    source: NodeId,
    dist_to: Vec<Cost>,
    edge_to: Vec<Option<DirectedEdge>>,
}

impl<'g> DijkstraShortestPath<'g> {
    /// Dijkstra from `source` to all vertices. Unreachable vertices keep `f64::INFINITY`.
    pub fn new(graph: &'g WeightedDigraph, source: NodeId) -> Result<Self> {
        graph.check_vertex(source)?;

        let n = graph.vertex_count();
        let mut dist_to = vec![Cost::INFINITY; n];
        let mut edge_to: Vec<Option<DirectedEdge>> = vec![None; n];
        // Indexed min-heap: a vertex is in the queue at most once, keyed by dist_to.
        let mut pq: BinaryHeapWithMap<NodeId, Cost> = BinaryHeapWithMap::new();

        dist_to[source] = 0.0;
        pq.push(source, 0.0);

        while let Some((node_id, cost)) = pq.pop() {
            for edge in graph.edges_from(node_id)? {
                let next_cost = cost + edge.weight;
                // Strict: the first edge to reach the minimum keeps it.
                if next_cost < dist_to[edge.to] {
                    dist_to[edge.to] = next_cost;
                    edge_to[edge.to] = Some(*edge);
                    pq.decrease_key_or_push(&edge.to, next_cost);
                }
            }
        }

        Ok(Self {
            graph,
            source,
            dist_to,
            edge_to,
        })
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn distance_to(&self, v: NodeId) -> Result<Cost> {
        self.graph.check_vertex(v)?;
        Ok(self.dist_to[v])
    }

    pub fn has_path_to(&self, v: NodeId) -> Result<bool> {
        Ok(self.distance_to(v)? < Cost::INFINITY)
    }

    /// Edges from the source to `v` in travel order, `None` when `v` is unreachable.
    /// The path to the source itself is empty.
    pub fn path_to(&self, v: NodeId) -> Result<Option<Vec<DirectedEdge>>> {
        if !self.has_path_to(v)? {
            return Ok(None);
        }

        let mut path = Vec::new();
        let mut current = self.edge_to[v];
        // Trace back from v to the source
        while let Some(edge) = current {
            path.push(edge);
            current = self.edge_to[edge.from];
        }
        path.reverse();

        Ok(Some(path))
    }

    /// Distances for every vertex, indexed by vertex.
    pub fn distances(&self) -> &[Cost] {
        &self.dist_to
    }

    /// Check the optimality conditions of the computed tree.
    ///
    /// Every edge must already be relaxed, and every parent edge recorded in
    /// `edge_to` must be tight.
    pub fn verify_optimality(&self) -> bool {
        if self.dist_to[self.source] != 0.0 || self.edge_to[self.source].is_some() {
            return false;
        }

        for edge in self.graph.edges() {
            if self.dist_to[edge.from] + edge.weight < self.dist_to[edge.to] {
                return false;
            }
        }

        for (w, parent) in self.edge_to.iter().enumerate() {
            if let Some(edge) = parent {
                if edge.to != w || self.dist_to[edge.from] + edge.weight != self.dist_to[w] {
                    return false;
                }
            }
        }

        true
    }
}
