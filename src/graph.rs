use std::fmt;

use crate::error::{Error, Result};

pub type NodeId = usize;
pub type Cost = f64;

/// A weighted edge `from -> to`. Weights are never negative.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectedEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Cost,
}

impl DirectedEdge {
    pub fn new(from: NodeId, to: NodeId, weight: Cost) -> Self {
        Self { from, to, weight }
    }
}

impl fmt::Display for DirectedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{} {:.2}", self.from, self.to, self.weight)
    }
}

/// Fixed-size adjacency list over vertices `0..vertex_count`.
///
/// Edges can only be added. Each vertex keeps its outgoing edges in the order
/// they were inserted, which is also the order Dijkstra relaxes them in.
#[derive(Clone, Debug)]
pub struct WeightedDigraph {
    adj: Vec<Vec<DirectedEdge>>,
    edge_count: usize,
}

impl WeightedDigraph {
    pub fn new(vertex_count: usize) -> Result<Self> {
        if vertex_count == 0 {
            return Err(Error::EmptyGraph);
        }
        Ok(Self {
            adj: vec![Vec::new(); vertex_count],
            edge_count: 0,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Append `edge` to the adjacency list of `edge.from`. Duplicates are kept.
    pub fn add_edge(&mut self, edge: DirectedEdge) -> Result<()> {
        self.check_vertex(edge.from)?;
        self.check_vertex(edge.to)?;
        if edge.weight.is_nan() || edge.weight < 0.0 {
            return Err(Error::InvalidWeight {
                weight: edge.weight,
            });
        }
        self.adj[edge.from].push(edge);
        self.edge_count += 1;
        Ok(())
    }

    pub fn edges_from(&self, v: NodeId) -> Result<&[DirectedEdge]> {
        self.check_vertex(v)?;
        Ok(&self.adj[v])
    }

    pub fn out_degree(&self, v: NodeId) -> Result<usize> {
        self.edges_from(v).map(|edges| edges.len())
    }

    /// All edges, grouped by source vertex.
    pub fn edges(&self) -> impl Iterator<Item = &DirectedEdge> + '_ {
        self.adj.iter().flatten()
    }

    pub(crate) fn check_vertex(&self, v: NodeId) -> Result<()> {
        if v >= self.adj.len() {
            return Err(Error::VertexOutOfRange {
                vertex: v,
                vertex_count: self.adj.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for WeightedDigraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vertices {} edges", self.vertex_count(), self.edge_count)?;
        for (v, edges) in self.adj.iter().enumerate() {
            write!(f, "{}:", v)?;
            for edge in edges {
                write!(f, " {}", edge)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
