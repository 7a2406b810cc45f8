use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Graph errors
    #[error("Graph must have at least one vertex")]
    EmptyGraph,

    #[error("Vertex {vertex} is out of range for a graph of {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("Edge weight {weight} is not a non-negative number")]
    InvalidWeight { weight: f64 },

    // Map errors
    #[error("Map must have at least one cell")]
    EmptyMap,

    #[error("Cell ({x}, {y}) is outside a {width}x{height} map")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Unexpected character {found:?} at line {line}, column {column}")]
    MapParse {
        line: usize,
        column: usize,
        found: char,
    },

    #[error("Line {line} has {found} cells, expected {expected}")]
    RaggedMap {
        line: usize,
        expected: usize,
        found: usize,
    },

    // Pathfinder configuration
    #[error("Neighbor radius must be at least 1")]
    InvalidRadius,
}

/// Result type alias for all library operations
pub type Result<T> = std::result::Result<T, Error>;
