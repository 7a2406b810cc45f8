//! Shortest paths on walkability grids.
//!
//! A [`PathFinder`] turns every walkable cell of a [`Map`] into a vertex of a
//! [`WeightedDigraph`], connecting it to its walkable neighbours in both
//! directions. Each [`PathFinder::shortest_path`] query then runs
//! [`DijkstraShortestPath`] from the source cell and maps the resulting edge
//! chain back to cells.
//!
//! ```
//! use gridpath::{GridMap, Map, PathFinder, ShortestPath};
//!
//! let map: GridMap = "...\n.#.\n...\n".parse().unwrap();
//! let finder = PathFinder::new(&map).unwrap();
//! let from = map.cell(0, 0).unwrap();
//! let to = map.cell(2, 0).unwrap();
//!
//! let path = finder.shortest_path(from, to).unwrap();
//! assert_eq!(path, ShortestPath::Found(vec![map.cell(1, 0).unwrap(), to]));
//! ```

pub mod dijkstra;
pub mod error;
pub mod graph;
pub mod logging;
pub mod map;
pub mod pathfinder;

pub use dijkstra::DijkstraShortestPath;
pub use error::{Error, Result};
pub use graph::{Cost, DirectedEdge, NodeId, WeightedDigraph};
pub use map::{Cell, GridMap, Map};
pub use pathfinder::{PathFinder, PathFinderConfig, ShortestPath};
