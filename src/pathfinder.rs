use tracing::{debug, trace};

use crate::dijkstra::DijkstraShortestPath;
use crate::error::{Error, Result};
use crate::graph::{Cost, DirectedEdge, NodeId, WeightedDigraph};
use crate::map::{Cell, Map};

/// How grid cells are connected when the graph is built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathFinderConfig {
    /// Chebyshev radius of the neighbourhood. 1 gives 8-connectivity.
    pub radius: usize,
    /// Weight of every grid edge.
    pub weight: Cost,
    /// When false only cells sharing a row or column are connected.
    pub diagonals: bool,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            weight: 1.0,
            diagonals: true,
        }
    }
}

impl PathFinderConfig {
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_weight(mut self, weight: Cost) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_diagonals(mut self, diagonals: bool) -> Self {
        self.diagonals = diagonals;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(Error::InvalidRadius);
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(Error::InvalidWeight {
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Result of a grid query.
#[derive(Clone, Debug, PartialEq)]
pub enum ShortestPath {
    /// Cells after the source, up to and including the destination.
    Found(Vec<Cell>),
    Unreachable,
}

impl ShortestPath {
    pub fn is_found(&self) -> bool {
        matches!(self, ShortestPath::Found(_))
    }

    pub fn cells(&self) -> Option<&[Cell]> {
        match self {
            ShortestPath::Found(cells) => Some(cells),
            ShortestPath::Unreachable => None,
        }
    }

    pub fn into_cells(self) -> Option<Vec<Cell>> {
        match self {
            ShortestPath::Found(cells) => Some(cells),
            ShortestPath::Unreachable => None,
        }
    }

    /// Number of steps, 0 when unreachable.
    pub fn len(&self) -> usize {
        self.cells().map_or(0, |cells| cells.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shortest paths between cells of a map.
///
/// The graph is built once from the map's walkability and then only read, so
/// one `PathFinder` can serve any number of queries, from several threads at
/// once. The map stays borrowed for the finder's lifetime: to pick up changed
/// walkability, drop the finder and build a new one.
pub struct PathFinder<'m, M: Map> {
    map: &'m M,
    graph: WeightedDigraph,
    config: PathFinderConfig,
}

impl<'m, M: Map> PathFinder<'m, M> {
    pub fn new(map: &'m M) -> Result<Self> {
        Self::with_config(map, PathFinderConfig::default())
    }

    pub fn with_config(map: &'m M, config: PathFinderConfig) -> Result<Self> {
        config.validate()?;
        let vertex_count = map.width() * map.height();
        if vertex_count == 0 {
            return Err(Error::EmptyMap);
        }

        let mut graph = WeightedDigraph::new(vertex_count)?;
        for cell in map.cells().into_iter().filter(|cell| cell.is_walkable) {
            let v = index_for(map, &cell);
            for neighbor in map.cells_in_radius(cell.x, cell.y, config.radius) {
                let aligned = neighbor.x == cell.x || neighbor.y == cell.y;
                if neighbor.is_walkable && (config.diagonals || aligned) {
                    let w = index_for(map, &neighbor);
                    graph.add_edge(DirectedEdge::new(v, w, config.weight))?;
                    graph.add_edge(DirectedEdge::new(w, v, config.weight))?;
                }
            }
        }

        debug!(
            width = map.width(),
            height = map.height(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "built grid graph"
        );

        Ok(Self { map, graph, config })
    }

    pub fn graph(&self) -> &WeightedDigraph {
        &self.graph
    }

    pub fn config(&self) -> PathFinderConfig {
        self.config
    }

    /// Cells from `source` (excluded) to `destination` (included).
    ///
    /// `source == destination` is always `Found` with no cells, even on a
    /// blocked cell.
    pub fn shortest_path(&self, source: Cell, destination: Cell) -> Result<ShortestPath> {
        let from = self.checked_index(&source)?;
        let to = self.checked_index(&destination)?;

        let dsp = DijkstraShortestPath::new(&self.graph, from)?;
        trace!(
            reachable = dsp.distances().iter().filter(|d| d.is_finite()).count(),
            "ran dijkstra from ({}, {})",
            source.x,
            source.y
        );

        let Some(path) = dsp.path_to(to)? else {
            debug!(
                "no path from ({}, {}) to ({}, {})",
                source.x, source.y, destination.x, destination.y
            );
            return Ok(ShortestPath::Unreachable);
        };

        let cells = path
            .iter()
            .map(|edge| self.cell_for(edge.to))
            .collect::<Result<Vec<Cell>>>()?;
        debug!(steps = cells.len(), "found path");
        Ok(ShortestPath::Found(cells))
    }

    /// Total cost of the shortest path, `None` when unreachable.
    pub fn distance(&self, source: Cell, destination: Cell) -> Result<Option<Cost>> {
        let from = self.checked_index(&source)?;
        let to = self.checked_index(&destination)?;

        let dsp = DijkstraShortestPath::new(&self.graph, from)?;
        let cost = dsp.distance_to(to)?;
        Ok(cost.is_finite().then_some(cost))
    }

    /// Vertex index of a cell, `y * width + x`.
    pub fn index_for(&self, cell: &Cell) -> NodeId {
        index_for(self.map, cell)
    }

    /// Inverse of [`PathFinder::index_for`], looked up through the map.
    pub fn cell_for(&self, index: NodeId) -> Result<Cell> {
        let width = self.map.width();
        let x = index % width;
        let y = index / width;
        self.map.cell(x, y).ok_or(Error::VertexOutOfRange {
            vertex: index,
            vertex_count: self.graph.vertex_count(),
        })
    }

    fn checked_index(&self, cell: &Cell) -> Result<NodeId> {
        if cell.x >= self.map.width() || cell.y >= self.map.height() {
            return Err(Error::CellOutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.map.width(),
                height: self.map.height(),
            });
        }
        Ok(self.index_for(cell))
    }
}

fn index_for<M: Map>(map: &M, cell: &Cell) -> NodeId {
    cell.y * map.width() + cell.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridMap;

    fn grid(text: &str) -> GridMap {
        text.parse().unwrap()
    }

    fn at<M: Map>(map: &M, x: usize, y: usize) -> Cell {
        map.cell(x, y).unwrap()
    }

    fn steps(path: &ShortestPath) -> Vec<(usize, usize)> {
        path.cells().unwrap().iter().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn open_three_by_three_goes_diagonal() {
        let map = GridMap::filled(3, 3, true);
        let finder = PathFinder::new(&map).unwrap();

        let path = finder.shortest_path(at(&map, 0, 0), at(&map, 2, 2)).unwrap();
        assert_eq!(steps(&path), vec![(1, 1), (2, 2)]);
        assert_eq!(finder.distance(at(&map, 0, 0), at(&map, 2, 2)).unwrap(), Some(2.0));
    }

    #[test]
    fn blocked_center_forces_a_detour() {
        let map = grid("...\n.#.\n...\n");
        let cardinal = PathFinderConfig::default().with_diagonals(false);
        let finder = PathFinder::with_config(&map, cardinal).unwrap();

        let path = finder.shortest_path(at(&map, 0, 0), at(&map, 2, 2)).unwrap();
        assert_eq!(path.len(), 4);
        let cells = path.cells().unwrap();
        assert_eq!(cells.last(), Some(&at(&map, 2, 2)));
        assert!(cells.iter().all(|c| c.is_walkable));
        assert!(!cells.contains(&at(&map, 1, 1)));
    }

    #[test]
    fn blocked_center_still_allows_diagonal_steps_around_it() {
        let map = grid("...\n.#.\n...\n");
        let finder = PathFinder::new(&map).unwrap();

        // e.g. (1, 0) -> (2, 1) -> (2, 2); corners may be cut.
        let path = finder.shortest_path(at(&map, 0, 0), at(&map, 2, 2)).unwrap();
        assert_eq!(path.len(), 3);
        assert!(!path.cells().unwrap().contains(&at(&map, 1, 1)));
    }

    #[test]
    fn cardinal_only_open_grid_is_manhattan() {
        let map = GridMap::filled(3, 3, true);
        let config = PathFinderConfig::default().with_diagonals(false);
        let finder = PathFinder::with_config(&map, config).unwrap();

        assert_eq!(finder.graph().out_degree(finder.index_for(&at(&map, 1, 1))).unwrap(), 8);
        assert_eq!(finder.distance(at(&map, 0, 0), at(&map, 2, 2)).unwrap(), Some(4.0));
        assert_eq!(finder.shortest_path(at(&map, 0, 0), at(&map, 1, 1)).unwrap().len(), 2);
    }

    #[test]
    fn same_cell_is_empty_even_when_blocked() {
        let map = grid(".#\n..\n");
        let finder = PathFinder::new(&map).unwrap();

        let open = at(&map, 0, 0);
        assert_eq!(finder.shortest_path(open, open).unwrap(), ShortestPath::Found(vec![]));

        let wall = at(&map, 1, 0);
        let path = finder.shortest_path(wall, wall).unwrap();
        assert!(path.is_found());
        assert!(path.is_empty());
    }

    #[test]
    fn adjacent_cells_are_one_step() {
        let map = GridMap::filled(4, 4, true);
        let finder = PathFinder::new(&map).unwrap();
        let center = at(&map, 1, 1);

        for neighbor in map.cells_in_radius(1, 1, 1) {
            let path = finder.shortest_path(center, neighbor).unwrap();
            assert_eq!(path, ShortestPath::Found(vec![neighbor]));
        }
    }

    #[test]
    fn walled_off_cell_is_unreachable() {
        let map = grid("..#.\n..#.\n###.\n");
        let finder = PathFinder::new(&map).unwrap();

        let source = at(&map, 0, 0);
        let target = at(&map, 3, 0);
        let path = finder.shortest_path(source, target).unwrap();
        assert_eq!(path, ShortestPath::Unreachable);
        assert_eq!(path.len(), 0);
        assert_eq!(path.into_cells(), None);
        assert_eq!(finder.distance(source, target).unwrap(), None);

        let dsp = DijkstraShortestPath::new(finder.graph(), finder.index_for(&source)).unwrap();
        assert!(!dsp.has_path_to(finder.index_for(&target)).unwrap());
    }

    #[test]
    fn blocked_destination_is_unreachable() {
        let map = grid("...\n.#.\n...\n");
        let finder = PathFinder::new(&map).unwrap();
        let wall = at(&map, 1, 1);

        assert_eq!(finder.graph().out_degree(finder.index_for(&wall)).unwrap(), 0);
        for source in map.cells().into_iter().filter(|c| *c != wall) {
            assert_eq!(
                finder.shortest_path(source, wall).unwrap(),
                ShortestPath::Unreachable
            );
        }
    }

    #[test]
    fn paths_are_symmetric() {
        let map = grid(
            "......#...\n\
             .####.#.#.\n\
             .#....#.#.\n\
             .#.####.#.\n\
             ...#......\n",
        );
        let finder = PathFinder::new(&map).unwrap();
        let open: Vec<Cell> = map.cells().into_iter().filter(|c| c.is_walkable).collect();

        for &a in open.iter().step_by(3) {
            for &b in open.iter().step_by(4) {
                let there = finder.shortest_path(a, b).unwrap();
                let back = finder.shortest_path(b, a).unwrap();
                assert_eq!(there.is_found(), back.is_found());
                assert_eq!(there.len(), back.len(), "{:?} <-> {:?}", a, b);
            }
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let map = grid(
            "....#....\n\
             .##.#.##.\n\
             .#.....#.\n\
             .#.###.#.\n\
             .........\n",
        );
        let finder = PathFinder::new(&map).unwrap();
        let open: Vec<Cell> = map.cells().into_iter().filter(|c| c.is_walkable).collect();

        for &a in open.iter().step_by(5) {
            for &b in open.iter().step_by(3) {
                for &c in open.iter().step_by(7) {
                    let ab = finder.distance(a, b).unwrap().unwrap();
                    let bc = finder.distance(b, c).unwrap().unwrap();
                    let ac = finder.distance(a, c).unwrap().unwrap();
                    assert!(ac <= ab + bc);
                }
            }
        }
    }

    #[test]
    fn path_steps_are_adjacent_and_walkable() {
        let map = grid(
            ".#......\n\
             .#.####.\n\
             .#.#..#.\n\
             ...#.##.\n\
             ####....\n",
        );
        let finder = PathFinder::new(&map).unwrap();
        let source = at(&map, 0, 0);
        let target = at(&map, 4, 2);

        let path = finder.shortest_path(source, target).unwrap();
        let cells = path.cells().unwrap();
        assert_eq!(cells.last(), Some(&target));

        let mut previous = source;
        for &cell in cells {
            assert!(cell.is_walkable);
            assert!(previous.x.abs_diff(cell.x) <= 1 && previous.y.abs_diff(cell.y) <= 1);
            previous = cell;
        }
    }

    #[test]
    fn edges_are_inserted_in_both_directions() {
        let map = GridMap::filled(2, 1, true);
        let finder = PathFinder::new(&map).unwrap();

        // Each walkable cell adds the pair again from its own side.
        assert_eq!(finder.graph().vertex_count(), 2);
        assert_eq!(finder.graph().out_degree(0).unwrap(), 2);
        assert_eq!(finder.graph().out_degree(1).unwrap(), 2);
        assert!(finder.graph().edges().all(|e| e.weight == 1.0));
    }

    #[test]
    fn index_and_cell_are_inverse() {
        let map = grid("..#.\n#...\n..#.\n");
        let finder = PathFinder::new(&map).unwrap();

        for cell in map.cells() {
            let index = finder.index_for(&cell);
            assert_eq!(index, cell.y * 4 + cell.x);
            assert_eq!(finder.cell_for(index).unwrap(), cell);
        }
        assert!(matches!(
            finder.cell_for(12),
            Err(Error::VertexOutOfRange { vertex: 12, .. })
        ));
    }

    #[test]
    fn custom_weight_scales_cost() {
        let map = GridMap::filled(5, 1, true);
        let config = PathFinderConfig::default().with_weight(2.5);
        let finder = PathFinder::with_config(&map, config).unwrap();

        assert_eq!(finder.config().weight, 2.5);
        assert_eq!(finder.distance(at(&map, 0, 0), at(&map, 4, 0)).unwrap(), Some(10.0));
    }

    #[test]
    fn larger_radius_jumps_over_walls() {
        let map = grid(".#.\n");
        let near = PathFinder::new(&map).unwrap();
        assert_eq!(
            near.shortest_path(at(&map, 0, 0), at(&map, 2, 0)).unwrap(),
            ShortestPath::Unreachable
        );

        let far = PathFinder::with_config(&map, PathFinderConfig::default().with_radius(2)).unwrap();
        let path = far.shortest_path(at(&map, 0, 0), at(&map, 2, 0)).unwrap();
        assert_eq!(steps(&path), vec![(2, 0)]);
    }

    #[test]
    fn rejects_bad_construction_input() {
        let empty = GridMap::new(0, 5);
        assert!(matches!(PathFinder::new(&empty), Err(Error::EmptyMap)));

        let map = GridMap::filled(2, 2, true);
        assert!(matches!(
            PathFinder::with_config(&map, PathFinderConfig::default().with_radius(0)),
            Err(Error::InvalidRadius)
        ));
        assert!(matches!(
            PathFinder::with_config(&map, PathFinderConfig::default().with_weight(-1.0)),
            Err(Error::InvalidWeight { .. })
        ));
        assert!(PathFinder::with_config(&map, PathFinderConfig::default().with_weight(f64::NAN)).is_err());
    }

    #[test]
    fn rejects_cells_outside_the_map() {
        let map = GridMap::filled(3, 3, true);
        let finder = PathFinder::new(&map).unwrap();

        let outside = Cell::new(3, 1, true);
        assert!(matches!(
            finder.shortest_path(at(&map, 0, 0), outside),
            Err(Error::CellOutOfBounds { x: 3, y: 1, .. })
        ));
        assert!(finder.shortest_path(outside, at(&map, 0, 0)).is_err());
        assert!(finder.distance(Cell::new(0, 9, true), at(&map, 0, 0)).is_err());
    }

    #[test]
    fn concurrent_queries_share_one_finder() {
        let map = grid(
            "........\n\
             .######.\n\
             ........\n",
        );
        let finder = PathFinder::new(&map).unwrap();
        let source = at(&map, 0, 0);

        let lengths: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..map.width())
                .map(|x| {
                    let finder = &finder;
                    let target = at(&map, x, 2);
                    s.spawn(move || finder.shortest_path(source, target).unwrap().len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (x, len) in lengths.into_iter().enumerate() {
            let expected = finder.shortest_path(source, at(&map, x, 2)).unwrap().len();
            assert_eq!(len, expected);
            assert!(len >= 2);
        }
    }
}
