use anyhow::{Context, Result};
use clap::Parser;
use csv::{ReaderBuilder, Writer};
use fnv::FnvHashMap;
use gridpath::{DijkstraShortestPath, DirectedEdge, WeightedDigraph};
use ordered_float::OrderedFloat;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "csv")]
#[command(about = "Build a graph from a CSV with node_id,neighbor_id,weight per row and run Dijkstra from a source node id.", long_about = None)]
struct Cli {
    /// Path to the .csv file
    #[arg(short, long)]
    csv: String,

    /// Number of timed runs. Picks a new (deterministic) source per run (0, 1, 2, 3, ...num_runs).
    #[arg(short, long, default_value_t = 0)]
    num_runs: usize,

    /// Source node id for a single run
    #[arg(short, long)]
    source: Option<u64>,

    /// Print the path from the source to this node id
    #[arg(short, long, requires = "source")]
    target: Option<u64>,

    /// Output CSV (node_id, distance) for the single run from --source.
    #[arg(short, long, requires = "source")]
    out: Option<String>,

    /// Include unreachable nodes in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,
}

/// Graph with dense vertex indices plus the original node ids.
struct CsvGraph {
    graph: WeightedDigraph,
    id_to_idx: FnvHashMap<u64, usize>,
    idx_to_id: Vec<u64>,
}

impl CsvGraph {
    fn index_of(&self, node_id: u64) -> Result<usize> {
        self.id_to_idx
            .get(&node_id)
            .copied()
            .with_context(|| format!("node {} does not appear in the graph", node_id))
    }
}

fn dense_index(id_to_idx: &mut FnvHashMap<u64, usize>, idx_to_id: &mut Vec<u64>, node_id: u64) -> usize {
    *id_to_idx.entry(node_id).or_insert_with(|| {
        idx_to_id.push(node_id);
        idx_to_id.len() - 1
    })
}

fn parse_csv_and_build_graph(path: &str) -> Result<CsvGraph> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true) // important: skip header line
        .from_path(path)
        .with_context(|| format!("opening {}", path))?;

    let mut edges = Vec::new();
    let mut id_to_idx: FnvHashMap<u64, usize> = FnvHashMap::default();
    let mut idx_to_id: Vec<u64> = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| {
            record
                .get(i)
                .with_context(|| format!("row {} has only {} fields", row + 1, record.len()))
        };
        let node_id: u64 = field(0)?.trim().parse().with_context(|| format!("row {}: node_id", row + 1))?;
        let neighbor_id: u64 = field(1)?.trim().parse().with_context(|| format!("row {}: neighbor_id", row + 1))?;
        let weight: f64 = field(2)?.trim().parse().with_context(|| format!("row {}: weight", row + 1))?;

        let u = dense_index(&mut id_to_idx, &mut idx_to_id, node_id);
        let v = dense_index(&mut id_to_idx, &mut idx_to_id, neighbor_id);
        edges.push(DirectedEdge::new(u, v, weight));
    }

    let mut graph = WeightedDigraph::new(idx_to_id.len()).context("CSV has no edges")?;
    for edge in edges {
        let (from, to) = (idx_to_id[edge.from], idx_to_id[edge.to]);
        graph
            .add_edge(edge)
            .with_context(|| format!("edge {} -> {}", from, to))?;
    }

    Ok(CsvGraph {
        graph,
        id_to_idx,
        idx_to_id,
    })
}

fn main() -> Result<()> {
    gridpath::logging::init_logging();
    let cli = Cli::parse();

    let csv_graph = parse_csv_and_build_graph(&cli.csv)?;
    let graph = &csv_graph.graph;
    println!(
        "Graph: {} nodes, {} directed edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    if cli.num_runs > graph.vertex_count() {
        warn!(
            "only {} nodes, running {} times instead of {}",
            graph.vertex_count(),
            graph.vertex_count(),
            cli.num_runs
        );
    }

    let mut duration_millis = Vec::new();
    for src_idx in 0..cli.num_runs.min(graph.vertex_count()) {
        use std::time::SystemTime;
        let now = SystemTime::now();
        let sp = DijkstraShortestPath::new(graph, src_idx)?;
        if let Ok(elapsed) = now.elapsed() {
            duration_millis.push(elapsed.as_secs_f64() * 1000.0);
        }
        info!(
            source = csv_graph.idx_to_id[src_idx],
            reachable = sp.distances().iter().filter(|d| d.is_finite()).count(),
            "run finished"
        );
    }
    if !duration_millis.is_empty() {
        println!("{:?}", duration_millis);
    }

    let Some(source) = cli.source else {
        return Ok(());
    };
    let src_idx = csv_graph.index_of(source)?;
    let sp = DijkstraShortestPath::new(graph, src_idx)?;

    if let Some(target) = cli.target {
        let dst_idx = csv_graph.index_of(target)?;
        match sp.path_to(dst_idx)? {
            Some(path) => {
                let mut hops = vec![source.to_string()];
                hops.extend(path.iter().map(|e| csv_graph.idx_to_id[e.to].to_string()));
                println!("Path: {}", hops.join(" -> "));
                println!("Cost: {:.6}", sp.distance_to(dst_idx)?);
            }
            None => println!("No path from {} to {}", source, target),
        }
    }

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["node_id", "distance"])?;
        let mut dist_with_idx: Vec<(usize, f64)> = sp.distances().iter().copied().enumerate().collect();
        dist_with_idx.sort_by_key(|&(_, d)| OrderedFloat(d));
        let mut written = 0;
        for (idx, d) in &dist_with_idx {
            if d.is_finite() || cli.include_unreachable {
                let val = if d.is_finite() {
                    format!("{:.6}", d)
                } else {
                    String::from("inf")
                };
                wtr.write_record(&[csv_graph.idx_to_id[*idx].to_string(), val])?;
                written += 1;
            }
        }
        wtr.flush()?;
        println!("Wrote distances for {} nodes to {}", written, out_path);
    } else if cli.target.is_none() {
        let reachable = sp.distances().iter().filter(|x| x.is_finite()).count();
        println!("Nodes: {}", graph.vertex_count());
        println!("Reachable from {}: {}", source, reachable);
        let maxd = sp
            .distances()
            .iter()
            .copied()
            .filter(|x| x.is_finite())
            .map(OrderedFloat)
            .max();
        if let Some(OrderedFloat(maxd)) = maxd {
            println!("Max finite distance: {:.2}", maxd);
        }
    }

    Ok(())
}
