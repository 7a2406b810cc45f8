use anyhow::{bail, Context, Result};
use clap::Parser;
use csv::Writer;
use gridpath::{Cell, GridMap, Map, PathFinder, PathFinderConfig, ShortestPath};
use std::fs;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gridpath")]
#[command(about = "Load a text map ('.' walkable, '#' blocked) and find the shortest path between two cells.", long_about = None)]
struct Cli {
    /// Path to the map file
    #[arg(short, long)]
    map: String,

    /// Source cell as x,y
    #[arg(short, long, value_parser = parse_point)]
    from: (usize, usize),

    /// Destination cell as x,y
    #[arg(short, long, value_parser = parse_point)]
    to: (usize, usize),

    /// Neighbor radius used to connect cells
    #[arg(long, default_value_t = 1)]
    radius: usize,

    /// Weight of every grid edge
    #[arg(long, default_value_t = 1.0)]
    weight: f64,

    /// Only connect cells sharing a row or column
    #[arg(long, default_value_t = false)]
    no_diagonals: bool,

    /// Output CSV (step, x, y). If omitted, prints the map with the path drawn on it.
    #[arg(short, long)]
    out: Option<String>,
}

fn parse_point(s: &str) -> std::result::Result<(usize, usize), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {:?}", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in {:?}: {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in {:?}: {}", s, e))?;
    Ok((x, y))
}

fn lookup(map: &GridMap, (x, y): (usize, usize)) -> Result<Cell> {
    match map.cell(x, y) {
        Some(cell) => Ok(cell),
        None => bail!("cell ({}, {}) is outside the {}x{} map", x, y, map.width(), map.height()),
    }
}

/// Draw the map with the path on top: S source, D destination, * steps.
fn render(map: &GridMap, source: Cell, path: &[Cell]) -> String {
    let mut rows: Vec<Vec<char>> = map
        .to_string()
        .lines()
        .map(|line| line.chars().collect())
        .collect();
    for cell in path {
        rows[cell.y][cell.x] = '*';
    }
    if let Some(destination) = path.last() {
        rows[destination.y][destination.x] = 'D';
    }
    rows[source.y][source.x] = 'S';

    let mut out = String::new();
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    gridpath::logging::init_logging();
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.map).with_context(|| format!("opening {}", &cli.map))?;
    let map: GridMap = text
        .parse()
        .with_context(|| format!("parsing map {}", &cli.map))?;

    let config = PathFinderConfig::default()
        .with_radius(cli.radius)
        .with_weight(cli.weight)
        .with_diagonals(!cli.no_diagonals);
    let finder = PathFinder::with_config(&map, config).context("building path graph")?;

    println!(
        "Map: {}x{}; graph: {} vertices, {} directed edges",
        map.width(),
        map.height(),
        finder.graph().vertex_count(),
        finder.graph().edge_count()
    );

    let source = lookup(&map, cli.from)?;
    let destination = lookup(&map, cli.to)?;

    use std::time::SystemTime;
    let now = SystemTime::now();
    let path = finder.shortest_path(source, destination)?;
    if let Ok(elapsed) = now.elapsed() {
        info!("query took {} s", elapsed.as_secs_f64());
    }

    let cells = match path {
        ShortestPath::Found(cells) => cells,
        ShortestPath::Unreachable => {
            println!(
                "No path from ({}, {}) to ({}, {})",
                source.x, source.y, destination.x, destination.y
            );
            return Ok(());
        }
    };

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["step", "x", "y"])?;
        for (step, cell) in cells.iter().enumerate() {
            wtr.write_record(&[(step + 1).to_string(), cell.x.to_string(), cell.y.to_string()])?;
        }
        wtr.flush()?;
        println!("Wrote {} steps to {}", cells.len(), out_path);
    } else {
        print!("{}", render(&map, source, &cells));
        println!(
            "Steps: {}; cost: {:.2}",
            cells.len(),
            cells.len() as f64 * cli.weight
        );
    }

    Ok(())
}
