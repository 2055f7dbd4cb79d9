//! Example: Generate a Voronoi map
//!
//! Demonstrates the generation pipeline and the query surface.

use voronoi_map::*;

fn main() -> Result<()> {
    println!("Voronoi Map Generation Example");
    println!("==============================\n");

    let config = MapConfigBuilder::new()
        .seed("abc")
        .bounds(0.0, 0.0, 800.0, 600.0)?
        .num_points(400)?
        .max_relax(2)?
        .build()?;

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Domain: {:?}", config.domain());
    println!("  Points: {}", config.num_points);
    println!("  Relaxation passes: {}", config.max_relax);
    println!();

    let map = MapGenerator::generate(config)?;
    let cells = map.cells()?;
    let corners = map.corners()?;

    let avg_neighbors =
        cells.iter().map(|c| c.neighbor_count()).sum::<usize>() as f64 / cells.len() as f64;
    let avg_vertices =
        cells.iter().map(|c| c.vertex_count()).sum::<usize>() as f64 / cells.len() as f64;
    let border_cells = cells.iter().filter(|c| c.border).count();

    println!("Statistics:");
    println!("  Cells: {} ({} on the border)", cells.len(), border_cells);
    println!("  Corners: {}", corners.len());
    println!("  Average neighbors per cell: {:.2}", avg_neighbors);
    println!("  Average vertices per cell: {:.2}", avg_vertices);
    println!();

    let display = Rect::new(0.0, 0.0, 200.0, 150.0);
    let visible = map.get_cells(display)?;
    println!("Cells visible in {:?}: {}", display, visible.len());

    #[cfg(feature = "spatial-index")]
    {
        let pos = Point::new(400.0, 300.0);
        let cell_id = map.find_cell_at(pos)?;
        let nearby = map.find_cells_within_radius(cell_id, 2)?;
        println!(
            "Position ({}, {}) is in cell {} ({} cells within 2 hops)",
            pos.x,
            pos.y,
            cell_id,
            nearby.len()
        );
    }

    println!("\nSample cells:");
    for cell in cells.iter().take(5) {
        println!(
            "  Cell {}: center=({:.2}, {:.2}), area={:.1}, neighbors={:?}",
            cell.id,
            cell.center.x,
            cell.center.y,
            cell.area(),
            cell.neighbors
        );
    }

    Ok(())
}
