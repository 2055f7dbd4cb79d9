//! Bounded Voronoi tessellation
//!
//! The [`Tessellator`] trait is the seam where a computational-geometry
//! backend turns a site set into one clipped polygon per site. The default
//! backend, [`ClippedVoronoi`], delegates Delaunay/Voronoi construction and
//! clipping to the `voronoice` crate.

use std::collections::{HashMap, HashSet};

use voronoice::{BoundingBox, ClipBehavior, Point as VoronoicePoint, VoronoiBuilder};

use crate::corner::CornerKey;
use crate::error::{MapError, Result};
use crate::geometry::{Point, Rect};

/// Ordered cyclic sequence of polygon vertices
pub type Polygon = Vec<Point>;

/// Turns sites into bounded cell polygons
///
/// Implementations must return exactly one polygon per site, in site order,
/// clipped to `bounds`. Collinear site sets are valid input: their diagram
/// is a row of parallel strips. Vertices shared by adjacent cells must carry
/// bit-identical coordinates so corners can be deduplicated exactly.
pub trait Tessellator {
    fn tessellate(&self, sites: &[Point], bounds: Rect) -> Result<Vec<Polygon>>;
}

/// Reject site sets that would produce ambiguous geometry
///
/// Sites must be finite, inside `bounds` (edges included) and pairwise distinct.
pub fn validate_sites(sites: &[Point], bounds: Rect) -> Result<()> {
    if sites.is_empty() {
        return Err(MapError::DegenerateInput("no sites to tessellate".to_string()));
    }

    let mut seen = HashSet::with_capacity(sites.len());
    for (i, &site) in sites.iter().enumerate() {
        if !site.is_finite() {
            return Err(MapError::DegenerateInput(format!(
                "site {} has non-finite coordinates ({}, {})",
                i, site.x, site.y
            )));
        }
        if !bounds.contains(site) {
            return Err(MapError::DegenerateInput(format!(
                "site {} at ({}, {}) lies outside the domain",
                i, site.x, site.y
            )));
        }
        if !seen.insert(CornerKey::exact(site)) {
            return Err(MapError::DegenerateInput(format!(
                "site {} at ({}, {}) duplicates an earlier site",
                i, site.x, site.y
            )));
        }
    }

    Ok(())
}

/// Run a tessellator with its input and output contract enforced
pub fn tessellate_checked<T>(tessellator: &T, sites: &[Point], bounds: Rect) -> Result<Vec<Polygon>>
where
    T: Tessellator + ?Sized,
{
    validate_sites(sites, bounds)?;
    let polygons = tessellator.tessellate(sites, bounds)?;
    if polygons.len() != sites.len() {
        return Err(MapError::DegenerateInput(format!(
            "tessellator returned {} polygons for {} sites",
            polygons.len(),
            sites.len()
        )));
    }
    Ok(polygons)
}

/// Voronoi cells clipped to the domain rectangle, backed by `voronoice`
///
/// Output vertices closer than `weld_tolerance × max(domain width, height)`
/// are merged onto one representative, so vertices shared by neighboring
/// cells compare bit-identical even where clipping computed them twice.
/// Vertices within the same distance of a domain edge are snapped onto it.
///
/// Fewer than three sites, or any collinear site set, never reach the
/// triangulator; their cells are cut out of the rectangle along the
/// bisectors of consecutive sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedVoronoi {
    /// Relative distance under which two output vertices are the same vertex
    pub weld_tolerance: f64,
}

impl Default for ClippedVoronoi {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-9,
        }
    }
}

impl Tessellator for ClippedVoronoi {
    fn tessellate(&self, sites: &[Point], bounds: Rect) -> Result<Vec<Polygon>> {
        let mut polygons = match sites {
            [] => return Err(MapError::DegenerateInput("no sites to tessellate".to_string())),
            [_] => vec![bounds.corners().to_vec()],
            _ if collinear(sites, bounds) => strip_cells(sites, bounds),
            _ => voronoice_cells(sites, bounds)?,
        };

        let tolerance = self.weld_tolerance * bounds.width().max(bounds.height());
        if tolerance > 0.0 {
            weld_vertices(&mut polygons, bounds, tolerance);
        }
        Ok(polygons)
    }
}

fn voronoice_cells(sites: &[Point], bounds: Rect) -> Result<Vec<Polygon>> {
    let center = bounds.center();
    let diagram = VoronoiBuilder::default()
        .set_sites(
            sites
                .iter()
                .map(|p| VoronoicePoint { x: p.x, y: p.y })
                .collect(),
        )
        .set_bounding_box(BoundingBox::new(
            VoronoicePoint {
                x: center.x,
                y: center.y,
            },
            bounds.width(),
            bounds.height(),
        ))
        .set_clip_behavior(ClipBehavior::Clip)
        .build()
        .ok_or_else(|| {
            MapError::DegenerateInput(format!(
                "triangulation failed for {} sites (collinear input?)",
                sites.len()
            ))
        })?;

    let polygons = diagram
        .iter_cells()
        .map(|cell| {
            cell.iter_vertices()
                .map(|v| Point::new(v.x, v.y))
                .collect::<Polygon>()
        })
        .collect();

    Ok(polygons)
}

/// True when every site lies on the line through the first site and the one farthest from it
fn collinear(sites: &[Point], bounds: Rect) -> bool {
    let origin = sites[0];
    let Some(far) = sites
        .iter()
        .copied()
        .max_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
    else {
        return true;
    };
    let dir = far - origin;
    let slack = 1e-12 * dir.length() * bounds.width().max(bounds.height());
    sites.iter().all(|&p| dir.perp_dot(p - origin).abs() <= slack)
}

/// Collinear sites split the rectangle into strips along consecutive bisectors
fn strip_cells(sites: &[Point], bounds: Rect) -> Vec<Polygon> {
    let origin = sites[0];
    let dir = sites
        .iter()
        .map(|&p| p - origin)
        .max_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
        .unwrap_or(Point::X);

    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        (sites[a] - origin)
            .dot(dir)
            .total_cmp(&(sites[b] - origin).dot(dir))
    });

    let rect = bounds.corners().to_vec();
    let mut polygons = vec![Vec::new(); sites.len()];
    for (rank, &i) in order.iter().enumerate() {
        let site = sites[i];
        let mut cell = rect.clone();
        if rank > 0 {
            cell = clip_toward(&cell, site, sites[order[rank - 1]]);
        }
        if let Some(&next) = order.get(rank + 1) {
            cell = clip_toward(&cell, site, sites[next]);
        }
        polygons[i] = cell;
    }
    polygons
}

/// Keep the part of `polygon` closer to `site` than to `other`
fn clip_toward(polygon: &[Point], site: Point, other: Point) -> Polygon {
    let mid = (site + other) * 0.5;
    let dir = other - site;
    clip_half_plane(polygon, |p| (p - mid).dot(dir))
}

/// Keep the part of `polygon` where `side(p) <= 0` (Sutherland-Hodgman, one plane)
fn clip_half_plane(polygon: &[Point], side: impl Fn(Point) -> f64) -> Polygon {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &cur) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let (fc, fnext) = (side(cur), side(next));
        if fc <= 0.0 {
            out.push(cur);
        }
        if (fc < 0.0 && fnext > 0.0) || (fc > 0.0 && fnext < 0.0) {
            let t = fc / (fc - fnext);
            out.push(cur + (next - cur) * t);
        }
    }
    out
}

/// Snap near-coincident vertices onto a single representative
///
/// Vertices near a domain edge are first moved exactly onto it. Consecutive
/// vertices that collapse onto the same representative are dropped so no
/// polygon repeats a vertex.
fn weld_vertices(polygons: &mut [Polygon], bounds: Rect, tolerance: f64) {
    let mut buckets: HashMap<(i64, i64), Vec<Point>> = HashMap::new();
    let bucket_of = |p: Point| {
        (
            (p.x / tolerance).floor() as i64,
            (p.y / tolerance).floor() as i64,
        )
    };

    for polygon in polygons.iter_mut() {
        for vertex in polygon.iter_mut() {
            *vertex = snap_to_edges(*vertex, bounds, tolerance);
            let (bx, by) = bucket_of(*vertex);
            let existing = (bx - 1..=bx + 1)
                .flat_map(|x| (by - 1..=by + 1).map(move |y| (x, y)))
                .filter_map(|key| buckets.get(&key))
                .flatten()
                .find(|rep| rep.distance(*vertex) <= tolerance)
                .copied();

            match existing {
                Some(rep) => *vertex = rep,
                None => buckets.entry((bx, by)).or_default().push(*vertex),
            }
        }

        polygon.dedup();
        while polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }
    }
}

fn snap_to_edges(p: Point, bounds: Rect, tolerance: f64) -> Point {
    let snap = |v: f64, lo: f64, hi: f64| {
        if (v - lo).abs() <= tolerance {
            lo
        } else if (v - hi).abs() <= tolerance {
            hi
        } else {
            v
        }
    };
    Point::new(
        snap(p.x, bounds.min.x, bounds.max.x),
        snap(p.y, bounds.min.y, bounds.max.y),
    )
}
