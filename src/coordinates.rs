//! # Coordinates of spatial observations
//! * turns geometry collections into index aligned `[x, y]` pairs
//! * polygons are reduced to a single point per row, see [`PolygonStrategy`]
use std::{borrow::Cow, fmt};

use geo::{BoundingRect, Centroid, Contains, Coord, Geometry, MultiPolygon, Point, Polygon};
use rand::Rng;

#[cfg(feature = "serde_support")]
use serde::{Serialize, Deserialize};

/// A planar point `[x, y]`
pub type Coord2 = [f64; 2];

/// Default number of candidates drawn per round of rejection sampling
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Rejection sampling gives up after this many rounds
pub const MAX_REJECTION_ROUNDS: usize = 1000;

/// Possible errors while extracting coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum CoordinateErrors {
    /// # Geometry kind without a meaningful point representation
    /// * line geometries are not supported
    UnsupportedGeometry{
        /// row of the geometry
        index: usize,
        /// kind of the geometry, e.g. `LineString`
        kind: String,
    },
    /// The geometry in this row has no coordinates
    EmptyGeometry(usize),
    /// # Rejection sampling did not find a point inside the polygon
    /// * happens for polygons with (almost) zero area
    NoInteriorPoint{
        /// row of the geometry
        index: usize,
        /// number of candidates that were drawn
        attempts: usize,
    },
}

impl fmt::Display for CoordinateErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateErrors::UnsupportedGeometry { index, kind } => write!(
                f,
                "geometry {index} is a {kind}, only points and polygons are supported"
            ),
            CoordinateErrors::EmptyGeometry(index) => write!(f, "geometry {index} is empty"),
            CoordinateErrors::NoInteriorPoint { index, attempts } => write!(
                f,
                "no point inside polygon {index} after {attempts} candidates"
            ),
        }
    }
}

impl std::error::Error for CoordinateErrors {}

/// # How a polygon is reduced to a single point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum PolygonStrategy {
    /// center of mass of the polygon
    Centroid,
    /// center of the bounding box
    Midpoint,
    /// # uniformly random point inside the polygon
    /// * candidates are drawn from the bounding box, `batch_size` at a time
    RandomInterior{
        /// candidates drawn per round
        batch_size: usize,
    },
}

impl Default for PolygonStrategy {
    fn default() -> Self {
        PolygonStrategy::RandomInterior { batch_size: DEFAULT_BATCH_SIZE }
    }
}

/// # Where the rows of a collection are located
#[derive(Debug, Clone, Copy)]
pub enum Locations<'a> {
    /// coordinates supplied by the caller, used as is
    Coordinates(&'a [Coord2]),
    /// geometries, converted with [`extract_coordinates`]
    Geometries(&'a [Geometry<f64>], PolygonStrategy),
}

impl<'a> Locations<'a> {
    /// number of rows
    pub fn len(&self) -> usize
    {
        match self {
            Locations::Coordinates(coords) => coords.len(),
            Locations::Geometries(geoms, _) => geoms.len(),
        }
    }

    /// true if there are no rows
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// # Coordinates of every row
    /// * borrows caller supplied coordinates, extracts them otherwise
    /// * `rng` is only used by [`PolygonStrategy::RandomInterior`]
    pub fn resolve<R>(&self, rng: &mut R) -> Result<Cow<'a, [Coord2]>, CoordinateErrors>
    where R: Rng + ?Sized
    {
        match *self {
            Locations::Coordinates(coords) => Ok(Cow::Borrowed(coords)),
            Locations::Geometries(geoms, strategy) => {
                extract_coordinates(rng, geoms, strategy)
                    .map(Cow::Owned)
            }
        }
    }
}

impl<'a> From<&'a [Coord2]> for Locations<'a> {
    fn from(coords: &'a [Coord2]) -> Self {
        Locations::Coordinates(coords)
    }
}

impl<'a> From<&'a Vec<Coord2>> for Locations<'a> {
    fn from(coords: &'a Vec<Coord2>) -> Self {
        Locations::Coordinates(coords.as_slice())
    }
}

fn kind_name(geometry: &Geometry<f64>) -> &'static str
{
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[inline]
fn to_coord2(point: Point<f64>) -> Coord2
{
    [point.x(), point.y()]
}

/// # Coordinates of a geometry collection
/// * points map to their own coordinates
/// * polygons, multipolygons, rectangles and triangles are reduced with `strategy`
/// * line geometries, multipoints and collections are unsupported
/// * the result is index aligned with `geometries`
pub fn extract_coordinates<R>(
    rng: &mut R,
    geometries: &[Geometry<f64>],
    strategy: PolygonStrategy
) -> Result<Vec<Coord2>, CoordinateErrors>
where R: Rng + ?Sized
{
    geometries.iter()
        .enumerate()
        .map(|(index, geometry)| {
            let region = match geometry {
                Geometry::Point(p) => return Ok(to_coord2(*p)),
                Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
                Geometry::MultiPolygon(mp) => mp.clone(),
                Geometry::Rect(r) => MultiPolygon::new(vec![r.to_polygon()]),
                Geometry::Triangle(t) => MultiPolygon::new(vec![t.to_polygon()]),
                other => return Err(
                    CoordinateErrors::UnsupportedGeometry {
                        index,
                        kind: kind_name(other).to_owned()
                    }
                ),
            };
            region_point(rng, &region, strategy, index)
        }).collect()
}

fn region_point<R>(
    rng: &mut R,
    region: &MultiPolygon<f64>,
    strategy: PolygonStrategy,
    index: usize
) -> Result<Coord2, CoordinateErrors>
where R: Rng + ?Sized
{
    match strategy {
        PolygonStrategy::Centroid => region.centroid()
            .map(to_coord2)
            .ok_or(CoordinateErrors::EmptyGeometry(index)),
        PolygonStrategy::Midpoint => region.bounding_rect()
            .map(|rect| {
                let c = rect.center();
                [c.x, c.y]
            })
            .ok_or(CoordinateErrors::EmptyGeometry(index)),
        PolygonStrategy::RandomInterior { batch_size } => {
            let mut points = interior_points(rng, region, 1, batch_size, index)?;
            points.pop()
                .ok_or(CoordinateErrors::EmptyGeometry(index))
        }
    }
}

fn interior_points<R>(
    rng: &mut R,
    region: &MultiPolygon<f64>,
    size: usize,
    batch_size: usize,
    index: usize
) -> Result<Vec<Coord2>, CoordinateErrors>
where R: Rng + ?Sized
{
    let rect = region.bounding_rect()
        .ok_or(CoordinateErrors::EmptyGeometry(index))?;
    let (min, max) = (rect.min(), rect.max());
    let batch_size = batch_size.max(1);

    let mut candidates = Vec::with_capacity(size);
    let mut attempts = 0;
    while candidates.len() < size {
        if attempts >= MAX_REJECTION_ROUNDS * batch_size {
            return Err(CoordinateErrors::NoInteriorPoint { index, attempts });
        }
        attempts += batch_size;
        candidates.extend(
            (0..batch_size)
                .map(|_| Coord {
                    x: rng.random_range(min.x..=max.x),
                    y: rng.random_range(min.y..=max.y),
                })
                .filter(|&c| region.contains(&Point::from(c)))
                .map(|c| [c.x, c.y])
        );
    }
    candidates.truncate(size);
    Ok(candidates)
}

/// # `size` uniformly random points inside `polygon`
/// * rejection sampling from the bounding box, drawing `batch_size` candidates per round
/// * errors report index 0, as there is only one polygon
pub fn random_points_in_polygon<R>(
    mut rng: R,
    polygon: &Polygon<f64>,
    size: usize,
    batch_size: usize
) -> Result<Vec<Coord2>, CoordinateErrors>
where R: Rng
{
    let region = MultiPolygon::new(vec![polygon.clone()]);
    interior_points(&mut rng, &region, size, batch_size, 0)
}

/// Vertices of the exterior ring of `polygon`, closing vertex included
pub fn exterior_coordinates(polygon: &Polygon<f64>) -> Vec<Coord2>
{
    polygon.exterior()
        .coords()
        .map(|c| [c.x, c.y])
        .collect()
}
