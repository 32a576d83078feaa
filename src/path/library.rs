//! Ingested shape set and nearest-point queries.

use serde::{Deserialize, Serialize};

use crate::core::Point2;

/// What kind of primitive a shape was sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A circle primitive, kept with its analytic center and radius
    Circle {
        /// Center in scene coordinates
        center: Point2,
        /// Radius in meters
        radius: f32,
    },
    /// A polyline sampled from path commands
    Polyline {
        /// Whether the path was closed with a Z command
        closed: bool,
    },
}

/// One sampled shape in scene coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathShape {
    kind: ShapeKind,
    points: Vec<Point2>,
}

impl PathShape {
    /// Build a sampled circle shape.
    pub fn circle(center: Point2, radius: f32, points: Vec<Point2>) -> Self {
        Self {
            kind: ShapeKind::Circle { center, radius },
            points,
        }
    }

    /// Build a sampled polyline shape.
    pub fn polyline(points: Vec<Point2>, closed: bool) -> Self {
        Self {
            kind: ShapeKind::Polyline { closed },
            points,
        }
    }

    /// The primitive this shape was sampled from.
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The sampled points in scene coordinates.
    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Whether the sampled curve loops back to its start.
    pub fn is_closed(&self) -> bool {
        match self.kind {
            ShapeKind::Circle { .. } => true,
            ShapeKind::Polyline { closed } => closed,
        }
    }
}

/// Result of a nearest-point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestPoint {
    /// Index of the shape within the library
    pub shape: usize,
    /// Index of the point within the shape
    pub index: usize,
    /// The point itself, in scene coordinates
    pub position: Point2,
    /// Distance from the query point
    pub distance: f32,
}

/// The collection of sampled shapes from the last ingestion.
///
/// A library is installed as a whole and never mutated in place, so a
/// tick can never observe a partially populated set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathLibrary {
    shapes: Vec<PathShape>,
}

impl PathLibrary {
    /// An empty library (nothing ingested).
    pub fn empty() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Build a library from sampled shapes.
    pub fn from_shapes(shapes: Vec<PathShape>) -> Self {
        Self { shapes }
    }

    /// All shapes, in ingestion order.
    #[inline]
    pub fn shapes(&self) -> &[PathShape] {
        &self.shapes
    }

    /// Whether the library holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of shapes held.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Total number of sampled points across all shapes.
    pub fn point_count(&self) -> usize {
        self.shapes.iter().map(|s| s.points.len()).sum()
    }

    /// Find the sampled point closest to the query point.
    ///
    /// Linear scan in shape-then-point order with a strict comparison,
    /// so ties resolve to the first point encountered. Deterministic by
    /// construction.
    pub fn nearest_point(&self, query: Point2) -> Option<NearestPoint> {
        let mut best: Option<NearestPoint> = None;
        let mut best_distance_squared = f32::MAX;

        for (shape_index, shape) in self.shapes.iter().enumerate() {
            for (point_index, point) in shape.points.iter().enumerate() {
                let distance_squared = query.distance_squared(point);
                if distance_squared < best_distance_squared {
                    best_distance_squared = distance_squared;
                    best = Some(NearestPoint {
                        shape: shape_index,
                        index: point_index,
                        position: *point,
                        distance: distance_squared.sqrt(),
                    });
                }
            }
        }

        best
    }
}
