//! SVG primitive parsing and polyline sampling.
//!
//! Accepts either a full SVG document (circle and path elements plus an
//! optional `viewBox`) or a bare path-command string, and produces
//! shapes sampled at a fixed resolution in scene coordinates.
//!
//! Supported path commands are `M`/`m` (with implicit follow-on line-to
//! pairs), `L`/`l`, `C`/`c` and `Z`/`z`. Lowercase commands accumulate
//! onto the current pen position, uppercase commands set it directly.
//! Tokenization of the `d` attribute is delegated to the `svg` crate;
//! command interpretation, Bezier evaluation, arc-length sampling and
//! the view-box centering transform live here.
//!
//! Coordinate mapping: raw path-space coordinates are translated by
//! minus the view-box center so the drawing's center lands at the world
//! origin. A document with no declared view box gets a 10x10 default.

use log::warn;
use svg::node::element::path::{Command, Data, Position};
use svg::node::element::tag::Type as TagType;
use svg::parser::Event;

use super::{ParseFailure, PathLibrary, PathShape};
use crate::core::Point2;

/// Sample count for circle primitives.
pub const CIRCLE_SAMPLES: usize = 128;

/// Sample count for general path primitives.
pub const PATH_SAMPLES: usize = 256;

/// Subdivision count used to estimate a cubic segment's arc length.
const CUBIC_FLATTEN_STEPS: usize = 16;

/// Two pen positions closer than this are considered coincident.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// The declared drawing extent of an ingested document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    /// Minimum X of the view box
    pub x: f32,
    /// Minimum Y of the view box
    pub y: f32,
    /// Width of the view box
    pub width: f32,
    /// Height of the view box
    pub height: f32,
}

impl ViewBox {
    /// Create a view box from its min corner and extent.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center of the view box; subtracted from every raw coordinate to
    /// place the drawing's center at the world origin.
    #[inline]
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn parse(raw: &str) -> Option<ViewBox> {
        let mut numbers = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f32>());

        let x = numbers.next()?.ok()?;
        let y = numbers.next()?.ok()?;
        let width = numbers.next()?.ok()?;
        let height = numbers.next()?.ok()?;
        Some(ViewBox::new(x, y, width, height))
    }
}

impl Default for ViewBox {
    /// The assumed extent when no view box is declared: 10x10 at origin.
    fn default() -> Self {
        Self::new(0.0, 0.0, 10.0, 10.0)
    }
}

/// A primitive collected from the document before sampling.
enum Primitive {
    Circle { cx: f32, cy: f32, r: f32 },
    Path { data: String },
}

/// Parse a document or bare path string into a shape library.
///
/// Per-primitive failures are collected rather than propagated: the
/// offending primitive is skipped and the rest of the input still
/// installs. The result is therefore always a usable (possibly empty)
/// library plus the list of what was dropped.
///
/// A view box declared inside the document wins over the caller-supplied
/// one; with neither, the 10x10 default applies.
pub fn parse_document(
    text: &str,
    view_box: Option<ViewBox>,
) -> (PathLibrary, Vec<ParseFailure>) {
    if text.trim_start().starts_with('<') {
        parse_svg_document(text, view_box)
    } else {
        // Bare path-command string, no markup around it.
        let effective = view_box.unwrap_or_default();
        match parse_path_data(text, &effective) {
            Ok(shape) => (PathLibrary::from_shapes(vec![shape]), Vec::new()),
            Err(failure) => {
                warn!("dropping path primitive: {}", failure);
                (PathLibrary::empty(), vec![failure])
            }
        }
    }
}

fn parse_svg_document(
    text: &str,
    view_box: Option<ViewBox>,
) -> (PathLibrary, Vec<ParseFailure>) {
    let mut failures = Vec::new();
    let mut primitives = Vec::new();
    let mut declared: Option<ViewBox> = None;

    let parser = match svg::read(text) {
        Ok(parser) => parser,
        Err(e) => {
            let failure = ParseFailure::Malformed(e.to_string());
            warn!("unreadable document: {}", failure);
            return (PathLibrary::empty(), vec![failure]);
        }
    };

    for event in parser {
        let (name, tag_type, attributes) = match event {
            Event::Tag(name, tag_type, attributes) => (name, tag_type, attributes),
            _ => continue,
        };
        if !matches!(tag_type, TagType::Start | TagType::Empty) {
            continue;
        }

        match name {
            "svg" => {
                if let Some(value) = attributes.get("viewBox") {
                    declared = ViewBox::parse(value);
                }
            }
            "circle" => {
                let cx = attributes
                    .get("cx")
                    .and_then(|v| v.parse::<f32>().ok())
                    .unwrap_or(0.0);
                let cy = attributes
                    .get("cy")
                    .and_then(|v| v.parse::<f32>().ok())
                    .unwrap_or(0.0);
                match attributes.get("r").and_then(|v| v.parse::<f32>().ok()) {
                    Some(r) if r > 0.0 => primitives.push(Primitive::Circle { cx, cy, r }),
                    _ => failures.push(ParseFailure::InvalidCircle),
                }
            }
            "path" => match attributes.get("d") {
                Some(d) => primitives.push(Primitive::Path {
                    data: d.to_string(),
                }),
                None => failures.push(ParseFailure::EmptyPath),
            },
            _ => {}
        }
    }

    let effective = declared.or(view_box).unwrap_or_default();

    let mut shapes = Vec::new();
    for primitive in primitives {
        match primitive {
            Primitive::Circle { cx, cy, r } => {
                shapes.push(sample_circle(cx, cy, r, &effective));
            }
            Primitive::Path { data } => match parse_path_data(&data, &effective) {
                Ok(shape) => shapes.push(shape),
                Err(failure) => {
                    warn!("dropping path primitive: {}", failure);
                    failures.push(failure);
                }
            },
        }
    }

    (PathLibrary::from_shapes(shapes), failures)
}

/// Parse a single path-command string into a sampled shape.
///
/// Fails gracefully: any malformed or unsupported input yields a
/// [`ParseFailure`] for the caller to skip, never a panic.
pub fn parse_path_data(data: &str, view_box: &ViewBox) -> Result<PathShape, ParseFailure> {
    let commands =
        Data::parse(data).map_err(|e| ParseFailure::Malformed(e.to_string()))?;

    let mut pen: Option<Point2> = None;
    let mut subpath_start: Option<Point2> = None;
    let mut segments: Vec<Segment> = Vec::new();
    let mut closed = false;

    for command in commands.iter() {
        match command {
            Command::Move(position, params) => {
                let params: &[f32] = params;
                if params.len() < 2 || params.len() % 2 != 0 {
                    return Err(ParseFailure::Malformed(format!(
                        "move-to expects coordinate pairs, got {} values",
                        params.len()
                    )));
                }

                // An initial relative move is treated as absolute.
                let base = match position {
                    Position::Relative => pen.unwrap_or(Point2::ZERO),
                    Position::Absolute => Point2::ZERO,
                };
                let mut current = resolve(position, base, params[0], params[1]);
                subpath_start = Some(current);

                // Remaining pairs are implicit line-tos.
                for pair in params[2..].chunks_exact(2) {
                    let next = resolve(position, current, pair[0], pair[1]);
                    segments.push(Segment::Line(current, next));
                    current = next;
                }
                pen = Some(current);
            }
            Command::Line(position, params) => {
                let params: &[f32] = params;
                if params.is_empty() || params.len() % 2 != 0 {
                    return Err(ParseFailure::Malformed(format!(
                        "line-to expects coordinate pairs, got {} values",
                        params.len()
                    )));
                }
                let mut current = pen.ok_or(ParseFailure::MissingMove)?;
                for pair in params.chunks_exact(2) {
                    let next = resolve(position, current, pair[0], pair[1]);
                    segments.push(Segment::Line(current, next));
                    current = next;
                }
                pen = Some(current);
            }
            Command::CubicCurve(position, params) => {
                let params: &[f32] = params;
                if params.is_empty() || params.len() % 6 != 0 {
                    return Err(ParseFailure::Malformed(format!(
                        "cubic curve expects sextuples, got {} values",
                        params.len()
                    )));
                }
                let mut current = pen.ok_or(ParseFailure::MissingMove)?;
                for sextuple in params.chunks_exact(6) {
                    let c1 = resolve(position, current, sextuple[0], sextuple[1]);
                    let c2 = resolve(position, current, sextuple[2], sextuple[3]);
                    let end = resolve(position, current, sextuple[4], sextuple[5]);
                    segments.push(Segment::Cubic(current, c1, c2, end));
                    current = end;
                }
                pen = Some(current);
            }
            Command::Close => {
                let current = pen.ok_or(ParseFailure::MissingMove)?;
                let start = subpath_start.ok_or(ParseFailure::MissingMove)?;
                if current.distance(&start) > COINCIDENT_EPSILON {
                    segments.push(Segment::Line(current, start));
                }
                pen = Some(start);
                closed = true;
            }
            other => return Err(ParseFailure::UnsupportedCommand(command_letter(other))),
        }
    }

    if segments.is_empty() {
        return Err(ParseFailure::EmptyPath);
    }

    let offset = view_box.center();
    let points = sample_segments(&segments, PATH_SAMPLES, closed)
        .into_iter()
        .map(|p| p - offset)
        .collect();

    Ok(PathShape::polyline(points, closed))
}

/// Sample a circle primitive at the configured resolution.
fn sample_circle(cx: f32, cy: f32, r: f32, view_box: &ViewBox) -> PathShape {
    let center = Point2::new(cx, cy) - view_box.center();
    let points = (0..CIRCLE_SAMPLES)
        .map(|i| {
            let theta = (i as f32 / CIRCLE_SAMPLES as f32) * std::f32::consts::TAU;
            Point2::new(center.x + r * theta.cos(), center.y + r * theta.sin())
        })
        .collect();
    PathShape::circle(center, r, points)
}

#[inline]
fn resolve(position: &Position, base: Point2, x: f32, y: f32) -> Point2 {
    match position {
        Position::Absolute => Point2::new(x, y),
        Position::Relative => Point2::new(base.x + x, base.y + y),
    }
}

fn command_letter(command: &Command) -> char {
    match command {
        Command::Move(..) => 'M',
        Command::Line(..) => 'L',
        Command::HorizontalLine(..) => 'H',
        Command::VerticalLine(..) => 'V',
        Command::QuadraticCurve(..) => 'Q',
        Command::SmoothQuadraticCurve(..) => 'T',
        Command::CubicCurve(..) => 'C',
        Command::SmoothCubicCurve(..) => 'S',
        Command::EllipticalArc(..) => 'A',
        Command::Close => 'Z',
    }
}

/// A drawable piece of a path in raw (pre-centering) coordinates.
enum Segment {
    Line(Point2, Point2),
    Cubic(Point2, Point2, Point2, Point2),
}

impl Segment {
    /// Arc length, with cubics estimated by chord flattening.
    fn length(&self) -> f32 {
        match self {
            Segment::Line(a, b) => a.distance(b),
            Segment::Cubic(..) => {
                let mut length = 0.0;
                let mut previous = self.point_at(0.0);
                for i in 1..=CUBIC_FLATTEN_STEPS {
                    let t = i as f32 / CUBIC_FLATTEN_STEPS as f32;
                    let point = self.point_at(t);
                    length += previous.distance(&point);
                    previous = point;
                }
                length
            }
        }
    }

    /// Point at parameter t in [0, 1].
    fn point_at(&self, t: f32) -> Point2 {
        match *self {
            Segment::Line(a, b) => a + (b - a) * t,
            Segment::Cubic(p0, c1, c2, p1) => {
                let u = 1.0 - t;
                let b0 = u * u * u;
                let b1 = 3.0 * u * u * t;
                let b2 = 3.0 * u * t * t;
                let b3 = t * t * t;
                Point2::new(
                    b0 * p0.x + b1 * c1.x + b2 * c2.x + b3 * p1.x,
                    b0 * p0.y + b1 * c1.y + b2 * c2.y + b3 * p1.y,
                )
            }
        }
    }
}

/// Sample a segment chain into `count` points, spaced uniformly by arc
/// length. Closed chains sample the half-open range so the seam point is
/// not duplicated; open chains include both endpoints.
fn sample_segments(segments: &[Segment], count: usize, closed: bool) -> Vec<Point2> {
    let lengths: Vec<f32> = segments.iter().map(|s| s.length()).collect();
    let total: f32 = lengths.iter().sum();

    if total <= 0.0 {
        // Degenerate geometry collapses to its single position.
        return vec![segments[0].point_at(0.0); count.min(1)];
    }

    let denominator = if closed { count } else { count - 1 } as f32;
    let mut points = Vec::with_capacity(count);
    let mut segment_index = 0;
    let mut consumed = 0.0;

    for i in 0..count {
        let target = total * i as f32 / denominator;

        while segment_index + 1 < segments.len()
            && consumed + lengths[segment_index] < target
        {
            consumed += lengths[segment_index];
            segment_index += 1;
        }

        let segment_length = lengths[segment_index];
        let t = if segment_length > 0.0 {
            ((target - consumed) / segment_length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        points.push(segments[segment_index].point_at(t));
    }

    points
}
