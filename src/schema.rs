//! Diagram schema: the shape-type taxonomy and the attribute bundles a diagram
//! may carry.
//!
//! Every bundle is optional at this level. Which bundles a shape type actually
//! needs is described by [`ShapeType::rules`] and enforced by the validator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    CoordinatePolygon,
    Triangle,
    RightTriangle,
    IsoscelesTriangle,
    Quadrilateral,
    Rectangle,
    Square,
    Parallelogram,
    Trapezoid,
    Rhombus,
    Circle,
    Chord,
    Tangent,
    Secant,
    Arc,
    Sector,
    NumberLine,
    Inequality,
    LineSegment,
    Ray,
    Rotation,
    Reflection,
    Translation,
    Dilation,
    Angle,
    ComplementaryAngles,
    SupplementaryAngles,
    VerticalAngles,
    Prism,
    Cylinder,
    Cone,
    Sphere,
    Pyramid,
}

/// The five renderable families plus the solids, which have no renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Polygon,
    Circle,
    NumberLine,
    Transformation,
    Angle,
    Solid,
}

/// A top-level bundle (or nested field) a shape type cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Vertices,
    Axes,
    Circle,
    ChordPoints,
    Transformation,
    Angle,
    NumberLine,
}

impl RequiredField {
    pub fn as_field(self) -> &'static str {
        match self {
            RequiredField::Vertices => "vertices",
            RequiredField::Axes => "axes",
            RequiredField::Circle => "circle",
            RequiredField::ChordPoints => "circle.chordPoints",
            RequiredField::Transformation => "transformation",
            RequiredField::Angle => "angle",
            RequiredField::NumberLine => "numberLine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexCount {
    Exact(usize),
    AtLeast(usize),
}

impl VertexCount {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            VertexCount::Exact(n) => count == n,
            VertexCount::AtLeast(n) => count >= n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRules {
    pub required: &'static [RequiredField],
    pub vertex_count: Option<VertexCount>,
}

const POLYGON: &[RequiredField] = &[RequiredField::Vertices];
const CIRCLE: &[RequiredField] = &[RequiredField::Circle];
const CHORDED_CIRCLE: &[RequiredField] = &[RequiredField::Circle, RequiredField::ChordPoints];
const NUMBER_LINE: &[RequiredField] = &[RequiredField::NumberLine];
const TRANSFORMATION: &[RequiredField] = &[RequiredField::Transformation];
const ANGLE: &[RequiredField] = &[RequiredField::Angle];

impl ShapeType {
    pub const ALL: [ShapeType; 33] = [
        ShapeType::CoordinatePolygon,
        ShapeType::Triangle,
        ShapeType::RightTriangle,
        ShapeType::IsoscelesTriangle,
        ShapeType::Quadrilateral,
        ShapeType::Rectangle,
        ShapeType::Square,
        ShapeType::Parallelogram,
        ShapeType::Trapezoid,
        ShapeType::Rhombus,
        ShapeType::Circle,
        ShapeType::Chord,
        ShapeType::Tangent,
        ShapeType::Secant,
        ShapeType::Arc,
        ShapeType::Sector,
        ShapeType::NumberLine,
        ShapeType::Inequality,
        ShapeType::LineSegment,
        ShapeType::Ray,
        ShapeType::Rotation,
        ShapeType::Reflection,
        ShapeType::Translation,
        ShapeType::Dilation,
        ShapeType::Angle,
        ShapeType::ComplementaryAngles,
        ShapeType::SupplementaryAngles,
        ShapeType::VerticalAngles,
        ShapeType::Prism,
        ShapeType::Cylinder,
        ShapeType::Cone,
        ShapeType::Sphere,
        ShapeType::Pyramid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeType::CoordinatePolygon => "coordinate_polygon",
            ShapeType::Triangle => "triangle",
            ShapeType::RightTriangle => "right_triangle",
            ShapeType::IsoscelesTriangle => "isosceles_triangle",
            ShapeType::Quadrilateral => "quadrilateral",
            ShapeType::Rectangle => "rectangle",
            ShapeType::Square => "square",
            ShapeType::Parallelogram => "parallelogram",
            ShapeType::Trapezoid => "trapezoid",
            ShapeType::Rhombus => "rhombus",
            ShapeType::Circle => "circle",
            ShapeType::Chord => "chord",
            ShapeType::Tangent => "tangent",
            ShapeType::Secant => "secant",
            ShapeType::Arc => "arc",
            ShapeType::Sector => "sector",
            ShapeType::NumberLine => "number_line",
            ShapeType::Inequality => "inequality",
            ShapeType::LineSegment => "line_segment",
            ShapeType::Ray => "ray",
            ShapeType::Rotation => "rotation",
            ShapeType::Reflection => "reflection",
            ShapeType::Translation => "translation",
            ShapeType::Dilation => "dilation",
            ShapeType::Angle => "angle",
            ShapeType::ComplementaryAngles => "complementary_angles",
            ShapeType::SupplementaryAngles => "supplementary_angles",
            ShapeType::VerticalAngles => "vertical_angles",
            ShapeType::Prism => "prism",
            ShapeType::Cylinder => "cylinder",
            ShapeType::Cone => "cone",
            ShapeType::Sphere => "sphere",
            ShapeType::Pyramid => "pyramid",
        }
    }

    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeType::CoordinatePolygon
            | ShapeType::Triangle
            | ShapeType::RightTriangle
            | ShapeType::IsoscelesTriangle
            | ShapeType::Quadrilateral
            | ShapeType::Rectangle
            | ShapeType::Square
            | ShapeType::Parallelogram
            | ShapeType::Trapezoid
            | ShapeType::Rhombus => ShapeFamily::Polygon,
            ShapeType::Circle
            | ShapeType::Chord
            | ShapeType::Tangent
            | ShapeType::Secant
            | ShapeType::Arc
            | ShapeType::Sector => ShapeFamily::Circle,
            ShapeType::NumberLine
            | ShapeType::Inequality
            | ShapeType::LineSegment
            | ShapeType::Ray => ShapeFamily::NumberLine,
            ShapeType::Rotation
            | ShapeType::Reflection
            | ShapeType::Translation
            | ShapeType::Dilation => ShapeFamily::Transformation,
            ShapeType::Angle
            | ShapeType::ComplementaryAngles
            | ShapeType::SupplementaryAngles
            | ShapeType::VerticalAngles => ShapeFamily::Angle,
            ShapeType::Prism
            | ShapeType::Cylinder
            | ShapeType::Cone
            | ShapeType::Sphere
            | ShapeType::Pyramid => ShapeFamily::Solid,
        }
    }

    /// Required bundles and vertex-count constraint for this shape type.
    pub fn rules(self) -> ShapeRules {
        let (required, vertex_count) = match self {
            ShapeType::CoordinatePolygon => (POLYGON, Some(VertexCount::AtLeast(2))),
            ShapeType::Triangle | ShapeType::RightTriangle | ShapeType::IsoscelesTriangle => {
                (POLYGON, Some(VertexCount::Exact(3)))
            }
            ShapeType::Quadrilateral
            | ShapeType::Rectangle
            | ShapeType::Square
            | ShapeType::Parallelogram
            | ShapeType::Trapezoid
            | ShapeType::Rhombus => (POLYGON, Some(VertexCount::Exact(4))),
            ShapeType::Chord | ShapeType::Secant => (CHORDED_CIRCLE, None),
            ShapeType::Circle | ShapeType::Tangent | ShapeType::Arc | ShapeType::Sector => {
                (CIRCLE, None)
            }
            ShapeType::NumberLine
            | ShapeType::Inequality
            | ShapeType::LineSegment
            | ShapeType::Ray => (NUMBER_LINE, None),
            ShapeType::Rotation
            | ShapeType::Reflection
            | ShapeType::Translation
            | ShapeType::Dilation => (TRANSFORMATION, None),
            ShapeType::Angle
            | ShapeType::ComplementaryAngles
            | ShapeType::SupplementaryAngles
            | ShapeType::VerticalAngles => (ANGLE, None),
            ShapeType::Prism
            | ShapeType::Cylinder
            | ShapeType::Cone
            | ShapeType::Sphere
            | ShapeType::Pyramid => (&[][..], None),
        };
        ShapeRules {
            required,
            vertex_count,
        }
    }
}

static SHAPE_TYPES_BY_NAME: Lazy<BTreeMap<&'static str, ShapeType>> = Lazy::new(|| {
    ShapeType::ALL
        .iter()
        .map(|shape| (shape.as_str(), *shape))
        .collect()
});

impl FromStr for ShapeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SHAPE_TYPES_BY_NAME
            .get(value)
            .copied()
            .ok_or_else(|| format!("unknown shape type '{value}'"))
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_known_shape_type(value: &str) -> bool {
    SHAPE_TYPES_BY_NAME.contains_key(value)
}

/// The decoded `shapeType` tag. Unrecognized names are kept so the validator
/// can report them instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeTag {
    Known(ShapeType),
    Unknown(String),
}

impl ShapeTag {
    pub fn as_str(&self) -> &str {
        match self {
            ShapeTag::Known(shape) => shape.as_str(),
            ShapeTag::Unknown(name) => name,
        }
    }

    pub fn known(&self) -> Option<ShapeType> {
        match self {
            ShapeTag::Known(shape) => Some(*shape),
            ShapeTag::Unknown(_) => None,
        }
    }
}

impl From<ShapeType> for ShapeTag {
    fn from(shape: ShapeType) -> Self {
        ShapeTag::Known(shape)
    }
}

impl Serialize for ShapeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShapeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(match name.parse::<ShapeType>() {
            Ok(shape) => ShapeTag::Known(shape),
            Err(_) => ShapeTag::Unknown(name),
        })
    }
}

/// How a displayed diagram was produced. Only the display layer acts on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramSource {
    Library,
    Structured,
    AiFallback,
    None,
}

impl DiagramSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagramSource::Library => "library",
            DiagramSource::Structured => "structured",
            DiagramSource::AiFallback => "ai_fallback",
            DiagramSource::None => "none",
        }
    }
}

pub fn is_known_diagram_source(value: &str) -> bool {
    matches!(value, "library" | "structured" | "ai_fallback" | "none")
}

/// Coordinate decoding: numbers pass through, numeric strings are parsed and
/// anything symbolic (`"2√3"`, `"a+1"`) becomes NaN so it is reported as an
/// algebraic coordinate rather than rejected by the decoder.
mod coordinate {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn resolve(raw: Raw) -> f64 {
        match raw {
            Raw::Number(value) => value,
            Raw::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Raw::deserialize(deserializer).map(resolve)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(resolve))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    #[serde(default)]
    pub label: String,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub x: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub y: f64,
    #[serde(
        default,
        deserialize_with = "coordinate::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<VertexStyle>,
}

impl Vertex {
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            z: None,
            style: None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }

    pub fn highlighted(&self) -> bool {
        self.style.as_ref().is_some_and(|style| style.highlighted)
    }
}

/// A labelled location that is not one of the diagram's vertices (circle
/// centre, rotation centre, angle rays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub x: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn default_true() -> bool {
    true
}

fn default_step() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axes {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub min_x: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub max_x: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub min_y: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub max_y: f64,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_numbers: bool,
    #[serde(default = "default_step")]
    pub tick_step: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl Axes {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            show_grid: true,
            show_numbers: true,
            tick_step: 1.0,
            x_label: None,
            y_label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Length,
    Angle,
    Area,
    Perimeter,
    Volume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub kind: MeasurementKind,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl Measurement {
    pub fn length(value: f64, unit: impl Into<String>, from: &str, to: &str) -> Self {
        Self {
            kind: MeasurementKind::Length,
            value,
            unit: unit.into(),
            label: None,
            applies_to: vec![from.to_string(), to.to_string()],
        }
    }
}

/// Arc range in degrees, measured counter-clockwise from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcRange {
    pub start_angle: f64,
    pub end_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Point>,
    #[serde(
        default,
        deserialize_with = "coordinate::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord_points: Option<Vec<Vertex>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent_point: Option<Vertex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<ArcRange>,
}

impl CircleProperties {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center: Some(center),
            radius: Some(radius),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationProperties {
    #[serde(default)]
    pub original_vertices: Vec<Vertex>,
    #[serde(default)]
    pub transformed_vertices: Vec<Vertex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_center: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_line: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_vector: Option<Vector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dilation_center: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray1_end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray2_end: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointMarker {
    Open,
    #[default]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberLinePoint {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "type")]
    pub marker: PointMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadedRegion {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub start: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub end: f64,
    #[serde(default = "default_true")]
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberLineProperties {
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub min: f64,
    #[serde(deserialize_with = "coordinate::deserialize")]
    pub max: f64,
    #[serde(default = "default_step", deserialize_with = "coordinate::deserialize")]
    pub tick_interval: f64,
    #[serde(default)]
    pub points: Vec<NumberLinePoint>,
    #[serde(default)]
    pub regions: Vec<ShadedRegion>,
}

impl NumberLineProperties {
    pub fn new(min: f64, max: f64, tick_interval: f64) -> Self {
        Self {
            min,
            max,
            tick_interval,
            points: Vec::new(),
            regions: Vec::new(),
        }
    }
}

/// Root diagram record, tagged by `shapeType`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default, alias = "shape_type", skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Vertex>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Axes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measurements: Vec<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<CircleProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<TransformationProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<AngleProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_line: Option<NumberLineProperties>,
}

impl Diagram {
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            shape_type: Some(shape_type.into()),
            ..Default::default()
        }
    }

    pub fn with_vertices(mut self, vertices: Vec<Vertex>) -> Self {
        self.vertices = Some(vertices);
        self
    }

    /// The recognized shape type, if any.
    pub fn known_shape_type(&self) -> Option<ShapeType> {
        self.shape_type.as_ref().and_then(ShapeTag::known)
    }

    pub fn vertex(&self, label: &str) -> Option<&Vertex> {
        self.vertices
            .as_deref()
            .and_then(|vertices| vertices.iter().find(|v| v.label == label))
    }
}

pub fn has_non_finite_coordinate(vertices: &[Vertex]) -> bool {
    vertices.iter().any(|vertex| !vertex.is_finite())
}

/// Euclidean distance comparison. Non-finite input is never "too close".
pub fn are_too_close(v1: &Vertex, v2: &Vertex, threshold: f64) -> bool {
    let distance = (v1.x - v2.x).hypot(v1.y - v2.y);
    distance < threshold
}
