//! Structural and numeric validation of diagram metadata.
//!
//! Validation never fails: every finding is collected into a
//! [`ValidationResult`]. Only a missing or unrecognized shape type stops the
//! checks early, and non-finite vertex coordinates skip the remaining vertex
//! checks because numeric comparisons on them are meaningless.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::error::{DiagramError, ErrorCode, Result};
use crate::schema::{
    Axes, CircleProperties, Diagram, MeasurementKind, NumberLineProperties, RequiredField,
    ShapeRules, ShapeTag, ShapeType, TransformationProperties, Vertex, VertexCount,
    are_too_close, has_non_finite_coordinate,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Use the wide coordinate window instead of the default one.
    pub extended_bounds: bool,
    /// Promote out-of-bounds coordinates from warnings to errors.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    pub fn count_code(&self, code: ErrorCode) -> usize {
        self.errors.iter().filter(|issue| issue.code == code).count()
    }
}

struct Findings {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, field: Option<String>) {
        self.errors.push(ValidationIssue {
            code,
            message: message.into(),
            field,
        });
    }

    fn warn(&mut self, message: impl Into<String>, field: Option<String>) {
        self.warnings.push(ValidationWarning {
            message: message.into(),
            field,
        });
    }

    fn finish(self) -> ValidationResult {
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

pub fn validate(diagram: &Diagram, options: ValidationOptions) -> ValidationResult {
    validate_with_config(diagram, options, &ValidationConfig::default())
}

pub fn validate_with_config(
    diagram: &Diagram,
    options: ValidationOptions,
    config: &ValidationConfig,
) -> ValidationResult {
    let mut findings = Findings::new();

    let shape = match &diagram.shape_type {
        None => {
            findings.error(
                ErrorCode::MissingRequiredField,
                "shapeType is required",
                Some("shapeType".to_string()),
            );
            return findings.finish();
        }
        Some(ShapeTag::Unknown(name)) => {
            findings.error(
                ErrorCode::InvalidShapeType,
                format!("unknown shape type '{name}'"),
                Some("shapeType".to_string()),
            );
            return findings.finish();
        }
        Some(ShapeTag::Known(shape)) => *shape,
    };

    let rules = shape.rules();
    check_required_fields(diagram, &rules, &mut findings);

    if let Some(vertices) = &diagram.vertices {
        check_vertices(vertices, rules.vertex_count, options, config, &mut findings);
    }
    if let Some(axes) = &diagram.axes {
        check_axes(axes, &mut findings);
    }
    if let Some(circle) = &diagram.circle {
        check_circle(circle, &mut findings);
    }

    check_measurements(diagram, &mut findings);
    if let Some(number_line) = &diagram.number_line {
        check_number_line(number_line, config, &mut findings);
    }
    if let Some(transformation) = &diagram.transformation {
        check_transformation(transformation, &mut findings);
    }
    if let Some(measure) = diagram.angle.as_ref().and_then(|angle| angle.measure) {
        if !measure.is_finite() {
            findings.error(
                ErrorCode::InvalidCoordinates,
                "angle measure must be a finite number",
                Some("angle.measure".to_string()),
            );
        }
    }

    let result = findings.finish();
    log::debug!(
        shape_type = shape.as_str(),
        errors = result.errors.len(),
        warnings = result.warnings.len();
        "Diagram validated"
    );
    result
}

pub fn is_valid(diagram: &Diagram, options: ValidationOptions) -> bool {
    validate(diagram, options).is_valid
}

/// Fail-fast wrapper: the error carries the first finding's code and message
/// and the complete error and warning lists under `details`.
pub fn validate_or_raise(diagram: &Diagram, options: ValidationOptions) -> Result<ValidationResult> {
    let result = validate(diagram, options);
    let Some(first) = result.errors.first() else {
        return Ok(result);
    };
    let mut err = DiagramError::new(first.code, first.message.clone())
        .with_detail("errors", &result.errors)
        .with_detail("warnings", &result.warnings);
    if let Some(field) = &first.field {
        err = err.with_detail("field", field);
    }
    Err(err)
}

fn check_required_fields(diagram: &Diagram, rules: &ShapeRules, findings: &mut Findings) {
    for field in rules.required {
        let present = match field {
            RequiredField::Vertices => diagram.vertices.is_some(),
            RequiredField::Axes => diagram.axes.is_some(),
            RequiredField::Circle => diagram.circle.is_some(),
            // Reported under `circle` when the whole bundle is missing.
            RequiredField::ChordPoints => diagram
                .circle
                .as_ref()
                .is_none_or(|circle| circle.chord_points.is_some()),
            RequiredField::Transformation => diagram.transformation.is_some(),
            RequiredField::Angle => diagram.angle.is_some(),
            RequiredField::NumberLine => diagram.number_line.is_some(),
        };
        if !present {
            findings.error(
                ErrorCode::MissingRequiredField,
                format!("{} is required", field.as_field()),
                Some(field.as_field().to_string()),
            );
        }
    }
}

fn check_vertices(
    vertices: &[Vertex],
    vertex_count: Option<VertexCount>,
    options: ValidationOptions,
    config: &ValidationConfig,
    findings: &mut Findings,
) {
    if has_non_finite_coordinate(vertices) {
        findings.error(
            ErrorCode::AlgebraicCoordinates,
            "vertex coordinates must be numeric; symbolic or non-finite values cannot be plotted",
            Some("vertices".to_string()),
        );
        return;
    }

    if let Some(count) = vertex_count {
        if !count.accepts(vertices.len()) {
            let expected = match count {
                VertexCount::Exact(n) => format!("exactly {n}"),
                VertexCount::AtLeast(n) => format!("at least {n}"),
            };
            findings.error(
                ErrorCode::InsufficientVertices,
                format!("expected {expected} vertices, found {}", vertices.len()),
                Some("vertices".to_string()),
            );
        }
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (idx, vertex) in vertices.iter().enumerate() {
        let field = format!("vertices[{idx}]");
        if vertex.label.trim().is_empty() {
            findings.error(
                ErrorCode::MissingRequiredField,
                format!("vertex {idx} has no label"),
                Some(format!("{field}.label")),
            );
        } else if !seen.insert(vertex.label.as_str()) {
            findings.error(
                ErrorCode::DuplicateVertexLabels,
                format!("vertex label '{}' is used more than once", vertex.label),
                Some(format!("{field}.label")),
            );
        }
    }

    let bound = if options.extended_bounds {
        config.extended_bound
    } else {
        config.default_bound
    };
    for (idx, vertex) in vertices.iter().enumerate() {
        let field = format!("vertices[{idx}]");
        for (axis, value) in [("x", vertex.x), ("y", vertex.y)] {
            if !value.is_finite() {
                findings.error(
                    ErrorCode::InvalidCoordinates,
                    format!("vertex '{}' has a non-finite {axis} coordinate", vertex.label),
                    Some(format!("{field}.{axis}")),
                );
                continue;
            }
            if value < -bound || value > bound {
                let message = format!(
                    "vertex '{}' {axis} = {value} lies outside [{}, {bound}]",
                    vertex.label, -bound
                );
                if options.strict {
                    findings.error(
                        ErrorCode::CoordinatesOutOfBounds,
                        message,
                        Some(format!("{field}.{axis}")),
                    );
                } else {
                    findings.warn(message, Some(format!("{field}.{axis}")));
                }
            }
        }
    }

    for (i, first) in vertices.iter().enumerate() {
        for second in &vertices[i + 1..] {
            if are_too_close(first, second, config.min_vertex_distance) {
                findings.error(
                    ErrorCode::OverlappingVertices,
                    format!(
                        "vertices '{}' and '{}' are closer than {}",
                        first.label, second.label, config.min_vertex_distance
                    ),
                    Some("vertices".to_string()),
                );
            }
        }
    }
}

fn check_axes(axes: &Axes, findings: &mut Findings) {
    let bounds = [
        ("minX", axes.min_x),
        ("maxX", axes.max_x),
        ("minY", axes.min_y),
        ("maxY", axes.max_y),
    ];
    let mut all_finite = true;
    for (name, value) in bounds {
        if !value.is_finite() {
            all_finite = false;
            findings.error(
                ErrorCode::InvalidCoordinates,
                format!("axes.{name} must be a finite number"),
                Some(format!("axes.{name}")),
            );
        }
    }
    if !all_finite {
        return;
    }
    if axes.min_x >= axes.max_x {
        findings.error(
            ErrorCode::InvalidCoordinates,
            format!("axes.minX ({}) must be less than axes.maxX ({})", axes.min_x, axes.max_x),
            Some("axes.minX".to_string()),
        );
    }
    if axes.min_y >= axes.max_y {
        findings.error(
            ErrorCode::InvalidCoordinates,
            format!("axes.minY ({}) must be less than axes.maxY ({})", axes.min_y, axes.max_y),
            Some("axes.minY".to_string()),
        );
    }
}

fn check_circle(circle: &CircleProperties, findings: &mut Findings) {
    match &circle.center {
        None => findings.error(
            ErrorCode::MissingRequiredField,
            "circle.center is required",
            Some("circle.center".to_string()),
        ),
        Some(center) if !center.is_finite() => findings.error(
            ErrorCode::InvalidCoordinates,
            "circle.center must have finite x and y",
            Some("circle.center".to_string()),
        ),
        Some(_) => {}
    }

    match circle.radius {
        None => findings.error(
            ErrorCode::MissingRequiredField,
            "circle.radius is required",
            Some("circle.radius".to_string()),
        ),
        Some(radius) if !radius.is_finite() || radius <= 0.0 => findings.error(
            ErrorCode::InvalidCoordinates,
            format!("circle.radius must be a positive finite number, found {radius}"),
            Some("circle.radius".to_string()),
        ),
        Some(_) => {}
    }

    if let Some(points) = &circle.chord_points {
        if points.len() != 2 {
            findings.error(
                ErrorCode::InsufficientVertices,
                format!("circle.chordPoints needs exactly 2 points, found {}", points.len()),
                Some("circle.chordPoints".to_string()),
            );
        }
        if has_non_finite_coordinate(points) {
            findings.error(
                ErrorCode::InvalidCoordinates,
                "circle.chordPoints must have finite coordinates",
                Some("circle.chordPoints".to_string()),
            );
        }
    }
    if let Some(point) = &circle.tangent_point {
        if !point.is_finite() {
            findings.error(
                ErrorCode::InvalidCoordinates,
                "circle.tangentPoint must have finite coordinates",
                Some("circle.tangentPoint".to_string()),
            );
        }
    }
}

fn check_measurements(diagram: &Diagram, findings: &mut Findings) {
    for (idx, measurement) in diagram.measurements.iter().enumerate() {
        let field = format!("measurements[{idx}]");
        if !measurement.value.is_finite() {
            findings.error(
                ErrorCode::InvalidMeasurement,
                format!("measurement {idx} has a non-finite value"),
                Some(format!("{field}.value")),
            );
        }
        if measurement.kind != MeasurementKind::Length {
            continue;
        }
        if measurement.applies_to.len() != 2 {
            findings.error(
                ErrorCode::InvalidMeasurement,
                format!(
                    "length measurement {idx} must apply to exactly 2 vertices, found {}",
                    measurement.applies_to.len()
                ),
                Some(format!("{field}.appliesTo")),
            );
            continue;
        }
        for label in &measurement.applies_to {
            if diagram.vertex(label).is_none() {
                findings.error(
                    ErrorCode::InvalidMeasurement,
                    format!("length measurement {idx} refers to unknown vertex '{label}'"),
                    Some(format!("{field}.appliesTo")),
                );
            }
        }
    }
}

fn check_number_line(
    number_line: &NumberLineProperties,
    config: &ValidationConfig,
    findings: &mut Findings,
) {
    if !number_line.min.is_finite() || !number_line.max.is_finite() {
        findings.error(
            ErrorCode::InvalidCoordinates,
            "numberLine.min and numberLine.max must be finite",
            Some("numberLine".to_string()),
        );
        return;
    }
    if number_line.min >= number_line.max {
        findings.error(
            ErrorCode::InvalidCoordinates,
            format!(
                "numberLine.min ({}) must be less than numberLine.max ({})",
                number_line.min, number_line.max
            ),
            Some("numberLine.min".to_string()),
        );
        return;
    }
    let interval = number_line.tick_interval;
    if !interval.is_finite() || interval <= 0.0 {
        findings.error(
            ErrorCode::InvalidCoordinates,
            format!("numberLine.tickInterval must be a positive finite number, found {interval}"),
            Some("numberLine.tickInterval".to_string()),
        );
        return;
    }
    let ticks = (number_line.max - number_line.min) / interval;
    if ticks > config.max_number_line_ticks as f64 {
        findings.warn(
            format!(
                "numberLine would draw about {} ticks; only every few are drawn to stay under {}",
                ticks.floor(),
                config.max_number_line_ticks
            ),
            Some("numberLine.tickInterval".to_string()),
        );
    }
    let non_finite_point = number_line.points.iter().any(|p| !p.value.is_finite());
    let non_finite_region = number_line
        .regions
        .iter()
        .any(|r| !r.start.is_finite() || !r.end.is_finite());
    if non_finite_point || non_finite_region {
        findings.error(
            ErrorCode::InvalidCoordinates,
            "numberLine points and regions must be finite",
            Some("numberLine".to_string()),
        );
    }
}

fn check_transformation(transformation: &TransformationProperties, findings: &mut Findings) {
    if has_non_finite_coordinate(&transformation.original_vertices)
        || has_non_finite_coordinate(&transformation.transformed_vertices)
    {
        findings.error(
            ErrorCode::AlgebraicCoordinates,
            "transformation vertices must be numeric",
            Some("transformation".to_string()),
        );
        return;
    }
    if transformation.original_vertices.is_empty() {
        findings.error(
            ErrorCode::InsufficientVertices,
            "transformation.originalVertices is empty",
            Some("transformation.originalVertices".to_string()),
        );
    }
    let original = transformation.original_vertices.len();
    let transformed = transformation.transformed_vertices.len();
    if original != transformed {
        findings.warn(
            format!("transformation has {original} original vertices but {transformed} transformed vertices"),
            Some("transformation.transformedVertices".to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Measurement, NumberLinePoint, Point, PointMarker};

    fn triangle(vertices: &[(&str, f64, f64)]) -> Diagram {
        Diagram::new(ShapeType::Triangle).with_vertices(
            vertices
                .iter()
                .map(|(label, x, y)| Vertex::new(*label, *x, *y))
                .collect(),
        )
    }

    fn lenient() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn strict() -> ValidationOptions {
        ValidationOptions {
            strict: true,
            ..Default::default()
        }
    }

    #[test]
    fn valid_triangle_has_no_errors() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 4.0, 0.0), ("C", 0.0, 3.0)]);
        let result = validate(&diagram, lenient());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_shape_type_short_circuits() {
        let diagram = Diagram {
            vertices: Some(vec![Vertex::new("A", 0.0, 0.0), Vertex::new("A", 0.0, 0.0)]),
            ..Default::default()
        };
        let result = validate(&diagram, lenient());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MissingRequiredField);
        assert_eq!(result.errors[0].field.as_deref(), Some("shapeType"));
    }

    #[test]
    fn unknown_shape_type_short_circuits() {
        let diagram = Diagram {
            shape_type: Some(ShapeTag::Unknown("klein_bottle".to_string())),
            ..Default::default()
        };
        let result = validate(&diagram, lenient());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::InvalidShapeType);
    }

    #[test]
    fn missing_bundle_is_reported_per_field() {
        let result = validate(&Diagram::new(ShapeType::Triangle), lenient());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::MissingRequiredField);
        assert_eq!(result.errors[0].field.as_deref(), Some("vertices"));

        let result = validate(&Diagram::new(ShapeType::Rotation), lenient());
        assert_eq!(result.errors[0].field.as_deref(), Some("transformation"));
        let result = validate(&Diagram::new(ShapeType::NumberLine), lenient());
        assert_eq!(result.errors[0].field.as_deref(), Some("numberLine"));
    }

    #[test]
    fn chord_needs_chord_points() {
        let mut diagram = Diagram::new(ShapeType::Chord);
        diagram.circle = Some(CircleProperties::new(Point::new(0.0, 0.0), 2.0));
        let result = validate(&diagram, lenient());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("circle.chordPoints"));

        let result = validate(&Diagram::new(ShapeType::Chord), lenient());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("circle"));
    }

    #[test]
    fn duplicate_labels() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("A", 4.0, 0.0), ("C", 0.0, 3.0)]);
        let result = validate(&diagram, lenient());
        assert!(result.has_code(ErrorCode::DuplicateVertexLabels));
        assert!(!result.is_valid);
    }

    #[test]
    fn every_repeat_is_reported() {
        let diagram = Diagram::new(ShapeType::CoordinatePolygon).with_vertices(vec![
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("A", 1.0, 0.0),
            Vertex::new("A", 2.0, 0.0),
        ]);
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::DuplicateVertexLabels), 2);
    }

    #[test]
    fn blank_label_is_missing_field() {
        let diagram = triangle(&[("A", 0.0, 0.0), (" ", 4.0, 0.0), ("C", 0.0, 3.0)]);
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::MissingRequiredField), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("vertices[1].label"));
    }

    #[test]
    fn non_finite_coordinates_skip_other_vertex_checks() {
        // Duplicate labels, wrong count and overlap would all fire otherwise.
        let diagram = Diagram::new(ShapeType::Triangle).with_vertices(vec![
            Vertex::new("A", f64::NAN, 0.0),
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("B", 0.0, 0.0),
            Vertex::new("C", 99.0, 0.0),
        ]);
        let result = validate(&diagram, strict());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::AlgebraicCoordinates);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn overlap_fires_in_every_mode() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 0.05, 0.05), ("C", 0.0, 3.0)]);
        for extended_bounds in [false, true] {
            for strict in [false, true] {
                let result = validate(
                    &diagram,
                    ValidationOptions {
                        extended_bounds,
                        strict,
                    },
                );
                assert_eq!(result.count_code(ErrorCode::OverlappingVertices), 1);
            }
        }
    }

    #[test]
    fn out_of_bounds_is_warning_unless_strict() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 11.0, 0.0), ("C", 0.0, 3.0)]);

        let result = validate(&diagram, lenient());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field.as_deref(), Some("vertices[1].x"));

        let result = validate(&diagram, strict());
        assert!(!result.is_valid);
        assert_eq!(result.count_code(ErrorCode::CoordinatesOutOfBounds), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn extended_bounds_widen_the_window() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 45.0, 0.0), ("C", 0.0, -49.5)]);
        let options = ValidationOptions {
            extended_bounds: true,
            strict: true,
        };
        assert!(validate(&diagram, options).is_valid);

        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 51.0, 0.0), ("C", 0.0, 3.0)]);
        assert!(validate(&diagram, options).has_code(ErrorCode::CoordinatesOutOfBounds));
    }

    #[test]
    fn vertex_count_constraints() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 4.0, 0.0)]);
        assert!(validate(&diagram, lenient()).has_code(ErrorCode::InsufficientVertices));

        let diagram = Diagram::new(ShapeType::Square).with_vertices(vec![
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("B", 1.0, 0.0),
            Vertex::new("C", 1.0, 1.0),
            Vertex::new("D", 0.0, 1.0),
            Vertex::new("E", 0.5, 2.0),
        ]);
        assert!(validate(&diagram, lenient()).has_code(ErrorCode::InsufficientVertices));

        let diagram = Diagram::new(ShapeType::CoordinatePolygon)
            .with_vertices(vec![Vertex::new("A", 0.0, 0.0), Vertex::new("B", 1.0, 0.0)]);
        assert!(validate(&diagram, lenient()).is_valid);
    }

    #[test]
    fn axes_must_be_ordered() {
        let mut diagram = triangle(&[("A", 0.0, 0.0), ("B", 4.0, 0.0), ("C", 0.0, 3.0)]);
        diagram.axes = Some(Axes::new(5.0, -5.0, -5.0, 5.0));
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::InvalidCoordinates), 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("axes.minX"));

        diagram.axes = Some(Axes::new(-5.0, 5.0, 2.0, 2.0));
        assert_eq!(
            validate(&diagram, lenient()).count_code(ErrorCode::InvalidCoordinates),
            1
        );

        diagram.axes = Some(Axes::new(f64::NAN, 5.0, f64::INFINITY, 5.0));
        assert_eq!(
            validate(&diagram, lenient()).count_code(ErrorCode::InvalidCoordinates),
            2
        );
    }

    #[test]
    fn circle_checks() {
        let mut diagram = Diagram::new(ShapeType::Circle);
        diagram.circle = Some(CircleProperties::new(Point::new(0.0, 0.0), 0.0));
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::InvalidCoordinates), 1);

        diagram.circle = Some(CircleProperties {
            center: None,
            radius: Some(2.0),
            ..Default::default()
        });
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::MissingRequiredField), 1);

        diagram.circle = Some(CircleProperties::new(Point::new(f64::NAN, 0.0), -1.0));
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::InvalidCoordinates), 2);

        diagram.circle = Some(CircleProperties::new(Point::new(0.0, 0.0), 3.0));
        assert!(validate(&diagram, lenient()).is_valid);
    }

    #[test]
    fn length_measurements_must_resolve() {
        let mut diagram = triangle(&[("A", 0.0, 0.0), ("B", 4.0, 0.0), ("C", 0.0, 3.0)]);
        diagram.measurements.push(Measurement::length(4.0, "cm", "A", "B"));
        assert!(validate(&diagram, lenient()).is_valid);

        diagram.measurements.push(Measurement::length(5.0, "cm", "B", "Z"));
        let result = validate(&diagram, lenient());
        assert_eq!(result.count_code(ErrorCode::InvalidMeasurement), 1);
        assert_eq!(result.errors[0].code.as_str(), "GEO_P09");
    }

    #[test]
    fn number_line_checks() {
        let mut diagram = Diagram::new(ShapeType::NumberLine);
        let mut line = NumberLineProperties::new(-5.0, 5.0, 1.0);
        line.points.push(NumberLinePoint {
            value: 2.0,
            label: None,
            marker: PointMarker::Open,
        });
        diagram.number_line = Some(line.clone());
        assert!(validate(&diagram, lenient()).is_valid);

        line.tick_interval = 0.0;
        diagram.number_line = Some(line.clone());
        assert!(validate(&diagram, lenient()).has_code(ErrorCode::InvalidCoordinates));

        line.tick_interval = 0.001;
        diagram.number_line = Some(line);
        let result = validate(&diagram, lenient());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn transformation_cardinality_mismatch_is_a_warning() {
        let mut diagram = Diagram::new(ShapeType::Translation);
        diagram.transformation = Some(TransformationProperties {
            original_vertices: vec![Vertex::new("A", 0.0, 0.0), Vertex::new("B", 1.0, 0.0)],
            transformed_vertices: vec![Vertex::new("A'", 2.0, 0.0)],
            ..Default::default()
        });
        let result = validate(&diagram, lenient());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn raise_carries_full_lists() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("A", 0.0, 0.0), ("C", 20.0, 3.0)]);
        let err = validate_or_raise(&diagram, lenient()).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateVertexLabels);
        let errors = err.details["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(err.details["warnings"].as_array().unwrap().len(), 1);

        let ok = triangle(&[("A", 0.0, 0.0), ("B", 4.0, 0.0), ("C", 0.0, 3.0)]);
        assert!(validate_or_raise(&ok, lenient()).is_ok());
        assert!(is_valid(&ok, lenient()));
    }

    #[test]
    fn custom_distance_threshold() {
        let diagram = triangle(&[("A", 0.0, 0.0), ("B", 0.5, 0.0), ("C", 0.0, 3.0)]);
        let config = ValidationConfig {
            min_vertex_distance: 1.0,
            ..Default::default()
        };
        let result = validate_with_config(&diagram, lenient(), &config);
        assert!(result.has_code(ErrorCode::OverlappingVertices));
    }
}
