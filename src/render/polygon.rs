use crate::error::{DiagramError, Result};
use crate::schema::{Measurement, MeasurementKind, ShapeType, Vertex};

use super::canvas::{Anchor, Bounds, Frame, Stroke, SvgWriter, TextStyle, format_number, resolve_color};
use super::grid::{GridSpec, draw_grid};
use super::{RenderContext, require};

const RIGHT_ANGLE_SIZE: f64 = 12.0;

pub(super) fn render(ctx: &RenderContext<'_>, shape_type: ShapeType) -> Result<String> {
    let vertices = require(ctx.diagram.vertices.as_ref(), "vertices")?;
    let bounds = match &ctx.diagram.axes {
        Some(axes) => Bounds::from_axes(axes),
        None => Bounds::around(vertices.iter().map(|v| (v.x, v.y)))
            .ok_or_else(|| DiagramError::generation("polygon has no vertices"))?
            .expand(ctx.config.inferred_margin),
    };
    let frame = Frame::stretched(bounds, ctx.config)?;
    let mut svg = ctx.writer();

    if let Some(axes) = &ctx.diagram.axes {
        draw_grid(&mut svg, &frame, &GridSpec::from_axes(axes), ctx.theme, ctx.config)?;
    }

    let points: Vec<(f64, f64)> = vertices.iter().map(|v| frame.point(v.x, v.y)).collect();
    svg.polygon(
        &points,
        Stroke::solid(&ctx.theme.stroke_color, ctx.config.stroke_width),
        &ctx.theme.fill_color,
        "shape",
    );

    if shape_type == ShapeType::RightTriangle {
        if let Some(corner) = right_angle_corner(vertices) {
            draw_right_angle(&mut svg, &points, corner, ctx);
        }
    }

    draw_vertices(&mut svg, &frame, vertices, ctx);
    draw_measurements(&mut svg, &frame, ctx);
    svg.finish()
}

/// Marker plus `"{label}({x},{y})"` for each vertex.
pub(super) fn draw_vertices(
    svg: &mut SvgWriter,
    frame: &Frame,
    vertices: &[Vertex],
    ctx: &RenderContext<'_>,
) {
    svg.open_group("vertices");
    for vertex in vertices {
        let at = frame.point(vertex.x, vertex.y);
        let (radius, default_color) = if vertex.highlighted() {
            (ctx.config.highlight_radius, ctx.theme.highlight_color.as_str())
        } else {
            (ctx.config.marker_radius, ctx.theme.vertex_color.as_str())
        };
        let color = resolve_color(
            vertex.style.as_ref().and_then(|style| style.color.as_deref()),
            default_color,
        );
        svg.circle(at, radius, color, None, "vertex");
        svg.text(
            (at.0 + ctx.config.label_offset, at.1),
            &vertex_label(vertex),
            TextStyle::new("vertex-label")
                .anchor(Anchor::Start)
                .dy(-ctx.config.label_offset),
        );
    }
    svg.close_group();
}

pub(super) fn vertex_label(vertex: &Vertex) -> String {
    format!(
        "{}({},{})",
        vertex.label,
        format_number(vertex.x),
        format_number(vertex.y)
    )
}

fn measurement_text(measurement: &Measurement) -> String {
    if let Some(label) = &measurement.label {
        return label.clone();
    }
    let value = format_number(measurement.value);
    match (measurement.kind, measurement.unit.trim()) {
        (MeasurementKind::Angle, "" | "deg" | "degrees" | "°") => format!("{value}°"),
        (_, "") => value,
        (_, unit) => format!("{value} {unit}"),
    }
}

/// Lengths sit on the midpoint of their segment and angles beside their
/// vertex. Area, perimeter and volume are listed under the figure.
fn draw_measurements(svg: &mut SvgWriter, frame: &Frame, ctx: &RenderContext<'_>) {
    let diagram = ctx.diagram;
    if diagram.measurements.is_empty() {
        return;
    }
    let color = ctx.theme.measurement_color.as_str();
    let mut notes = Vec::new();
    svg.open_group("measurements");
    for measurement in &diagram.measurements {
        let named: Vec<&Vertex> = measurement
            .applies_to
            .iter()
            .filter_map(|label| diagram.vertex(label))
            .collect();
        match measurement.kind {
            MeasurementKind::Length => {
                let [from, to] = named.as_slice() else {
                    log::debug!(applies_to:? = measurement.applies_to; "Skipping length without two vertices");
                    continue;
                };
                let mid = frame.point((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
                svg.text(
                    mid,
                    &measurement_text(measurement),
                    TextStyle::new("measurement")
                        .dy(ctx.config.label_offset * 2.0)
                        .color(color),
                );
            }
            MeasurementKind::Angle if named.len() == 3 => {
                let apex = frame.point(named[1].x, named[1].y);
                let centroid = frame.point(
                    named.iter().map(|v| v.x).sum::<f64>() / 3.0,
                    named.iter().map(|v| v.y).sum::<f64>() / 3.0,
                );
                let (dx, dy) = (centroid.0 - apex.0, centroid.1 - apex.1);
                let len = dx.hypot(dy);
                let at = if len > 0.0 {
                    let reach = ctx.config.angle_arc_radius;
                    (apex.0 + dx / len * reach, apex.1 + dy / len * reach)
                } else {
                    apex
                };
                svg.text(at, &measurement_text(measurement), TextStyle::new("measurement").color(color));
            }
            _ => notes.push(measurement),
        }
    }

    let line_height = ctx.theme.font_size * 1.4;
    let mut y = ctx.config.canvas_height - ctx.config.padding / 2.0 - line_height * (notes.len() as f64 - 1.0);
    for measurement in notes {
        let text = match measurement.kind {
            MeasurementKind::Area => format!("Area = {}", measurement_text(measurement)),
            MeasurementKind::Perimeter => format!("Perimeter = {}", measurement_text(measurement)),
            MeasurementKind::Volume => format!("Volume = {}", measurement_text(measurement)),
            MeasurementKind::Angle | MeasurementKind::Length => measurement_text(measurement),
        };
        svg.text(
            (ctx.config.padding / 2.0, y),
            &text,
            TextStyle::new("measurement-note").anchor(Anchor::Start).color(color),
        );
        y += line_height;
    }
    svg.close_group();
}

/// Index of the vertex whose two edges meet at 90 degrees in model space.
fn right_angle_corner(vertices: &[Vertex]) -> Option<usize> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }
    (0..n).find(|&i| {
        let v = &vertices[i];
        let prev = &vertices[(i + n - 1) % n];
        let next = &vertices[(i + 1) % n];
        let (ux, uy) = (prev.x - v.x, prev.y - v.y);
        let (wx, wy) = (next.x - v.x, next.y - v.y);
        let scale = ux.hypot(uy) * wx.hypot(wy);
        scale > 0.0 && ((ux * wx + uy * wy) / scale).abs() < 1e-6
    })
}

fn draw_right_angle(svg: &mut SvgWriter, points: &[(f64, f64)], corner: usize, ctx: &RenderContext<'_>) {
    let n = points.len();
    let v = points[corner];
    let toward = |p: (f64, f64)| {
        let (dx, dy) = (p.0 - v.0, p.1 - v.1);
        let len = dx.hypot(dy);
        (dx / len * RIGHT_ANGLE_SIZE, dy / len * RIGHT_ANGLE_SIZE)
    };
    let u = toward(points[(corner + n - 1) % n]);
    let w = toward(points[(corner + 1) % n]);
    let stroke = Stroke::solid(&ctx.theme.stroke_color, ctx.config.stroke_width / 2.0);
    let a = (v.0 + u.0, v.1 + u.1);
    let b = (v.0 + u.0 + w.0, v.1 + u.1 + w.1);
    let c = (v.0 + w.0, v.1 + w.1);
    svg.line(a, b, stroke, "right-angle");
    svg.line(b, c, stroke, "right-angle");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, render_svg};
    use crate::schema::{Axes, Diagram, VertexStyle};

    fn right_triangle() -> Diagram {
        let mut diagram = Diagram::new(ShapeType::RightTriangle).with_vertices(vec![
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("B", 4.0, 0.0),
            Vertex::new("C", 0.0, 3.0),
        ]);
        diagram.measurements.push(Measurement::length(4.0, "cm", "A", "B"));
        diagram
    }

    #[test]
    fn length_label_sits_on_the_segment_midpoint() {
        let svg = render_svg(&right_triangle(), &RenderOptions::default()).unwrap();
        assert!(svg.contains(r#"<text class="measurement" x="200.00" y="296.00""#), "{svg}");
        assert!(svg.contains(">4 cm</text>"));
    }

    #[test]
    fn vertex_labels_carry_coordinates() {
        let svg = render_svg(&right_triangle(), &RenderOptions::default()).unwrap();
        assert!(svg.contains(">A(0,0)</text>"));
        assert!(svg.contains(">B(4,0)</text>"));
        assert!(svg.contains(">C(0,3)</text>"));
    }

    #[test]
    fn right_angle_found_at_the_origin() {
        let diagram = right_triangle();
        assert_eq!(right_angle_corner(diagram.vertices.as_deref().unwrap()), Some(0));
        let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
        assert_eq!(svg.matches("class=\"right-angle\"").count(), 2);
    }

    #[test]
    fn no_grid_without_axes() {
        let svg = render_svg(&right_triangle(), &RenderOptions::default()).unwrap();
        assert!(!svg.contains("grid-line"));

        let mut diagram = right_triangle();
        diagram.axes = Some(Axes::new(-5.0, 5.0, -5.0, 5.0));
        let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
        assert_eq!(svg.matches("class=\"grid-line\"").count(), 22);
        assert_eq!(svg.matches("class=\"axis\"").count(), 2);
    }

    #[test]
    fn highlighted_vertex_uses_its_own_colour() {
        let mut diagram = right_triangle();
        if let Some(vertices) = diagram.vertices.as_mut() {
            vertices[1].style = Some(VertexStyle {
                color: Some("#00ff00".to_string()),
                highlighted: true,
            });
        }
        let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
        assert!(svg.contains(r##"r="6.00" fill="#00ff00""##));
    }

    #[test]
    fn area_is_listed_as_a_note() {
        let mut diagram = right_triangle();
        diagram.measurements.push(Measurement {
            kind: MeasurementKind::Area,
            value: 6.0,
            unit: "cm²".to_string(),
            label: None,
            applies_to: Vec::new(),
        });
        let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
        assert!(svg.contains(">Area = 6 cm²</text>"));
    }

    #[test]
    fn wide_axes_coarsen_the_grid_instead_of_failing() {
        let mut diagram = right_triangle();
        diagram.axes = Some(Axes::new(-300.0, 300.0, -10.0, 10.0));
        let svg = render_svg(&diagram, &RenderOptions::default()).unwrap();
        // x steps by 2 to stay under 500 ticks, y keeps its unit step.
        assert_eq!(svg.matches("class=\"grid-line\"").count(), 301 + 21);
        assert_eq!(svg.matches("class=\"axis\"").count(), 2);
        assert!(svg.contains(">-298</text>"));
        assert!(!svg.contains(">-299</text>"));
        assert!(svg.contains(r#"class="shape""#));
        assert!(svg.contains(">C(0,3)</text>"));
    }

    #[test]
    fn tick_numbers_share_one_colour() {
        let mut diagram = right_triangle();
        diagram.axes = Some(Axes::new(-5.0, 5.0, -5.0, 5.0));
        let options = RenderOptions::default();
        let svg = render_svg(&diagram, &options).unwrap();
        let fills: Vec<&str> = svg
            .split("<text class=\"tick-number\"")
            .skip(1)
            .filter_map(|tail| tail.split("fill=\"").nth(1))
            .filter_map(|tail| tail.split('"').next())
            .collect();
        assert_eq!(fills.len(), 20);
        assert!(fills.iter().all(|fill| *fill == options.theme.text_color), "{fills:?}");
    }

    #[test]
    fn empty_vertex_list_fails() {
        let diagram = Diagram::new(ShapeType::Triangle).with_vertices(Vec::new());
        assert!(render_svg(&diagram, &RenderOptions::default()).is_err());
    }
}
